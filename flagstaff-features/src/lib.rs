//! Feature Flags for Flagstaff
//!
//! Deterministic, in-process feature flag evaluation. Every evaluation returns
//! the value and the reason it was chosen.
//!
//! # Precedence
//!
//! 1. **Runtime override** set with [`FlagEngine::set_override`]
//! 2. **External override** read from the configured source as `FLAG_<NAME>`
//! 3. **Environment value** for the engine's current environment
//! 4. **Rollout** blocklist, allowlist, then percentage bucket
//! 5. **Default**
//!
//! # Quick Start
//!
//! ```
//! use flagstaff_features::*;
//! use flagstaff_config::MapSource;
//!
//! let registry = FlagRegistry::builder()
//!     .flag(
//!         "newDashboard",
//!         FlagDefinition::boolean(false).with_environment("development", true),
//!     )
//!     .flag(
//!         "betaFeatures",
//!         FlagDefinition::boolean(false).with_rollout(RolloutRule::new(25).allow("user-42")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let engine = FlagEngine::builder(registry)
//!     .source(MapSource::new())
//!     .environment("development")
//!     .build()
//!     .unwrap();
//!
//! let context = FlagContext::new().with_user_id("user-42");
//! let result = engine.get_flag("betaFeatures", &context).unwrap();
//! assert_eq!(result.reason, Reason::Allowlist);
//! assert!(engine.is_enabled("newDashboard", &context).unwrap());
//! ```
//!
//! # Gradual Rollout
//!
//! Bucketing hashes `"<flag>:<identifier>"` into `0..100`, where the
//! identifier is the first of user id, organization id and email. Contexts
//! without any of them never match a rollout rule.
//!
//! Non-boolean flags have no "enabled" variant: allowlisting or rolling them
//! out reports the matching reason but serves the default value.

pub mod context;
pub mod definition;
pub mod engine;
pub mod error;
pub mod guard;
pub mod hash;
pub mod registry;
pub mod result;
pub mod rollout;
pub mod snapshot;
pub mod value;

pub use context::{FlagContext, Principal};
pub use definition::FlagDefinition;
pub use engine::{EngineBuilder, FlagEngine};
pub use error::{FlagError, Result};
pub use guard::FlagGuard;
pub use registry::{FlagRegistry, RegistryBuilder};
pub use result::{EvaluationResult, Reason};
pub use rollout::RolloutRule;
pub use snapshot::FlagSnapshot;
pub use value::{FlagKey, FlagKind, FlagType, FlagValue};
