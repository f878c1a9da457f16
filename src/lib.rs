// Flagstaff - deterministic in-process feature flags
//
// Resolves flag values through runtime overrides, external configuration,
// per-environment values and consistent-hash percentage rollout, and reports
// which of those produced each value.

// Re-export the engine
pub use flagstaff_features::*;

// Re-export supporting crates
pub use flagstaff_config;
pub use flagstaff_log;

pub use flagstaff_config::{ConfigSource, EngineSettings, EnvSource, LayeredSource, MapSource};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        EvaluationResult,
        FlagContext,
        FlagDefinition,
        FlagEngine,
        FlagError,
        FlagGuard,
        FlagKey,
        FlagRegistry,
        FlagValue,
        MapSource,
        Principal,
        Reason,
        RolloutRule,
    };
}
