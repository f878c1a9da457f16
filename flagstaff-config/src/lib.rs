// Configuration management for the Flagstaff feature flag engine

pub mod error;
pub mod loader;
pub mod settings;
pub mod source;
pub mod validation;

pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use settings::EngineSettings;
pub use source::{ConfigSource, EnvSource, LayeredSource, MapSource, flag_env_key};
pub use validation::{ConfigValidator, Validate};
