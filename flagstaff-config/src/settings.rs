//! Engine settings resolved from a [`ConfigSource`].

use crate::{ConfigSource, ConfigValidator, Result, Validate};

/// Key holding the environment label.
pub const ENVIRONMENT_KEY: &str = "FLAGSTAFF_ENVIRONMENT";

/// Fallback key for the environment label, shared with the host application.
pub const APP_ENV_KEY: &str = "APP_ENV";

/// Key holding the prefix of external flag overrides.
pub const OVERRIDE_PREFIX_KEY: &str = "FLAGSTAFF_OVERRIDE_PREFIX";

pub const DEFAULT_ENVIRONMENT: &str = "development";

pub const DEFAULT_OVERRIDE_PREFIX: &str = "FLAG_";

/// Process-level settings for a flag engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Environment label used until the engine is told otherwise
    pub environment: String,
    /// Prefix of external override keys, e.g. `FLAG_`
    pub override_prefix: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            override_prefix: DEFAULT_OVERRIDE_PREFIX.to_string(),
        }
    }
}

impl EngineSettings {
    /// Resolve settings from `source`, falling back to the defaults.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        let environment = source
            .get(ENVIRONMENT_KEY)
            .or_else(|| source.get(APP_ENV_KEY))
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let override_prefix = source
            .get(OVERRIDE_PREFIX_KEY)
            .unwrap_or_else(|| DEFAULT_OVERRIDE_PREFIX.to_string());

        let settings = Self {
            environment,
            override_prefix,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_override_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.override_prefix = prefix.into();
        self
    }
}

impl Validate for EngineSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.environment, "environment")
    }
}
