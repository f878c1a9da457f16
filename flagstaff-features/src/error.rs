//! Error types for flag registration and evaluation.

use crate::value::FlagKind;
use flagstaff_config::ConfigError;
use thiserror::Error;

/// Result type for flag operations.
pub type Result<T> = std::result::Result<T, FlagError>;

/// Feature flag errors.
#[derive(Debug, Error)]
pub enum FlagError {
    /// The flag name is not in the registry. Always a caller bug.
    #[error("Unknown feature flag: {0}")]
    UnknownFlag(String),

    /// A value could not be used as the flag's declared type
    #[error("Type mismatch for flag {flag}: expected {expected}, got {found}")]
    TypeMismatch {
        flag: String,
        expected: FlagKind,
        found: String,
    },

    /// Raised by guards when a gating flag is off for the caller
    #[error("Feature flag is not enabled: {0}")]
    FeatureDisabled(String),

    /// Rejected while building the registry
    #[error("Invalid definition for flag {flag}: {reason}")]
    InvalidDefinition { flag: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FlagError {
    pub(crate) fn invalid(flag: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            flag: flag.to_string(),
            reason: reason.into(),
        }
    }
}
