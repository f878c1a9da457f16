//! Flag definitions.

use crate::error::{FlagError, Result};
use crate::rollout::RolloutRule;
use crate::value::{FlagKind, FlagValue};
use flagstaff_config::ConfigValidator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the engine knows about one flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDefinition {
    /// Value when no tier matches; also fixes the flag's type
    pub default_value: FlagValue,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollout: Option<RolloutRule>,

    /// Per-environment values, keyed by environment label
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environments: BTreeMap<String, FlagValue>,
}

impl FlagDefinition {
    pub fn new(default_value: impl Into<FlagValue>) -> Self {
        Self {
            default_value: default_value.into(),
            description: None,
            rollout: None,
            environments: BTreeMap::new(),
        }
    }

    /// A boolean flag.
    ///
    /// ```
    /// use flagstaff_features::{FlagDefinition, RolloutRule};
    ///
    /// let flag = FlagDefinition::boolean(false)
    ///     .with_description("Redesigned dashboard")
    ///     .with_environment("development", true)
    ///     .with_rollout(RolloutRule::new(10));
    /// ```
    pub fn boolean(default_value: bool) -> Self {
        Self::new(default_value)
    }

    pub fn string(default_value: impl Into<String>) -> Self {
        Self::new(default_value.into())
    }

    pub fn number(default_value: f64) -> Self {
        Self::new(default_value)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_rollout(mut self, rollout: RolloutRule) -> Self {
        self.rollout = Some(rollout);
        self
    }

    pub fn with_environment(
        mut self,
        environment: impl Into<String>,
        value: impl Into<FlagValue>,
    ) -> Self {
        self.environments.insert(environment.into(), value.into());
        self
    }

    /// The flag's declared type.
    pub fn kind(&self) -> FlagKind {
        self.default_value.kind()
    }

    pub(crate) fn validate(&self, name: &str) -> Result<()> {
        ConfigValidator::not_empty(name, "flag name")
            .map_err(|e| FlagError::invalid(name, e.to_string()))?;

        if let Some(ref rollout) = self.rollout {
            ConfigValidator::in_range(rollout.percentage, 0, 100, "rollout percentage")
                .map_err(|e| FlagError::invalid(name, e.to_string()))?;
        }

        if !self.default_value.is_finite() {
            return Err(FlagError::invalid(
                name,
                format!("default value {} is not a finite number", self.default_value),
            ));
        }

        let kind = self.kind();
        for (environment, value) in &self.environments {
            if !value.is_finite() {
                return Err(FlagError::invalid(
                    name,
                    format!(
                        "value for environment '{}' is not a finite number: {}",
                        environment, value
                    ),
                ));
            }
            if value.kind() != kind {
                return Err(FlagError::invalid(
                    name,
                    format!(
                        "value for environment '{}' is a {}, expected {}",
                        environment,
                        value.kind(),
                        kind
                    ),
                ));
            }
        }

        Ok(())
    }
}
