//! Client-facing export of evaluated flags.

use crate::error::Result;
use crate::value::FlagValue;
use flagstaff_config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All flag values for one context, taken under a single consistent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagSnapshot {
    pub environment: String,
    pub flags: BTreeMap<String, FlagValue>,
}

impl FlagSnapshot {
    pub fn new(environment: impl Into<String>, flags: BTreeMap<String, FlagValue>) -> Self {
        Self {
            environment: environment.into(),
            flags,
        }
    }

    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    /// Truthiness of `name`; `false` when absent.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).is_some_and(FlagValue::is_truthy)
    }

    /// JSON payload for a client.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ConfigError::SerializationError(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json() {
        let mut flags = BTreeMap::new();
        flags.insert("newDashboard".to_string(), FlagValue::Bool(true));
        flags.insert("theme".to_string(), FlagValue::from("dark"));

        let snapshot = FlagSnapshot::new("staging", flags);
        assert_eq!(
            snapshot.to_json().unwrap(),
            r#"{"environment":"staging","flags":{"newDashboard":true,"theme":"dark"}}"#
        );
    }

    #[test]
    fn test_lookup() {
        let mut flags = BTreeMap::new();
        flags.insert("beta".to_string(), FlagValue::Bool(false));
        let snapshot = FlagSnapshot::new("production", flags);

        assert!(!snapshot.is_enabled("beta"));
        assert!(!snapshot.is_enabled("missing"));
        assert_eq!(snapshot.get("beta"), Some(&FlagValue::Bool(false)));
    }
}
