//! Flag registry
//!
//! The immutable set of flag definitions an engine evaluates against.

use crate::definition::FlagDefinition;
use crate::error::{FlagError, Result};
use crate::value::{FlagKey, FlagKind, FlagType};
use flagstaff_config::{ConfigError, ConfigLoader};
use flagstaff_log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Flag name to definition, fixed once built.
///
/// Names iterate in sorted order so bulk evaluation is reproducible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagRegistry {
    flags: BTreeMap<String, FlagDefinition>,
}

impl FlagRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Load definitions from a JSON or TOML file, picked by extension.
    ///
    /// The document maps flag names to definitions:
    ///
    /// ```toml
    /// [betaFeatures]
    /// default_value = false
    /// description = "Early access features"
    ///
    /// [betaFeatures.rollout]
    /// percentage = 10
    /// allowlist = ["user-42"]
    /// ```
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = ConfigLoader::auto(path)?.load_file(path)?;
        let registry = Self::from_value(value)?;
        debug!("Loaded {} flags from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// Build a registry from an already parsed document.
    pub fn from_value(value: Value) -> Result<Self> {
        let flags: BTreeMap<String, FlagDefinition> = serde_json::from_value(value)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;

        flags
            .into_iter()
            .fold(Self::builder(), |builder, (name, definition)| {
                builder.flag(name, definition)
            })
            .build()
    }

    pub fn get(&self, name: &str) -> Option<&FlagDefinition> {
        self.flags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagDefinition)> {
        self.flags.iter().map(|(name, definition)| (name.as_str(), definition))
    }
}

/// Collects definitions and validates them all at once in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    name: String,
    definition: FlagDefinition,
    declared: Option<FlagKind>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flag(mut self, name: impl Into<String>, definition: FlagDefinition) -> Self {
        self.entries.push(Entry {
            name: name.into(),
            definition,
            declared: None,
        });
        self
    }

    /// Register a flag through its typed key. The definition's default must
    /// be of the key's type.
    pub fn register<T: FlagType>(mut self, key: &FlagKey<T>, definition: FlagDefinition) -> Self {
        self.entries.push(Entry {
            name: key.name().to_string(),
            definition,
            declared: Some(T::KIND),
        });
        self
    }

    pub fn build(self) -> Result<FlagRegistry> {
        let mut flags = BTreeMap::new();

        for Entry {
            name,
            definition,
            declared,
        } in self.entries
        {
            definition.validate(&name)?;

            if let Some(kind) = declared
                && kind != definition.kind()
            {
                return Err(FlagError::invalid(
                    &name,
                    format!(
                        "key is declared as {} but the default is a {}",
                        kind,
                        definition.kind()
                    ),
                ));
            }

            if flags.contains_key(&name) {
                return Err(FlagError::invalid(&name, "registered more than once"));
            }
            flags.insert(name, definition);
        }

        Ok(FlagRegistry { flags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::RolloutRule;
    use crate::value::FlagValue;
    use serde_json::json;

    const MAINTENANCE: FlagKey<bool> = FlagKey::new("maintenanceMode");
    const THEME: FlagKey<String> = FlagKey::new("theme");

    #[test]
    fn test_builder_and_lookup() {
        let registry = FlagRegistry::builder()
            .register(&MAINTENANCE, FlagDefinition::boolean(false))
            .register(&THEME, FlagDefinition::string("light"))
            .flag("maxUploads", FlagDefinition::number(5.0))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("theme"));
        assert!(!registry.contains("missing"));
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["maintenanceMode", "maxUploads", "theme"]
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = FlagRegistry::builder()
            .flag("a", FlagDefinition::boolean(false))
            .flag("a", FlagDefinition::boolean(true))
            .build();
        assert!(matches!(result, Err(FlagError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_typed_key_mismatch_rejected() {
        let result = FlagRegistry::builder()
            .register(&THEME, FlagDefinition::boolean(false))
            .build();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("declared as string"));
    }

    #[test]
    fn test_from_value() {
        let registry = FlagRegistry::from_value(json!({
            "betaFeatures": {
                "default_value": false,
                "rollout": { "percentage": 0, "allowlist": ["user-42"] }
            },
            "newDashboard": {
                "default_value": false,
                "environments": { "development": true }
            }
        }))
        .unwrap();

        let beta = registry.get("betaFeatures").unwrap();
        assert_eq!(beta.rollout, Some(RolloutRule::new(0).allow("user-42")));

        let dashboard = registry.get("newDashboard").unwrap();
        assert_eq!(
            dashboard.environments.get("development"),
            Some(&FlagValue::Bool(true))
        );
    }

    #[test]
    fn test_from_value_validates() {
        let result = FlagRegistry::from_value(json!({
            "broken": { "default_value": 1, "environments": { "production": "one" } }
        }));
        assert!(matches!(result, Err(FlagError::InvalidDefinition { .. })));

        let result = FlagRegistry::from_value(json!({ "noDefault": {} }));
        assert!(matches!(result, Err(FlagError::Config(_))));
    }
}
