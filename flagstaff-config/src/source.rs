//! Key/value lookup sources
//!
//! The engine never reads process configuration directly. It asks a
//! [`ConfigSource`] for a text value by key, and absence means "not set".

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::sync::Arc;

/// A read-only text lookup keyed by name.
pub trait ConfigSource: Send + Sync {
    /// Look up `key`, returning `None` when the source has no value for it.
    fn get(&self, key: &str) -> Option<String>;
}

impl<S: ConfigSource + ?Sized> ConfigSource for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<S: ConfigSource + ?Sized> ConfigSource for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Process environment variables, optionally under a prefix.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    prefix: Option<String>,
}

impl EnvSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look keys up as `<PREFIX>_<KEY>`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key),
            None => key.to_string(),
        }
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(self.full_key(key)).ok()
    }
}

/// In-memory source, used for tests and for values read from `.env` files.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read a `.env` file without touching the process environment.
    pub fn from_dotenv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut source = Self::new();
        for entry in entries {
            let (key, value) = entry.map_err(|e| ConfigError::ParseError(e.to_string()))?;
            source.insert(key, value);
        }

        flagstaff_log::debug!(
            "Loaded {} values from {}",
            source.len(),
            path.display()
        );
        Ok(source)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Ordered list of sources; the first one holding a key wins.
#[derive(Clone, Default)]
pub struct LayeredSource {
    layers: Vec<Arc<dyn ConfigSource>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer with lower priority than the existing ones.
    pub fn layer(mut self, source: impl ConfigSource + 'static) -> Self {
        self.layers.push(Arc::new(source));
        self
    }
}

impl ConfigSource for LayeredSource {
    fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }
}

impl std::fmt::Debug for LayeredSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredSource")
            .field("layers", &self.layers.len())
            .finish()
    }
}

/// Environment key for an external flag override.
///
/// The flag name is uppercased and every character that is not ASCII
/// alphanumeric becomes `_`, then `prefix` is prepended.
///
/// ```
/// use flagstaff_config::flag_env_key;
///
/// assert_eq!(flag_env_key("FLAG_", "new-dashboard"), "FLAG_NEW_DASHBOARD");
/// assert_eq!(flag_env_key("FLAG_", "betaFeatures"), "FLAG_BETAFEATURES");
/// ```
pub fn flag_env_key(prefix: &str, flag_name: &str) -> String {
    let mut key = String::with_capacity(prefix.len() + flag_name.len());
    key.push_str(prefix);
    key.extend(flag_name.chars().map(|c| {
        if c.is_ascii_alphanumeric() {
            c.to_ascii_uppercase()
        } else {
            '_'
        }
    }));
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_source_missing_var() {
        let source = EnvSource::new();
        assert_eq!(source.get("FLAGSTAFF_NONEXISTENT_VAR_12345"), None);
    }

    #[test]
    fn test_env_source_path_exists() {
        // PATH is set on practically every host
        let source = EnvSource::new();
        if std::env::var("PATH").is_ok() {
            assert!(source.get("PATH").is_some());
        }
    }

    #[test]
    fn test_env_source_prefix() {
        let source = EnvSource::with_prefix("MY_APP");
        assert_eq!(source.full_key("FOO"), "MY_APP_FOO");
    }

    #[test]
    fn test_map_source() {
        let mut source = MapSource::new().with("FLAG_A", "true");
        source.insert("FLAG_B", "42");

        assert_eq!(source.get("FLAG_A").as_deref(), Some("true"));
        assert_eq!(source.get("FLAG_B").as_deref(), Some("42"));
        assert_eq!(source.get("FLAG_C"), None);

        assert_eq!(source.remove("FLAG_A").as_deref(), Some("true"));
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_map_source_from_iter() {
        let source: MapSource = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(source.get("B").as_deref(), Some("2"));
    }

    #[test]
    fn test_layered_source_first_hit_wins() {
        let source = LayeredSource::new()
            .layer(MapSource::new().with("KEY", "top"))
            .layer(MapSource::new().with("KEY", "bottom").with("OTHER", "x"));

        assert_eq!(source.get("KEY").as_deref(), Some("top"));
        assert_eq!(source.get("OTHER").as_deref(), Some("x"));
        assert_eq!(source.get("MISSING"), None);
    }

    #[test]
    fn test_flag_env_key() {
        assert_eq!(flag_env_key("FLAG_", "maintenanceMode"), "FLAG_MAINTENANCEMODE");
        assert_eq!(flag_env_key("FLAG_", "new.ui-v2"), "FLAG_NEW_UI_V2");
        assert_eq!(flag_env_key("", "a b"), "A_B");
        assert_eq!(flag_env_key("FLAG_", "café"), "FLAG_CAF_");
    }
}
