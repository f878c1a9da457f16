//! Flag values and typed flag keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// A flag value: the scalar types that can be parsed back from text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    String(String),
    Number(f64),
}

/// The variant of a [`FlagValue`], used as a flag's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Bool,
    String,
    Number,
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlagKind::Bool => "bool",
            FlagKind::String => "string",
            FlagKind::Number => "number",
        })
    }
}

impl FlagValue {
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::Bool(_) => FlagKind::Bool,
            Self::String(_) => FlagKind::String,
            Self::Number(_) => FlagKind::Number,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean coercion: `false`, `""`, `0` and `NaN` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::String(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
        }
    }

    /// Parse external text as a value of `kind`.
    ///
    /// Booleans accept `"true"` and `"1"`; anything else is `false`. Strings
    /// are taken verbatim. Returns `None` only for text that is not a finite
    /// number.
    pub fn parse_as(kind: FlagKind, raw: &str) -> Option<Self> {
        match kind {
            FlagKind::Bool => Some(Self::Bool(raw == "true" || raw == "1")),
            FlagKind::String => Some(Self::String(raw.to_string())),
            FlagKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Self::Number),
        }
    }

    /// `false` for NaN and infinite numbers. JSON has no encoding for either,
    /// and NaN never compares equal to itself.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Number(n) => n.is_finite(),
            _ => true,
        }
    }

    /// Value served to contexts inside an allowlist or rollout.
    ///
    /// Boolean flags turn on. Other kinds have no "enabled" variant and keep
    /// their default, so targeting them changes the reason but not the value.
    pub fn enabled_for(default_value: &FlagValue) -> FlagValue {
        match default_value {
            Self::Bool(_) => Self::Bool(true),
            other => other.clone(),
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for FlagValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Rust types a flag can be declared as.
pub trait FlagType: Sized + Into<FlagValue> {
    const KIND: FlagKind;

    fn from_value(value: &FlagValue) -> Option<Self>;
}

impl FlagType for bool {
    const KIND: FlagKind = FlagKind::Bool;

    fn from_value(value: &FlagValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FlagType for String {
    const KIND: FlagKind = FlagKind::String;

    fn from_value(value: &FlagValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FlagType for f64 {
    const KIND: FlagKind = FlagKind::Number;

    fn from_value(value: &FlagValue) -> Option<Self> {
        value.as_number()
    }
}

/// A flag name bound to its value type.
///
/// Declare keys once and use them both to register the flag and to read it,
/// so the value type is checked where the flag is defined.
///
/// ```
/// use flagstaff_features::{FlagDefinition, FlagEngine, FlagKey, FlagRegistry, FlagContext};
/// use flagstaff_config::MapSource;
///
/// const NEW_DASHBOARD: FlagKey<bool> = FlagKey::new("newDashboard");
///
/// let registry = FlagRegistry::builder()
///     .register(&NEW_DASHBOARD, FlagDefinition::boolean(false))
///     .build()
///     .unwrap();
/// let engine = FlagEngine::builder(registry)
///     .source(MapSource::new())
///     .build()
///     .unwrap();
///
/// let on: bool = engine.value(&NEW_DASHBOARD, &FlagContext::anonymous()).unwrap();
/// assert!(!on);
/// ```
pub struct FlagKey<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> FlagKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for FlagKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FlagKey<T> {}

impl<T> fmt::Debug for FlagKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FlagKey").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(FlagValue::Bool(true).is_truthy());
        assert!(!FlagValue::Bool(false).is_truthy());
        assert!(FlagValue::from("dark").is_truthy());
        assert!(!FlagValue::from("").is_truthy());
        assert!(FlagValue::Number(0.5).is_truthy());
        assert!(!FlagValue::Number(0.0).is_truthy());
        assert!(!FlagValue::Number(f64::NAN).is_truthy());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(FlagValue::parse_as(FlagKind::Bool, "true"), Some(FlagValue::Bool(true)));
        assert_eq!(FlagValue::parse_as(FlagKind::Bool, "1"), Some(FlagValue::Bool(true)));
        assert_eq!(FlagValue::parse_as(FlagKind::Bool, "TRUE"), Some(FlagValue::Bool(false)));
        assert_eq!(FlagValue::parse_as(FlagKind::Bool, "yes"), Some(FlagValue::Bool(false)));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(FlagValue::parse_as(FlagKind::Number, " 42 "), Some(FlagValue::Number(42.0)));
        assert_eq!(FlagValue::parse_as(FlagKind::Number, "-0.25"), Some(FlagValue::Number(-0.25)));
        assert_eq!(FlagValue::parse_as(FlagKind::Number, "many"), None);
        assert_eq!(FlagValue::parse_as(FlagKind::Number, "NaN"), None);
        assert_eq!(FlagValue::parse_as(FlagKind::Number, "inf"), None);
        assert_eq!(FlagValue::parse_as(FlagKind::Number, "-infinity"), None);
        assert_eq!(FlagValue::parse_as(FlagKind::Number, "1e400"), None);
    }

    #[test]
    fn test_finite() {
        assert!(FlagValue::Number(-3.5).is_finite());
        assert!(FlagValue::Bool(false).is_finite());
        assert!(FlagValue::from("inf").is_finite());
        assert!(!FlagValue::Number(f64::NAN).is_finite());
        assert!(!FlagValue::Number(f64::NEG_INFINITY).is_finite());
    }

    #[test]
    fn test_parse_string_is_verbatim() {
        assert_eq!(
            FlagValue::parse_as(FlagKind::String, " blue "),
            Some(FlagValue::from(" blue "))
        );
    }

    #[test]
    fn test_enabled_value() {
        assert_eq!(FlagValue::enabled_for(&FlagValue::Bool(false)), FlagValue::Bool(true));
        assert_eq!(FlagValue::enabled_for(&FlagValue::from("red")), FlagValue::from("red"));
        assert_eq!(FlagValue::enabled_for(&FlagValue::Number(3.0)), FlagValue::Number(3.0));
    }

    #[test]
    fn test_untagged_serde() {
        let values: Vec<FlagValue> = serde_json::from_str(r#"[true, "blue", 2.5]"#).unwrap();
        assert_eq!(values[0].kind(), FlagKind::Bool);
        assert_eq!(values[1].kind(), FlagKind::String);
        assert_eq!(values[2].kind(), FlagKind::Number);

        assert_eq!(serde_json::to_string(&FlagValue::Bool(true)).unwrap(), "true");
    }

    #[test]
    fn test_flag_type_extraction() {
        assert_eq!(bool::from_value(&FlagValue::Bool(true)), Some(true));
        assert_eq!(String::from_value(&FlagValue::Bool(true)), None);
        assert_eq!(f64::from_value(&FlagValue::Number(1.5)), Some(1.5));
        assert_eq!(<String as FlagType>::KIND, FlagKind::String);
    }
}
