// Configuration validation

use crate::{ConfigError, Result};

/// Types that can check their own invariants after loading
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Reject empty or whitespace-only values
    pub fn not_empty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                field
            )));
        }
        Ok(())
    }

    /// Reject numbers outside `min..=max`
    pub fn in_range<T: PartialOrd + std::fmt::Display>(
        value: T,
        min: T,
        max: T,
        field: &str,
    ) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between {} and {}, got {}",
                field, min, max, value
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty_validation() {
        assert!(ConfigValidator::not_empty("production", "environment").is_ok());
        assert!(ConfigValidator::not_empty("", "environment").is_err());
        assert!(ConfigValidator::not_empty("   ", "environment").is_err());
    }

    #[test]
    fn test_range_validation() {
        assert!(ConfigValidator::in_range(0, 0, 100, "percentage").is_ok());
        assert!(ConfigValidator::in_range(100, 0, 100, "percentage").is_ok());

        let err = ConfigValidator::in_range(101, 0, 100, "percentage").unwrap_err();
        assert!(err.to_string().contains("between 0 and 100"));
    }
}
