//! Flag guards
//!
//! Gate an operation on a boolean flag. A disabled flag surfaces as
//! [`FlagError::FeatureDisabled`] so callers can map it to their own
//! "not available" response.

use crate::context::FlagContext;
use crate::engine::FlagEngine;
use crate::error::{FlagError, Result};
use crate::value::FlagKey;
use flagstaff_log::debug;

/// Guard for a single flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagGuard {
    flag: String,
}

impl FlagGuard {
    pub fn new(flag: impl Into<String>) -> Self {
        Self { flag: flag.into() }
    }

    pub fn for_key(key: &FlagKey<bool>) -> Self {
        Self::new(key.name())
    }

    pub fn flag(&self) -> &str {
        &self.flag
    }

    /// `Ok(())` when the flag is on for `context`.
    pub fn check(&self, engine: &FlagEngine, context: &FlagContext) -> Result<()> {
        let result = engine.require_enabled(&self.flag, context);
        if let Err(FlagError::FeatureDisabled(_)) = result {
            debug!("Guard rejected {:?} on {}", context.identifier(), self.flag);
        }
        result
    }

    /// Run `operation` only when the flag is on.
    ///
    /// ```
    /// use flagstaff_features::*;
    /// use flagstaff_config::MapSource;
    ///
    /// let registry = FlagRegistry::builder()
    ///     .flag("exports", FlagDefinition::boolean(false))
    ///     .build()
    ///     .unwrap();
    /// let engine = FlagEngine::builder(registry).source(MapSource::new()).build().unwrap();
    /// let guard = FlagGuard::new("exports");
    ///
    /// let denied = guard.run(&engine, &FlagContext::anonymous(), || "exported");
    /// assert!(matches!(denied, Err(FlagError::FeatureDisabled(_))));
    ///
    /// engine.set_override("exports", true).unwrap();
    /// let allowed = guard.run(&engine, &FlagContext::anonymous(), || "exported");
    /// assert_eq!(allowed.unwrap(), "exported");
    /// ```
    pub fn run<T>(
        &self,
        engine: &FlagEngine,
        context: &FlagContext,
        operation: impl FnOnce() -> T,
    ) -> Result<T> {
        self.check(engine, context)?;
        Ok(operation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::FlagDefinition;
    use crate::registry::FlagRegistry;
    use crate::rollout::RolloutRule;
    use flagstaff_config::MapSource;

    const BULK_EDIT: FlagKey<bool> = FlagKey::new("bulkEdit");

    fn engine() -> FlagEngine {
        let registry = FlagRegistry::builder()
            .register(
                &BULK_EDIT,
                FlagDefinition::boolean(false).with_rollout(RolloutRule::new(0).allow("user-1")),
            )
            .build()
            .unwrap();
        FlagEngine::builder(registry)
            .source(MapSource::new())
            .build()
            .unwrap()
    }

    #[test]
    fn test_guard_by_context() {
        let engine = engine();
        let guard = FlagGuard::for_key(&BULK_EDIT);

        assert!(guard
            .check(&engine, &FlagContext::new().with_user_id("user-1"))
            .is_ok());

        let err = guard
            .check(&engine, &FlagContext::new().with_user_id("user-2"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Feature flag is not enabled: bulkEdit");
    }

    #[test]
    fn test_guard_unknown_flag() {
        let engine = engine();
        let guard = FlagGuard::new("missing");
        assert!(matches!(
            guard.check(&engine, &FlagContext::anonymous()),
            Err(FlagError::UnknownFlag(_))
        ));
    }

    #[test]
    fn test_run_skips_operation_when_disabled() {
        let engine = engine();
        let mut ran = false;

        let result = FlagGuard::new("bulkEdit").run(&engine, &FlagContext::anonymous(), || {
            ran = true;
        });

        assert!(result.is_err());
        assert!(!ran);
    }
}
