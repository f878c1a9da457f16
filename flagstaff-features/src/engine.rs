//! Evaluation engine
//!
//! Resolves a flag for a context by walking the precedence chain:
//!
//! 1. runtime override ([`FlagEngine::set_override`])
//! 2. external override read from the [`ConfigSource`] under `FLAG_<NAME>`
//! 3. the definition's value for the current environment
//! 4. the definition's rollout rule
//! 5. the definition's default
//!
//! Overrides and the environment label are the only mutable state. Both sit
//! behind one reader-writer lock, and every evaluation holds the read side
//! for its whole duration.

use crate::context::FlagContext;
use crate::definition::FlagDefinition;
use crate::error::{FlagError, Result};
use crate::registry::FlagRegistry;
use crate::result::{EvaluationResult, Reason};
use crate::snapshot::FlagSnapshot;
use crate::value::{FlagKey, FlagType, FlagValue};
use flagstaff_config::{ConfigSource, EngineSettings, EnvSource, flag_env_key};
use flagstaff_log::{info, trace, warn};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug)]
struct EngineState {
    overrides: HashMap<String, FlagValue>,
    environment: String,
}

/// Feature flag engine.
///
/// One instance owns its overrides and environment; share it with `Arc`.
pub struct FlagEngine {
    registry: FlagRegistry,
    source: Arc<dyn ConfigSource>,
    override_prefix: String,
    state: RwLock<EngineState>,
}

impl FlagEngine {
    /// Engine reading external overrides and settings from the process
    /// environment.
    pub fn new(registry: FlagRegistry) -> Result<Self> {
        Self::builder(registry).build()
    }

    pub fn builder(registry: FlagRegistry) -> EngineBuilder {
        EngineBuilder::new(registry)
    }

    /// Evaluate `name` for `context`.
    pub fn get_flag(&self, name: &str, context: &FlagContext) -> Result<EvaluationResult> {
        let result = {
            let state = self.state.read();
            self.evaluate(name, context, &state)?
        };
        trace!(
            "Evaluated {} for {:?}: {} ({})",
            name,
            context.identifier(),
            result.value,
            result.reason
        );
        Ok(result)
    }

    pub fn get_flag_value(&self, name: &str, context: &FlagContext) -> Result<FlagValue> {
        self.get_flag(name, context).map(|result| result.value)
    }

    /// Truthiness of the flag's value. Meant for boolean flags.
    pub fn is_enabled(&self, name: &str, context: &FlagContext) -> Result<bool> {
        self.get_flag(name, context).map(|result| result.is_enabled())
    }

    /// Typed read through a [`FlagKey`].
    pub fn value<T: FlagType>(&self, key: &FlagKey<T>, context: &FlagContext) -> Result<T> {
        let value = self.get_flag_value(key.name(), context)?;
        T::from_value(&value).ok_or_else(|| FlagError::TypeMismatch {
            flag: key.name().to_string(),
            expected: T::KIND,
            found: value.kind().to_string(),
        })
    }

    /// Evaluate every registered flag for the same context.
    pub fn get_all_flags(&self, context: &FlagContext) -> Result<BTreeMap<String, FlagValue>> {
        let flags = {
            let state = self.state.read();
            self.evaluate_all(context, &state)?
        };
        trace!("Evaluated {} flags for {:?}", flags.len(), context.identifier());
        Ok(flags)
    }

    /// Serializable export of [`get_all_flags`](Self::get_all_flags).
    pub fn snapshot(&self, context: &FlagContext) -> Result<FlagSnapshot> {
        let state = self.state.read();
        let flags = self.evaluate_all(context, &state)?;
        Ok(FlagSnapshot::new(state.environment.clone(), flags))
    }

    /// Fail with [`FlagError::FeatureDisabled`] unless `name` is on for
    /// `context`.
    pub fn require_enabled(&self, name: &str, context: &FlagContext) -> Result<()> {
        if self.is_enabled(name, context)? {
            Ok(())
        } else {
            Err(FlagError::FeatureDisabled(name.to_string()))
        }
    }

    /// Force `name` to `value` until cleared.
    ///
    /// The value must have the same type as the flag's default, and numbers
    /// must be finite.
    pub fn set_override(&self, name: &str, value: impl Into<FlagValue>) -> Result<()> {
        let value = value.into();
        let definition = self.definition(name)?;

        if !value.is_finite() {
            return Err(FlagError::TypeMismatch {
                flag: name.to_string(),
                expected: definition.kind(),
                found: format!("non-finite number {}", value),
            });
        }

        if value.kind() != definition.kind() {
            return Err(FlagError::TypeMismatch {
                flag: name.to_string(),
                expected: definition.kind(),
                found: value.kind().to_string(),
            });
        }

        info!("Override set: {} = {}", name, value);
        self.state.write().overrides.insert(name.to_string(), value);
        Ok(())
    }

    /// Remove the runtime override for `name`. Returns whether one existed.
    pub fn clear_override(&self, name: &str) -> bool {
        let removed = self.state.write().overrides.remove(name).is_some();
        if removed {
            info!("Override cleared: {}", name);
        }
        removed
    }

    pub fn clear_all_overrides(&self) {
        let cleared = {
            let mut state = self.state.write();
            let count = state.overrides.len();
            state.overrides.clear();
            count
        };
        info!("Cleared {} overrides", cleared);
    }

    /// Current runtime overrides, for diagnostics.
    pub fn overrides(&self) -> BTreeMap<String, FlagValue> {
        self.state
            .read()
            .overrides
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Switch the environment used for environment-specific values.
    pub fn set_environment(&self, environment: impl Into<String>) {
        let environment = environment.into();
        info!("Environment set to {}", environment);
        self.state.write().environment = environment;
    }

    pub fn environment(&self) -> String {
        self.state.read().environment.clone()
    }

    /// The registry, for admin and diagnostic tooling.
    pub fn definitions(&self) -> &FlagRegistry {
        &self.registry
    }

    fn definition(&self, name: &str) -> Result<&FlagDefinition> {
        self.registry
            .get(name)
            .ok_or_else(|| FlagError::UnknownFlag(name.to_string()))
    }

    fn evaluate_all(
        &self,
        context: &FlagContext,
        state: &EngineState,
    ) -> Result<BTreeMap<String, FlagValue>> {
        self.registry
            .names()
            .map(|name| {
                self.evaluate(name, context, state)
                    .map(|result| (name.to_string(), result.value))
            })
            .collect()
    }

    fn evaluate(
        &self,
        name: &str,
        context: &FlagContext,
        state: &EngineState,
    ) -> Result<EvaluationResult> {
        let definition = self.definition(name)?;
        Ok(self.resolve(name, definition, context, state))
    }

    fn resolve(
        &self,
        name: &str,
        definition: &FlagDefinition,
        context: &FlagContext,
        state: &EngineState,
    ) -> EvaluationResult {
        if let Some(value) = state.overrides.get(name) {
            return EvaluationResult::new(name, value.clone(), Reason::Override);
        }

        if let Some(value) = self.external_override(name, definition) {
            return EvaluationResult::new(name, value, Reason::Override);
        }

        if let Some(value) = definition.environments.get(&state.environment) {
            return EvaluationResult::new(name, value.clone(), Reason::Environment);
        }

        if let Some(ref rollout) = definition.rollout
            && let Some(result) = rollout.evaluate(name, &definition.default_value, context)
        {
            return result;
        }

        EvaluationResult::new(name, definition.default_value.clone(), Reason::Default)
    }

    /// Parsed external override, if one is set and usable.
    fn external_override(&self, name: &str, definition: &FlagDefinition) -> Option<FlagValue> {
        let key = flag_env_key(&self.override_prefix, name);
        let raw = self.source.get(&key)?;

        let parsed = FlagValue::parse_as(definition.kind(), &raw);
        if parsed.is_none() {
            let err = FlagError::TypeMismatch {
                flag: name.to_string(),
                expected: definition.kind(),
                found: format!("{:?}", raw),
            };
            warn!("Ignoring {}: {}", key, err);
        }
        parsed
    }
}

impl std::fmt::Debug for FlagEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagEngine")
            .field("flags", &self.registry.len())
            .field("override_prefix", &self.override_prefix)
            .field("state", &*self.state.read())
            .finish()
    }
}

/// Builder for [`FlagEngine`].
pub struct EngineBuilder {
    registry: FlagRegistry,
    source: Option<Arc<dyn ConfigSource>>,
    settings: Option<EngineSettings>,
    environment: Option<String>,
}

impl EngineBuilder {
    pub fn new(registry: FlagRegistry) -> Self {
        Self {
            registry,
            source: None,
            settings: None,
            environment: None,
        }
    }

    /// Where external overrides are looked up. Defaults to [`EnvSource`].
    pub fn source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn shared_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Use these settings instead of reading them from the source.
    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Initial environment label, taking precedence over the settings.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn build(self) -> Result<FlagEngine> {
        let source = self
            .source
            .unwrap_or_else(|| Arc::new(EnvSource::new()) as Arc<dyn ConfigSource>);

        let settings = match self.settings {
            Some(settings) => settings,
            None => EngineSettings::from_source(&*source)?,
        };

        let environment = self.environment.unwrap_or(settings.environment);

        info!(
            "Flag engine ready: {} flags, environment {}",
            self.registry.len(),
            environment
        );

        Ok(FlagEngine {
            registry: self.registry,
            source,
            override_prefix: settings.override_prefix,
            state: RwLock::new(EngineState {
                overrides: HashMap::new(),
                environment,
            }),
        })
    }
}
