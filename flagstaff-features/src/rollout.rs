//! Gradual rollout
//!
//! Percentage rollout with explicit allow and block lists. Membership is
//! decided per flag from the hash of `"<flag>:<identifier>"`, so a user keeps
//! the same answer for a flag across calls and processes.

use crate::context::FlagContext;
use crate::hash;
use crate::result::{EvaluationResult, Reason};
use crate::value::FlagValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Gradual rollout configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutRule {
    /// Share of identified contexts (0-100) that get the enabled value
    pub percentage: u8,

    /// Identifiers that always get the enabled value
    #[serde(default)]
    pub allowlist: BTreeSet<String>,

    /// Identifiers that always get the default value, even if allowlisted
    #[serde(default)]
    pub blocklist: BTreeSet<String>,
}

impl RolloutRule {
    /// Roll out to `percentage` percent, capped at 100.
    pub fn new(percentage: u8) -> Self {
        Self {
            percentage: percentage.min(100),
            ..Self::default()
        }
    }

    pub fn allow(mut self, identifier: impl Into<String>) -> Self {
        self.allowlist.insert(identifier.into());
        self
    }

    pub fn block(mut self, identifier: impl Into<String>) -> Self {
        self.blocklist.insert(identifier.into());
        self
    }

    pub fn with_allowlist<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowlist.extend(identifiers.into_iter().map(Into::into));
        self
    }

    pub fn with_blocklist<I, S>(mut self, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocklist.extend(identifiers.into_iter().map(Into::into));
        self
    }

    /// Whether `identifier` falls inside the percentage bucket for `flag_name`.
    pub fn includes(&self, flag_name: &str, identifier: &str) -> bool {
        hash::rollout_bucket(flag_name, identifier) < self.percentage
    }

    /// Apply the rule to `context`.
    ///
    /// Returns `None` when the rule does not decide the value: anonymous
    /// contexts, and identifiers outside every list and the bucket.
    pub fn evaluate(
        &self,
        flag_name: &str,
        default_value: &FlagValue,
        context: &FlagContext,
    ) -> Option<EvaluationResult> {
        let identifier = context.identifier()?;

        if self.blocklist.contains(identifier) {
            return Some(EvaluationResult::new(
                flag_name,
                default_value.clone(),
                Reason::Blocklist,
            ));
        }

        let enabled = FlagValue::enabled_for(default_value);

        if self.allowlist.contains(identifier) {
            return Some(EvaluationResult::new(flag_name, enabled, Reason::Allowlist));
        }

        if self.includes(flag_name, identifier) {
            return Some(EvaluationResult::new(flag_name, enabled, Reason::Rollout));
        }

        None
    }
}
