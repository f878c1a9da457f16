//! Evaluation results.

use crate::value::FlagValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which precedence tier produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    Override,
    Environment,
    Rollout,
    Allowlist,
    Blocklist,
    Default,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Override => "override",
            Reason::Environment => "environment",
            Reason::Rollout => "rollout",
            Reason::Allowlist => "allowlist",
            Reason::Blocklist => "blocklist",
            Reason::Default => "default",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved value and the reason it was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub value: FlagValue,
    pub reason: Reason,
    pub flag_name: String,
}

impl EvaluationResult {
    pub fn new(flag_name: impl Into<String>, value: FlagValue, reason: Reason) -> Self {
        Self {
            value,
            reason,
            flag_name: flag_name.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.value.is_truthy()
    }
}
