//! Condition types shared by the Shoot CRD and the health checker

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reason set on conditions that have never been evaluated
pub const REASON_CONDITION_INITIALIZED: &str = "ConditionInitialized";

/// Condition status following Kubernetes conventions, extended with
/// `Progressing` for failures still inside their grace period
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    /// Condition is true
    True,
    /// Condition is false
    False,
    /// Condition is degraded but still within its threshold window
    Progressing,
    /// Condition status is unknown
    #[default]
    Unknown,
}

impl ConditionStatus {
    /// Lowercase label value used for metrics
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::Progressing => "progressing",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Progressing => write!(f, "Progressing"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Kubernetes-style condition for status reporting
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (e.g., ControlPlaneHealthy)
    #[serde(rename = "type")]
    pub type_: String,

    /// Status of the condition
    pub status: ConditionStatus,

    /// Machine-readable reason for the condition
    pub reason: String,

    /// Human-readable message
    pub message: String,

    /// Last time the status changed
    pub last_transition_time: DateTime<Utc>,

    /// Last time the condition was written, whether or not it changed
    pub last_update_time: DateTime<Utc>,

    /// Start of the current degradation
    ///
    /// Set when the condition leaves True for Progressing or False, and kept
    /// through Unknown so a failed check does not restart the grace period.
    /// Cleared once the condition is True again.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded_since: Option<DateTime<Utc>>,
}

impl Condition {
    /// Create a new condition with the current timestamp
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: now,
            last_update_time: now,
            degraded_since: None,
        }
    }

    /// Create a never-evaluated condition of the given type
    pub fn init(type_: impl Into<String>) -> Self {
        Self::new(
            type_,
            ConditionStatus::Unknown,
            REASON_CONDITION_INITIALIZED,
            "The condition has been initialized but its semantic check has not been performed yet.",
        )
    }

    /// Return the next value of this condition as of `now`
    ///
    /// The transition time only moves when the status changes; update time,
    /// reason and message always take the new values. See
    /// [`Condition::degraded_since`] for how the degradation start carries over.
    pub fn updated_at(
        &self,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let last_transition_time = if self.status == status {
            self.last_transition_time
        } else {
            now
        };
        let degraded_since = match status {
            ConditionStatus::True => None,
            ConditionStatus::Unknown => self.degraded_since,
            ConditionStatus::Progressing | ConditionStatus::False => {
                Some(self.degraded_since.unwrap_or(now))
            }
        };
        Self {
            type_: self.type_.clone(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time,
            last_update_time: now,
            degraded_since,
        }
    }
}

/// Find a condition by type
pub fn get_condition<'a>(conditions: &'a [Condition], type_: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.type_ == type_)
}

/// Replace conditions by type, appending the ones not present yet
///
/// Order of existing conditions is kept so that status diffs stay small.
pub fn merge_conditions(existing: &[Condition], updates: &[Condition]) -> Vec<Condition> {
    let mut merged: Vec<Condition> = existing.to_vec();
    for update in updates {
        match merged.iter_mut().find(|c| c.type_ == update.type_) {
            Some(slot) => *slot = update.clone(),
            None => merged.push(update.clone()),
        }
    }
    merged
}
