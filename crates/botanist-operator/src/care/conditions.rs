//! The three shoot conditions and how check outcomes map onto them

use chrono::{DateTime, Utc};
use tracing::warn;

use botanist_common::constants::{
    CONDITION_CONTROL_PLANE_HEALTHY, CONDITION_EVERY_NODE_READY,
    CONDITION_SYSTEM_COMPONENTS_HEALTHY,
};
use botanist_common::crd::{get_condition, Condition, ConditionStatus};
use botanist_common::Error;

/// Reason set when checks are skipped for a hibernated shoot
pub const REASON_CONDITION_NOT_CHECKED: &str = "ConditionNotChecked";

const HIBERNATED_MESSAGE: &str = "Shoot cluster has been hibernated.";

/// Reason and message of a condition whose checks all passed
fn healthy_reason(condition_type: &str) -> (&'static str, &'static str) {
    match condition_type {
        CONDITION_CONTROL_PLANE_HEALTHY => (
            "ControlPlaneRunning",
            "All control plane components are healthy.",
        ),
        CONDITION_EVERY_NODE_READY => (
            "EveryNodeReady",
            "Every node registered to the cluster is ready.",
        ),
        CONDITION_SYSTEM_COMPONENTS_HEALTHY => (
            "SystemComponentsRunning",
            "All system components are healthy.",
        ),
        _ => ("Healthy", "All checks passed."),
    }
}

/// The conditions the care controller owns on a shoot
#[derive(Clone, Debug, PartialEq)]
pub struct ShootConditions {
    /// ControlPlaneHealthy
    pub control_plane: Condition,
    /// EveryNodeReady
    pub nodes: Condition,
    /// SystemComponentsHealthy
    pub system_components: Condition,
}

impl ShootConditions {
    /// Pick the owned conditions out of a shoot's status
    ///
    /// Conditions that were never written start as Unknown.
    pub fn from_existing(existing: &[Condition]) -> Self {
        let pick = |type_: &str| {
            get_condition(existing, type_)
                .cloned()
                .unwrap_or_else(|| Condition::init(type_))
        };
        Self {
            control_plane: pick(CONDITION_CONTROL_PLANE_HEALTHY),
            nodes: pick(CONDITION_EVERY_NODE_READY),
            system_components: pick(CONDITION_SYSTEM_COMPONENTS_HEALTHY),
        }
    }

    /// Conditions of a hibernated shoot: nothing runs, nothing is checked
    pub fn hibernated(&self, now: DateTime<Utc>) -> Self {
        let skip = |c: &Condition| {
            c.updated_at(
                ConditionStatus::True,
                REASON_CONDITION_NOT_CHECKED,
                HIBERNATED_MESSAGE,
                now,
            )
        };
        Self {
            control_plane: skip(&self.control_plane),
            nodes: skip(&self.nodes),
            system_components: skip(&self.system_components),
        }
    }

    /// Iterate in a fixed order
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        [&self.control_plane, &self.nodes, &self.system_components].into_iter()
    }

    /// Owned copies in a fixed order
    pub fn to_vec(&self) -> Vec<Condition> {
        self.iter().cloned().collect()
    }
}

/// Fold the outcome of a check into the next condition value
///
/// A passing check sets the condition True right away. A failed check already
/// carries its next value. A check that could not run leaves the health
/// Unknown.
pub fn resolve(
    previous: &Condition,
    outcome: Result<Option<Condition>, Error>,
    now: DateTime<Utc>,
) -> Condition {
    match outcome {
        Ok(None) => {
            let (reason, message) = healthy_reason(&previous.type_);
            previous.updated_at(ConditionStatus::True, reason, message, now)
        }
        Ok(Some(failed)) => failed,
        Err(e) => check_error(previous, &e, now),
    }
}

/// Next value of a condition whose check could not run
pub fn check_error(previous: &Condition, error: &Error, now: DateTime<Utc>) -> Condition {
    warn!(condition = %previous.type_, error = %error, "health check failed");
    previous.updated_at(
        ConditionStatus::Unknown,
        format!("{}CheckError", previous.type_),
        error.to_string(),
        now,
    )
}

/// Returns true when a condition has just turned False
pub fn turned_false(before: &Condition, after: &Condition) -> bool {
    after.status == ConditionStatus::False && before.status != ConditionStatus::False
}

/// Returns true when a degraded condition has just turned True again
pub fn recovered(before: &Condition, after: &Condition) -> bool {
    after.status == ConditionStatus::True
        && matches!(
            before.status,
            ConditionStatus::False | ConditionStatus::Progressing
        )
}
