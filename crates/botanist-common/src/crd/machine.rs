//! MachineDeployment Custom Resource Definition
//!
//! MachineDeployments are owned by machine-controller-manager and live in the
//! shoot's seed namespace. They behave like Deployments for worker VMs.

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition type reporting that enough machines are available
pub const MACHINE_DEPLOYMENT_AVAILABLE: &str = "Available";

/// Specification for a MachineDeployment
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "machine.sapcloud.io",
    version = "v1alpha1",
    kind = "MachineDeployment",
    plural = "machinedeployments",
    status = "MachineDeploymentStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentSpec {
    /// Desired number of machines
    #[serde(default)]
    pub replicas: i32,
}

/// Observed state of a MachineDeployment
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentStatus {
    /// Machines targeted by this deployment
    #[serde(default)]
    pub replicas: i32,
    /// Machines running the latest template
    #[serde(default)]
    pub updated_replicas: i32,
    /// Machines that are ready
    #[serde(default)]
    pub ready_replicas: i32,
    /// Machines available for at least minReadySeconds
    #[serde(default)]
    pub available_replicas: i32,
    /// Latest observations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<MachineDeploymentCondition>,
}

/// A MachineDeployment condition
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineDeploymentCondition {
    /// Condition type (Available, Progressing, ReplicaFailure)
    #[serde(rename = "type")]
    pub type_: String,
    /// "True", "False" or "Unknown"
    pub status: String,
    /// Machine-readable reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Last time the status changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl MachineDeployment {
    /// Returns true while a rollout is replacing machines
    pub fn is_rolling_update(&self) -> bool {
        self.status
            .as_ref()
            .map(|s| s.replicas != s.updated_replicas)
            .unwrap_or(false)
    }

    /// Returns true if the object is being deleted
    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Conditions reported in status
    pub fn conditions(&self) -> &[MachineDeploymentCondition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or(&[])
    }
}
