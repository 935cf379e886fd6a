//! Health checker: folds workload health into shoot conditions
//!
//! Each check lists the objects it needs, compares them against the required
//! set for its aggregate and returns `None` when everything is healthy. On the
//! first problem found it returns the next value of the given condition, as
//! computed by [`HealthChecker::failed_condition`].
//!
//! Degradation is damped by per-condition-type thresholds: a healthy condition
//! first moves to `Progressing` and only turns `False` once the threshold has
//! elapsed without recovery. Recovery is never damped.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Node;
use kube::ResourceExt;
use tracing::debug;

use botanist_common::constants::{LABEL_ROLE, ROLE_OPTIONAL_ADDON};
use botanist_common::crd::{Condition, ConditionStatus, MachineDeployment, Shoot};
use botanist_common::Error;

use crate::clock::{Clock, SystemClock};
use crate::lister::Lister;
use crate::required::{self, RequiredNames};
use crate::workload::{Health, WorkloadHealth};

/// Condition reasons set by the checks
pub mod reasons {
    /// A required deployment does not exist
    pub const DEPLOYMENT_MISSING: &str = "DeploymentMissing";
    /// A deployment is not available
    pub const DEPLOYMENT_UNHEALTHY: &str = "DeploymentUnhealthy";
    /// A required statefulset does not exist
    pub const STATEFUL_SET_MISSING: &str = "StatefulSetMissing";
    /// A statefulset has too few ready replicas
    pub const STATEFUL_SET_UNHEALTHY: &str = "StatefulSetUnhealthy";
    /// A required daemonset does not exist
    pub const DAEMON_SET_MISSING: &str = "DaemonSetMissing";
    /// A daemonset has not rolled out to every node
    pub const DAEMON_SET_UNHEALTHY: &str = "DaemonSetUnhealthy";
    /// A node is not ready
    pub const NODE_UNHEALTHY: &str = "NodeUnhealthy";
    /// A machine deployment is not available
    pub const MACHINE_DEPLOYMENT_UNHEALTHY: &str = "MachineDeploymentUnhealthy";
    /// Fewer nodes registered than machine deployments ask for
    pub const MISSING_NODES: &str = "MissingNodes";
}

/// Computes shoot conditions from workload health
#[derive(Clone)]
pub struct HealthChecker {
    thresholds: HashMap<String, Duration>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for HealthChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthChecker")
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

impl HealthChecker {
    /// Create a checker using the wall clock
    ///
    /// `thresholds` maps a condition type to its grace period. Types without
    /// an entry have none and fail immediately.
    pub fn new(thresholds: HashMap<String, Duration>) -> Self {
        Self::with_clock(thresholds, Arc::new(SystemClock))
    }

    /// Create a checker with an explicit time source
    pub fn with_clock(thresholds: HashMap<String, Duration>, clock: Arc<dyn Clock>) -> Self {
        Self { thresholds, clock }
    }

    /// Current time according to the checker's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Grace period configured for a condition type
    pub fn threshold(&self, condition_type: &str) -> Option<Duration> {
        self.thresholds.get(condition_type).copied()
    }

    /// Next value of `condition` after a failed check
    ///
    /// | previous                  | threshold     | next        |
    /// |---------------------------|---------------|-------------|
    /// | any                       | none          | False       |
    /// | True                      | set           | Progressing |
    /// | Unknown, not degraded     | set           | Progressing |
    /// | Progressing or Unknown    | not elapsed   | Progressing |
    /// | Progressing or Unknown    | elapsed       | False       |
    /// | False                     | set           | False       |
    ///
    /// Elapsed time is measured from [`Condition::degraded_since`], falling
    /// back to the transition time of a Progressing condition. An Unknown
    /// condition left by a check that could not run therefore resumes the
    /// grace period it interrupted instead of starting a new one.
    ///
    /// Reason and message always take the new values. The transition time
    /// only moves when the status changes.
    pub fn failed_condition(
        &self,
        condition: &Condition,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Condition {
        let now = self.now();
        let status = match (condition.status, self.threshold(&condition.type_)) {
            (_, None) => ConditionStatus::False,
            (ConditionStatus::True, Some(_)) => ConditionStatus::Progressing,
            (ConditionStatus::Progressing, Some(threshold)) => {
                let since = condition
                    .degraded_since
                    .unwrap_or(condition.last_transition_time);
                within_threshold(since, now, threshold)
            }
            (ConditionStatus::Unknown, Some(threshold)) => match condition.degraded_since {
                Some(since) => within_threshold(since, now, threshold),
                None => ConditionStatus::Progressing,
            },
            (ConditionStatus::False, Some(_)) => ConditionStatus::False,
        };
        condition.updated_at(status, reason, message, now)
    }

    /// Check the shoot's control plane in the seed
    ///
    /// Requires the core control-plane deployments and both etcd statefulsets.
    /// cluster-autoscaler is only required when the shoot autoscales and no
    /// machine deployment is rolling.
    pub async fn check_control_plane(
        &self,
        shoot: &Shoot,
        seed_namespace: &str,
        condition: &Condition,
        deployment_lister: &dyn Lister<Deployment>,
        stateful_set_lister: &dyn Lister<StatefulSet>,
        machine_deployment_lister: &dyn Lister<MachineDeployment>,
    ) -> Result<Option<Condition>, Error> {
        let machine_deployments =
            in_namespace(machine_deployment_lister.list().await?, seed_namespace);
        let rolling_update = machine_deployments.iter().any(|md| md.is_rolling_update());
        if rolling_update {
            debug!(
                namespace = seed_namespace,
                "machine deployment rollout in progress, not requiring cluster-autoscaler"
            );
        }

        let deployments = in_namespace(deployment_lister.list().await?, seed_namespace);
        let required_deployments =
            required::control_plane_deployments(shoot.wants_cluster_autoscaler(), rolling_update);
        if let Some(failed) = self.check_required(condition, &required_deployments, &deployments) {
            return Ok(Some(failed));
        }

        let stateful_sets = in_namespace(stateful_set_lister.list().await?, seed_namespace);
        Ok(self.check_required(
            condition,
            &required::control_plane_stateful_sets(),
            &stateful_sets,
        ))
    }

    /// Check the system components running in the shoot
    ///
    /// `gardener_version` is the platform version that last reconciled the
    /// shoot. It decides whether node-problem-detector is required.
    pub async fn check_system_components(
        &self,
        gardener_version: &str,
        shoot_namespace: &str,
        condition: &Condition,
        deployment_lister: &dyn Lister<Deployment>,
        daemon_set_lister: &dyn Lister<DaemonSet>,
    ) -> Result<Option<Condition>, Error> {
        let version = required::parse_platform_version(gardener_version)?;

        let deployments = in_namespace(deployment_lister.list().await?, shoot_namespace);
        if let Some(failed) = self.check_required(
            condition,
            &required::system_component_deployments(),
            &deployments,
        ) {
            return Ok(Some(failed));
        }

        let daemon_sets = in_namespace(daemon_set_lister.list().await?, shoot_namespace);
        Ok(self.check_required(
            condition,
            &required::system_component_daemon_sets(&version),
            &daemon_sets,
        ))
    }

    /// Check that every node is ready and enough of them are registered
    ///
    /// The expected node count is the sum of the declared replicas of all
    /// machine deployments in `seed_namespace` that are not being deleted.
    pub async fn check_cluster_nodes(
        &self,
        seed_namespace: &str,
        condition: &Condition,
        node_lister: &dyn Lister<Node>,
        machine_deployment_lister: &dyn Lister<MachineDeployment>,
    ) -> Result<Option<Condition>, Error> {
        let nodes = node_lister.list().await?;
        if let Some(failed) = self.first_unhealthy(condition, None, &nodes) {
            return Ok(Some(failed));
        }

        let machine_deployments =
            in_namespace(machine_deployment_lister.list().await?, seed_namespace);
        if let Some(failed) = self.first_unhealthy(condition, None, &machine_deployments) {
            return Ok(Some(failed));
        }

        let desired: i64 = machine_deployments
            .iter()
            .filter(|md| !md.is_deleting())
            .map(|md| i64::from(md.spec.replicas.max(0)))
            .sum();
        let registered = nodes.len() as i64;
        if registered < desired {
            debug!(registered, desired, "not enough nodes registered");
            return Ok(Some(self.failed_condition(
                condition,
                reasons::MISSING_NODES,
                format!(
                    "Not enough worker nodes registered in the cluster ({}/{}).",
                    registered, desired
                ),
            )));
        }

        Ok(None)
    }

    /// Check the monitoring components running in the shoot
    pub async fn check_monitoring_system_components(
        &self,
        shoot_namespace: &str,
        condition: &Condition,
        daemon_set_lister: &dyn Lister<DaemonSet>,
    ) -> Result<Option<Condition>, Error> {
        let daemon_sets = in_namespace(daemon_set_lister.list().await?, shoot_namespace);
        Ok(self.check_required(
            condition,
            &required::monitoring_system_component_daemon_sets(),
            &daemon_sets,
        ))
    }

    /// Check the shoot's monitoring stack in the seed
    pub async fn check_monitoring_control_plane(
        &self,
        seed_namespace: &str,
        wants_alertmanager: bool,
        condition: &Condition,
        deployment_lister: &dyn Lister<Deployment>,
        stateful_set_lister: &dyn Lister<StatefulSet>,
    ) -> Result<Option<Condition>, Error> {
        let deployments = in_namespace(deployment_lister.list().await?, seed_namespace);
        if let Some(failed) = self.check_required(
            condition,
            &required::monitoring_control_plane_deployments(),
            &deployments,
        ) {
            return Ok(Some(failed));
        }

        let stateful_sets = in_namespace(stateful_set_lister.list().await?, seed_namespace);
        Ok(self.check_required(
            condition,
            &required::monitoring_control_plane_stateful_sets(wants_alertmanager),
            &stateful_sets,
        ))
    }

    /// Check the shoot's logging stack in the seed
    pub async fn check_logging_control_plane(
        &self,
        seed_namespace: &str,
        condition: &Condition,
        deployment_lister: &dyn Lister<Deployment>,
        stateful_set_lister: &dyn Lister<StatefulSet>,
    ) -> Result<Option<Condition>, Error> {
        let deployments = in_namespace(deployment_lister.list().await?, seed_namespace);
        if let Some(failed) = self.check_required(
            condition,
            &required::logging_control_plane_deployments(),
            &deployments,
        ) {
            return Ok(Some(failed));
        }

        let stateful_sets = in_namespace(stateful_set_lister.list().await?, seed_namespace);
        Ok(self.check_required(
            condition,
            &required::logging_control_plane_stateful_sets(),
            &stateful_sets,
        ))
    }

    /// Check optional addons in the shoot
    ///
    /// Nothing is required, but every deployment or daemonset carrying the
    /// optional-addon role must be healthy.
    pub async fn check_optional_addons_system_components(
        &self,
        shoot_namespace: &str,
        condition: &Condition,
        deployment_lister: &dyn Lister<Deployment>,
        daemon_set_lister: &dyn Lister<DaemonSet>,
    ) -> Result<Option<Condition>, Error> {
        let deployments = with_role(
            in_namespace(deployment_lister.list().await?, shoot_namespace),
            ROLE_OPTIONAL_ADDON,
        );
        if let Some(failed) = self.first_unhealthy(condition, None, &deployments) {
            return Ok(Some(failed));
        }

        let daemon_sets = with_role(
            in_namespace(daemon_set_lister.list().await?, shoot_namespace),
            ROLE_OPTIONAL_ADDON,
        );
        Ok(self.first_unhealthy(condition, None, &daemon_sets))
    }

    /// Missing objects fail before unhealthy ones
    fn check_required<T: WorkloadHealth>(
        &self,
        condition: &Condition,
        required: &RequiredNames,
        objects: &[T],
    ) -> Option<Condition> {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !objects.iter().any(|o| o.name_any() == *name))
            .collect();
        if !missing.is_empty() {
            let kind = T::kind_name();
            debug!(kind = %kind, missing = ?missing, "required objects missing");
            return Some(self.failed_condition(
                condition,
                format!("{}Missing", kind),
                format!(
                    "Missing required {}s: [{}]",
                    kind.to_lowercase(),
                    missing.join(", ")
                ),
            ));
        }

        self.first_unhealthy(condition, Some(required), objects)
    }

    /// First unhealthy object, restricted to `required` names when given
    fn first_unhealthy<T: WorkloadHealth>(
        &self,
        condition: &Condition,
        required: Option<&RequiredNames>,
        objects: &[T],
    ) -> Option<Condition> {
        objects
            .iter()
            .filter(|o| required.map_or(true, |r| r.contains(o.name_any().as_str())))
            .find_map(|o| match o.health() {
                Health::Healthy => None,
                Health::Unhealthy(detail) => {
                    let kind = T::kind_name();
                    let name = o.name_any();
                    debug!(kind = %kind, name = %name, detail = %detail, "object unhealthy");
                    Some(self.failed_condition(
                        condition,
                        format!("{}Unhealthy", kind),
                        format!("{} {} is unhealthy: {}", kind, name, detail),
                    ))
                }
            })
    }
}

fn within_threshold(since: DateTime<Utc>, now: DateTime<Utc>, threshold: Duration) -> ConditionStatus {
    // A start in the future (clock skew) counts as no time spent
    let elapsed = (now - since).to_std().unwrap_or_default();
    if elapsed < threshold {
        ConditionStatus::Progressing
    } else {
        ConditionStatus::False
    }
}

fn in_namespace<T: ResourceExt>(objects: Vec<T>, namespace: &str) -> Vec<T> {
    objects
        .into_iter()
        .filter(|o| o.namespace().as_deref().map_or(true, |ns| ns == namespace))
        .collect()
}

fn with_role<T: ResourceExt>(objects: Vec<T>, role: &str) -> Vec<T> {
    objects
        .into_iter()
        .filter(|o| o.labels().get(LABEL_ROLE).map(String::as_str) == Some(role))
        .collect()
}
