//! Per-object health of the workload kinds the checker looks at

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Node;
use kube::{Resource, ResourceExt};

use botanist_common::crd::{MachineDeployment, MACHINE_DEPLOYMENT_AVAILABLE};
use botanist_common::kube_utils::{find_condition, HasConditionFields, STATUS_TRUE};

/// Health of a single object
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Health {
    /// Object is healthy
    Healthy,
    /// Object is unhealthy, with a short explanation
    Unhealthy(String),
}

impl Health {
    /// Returns true for [`Health::Healthy`]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// An object whose health the checker can judge
pub trait WorkloadHealth: Resource<DynamicType = ()> + ResourceExt {
    /// Judge the object's health from its status
    fn health(&self) -> Health;

    /// Kind name used in messages
    fn kind_name() -> String {
        Self::kind(&()).into_owned()
    }
}

fn condition_health<T: HasConditionFields>(
    conditions: Option<&[T]>,
    condition_type: &str,
) -> Health {
    match find_condition(conditions, condition_type) {
        Some(c) if c.status_field() == STATUS_TRUE => Health::Healthy,
        Some(c) => Health::Unhealthy(format!(
            "condition {} has status {}",
            condition_type,
            c.status_field()
        )),
        None => Health::Unhealthy(format!("condition {} is missing", condition_type)),
    }
}

/// Healthy iff the Available condition is True
impl WorkloadHealth for Deployment {
    fn health(&self) -> Health {
        let conditions = self.status.as_ref().and_then(|s| s.conditions.as_deref());
        condition_health(conditions, "Available")
    }
}

/// Healthy iff at least the declared number of replicas (default 1) is ready
impl WorkloadHealth for StatefulSet {
    fn health(&self) -> Health {
        let declared = self.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1);
        let ready = self
            .status
            .as_ref()
            .and_then(|s| s.ready_replicas)
            .unwrap_or(0);
        if ready >= declared {
            Health::Healthy
        } else {
            Health::Unhealthy(format!("not enough ready replicas ({}/{})", ready, declared))
        }
    }
}

/// Healthy iff no pods are desired, or every desired pod is scheduled and ready
///
/// A daemon set with zero desired pods counts as healthy even when the reason
/// is that no node is eligible; the two cases are indistinguishable here.
///
/// Past that shortcut the scheduled, misscheduled and ready counts are
/// checked the way upstream Kubernetes judges a DaemonSet rollout healthy.
impl WorkloadHealth for DaemonSet {
    fn health(&self) -> Health {
        let Some(status) = self.status.as_ref() else {
            return Health::Unhealthy("status is missing".to_string());
        };
        let desired = status.desired_number_scheduled;
        if desired == 0 {
            return Health::Healthy;
        }
        if status.current_number_scheduled < desired {
            return Health::Unhealthy(format!(
                "not enough scheduled pods ({}/{})",
                status.current_number_scheduled, desired
            ));
        }
        if status.number_misscheduled > 0 {
            return Health::Unhealthy(format!(
                "misscheduled pods found ({})",
                status.number_misscheduled
            ));
        }
        if status.number_ready < desired {
            return Health::Unhealthy(format!(
                "not enough ready pods ({}/{})",
                status.number_ready, desired
            ));
        }
        Health::Healthy
    }
}

/// Healthy iff the Ready condition is True
impl WorkloadHealth for Node {
    fn health(&self) -> Health {
        let conditions = self.status.as_ref().and_then(|s| s.conditions.as_deref());
        condition_health(conditions, "Ready")
    }
}

/// Healthy iff the Available condition is True
impl WorkloadHealth for MachineDeployment {
    fn health(&self) -> Health {
        condition_health(Some(self.conditions()), MACHINE_DEPLOYMENT_AVAILABLE)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn deployment_health_follows_available_condition() {
        assert!(deployment("a", "ns", true).health().is_healthy());
        assert_eq!(
            deployment("a", "ns", false).health(),
            Health::Unhealthy("condition Available has status False".to_string())
        );

        let mut no_status = deployment("a", "ns", true);
        no_status.status = None;
        assert_eq!(
            no_status.health(),
            Health::Unhealthy("condition Available is missing".to_string())
        );
    }

    #[test]
    fn stateful_set_needs_declared_ready_replicas() {
        assert!(stateful_set("etcd-main", "ns", 1).health().is_healthy());
        assert!(!stateful_set("etcd-main", "ns", 0).health().is_healthy());

        let mut three = stateful_set("etcd-main", "ns", 2);
        three.spec.as_mut().unwrap().replicas = Some(3);
        assert_eq!(
            three.health(),
            Health::Unhealthy("not enough ready replicas (2/3)".to_string())
        );

        // Without a declared count one ready replica is enough
        let mut undeclared = stateful_set("etcd-main", "ns", 1);
        undeclared.spec = None;
        assert!(undeclared.health().is_healthy());
    }

    #[test]
    fn daemon_set_with_zero_desired_is_healthy() {
        // Zero desired pods cannot be told apart from "no eligible nodes";
        // both count as healthy.
        assert!(daemon_set("kube-proxy", "kube-system", 0, 0).health().is_healthy());
    }

    #[test]
    fn daemon_set_with_missing_pods_is_unhealthy() {
        assert!(daemon_set("kube-proxy", "kube-system", 3, 3).health().is_healthy());
        assert_eq!(
            daemon_set("kube-proxy", "kube-system", 3, 2).health(),
            Health::Unhealthy("not enough ready pods (2/3)".to_string())
        );

        let mut unscheduled = daemon_set("kube-proxy", "kube-system", 3, 3);
        unscheduled.status.as_mut().unwrap().current_number_scheduled = 1;
        assert_eq!(
            unscheduled.health(),
            Health::Unhealthy("not enough scheduled pods (1/3)".to_string())
        );

        let mut misscheduled = daemon_set("kube-proxy", "kube-system", 3, 3);
        misscheduled.status.as_mut().unwrap().number_misscheduled = 1;
        assert!(!misscheduled.health().is_healthy());

        let mut no_status = daemon_set("kube-proxy", "kube-system", 3, 3);
        no_status.status = None;
        assert!(!no_status.health().is_healthy());
    }

    #[test]
    fn daemon_set_rollout_checks_follow_upstream_order() {
        // Scheduling is reported before readiness, and a misscheduled pod
        // fails the set even when every desired pod is ready.
        let mut rolling = daemon_set("kube-proxy", "kube-system", 3, 1);
        rolling.status.as_mut().unwrap().current_number_scheduled = 2;
        assert_eq!(
            rolling.health(),
            Health::Unhealthy("not enough scheduled pods (2/3)".to_string())
        );

        let mut misscheduled = daemon_set("kube-proxy", "kube-system", 3, 3);
        misscheduled.status.as_mut().unwrap().number_misscheduled = 2;
        assert_eq!(
            misscheduled.health(),
            Health::Unhealthy("misscheduled pods found (2)".to_string())
        );
    }

    #[test]
    fn node_and_machine_deployment_health() {
        assert!(node("node-0", true).health().is_healthy());
        assert!(!node("node-0", false).health().is_healthy());

        assert!(machine_deployment("pool", "ns", 2, 2, true)
            .health()
            .is_healthy());
        assert!(!machine_deployment("pool", "ns", 2, 2, false)
            .health()
            .is_healthy());
    }

    #[test]
    fn kind_names() {
        assert_eq!(Deployment::kind_name(), "Deployment");
        assert_eq!(MachineDeployment::kind_name(), "MachineDeployment");
    }
}
