//! Listers the care controller hands to the health checker

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::Node;
use kube::Client;

use botanist_common::constants::{
    LABEL_ORIGIN, LABEL_ROLE, NAMESPACE_KUBE_SYSTEM, ORIGIN_GARDENER, ROLE_CONTROL_PLANE,
    ROLE_LOGGING, ROLE_MONITORING, ROLE_OPTIONAL_ADDON,
};
use botanist_common::crd::MachineDeployment;
use botanist_health::{ApiLister, Lister};

/// Objects in the shoot's control-plane namespace of the seed
pub struct SeedListers {
    /// Deployments in the seed namespace
    pub deployments: Box<dyn Lister<Deployment>>,
    /// StatefulSets in the seed namespace
    pub stateful_sets: Box<dyn Lister<StatefulSet>>,
    /// MachineDeployments in the seed namespace
    pub machine_deployments: Box<dyn Lister<MachineDeployment>>,
}

impl SeedListers {
    /// API-backed listers for one seed namespace
    ///
    /// Workloads are limited to the control-plane, monitoring and logging
    /// roles; machine deployments carry no role label.
    pub fn for_namespace(client: Client, namespace: &str) -> Self {
        let roles = seed_role_selector();
        Self {
            deployments: Box::new(ApiLister::<Deployment>::namespaced(
                client.clone(),
                namespace,
                Some(&roles),
            )),
            stateful_sets: Box::new(ApiLister::<StatefulSet>::namespaced(
                client.clone(),
                namespace,
                Some(&roles),
            )),
            machine_deployments: Box::new(ApiLister::<MachineDeployment>::namespaced(
                client, namespace, None,
            )),
        }
    }
}

fn seed_role_selector() -> String {
    format!(
        "{} in ({},{},{})",
        LABEL_ROLE, ROLE_CONTROL_PLANE, ROLE_MONITORING, ROLE_LOGGING
    )
}

/// Objects inside the shoot cluster
pub struct ShootListers {
    /// Platform-managed deployments in kube-system
    pub deployments: Box<dyn Lister<Deployment>>,
    /// Platform-managed daemonsets in kube-system
    pub daemon_sets: Box<dyn Lister<DaemonSet>>,
    /// Optional addon deployments in kube-system
    pub addon_deployments: Box<dyn Lister<Deployment>>,
    /// Optional addon daemonsets in kube-system
    pub addon_daemon_sets: Box<dyn Lister<DaemonSet>>,
    /// Every node
    pub nodes: Box<dyn Lister<Node>>,
}

impl ShootListers {
    /// API-backed listers for a shoot cluster
    pub fn from_client(client: Client) -> Self {
        let origin = format!("{}={}", LABEL_ORIGIN, ORIGIN_GARDENER);
        let addon = format!("{}={}", LABEL_ROLE, ROLE_OPTIONAL_ADDON);
        Self {
            deployments: Box::new(ApiLister::<Deployment>::namespaced(
                client.clone(),
                NAMESPACE_KUBE_SYSTEM,
                Some(&origin),
            )),
            daemon_sets: Box::new(ApiLister::<DaemonSet>::namespaced(
                client.clone(),
                NAMESPACE_KUBE_SYSTEM,
                Some(&origin),
            )),
            addon_deployments: Box::new(ApiLister::<Deployment>::namespaced(
                client.clone(),
                NAMESPACE_KUBE_SYSTEM,
                Some(&addon),
            )),
            addon_daemon_sets: Box::new(ApiLister::<DaemonSet>::namespaced(
                client.clone(),
                NAMESPACE_KUBE_SYSTEM,
                Some(&addon),
            )),
            nodes: Box::new(ApiLister::<Node>::all(client, None)),
        }
    }
}
