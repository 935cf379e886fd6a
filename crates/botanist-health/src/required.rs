//! Workloads each aggregate expects to find
//!
//! The sets are static apart from a few entries that depend on the shoot
//! (autoscaling, alerting) or on the platform version that deployed it.

use std::collections::BTreeSet;

use semver::Version;

use botanist_common::constants::*;
use botanist_common::Error;

/// Names of required objects of one kind
pub type RequiredNames = BTreeSet<&'static str>;

/// Control-plane deployments in the seed namespace
///
/// cluster-autoscaler is required only when the shoot autoscales and no
/// machine rollout is in progress: it is scaled down during rollouts.
pub fn control_plane_deployments(wants_autoscaler: bool, rolling_update: bool) -> RequiredNames {
    let mut names = RequiredNames::from([
        DEPLOYMENT_GARDENER_RESOURCE_MANAGER,
        DEPLOYMENT_KUBE_APISERVER,
        DEPLOYMENT_KUBE_CONTROLLER_MANAGER,
        DEPLOYMENT_KUBE_SCHEDULER,
        DEPLOYMENT_MACHINE_CONTROLLER_MANAGER,
    ]);
    if wants_autoscaler && !rolling_update {
        names.insert(DEPLOYMENT_CLUSTER_AUTOSCALER);
    }
    names
}

/// Control-plane statefulsets in the seed namespace
pub fn control_plane_stateful_sets() -> RequiredNames {
    RequiredNames::from([STATEFULSET_ETCD_MAIN, STATEFULSET_ETCD_EVENTS])
}

/// System-component deployments in the shoot's kube-system
pub fn system_component_deployments() -> RequiredNames {
    RequiredNames::from([
        DEPLOYMENT_COREDNS,
        DEPLOYMENT_VPN_SHOOT,
        DEPLOYMENT_METRICS_SERVER,
        DEPLOYMENT_CALICO_KUBE_CONTROLLERS,
    ])
}

/// System-component daemonsets in the shoot's kube-system
///
/// node-problem-detector is only deployed by platform versions at or above
/// [`NODE_PROBLEM_DETECTOR_MIN_VERSION`].
pub fn system_component_daemon_sets(platform_version: &Version) -> RequiredNames {
    let mut names = RequiredNames::from([DAEMONSET_KUBE_PROXY, DAEMONSET_CALICO_NODE]);
    if *platform_version >= node_problem_detector_min_version() {
        names.insert(DAEMONSET_NODE_PROBLEM_DETECTOR);
    }
    names
}

fn node_problem_detector_min_version() -> Version {
    Version::new(1, 4, 0)
}

/// Monitoring daemonsets in the shoot
pub fn monitoring_system_component_daemon_sets() -> RequiredNames {
    RequiredNames::from([DAEMONSET_NODE_EXPORTER])
}

/// Monitoring deployments in the seed namespace
pub fn monitoring_control_plane_deployments() -> RequiredNames {
    RequiredNames::from([
        DEPLOYMENT_GRAFANA_OPERATORS,
        DEPLOYMENT_GRAFANA_USERS,
        DEPLOYMENT_KUBE_STATE_METRICS,
    ])
}

/// Monitoring statefulsets in the seed namespace
pub fn monitoring_control_plane_stateful_sets(wants_alertmanager: bool) -> RequiredNames {
    let mut names = RequiredNames::from([STATEFULSET_PROMETHEUS]);
    if wants_alertmanager {
        names.insert(STATEFULSET_ALERTMANAGER);
    }
    names
}

/// Logging deployments in the seed namespace
pub fn logging_control_plane_deployments() -> RequiredNames {
    RequiredNames::from([DEPLOYMENT_KIBANA])
}

/// Logging statefulsets in the seed namespace
pub fn logging_control_plane_stateful_sets() -> RequiredNames {
    RequiredNames::from([STATEFULSET_ELASTICSEARCH])
}

/// Parse a platform version, tolerating a leading "v"
pub fn parse_platform_version(version: &str) -> Result<Version, Error> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).map_err(|e| {
        Error::validation(format!("invalid platform version {:?}: {}", version, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_version_constant_matches() {
        assert_eq!(
            parse_platform_version(NODE_PROBLEM_DETECTOR_MIN_VERSION).unwrap(),
            node_problem_detector_min_version()
        );
    }

    #[test]
    fn test_cluster_autoscaler_requirement() {
        assert!(!control_plane_deployments(false, false).contains(DEPLOYMENT_CLUSTER_AUTOSCALER));
        assert!(control_plane_deployments(true, false).contains(DEPLOYMENT_CLUSTER_AUTOSCALER));
        assert!(!control_plane_deployments(true, true).contains(DEPLOYMENT_CLUSTER_AUTOSCALER));
        assert_eq!(control_plane_deployments(false, false).len(), 5);
    }

    #[test]
    fn test_node_problem_detector_gate() {
        let old = parse_platform_version("1.3.9").unwrap();
        let boundary = parse_platform_version("v1.4.0").unwrap();
        let newer = parse_platform_version("1.10.0").unwrap();

        assert!(!system_component_daemon_sets(&old).contains(DAEMONSET_NODE_PROBLEM_DETECTOR));
        assert!(system_component_daemon_sets(&boundary).contains(DAEMONSET_NODE_PROBLEM_DETECTOR));
        assert!(system_component_daemon_sets(&newer).contains(DAEMONSET_NODE_PROBLEM_DETECTOR));
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        let dev = parse_platform_version("1.4.0-dev").unwrap();
        assert!(!system_component_daemon_sets(&dev).contains(DAEMONSET_NODE_PROBLEM_DETECTOR));
    }

    #[test]
    fn test_alertmanager_requirement() {
        assert!(!monitoring_control_plane_stateful_sets(false).contains(STATEFULSET_ALERTMANAGER));
        assert!(monitoring_control_plane_stateful_sets(true).contains(STATEFULSET_ALERTMANAGER));
    }

    #[test]
    fn test_invalid_version() {
        let err = parse_platform_version("latest").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(err.to_string().contains("latest"));
    }
}
