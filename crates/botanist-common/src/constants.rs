//! Well-known names, labels and condition types
//!
//! Workload names are the names the component deployers give to the objects
//! they create in the seed namespace or in the shoot's `kube-system`.

// =============================================================================
// Labels
// =============================================================================

/// Label key carrying the role of a workload
pub const LABEL_ROLE: &str = "gardener.cloud/role";
/// Label key marking objects deployed into the shoot by the platform
pub const LABEL_ORIGIN: &str = "origin";
/// Value of [`LABEL_ORIGIN`] for platform-managed shoot objects
pub const ORIGIN_GARDENER: &str = "gardener";

/// Role of control-plane workloads in the seed namespace
pub const ROLE_CONTROL_PLANE: &str = "controlplane";
/// Role of monitoring workloads
pub const ROLE_MONITORING: &str = "monitoring";
/// Role of logging workloads
pub const ROLE_LOGGING: &str = "logging";
/// Role of optional addons (dashboard, nginx-ingress)
pub const ROLE_OPTIONAL_ADDON: &str = "optional-addon";

/// Namespace of the shoot's system components
pub const NAMESPACE_KUBE_SYSTEM: &str = "kube-system";

// =============================================================================
// Control plane (seed namespace)
// =============================================================================

/// gardener-resource-manager deployment
pub const DEPLOYMENT_GARDENER_RESOURCE_MANAGER: &str = "gardener-resource-manager";
/// kube-apiserver deployment
pub const DEPLOYMENT_KUBE_APISERVER: &str = "kube-apiserver";
/// kube-controller-manager deployment
pub const DEPLOYMENT_KUBE_CONTROLLER_MANAGER: &str = "kube-controller-manager";
/// kube-scheduler deployment
pub const DEPLOYMENT_KUBE_SCHEDULER: &str = "kube-scheduler";
/// machine-controller-manager deployment
pub const DEPLOYMENT_MACHINE_CONTROLLER_MANAGER: &str = "machine-controller-manager";
/// cluster-autoscaler deployment, only present when a worker pool autoscales
pub const DEPLOYMENT_CLUSTER_AUTOSCALER: &str = "cluster-autoscaler";

/// Main etcd statefulset
pub const STATEFULSET_ETCD_MAIN: &str = "etcd-main";
/// Events etcd statefulset
pub const STATEFULSET_ETCD_EVENTS: &str = "etcd-events";

// =============================================================================
// System components (shoot kube-system)
// =============================================================================

/// coredns deployment
pub const DEPLOYMENT_COREDNS: &str = "coredns";
/// vpn-shoot deployment
pub const DEPLOYMENT_VPN_SHOOT: &str = "vpn-shoot";
/// metrics-server deployment
pub const DEPLOYMENT_METRICS_SERVER: &str = "metrics-server";
/// calico-kube-controllers deployment
pub const DEPLOYMENT_CALICO_KUBE_CONTROLLERS: &str = "calico-kube-controllers";

/// kube-proxy daemonset
pub const DAEMONSET_KUBE_PROXY: &str = "kube-proxy";
/// calico-node daemonset
pub const DAEMONSET_CALICO_NODE: &str = "calico-node";
/// node-problem-detector daemonset
pub const DAEMONSET_NODE_PROBLEM_DETECTOR: &str = "node-problem-detector";

/// First platform version that deploys node-problem-detector
pub const NODE_PROBLEM_DETECTOR_MIN_VERSION: &str = "1.4.0";

// =============================================================================
// Monitoring and logging
// =============================================================================

/// node-exporter daemonset in the shoot
pub const DAEMONSET_NODE_EXPORTER: &str = "node-exporter";
/// Grafana for operators
pub const DEPLOYMENT_GRAFANA_OPERATORS: &str = "grafana-operators";
/// Grafana for users
pub const DEPLOYMENT_GRAFANA_USERS: &str = "grafana-users";
/// kube-state-metrics deployment
pub const DEPLOYMENT_KUBE_STATE_METRICS: &str = "kube-state-metrics";
/// Prometheus statefulset
pub const STATEFULSET_PROMETHEUS: &str = "prometheus";
/// Alertmanager statefulset, only present when alerting receivers exist
pub const STATEFULSET_ALERTMANAGER: &str = "alertmanager";
/// Kibana deployment
pub const DEPLOYMENT_KIBANA: &str = "kibana-logging";
/// Elasticsearch statefulset
pub const STATEFULSET_ELASTICSEARCH: &str = "elasticsearch-logging";

// =============================================================================
// Shoot condition types
// =============================================================================

/// Health of the control plane in the seed
pub const CONDITION_CONTROL_PLANE_HEALTHY: &str = "ControlPlaneHealthy";
/// Health of the shoot's nodes and machine deployments
pub const CONDITION_EVERY_NODE_READY: &str = "EveryNodeReady";
/// Health of the shoot's system components
pub const CONDITION_SYSTEM_COMPONENTS_HEALTHY: &str = "SystemComponentsHealthy";

/// Every condition type maintained by the care controller
pub const SHOOT_CONDITION_TYPES: [&str; 3] = [
    CONDITION_CONTROL_PLANE_HEALTHY,
    CONDITION_EVERY_NODE_READY,
    CONDITION_SYSTEM_COMPONENTS_HEALTHY,
];

/// Name of the secret in the seed namespace holding the shoot kubeconfig
pub const SECRET_SHOOT_KUBECONFIG: &str = "kubecfg";
/// Data key of the kubeconfig inside [`SECRET_SHOOT_KUBECONFIG`]
pub const SECRET_KEY_KUBECONFIG: &str = "kubeconfig";
