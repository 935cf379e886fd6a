//! Shoot Custom Resource Definition
//!
//! A Shoot is a managed Kubernetes cluster whose control plane runs in a
//! namespace of the seed cluster. Only the fields the care controller reads
//! are modelled here.

use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::Condition;

/// Specification for a Shoot
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "core.gardener.cloud",
    version = "v1beta1",
    kind = "Shoot",
    plural = "shoots",
    status = "ShootStatus",
    namespaced,
    printcolumn = r#"{"name":"K8s","type":"string","jsonPath":".spec.kubernetes.version"}"#,
    printcolumn = r#"{"name":"Hibernated","type":"boolean","jsonPath":".status.isHibernated"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ShootSpec {
    /// Kubernetes settings of the shoot
    #[serde(default)]
    pub kubernetes: KubernetesSpec,

    /// Worker pools
    #[serde(default)]
    pub provider: ProviderSpec,

    /// Hibernation settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hibernation: Option<Hibernation>,

    /// Monitoring settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring: Option<Monitoring>,

    /// Optional addons deployed into the shoot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addons: Option<Addons>,
}

/// Kubernetes settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesSpec {
    /// Kubernetes version (e.g., "1.31.2")
    #[serde(default)]
    pub version: String,
}

/// Infrastructure provider settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    /// Worker pools backing the shoot's nodes
    #[serde(default)]
    pub workers: Vec<Worker>,
}

/// A worker pool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    /// Pool name
    pub name: String,
    /// Minimum number of machines
    pub minimum: i32,
    /// Maximum number of machines
    pub maximum: i32,
}

/// Hibernation settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hibernation {
    /// Whether the shoot should be hibernated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Monitoring settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Monitoring {
    /// Alerting settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerting: Option<Alerting>,
}

/// Alerting settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alerting {
    /// E-mail receivers of shoot alerts
    #[serde(default)]
    pub email_receivers: Vec<String>,
}

/// Optional addons
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Addons {
    /// Kubernetes dashboard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_dashboard: Option<Addon>,
    /// nginx ingress controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nginx_ingress: Option<Addon>,
}

/// Toggle for a single addon
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    /// Whether the addon is deployed
    pub enabled: bool,
}

/// Observed state of a Shoot
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShootStatus {
    /// Health conditions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Name of the control-plane namespace in the seed
    #[serde(rename = "technicalID", default, skip_serializing_if = "Option::is_none")]
    pub technical_id: Option<String>,

    /// Platform that last reconciled the shoot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gardener: Option<GardenerInfo>,

    /// Whether the shoot is currently hibernated
    #[serde(default)]
    pub is_hibernated: bool,

    /// Generation last acted upon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// Version information of the reconciling platform
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GardenerInfo {
    /// Semantic version (e.g., "1.4.2")
    pub version: String,
}

/// Project namespaces are prefixed with this; the seed namespace drops it
const PROJECT_NAMESPACE_PREFIX: &str = "garden-";

impl Shoot {
    /// Returns true if any worker pool can scale (maximum above minimum)
    pub fn wants_cluster_autoscaler(&self) -> bool {
        self.spec
            .provider
            .workers
            .iter()
            .any(|w| w.maximum > w.minimum)
    }

    /// Returns true if alerting e-mail receivers are configured
    pub fn wants_alertmanager(&self) -> bool {
        self.spec
            .monitoring
            .as_ref()
            .and_then(|m| m.alerting.as_ref())
            .map(|a| !a.email_receivers.is_empty())
            .unwrap_or(false)
    }

    /// Returns true if hibernation is requested or already in effect
    pub fn is_hibernated(&self) -> bool {
        let requested = self
            .spec
            .hibernation
            .as_ref()
            .and_then(|h| h.enabled)
            .unwrap_or(false);
        let observed = self.status.as_ref().map(|s| s.is_hibernated).unwrap_or(false);
        requested || observed
    }

    /// Namespace in the seed that hosts this shoot's control plane
    ///
    /// Uses `status.technicalID` when set, otherwise derives
    /// `shoot--<project>--<name>` from the project namespace.
    pub fn seed_namespace(&self) -> String {
        if let Some(id) = self.status.as_ref().and_then(|s| s.technical_id.as_ref()) {
            if !id.is_empty() {
                return id.clone();
            }
        }
        let namespace = self.namespace().unwrap_or_default();
        let project = namespace
            .strip_prefix(PROJECT_NAMESPACE_PREFIX)
            .unwrap_or(&namespace);
        format!("shoot--{}--{}", project, self.name_any())
    }

    /// Version of the platform that last reconciled this shoot
    pub fn gardener_version(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.gardener.as_ref())
            .map(|g| g.version.as_str())
    }

    /// Current conditions, empty when no status has been written yet
    pub fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_shoot(workers: Vec<(i32, i32)>) -> Shoot {
        let mut shoot = Shoot::new(
            "alpha",
            ShootSpec {
                provider: ProviderSpec {
                    workers: workers
                        .into_iter()
                        .enumerate()
                        .map(|(i, (minimum, maximum))| Worker {
                            name: format!("pool-{i}"),
                            minimum,
                            maximum,
                        })
                        .collect(),
                },
                ..Default::default()
            },
        );
        shoot.metadata.namespace = Some("garden-dev".to_string());
        shoot
    }

    #[test]
    fn test_wants_cluster_autoscaler() {
        assert!(!make_shoot(vec![]).wants_cluster_autoscaler());
        assert!(!make_shoot(vec![(2, 2)]).wants_cluster_autoscaler());
        assert!(make_shoot(vec![(2, 2), (1, 3)]).wants_cluster_autoscaler());
    }

    #[test]
    fn test_wants_alertmanager() {
        let mut shoot = make_shoot(vec![]);
        assert!(!shoot.wants_alertmanager());

        shoot.spec.monitoring = Some(Monitoring {
            alerting: Some(Alerting {
                email_receivers: vec![],
            }),
        });
        assert!(!shoot.wants_alertmanager());

        shoot.spec.monitoring = Some(Monitoring {
            alerting: Some(Alerting {
                email_receivers: vec!["ops@example.com".to_string()],
            }),
        });
        assert!(shoot.wants_alertmanager());
    }

    #[test]
    fn test_seed_namespace_prefers_technical_id() {
        let mut shoot = make_shoot(vec![]);
        assert_eq!(shoot.seed_namespace(), "shoot--dev--alpha");

        shoot.status = Some(ShootStatus {
            technical_id: Some("shoot--legacy--alpha".to_string()),
            ..Default::default()
        });
        assert_eq!(shoot.seed_namespace(), "shoot--legacy--alpha");
    }

    #[test]
    fn test_is_hibernated() {
        let mut shoot = make_shoot(vec![]);
        assert!(!shoot.is_hibernated());

        shoot.spec.hibernation = Some(Hibernation {
            enabled: Some(true),
        });
        assert!(shoot.is_hibernated());

        shoot.spec.hibernation = None;
        shoot.status = Some(ShootStatus {
            is_hibernated: true,
            ..Default::default()
        });
        assert!(shoot.is_hibernated());
    }

    #[test]
    fn test_deserializes_from_yaml() {
        let yaml = r#"
apiVersion: core.gardener.cloud/v1beta1
kind: Shoot
metadata:
  name: alpha
  namespace: garden-dev
spec:
  kubernetes:
    version: "1.31.2"
  provider:
    workers:
      - name: main
        minimum: 1
        maximum: 3
status:
  technicalID: shoot--dev--alpha
  gardener:
    version: "1.5.0"
  conditions:
    - type: EveryNodeReady
      status: Progressing
      reason: NodeUnhealthy
      message: node-0 is not ready
      lastTransitionTime: "2024-01-01T00:00:00Z"
      lastUpdateTime: "2024-01-01T00:01:00Z"
"#;
        let shoot: Shoot = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(shoot.spec.kubernetes.version, "1.31.2");
        assert!(shoot.wants_cluster_autoscaler());
        assert_eq!(shoot.gardener_version(), Some("1.5.0"));
        assert_eq!(shoot.conditions().len(), 1);
        assert_eq!(
            shoot.conditions()[0].status,
            crate::crd::ConditionStatus::Progressing
        );
    }
}
