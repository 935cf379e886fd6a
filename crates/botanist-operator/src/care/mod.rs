//! Shoot care controller
//!
//! Periodically checks every shoot and keeps its `ControlPlaneHealthy`,
//! `EveryNodeReady` and `SystemComponentsHealthy` conditions current.
//! Reconciliation never fails because a workload is unhealthy; that is what
//! the conditions report. It fails only when the status cannot be written.

pub mod client;
pub mod conditions;
pub mod health;
pub mod listers;

use std::sync::Arc;
use std::time::Duration;

use kube::runtime::controller::Action;
use kube::runtime::events::EventType;
use kube::{Client, Resource, ResourceExt};
use tracing::{debug, error, info, instrument, warn};

use botanist_common::crd::{merge_conditions, Shoot};
use botanist_common::events::{actions, reasons, EventPublisher, KubeEventPublisher};
use botanist_common::metrics::record_condition_status;
use botanist_common::Error;
use botanist_health::HealthChecker;

use crate::config::CareConfig;

pub use client::{CareClient, KubeCareClient, SecretShootClientProvider, ShootClientProvider};
pub use conditions::ShootConditions;
pub use listers::{SeedListers, ShootListers};

/// Name the controller reports events under
pub const CONTROLLER_NAME: &str = "botanist-care-controller";

/// Requeue delay after a failed reconciliation
const ERROR_REQUEUE: Duration = Duration::from_secs(5);

/// Shared state of the care controller
pub struct Context {
    /// Cluster access (trait object for testability)
    pub care: Arc<dyn CareClient>,
    /// Health checker configured with the condition thresholds
    pub checker: HealthChecker,
    /// Controller configuration
    pub config: CareConfig,
    /// Event publisher for condition transitions
    pub events: Arc<dyn EventPublisher>,
}

impl Context {
    /// Create a context from its parts
    pub fn new(
        care: Arc<dyn CareClient>,
        checker: HealthChecker,
        config: CareConfig,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            care,
            checker,
            config,
            events,
        }
    }

    /// Production context for a seed client
    pub fn from_client(client: Client, config: CareConfig) -> Self {
        let shoot_clients = Arc::new(SecretShootClientProvider::new(client.clone()));
        let care = Arc::new(KubeCareClient::new(client.clone(), shoot_clients));
        let events = Arc::new(KubeEventPublisher::new(client, CONTROLLER_NAME));
        let checker = HealthChecker::new(config.thresholds());
        Self::new(care, checker, config, events)
    }
}

/// Check a shoot and write its conditions
#[instrument(skip(shoot, ctx), fields(shoot = %shoot.name_any()))]
pub async fn reconcile(shoot: Arc<Shoot>, ctx: Arc<Context>) -> Result<Action, Error> {
    let previous = ShootConditions::from_existing(shoot.conditions());

    let next = if shoot.is_hibernated() {
        debug!("shoot is hibernated, skipping health checks");
        previous.hibernated(ctx.checker.now())
    } else {
        evaluate(&shoot, &previous, &ctx).await
    };

    let merged = merge_conditions(shoot.conditions(), &next.to_vec());
    ctx.care.patch_conditions(&shoot, &merged).await?;

    publish_transitions(&shoot, &previous, &next, ctx.events.as_ref()).await;

    let key = format!(
        "{}/{}",
        shoot.namespace().unwrap_or_default(),
        shoot.name_any()
    );
    for condition in next.iter() {
        record_condition_status(&key, &condition.type_, condition.status);
    }

    info!(
        control_plane = %next.control_plane.status,
        nodes = %next.nodes.status,
        system_components = %next.system_components.status,
        "shoot conditions updated"
    );
    Ok(Action::requeue(ctx.config.sync_period()))
}

/// Run every check and compute the next conditions
async fn evaluate(shoot: &Shoot, previous: &ShootConditions, ctx: &Context) -> ShootConditions {
    let checker = &ctx.checker;
    let features = &ctx.config.features;
    let seed_namespace = shoot.seed_namespace();
    let seed = ctx.care.seed_listers(&seed_namespace);

    let control_plane_outcome = health::control_plane(
        checker,
        shoot,
        &seed_namespace,
        features,
        &seed,
        &previous.control_plane,
    )
    .await;
    let control_plane = conditions::resolve(
        &previous.control_plane,
        control_plane_outcome,
        checker.now(),
    );

    let (nodes, system_components) = match ctx.care.shoot_listers(&seed_namespace).await {
        Ok(shoot_listers) => {
            let nodes_outcome = health::cluster_nodes(
                checker,
                &seed_namespace,
                &seed,
                &shoot_listers,
                &previous.nodes,
            )
            .await;
            let system_outcome = health::system_components(
                checker,
                shoot,
                features,
                &shoot_listers,
                &previous.system_components,
            )
            .await;
            (
                conditions::resolve(&previous.nodes, nodes_outcome, checker.now()),
                conditions::resolve(
                    &previous.system_components,
                    system_outcome,
                    checker.now(),
                ),
            )
        }
        Err(e) => {
            warn!(error = %e, "shoot cluster unreachable");
            let now = checker.now();
            (
                conditions::check_error(&previous.nodes, &e, now),
                conditions::check_error(&previous.system_components, &e, now),
            )
        }
    };

    ShootConditions {
        control_plane,
        nodes,
        system_components,
    }
}

async fn publish_transitions(
    shoot: &Shoot,
    previous: &ShootConditions,
    next: &ShootConditions,
    events: &dyn EventPublisher,
) {
    let object_ref = shoot.object_ref(&());
    for (before, after) in previous.iter().zip(next.iter()) {
        if conditions::turned_false(before, after) {
            events
                .publish(
                    &object_ref,
                    EventType::Warning,
                    reasons::CONDITION_FAILED,
                    actions::HEALTH_CHECK,
                    Some(format!("{}: {}", after.type_, after.message)),
                )
                .await;
        } else if conditions::recovered(before, after) {
            events
                .publish(
                    &object_ref,
                    EventType::Normal,
                    reasons::CONDITION_RECOVERED,
                    actions::HEALTH_CHECK,
                    Some(format!("{} is healthy again", after.type_)),
                )
                .await;
        }
    }
}

/// Error policy for the care controller
///
/// Logs the failure and retries after a short delay.
pub fn error_policy(shoot: Arc<Shoot>, error: &Error, _ctx: Arc<Context>) -> Action {
    error!(
        ?error,
        shoot = %shoot.name_any(),
        retryable = error.is_retryable(),
        "care reconciliation failed"
    );
    Action::requeue(ERROR_REQUEUE)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Constant listers describing a fully healthy shoot

    use std::collections::BTreeMap;

    use k8s_openapi::api::apps::v1::{
        DaemonSet, DaemonSetStatus, Deployment, DeploymentCondition, DeploymentStatus,
        StatefulSet, StatefulSetStatus,
    };
    use k8s_openapi::api::core::v1::{Node, NodeCondition, NodeStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use botanist_common::constants::*;
    use botanist_common::crd::{
        GardenerInfo, MachineDeployment, MachineDeploymentCondition, MachineDeploymentSpec,
        MachineDeploymentStatus, Shoot, ShootSpec, ShootStatus,
    };

    use super::listers::{SeedListers, ShootListers};

    pub const SEED_NS: &str = "shoot--dev--alpha";

    pub fn shoot() -> Shoot {
        let mut shoot = Shoot::new("alpha", ShootSpec::default());
        shoot.metadata.namespace = Some("garden-dev".to_string());
        shoot.status = Some(ShootStatus {
            technical_id: Some(SEED_NS.to_string()),
            gardener: Some(GardenerInfo {
                version: "1.5.0".to_string(),
            }),
            ..Default::default()
        });
        shoot
    }

    fn meta(name: &str, namespace: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }
    }

    pub fn deployment(name: &str, namespace: &str, available: bool) -> Deployment {
        Deployment {
            metadata: meta(name, namespace),
            status: Some(DeploymentStatus {
                conditions: Some(vec![DeploymentCondition {
                    type_: "Available".to_string(),
                    status: if available { "True" } else { "False" }.to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn stateful_set(name: &str) -> StatefulSet {
        StatefulSet {
            metadata: meta(name, SEED_NS),
            status: Some(StatefulSetStatus {
                ready_replicas: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn daemon_set(name: &str) -> DaemonSet {
        DaemonSet {
            metadata: meta(name, NAMESPACE_KUBE_SYSTEM),
            status: Some(DaemonSetStatus {
                desired_number_scheduled: 1,
                current_number_scheduled: 1,
                number_ready: 1,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn node(name: &str, ready: bool) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                labels: Some(BTreeMap::new()),
                ..Default::default()
            },
            status: Some(NodeStatus {
                conditions: Some(vec![NodeCondition {
                    type_: "Ready".to_string(),
                    status: if ready { "True" } else { "False" }.to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn machine_deployment(replicas: i32) -> MachineDeployment {
        let mut md = MachineDeployment::new("alpha-pool-a", MachineDeploymentSpec { replicas });
        md.metadata.namespace = Some(SEED_NS.to_string());
        md.status = Some(MachineDeploymentStatus {
            replicas,
            updated_replicas: replicas,
            ready_replicas: replicas,
            available_replicas: replicas,
            conditions: vec![MachineDeploymentCondition {
                type_: "Available".to_string(),
                status: "True".to_string(),
                ..Default::default()
            }],
        });
        md
    }

    pub fn seed_deployments() -> Vec<Deployment> {
        [
            DEPLOYMENT_GARDENER_RESOURCE_MANAGER,
            DEPLOYMENT_KUBE_APISERVER,
            DEPLOYMENT_KUBE_CONTROLLER_MANAGER,
            DEPLOYMENT_KUBE_SCHEDULER,
            DEPLOYMENT_MACHINE_CONTROLLER_MANAGER,
            DEPLOYMENT_GRAFANA_OPERATORS,
            DEPLOYMENT_GRAFANA_USERS,
            DEPLOYMENT_KUBE_STATE_METRICS,
        ]
        .into_iter()
        .map(|n| deployment(n, SEED_NS, true))
        .collect()
    }

    /// Seed listers for a healthy control plane with monitoring
    pub fn healthy_seed() -> SeedListers {
        seed_with(seed_deployments())
    }

    pub fn seed_with(deployments: Vec<Deployment>) -> SeedListers {
        SeedListers {
            deployments: Box::new(deployments),
            stateful_sets: Box::new(vec![
                stateful_set(STATEFULSET_ETCD_MAIN),
                stateful_set(STATEFULSET_ETCD_EVENTS),
                stateful_set(STATEFULSET_PROMETHEUS),
            ]),
            machine_deployments: Box::new(vec![machine_deployment(2)]),
        }
    }

    /// Shoot listers for healthy system components on two ready nodes
    pub fn healthy_shoot() -> ShootListers {
        shoot_with(vec![node("node-a", true), node("node-b", true)])
    }

    pub fn shoot_with(nodes: Vec<Node>) -> ShootListers {
        let deployments: Vec<Deployment> = [
            DEPLOYMENT_COREDNS,
            DEPLOYMENT_VPN_SHOOT,
            DEPLOYMENT_METRICS_SERVER,
            DEPLOYMENT_CALICO_KUBE_CONTROLLERS,
        ]
        .into_iter()
        .map(|n| deployment(n, NAMESPACE_KUBE_SYSTEM, true))
        .collect();
        let daemon_sets: Vec<DaemonSet> = [
            DAEMONSET_KUBE_PROXY,
            DAEMONSET_CALICO_NODE,
            DAEMONSET_NODE_PROBLEM_DETECTOR,
            DAEMONSET_NODE_EXPORTER,
        ]
        .into_iter()
        .map(daemon_set)
        .collect();
        ShootListers {
            deployments: Box::new(deployments),
            daemon_sets: Box::new(daemon_sets),
            addon_deployments: Box::new(Vec::<Deployment>::new()),
            addon_daemon_sets: Box::new(Vec::<DaemonSet>::new()),
            nodes: Box::new(nodes),
        }
    }
}
