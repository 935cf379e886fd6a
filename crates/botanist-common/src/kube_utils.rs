//! Shared Kubernetes utilities using kube-rs
//!
//! Client construction for the seed and shoot clusters, condition lookups on
//! upstream object types, and the status merge-patch used by the care
//! controller.

use std::path::Path;
use std::time::Duration;

use kube::api::{Api, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

use crate::crd::{MachineDeploymentCondition, Shoot};
use crate::Error;

/// Condition status value meaning "true" on upstream Kubernetes objects
pub const STATUS_TRUE: &str = "True";

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a kube client from an optional kubeconfig path
///
/// Falls back to in-cluster or `KUBECONFIG` inference when no path is given.
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client, Error> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::internal_with_context(
                    "create_client",
                    format!("failed to read kubeconfig {}: {}", path.display(), e),
                )
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    Error::internal_with_context(
                        "create_client",
                        format!("failed to load kubeconfig: {}", e),
                    )
                })?
        }
        None => Config::infer().await.map_err(|e| {
            Error::internal_with_context("create_client", format!("failed to infer config: {}", e))
        })?,
    };
    config.connect_timeout = Some(DEFAULT_CONNECT_TIMEOUT);
    config.read_timeout = Some(DEFAULT_READ_TIMEOUT);
    Client::try_from(config).map_err(|e| {
        Error::internal_with_context("create_client", format!("failed to create client: {}", e))
    })
}

/// Create a kube client from raw kubeconfig bytes (e.g., a secret value)
pub async fn client_from_kubeconfig_bytes(bytes: &[u8]) -> Result<Client, Error> {
    let yaml = std::str::from_utf8(bytes).map_err(|e| {
        Error::serialization_for_kind("Kubeconfig", format!("kubeconfig is not UTF-8: {}", e))
    })?;
    let kubeconfig = Kubeconfig::from_yaml(yaml).map_err(|e| {
        Error::serialization_for_kind("Kubeconfig", format!("invalid kubeconfig: {}", e))
    })?;
    let mut config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| {
            Error::internal_with_context(
                "client_from_kubeconfig",
                format!("failed to load kubeconfig: {}", e),
            )
        })?;
    config.connect_timeout = Some(DEFAULT_CONNECT_TIMEOUT);
    config.read_timeout = Some(DEFAULT_READ_TIMEOUT);
    Client::try_from(config).map_err(|e| {
        Error::internal_with_context(
            "client_from_kubeconfig",
            format!("failed to create client: {}", e),
        )
    })
}

/// Trait for types that have condition-like fields (type and status)
pub trait HasConditionFields {
    /// Get the condition type field value
    fn type_field(&self) -> &str;
    /// Get the condition status field value
    fn status_field(&self) -> &str;
}

impl HasConditionFields for k8s_openapi::api::core::v1::NodeCondition {
    fn type_field(&self) -> &str {
        &self.type_
    }
    fn status_field(&self) -> &str {
        &self.status
    }
}

impl HasConditionFields for k8s_openapi::api::apps::v1::DeploymentCondition {
    fn type_field(&self) -> &str {
        &self.type_
    }
    fn status_field(&self) -> &str {
        &self.status
    }
}

impl HasConditionFields for MachineDeploymentCondition {
    fn type_field(&self) -> &str {
        &self.type_
    }
    fn status_field(&self) -> &str {
        &self.status
    }
}

/// Find a condition of the given type
pub fn find_condition<'a, T>(conditions: Option<&'a [T]>, condition_type: &str) -> Option<&'a T>
where
    T: HasConditionFields,
{
    conditions.and_then(|conds| conds.iter().find(|c| c.type_field() == condition_type))
}

/// Treat a Kubernetes NotFound as success
///
/// Destroy operations are idempotent: deleting something that is already
/// gone is not a failure.
pub fn ignore_not_found(result: Result<(), Error>) -> Result<(), Error> {
    match result {
        Err(e) if e.is_not_found() => {
            debug!(error = %e, "ignoring NotFound");
            Ok(())
        }
        other => other,
    }
}

/// Patch the status sub-resource of a Shoot via merge-patch
pub async fn patch_shoot_status(
    client: &Client,
    name: &str,
    namespace: &str,
    status: &impl serde::Serialize,
    field_manager: &str,
) -> Result<(), Error> {
    let api: Api<Shoot> = Api::namespaced(client.clone(), namespace);
    let patch = serde_json::json!({ "status": status });
    api.patch_status(name, &PatchParams::apply(field_manager), &Patch::Merge(&patch))
        .await?;
    Ok(())
}
