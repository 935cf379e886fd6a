//! Cluster access for the care controller
//!
//! The controller reads from two clusters: the seed, where the control plane
//! runs and where the shoot status is written, and the shoot itself. Both are
//! reached through traits so reconciliation can be tested without a cluster.

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube::{Client, ResourceExt};
use tracing::debug;

use botanist_common::constants::{SECRET_KEY_KUBECONFIG, SECRET_SHOOT_KUBECONFIG};
use botanist_common::crd::{Condition, Shoot};
use botanist_common::kube_utils::{client_from_kubeconfig_bytes, patch_shoot_status};
use botanist_common::{Error, FIELD_MANAGER};

use super::listers::{SeedListers, ShootListers};

#[cfg(test)]
use mockall::automock;

/// Yields a client for a shoot cluster
#[async_trait]
pub trait ShootClientProvider: Send + Sync {
    /// Client for the shoot whose control plane lives in `seed_namespace`
    async fn shoot_client(&self, seed_namespace: &str) -> Result<Client, Error>;
}

/// Reads the shoot kubeconfig from the `kubecfg` secret in the seed namespace
pub struct SecretShootClientProvider {
    seed: Client,
}

impl SecretShootClientProvider {
    /// Create a provider reading secrets through the seed client
    pub fn new(seed: Client) -> Self {
        Self { seed }
    }
}

#[async_trait]
impl ShootClientProvider for SecretShootClientProvider {
    async fn shoot_client(&self, seed_namespace: &str) -> Result<Client, Error> {
        let secrets: Api<Secret> = Api::namespaced(self.seed.clone(), seed_namespace);
        let secret = secrets.get(SECRET_SHOOT_KUBECONFIG).await?;
        let kubeconfig = kubeconfig_from_secret(&secret)?;
        debug!(namespace = seed_namespace, "building shoot client");
        client_from_kubeconfig_bytes(kubeconfig).await
    }
}

fn kubeconfig_from_secret(secret: &Secret) -> Result<&[u8], Error> {
    secret
        .data
        .as_ref()
        .and_then(|d| d.get(SECRET_KEY_KUBECONFIG))
        .map(|b| b.0.as_slice())
        .ok_or_else(|| {
            Error::internal_with_context(
                "shoot-client",
                format!(
                    "secret {} has no {} key",
                    secret.name_any(),
                    SECRET_KEY_KUBECONFIG
                ),
            )
        })
}

/// Everything reconciliation needs from the clusters
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CareClient: Send + Sync {
    /// Listers for the shoot's control-plane namespace in the seed
    fn seed_listers(&self, seed_namespace: &str) -> SeedListers;

    /// Listers inside the shoot cluster
    async fn shoot_listers(&self, seed_namespace: &str) -> Result<ShootListers, Error>;

    /// Write the shoot's conditions to its status
    async fn patch_conditions(
        &self,
        shoot: &Shoot,
        conditions: &[Condition],
    ) -> Result<(), Error>;
}

/// Production [`CareClient`] over a seed client
pub struct KubeCareClient {
    seed: Client,
    shoot_clients: Arc<dyn ShootClientProvider>,
}

impl KubeCareClient {
    /// Create a client that reaches shoots through `shoot_clients`
    pub fn new(seed: Client, shoot_clients: Arc<dyn ShootClientProvider>) -> Self {
        Self {
            seed,
            shoot_clients,
        }
    }
}

#[async_trait]
impl CareClient for KubeCareClient {
    fn seed_listers(&self, seed_namespace: &str) -> SeedListers {
        SeedListers::for_namespace(self.seed.clone(), seed_namespace)
    }

    async fn shoot_listers(&self, seed_namespace: &str) -> Result<ShootListers, Error> {
        let client = self.shoot_clients.shoot_client(seed_namespace).await?;
        Ok(ShootListers::from_client(client))
    }

    async fn patch_conditions(
        &self,
        shoot: &Shoot,
        conditions: &[Condition],
    ) -> Result<(), Error> {
        let name = shoot.name_any();
        let namespace = shoot
            .namespace()
            .ok_or_else(|| Error::validation_for(&name, "shoot has no namespace"))?;
        let status = serde_json::json!({ "conditions": conditions });
        patch_shoot_status(&self.seed, &name, &namespace, &status, FIELD_MANAGER).await
    }
}
