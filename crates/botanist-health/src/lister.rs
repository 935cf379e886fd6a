//! Listers: the only way the health checker sees cluster state
//!
//! A lister produces every object of one kind within whatever scope it was
//! built for. The checker never talks to the API server itself, so tests can
//! hand it constant vectors and production can hand it API-backed listers.

use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;

use botanist_common::Error;

/// Produces the current objects of one kind, or fails
#[async_trait]
pub trait Lister<T>: Send + Sync {
    /// List all objects in scope
    async fn list(&self) -> Result<Vec<T>, Error>;
}

/// A fixed set of objects
#[async_trait]
impl<T> Lister<T> for Vec<T>
where
    T: Clone + Send + Sync,
{
    async fn list(&self) -> Result<Vec<T>, Error> {
        Ok(self.clone())
    }
}

/// A lister backed by a closure
///
/// Handy for injecting failures in tests.
pub struct FnLister<F>(pub F);

#[async_trait]
impl<T, F> Lister<T> for FnLister<F>
where
    T: Send + 'static,
    F: Fn() -> Result<Vec<T>, Error> + Send + Sync,
{
    async fn list(&self) -> Result<Vec<T>, Error> {
        (self.0)()
    }
}

/// Lists objects through the Kubernetes API
pub struct ApiLister<K> {
    api: Api<K>,
    params: ListParams,
    namespace: Option<String>,
}

impl<K> ApiLister<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
{
    /// List objects in one namespace, optionally filtered by label selector
    pub fn namespaced(client: Client, namespace: &str, label_selector: Option<&str>) -> Self
    where
        K: Resource<Scope = NamespaceResourceScope>,
    {
        Self {
            api: Api::namespaced(client, namespace),
            params: list_params(label_selector),
            namespace: Some(namespace.to_string()),
        }
    }

    /// List objects across the whole cluster (for cluster-scoped kinds like Node)
    pub fn all(client: Client, label_selector: Option<&str>) -> Self {
        Self {
            api: Api::all(client),
            params: list_params(label_selector),
            namespace: None,
        }
    }
}

fn list_params(label_selector: Option<&str>) -> ListParams {
    match label_selector {
        Some(selector) => ListParams::default().labels(selector),
        None => ListParams::default(),
    }
}

#[async_trait]
impl<K> Lister<K> for ApiLister<K>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    async fn list(&self) -> Result<Vec<K>, Error> {
        let list = self.api.list(&self.params).await.map_err(|e| {
            Error::list_failed(K::kind(&()), self.namespace.as_deref(), e.to_string())
        })?;
        Ok(list.items)
    }
}
