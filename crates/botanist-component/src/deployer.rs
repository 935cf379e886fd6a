//! Contracts implemented by shoot components
//!
//! Every managed component (etcd, kube-apiserver, DNS entries, ...) is driven
//! through these traits. The concrete implementations live with the
//! components; orchestration code only sees the traits.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use botanist_common::Error;

#[cfg(test)]
use mockall::automock;

/// A component that can be deployed and destroyed
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Create or update the component
    async fn deploy(&self) -> Result<(), Error>;

    /// Remove the component
    async fn destroy(&self) -> Result<(), Error>;
}

/// A component whose state can move between seeds
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Prepare the component for migration
    async fn migrate(&self) -> Result<(), Error>;

    /// Wait until migration preparation has finished
    async fn wait_migrate(&self) -> Result<(), Error>;
}

/// A component that can be waited on
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Waiter: Send + Sync {
    /// Wait until a deploy has converged
    async fn wait(&self) -> Result<(), Error>;

    /// Wait until a destroy has finished
    async fn wait_cleanup(&self) -> Result<(), Error>;
}

/// Applies rendered charts to a cluster
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChartApplier: Send + Sync {
    /// Render the chart at `chart_path` with `values` and apply it
    async fn apply(
        &self,
        chart_path: &Path,
        namespace: &str,
        release_name: &str,
        values: Value,
    ) -> Result<(), Error>;

    /// Delete every object the chart renders to
    async fn delete(
        &self,
        chart_path: &Path,
        namespace: &str,
        release_name: &str,
    ) -> Result<(), Error>;
}

/// Deploy a component and wait for it to converge
pub async fn deploy_and_wait<C>(component: &C) -> Result<(), Error>
where
    C: Deployer + Waiter + ?Sized,
{
    component.deploy().await?;
    component.wait().await
}

/// Destroy a component and wait for its cleanup to finish
pub async fn destroy_and_wait<C>(component: &C) -> Result<(), Error>
where
    C: Deployer + Waiter + ?Sized,
{
    component.destroy().await?;
    component.wait_cleanup().await
}

/// Prepare a component for migration and wait until it is ready to move
pub async fn migrate_and_wait(component: &dyn Migrator) -> Result<(), Error> {
    component.migrate().await?;
    component.wait_migrate().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Etcd {
        deployed: AtomicBool,
        fail_wait: bool,
    }

    #[async_trait]
    impl Deployer for Etcd {
        async fn deploy(&self) -> Result<(), Error> {
            self.deployed.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn destroy(&self) -> Result<(), Error> {
            self.deployed.store(false, Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl Waiter for Etcd {
        async fn wait(&self) -> Result<(), Error> {
            if self.fail_wait {
                return Err(Error::component("etcd-main", "wait", "not ready in time"));
            }
            Ok(())
        }

        async fn wait_cleanup(&self) -> Result<(), Error> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn deploy_and_wait_reports_wait_failure() {
        let etcd = Etcd {
            deployed: AtomicBool::new(false),
            fail_wait: true,
        };
        let err = deploy_and_wait(&etcd).await.unwrap_err();
        assert!(etcd.deployed.load(Ordering::SeqCst));
        assert!(err.to_string().contains("not ready in time"));

        destroy_and_wait(&etcd).await.unwrap();
        assert!(!etcd.deployed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn migrate_and_wait_stops_after_failed_migrate() {
        let mut migrator = MockMigrator::new();
        migrator
            .expect_migrate()
            .times(1)
            .returning(|| Err(Error::internal("backup bucket unreachable")));
        migrator.expect_wait_migrate().never();

        assert!(migrate_and_wait(&migrator).await.is_err());
    }

    #[tokio::test]
    async fn migrate_and_wait_runs_both_steps() {
        let mut migrator = MockMigrator::new();
        migrator.expect_migrate().times(1).returning(|| Ok(()));
        migrator.expect_wait_migrate().times(1).returning(|| Ok(()));

        migrate_and_wait(&migrator).await.unwrap();
    }
}
