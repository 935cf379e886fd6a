//! Running several independent components as one unit
//!
//! Members are independent, so one failure does not stop the others: every
//! member runs and all failures are returned together.

use tracing::{debug, info, warn};

use botanist_common::kube_utils::ignore_not_found;
use botanist_common::Error;

use crate::deployer::Deployer;

/// Destroy a component, treating NotFound as already destroyed
pub async fn destroy_ignoring_not_found(deployer: &dyn Deployer) -> Result<(), Error> {
    ignore_not_found(deployer.destroy().await)
}

/// An ordered set of named components
#[derive(Default)]
pub struct ComponentSet {
    members: Vec<(String, Box<dyn Deployer>)>,
}

impl ComponentSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, builder style
    pub fn with(mut self, name: impl Into<String>, deployer: Box<dyn Deployer>) -> Self {
        self.push(name, deployer);
        self
    }

    /// Add a member
    pub fn push(&mut self, name: impl Into<String>, deployer: Box<dyn Deployer>) {
        self.members.push((name.into(), deployer));
    }

    /// Member names in run order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(name, _)| name.as_str())
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the set has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Deploy every member, collecting all failures
    pub async fn deploy_all(&self) -> Result<(), Error> {
        let mut errors = Vec::new();
        for (name, deployer) in &self.members {
            debug!(component = %name, "deploying");
            if let Err(e) = deployer.deploy().await {
                warn!(component = %name, error = %e, "deploy failed");
                errors.push(in_component(name, "deploy", e));
            }
        }
        if errors.is_empty() {
            info!(components = self.members.len(), "all components deployed");
        }
        Error::aggregate(errors)
    }

    /// Destroy every member, collecting all failures
    ///
    /// A member that is already gone counts as destroyed.
    pub async fn destroy_all(&self) -> Result<(), Error> {
        let mut errors = Vec::new();
        for (name, deployer) in &self.members {
            debug!(component = %name, "destroying");
            if let Err(e) = destroy_ignoring_not_found(deployer.as_ref()).await {
                warn!(component = %name, error = %e, "destroy failed");
                errors.push(in_component(name, "destroy", e));
            }
        }
        Error::aggregate(errors)
    }
}

fn in_component(name: &str, operation: &str, error: Error) -> Error {
    match error {
        Error::Component { .. } => error,
        other => Error::component(name, operation, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployer::MockDeployer;

    fn not_found() -> Error {
        Error::from(kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "deployments.apps \"etcd-main\" not found".to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        }))
    }

    fn ok_deployer() -> Box<dyn Deployer> {
        let mut mock = MockDeployer::new();
        mock.expect_deploy().times(1).returning(|| Ok(()));
        mock.expect_destroy().returning(|| Ok(()));
        Box::new(mock)
    }

    fn failing_deployer(message: &'static str) -> Box<dyn Deployer> {
        let mut mock = MockDeployer::new();
        mock.expect_deploy()
            .times(1)
            .returning(move || Err(Error::internal(message)));
        Box::new(mock)
    }

    #[tokio::test]
    async fn deploy_all_succeeds_when_every_member_does() {
        let set = ComponentSet::new()
            .with("etcd-main", ok_deployer())
            .with("etcd-events", ok_deployer());

        assert_eq!(set.names().collect::<Vec<_>>(), vec!["etcd-main", "etcd-events"]);
        set.deploy_all().await.unwrap();
    }

    /// Story: two of three components fail; the third still runs and both
    /// failures are reported.
    #[tokio::test]
    async fn story_deploy_all_runs_everything_and_aggregates() {
        let set = ComponentSet::new()
            .with("kube-apiserver", failing_deployer("certificate missing"))
            .with("kube-scheduler", ok_deployer())
            .with("cluster-autoscaler", failing_deployer("quota exceeded"));

        let err = set.deploy_all().await.unwrap_err();
        match &err {
            Error::Aggregate { errors } => {
                assert_eq!(errors.len(), 2);
                assert!(matches!(
                    &errors[0],
                    Error::Component { component, operation, .. }
                        if component == "kube-apiserver" && operation == "deploy"
                ));
                assert!(errors[1].to_string().contains("quota exceeded"));
            }
            other => panic!("expected aggregate, got {other:?}"),
        }
        assert!(err.to_string().starts_with("2 operations failed"));
    }

    #[tokio::test]
    async fn single_failure_is_not_wrapped_in_aggregate() {
        let set = ComponentSet::new()
            .with("vpn-shoot", failing_deployer("boom"))
            .with("coredns", ok_deployer());

        let err = set.deploy_all().await.unwrap_err();
        assert!(matches!(err, Error::Component { .. }));
    }

    #[tokio::test]
    async fn destroy_all_treats_not_found_as_destroyed() {
        let mut gone = MockDeployer::new();
        gone.expect_destroy().times(1).returning(|| Err(not_found()));
        let mut stuck = MockDeployer::new();
        stuck
            .expect_destroy()
            .times(1)
            .returning(|| Err(Error::internal("finalizer pending")));

        let set = ComponentSet::new()
            .with("dns-owner", Box::new(gone))
            .with("dns-entry", Box::new(stuck));

        let err = set.destroy_all().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Component { ref component, .. } if component == "dns-entry"
        ));
    }

    #[tokio::test]
    async fn destroy_ignoring_not_found_passes_other_errors() {
        let mut gone = MockDeployer::new();
        gone.expect_destroy().returning(|| Err(not_found()));
        destroy_ignoring_not_found(&gone).await.unwrap();

        let mut forbidden = MockDeployer::new();
        forbidden
            .expect_destroy()
            .returning(|| Err(Error::internal("forbidden")));
        assert!(destroy_ignoring_not_found(&forbidden).await.is_err());
    }

    #[tokio::test]
    async fn empty_set_is_a_no_op() {
        let set = ComponentSet::new();
        assert!(set.is_empty());
        set.deploy_all().await.unwrap();
        set.destroy_all().await.unwrap();
    }
}
