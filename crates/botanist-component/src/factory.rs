//! Injected component constructors
//!
//! Orchestration code receives constructors as values instead of calling
//! fixed constructor functions, so tests can hand in fakes without touching
//! shared state.

use std::sync::Arc;

use tracing::debug;

use botanist_common::crd::Shoot;
use botanist_common::FeatureConfig;

use crate::deployer::Deployer;
use crate::set::ComponentSet;

/// Builds a component for a shoot
pub type ComponentFactory = Arc<dyn Fn(&Shoot, &FeatureConfig) -> Box<dyn Deployer> + Send + Sync>;

/// Named factories, instantiated together per shoot
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: Vec<(String, ComponentFactory)>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a component name
    pub fn register(mut self, name: impl Into<String>, factory: ComponentFactory) -> Self {
        self.factories.push((name.into(), factory));
        self
    }

    /// Instantiate every registered component for `shoot`
    pub fn build(&self, shoot: &Shoot, features: &FeatureConfig) -> ComponentSet {
        let mut set = ComponentSet::new();
        for (name, factory) in &self.factories {
            debug!(component = %name, "building component");
            set.push(name.clone(), factory(shoot, features));
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployer::MockDeployer;
    use botanist_common::crd::ShootSpec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn registry_builds_from_injected_factories() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let factory: ComponentFactory = Arc::new(
            move |_shoot: &Shoot, features: &FeatureConfig| -> Box<dyn Deployer> {
                counter.fetch_add(1, Ordering::SeqCst);
                let logging = features.logging;
                let mut mock = MockDeployer::new();
                mock.expect_deploy().returning(move || {
                    if logging {
                        Ok(())
                    } else {
                        Err(botanist_common::Error::internal("logging disabled"))
                    }
                });
                Box::new(mock)
            },
        );

        let registry = ComponentRegistry::new().register("fluent-bit", factory);
        let shoot = Shoot::new("alpha", ShootSpec::default());

        let enabled = FeatureConfig {
            logging: true,
            ..Default::default()
        };
        registry.build(&shoot, &enabled).deploy_all().await.unwrap();

        let disabled = FeatureConfig::default();
        assert!(registry.build(&shoot, &disabled).deploy_all().await.is_err());
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }
}
