//! Runs the checks behind each shoot condition
//!
//! A condition is backed by one or more checks. They run in order and the
//! first failure decides the condition; later checks are skipped.

use std::future::Future;
use std::time::Instant;

use botanist_common::constants::NAMESPACE_KUBE_SYSTEM;
use botanist_common::crd::{Condition, Shoot};
use botanist_common::metrics::{record_check_duration, record_check_error};
use botanist_common::{Error, FeatureConfig};
use botanist_health::HealthChecker;
use kube::ResourceExt;

use super::listers::{SeedListers, ShootListers};

async fn timed<F>(check: &'static str, fut: F) -> Result<Option<Condition>, Error>
where
    F: Future<Output = Result<Option<Condition>, Error>>,
{
    let start = Instant::now();
    let result = fut.await;
    record_check_duration(check, start.elapsed().as_secs_f64());
    if result.is_err() {
        record_check_error(check);
    }
    result
}

/// ControlPlaneHealthy: core control plane, then monitoring and logging stacks
pub async fn control_plane(
    checker: &HealthChecker,
    shoot: &Shoot,
    seed_namespace: &str,
    features: &FeatureConfig,
    seed: &SeedListers,
    condition: &Condition,
) -> Result<Option<Condition>, Error> {
    let failed = timed(
        "control_plane",
        checker.check_control_plane(
            shoot,
            seed_namespace,
            condition,
            seed.deployments.as_ref(),
            seed.stateful_sets.as_ref(),
            seed.machine_deployments.as_ref(),
        ),
    )
    .await?;
    if failed.is_some() {
        return Ok(failed);
    }

    if features.monitoring {
        let failed = timed(
            "monitoring_control_plane",
            checker.check_monitoring_control_plane(
                seed_namespace,
                shoot.wants_alertmanager(),
                condition,
                seed.deployments.as_ref(),
                seed.stateful_sets.as_ref(),
            ),
        )
        .await?;
        if failed.is_some() {
            return Ok(failed);
        }
    }

    if features.logging {
        return timed(
            "logging_control_plane",
            checker.check_logging_control_plane(
                seed_namespace,
                condition,
                seed.deployments.as_ref(),
                seed.stateful_sets.as_ref(),
            ),
        )
        .await;
    }

    Ok(None)
}

/// EveryNodeReady
pub async fn cluster_nodes(
    checker: &HealthChecker,
    seed_namespace: &str,
    seed: &SeedListers,
    shoot_listers: &ShootListers,
    condition: &Condition,
) -> Result<Option<Condition>, Error> {
    timed(
        "cluster_nodes",
        checker.check_cluster_nodes(
            seed_namespace,
            condition,
            shoot_listers.nodes.as_ref(),
            seed.machine_deployments.as_ref(),
        ),
    )
    .await
}

/// SystemComponentsHealthy: core system components, monitoring agents, addons
pub async fn system_components(
    checker: &HealthChecker,
    shoot: &Shoot,
    features: &FeatureConfig,
    shoot_listers: &ShootListers,
    condition: &Condition,
) -> Result<Option<Condition>, Error> {
    let version = shoot.gardener_version().ok_or_else(|| {
        Error::validation_for_field(
            shoot.name_any(),
            "status.gardener.version",
            "platform version is not reported yet",
        )
    })?;

    let failed = timed(
        "system_components",
        checker.check_system_components(
            version,
            NAMESPACE_KUBE_SYSTEM,
            condition,
            shoot_listers.deployments.as_ref(),
            shoot_listers.daemon_sets.as_ref(),
        ),
    )
    .await?;
    if failed.is_some() {
        return Ok(failed);
    }

    if features.monitoring {
        let failed = timed(
            "monitoring_system_components",
            checker.check_monitoring_system_components(
                NAMESPACE_KUBE_SYSTEM,
                condition,
                shoot_listers.daemon_sets.as_ref(),
            ),
        )
        .await?;
        if failed.is_some() {
            return Ok(failed);
        }
    }

    timed(
        "optional_addons",
        checker.check_optional_addons_system_components(
            NAMESPACE_KUBE_SYSTEM,
            condition,
            shoot_listers.addon_deployments.as_ref(),
            shoot_listers.addon_daemon_sets.as_ref(),
        ),
    )
    .await
}
