//! A component backed by a single chart release

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use botanist_common::Error;

use crate::deployer::{ChartApplier, Deployer};

/// Deploys a chart with precomputed values, destroys by deleting the release
pub struct ChartComponent {
    applier: Arc<dyn ChartApplier>,
    chart_path: PathBuf,
    namespace: String,
    release_name: String,
    values: Value,
}

impl ChartComponent {
    /// Create a chart-backed component
    pub fn new(
        applier: Arc<dyn ChartApplier>,
        chart_path: impl Into<PathBuf>,
        namespace: impl Into<String>,
        release_name: impl Into<String>,
        values: Value,
    ) -> Self {
        Self {
            applier,
            chart_path: chart_path.into(),
            namespace: namespace.into(),
            release_name: release_name.into(),
            values,
        }
    }

    /// Values the chart is applied with
    pub fn values(&self) -> &Value {
        &self.values
    }
}

#[async_trait]
impl Deployer for ChartComponent {
    async fn deploy(&self) -> Result<(), Error> {
        debug!(
            release = %self.release_name,
            namespace = %self.namespace,
            chart = %self.chart_path.display(),
            "applying chart"
        );
        self.applier
            .apply(
                &self.chart_path,
                &self.namespace,
                &self.release_name,
                self.values.clone(),
            )
            .await
    }

    async fn destroy(&self) -> Result<(), Error> {
        debug!(release = %self.release_name, namespace = %self.namespace, "deleting chart");
        self.applier
            .delete(&self.chart_path, &self.namespace, &self.release_name)
            .await
    }
}
