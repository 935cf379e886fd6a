//! Feature switches passed explicitly at construction
//!
//! Every component that changes behaviour on a feature receives this struct
//! instead of reading process-wide gates, so tests can build any combination
//! without touching shared state.

use serde::{Deserialize, Serialize};

/// Feature switches for the care controller and component deployers
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureConfig {
    /// Shoot control planes run the logging stack (Kibana, Elasticsearch)
    pub logging: bool,
    /// Shoot control planes run the monitoring stack (Prometheus, Grafana)
    pub monitoring: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            logging: false,
            monitoring: true,
        }
    }
}
