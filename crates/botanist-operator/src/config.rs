//! Care controller configuration
//!
//! Loaded from a YAML file given with `--config`. Every key is optional:
//!
//! ```yaml
//! syncPeriodSeconds: 30
//! conditionThresholds:
//!   - type: ControlPlaneHealthy
//!     durationSeconds: 60
//! features:
//!   logging: false
//!   monitoring: true
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use botanist_common::constants::SHOOT_CONDITION_TYPES;
use botanist_common::{Error, FeatureConfig};

const DEFAULT_SYNC_PERIOD_SECONDS: u64 = 30;

/// Grace period for one condition type
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionThreshold {
    /// Condition type the threshold applies to
    #[serde(rename = "type")]
    pub type_: String,
    /// How long a failing condition stays Progressing before turning False
    pub duration_seconds: u64,
}

/// Configuration of the care controller
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct CareConfig {
    /// How often every shoot is re-checked
    pub sync_period_seconds: u64,
    /// Per-condition grace periods
    pub condition_thresholds: Vec<ConditionThreshold>,
    /// Feature switches
    pub features: FeatureConfig,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            sync_period_seconds: DEFAULT_SYNC_PERIOD_SECONDS,
            condition_thresholds: Vec::new(),
            features: FeatureConfig::default(),
        }
    }
}

impl CareConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid care configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file
    pub fn load(path: &Path) -> Result<Self, Error> {
        let display = path.display().to_string();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::config_in(&display, format!("failed to read: {}", e)))?;
        Self::from_yaml(&yaml).map_err(|e| match e {
            Error::Config { message, .. } => Error::config_in(display, message),
            other => other,
        })
    }

    /// Reject values the controller cannot run with
    pub fn validate(&self) -> Result<(), Error> {
        if self.sync_period_seconds == 0 {
            return Err(Error::config("syncPeriodSeconds must be greater than zero"));
        }
        let mut seen = Vec::new();
        for threshold in &self.condition_thresholds {
            if !SHOOT_CONDITION_TYPES.contains(&threshold.type_.as_str()) {
                return Err(Error::config(format!(
                    "unknown condition type {:?} in conditionThresholds, expected one of {}",
                    threshold.type_,
                    SHOOT_CONDITION_TYPES.join(", ")
                )));
            }
            if seen.contains(&threshold.type_) {
                return Err(Error::config(format!(
                    "duplicate threshold for condition type {}",
                    threshold.type_
                )));
            }
            seen.push(threshold.type_.clone());
        }
        Ok(())
    }

    /// Interval between checks of the same shoot
    pub fn sync_period(&self) -> Duration {
        Duration::from_secs(self.sync_period_seconds)
    }

    /// Threshold map handed to the health checker
    pub fn thresholds(&self) -> HashMap<String, Duration> {
        self.condition_thresholds
            .iter()
            .map(|t| (t.type_.clone(), Duration::from_secs(t.duration_seconds)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botanist_common::constants::{CONDITION_CONTROL_PLANE_HEALTHY, CONDITION_EVERY_NODE_READY};

    #[test]
    fn empty_document_uses_defaults() {
        let config = CareConfig::from_yaml("{}").unwrap();
        assert_eq!(config, CareConfig::default());
        assert_eq!(config.sync_period(), Duration::from_secs(30));
        assert!(config.thresholds().is_empty());
        assert!(config.features.monitoring);
    }

    #[test]
    fn full_document() {
        let yaml = r#"
syncPeriodSeconds: 60
conditionThresholds:
  - type: ControlPlaneHealthy
    durationSeconds: 120
  - type: EveryNodeReady
    durationSeconds: 300
features:
  logging: true
  monitoring: false
"#;
        let config = CareConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.sync_period(), Duration::from_secs(60));

        let thresholds = config.thresholds();
        assert_eq!(thresholds.len(), 2);
        assert_eq!(
            thresholds[CONDITION_CONTROL_PLANE_HEALTHY],
            Duration::from_secs(120)
        );
        assert_eq!(thresholds[CONDITION_EVERY_NODE_READY], Duration::from_secs(300));

        assert!(config.features.logging);
        assert!(!config.features.monitoring);
    }

    #[test]
    fn rejects_zero_sync_period() {
        let err = CareConfig::from_yaml("syncPeriodSeconds: 0").unwrap_err();
        assert!(err.to_string().contains("syncPeriodSeconds"));
    }

    #[test]
    fn rejects_unknown_condition_type() {
        let yaml = r#"
conditionThresholds:
  - type: APIServerAvailable
    durationSeconds: 10
"#;
        let err = CareConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("APIServerAvailable"));
    }

    #[test]
    fn rejects_duplicate_threshold() {
        let yaml = r#"
conditionThresholds:
  - type: EveryNodeReady
    durationSeconds: 10
  - type: EveryNodeReady
    durationSeconds: 20
"#;
        assert!(CareConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = CareConfig::from_yaml("syncPeriodSeconds: [").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn load_reports_path() {
        let err = CareConfig::load(Path::new("/nonexistent/botanist.yaml")).unwrap_err();
        match err {
            Error::Config { path, .. } => {
                assert_eq!(path.as_deref(), Some("/nonexistent/botanist.yaml"))
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
