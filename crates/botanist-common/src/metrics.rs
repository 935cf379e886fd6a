//! OpenTelemetry metrics for shoot health care
//!
//! Instruments are created lazily from the global meter, so they are no-ops
//! until telemetry installs a meter provider.

use once_cell::sync::Lazy;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use opentelemetry::KeyValue;

use crate::crd::ConditionStatus;

/// Global meter for botanist metrics
static METER: Lazy<Meter> = Lazy::new(|| global::meter("botanist"));

/// Histogram of health check duration
///
/// Labels:
/// - `check`: control_plane, system_components, cluster_nodes, ...
pub static HEALTH_CHECK_DURATION: Lazy<Histogram<f64>> = Lazy::new(|| {
    METER
        .f64_histogram("botanist_health_check_duration_seconds")
        .with_description("Duration of shoot health checks in seconds")
        .with_unit("s")
        .build()
});

/// Counter of health checks that could not determine health
///
/// Labels:
/// - `check`: the check that failed
pub static HEALTH_CHECK_ERRORS: Lazy<Counter<u64>> = Lazy::new(|| {
    METER
        .u64_counter("botanist_health_check_errors_total")
        .with_description("Total number of health checks that returned an error")
        .with_unit("{errors}")
        .build()
});

/// Gauge set to 1 for the current status of each shoot condition
///
/// Labels:
/// - `shoot`: namespace/name
/// - `type`: condition type
/// - `status`: true, false, progressing, unknown
pub static SHOOT_CONDITION_STATUS: Lazy<Gauge<i64>> = Lazy::new(|| {
    METER
        .i64_gauge("botanist_shoot_condition_status")
        .with_description("Current status of shoot conditions")
        .with_unit("{conditions}")
        .build()
});

/// Record how long a check took
pub fn record_check_duration(check: &'static str, seconds: f64) {
    HEALTH_CHECK_DURATION.record(seconds, &[KeyValue::new("check", check)]);
}

/// Count a check that returned an error
pub fn record_check_error(check: &'static str) {
    HEALTH_CHECK_ERRORS.add(1, &[KeyValue::new("check", check)]);
}

/// Publish the status of a condition, zeroing the other statuses
pub fn record_condition_status(shoot: &str, condition_type: &str, status: ConditionStatus) {
    for candidate in [
        ConditionStatus::True,
        ConditionStatus::False,
        ConditionStatus::Progressing,
        ConditionStatus::Unknown,
    ] {
        let value = i64::from(candidate == status);
        SHOOT_CONDITION_STATUS.record(
            value,
            &[
                KeyValue::new("shoot", shoot.to_string()),
                KeyValue::new("type", condition_type.to_string()),
                KeyValue::new("status", candidate.as_label()),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_provider_is_noop() {
        record_check_duration("control_plane", 0.25);
        record_check_error("cluster_nodes");
        record_condition_status("garden-dev/alpha", "EveryNodeReady", ConditionStatus::False);
    }
}
