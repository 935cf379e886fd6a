//! Common types for Botanist: Shoot CRDs, conditions, errors, and utilities

#![deny(missing_docs)]

pub mod constants;
pub mod crd;
pub mod error;
pub mod events;
pub mod features;
pub mod kube_utils;
pub mod metrics;
pub mod telemetry;

pub use error::Error;
pub use features::FeatureConfig;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Field manager used for every server-side write made by botanist
pub const FIELD_MANAGER: &str = "botanist-care-controller";
