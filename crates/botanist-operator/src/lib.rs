//! Botanist operator - keeps shoot health conditions up to date
//!
//! Watches every Shoot in the seed, runs the health checks behind its
//! conditions and writes the result back to the shoot status.

#![deny(missing_docs)]

pub mod care;
pub mod config;
pub mod controller_runner;

pub use care::{error_policy, reconcile, Context};
pub use config::CareConfig;
