//! Shoot health checks
//!
//! [`HealthChecker`] aggregates the health of the workloads that make up a
//! shoot (control plane in the seed, system components and nodes in the
//! shoot) into conditions. Objects are supplied through [`Lister`]s so the
//! checker never depends on a live cluster.

#![deny(missing_docs)]

pub mod checker;
pub mod clock;
pub mod lister;
pub mod required;
pub mod workload;

pub use checker::{reasons, HealthChecker};
pub use clock::{Clock, FixedClock, SystemClock};
pub use lister::{ApiLister, FnLister, Lister};
pub use workload::{Health, WorkloadHealth};
