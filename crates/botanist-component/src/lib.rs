//! Component contracts for shoot orchestration
//!
//! Components are driven through [`Deployer`] and friends. [`ComponentSet`]
//! runs several of them and reports every failure instead of stopping at the
//! first one.

pub mod chart;
pub mod deployer;
pub mod factory;
pub mod set;

pub use chart::ChartComponent;
pub use deployer::{
    deploy_and_wait, destroy_and_wait, migrate_and_wait, ChartApplier, Deployer, Migrator, Waiter,
};
pub use factory::{ComponentFactory, ComponentRegistry};
pub use set::{destroy_ignoring_not_found, ComponentSet};
