//! Custom Resource Definitions used by botanist
//!
//! The Shoot is the object whose status the care controller writes. The
//! MachineDeployment is read to learn how many nodes a shoot should have.

mod machine;
mod shoot;
mod types;

pub use machine::{
    MachineDeployment, MachineDeploymentCondition, MachineDeploymentSpec,
    MachineDeploymentStatus, MACHINE_DEPLOYMENT_AVAILABLE,
};
pub use shoot::{
    Addon, Addons, Alerting, GardenerInfo, Hibernation, KubernetesSpec, Monitoring, ProviderSpec,
    Shoot, ShootSpec, ShootStatus, Worker,
};
pub use types::{
    get_condition, merge_conditions, Condition, ConditionStatus, REASON_CONDITION_INITIALIZED,
};
