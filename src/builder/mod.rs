//! Bulk construction of machines.
//!
//! - [`MachineBuilder`]: fluent construction from state descriptors
//! - [`MachineSpec`]: serializable description, loadable from JSON
//! - [`HookRegistry`]: resolves the callback names a spec refers to

mod machine;
mod registry;
mod spec;

pub use machine::MachineBuilder;
pub use registry::HookRegistry;
pub use spec::{MachineSpec, ReactionSpec, StateSpec};
