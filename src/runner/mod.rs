//! Iterative drivers that feed reaction-produced events back into a machine.
//!
//! A run starts from one external event. After each step the reaction of
//! the new state, if any, computes the next event. A run ends when a
//! terminal state is reached or a step has no reaction.

mod finite;
mod hierarchical;

pub use finite::{FiniteRunner, Steps};
pub use hierarchical::{HierarchicalRunner, NestedSteps};
