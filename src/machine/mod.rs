//! State machine engines.
//!
//! # Key Concepts
//!
//! - **Finite machine**: states, event-labelled transitions, reactions
//! - **Hierarchical machine**: a finite machine whose states may carry
//!   nested machines, initialized in cascade
//! - **Jump**: a resolved transition with the hooks captured at creation
//! - **Effect**: what processing one event produced, for a runner to act on
//!
//! Both engines are synchronous and meant for a single owner. Hooks and
//! reactions run inline, inside `process_event` and `initialize`.

mod finite;
mod hierarchical;
mod jump;

pub use finite::{CopyMode, FiniteMachine};
pub use hierarchical::{HierarchicalMachine, MachineRef, StartStateFetcher};
pub use jump::{Effect, Jump};
