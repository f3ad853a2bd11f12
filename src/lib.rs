//! Automata: a hierarchical finite state machine engine
//!
//! Machines are built from named states and event-labelled transitions,
//! optionally frozen, then initialized and driven one event at a time.
//! Processing an event fires the exit and enter hooks, moves the machine and
//! returns an [`Effect`] telling the caller what to do next.
//!
//! # Core Concepts
//!
//! - **Hooks**: enter/exit callbacks, captured by each transition when it is added
//! - **Reactions**: callbacks that compute the next event once a transition settles
//! - **Hierarchy**: states may carry nested machines, initialized in cascade
//! - **Runners**: drivers that loop on reactions until the machine settles
//!
//! # Example
//!
//! ```rust
//! use automata::core::{Reaction, StateOptions};
//! use automata::FiniteMachine;
//!
//! let mut machine = FiniteMachine::new();
//! machine.add_state("down", StateOptions::new()).unwrap();
//! machine.add_state("fell_over", StateOptions::new().terminal()).unwrap();
//! machine.add_transition("down", "fell_over", "jump").unwrap();
//!
//! machine.initialize(Some("down")).unwrap();
//! let effect = machine.process_event("jump").unwrap();
//!
//! assert!(effect.is_terminal());
//! assert!(machine.terminated());
//! assert!(machine.process_event("jump").is_err());
//! ```

pub mod builder;
pub mod core;
pub mod error;
pub mod machine;
pub mod runner;

// Re-export commonly used types
pub use error::{MachineError, Result};
pub use machine::{CopyMode, Effect, FiniteMachine, HierarchicalMachine, MachineRef};
