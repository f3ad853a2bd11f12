//! Building blocks shared by every machine kind.
//!
//! - Hooks and reactions: the callbacks a machine invokes or hands out
//! - State descriptors and options: how states are registered
//! - History: what a runner records while driving a machine

mod history;
mod hook;
mod state;

pub use history::{StateHistory, StateTransition};
pub use hook::{Hook, Reaction, ReactionCall};
pub use state::{StateDescriptor, StateOptions};

pub(crate) use state::StateEntry;
