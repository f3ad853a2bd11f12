//! State records.
//!
//! [`StateDescriptor`] is the bulk-construction input consumed by
//! `build`, [`StateOptions`] configures a single `add_state` call, and
//! `StateEntry` is the runtime form a machine keeps in its state table.

use super::hook::{Hook, Reaction};
use indexmap::IndexMap;

/// Plain description of one state and its outgoing transitions.
///
/// # Example
///
/// ```rust
/// use automata::core::StateDescriptor;
/// use automata::FiniteMachine;
///
/// let machine = FiniteMachine::build(vec![
///     StateDescriptor::new("down").next_state("jump", "up"),
///     StateDescriptor::new("up").next_state("fall", "down"),
/// ])
/// .unwrap();
///
/// assert_eq!(machine.states(), ["down", "up"]);
/// assert_eq!(machine.events(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct StateDescriptor {
    pub name: String,
    pub is_terminal: bool,
    /// Event name to target state name.
    pub next_states: IndexMap<String, String>,
    pub on_enter: Option<Hook>,
    pub on_exit: Option<Hook>,
}

impl StateDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        StateDescriptor {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn terminal(mut self) -> Self {
        self.is_terminal = true;
        self
    }

    pub fn next_state(mut self, event: impl Into<String>, target: impl Into<String>) -> Self {
        self.next_states.insert(event.into(), target.into());
        self
    }

    pub fn on_enter(mut self, hook: Hook) -> Self {
        self.on_enter = Some(hook);
        self
    }

    pub fn on_exit(mut self, hook: Hook) -> Self {
        self.on_exit = Some(hook);
        self
    }

    pub(crate) fn options(&self) -> StateOptions {
        StateOptions {
            terminal: self.is_terminal,
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
        }
    }
}

/// Optional settings for `add_state`.
///
/// # Example
///
/// ```rust
/// use automata::core::{Hook, StateOptions};
/// use automata::FiniteMachine;
///
/// let mut machine = FiniteMachine::new();
/// machine.add_state("idle", StateOptions::new()).unwrap();
/// machine
///     .add_state(
///         "done",
///         StateOptions::new()
///             .terminal()
///             .on_enter(Hook::named("announce", |_, _| {})),
///     )
///     .unwrap();
///
/// assert_eq!(machine.is_terminal_state("done"), Some(true));
/// ```
#[derive(Clone, Debug, Default)]
pub struct StateOptions {
    pub(crate) terminal: bool,
    pub(crate) on_enter: Option<Hook>,
    pub(crate) on_exit: Option<Hook>,
}

impl StateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the state terminal: no transition may leave it.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn on_enter(mut self, hook: Hook) -> Self {
        self.on_enter = Some(hook);
        self
    }

    pub fn on_exit(mut self, hook: Hook) -> Self {
        self.on_exit = Some(hook);
        self
    }
}

/// Runtime entry of the state table.
#[derive(Clone, Debug)]
pub(crate) struct StateEntry {
    pub(crate) terminal: bool,
    pub(crate) reactions: IndexMap<String, Reaction>,
    pub(crate) on_enter: Option<Hook>,
    pub(crate) on_exit: Option<Hook>,
}

impl From<StateOptions> for StateEntry {
    fn from(options: StateOptions) -> Self {
        StateEntry {
            terminal: options.terminal,
            reactions: IndexMap::new(),
            on_enter: options.on_enter,
            on_exit: options.on_exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_builder_collects_transitions_in_order() {
        let descriptor = StateDescriptor::new("a")
            .next_state("x", "b")
            .next_state("y", "c")
            .next_state("z", "d");

        let events: Vec<_> = descriptor.next_states.keys().cloned().collect();
        assert_eq!(events, ["x", "y", "z"]);
        assert!(!descriptor.is_terminal);
    }

    #[test]
    fn descriptor_options_carry_flags_and_hooks() {
        let hook = Hook::named("enter", |_, _| {});
        let descriptor = StateDescriptor::new("end").terminal().on_enter(hook.clone());

        let options = descriptor.options();
        assert!(options.terminal);
        assert!(options.on_enter.as_ref().is_some_and(|h| h.ptr_eq(&hook)));
        assert!(options.on_exit.is_none());
    }

    #[test]
    fn entry_starts_without_reactions() {
        let entry = StateEntry::from(StateOptions::new().terminal());
        assert!(entry.terminal);
        assert!(entry.reactions.is_empty());
    }
}
