//! Resolved transitions and the effect of processing an event.

use crate::core::{Hook, Reaction};
use crate::machine::hierarchical::MachineRef;
use std::fmt;
use std::rc::Rc;

/// Resolved effect of firing one event from one state.
///
/// The hooks are captured when the transition is added: reassigning a
/// state's hooks afterwards does not change transitions that already exist.
/// The same shape doubles as the machine's cursor, where `on_exit` is the
/// hook fired when the machine next leaves.
#[derive(Clone, Debug)]
pub struct Jump {
    pub(crate) target: String,
    pub(crate) on_enter: Option<Hook>,
    pub(crate) on_exit: Option<Hook>,
}

impl Jump {
    pub(crate) fn new(
        target: impl Into<String>,
        on_enter: Option<Hook>,
        on_exit: Option<Hook>,
    ) -> Self {
        Jump {
            target: target.into(),
            on_enter,
            on_exit,
        }
    }

    /// Name of the state this jump lands in.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Enter hook of the target, as captured when the jump was created.
    pub fn on_enter(&self) -> Option<&Hook> {
        self.on_enter.as_ref()
    }

    /// Exit hook of the source, as captured when the jump was created.
    pub fn on_exit(&self) -> Option<&Hook> {
        self.on_exit.as_ref()
    }
}

/// What a caller should do after an event was processed.
///
/// Finite machines produce [`Effect::Flat`]; hierarchical machines produce
/// [`Effect::Nested`], which also names the machine attached to the new
/// state, if any.
#[derive(Clone)]
pub enum Effect {
    Flat {
        reaction: Option<Reaction>,
        terminal: bool,
    },
    Nested {
        reaction: Option<Reaction>,
        terminal: bool,
        machine: Option<MachineRef>,
    },
}

impl Effect {
    /// Reaction registered for `(new_state, event)`, if any.
    pub fn reaction(&self) -> Option<&Reaction> {
        match self {
            Effect::Flat { reaction, .. } | Effect::Nested { reaction, .. } => reaction.as_ref(),
        }
    }

    /// Whether the new state is terminal.
    pub fn is_terminal(&self) -> bool {
        match self {
            Effect::Flat { terminal, .. } | Effect::Nested { terminal, .. } => *terminal,
        }
    }

    /// Nested machine attached to the new state.
    pub fn machine(&self) -> Option<&MachineRef> {
        match self {
            Effect::Flat { .. } => None,
            Effect::Nested { machine, .. } => machine.as_ref(),
        }
    }

    pub(crate) fn into_nested(self, machine: Option<MachineRef>) -> Effect {
        match self {
            Effect::Flat { reaction, terminal } | Effect::Nested { reaction, terminal, .. } => {
                Effect::Nested {
                    reaction,
                    terminal,
                    machine,
                }
            }
        }
    }
}

// The nested machine is shown by address; hierarchies may be cyclic.
impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Flat { reaction, terminal } => f
                .debug_struct("Flat")
                .field("reaction", reaction)
                .field("terminal", terminal)
                .finish(),
            Effect::Nested {
                reaction,
                terminal,
                machine,
            } => f
                .debug_struct("Nested")
                .field("reaction", reaction)
                .field("terminal", terminal)
                .field("machine", &machine.as_ref().map(Rc::as_ptr))
                .finish(),
        }
    }
}
