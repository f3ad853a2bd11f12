//! Finite state machine with enter/exit hooks and reactions.

use crate::core::{Reaction, StateDescriptor, StateEntry, StateOptions};
use crate::error::{MachineError, Result};
use crate::machine::jump::{Effect, Jump};
use indexmap::IndexMap;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use tracing::{debug, trace};

/// How [`FiniteMachine::copy`] treats the state and transition tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyMode {
    /// The copy gets its own tables; later changes on either side stay local.
    #[default]
    Deep,
    /// The copy shares the tables with its source and tracks its own cursor.
    Shallow,
}

/// States and transitions of a machine.
#[derive(Clone, Debug, Default)]
pub(crate) struct Topology {
    pub(crate) states: IndexMap<String, StateEntry>,
    pub(crate) transitions: IndexMap<String, IndexMap<String, Jump>>,
}

/// A finite state machine.
///
/// States, transitions and reactions are registered first, then the machine
/// is initialized into a start state and driven with [`process_event`].
///
/// The machine is meant to be driven by a single owner; it is not `Send`.
///
/// [`process_event`]: FiniteMachine::process_event
///
/// # Example
///
/// ```rust
/// use automata::core::{Reaction, StateOptions};
/// use automata::FiniteMachine;
///
/// let mut machine = FiniteMachine::new();
/// machine.add_state("down", StateOptions::new()).unwrap();
/// machine.add_state("up", StateOptions::new()).unwrap();
/// machine.add_transition("down", "up", "jump").unwrap();
/// machine.add_transition("up", "down", "fall").unwrap();
/// machine.add_reaction("up", "jump", Reaction::emit("fall")).unwrap();
///
/// machine.initialize(Some("down")).unwrap();
/// let effect = machine.process_event("jump").unwrap();
///
/// assert_eq!(machine.current_state(), Some("up"));
/// let next = effect.reaction().unwrap().invoke("down", "up", "jump");
/// assert_eq!(next, "fall");
/// ```
#[derive(Debug, Default)]
pub struct FiniteMachine {
    topology: Rc<RefCell<Topology>>,
    default_start_state: Option<String>,
    current: Option<Jump>,
    frozen: bool,
}

impl FiniteMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a machine from state descriptors.
    ///
    /// All states are registered before any transition, so descriptors may
    /// reference states that appear later in the sequence.
    pub fn build(descriptors: impl IntoIterator<Item = StateDescriptor>) -> Result<Self> {
        let mut machine = Self::new();
        machine.add_descriptors(descriptors)?;
        Ok(machine)
    }

    pub(crate) fn add_descriptors(
        &mut self,
        descriptors: impl IntoIterator<Item = StateDescriptor>,
    ) -> Result<()> {
        let descriptors: Vec<StateDescriptor> = descriptors.into_iter().collect();
        for descriptor in &descriptors {
            self.add_state(descriptor.name.clone(), descriptor.options())?;
        }
        for descriptor in &descriptors {
            for (event, target) in &descriptor.next_states {
                self.add_transition(&descriptor.name, target, event)?;
            }
        }
        Ok(())
    }

    fn topology(&self) -> Ref<'_, Topology> {
        self.topology.borrow()
    }

    fn topology_mut(&self) -> RefMut<'_, Topology> {
        self.topology.borrow_mut()
    }

    fn ensure_unfrozen(&self) -> Result<()> {
        if self.frozen {
            Err(MachineError::FrozenMachine)
        } else {
            Ok(())
        }
    }

    /// State used by `initialize` when no start state is given.
    pub fn default_start_state(&self) -> Option<&str> {
        self.default_start_state.as_deref()
    }

    pub fn set_default_start_state(&mut self, state: impl Into<String>) -> Result<()> {
        self.ensure_unfrozen()?;
        let state = state.into();
        if !self.contains(&state) {
            return Err(MachineError::not_found(state, None));
        }
        self.default_start_state = Some(state);
        Ok(())
    }

    /// Name of the state the machine is in, `None` before initialization.
    pub fn current_state(&self) -> Option<&str> {
        self.current.as_ref().map(|jump| jump.target.as_str())
    }

    /// True once the machine sits in a terminal state.
    pub fn terminated(&self) -> bool {
        self.current_state()
            .and_then(|name| self.is_terminal_state(name))
            .unwrap_or(false)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Register a new state.
    pub fn add_state(&mut self, name: impl Into<String>, options: StateOptions) -> Result<()> {
        self.ensure_unfrozen()?;
        let name = name.into();
        let mut topology = self.topology_mut();
        if topology.states.contains_key(&name) {
            return Err(MachineError::duplicate(name, None));
        }
        trace!(state = %name, terminal = options.terminal, "adding state");
        topology.states.insert(name.clone(), StateEntry::from(options));
        topology.transitions.insert(name, IndexMap::new());
        Ok(())
    }

    /// Register the callback that computes the next event after `event`
    /// lands the machine in `state`.
    ///
    /// The event does not need a matching transition out of any state; a
    /// reaction nothing can ever trigger is accepted and simply never used.
    pub fn add_reaction(
        &mut self,
        state: &str,
        event: impl Into<String>,
        reaction: Reaction,
    ) -> Result<()> {
        self.ensure_unfrozen()?;
        let event = event.into();
        let mut topology = self.topology_mut();
        let Some(entry) = topology.states.get_mut(state) else {
            return Err(MachineError::not_found(state, None));
        };
        if entry.reactions.contains_key(&event) {
            return Err(MachineError::duplicate(state, Some(&event)));
        }
        trace!(state, event = %event, "adding reaction");
        entry.reactions.insert(event, reaction);
        Ok(())
    }

    /// Register a transition `start --event--> end`.
    ///
    /// Re-adding an identical transition is a no-op; a different target for
    /// an existing `(start, event)` pair is a [`MachineError::Duplicate`].
    pub fn add_transition(
        &mut self,
        start: &str,
        end: &str,
        event: impl Into<String>,
    ) -> Result<()> {
        self.insert_transition(start, end, event.into(), false)
    }

    /// Register a transition, overwriting any existing target for
    /// `(start, event)`.
    pub fn replace_transition(
        &mut self,
        start: &str,
        end: &str,
        event: impl Into<String>,
    ) -> Result<()> {
        self.insert_transition(start, end, event.into(), true)
    }

    fn insert_transition(
        &mut self,
        start: &str,
        end: &str,
        event: String,
        replace: bool,
    ) -> Result<()> {
        self.ensure_unfrozen()?;
        let mut topology = self.topology_mut();
        let Some(source) = topology.states.get(start) else {
            return Err(MachineError::not_found(start, None));
        };
        let Some(target) = topology.states.get(end) else {
            return Err(MachineError::not_found(end, None));
        };
        if source.terminal {
            return Err(MachineError::invalid_state(
                Some(start),
                format!("can not add a transition on event '{event}' from a terminal state"),
            ));
        }
        // Hooks are snapshotted here and never looked up again.
        let jump = Jump::new(end, target.on_enter.clone(), source.on_exit.clone());

        let outgoing = topology.transitions.entry(start.to_string()).or_default();
        if let Some(existing) = outgoing.get(&event) {
            if !replace {
                if existing.target != end {
                    trace!(
                        start,
                        end,
                        existing = %existing.target,
                        event = %event,
                        "conflicting transition"
                    );
                    return Err(MachineError::duplicate(start, Some(&event)));
                }
                return Ok(());
            }
        }
        trace!(start, end, event = %event, replace, "adding transition");
        outgoing.insert(event, jump);
        Ok(())
    }

    /// True if `event` can be processed from the current state.
    pub fn is_actionable_event(&self, event: &str) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        let topology = self.topology();
        let terminal = topology
            .states
            .get(&current.target)
            .is_some_and(|entry| entry.terminal);
        !terminal
            && topology
                .transitions
                .get(&current.target)
                .is_some_and(|outgoing| outgoing.contains_key(event))
    }

    /// Move the machine in response to `event`.
    ///
    /// The exit hook carried by the current cursor fires first, then the
    /// enter hook captured by the transition, and only then does the cursor
    /// move. A panicking hook therefore leaves the cursor where it was.
    pub fn process_event(&mut self, event: &str) -> Result<Effect> {
        let Some(current) = self.current.clone() else {
            return Err(MachineError::NotInitialized {
                event: event.to_string(),
            });
        };
        let replacement = {
            let topology = self.topology();
            if topology
                .states
                .get(&current.target)
                .is_some_and(|entry| entry.terminal)
            {
                return Err(MachineError::invalid_state(
                    Some(&current.target),
                    format!("can not transition from a terminal state on event '{event}'"),
                ));
            }
            let Some(jump) = topology
                .transitions
                .get(&current.target)
                .and_then(|outgoing| outgoing.get(event))
            else {
                return Err(MachineError::not_found(&current.target, Some(event)));
            };
            jump.clone()
        };

        if let Some(on_exit) = &current.on_exit {
            on_exit.call(&current.target, event);
        }
        if let Some(on_enter) = &replacement.on_enter {
            on_enter.call(&replacement.target, event);
        }

        let effect = self.effect_for(&replacement.target, event);
        debug!(
            from = %current.target,
            to = %replacement.target,
            event,
            terminal = effect.is_terminal(),
            "processed event"
        );
        self.current = Some(replacement);
        Ok(effect)
    }

    fn effect_for(&self, state: &str, event: &str) -> Effect {
        let topology = self.topology();
        let entry = topology.states.get(state);
        Effect::Flat {
            reaction: entry.and_then(|entry| entry.reactions.get(event).cloned()),
            terminal: entry.is_some_and(|entry| entry.terminal),
        }
    }

    /// Place the machine in its start state.
    ///
    /// Uses `start_state` when given, the default start state otherwise. No
    /// enter hook fires on arrival; the start state's exit hook fires when
    /// the first transition leaves it. Calling this again restarts the
    /// machine.
    pub fn initialize(&mut self, start_state: Option<&str>) -> Result<()> {
        let start = start_state
            .map(str::to_string)
            .or_else(|| self.default_start_state.clone());
        let Some(start) = start else {
            return Err(MachineError::NotFound {
                state: None,
                event: None,
            });
        };
        let cursor = {
            let topology = self.topology();
            let Some(entry) = topology.states.get(&start) else {
                return Err(MachineError::not_found(start, None));
            };
            if entry.terminal {
                return Err(MachineError::invalid_state(
                    Some(&start),
                    "can not start from a terminal state",
                ));
            }
            Jump::new(start.as_str(), None, entry.on_exit.clone())
        };
        debug!(start = %start, "initialized machine");
        self.current = Some(cursor);
        Ok(())
    }

    /// Leave the current state without taking a transition.
    ///
    /// Fires the cursor's exit hook with `event` and clears the cursor. Used
    /// when a runner abandons a nested machine.
    pub(crate) fn leave(&mut self, event: &str) {
        if let Some(current) = self.current.take() {
            if let Some(on_exit) = &current.on_exit {
                on_exit.call(&current.target, event);
            }
        }
    }

    /// Copy this machine.
    ///
    /// The copy is never initialized. It keeps the source's frozen flag
    /// unless `unfreeze` is set.
    pub fn copy(&self, mode: CopyMode, unfreeze: bool) -> Self {
        let topology = match mode {
            CopyMode::Deep => Rc::new(RefCell::new(Topology::clone(&self.topology()))),
            CopyMode::Shallow => Rc::clone(&self.topology),
        };
        trace!(?mode, unfreeze, "copying machine");
        FiniteMachine {
            topology,
            default_start_state: self.default_start_state.clone(),
            current: None,
            frozen: self.frozen && !unfreeze,
        }
    }

    /// Prevent any further change to states, transitions and reactions.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn contains(&self, state: &str) -> bool {
        self.topology().states.contains_key(state)
    }

    /// Whether `state` is terminal, `None` for an unknown state.
    pub fn is_terminal_state(&self, state: &str) -> Option<bool> {
        self.topology().states.get(state).map(|entry| entry.terminal)
    }

    /// State names in registration order.
    pub fn states(&self) -> Vec<String> {
        self.topology().states.keys().cloned().collect()
    }

    /// Number of registered `(state, event)` transitions.
    pub fn events(&self) -> usize {
        self.topology()
            .transitions
            .values()
            .map(|outgoing| outgoing.len())
            .sum()
    }

    /// `(start, event, jump)` entries in registration order.
    pub fn jumps(&self) -> Vec<(String, String, Jump)> {
        self.topology()
            .transitions
            .iter()
            .flat_map(|(start, outgoing)| {
                outgoing
                    .iter()
                    .map(move |(event, jump)| (start.clone(), event.clone(), jump.clone()))
            })
            .collect()
    }

    /// `(start, event, end)` triples in registration order.
    pub fn iter(&self) -> std::vec::IntoIter<(String, String, String)> {
        self.jumps()
            .into_iter()
            .map(|(start, event, jump)| (start, event, jump.target))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl<'a> IntoIterator for &'a FiniteMachine {
    type Item = (String, String, String);
    type IntoIter = std::vec::IntoIter<(String, String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
