//! Hierarchical state machine: states may own nested machines.

use crate::core::{Reaction, StateDescriptor, StateOptions};
use crate::error::{MachineError, Result};
use crate::machine::finite::{CopyMode, FiniteMachine};
use crate::machine::jump::{Effect, Jump};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Shared handle to a machine nested inside a state.
pub type MachineRef = Rc<RefCell<HierarchicalMachine>>;

/// Picks the start state of a nested machine during a cascaded
/// initialization. `None` keeps that machine's default start state.
pub type StartStateFetcher<'a> = &'a dyn Fn(&HierarchicalMachine) -> Option<String>;

/// A finite machine whose states may each carry a nested machine.
///
/// Entering such a state does not drive the nested machine; the effect
/// returned by [`process_event`] names it so that a runner can descend.
/// Initializing the machine initializes every nested machine, recursively.
///
/// [`process_event`]: HierarchicalMachine::process_event
///
/// # Example
///
/// ```rust
/// use automata::core::StateOptions;
/// use automata::HierarchicalMachine;
///
/// let mut inner = HierarchicalMachine::new();
/// inner.add_state("idle", StateOptions::new()).unwrap();
/// inner.set_default_start_state("idle").unwrap();
/// let inner = inner.into_ref();
///
/// let mut outer = HierarchicalMachine::new();
/// outer.add_state("off", StateOptions::new()).unwrap();
/// outer
///     .add_nested_state("on", StateOptions::new(), inner.clone())
///     .unwrap();
/// outer.add_transition("off", "on", "power").unwrap();
///
/// outer.initialize(Some("off")).unwrap();
/// assert_eq!(inner.borrow().current_state(), Some("idle"));
///
/// let effect = outer.process_event("power").unwrap();
/// assert!(effect.machine().is_some());
/// ```
#[derive(Default)]
pub struct HierarchicalMachine {
    base: FiniteMachine,
    nested: Rc<RefCell<IndexMap<String, MachineRef>>>,
}

// Only the names of states carrying a nested machine are printed, so a
// machine nested inside itself still formats.
impl fmt::Debug for HierarchicalMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nested: Vec<String> = self
            .nested
            .try_borrow()
            .map(|nested| nested.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("HierarchicalMachine")
            .field("base", &self.base)
            .field("nested_states", &nested)
            .finish()
    }
}

impl HierarchicalMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a machine from state descriptors; see [`FiniteMachine::build`].
    pub fn build(descriptors: impl IntoIterator<Item = StateDescriptor>) -> Result<Self> {
        let mut machine = Self::new();
        machine.base.add_descriptors(descriptors)?;
        Ok(machine)
    }

    /// Wrap the machine into a handle that can be nested in another one.
    pub fn into_ref(self) -> MachineRef {
        Rc::new(RefCell::new(self))
    }

    pub fn add_state(&mut self, name: impl Into<String>, options: StateOptions) -> Result<()> {
        self.base.add_state(name, options)
    }

    /// Register a state that carries `machine`.
    ///
    /// Nested machines are always hierarchical; a plain finite machine is
    /// nested as a `HierarchicalMachine` without nested states of its own.
    pub fn add_nested_state(
        &mut self,
        name: impl Into<String>,
        options: StateOptions,
        machine: MachineRef,
    ) -> Result<()> {
        let name = name.into();
        self.base.add_state(name.clone(), options)?;
        self.nested.borrow_mut().insert(name, machine);
        Ok(())
    }

    pub fn add_transition(
        &mut self,
        start: &str,
        end: &str,
        event: impl Into<String>,
    ) -> Result<()> {
        self.base.add_transition(start, end, event)
    }

    pub fn replace_transition(
        &mut self,
        start: &str,
        end: &str,
        event: impl Into<String>,
    ) -> Result<()> {
        self.base.replace_transition(start, end, event)
    }

    pub fn add_reaction(
        &mut self,
        state: &str,
        event: impl Into<String>,
        reaction: Reaction,
    ) -> Result<()> {
        self.base.add_reaction(state, event, reaction)
    }

    pub fn default_start_state(&self) -> Option<&str> {
        self.base.default_start_state()
    }

    pub fn set_default_start_state(&mut self, state: impl Into<String>) -> Result<()> {
        self.base.set_default_start_state(state)
    }

    pub fn current_state(&self) -> Option<&str> {
        self.base.current_state()
    }

    pub fn terminated(&self) -> bool {
        self.base.terminated()
    }

    pub fn is_frozen(&self) -> bool {
        self.base.is_frozen()
    }

    pub fn freeze(&mut self) {
        self.base.freeze()
    }

    pub fn contains(&self, state: &str) -> bool {
        self.base.contains(state)
    }

    pub fn is_terminal_state(&self, state: &str) -> Option<bool> {
        self.base.is_terminal_state(state)
    }

    pub fn states(&self) -> Vec<String> {
        self.base.states()
    }

    pub fn events(&self) -> usize {
        self.base.events()
    }

    pub fn jumps(&self) -> Vec<(String, String, Jump)> {
        self.base.jumps()
    }

    pub fn iter(&self) -> std::vec::IntoIter<(String, String, String)> {
        self.base.iter()
    }

    pub fn is_actionable_event(&self, event: &str) -> bool {
        self.base.is_actionable_event(event)
    }

    /// Nested machines keyed by the state that carries them.
    pub fn nested_machines(&self) -> IndexMap<String, MachineRef> {
        self.nested.borrow().clone()
    }

    /// Move the machine in response to `event`; see
    /// [`FiniteMachine::process_event`]. The effect also names the machine
    /// nested in the new state.
    pub fn process_event(&mut self, event: &str) -> Result<Effect> {
        let effect = self.base.process_event(event)?;
        let machine = self
            .current_state()
            .and_then(|state| self.nested.borrow().get(state).cloned());
        Ok(effect.into_nested(machine))
    }

    /// Initialize this machine and every nested machine with its own default
    /// start state.
    pub fn initialize(&mut self, start_state: Option<&str>) -> Result<()> {
        self.initialize_with(start_state, None)
    }

    /// Initialize this machine, then every nested machine, recursively.
    ///
    /// `fetcher` is asked once per nested machine, at every depth, for the
    /// start state to use.
    pub fn initialize_with(
        &mut self,
        start_state: Option<&str>,
        fetcher: Option<StartStateFetcher<'_>>,
    ) -> Result<()> {
        self.base.initialize(start_state)?;
        for (state, machine) in self.nested_machines() {
            let mut nested = machine.try_borrow_mut().map_err(|_| {
                MachineError::invalid_state(
                    Some(&state),
                    "nested machine is already in use (cyclic nesting?)",
                )
            })?;
            let start = fetcher.and_then(|fetch| fetch(&*nested));
            debug!(state = %state, start = ?start, "initializing nested machine");
            nested.initialize_with(start.as_deref(), fetcher)?;
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self, event: &str) {
        self.base.leave(event)
    }

    /// Copy this machine; see [`FiniteMachine::copy`].
    ///
    /// The nested-machine index follows `mode` like the state tables do. The
    /// nested machines themselves are shared by both copies either way.
    pub fn copy(&self, mode: CopyMode, unfreeze: bool) -> Self {
        let nested = match mode {
            CopyMode::Deep => Rc::new(RefCell::new(self.nested_machines())),
            CopyMode::Shallow => Rc::clone(&self.nested),
        };
        HierarchicalMachine {
            base: self.base.copy(mode, unfreeze),
            nested,
        }
    }
}

impl<'a> IntoIterator for &'a HierarchicalMachine {
    type Item = (String, String, String);
    type IntoIter = std::vec::IntoIter<(String, String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
