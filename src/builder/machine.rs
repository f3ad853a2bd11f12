//! Fluent builder for machines.

use crate::core::{Reaction, StateDescriptor};
use crate::error::Result;
use crate::machine::{FiniteMachine, HierarchicalMachine};

/// Builder for constructing machines with a fluent API.
///
/// States are registered before transitions, and transitions before
/// reactions, whatever order the builder calls were made in.
///
/// # Example
///
/// ```rust
/// use automata::builder::MachineBuilder;
/// use automata::core::{Reaction, StateDescriptor};
///
/// let mut machine = MachineBuilder::new()
///     .state(StateDescriptor::new("down").next_state("jump", "up"))
///     .state(StateDescriptor::new("up").next_state("fall", "down"))
///     .reaction("up", "jump", Reaction::emit("fall"))
///     .initial("down")
///     .frozen()
///     .build()
///     .unwrap();
///
/// assert!(machine.is_frozen());
/// machine.initialize(None).unwrap();
/// assert_eq!(machine.current_state(), Some("down"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct MachineBuilder {
    states: Vec<StateDescriptor>,
    reactions: Vec<(String, String, Reaction)>,
    initial: Option<String>,
    freeze: bool,
}

/// Operations shared by both machine kinds that the builder needs.
trait Assemble: Sized {
    fn from_descriptors(descriptors: Vec<StateDescriptor>) -> Result<Self>;
    fn react(&mut self, state: &str, event: String, reaction: Reaction) -> Result<()>;
    fn start_at(&mut self, state: String) -> Result<()>;
    fn lock(&mut self);
}

impl Assemble for FiniteMachine {
    fn from_descriptors(descriptors: Vec<StateDescriptor>) -> Result<Self> {
        FiniteMachine::build(descriptors)
    }

    fn react(&mut self, state: &str, event: String, reaction: Reaction) -> Result<()> {
        self.add_reaction(state, event, reaction)
    }

    fn start_at(&mut self, state: String) -> Result<()> {
        self.set_default_start_state(state)
    }

    fn lock(&mut self) {
        self.freeze()
    }
}

impl Assemble for HierarchicalMachine {
    fn from_descriptors(descriptors: Vec<StateDescriptor>) -> Result<Self> {
        HierarchicalMachine::build(descriptors)
    }

    fn react(&mut self, state: &str, event: String, reaction: Reaction) -> Result<()> {
        self.add_reaction(state, event, reaction)
    }

    fn start_at(&mut self, state: String) -> Result<()> {
        self.set_default_start_state(state)
    }

    fn lock(&mut self) {
        self.freeze()
    }
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state with its outgoing transitions.
    pub fn state(mut self, descriptor: StateDescriptor) -> Self {
        self.states.push(descriptor);
        self
    }

    /// Add multiple states at once.
    pub fn states(mut self, descriptors: impl IntoIterator<Item = StateDescriptor>) -> Self {
        self.states.extend(descriptors);
        self
    }

    pub fn reaction(
        mut self,
        state: impl Into<String>,
        event: impl Into<String>,
        reaction: Reaction,
    ) -> Self {
        self.reactions.push((state.into(), event.into(), reaction));
        self
    }

    /// Set the default start state.
    pub fn initial(mut self, state: impl Into<String>) -> Self {
        self.initial = Some(state.into());
        self
    }

    /// Freeze the machine once it is built.
    pub fn frozen(mut self) -> Self {
        self.freeze = true;
        self
    }

    /// Build a finite machine.
    pub fn build(self) -> Result<FiniteMachine> {
        self.assemble()
    }

    /// Build a hierarchical machine; nested states can be added afterwards
    /// unless the builder was frozen.
    pub fn build_hierarchical(self) -> Result<HierarchicalMachine> {
        self.assemble()
    }

    fn assemble<M: Assemble>(self) -> Result<M> {
        let mut machine = M::from_descriptors(self.states)?;
        for (state, event, reaction) in self.reactions {
            machine.react(&state, event, reaction)?;
        }
        if let Some(initial) = self.initial {
            machine.start_at(initial)?;
        }
        if self.freeze {
            machine.lock();
        }
        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StateOptions;
    use crate::error::MachineError;

    #[test]
    fn empty_builder_builds_empty_machine() {
        let machine = MachineBuilder::new().build().unwrap();
        assert!(machine.states().is_empty());
        assert!(machine.default_start_state().is_none());
    }

    #[test]
    fn builder_reports_unknown_initial_state() {
        let result = MachineBuilder::new()
            .state(StateDescriptor::new("a"))
            .initial("b")
            .build();
        assert!(matches!(result, Err(MachineError::NotFound { .. })));
    }

    #[test]
    fn builder_reports_reaction_on_unknown_state() {
        let result = MachineBuilder::new()
            .state(StateDescriptor::new("a"))
            .reaction("b", "go", Reaction::emit("stop"))
            .build();
        assert!(matches!(result, Err(MachineError::NotFound { .. })));
    }

    #[test]
    fn reactions_are_attached_to_built_machine() {
        let mut machine = MachineBuilder::new()
            .states([
                StateDescriptor::new("a").next_state("go", "b"),
                StateDescriptor::new("b"),
            ])
            .reaction("b", "go", Reaction::emit("again"))
            .initial("a")
            .build()
            .unwrap();

        machine.initialize(None).unwrap();
        let effect = machine.process_event("go").unwrap();
        assert_eq!(
            effect.reaction().map(|r| r.invoke("a", "b", "go")).as_deref(),
            Some("again")
        );
    }

    #[test]
    fn hierarchical_build_accepts_nested_states_later() {
        let mut machine = MachineBuilder::new()
            .state(StateDescriptor::new("a"))
            .build_hierarchical()
            .unwrap();

        let inner = HierarchicalMachine::new().into_ref();
        machine
            .add_nested_state("b", StateOptions::new(), inner)
            .unwrap();
        assert_eq!(machine.nested_machines().len(), 1);
    }

    #[test]
    fn frozen_builder_yields_frozen_hierarchical_machine() {
        let mut machine = MachineBuilder::new()
            .state(StateDescriptor::new("a"))
            .frozen()
            .build_hierarchical()
            .unwrap();
        assert_eq!(
            machine.add_state("b", StateOptions::new()),
            Err(MachineError::FrozenMachine)
        );
    }
}
