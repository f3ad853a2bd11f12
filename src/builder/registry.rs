//! Name-to-callback registry used to load machine specs.

use super::machine::MachineBuilder;
use super::spec::{MachineSpec, ReactionSpec, StateSpec};
use crate::core::{Hook, Reaction, ReactionCall, StateDescriptor};
use crate::error::{MachineError, Result};
use crate::machine::{FiniteMachine, HierarchicalMachine};
use indexmap::IndexMap;
use tracing::trace;

/// Callbacks a [`MachineSpec`] may refer to by name.
///
/// # Example
///
/// ```rust
/// use automata::builder::{HookRegistry, MachineSpec};
///
/// let registry = HookRegistry::new()
///     .hook("noop", |_, _| {})
///     .reaction("bounce", |call| {
///         if call.new_state == "up" { "fall".into() } else { "jump".into() }
///     });
///
/// let spec = MachineSpec::from_json(
///     r#"{
///         "states": [
///             {"name": "down", "next_states": {"jump": "up"}, "on_exit": "noop"},
///             {"name": "up", "next_states": {"fall": "down"}}
///         ],
///         "default_start_state": "down",
///         "reactions": [{"state": "up", "event": "jump", "reaction": "bounce"}]
///     }"#,
/// )
/// .unwrap();
///
/// let mut machine = registry.load(&spec).unwrap();
/// machine.initialize(None).unwrap();
/// let effect = machine.process_event("jump").unwrap();
/// assert_eq!(effect.reaction().unwrap().invoke("down", "up", "jump"), "fall");
/// ```
#[derive(Clone, Debug, Default)]
pub struct HookRegistry {
    hooks: IndexMap<String, Hook>,
    reactions: IndexMap<String, Reaction>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an enter/exit hook under `name`, labelled with that name.
    pub fn hook<F>(mut self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&str, &str) + 'static,
    {
        let name = name.into();
        self.hooks.insert(name.clone(), Hook::named(name, callback));
        self
    }

    /// Register a reaction callback under `name`.
    pub fn reaction<F>(mut self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&ReactionCall<'_>) -> String + 'static,
    {
        self.reactions.insert(name.into(), Reaction::new(callback));
        self
    }

    fn lookup_hook(&self, state: &str, kind: &str, name: Option<&String>) -> Result<Option<Hook>> {
        let Some(name) = name else {
            return Ok(None);
        };
        self.hooks.get(name).cloned().map(Some).ok_or_else(|| {
            MachineError::validation(
                format!("{kind} hook '{name}' of state '{state}'"),
                "not a registered callback",
            )
        })
    }

    /// Turn a state spec into a descriptor.
    pub fn resolve_state(&self, spec: &StateSpec) -> Result<StateDescriptor> {
        Ok(StateDescriptor {
            name: spec.name.clone(),
            is_terminal: spec.is_terminal,
            next_states: spec.next_states.clone(),
            on_enter: self.lookup_hook(&spec.name, "on_enter", spec.on_enter.as_ref())?,
            on_exit: self.lookup_hook(&spec.name, "on_exit", spec.on_exit.as_ref())?,
        })
    }

    /// Resolve a reaction spec into its callback with bound arguments.
    pub fn resolve_reaction(&self, spec: &ReactionSpec) -> Result<Reaction> {
        let Some(reaction) = self.reactions.get(&spec.reaction) else {
            return Err(MachineError::validation(
                format!(
                    "reaction '{}' of state '{}' on event '{}'",
                    spec.reaction, spec.state, spec.event
                ),
                "not a registered callback",
            ));
        };
        let reaction = spec
            .kwargs
            .iter()
            .fold(reaction.clone().with_args(spec.args.iter().cloned()), |r, (k, v)| {
                r.with_kwarg(k.clone(), v.clone())
            });
        Ok(reaction)
    }

    /// Resolve every state of a machine spec.
    pub fn descriptors(&self, spec: &MachineSpec) -> Result<Vec<StateDescriptor>> {
        spec.states.iter().map(|state| self.resolve_state(state)).collect()
    }

    fn builder(&self, spec: &MachineSpec) -> Result<MachineBuilder> {
        let mut builder = MachineBuilder::new().states(self.descriptors(spec)?);
        for reaction in &spec.reactions {
            builder = builder.reaction(
                reaction.state.clone(),
                reaction.event.clone(),
                self.resolve_reaction(reaction)?,
            );
        }
        if let Some(initial) = &spec.default_start_state {
            builder = builder.initial(initial.clone());
        }
        if spec.frozen {
            builder = builder.frozen();
        }
        trace!(
            states = spec.states.len(),
            reactions = spec.reactions.len(),
            "loading machine spec"
        );
        Ok(builder)
    }

    /// Build a finite machine from a spec.
    pub fn load(&self, spec: &MachineSpec) -> Result<FiniteMachine> {
        self.builder(spec)?.build()
    }

    /// Build a hierarchical machine from a spec.
    pub fn load_hierarchical(&self, spec: &MachineSpec) -> Result<HierarchicalMachine> {
        self.builder(spec)?.build_hierarchical()
    }
}
