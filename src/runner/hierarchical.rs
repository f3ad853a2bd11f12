//! Driver for hierarchical machines.

use crate::core::{StateHistory, StateTransition};
use crate::error::{MachineError, Result};
use crate::machine::{HierarchicalMachine, MachineRef};
use std::cell::RefMut;
use std::rc::Rc;
use tracing::debug;

fn borrow_mut(machine: &MachineRef) -> Result<RefMut<'_, HierarchicalMachine>> {
    machine.try_borrow_mut().map_err(|_| {
        MachineError::invalid_state(None, "can not drive a machine that is already in use")
    })
}

/// Drives a [`HierarchicalMachine`] and the machines nested in it.
///
/// Events go to the innermost active machine. When that machine has no use
/// for an event (no transition, or it sits in a terminal state) it leaves
/// its current state and the event is offered to its parent. Only the
/// outermost machine's errors reach the caller.
///
/// # Example
///
/// ```rust
/// use automata::core::{Reaction, StateOptions};
/// use automata::runner::HierarchicalRunner;
/// use automata::HierarchicalMachine;
///
/// let mut inner = HierarchicalMachine::new();
/// inner.add_state("warming", StateOptions::new()).unwrap();
/// inner.add_state("ready", StateOptions::new().terminal()).unwrap();
/// inner.add_transition("warming", "ready", "heat").unwrap();
/// inner.add_reaction("ready", "heat", Reaction::emit("serve")).unwrap();
/// inner.set_default_start_state("warming").unwrap();
///
/// let mut outer = HierarchicalMachine::new();
/// outer.add_state("idle", StateOptions::new()).unwrap();
/// outer
///     .add_nested_state("brewing", StateOptions::new(), inner.into_ref())
///     .unwrap();
/// outer.add_state("served", StateOptions::new().terminal()).unwrap();
/// outer.add_transition("idle", "brewing", "brew").unwrap();
/// outer.add_transition("brewing", "served", "serve").unwrap();
/// outer.add_reaction("brewing", "brew", Reaction::emit("heat")).unwrap();
/// outer.set_default_start_state("idle").unwrap();
///
/// let runner = HierarchicalRunner::new(outer.into_ref());
/// let history = runner.run("brew", true).unwrap();
/// assert_eq!(history.events(), ["brew", "heat", "serve"]);
/// ```
pub struct HierarchicalRunner {
    machine: MachineRef,
}

impl HierarchicalRunner {
    pub fn new(machine: MachineRef) -> Self {
        HierarchicalRunner { machine }
    }

    /// The outermost machine.
    pub fn machine(&self) -> &MachineRef {
        &self.machine
    }

    /// Step through the hierarchy starting with `event`.
    ///
    /// With `initialize` set the outermost machine, and through it every
    /// nested machine, is initialized first.
    pub fn run_iter(&self, event: impl Into<String>, initialize: bool) -> Result<NestedSteps> {
        if initialize {
            borrow_mut(&self.machine)?.initialize(None)?;
        }
        Ok(NestedSteps {
            stack: vec![Rc::clone(&self.machine)],
            next: Some(event.into()),
        })
    }

    /// Run until the hierarchy settles and return every step taken.
    pub fn run(&self, event: impl Into<String>, initialize: bool) -> Result<StateHistory> {
        self.run_iter(event, initialize)?.collect()
    }
}

/// Iterator over the steps of a [`HierarchicalRunner`] run.
///
/// Each step records the depth of the machine that handled the event.
pub struct NestedSteps {
    stack: Vec<MachineRef>,
    next: Option<String>,
}

impl NestedSteps {
    /// Machines currently active, outermost first.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn step(&mut self, event: String) -> Result<StateTransition> {
        loop {
            let Some(machine) = self.stack.last().cloned() else {
                return Err(MachineError::NotInitialized { event });
            };
            let depth = self.stack.len() - 1;

            let mut active = borrow_mut(&machine)?;
            let from = active.current_state().map(str::to_string);
            let effect = match active.process_event(&event) {
                Ok(effect) => effect,
                Err(MachineError::NotFound { .. } | MachineError::InvalidState { .. })
                    if depth > 0 =>
                {
                    debug!(depth, event = %event, "passing event to parent machine");
                    active.leave(&event);
                    drop(active);
                    self.stack.pop();
                    continue;
                }
                Err(err) => return Err(err),
            };
            // process_event only succeeds on an initialized machine.
            let from = from.unwrap_or_default();
            let to = active.current_state().unwrap_or_default().to_string();
            drop(active);
            debug!(depth, from = %from, to = %to, event = %event, "runner step");

            if let Some(nested) = effect.machine() {
                if !Rc::ptr_eq(nested, &machine) {
                    let mut child = borrow_mut(nested)?;
                    if child.current_state().is_none() {
                        child.initialize(None)?;
                    }
                    drop(child);
                    self.stack.push(Rc::clone(nested));
                }
            }

            let finished = effect.is_terminal() && depth == 0;
            if !finished {
                self.next = effect
                    .reaction()
                    .map(|reaction| reaction.invoke(&from, &to, &event));
            }
            return Ok(StateTransition::new(from, to, event, depth));
        }
    }
}

impl Iterator for NestedSteps {
    type Item = Result<StateTransition>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.next.take()?;
        Some(self.step(event))
    }
}
