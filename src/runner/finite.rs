//! Driver for finite machines.

use crate::core::{StateHistory, StateTransition};
use crate::error::{MachineError, Result};
use crate::machine::FiniteMachine;
use tracing::debug;

/// Feeds reaction-produced events back into a [`FiniteMachine`].
///
/// # Example
///
/// ```rust
/// use automata::core::{Reaction, StateDescriptor};
/// use automata::runner::FiniteRunner;
/// use automata::builder::MachineBuilder;
///
/// let mut machine = MachineBuilder::new()
///     .state(StateDescriptor::new("idle").next_state("start", "busy"))
///     .state(StateDescriptor::new("busy").next_state("finish", "done"))
///     .state(StateDescriptor::new("done").terminal())
///     .reaction("busy", "start", Reaction::emit("finish"))
///     .initial("idle")
///     .build()
///     .unwrap();
///
/// let history = FiniteRunner::new(&mut machine).run("start", true).unwrap();
/// assert_eq!(history.get_path(), ["idle", "busy", "done"]);
/// assert!(machine.terminated());
/// ```
pub struct FiniteRunner<'m> {
    machine: &'m mut FiniteMachine,
}

impl<'m> FiniteRunner<'m> {
    pub fn new(machine: &'m mut FiniteMachine) -> Self {
        FiniteRunner { machine }
    }

    /// Step through the machine starting with `event`.
    ///
    /// With `initialize` set the machine is first initialized into its
    /// default start state. The iterator ends once a terminal state is
    /// reached or a step has no reaction; an oscillating machine never ends.
    pub fn run_iter(&mut self, event: impl Into<String>, initialize: bool) -> Result<Steps<'_>> {
        if initialize {
            self.machine.initialize(None)?;
        }
        Ok(Steps {
            machine: &mut *self.machine,
            next: Some(event.into()),
        })
    }

    /// Run until the machine settles and return every step taken.
    pub fn run(&mut self, event: impl Into<String>, initialize: bool) -> Result<StateHistory> {
        self.run_iter(event, initialize)?.collect()
    }
}

/// Iterator over the steps of a [`FiniteRunner`] run.
///
/// Yields an error at most once, then ends.
pub struct Steps<'r> {
    machine: &'r mut FiniteMachine,
    next: Option<String>,
}

impl Steps<'_> {
    fn step(&mut self, event: String) -> Result<StateTransition> {
        let Some(from) = self.machine.current_state().map(str::to_string) else {
            return Err(MachineError::NotInitialized { event });
        };
        let effect = self.machine.process_event(&event)?;
        let to = self.machine.current_state().unwrap_or_default().to_string();
        debug!(from = %from, to = %to, event = %event, "runner step");

        if !effect.is_terminal() {
            self.next = effect
                .reaction()
                .map(|reaction| reaction.invoke(&from, &to, &event));
        }
        Ok(StateTransition::new(from, to, event, 0))
    }
}

impl Iterator for Steps<'_> {
    type Item = Result<StateTransition>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.next.take()?;
        Some(self.step(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MachineBuilder;
    use crate::core::{Reaction, StateDescriptor};

    fn oscillator() -> FiniteMachine {
        MachineBuilder::new()
            .state(StateDescriptor::new("down").next_state("jump", "up"))
            .state(StateDescriptor::new("up").next_state("fall", "down"))
            .reaction("up", "jump", Reaction::emit("fall"))
            .reaction("down", "fall", Reaction::emit("jump"))
            .initial("down")
            .build()
            .unwrap()
    }

    #[test]
    fn oscillating_machine_keeps_stepping() {
        let mut machine = oscillator();
        let mut runner = FiniteRunner::new(&mut machine);
        let steps: Vec<_> = runner
            .run_iter("jump", true)
            .unwrap()
            .take(5)
            .map(|step| step.unwrap())
            .map(|step| (step.from, step.to))
            .collect();

        assert_eq!(
            steps,
            [
                ("down".to_string(), "up".to_string()),
                ("up".to_string(), "down".to_string()),
                ("down".to_string(), "up".to_string()),
                ("up".to_string(), "down".to_string()),
                ("down".to_string(), "up".to_string()),
            ]
        );
    }

    #[test]
    fn run_stops_without_reaction() {
        let mut machine = MachineBuilder::new()
            .state(StateDescriptor::new("a").next_state("go", "b"))
            .state(StateDescriptor::new("b").next_state("back", "a"))
            .initial("a")
            .build()
            .unwrap();

        let history = FiniteRunner::new(&mut machine).run("go", true).unwrap();
        assert_eq!(history.events(), ["go"]);
        assert_eq!(machine.current_state(), Some("b"));
    }

    #[test]
    fn run_without_initialize_requires_initialized_machine() {
        let mut machine = oscillator();
        let result = FiniteRunner::new(&mut machine).run("jump", false);
        assert!(matches!(result, Err(MachineError::NotInitialized { .. })));
    }

    #[test]
    fn error_ends_iteration() {
        let mut machine = oscillator();
        let mut runner = FiniteRunner::new(&mut machine);
        let mut steps = runner.run_iter("sideways", true).unwrap();

        assert!(matches!(steps.next(), Some(Err(MachineError::NotFound { .. }))));
        assert!(steps.next().is_none());
    }

    #[test]
    fn run_continues_from_current_state() {
        let mut machine = MachineBuilder::new()
            .state(StateDescriptor::new("a").next_state("go", "b"))
            .state(StateDescriptor::new("b").next_state("go", "c"))
            .state(StateDescriptor::new("c").terminal())
            .build()
            .unwrap();
        machine.initialize(Some("b")).unwrap();

        let history = FiniteRunner::new(&mut machine).run("go", false).unwrap();
        assert_eq!(history.get_path(), ["b", "c"]);
    }
}
