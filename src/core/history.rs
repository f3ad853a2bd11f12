//! Record of the steps taken while driving a machine.
//!
//! Runners produce one [`StateTransition`] per processed event and collect
//! them into an immutable [`StateHistory`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single processed event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being transitioned from
    pub from: String,
    /// The state being transitioned to
    pub to: String,
    /// The event that triggered the move
    pub event: String,
    /// Depth of the machine that handled the event (0 is the outermost)
    pub depth: usize,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

impl StateTransition {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        event: impl Into<String>,
        depth: usize,
    ) -> Self {
        StateTransition {
            from: from.into(),
            to: to.into(),
            event: event.into(),
            depth,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered history of processed events.
///
/// `record` returns a new history and leaves the receiver untouched.
///
/// # Example
///
/// ```rust
/// use automata::core::{StateHistory, StateTransition};
///
/// let history = StateHistory::new()
///     .record(StateTransition::new("down", "up", "jump", 0))
///     .record(StateTransition::new("up", "down", "fall", 0));
///
/// assert_eq!(history.get_path(), ["down", "up", "down"]);
/// assert_eq!(history.events(), ["jump", "fall"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// States traversed: the first `from`, then every `to`.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Events in the order they were processed.
    pub fn events(&self) -> Vec<&str> {
        self.transitions.iter().map(|t| t.event.as_str()).collect()
    }

    /// Time between the first and last recorded transition.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

impl FromIterator<StateTransition> for StateHistory {
    fn from_iter<I: IntoIterator<Item = StateTransition>>(iter: I) -> Self {
        StateHistory {
            transitions: iter.into_iter().collect(),
        }
    }
}
