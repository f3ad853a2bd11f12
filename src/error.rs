//! Errors raised by machine construction, loading and event processing.

use thiserror::Error;

/// Errors that can occur when building or driving a state machine.
///
/// Every failing operation leaves the state and transition tables exactly
/// as they were before the call. Variants carry the state and event
/// involved so callers can match on them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    /// Mutation attempted after `freeze()`
    #[error("Frozen machine can't be modified")]
    FrozenMachine,

    /// State registered twice, or a second reaction or a conflicting
    /// transition for the same `(state, event)`
    #[error("{} already defined", describe_pair(.state, .event))]
    Duplicate { state: String, event: Option<String> },

    /// Unknown state, or no transition for `(state, event)`.
    ///
    /// `state` is `None` when `initialize` has neither an explicit nor a
    /// default start state.
    #[error("Can not find {}", describe_lookup(.state, .event))]
    NotFound {
        state: Option<String>,
        event: Option<String>,
    },

    /// Operation not permitted from the state involved
    #[error("Invalid state{}: {reason}", quoted(.state))]
    InvalidState {
        state: Option<String>,
        reason: String,
    },

    /// Event processed before `initialize()`
    #[error("Can not process event '{event}'; the state machine hasn't been initialized")]
    NotInitialized { event: String },

    /// Malformed input, such as an unknown hook name in a descriptor
    #[error("Invalid {subject}: {reason}")]
    Validation { subject: String, reason: String },
}

impl MachineError {
    pub(crate) fn duplicate(state: impl Into<String>, event: Option<&str>) -> Self {
        MachineError::Duplicate {
            state: state.into(),
            event: event.map(str::to_string),
        }
    }

    pub(crate) fn not_found(state: impl Into<String>, event: Option<&str>) -> Self {
        MachineError::NotFound {
            state: Some(state.into()),
            event: event.map(str::to_string),
        }
    }

    pub(crate) fn invalid_state(state: Option<&str>, reason: impl Into<String>) -> Self {
        MachineError::InvalidState {
            state: state.map(str::to_string),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        MachineError::Validation {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

fn describe_pair(state: &str, event: &Option<String>) -> String {
    match event {
        Some(event) => format!("event '{event}' from state '{state}'"),
        None => format!("state '{state}'"),
    }
}

fn describe_lookup(state: &Option<String>, event: &Option<String>) -> String {
    match (state, event) {
        (Some(state), Some(event)) => format!("event '{event}' from state '{state}'"),
        (Some(state), None) => format!("state '{state}'"),
        (None, Some(event)) => format!("event '{event}'"),
        (None, None) => "a start state".to_string(),
    }
}

fn quoted(state: &Option<String>) -> String {
    state
        .as_ref()
        .map(|state| format!(" '{state}'"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, MachineError>;
