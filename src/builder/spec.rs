//! Serializable machine descriptions.
//!
//! Specs name their hooks and reactions instead of holding them; a
//! [`HookRegistry`](super::HookRegistry) resolves the names when the spec is
//! loaded.

use crate::error::{MachineError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serializable twin of [`StateDescriptor`](crate::core::StateDescriptor).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
    pub name: String,
    #[serde(default)]
    pub is_terminal: bool,
    /// Event name to target state name.
    #[serde(default)]
    pub next_states: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_enter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_exit: Option<String>,
}

/// A reaction to register, by name, with its bound arguments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionSpec {
    pub state: String,
    pub event: String,
    pub reaction: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub kwargs: IndexMap<String, Value>,
}

/// Complete description of a machine.
///
/// # Example
///
/// ```rust
/// use automata::builder::MachineSpec;
///
/// let spec = MachineSpec::from_json(
///     r#"{
///         "states": [
///             {"name": "down", "next_states": {"jump": "up"}},
///             {"name": "up", "is_terminal": true}
///         ],
///         "default_start_state": "down"
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(spec.states.len(), 2);
/// assert!(spec.states[1].is_terminal);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineSpec {
    pub states: Vec<StateSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_start_state: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<ReactionSpec>,
    #[serde(default)]
    pub frozen: bool,
}

impl MachineSpec {
    /// Parse a spec from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| MachineError::validation("machine spec", e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MachineError::validation("machine spec", e.to_string()))
    }
}
