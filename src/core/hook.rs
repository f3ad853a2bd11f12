//! Callbacks attached to states and events.
//!
//! Hooks are the enter/exit side-effect callbacks of a state. Reactions are
//! callbacks bound to a `(state, event)` pair that compute the next event once
//! a transition settles. Both are reference-counted so that transition tables
//! and machine copies share the same callable rather than cloning it.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

type HookFn = dyn Fn(&str, &str);
type ReactionFn = dyn Fn(&ReactionCall<'_>) -> String;

/// Enter or exit callback of a state.
///
/// Invoked with `(state_name, event)`; the return value is ignored.
///
/// # Example
///
/// ```rust
/// use automata::core::Hook;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = Rc::clone(&seen);
/// let hook = Hook::named("record", move |state, event| {
///     sink.borrow_mut().push(format!("{state}:{event}"));
/// });
///
/// hook.call("up", "jump");
/// assert_eq!(seen.borrow().as_slice(), ["up:jump"]);
/// assert_eq!(hook.label(), "record");
/// ```
#[derive(Clone)]
pub struct Hook {
    label: Rc<str>,
    callback: Rc<HookFn>,
}

impl Hook {
    /// Create a hook labelled with the closure's type name.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&str, &str) + 'static,
    {
        Self::named(std::any::type_name::<F>(), callback)
    }

    /// Create a hook with an explicit display label.
    pub fn named<F>(label: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&str, &str) + 'static,
    {
        Hook {
            label: Rc::from(label.into()),
            callback: Rc::new(callback),
        }
    }

    /// Invoke the callback.
    pub fn call(&self, state: &str, event: &str) {
        (self.callback)(state, event)
    }

    /// Label used when rendering transition tables.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True when both hooks wrap the very same callable.
    pub fn ptr_eq(&self, other: &Hook) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hook").field(&self.label).finish()
    }
}

/// Arguments handed to a reaction callback.
#[derive(Debug, Clone, Copy)]
pub struct ReactionCall<'a> {
    /// State the machine was in before the triggering event
    pub old_state: &'a str,
    /// State the machine settled into
    pub new_state: &'a str,
    /// Event that caused the transition
    pub event: &'a str,
    /// Positional arguments bound at registration
    pub args: &'a [Value],
    /// Keyword arguments bound at registration
    pub kwargs: &'a IndexMap<String, Value>,
}

/// Callback that computes the next event after a transition.
///
/// A reaction is a pure decision: invoking it never mutates the machine it
/// was registered on, only [`process_event`] does.
///
/// [`process_event`]: crate::machine::FiniteMachine::process_event
///
/// # Example
///
/// ```rust
/// use automata::core::Reaction;
/// use serde_json::json;
///
/// let reaction = Reaction::new(|call| {
///     let times = call.args[0].as_u64().unwrap_or(1);
///     "again".repeat(times as usize)
/// })
/// .with_arg(json!(2));
///
/// assert_eq!(reaction.invoke("a", "b", "go"), "againagain");
/// ```
#[derive(Clone)]
pub struct Reaction {
    callback: Rc<ReactionFn>,
    args: Vec<Value>,
    kwargs: IndexMap<String, Value>,
}

impl Reaction {
    /// Create a reaction without bound arguments.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&ReactionCall<'_>) -> String + 'static,
    {
        Reaction {
            callback: Rc::new(callback),
            args: Vec::new(),
            kwargs: IndexMap::new(),
        }
    }

    /// Reaction that always answers with the same event.
    pub fn emit(event: impl Into<String>) -> Self {
        let event = event.into();
        Self::new(move |_| event.clone())
    }

    /// Bind an extra positional argument.
    pub fn with_arg(mut self, arg: Value) -> Self {
        self.args.push(arg);
        self
    }

    /// Bind several extra positional arguments.
    pub fn with_args(mut self, args: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(args);
        self
    }

    /// Bind an extra keyword argument.
    pub fn with_kwarg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.kwargs.insert(key.into(), value);
        self
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &IndexMap<String, Value> {
        &self.kwargs
    }

    /// Compute the next event for a transition `old_state --event--> new_state`.
    pub fn invoke(&self, old_state: &str, new_state: &str, event: &str) -> String {
        let call = ReactionCall {
            old_state,
            new_state,
            event,
            args: &self.args,
            kwargs: &self.kwargs,
        };
        (self.callback)(&call)
    }

    /// True when both reactions wrap the very same callable.
    pub fn ptr_eq(&self, other: &Reaction) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }
}

impl fmt::Debug for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reaction")
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn hook_receives_state_and_event() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let hook = Hook::new(move |state, event| {
            sink.borrow_mut().push((state.to_string(), event.to_string()));
        });

        hook.call("down", "jump");

        assert_eq!(
            seen.borrow().as_slice(),
            [("down".to_string(), "jump".to_string())]
        );
    }

    #[test]
    fn cloned_hook_shares_callable() {
        let hook = Hook::named("noop", |_, _| {});
        let other = Hook::named("noop", |_, _| {});

        assert!(hook.ptr_eq(&hook.clone()));
        assert!(!hook.ptr_eq(&other));
    }

    #[test]
    fn default_label_is_not_empty() {
        let hook = Hook::new(|_, _| {});
        assert!(!hook.label().is_empty());
    }

    #[test]
    fn reaction_sees_transition_and_bound_arguments() {
        let reaction = Reaction::new(|call| {
            format!(
                "{}>{}@{}:{}:{}",
                call.old_state,
                call.new_state,
                call.event,
                call.args.len(),
                call.kwargs["mode"]
            )
        })
        .with_args([json!(1), json!("two")])
        .with_kwarg("mode", json!("fast"));

        assert_eq!(
            reaction.invoke("down", "up", "jump"),
            "down>up@jump:2:\"fast\""
        );
        assert_eq!(reaction.args().len(), 2);
        assert_eq!(reaction.kwargs().len(), 1);
    }

    #[test]
    fn emit_returns_fixed_event() {
        let reaction = Reaction::emit("fall");
        assert_eq!(reaction.invoke("down", "up", "jump"), "fall");
        assert_eq!(reaction.invoke("x", "y", "z"), "fall");
    }

    #[test]
    fn reaction_is_deterministic() {
        let reaction = Reaction::new(|call| call.event.to_uppercase());
        assert_eq!(
            reaction.invoke("a", "b", "go"),
            reaction.invoke("a", "b", "go")
        );
    }
}
