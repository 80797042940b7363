//! Update records and their application outcomes.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::scope::ModelScope;

/// Why an update was discarded or failed. None of these ever escape the
/// drain loop; they determine the [`Outcome`] at the point of application
/// and feed the optional diagnostic hook.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("command has no string method path")]
    MalformedCommand,
    #[error("path segment not found: {0}")]
    UnresolvedPath(String),
    #[error("no command registered for method: {0}")]
    UnknownCommand(String),
    #[error("bad command arguments: {0}")]
    BadArguments(String),
    #[error("update invocation failed: {0}")]
    Invocation(String),
    #[error("update shape is inert")]
    InertShape,
}

/// Result of applying one queued update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The update ran to completion.
    Applied,
    /// The update was discarded before execution; the listener is not told.
    Skipped,
    /// Execution started and failed. Treated like a no-op: the drain loop
    /// proceeds and the listener still fires.
    Failed,
}

/// A function-typed update, invoked with the scoped model interface as its
/// execution context. `Rc` so the same record can sit in both the owned
/// sequence and the pending queue.
pub type ScopedFn = Rc<dyn Fn(&ModelScope<'_>) -> Result<(), UpdateError>>;

/// One record of the owned sequence.
#[derive(Clone)]
pub enum Update {
    /// Nested key/value structure merged into the model. Keys may be dotted.
    Model(Map<String, Value>),
    /// Method path plus positional arguments, resolved against the model and
    /// dispatched through the command registry.
    Command(Vec<Value>),
    /// Callable executed against the scoped model interface.
    Function(ScopedFn),
    /// Any other shape. Inert: skipped without a listener call.
    Other(Value),
}

impl Update {
    /// Build a function update from a closure.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&ModelScope<'_>) -> Result<(), UpdateError> + 'static,
    {
        Update::Function(Rc::new(f))
    }

    /// Build a command update from a method path and positional arguments.
    pub fn command<I>(method_path: &str, args: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut command = vec![Value::String(method_path.to_string())];
        command.extend(args);
        Update::Command(command)
    }
}

impl From<Value> for Update {
    /// Classify a raw JSON value the way pushed records are classified:
    /// objects are model updates, arrays are command updates, everything
    /// else is inert.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Update::Model(map),
            Value::Array(command) => Update::Command(command),
            other => Update::Other(other),
        }
    }
}

impl From<Map<String, Value>> for Update {
    fn from(map: Map<String, Value>) -> Self {
        Update::Model(map)
    }
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Model(map) => f.debug_tuple("Model").field(map).finish(),
            Update::Command(command) => f.debug_tuple("Command").field(command).finish(),
            Update::Function(_) => f.write_str("Function(..)"),
            Update::Other(value) => f.debug_tuple("Other").field(value).finish(),
        }
    }
}
