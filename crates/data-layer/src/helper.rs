//! The data-layer helper: owned sequence, pending queue, and drain loop.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use serde_json::{Map, Value};

use data_layer_dot_path::{expand, get, get_mut};

use crate::command::{parse_command, CommandRegistry};
use crate::merge::merge;
use crate::scope::ModelScope;
use crate::update::{Outcome, Update, UpdateError};

/// Observer invoked with the current model and the just-applied update.
pub type Listener = Box<dyn FnMut(&Map<String, Value>, &Update)>;

/// Optional diagnostic hook receiving the error behind every skipped or
/// failed update. Discards stay silent unless one is installed.
pub type DiscardHook = Box<dyn Fn(&UpdateError)>;

/// Incremental fold engine over an owned, append-only update sequence.
///
/// Every pushed record is folded into the canonical model exactly once, in
/// FIFO order, with one listener notification per applied record. Records
/// pushed recursively by an executing update are drained depth-first before
/// that update's notification; records pushed by the listener itself are
/// deferred until the listener returns.
///
/// Interior mutability throughout: pushes arrive from arbitrary call sites,
/// including from inside updates that are currently being applied.
pub struct DataLayer {
    model: RefCell<Map<String, Value>>,
    sequence: RefCell<Vec<Update>>,
    pending: RefCell<VecDeque<Update>>,
    listener: RefCell<Listener>,
    pending_listener: RefCell<Option<Listener>>,
    commands: CommandRegistry,
    in_listener: Cell<bool>,
    on_discard: Option<DiscardHook>,
}

/// Configures and constructs a [`DataLayer`].
pub struct DataLayerBuilder {
    history: Vec<Update>,
    listener: Option<Listener>,
    replay_history: bool,
    commands: CommandRegistry,
    on_discard: Option<DiscardHook>,
}

impl DataLayerBuilder {
    /// Records that already occurred before construction. They are folded
    /// into the model immediately at `build`.
    pub fn history<I>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = Update>,
    {
        self.history = history.into_iter().collect();
        self
    }

    /// The observer callback. Default is a no-op.
    pub fn listener<F>(mut self, listener: F) -> Self
    where
        F: FnMut(&Map<String, Value>, &Update) + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Replay pre-existing history through the listener at construction.
    /// Default `false`: history is folded silently.
    pub fn replay_history(mut self, replay: bool) -> Self {
        self.replay_history = replay;
        self
    }

    /// Register a command handler on top of the built-in sequence methods.
    pub fn command<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&mut Value, &[Value]) -> Result<(), UpdateError> + 'static,
    {
        self.commands.register(name, handler);
        self
    }

    /// Install a diagnostic hook for skipped and failed updates.
    pub fn on_discard<F>(mut self, hook: F) -> Self
    where
        F: Fn(&UpdateError) + 'static,
    {
        self.on_discard = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> DataLayer {
        let layer = DataLayer {
            model: RefCell::new(Map::new()),
            sequence: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            listener: RefCell::new(self.listener.unwrap_or_else(|| Box::new(|_, _| {}))),
            pending_listener: RefCell::new(None),
            commands: self.commands,
            in_listener: Cell::new(false),
            on_discard: self.on_discard,
        };
        if !self.history.is_empty() {
            layer.push_batch(self.history, !self.replay_history);
        }
        layer
    }
}

impl DataLayer {
    /// An empty helper with the default no-op listener.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> DataLayerBuilder {
        DataLayerBuilder {
            history: Vec::new(),
            listener: None,
            replay_history: false,
            commands: CommandRegistry::with_builtins(),
            on_discard: None,
        }
    }

    /// Append one record to the owned sequence and fold it in.
    pub fn push(&self, update: impl Into<Update>) {
        self.push_batch(vec![update.into()], false);
    }

    /// Append a raw JSON value: objects become model updates, arrays become
    /// command updates, anything else is inert.
    pub fn push_value(&self, value: Value) {
        self.push(Update::from(value));
    }

    /// Append several records in one call; they are processed strictly in
    /// the given order.
    pub fn push_all<I>(&self, updates: I)
    where
        I: IntoIterator<Item = Update>,
    {
        self.push_batch(updates.into_iter().collect(), false);
    }

    /// Look up a dotted key in the model. `None` as soon as any segment is
    /// absent. The value is returned as a clone; handing out references into
    /// a model that any push may mutate would trade a lookup for a runtime
    /// borrow panic.
    pub fn get(&self, key: &str) -> Option<Value> {
        get(&self.model.borrow(), key).cloned()
    }

    /// A read-only snapshot of the full model.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.model.borrow().clone()
    }

    /// A copy of the owned sequence as it currently stands.
    pub fn history(&self) -> Vec<Update> {
        self.sequence.borrow().clone()
    }

    /// Replace the owned sequence with a single model update holding the
    /// current canonical state. Idempotent.
    pub fn flatten(&self) {
        let snapshot = self.model.borrow().clone();
        let mut sequence = self.sequence.borrow_mut();
        sequence.clear();
        sequence.push(Update::Model(snapshot));
    }

    /// Replace the observer callback. A replacement installed from inside
    /// the listener itself takes effect once the current notification
    /// returns.
    pub fn set_listener<F>(&self, listener: F)
    where
        F: FnMut(&Map<String, Value>, &Update) + 'static,
    {
        if self.in_listener.get() {
            *self.pending_listener.borrow_mut() = Some(Box::new(listener));
        } else {
            *self.listener.borrow_mut() = Box::new(listener);
        }
    }

    pub(crate) fn set_path(&self, key: &str, value: Value) {
        let branch = expand(key, value);
        merge(&branch, &mut self.model.borrow_mut());
    }

    fn push_batch(&self, updates: Vec<Update>, skip_listener: bool) {
        self.sequence.borrow_mut().extend(updates.iter().cloned());
        self.pending.borrow_mut().extend(updates);
        self.drain(skip_listener);
    }

    /// Consume the pending queue, oldest record first.
    ///
    /// The listener-reentrancy flag is the single guard: while the listener
    /// runs the flag is set, so a drain triggered by a push from inside the
    /// listener returns immediately and leaves its records queued for this
    /// loop's next iteration. The flag is clear while updates themselves
    /// execute, so a push from inside a function update re-enters here and
    /// drains to completion before the outer iteration notifies. The
    /// `skip_listener` flag belongs to this call; recursive drains triggered
    /// mid-loop run with notifications enabled.
    fn drain(&self, skip_listener: bool) {
        if self.in_listener.get() {
            return;
        }
        loop {
            let update = match self.pending.borrow_mut().pop_front() {
                Some(update) => update,
                None => break,
            };
            match self.apply(&update) {
                Outcome::Skipped => continue,
                Outcome::Applied | Outcome::Failed => {
                    if skip_listener {
                        continue;
                    }
                    self.in_listener.set(true);
                    {
                        let model = self.model.borrow();
                        let mut listener = self.listener.borrow_mut();
                        (listener)(&model, &update);
                    }
                    self.in_listener.set(false);
                    if let Some(replacement) = self.pending_listener.borrow_mut().take() {
                        *self.listener.borrow_mut() = replacement;
                    }
                }
            }
        }
    }

    fn apply(&self, update: &Update) -> Outcome {
        match update {
            Update::Model(map) => {
                let mut model = self.model.borrow_mut();
                for (key, value) in map {
                    let branch = expand(key, value.clone());
                    merge(&branch, &mut model);
                }
                Outcome::Applied
            }
            Update::Command(command) => match self.dispatch_command(command) {
                Ok(()) => Outcome::Applied,
                Err(err) => {
                    let outcome = command_outcome(&err);
                    self.report(&err);
                    outcome
                }
            },
            Update::Function(f) => {
                let scope = ModelScope::new(self);
                match f(&scope) {
                    Ok(()) => Outcome::Applied,
                    Err(err) => {
                        self.report(&err);
                        Outcome::Failed
                    }
                }
            }
            Update::Other(_) => {
                self.report(&UpdateError::InertShape);
                Outcome::Skipped
            }
        }
    }

    /// Resolve and invoke a command against the model.
    ///
    /// The resolved target is detached from the model while the handler
    /// runs, so no model borrow is held across the invocation: handlers may
    /// read back through the public surface or push further records, which
    /// drain depth-first like any other mid-update push. Records produced
    /// during the call see the model without the detached slot; the slot,
    /// carrying the handler's mutations, is reinstalled when the handler
    /// returns.
    fn dispatch_command(&self, command: &[Value]) -> Result<(), UpdateError> {
        let parsed = parse_command(command)?;
        match parsed.prefix {
            Some(path) => {
                if get(&self.model.borrow(), path).is_none() {
                    return Err(UpdateError::UnresolvedPath(path.to_string()));
                }
                let handler = self
                    .commands
                    .handler(parsed.method)
                    .ok_or_else(|| UpdateError::UnknownCommand(parsed.method.to_string()))?;
                let mut target = {
                    let mut model = self.model.borrow_mut();
                    match get_mut(&mut model, path) {
                        Some(slot) => std::mem::take(slot),
                        None => return Err(UpdateError::UnresolvedPath(path.to_string())),
                    }
                };
                let result = handler(&mut target, parsed.args);
                let mut model = self.model.borrow_mut();
                if get(&model, path).is_some() {
                    if let Some(slot) = get_mut(&mut model, path) {
                        *slot = target;
                    }
                } else {
                    // The branch was restructured by records produced
                    // mid-call; rebuild it around the handler's result.
                    merge(&expand(path, target), &mut model);
                }
                result
            }
            None => {
                let handler = self
                    .commands
                    .handler(parsed.method)
                    .ok_or_else(|| UpdateError::UnknownCommand(parsed.method.to_string()))?;
                let mut root = Value::Object(std::mem::take(&mut *self.model.borrow_mut()));
                let result = handler(&mut root, parsed.args);
                match root {
                    Value::Object(map) => {
                        *self.model.borrow_mut() = map;
                        result
                    }
                    _ => Err(UpdateError::Invocation(
                        "root target replaced with a non-object".to_string(),
                    )),
                }
            }
        }
    }

    fn report(&self, err: &UpdateError) {
        if let Some(hook) = &self.on_discard {
            hook(err);
        }
    }
}

impl Default for DataLayer {
    fn default() -> Self {
        DataLayer::new()
    }
}

/// A command that never reached its handler is discarded outright; one that
/// failed mid-invocation counts as a no-op whose notification still fires.
fn command_outcome(err: &UpdateError) -> Outcome {
    match err {
        UpdateError::MalformedCommand
        | UpdateError::UnresolvedPath(_)
        | UpdateError::UnknownCommand(_) => Outcome::Skipped,
        _ => Outcome::Failed,
    }
}
