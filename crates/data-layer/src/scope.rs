//! The scoped model interface handed to function updates.

use serde_json::Value;

use crate::helper::DataLayer;
use crate::update::Update;

/// A narrow get/set facade over one helper's model, supplied as the
/// execution context of function updates. It is the only mutation surface
/// those updates see; the raw model is never exposed.
pub struct ModelScope<'a> {
    layer: &'a DataLayer,
}

impl<'a> ModelScope<'a> {
    pub(crate) fn new(layer: &'a DataLayer) -> Self {
        ModelScope { layer }
    }

    /// Look up a dotted key in the model. `None` if any segment is absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.layer.get(key)
    }

    /// Expand a dotted key and merge the resulting branch into the model,
    /// immediately and outside the queue.
    pub fn set(&self, key: &str, value: Value) {
        self.layer.set_path(key, value);
    }

    /// Append a further update to the owned sequence. Updates pushed here
    /// are drained depth-first, before the pushing update's own listener
    /// notification fires.
    pub fn push(&self, update: impl Into<Update>) {
        self.layer.push(update);
    }
}
