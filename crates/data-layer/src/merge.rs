//! Deep-merge engine.
//!
//! The sole mutator of the canonical model. Everything else either reads the
//! model or routes its writes through [`merge`].

use serde_json::{Map, Value};

use crate::kind::{classify, ValueKind};

/// Fold every key of `from` into `into`, mutating `into` in place.
///
/// Keys present only in `into` are untouched. Conflicts are resolved per slot
/// by [`merge_value`].
pub fn merge(from: &Map<String, Value>, into: &mut Map<String, Value>) {
    for (key, incoming) in from {
        let slot = into.entry(key.clone()).or_insert(Value::Null);
        merge_value(incoming, slot);
    }
}

/// Merge one incoming value into a single target slot.
///
/// Conflict rules, checked in order:
/// 1. Incoming sequence: coerce the slot to a sequence (replacing anything
///    else with an empty one), then merge element by position, growing the
///    slot with nulls where the incoming sequence is longer.
/// 2. Incoming structural object: coerce the slot to an object likewise, then
///    merge key by key.
/// 3. Incoming scalar: overwrite the slot, no recursion.
pub fn merge_value(incoming: &Value, slot: &mut Value) {
    match classify(incoming) {
        ValueKind::Sequence => {
            if classify(slot) != ValueKind::Sequence {
                *slot = Value::Array(Vec::new());
            }
            if let (Value::Array(src), Value::Array(dst)) = (incoming, slot) {
                for (index, element) in src.iter().enumerate() {
                    if index >= dst.len() {
                        dst.resize(index + 1, Value::Null);
                    }
                    merge_value(element, &mut dst[index]);
                }
            }
        }
        ValueKind::Structural => {
            if classify(slot) != ValueKind::Structural {
                *slot = Value::Object(Map::new());
            }
            if let (Value::Object(src), Value::Object(dst)) = (incoming, slot) {
                merge(src, dst);
            }
        }
        ValueKind::Scalar => {
            *slot = incoming.clone();
        }
    }
}
