use serde_json::Value;

/// Closed classification of values as the merge engine sees them.
///
/// Every merge conflict decision keys off this variant and nothing else, so
/// the tie-break rules live in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Null, boolean, number, string: overwritten wholesale, never recursed into.
    Scalar,
    /// Ordered sequence: merged element by position.
    Sequence,
    /// Structural object: merged key by key.
    Structural,
}

/// Classify a value for merge conflict resolution.
pub fn classify(value: &Value) -> ValueKind {
    match value {
        Value::Array(_) => ValueKind::Sequence,
        Value::Object(_) => ValueKind::Structural,
        _ => ValueKind::Scalar,
    }
}
