use serde_json::{Map, Value};

/// Walk a nested structure by dotted key.
///
/// Splits `key` on `.` and descends segment by segment from the root map.
/// Object segments are looked up by key; sequence segments are looked up by
/// numeric index. Returns `None` as soon as any segment is absent; otherwise
/// returns the value at the full path by reference.
///
/// # Example
///
/// ```
/// use data_layer_dot_path::get;
/// use serde_json::json;
///
/// let model = json!({"a": {"b": [10, 20]}});
/// let model = model.as_object().unwrap();
///
/// assert_eq!(get(model, "a.b.1"), Some(&json!(20)));
/// assert_eq!(get(model, "a.missing"), None);
/// ```
pub fn get<'a>(model: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let mut current = model.get(segments.next()?)?;
    for segment in segments {
        current = step(current, segment)?;
    }
    Some(current)
}

/// Mutable variant of [`get`]: walk a nested structure by dotted key and
/// return a mutable reference to the value at the full path.
pub fn get_mut<'a>(model: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Value> {
    let mut segments = key.split('.');
    let mut current = model.get_mut(segments.next()?)?;
    for segment in segments {
        current = step_mut(current, segment)?;
    }
    Some(current)
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(arr) => {
            let idx: usize = segment.parse().ok()?;
            arr.get(idx)
        }
        _ => None,
    }
}

fn step_mut<'a>(current: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match current {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(arr) => {
            let idx: usize = segment.parse().ok()?;
            arr.get_mut(idx)
        }
        _ => None,
    }
}
