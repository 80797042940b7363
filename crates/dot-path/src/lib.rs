//! Dotted key-path utilities.
//!
//! A dotted key such as `"a.b.c"` addresses one branch of a nested JSON
//! structure. This crate provides the two halves of that addressing scheme:
//! expanding a key/value pair into a fresh single-branch structure, and
//! walking an existing structure by key.
//!
//! # Example
//!
//! ```
//! use data_layer_dot_path::{expand, get};
//! use serde_json::json;
//!
//! // Expand a dotted key into a single-branch nested object.
//! let branch = expand("a.b.c", json!(5));
//! assert_eq!(serde_json::Value::Object(branch.clone()), json!({"a": {"b": {"c": 5}}}));
//!
//! // Walk it back down.
//! assert_eq!(get(&branch, "a.b.c"), Some(&json!(5)));
//! assert_eq!(get(&branch, "a.b"), Some(&json!({"c": 5})));
//! assert_eq!(get(&branch, "a.x"), None);
//! ```

use serde_json::{Map, Value};

pub mod get;
pub use get::{get, get_mut};

/// Expand a dotted key and a value into a freshly allocated single-branch
/// structure, one nesting level per `.`-separated segment.
///
/// Never fails; a key with no `.` yields a single-level object.
///
/// # Example
///
/// ```
/// use data_layer_dot_path::expand;
/// use serde_json::json;
///
/// let flat = expand("answer", json!(42));
/// assert_eq!(serde_json::Value::Object(flat), json!({"answer": 42}));
/// ```
pub fn expand(key: &str, value: Value) -> Map<String, Value> {
    let (prefix, leaf) = match key.rsplit_once('.') {
        Some((prefix, leaf)) => (Some(prefix), leaf),
        None => (None, key),
    };
    let mut node = Map::new();
    node.insert(leaf.to_string(), value);
    if let Some(prefix) = prefix {
        // Wrap the branch one segment at a time, innermost first.
        for segment in prefix.rsplit('.') {
            let mut outer = Map::new();
            outer.insert(segment.to_string(), Value::Object(node));
            node = outer;
        }
    }
    node
}
