//! Incremental data-layer fold engine.
//!
//! A [`DataLayer`] owns one canonical model (a nested key/value structure)
//! and an append-only sequence of update records. Every pushed record is
//! folded into the model exactly once, in a well-defined order, with the
//! observer notified after each fold:
//!
//! - **model updates** (objects, keys optionally dotted) deep-merge into the
//!   model;
//! - **command updates** (arrays) resolve a dotted method path against the
//!   model and invoke a registered handler with the remaining elements as
//!   arguments;
//! - **function updates** run against a scoped get/set interface and may
//!   push further records, which are drained depth-first;
//! - anything else is inert.
//!
//! Malformed records, unresolved paths, and handler failures are contained:
//! the drain loop never aborts and nothing propagates to the caller.
//!
//! # Example
//!
//! ```
//! use data_layer::DataLayer;
//! use serde_json::json;
//!
//! let layer = DataLayer::new();
//! layer.push_value(json!({"user": {"id": 7}, "cart.items": [1, 2]}));
//! layer.push_value(json!(["cart.items.push", 3]));
//!
//! assert_eq!(layer.get("user.id"), Some(json!(7)));
//! assert_eq!(layer.get("cart.items"), Some(json!([1, 2, 3])));
//! ```

pub mod command;
pub mod helper;
pub mod kind;
pub mod merge;
pub mod scope;
pub mod update;

pub use command::{CommandFn, CommandRegistry};
pub use helper::{DataLayer, DataLayerBuilder, DiscardHook, Listener};
pub use kind::{classify, ValueKind};
pub use merge::{merge, merge_value};
pub use scope::ModelScope;
pub use update::{Outcome, ScopedFn, Update, UpdateError};
