//! Command dispatch.
//!
//! A command update names a method path (`"shopping.cart.push"`) and carries
//! positional arguments. The path prefix is resolved against the model; the
//! final segment selects a handler from an explicit capability table rather
//! than any dynamic member lookup. An unresolved path, an unregistered method
//! name, or a malformed command discards the update; a handler error is
//! contained at the call site.

use std::collections::HashMap;

use serde_json::Value;

use crate::update::UpdateError;

/// A registered command handler: receives the resolved target slot and the
/// command's positional arguments. Handlers that replace a root target must
/// keep it an object.
pub type CommandFn = Box<dyn Fn(&mut Value, &[Value]) -> Result<(), UpdateError>>;

/// The three pieces of a parsed command: the lookup path (absent when the
/// method targets the model root), the method name, and the positional
/// arguments.
pub(crate) struct ParsedCommand<'a> {
    pub prefix: Option<&'a str>,
    pub method: &'a str,
    pub args: &'a [Value],
}

/// Split a raw command into path, method name, and arguments.
/// `command[0]` must be a string method path.
pub(crate) fn parse_command(command: &[Value]) -> Result<ParsedCommand<'_>, UpdateError> {
    let method_path = match command.first() {
        Some(Value::String(s)) => s.as_str(),
        _ => return Err(UpdateError::MalformedCommand),
    };
    let (prefix, method) = match method_path.rsplit_once('.') {
        Some((prefix, method)) => (Some(prefix), method),
        None => (None, method_path),
    };
    Ok(ParsedCommand {
        prefix,
        method,
        args: &command[1..],
    })
}

/// Capability table mapping method names to handlers.
pub struct CommandRegistry {
    handlers: HashMap<String, CommandFn>,
}

impl CommandRegistry {
    /// An empty registry with no capabilities.
    pub fn new() -> Self {
        CommandRegistry {
            handlers: HashMap::new(),
        }
    }

    /// A registry pre-loaded with the built-in sequence methods:
    /// `push`, `pop`, `shift`, `unshift`, `splice`.
    pub fn with_builtins() -> Self {
        let mut registry = CommandRegistry::new();
        registry.register("push", builtin_push);
        registry.register("pop", builtin_pop);
        registry.register("shift", builtin_shift);
        registry.register("unshift", builtin_unshift);
        registry.register("splice", builtin_splice);
        registry
    }

    /// Register a handler under a method name, replacing any previous one.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut Value, &[Value]) -> Result<(), UpdateError> + 'static,
    {
        self.handlers.insert(name.to_string(), Box::new(handler));
    }

    /// Look up a handler by method name.
    pub(crate) fn handler(&self, name: &str) -> Option<&CommandFn> {
        self.handlers.get(name)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        CommandRegistry::with_builtins()
    }
}

fn require_sequence(target: &mut Value) -> Result<&mut Vec<Value>, UpdateError> {
    target
        .as_array_mut()
        .ok_or_else(|| UpdateError::BadArguments("target is not a sequence".to_string()))
}

fn builtin_push(target: &mut Value, args: &[Value]) -> Result<(), UpdateError> {
    let seq = require_sequence(target)?;
    seq.extend(args.iter().cloned());
    Ok(())
}

fn builtin_pop(target: &mut Value, _args: &[Value]) -> Result<(), UpdateError> {
    let seq = require_sequence(target)?;
    seq.pop();
    Ok(())
}

fn builtin_shift(target: &mut Value, _args: &[Value]) -> Result<(), UpdateError> {
    let seq = require_sequence(target)?;
    if !seq.is_empty() {
        seq.remove(0);
    }
    Ok(())
}

fn builtin_unshift(target: &mut Value, args: &[Value]) -> Result<(), UpdateError> {
    let seq = require_sequence(target)?;
    for (offset, value) in args.iter().enumerate() {
        seq.insert(offset, value.clone());
    }
    Ok(())
}

fn builtin_splice(target: &mut Value, args: &[Value]) -> Result<(), UpdateError> {
    let seq = require_sequence(target)?;
    let start = args
        .first()
        .and_then(Value::as_u64)
        .ok_or_else(|| UpdateError::BadArguments("splice start must be an index".to_string()))?
        as usize;
    let start = start.min(seq.len());
    let delete_count = match args.get(1) {
        Some(count) => count
            .as_u64()
            .ok_or_else(|| UpdateError::BadArguments("splice count must be an index".to_string()))?
            as usize,
        None => seq.len() - start,
    };
    let end = (start + delete_count).min(seq.len());
    for _ in start..end {
        seq.remove(start);
    }
    for (offset, value) in args.iter().skip(2).cloned().enumerate() {
        seq.insert(start + offset, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_splits_path_method_and_args() {
        let command = vec![json!("a.b.push"), json!(1), json!(2)];
        let parsed = parse_command(&command).expect("command should parse");
        assert_eq!(parsed.prefix, Some("a.b"));
        assert_eq!(parsed.method, "push");
        assert_eq!(parsed.args, &[json!(1), json!(2)]);
    }

    #[test]
    fn parse_without_dots_targets_the_root() {
        let command = vec![json!("reset")];
        let parsed = parse_command(&command).expect("command should parse");
        assert_eq!(parsed.prefix, None);
        assert_eq!(parsed.method, "reset");
        assert!(parsed.args.is_empty());
    }

    #[test]
    fn parse_rejects_malformed_commands() {
        assert!(matches!(
            parse_command(&[json!(42), json!("arg")]),
            Err(UpdateError::MalformedCommand)
        ));
        assert!(matches!(parse_command(&[]), Err(UpdateError::MalformedCommand)));
    }

    #[test]
    fn push_appends_to_sequence() {
        let mut target = json!([1, 2]);
        builtin_push(&mut target, &[json!(3), json!(4)]).expect("push should apply");
        assert_eq!(target, json!([1, 2, 3, 4]));
    }

    #[test]
    fn pop_shift_unshift() {
        let mut target = json!([1, 2, 3]);
        builtin_pop(&mut target, &[]).expect("pop should apply");
        assert_eq!(target, json!([1, 2]));

        let mut target = json!([1, 2, 3]);
        builtin_shift(&mut target, &[]).expect("shift should apply");
        assert_eq!(target, json!([2, 3]));

        let mut target = json!([2]);
        builtin_unshift(&mut target, &[json!(0), json!(1)]).expect("unshift should apply");
        assert_eq!(target, json!([0, 1, 2]));
    }

    #[test]
    fn shift_and_pop_tolerate_empty_sequences() {
        let mut target = json!([]);
        builtin_shift(&mut target, &[]).expect("shift on empty should be a no-op");
        builtin_pop(&mut target, &[]).expect("pop on empty should be a no-op");
        assert_eq!(target, json!([]));
    }

    #[test]
    fn splice_deletes_and_inserts() {
        let mut target = json!([1, 2, 3, 4]);
        builtin_splice(&mut target, &[json!(1), json!(2), json!("a")]).expect("splice should apply");
        assert_eq!(target, json!([1, "a", 4]));
    }

    #[test]
    fn splice_without_count_truncates() {
        let mut target = json!([1, 2, 3]);
        builtin_splice(&mut target, &[json!(1)]).expect("splice should apply");
        assert_eq!(target, json!([1]));
    }

    #[test]
    fn builtins_reject_non_sequence_targets() {
        let mut target = json!({"not": "a sequence"});
        let result = builtin_push(&mut target, &[json!(1)]);
        assert!(matches!(result, Err(UpdateError::BadArguments(_))));
        assert_eq!(target, json!({"not": "a sequence"}));
    }

    #[test]
    fn register_replaces_previous_handler() {
        let mut registry = CommandRegistry::new();
        registry.register("m", |_, _| Err(UpdateError::Invocation("first".to_string())));
        registry.register("m", |_, _| Ok(()));
        let handler = registry.handler("m").expect("handler should be registered");
        assert!(handler(&mut json!(null), &[]).is_ok());
        assert!(registry.handler("absent").is_none());
    }

    #[test]
    fn with_builtins_carries_the_sequence_methods() {
        let registry = CommandRegistry::with_builtins();
        for name in ["push", "pop", "shift", "unshift", "splice"] {
            assert!(registry.handler(name).is_some(), "missing builtin {name}");
        }
    }
}
