// EN: src/errors.rs

//! The engine's single error type.
//!
//! Every failure surfaced by an executor or the manager is an [`ActionError`]: a
//! [`ErrorKind`], a human-readable message, a machine-readable context map and an
//! optional chained cause. Callers render the kind and message with [`user_message`]
//! and dig into the context (`spell_name`, `command`, `exit_code`, ...) without
//! re-deriving anything.

use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Any error that can be chained as the cause of an [`ActionError`].
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// The broad category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or missing action definition: unknown spell, unknown type, empty command,
    /// invalid URL or scheme.
    Config,
    /// The OS refused or the process failed: start failures, non-zero exits, timeouts,
    /// elevation front-end failures.
    System,
    /// Elevation was required but could not be obtained.
    Permission,
}

impl ErrorKind {
    /// Stable lowercase name, used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::System => "system",
            ErrorKind::Permission => "permission",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed, context-carrying engine error.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ActionError {
    kind: ErrorKind,
    message: String,
    context: BTreeMap<String, Value>,
    #[source]
    source: Option<BoxedCause>,
}

impl ActionError {
    /// Creates an error without a cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: BTreeMap::new(),
            source: None,
        }
    }

    /// Creates an error that chains `cause` as its source.
    pub fn wrap(kind: ErrorKind, message: impl Into<String>, cause: impl Into<BoxedCause>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: BTreeMap::new(),
            source: Some(cause.into()),
        }
    }

    /// Shorthand for a [`ErrorKind::Config`] error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Shorthand for a [`ErrorKind::System`] error.
    pub fn system(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::System, message)
    }

    /// Shorthand for a [`ErrorKind::Permission`] error.
    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Permission, message)
    }

    /// Adds (or replaces) one context entry.
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    /// The category of this error (not of its causes).
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message of this error, without its causes.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The context entries attached directly to this error.
    pub fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    /// Looks up `key` on this error, then on every `ActionError` further down the chain.
    pub fn find_context(&self, key: &str) -> Option<&Value> {
        self.action_errors().find_map(|err| err.context.get(key))
    }

    /// Convenience accessor for string-valued context entries anywhere in the chain.
    pub fn find_context_str(&self, key: &str) -> Option<&str> {
        self.find_context(key).and_then(Value::as_str)
    }

    /// The deepest `ActionError` in the chain (`self` when nothing below is one).
    pub fn innermost(&self) -> &ActionError {
        self.action_errors().last().unwrap_or(self)
    }

    /// Iterates over `self` and every `ActionError` found through `source()`.
    pub fn action_errors(&self) -> impl Iterator<Item = &ActionError> {
        let mut next: Option<&(dyn StdError + 'static)> = Some(self);
        std::iter::from_fn(move || {
            while let Some(current) = next {
                next = current.source();
                if let Some(action_err) = current.downcast_ref::<ActionError>() {
                    return Some(action_err);
                }
            }
            None
        })
    }

    /// Merges the context of the whole chain. Outer errors win on duplicate keys.
    pub fn merged_context(&self) -> BTreeMap<String, Value> {
        let mut merged = BTreeMap::new();
        let chain: Vec<&ActionError> = self.action_errors().collect();
        for err in chain.into_iter().rev() {
            for (key, value) in &err.context {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// The user-facing sentence for this error. See [`user_message`].
    pub fn user_message(&self) -> String {
        user_message(self.kind, &self.message)
    }
}

/// Checks whether `err` (or anything it wraps) is an `ActionError` of `kind`.
pub fn is_kind(err: &(dyn StdError + 'static), kind: ErrorKind) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(action_err) = e.downcast_ref::<ActionError>() {
            return action_err.kind == kind;
        }
        current = e.source();
    }
    false
}

/// Renders a kind and message as the sentence shown to users.
pub fn user_message(kind: ErrorKind, message: &str) -> String {
    match kind {
        ErrorKind::Config => format!("Configuration error: {}", message),
        ErrorKind::System => format!("System error: {}", message),
        ErrorKind::Permission => format!(
            "Permission error: {}. Please check the permissions guide.",
            message
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_user_message_prefixes() {
        assert_eq!(
            user_message(ErrorKind::Config, "empty command"),
            "Configuration error: empty command"
        );
        assert_eq!(
            user_message(ErrorKind::System, "boom"),
            "System error: boom"
        );
        assert_eq!(
            user_message(ErrorKind::Permission, "no suitable elevation tool found"),
            "Permission error: no suitable elevation tool found. Please check the permissions guide."
        );
    }

    #[test]
    fn test_chain_is_walkable_to_root_cause() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let inner = ActionError::wrap(ErrorKind::System, "failed to start script", io_err)
            .with_context("command", "foo")
            .with_context("error_type", "start_failed");
        let outer = ActionError::wrap(ErrorKind::System, "failed to execute spell 'x'", inner)
            .with_context("action_name", "x");

        assert_eq!(outer.innermost().message(), "failed to start script");
        assert_eq!(outer.find_context_str("command"), Some("foo"));
        assert_eq!(outer.find_context_str("action_name"), Some("x"));

        // The OS error is still reachable at the bottom of the chain.
        let root = outer.innermost().source().unwrap();
        let io_root = root.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_root.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_merged_context_prefers_outer_values() {
        let inner = ActionError::config("empty command").with_context("action_type", "script");
        let outer = ActionError::wrap(ErrorKind::System, "failed", inner)
            .with_context("action_type", "override");
        let merged = outer.merged_context();
        assert_eq!(merged.get("action_type"), Some(&Value::from("override")));
    }

    #[test]
    fn test_is_kind_checks_outermost_action_error() {
        let inner = ActionError::config("bad");
        let outer = ActionError::wrap(ErrorKind::System, "wrapped", inner);
        assert!(is_kind(&outer, ErrorKind::System));
        assert!(!is_kind(&outer, ErrorKind::Config));

        let plain = io::Error::other("plain");
        assert!(!is_kind(&plain, ErrorKind::System));
    }

    #[test]
    fn test_display_is_message_only() {
        let err = ActionError::wrap(ErrorKind::System, "outer", io::Error::other("inner"));
        assert_eq!(err.to_string(), "outer");
    }
}
