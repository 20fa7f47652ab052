//! Embedded CLI verbs: the `get`/`set` token scan, the outcome values
//! callers display, and value formatting.

use std::fmt;

use serde_json::Value;

use crate::types::{CliRequest, CliVerb, MissingKey};

/// Outcome of a `get` or `set` verb. Returned to the caller for display; the
/// decision to exit the process, and with which code, stays with the host
/// via [`exit_code`](CliOutcome::exit_code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliOutcome {
    /// `get` resolved the key.
    Found { key: String, value: String },
    /// `set` applied and persisted; carries the value that was replaced.
    Previous {
        key: String,
        old: String,
        new: String,
    },
    /// The named key does not exist in the namespace.
    NotFound { key: String },
    /// The verb was present but its operands were missing.
    Usage { verb: CliVerb },
}

impl CliOutcome {
    /// Map the outcome to a process exit code under the given missing-key
    /// policy.
    pub fn exit_code(&self, policy: MissingKey) -> i32 {
        match (self, policy) {
            (CliOutcome::NotFound { .. } | CliOutcome::Usage { .. }, MissingKey::Fail) => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for CliOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliOutcome::Found { value, .. } => write!(f, "{value}"),
            CliOutcome::Previous { old, .. } => write!(f, "{old}"),
            CliOutcome::NotFound { key } => write!(f, "Key not found: {key}"),
            CliOutcome::Usage { verb } => match verb {
                CliVerb::Get => write!(f, "usage: get <key>"),
                CliVerb::Set => write!(f, "usage: set <key> <value>"),
            },
        }
    }
}

/// What `process` hands back: the CLI tokens no property consumed, in their
/// original order, and the outcome of an embedded verb if one was present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub remaining: Vec<String>,
    pub verb: Option<CliOutcome>,
}

/// A verb recognized in the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum VerbScan {
    Request(CliRequest),
    Usage(CliVerb),
}

/// Extract the first `get`/`set` verb and its operands from the tokens.
///
/// Verbs match case-insensitively and only the first occurrence is taken;
/// the verb and its operands are removed from `args`. A verb at the tail
/// with operands missing still consumes what is there and reports usage.
pub(crate) fn scan_verb(args: &mut Vec<String>) -> Option<VerbScan> {
    for i in 0..args.len() {
        let verb = if args[i].eq_ignore_ascii_case("get") {
            CliVerb::Get
        } else if args[i].eq_ignore_ascii_case("set") {
            CliVerb::Set
        } else {
            continue;
        };
        let operands = match verb {
            CliVerb::Get => 1,
            CliVerb::Set => 2,
        };
        let scan = if i + operands < args.len() {
            match verb {
                CliVerb::Get => VerbScan::Request(CliRequest::Get {
                    key: args[i + 1].clone(),
                }),
                CliVerb::Set => VerbScan::Request(CliRequest::Set {
                    key: args[i + 1].clone(),
                    value: args[i + 2].clone(),
                }),
            }
        } else {
            VerbScan::Usage(verb)
        };
        let end = (i + operands + 1).min(args.len());
        args.drain(i..end);
        return Some(scan);
    }
    None
}

/// Render a resolved value for CLI display: strings bare, numbers and bools
/// as their natural text, null empty, containers as JSON.
pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{other:?}")),
    }
}
