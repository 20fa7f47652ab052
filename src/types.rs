use std::fmt;

use serde_json::Value;

/// Scalar classification of an addressable property, derived from its JSON
/// value. Drives coercion of override text and default-fill of grown slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// `true` / `false`.
    Bool,
    /// Whole number (JSON numbers without a fractional part, stored as `i64`).
    Int,
    /// Fractional number (`f64`).
    Float,
    /// String. Enum unit variants and single characters serialize as strings
    /// too, so they land here.
    Str,
    /// A `null` value (an `Option` field currently unset). The declared type
    /// is unknowable from the document, so coercion falls back to a
    /// heuristic parse.
    Null,
    /// An array. Registered as a container marker; never coercible and never
    /// directly overridden — its elements are.
    Array,
}

impl Kind {
    /// Classify a JSON value. Objects return `None`: they are recursed into,
    /// not registered.
    pub fn of(value: &Value) -> Option<Kind> {
        match value {
            Value::Bool(_) => Some(Kind::Bool),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Kind::Int),
            Value::Number(_) => Some(Kind::Float),
            Value::String(_) => Some(Kind::Str),
            Value::Null => Some(Kind::Null),
            Value::Array(_) => Some(Kind::Array),
            Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "integer",
            Kind::Float => "float",
            Kind::Str => "string",
            Kind::Null => "null",
            Kind::Array => "array",
        };
        write!(f, "{name}")
    }
}

/// What a `get`/`set` verb should report when the named property does not
/// exist in the namespace.
///
/// The default, `Succeed`, prints a diagnostic and exits 0, keeping missing
/// keys non-fatal for interactive use. `Fail` maps the same outcomes to a
/// non-zero exit code for hosts that want missing keys visible to scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingKey {
    /// Report and exit 0 (default).
    #[default]
    Succeed,
    /// Report and exit 2.
    Fail,
}

/// The embedded CLI verbs this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Get,
    Set,
}

impl fmt::Display for CliVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliVerb::Get => write!(f, "get"),
            CliVerb::Set => write!(f, "set"),
        }
    }
}

/// A parsed CLI verb, independent of how it was parsed.
///
/// Produced by the token scan in [`process`](crate::Overfig::process), or
/// constructed directly by hosts with their own argument parser and handed
/// to [`handle`](crate::Overfig::handle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliRequest {
    /// Print the resolved value of a property.
    Get { key: String },
    /// Set a property from text, persist via `save()`, report the previous
    /// value.
    Set { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_of_scalars() {
        assert_eq!(Kind::of(&json!(true)), Some(Kind::Bool));
        assert_eq!(Kind::of(&json!(42)), Some(Kind::Int));
        assert_eq!(Kind::of(&json!(1.5)), Some(Kind::Float));
        assert_eq!(Kind::of(&json!("x")), Some(Kind::Str));
        assert_eq!(Kind::of(&Value::Null), Some(Kind::Null));
    }

    #[test]
    fn kind_of_containers() {
        assert_eq!(Kind::of(&json!([1, 2])), Some(Kind::Array));
        assert_eq!(Kind::of(&json!({"a": 1})), None);
    }

    #[test]
    fn large_u64_classifies_as_int() {
        assert_eq!(Kind::of(&json!(u64::MAX)), Some(Kind::Int));
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(Kind::Int.to_string(), "integer");
        assert_eq!(Kind::Array.to_string(), "array");
    }

    #[test]
    fn missing_key_defaults_to_succeed() {
        assert_eq!(MissingKey::default(), MissingKey::Succeed);
    }
}
