use serde_json::Value;

use crate::error::OverfigError;
use crate::types::Kind;

/// Parse override text into a value of the property's kind.
///
/// Overlay text that cannot be parsed is a hard error: a typo'd `port=80a0`
/// on the command line should stop the program, not silently keep the old
/// value.
pub(crate) fn coerce(key: &str, text: &str, kind: Kind) -> Result<Value, OverfigError> {
    let fail = || OverfigError::Coerce {
        key: key.to_string(),
        text: text.to_string(),
        kind,
    };
    match kind {
        Kind::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if text.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(fail())
            }
        }
        Kind::Int => text
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .or_else(|_| text.parse::<u64>().map(|n| Value::Number(n.into())))
            .map_err(|_| fail()),
        Kind::Float => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(fail),
        Kind::Str => Ok(Value::String(text.to_string())),
        Kind::Null => Ok(heuristic(text)),
        Kind::Array => Err(OverfigError::InvalidValue {
            key: key.to_string(),
            reason: "cannot assign text to an array container".to_string(),
        }),
    }
}

/// Best-effort parse for properties whose declared type is unknowable (a
/// `null` in the document): bool, then integer, then float if the text has a
/// decimal point, else string.
fn heuristic(text: &str) -> Value {
    if text.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if text.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(int) = text.parse::<i64>() {
        return Value::Number(int.into());
    }
    if text.contains('.')
        && let Ok(float) = text.parse::<f64>()
        && let Some(num) = serde_json::Number::from_f64(float)
    {
        return Value::Number(num);
    }
    Value::String(text.to_string())
}

/// The value grown container slots are filled with until an override lands.
pub(crate) fn default_value(kind: Kind) -> Value {
    match kind {
        Kind::Bool => Value::Bool(false),
        Kind::Int => Value::Number(0.into()),
        Kind::Float => Value::from(0.0),
        Kind::Str => Value::String(String::new()),
        Kind::Null => Value::Null,
        Kind::Array => Value::Array(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bool_accepts_case_insensitive_literals() {
        assert_eq!(coerce("k", "true", Kind::Bool).unwrap(), json!(true));
        assert_eq!(coerce("k", "FALSE", Kind::Bool).unwrap(), json!(false));
        assert_eq!(coerce("k", "True", Kind::Bool).unwrap(), json!(true));
    }

    #[test]
    fn bool_rejects_numeric_shorthand() {
        assert!(matches!(
            coerce("debug", "1", Kind::Bool),
            Err(OverfigError::Coerce { .. })
        ));
    }

    #[test]
    fn int_parses_and_rejects() {
        assert_eq!(coerce("k", "42", Kind::Int).unwrap(), json!(42));
        assert_eq!(coerce("k", "-7", Kind::Int).unwrap(), json!(-7));
        assert!(matches!(
            coerce("port", "80a0", Kind::Int),
            Err(OverfigError::Coerce { .. })
        ));
        assert!(matches!(
            coerce("port", "1.5", Kind::Int),
            Err(OverfigError::Coerce { .. })
        ));
    }

    #[test]
    fn int_falls_back_to_u64_for_large_values() {
        let value = coerce("k", "18446744073709551615", Kind::Int).unwrap();
        assert_eq!(value, json!(u64::MAX));
    }

    #[test]
    fn float_parses_whole_and_fractional() {
        assert_eq!(coerce("k", "1.5", Kind::Float).unwrap(), json!(1.5));
        assert_eq!(coerce("k", "3", Kind::Float).unwrap(), json!(3.0));
    }

    #[test]
    fn float_rejects_non_finite() {
        assert!(matches!(
            coerce("ratio", "NaN", Kind::Float),
            Err(OverfigError::Coerce { .. })
        ));
        assert!(matches!(
            coerce("ratio", "inf", Kind::Float),
            Err(OverfigError::Coerce { .. })
        ));
    }

    #[test]
    fn string_passes_through_verbatim() {
        assert_eq!(coerce("k", "true", Kind::Str).unwrap(), json!("true"));
        assert_eq!(coerce("k", "", Kind::Str).unwrap(), json!(""));
    }

    #[test]
    fn null_kind_uses_heuristic() {
        assert_eq!(coerce("k", "true", Kind::Null).unwrap(), json!(true));
        assert_eq!(coerce("k", "42", Kind::Null).unwrap(), json!(42));
        assert_eq!(coerce("k", "1.5", Kind::Null).unwrap(), json!(1.5));
        assert_eq!(coerce("k", "1e5", Kind::Null).unwrap(), json!("1e5"));
        assert_eq!(coerce("k", "hello", Kind::Null).unwrap(), json!("hello"));
    }

    #[test]
    fn array_kind_is_not_coercible() {
        assert!(matches!(
            coerce("tags", "x", Kind::Array),
            Err(OverfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn default_values_per_kind() {
        assert_eq!(default_value(Kind::Bool), json!(false));
        assert_eq!(default_value(Kind::Int), json!(0));
        assert_eq!(default_value(Kind::Float), json!(0.0));
        assert_eq!(default_value(Kind::Str), json!(""));
        assert_eq!(default_value(Kind::Null), Value::Null);
    }
}
