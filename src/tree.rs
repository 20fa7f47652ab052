use serde_json::Value;
use tracing::warn;

use crate::error::OverfigError;
use crate::types::Kind;

/// One step of a dotted, indexed property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Key(String),
    Index(usize),
}

/// Split `a.b[0].c` into segments. Returns `None` for paths that do not
/// follow the addressing grammar (empty member names, unbalanced brackets,
/// non-numeric indices).
pub(crate) fn parse_path(path: &str) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let (name, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };
        if name.is_empty() {
            return None;
        }
        segments.push(Segment::Key(name.to_string()));
        while let Some(inner) = rest.strip_prefix('[') {
            let close = inner.find(']')?;
            let index: usize = inner[..close].parse().ok()?;
            segments.push(Segment::Index(index));
            rest = &inner[close + 1..];
        }
        if !rest.is_empty() {
            return None;
        }
    }
    Some(segments)
}

pub(crate) fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in parse_path(path)? {
        current = match segment {
            Segment::Key(key) => current.as_object()?.get(&key)?,
            Segment::Index(index) => current.as_array()?.get(index)?,
        };
    }
    Some(current)
}

pub(crate) fn get_path_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in parse_path(path)? {
        current = match segment {
            Segment::Key(key) => current.as_object_mut()?.get_mut(&key)?,
            Segment::Index(index) => current.as_array_mut()?.get_mut(index)?,
        };
    }
    Some(current)
}

/// Leaf paths written by a merge, plus overlay keys that had no counterpart
/// in the target document.
#[derive(Debug, Default)]
pub(crate) struct MergeOutcome {
    pub defined: Vec<String>,
    pub unknown: Vec<String>,
}

/// Merge an overlay document into `target`, define-wise.
///
/// Only paths the overlay actually defines are written. Objects merge
/// key-wise; arrays merge element-wise and may extend the target but never
/// shrink it. Keys the target does not know and leaves whose types clash are
/// skipped with a warning, or rejected outright in strict mode.
pub(crate) fn merge_defined(
    target: &mut Value,
    overlay: &Value,
    strict: bool,
) -> Result<MergeOutcome, OverfigError> {
    let mut outcome = MergeOutcome::default();
    merge_at(target, overlay, "", strict, &mut outcome)?;
    Ok(outcome)
}

fn merge_at(
    target: &mut Value,
    overlay: &Value,
    path: &str,
    strict: bool,
    outcome: &mut MergeOutcome,
) -> Result<(), OverfigError> {
    match (target, overlay) {
        (Value::Object(target_map), Value::Object(overlay_map)) => {
            for (key, overlay_child) in overlay_map {
                let child_path = join_key(path, key);
                match target_map.get_mut(key) {
                    Some(target_child) => {
                        merge_at(target_child, overlay_child, &child_path, strict, outcome)?;
                    }
                    None if strict => {
                        return Err(OverfigError::UnknownKey { key: child_path });
                    }
                    None => {
                        warn!(key = %child_path, "ignoring unknown key in overlay document");
                        outcome.unknown.push(child_path);
                    }
                }
            }
        }
        (Value::Array(target_items), Value::Array(overlay_items)) => {
            for (index, overlay_item) in overlay_items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                if index < target_items.len() {
                    merge_at(
                        &mut target_items[index],
                        overlay_item,
                        &item_path,
                        strict,
                        outcome,
                    )?;
                } else {
                    target_items.push(overlay_item.clone());
                    record_leaves(overlay_item, &item_path, &mut outcome.defined);
                }
            }
        }
        // The declared type of a null slot is unknowable, so any shape may
        // land in it.
        (target @ Value::Null, overlay) => {
            *target = overlay.clone();
            record_leaves(overlay, path, &mut outcome.defined);
        }
        (target, overlay) if compatible(target, overlay) => {
            *target = promote(target, overlay);
            outcome.defined.push(path.to_string());
        }
        (target, overlay) => {
            if strict {
                return Err(OverfigError::InvalidValue {
                    key: path.to_string(),
                    reason: format!(
                        "expected {}, found {}",
                        describe(target),
                        describe(overlay)
                    ),
                });
            }
            warn!(
                key = %path,
                expected = describe(target),
                found = describe(overlay),
                "ignoring type-mismatched value in overlay document"
            );
        }
    }
    Ok(())
}

/// A scalar overlay value may land on a same-kind slot; integers may also
/// land on float slots. `null` unsets anything.
fn compatible(target: &Value, overlay: &Value) -> bool {
    if overlay.is_null() {
        return true;
    }
    match (Kind::of(target), Kind::of(overlay)) {
        (Some(a), Some(b)) if a == b => true,
        (Some(Kind::Float), Some(Kind::Int)) => true,
        _ => false,
    }
}

fn promote(target: &Value, overlay: &Value) -> Value {
    if let (Some(Kind::Float), Some(i)) = (Kind::of(target), overlay.as_i64()) {
        return Value::from(i as f64);
    }
    overlay.clone()
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collect every leaf path under a freshly written subtree.
fn record_leaves(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                record_leaves(child, &join_key(path, key), out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                record_leaves(item, &format!("{path}[{index}]"), out);
            }
        }
        _ => out.push(path.to_string()),
    }
}

pub(crate) fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_dotted_and_indexed_paths() {
        assert_eq!(
            parse_path("a.b[0].c"),
            Some(vec![
                Segment::Key("a".into()),
                Segment::Key("b".into()),
                Segment::Index(0),
                Segment::Key("c".into()),
            ])
        );
        assert_eq!(
            parse_path("grid[1][2]"),
            Some(vec![
                Segment::Key("grid".into()),
                Segment::Index(1),
                Segment::Index(2),
            ])
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(parse_path(""), None);
        assert_eq!(parse_path("a..b"), None);
        assert_eq!(parse_path("a[x]"), None);
        assert_eq!(parse_path("a[1"), None);
        assert_eq!(parse_path("a[1]b"), None);
    }

    #[test]
    fn navigates_nested_documents() {
        let doc = json!({"db": {"hosts": ["a", "b"], "pool": 5}});
        assert_eq!(get_path(&doc, "db.pool"), Some(&json!(5)));
        assert_eq!(get_path(&doc, "db.hosts[1]"), Some(&json!("b")));
        assert_eq!(get_path(&doc, "db.hosts[2]"), None);
        assert_eq!(get_path(&doc, "db.missing"), None);
    }

    #[test]
    fn mutable_navigation_writes_through() {
        let mut doc = json!({"db": {"pool": 5}});
        *get_path_mut(&mut doc, "db.pool").unwrap() = json!(10);
        assert_eq!(doc, json!({"db": {"pool": 10}}));
    }

    #[test]
    fn merge_overwrites_defined_leaves_only() {
        let mut target = json!({"host": "localhost", "port": 80, "debug": false});
        let overlay = json!({"port": 8080});
        let outcome = merge_defined(&mut target, &overlay, false).unwrap();
        assert_eq!(target, json!({"host": "localhost", "port": 8080, "debug": false}));
        assert_eq!(outcome.defined, vec!["port"]);
    }

    #[test]
    fn merge_recurses_into_objects() {
        let mut target = json!({"db": {"url": "a", "pool": 1}});
        let overlay = json!({"db": {"pool": 9}});
        let outcome = merge_defined(&mut target, &overlay, false).unwrap();
        assert_eq!(target, json!({"db": {"url": "a", "pool": 9}}));
        assert_eq!(outcome.defined, vec!["db.pool"]);
    }

    #[test]
    fn merge_extends_arrays_but_never_shrinks() {
        let mut target = json!({"tags": ["a", "b", "c"]});
        let overlay = json!({"tags": ["x"]});
        merge_defined(&mut target, &overlay, false).unwrap();
        assert_eq!(target, json!({"tags": ["x", "b", "c"]}));

        let overlay = json!({"tags": ["1", "2", "3", "4"]});
        let outcome = merge_defined(&mut target, &overlay, false).unwrap();
        assert_eq!(target, json!({"tags": ["1", "2", "3", "4"]}));
        assert!(outcome.defined.contains(&"tags[3]".to_string()));
    }

    #[test]
    fn merge_skips_unknown_keys_when_lenient() {
        let mut target = json!({"port": 80});
        let overlay = json!({"port": 81, "typo": 1});
        let outcome = merge_defined(&mut target, &overlay, false).unwrap();
        assert_eq!(target, json!({"port": 81}));
        assert_eq!(outcome.unknown, vec!["typo"]);
    }

    #[test]
    fn merge_rejects_unknown_keys_when_strict() {
        let mut target = json!({"port": 80});
        let overlay = json!({"typo": 1});
        let err = merge_defined(&mut target, &overlay, true).unwrap_err();
        assert!(matches!(err, OverfigError::UnknownKey { key } if key == "typo"));
    }

    #[test]
    fn merge_skips_type_mismatches_when_lenient() {
        let mut target = json!({"port": 80});
        let overlay = json!({"port": "eighty"});
        merge_defined(&mut target, &overlay, false).unwrap();
        assert_eq!(target, json!({"port": 80}));
    }

    #[test]
    fn merge_rejects_type_mismatches_when_strict() {
        let mut target = json!({"port": 80});
        let overlay = json!({"port": "eighty"});
        let err = merge_defined(&mut target, &overlay, true).unwrap_err();
        assert!(matches!(err, OverfigError::InvalidValue { key, .. } if key == "port"));
    }

    #[test]
    fn merge_promotes_int_onto_float() {
        let mut target = json!({"ratio": 0.5});
        let overlay = json!({"ratio": 2});
        merge_defined(&mut target, &overlay, false).unwrap();
        assert_eq!(target, json!({"ratio": 2.0}));
        assert!(target["ratio"].is_f64());
    }

    #[test]
    fn merge_fills_null_slots_with_any_shape() {
        let mut target = json!({"url": null});
        let overlay = json!({"url": "postgres://x"});
        let outcome = merge_defined(&mut target, &overlay, false).unwrap();
        assert_eq!(target, json!({"url": "postgres://x"}));
        assert_eq!(outcome.defined, vec!["url"]);
    }

    #[test]
    fn merge_null_unsets_a_scalar() {
        let mut target = json!({"url": "postgres://x"});
        let overlay = json!({"url": null});
        merge_defined(&mut target, &overlay, false).unwrap();
        assert_eq!(target, json!({"url": null}));
    }

    #[test]
    fn appended_array_objects_record_their_leaves() {
        let mut target = json!({"servers": [{"host": "a", "port": 1}]});
        let overlay = json!({"servers": [{"host": "a", "port": 1}, {"host": "b", "port": 2}]});
        let outcome = merge_defined(&mut target, &overlay, false).unwrap();
        assert!(outcome.defined.contains(&"servers[1].host".to_string()));
        assert!(outcome.defined.contains(&"servers[1].port".to_string()));
    }
}
