use serde_json::Value;
use tracing::debug;

use crate::coerce::coerce;
use crate::error::OverfigError;
use crate::namespace::Namespace;
use crate::sources::{lookup_ci, Sources};
use crate::tree::get_path_mut;
use crate::types::Kind;

/// Resolve every property against the overlay sources, first match wins.
///
/// Per property, in order: an exact `name=value` CLI token, a bare CLI token
/// for booleans (one equal to the name, or starting with it), a system
/// property, an environment variable under the configured prefix. Properties
/// and environment variables are probed under the exact, lowercase, and
/// uppercase spellings of their name. The first source that yields text is
/// coerced and applied; lower-precedence sources are not consulted even when
/// the value matches what is already there.
///
/// The override flag is only raised when the applied value actually differs.
/// Returns the CLI tokens that no property consumed, in their original
/// order.
pub(crate) fn apply(
    tree: &mut Value,
    ns: &mut Namespace,
    sources: &Sources,
) -> Result<Vec<String>, OverfigError> {
    let mut consumed = vec![false; sources.args.len()];
    let paths: Vec<String> = ns.paths().map(str::to_string).collect();

    for path in paths {
        let Some(prop) = ns.get(&path) else { continue };
        if !prop.supported {
            if targeted(&path, sources, &consumed) {
                debug!(key = %path, "overlay targets an unsupported property; skipping");
            }
            continue;
        }
        let kind = prop.kind;

        let mut text: Option<String> = None;
        let needle = format!("{path}=");
        for (i, arg) in sources.args.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            if let Some(value) = arg.strip_prefix(&needle) {
                text = Some(value.to_string());
                consumed[i] = true;
                break;
            }
        }
        if text.is_none() && kind == Kind::Bool {
            for (i, arg) in sources.args.iter().enumerate() {
                if !consumed[i] && arg.starts_with(path.as_str()) {
                    text = Some("true".to_string());
                    consumed[i] = true;
                    break;
                }
            }
        }
        if text.is_none()
            && let Some(value) = lookup_ci(sources.props, &path)
        {
            text = Some(value.to_string());
        }
        if text.is_none()
            && let Some(name) = sources.env_name(&path)
            && let Some(value) = lookup_ci(sources.env, &name)
        {
            text = Some(value.to_string());
        }

        let Some(text) = text else { continue };
        let value = coerce(&path, &text, kind)?;
        let slot = get_path_mut(tree, &path)
            .ok_or_else(|| OverfigError::KeyNotFound(path.clone()))?;
        if *slot != value {
            debug!(key = %path, value = %text, "overlay override applied");
            *slot = value;
            if let Some(prop) = ns.get_mut(&path) {
                prop.overridden = true;
            }
        }
    }

    Ok(sources
        .args
        .iter()
        .enumerate()
        .filter(|(i, _)| !consumed[*i])
        .map(|(_, arg)| arg.clone())
        .collect())
}

fn targeted(path: &str, sources: &Sources, consumed: &[bool]) -> bool {
    let needle = format!("{path}=");
    sources
        .args
        .iter()
        .enumerate()
        .any(|(i, arg)| !consumed[i] && arg.starts_with(&needle))
        || lookup_ci(sources.props, path).is_some()
        || sources
            .env_name(path)
            .is_some_and(|name| lookup_ci(sources.env, &name).is_some())
}
