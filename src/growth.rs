use serde_json::Value;
use tracing::debug;

use crate::coerce::default_value;
use crate::error::OverfigError;
use crate::namespace::Namespace;
use crate::sources::{max_index, variants, Sources};
use crate::tree::get_path_mut;

/// Size containers to fit every element index the overlay sources address.
///
/// Containers grow, never shrink: the target length is the maximum of the
/// current length and the highest addressed index plus one. New slots are
/// filled with the element kind's default value, or `null` when the element
/// shape is not a scalar. Runs once per container, strictly before scalar
/// overlay, so freshly grown slots are addressable in the same pass.
///
/// Returns whether anything grew; the caller re-traverses the namespace if
/// so.
pub(crate) fn grow(
    tree: &mut Value,
    ns: &Namespace,
    sources: &Sources,
) -> Result<bool, OverfigError> {
    let containers: Vec<_> = ns
        .containers()
        .map(|prop| (prop.path.clone(), prop.elem_kind))
        .collect();

    let mut grew = false;
    for (path, elem_kind) in containers {
        let arg_stems = [path.clone()];
        let mut wanted = max_index(sources.args.iter().map(String::as_str), &arg_stems);
        wanted = pick_max(
            wanted,
            max_index(sources.props.keys().map(String::as_str), &variants(&path)),
        );
        if let Some(env_stem) = sources.env_name(&path) {
            wanted = pick_max(
                wanted,
                max_index(sources.env.keys().map(String::as_str), &variants(&env_stem)),
            );
        }
        let Some(max_addressed) = wanted else {
            continue;
        };

        let slot = get_path_mut(tree, &path).ok_or_else(|| OverfigError::ContainerMismatch {
            path: path.clone(),
        })?;
        let Value::Array(items) = slot else {
            return Err(OverfigError::ContainerMismatch { path });
        };
        let needed = max_addressed + 1;
        if needed > items.len() {
            let fill = elem_kind.map(default_value).unwrap_or(Value::Null);
            debug!(
                container = %path,
                from = items.len(),
                to = needed,
                "growing container for addressed elements"
            );
            items.resize(needed, fill);
            grew = true;
        }
    }
    Ok(grew)
}

fn pick_max(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
