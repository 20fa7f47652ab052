use indexmap::IndexMap;
use serde_json::Value;

use crate::error::OverfigError;
use crate::tree::join_key;
use crate::types::Kind;

/// One addressable configuration property.
///
/// Properties are discovered by walking the bound document: scalar and null
/// leaves become overridable properties, arrays become container markers
/// whose elements are addressed as `name[0]`, `name[1]`, and objects only
/// contribute their dotted prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prop {
    /// Full dotted, indexed path, e.g. `database.hosts[2]`.
    pub path: String,
    pub kind: Kind,
    /// Path of the array this property sits in, when it is a direct element.
    pub container: Option<String>,
    /// Position within `container`.
    pub index: Option<usize>,
    /// Scalar kind of this container's elements, used to default-fill grown
    /// slots. Container markers only.
    pub elem_kind: Option<Kind>,
    /// Whether overlay sources may target this property. Container markers
    /// are not directly overridable.
    pub supported: bool,
    /// Set when an overlay source changed this property's value. Cleared by
    /// an explicit set and by a re-baselining load.
    pub overridden: bool,
}

/// The flat namespace of addressable properties, in document order.
#[derive(Debug, Clone)]
pub(crate) struct Namespace {
    props: IndexMap<String, Prop>,
}

impl Namespace {
    /// Walk a document and build its namespace. The root must be an object.
    pub(crate) fn traverse(tree: &Value) -> Result<Self, OverfigError> {
        if !tree.is_object() {
            return Err(OverfigError::RootNotObject);
        }
        let mut props = IndexMap::new();
        walk(tree, "", None, &mut props)?;
        Ok(Self { props })
    }

    /// Re-traverse after the document changed shape, carrying override flags
    /// over for paths that survive.
    pub(crate) fn rebuild(&self, tree: &Value) -> Result<Self, OverfigError> {
        let mut next = Self::traverse(tree)?;
        for (path, prop) in &mut next.props {
            if let Some(previous) = self.props.get(path) {
                prop.overridden = previous.overridden;
            }
        }
        Ok(next)
    }

    pub(crate) fn get(&self, path: &str) -> Option<&Prop> {
        self.props.get(path)
    }

    pub(crate) fn get_mut(&mut self, path: &str) -> Option<&mut Prop> {
        self.props.get_mut(path)
    }

    pub(crate) fn contains(&self, path: &str) -> bool {
        self.props.contains_key(path)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Prop> {
        self.props.values()
    }

    pub(crate) fn paths(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    /// Container markers, in document order.
    pub(crate) fn containers(&self) -> impl Iterator<Item = &Prop> {
        self.props.values().filter(|p| p.kind == Kind::Array)
    }

    pub(crate) fn len(&self) -> usize {
        self.props.len()
    }
}

fn walk(
    value: &Value,
    path: &str,
    owner: Option<(&str, usize)>,
    props: &mut IndexMap<String, Prop>,
) -> Result<(), OverfigError> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key.is_empty() || key.contains(['.', '[', ']', '=']) {
                    return Err(OverfigError::InvalidKey {
                        path: join_key(path, key),
                    });
                }
                let child_path = join_key(path, key);
                walk(child, &child_path, None, props)?;
            }
        }
        Value::Array(items) => {
            let elem_kind = items
                .first()
                .and_then(Kind::of)
                .filter(|kind| *kind != Kind::Array);
            props.insert(
                path.to_string(),
                Prop {
                    path: path.to_string(),
                    kind: Kind::Array,
                    container: owner.map(|(c, _)| c.to_string()),
                    index: owner.map(|(_, i)| i),
                    elem_kind,
                    supported: false,
                    overridden: false,
                },
            );
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                walk(item, &item_path, Some((path, index)), props)?;
            }
        }
        scalar => {
            let kind = Kind::of(scalar).unwrap_or(Kind::Null);
            props.insert(
                path.to_string(),
                Prop {
                    path: path.to_string(),
                    kind,
                    container: owner.map(|(c, _)| c.to_string()),
                    index: owner.map(|(_, i)| i),
                    elem_kind: None,
                    supported: true,
                    overridden: false,
                },
            );
        }
    }
    Ok(())
}
