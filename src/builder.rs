use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::coerce::{coerce, default_value};
use crate::error::OverfigError;
use crate::growth;
use crate::namespace::{Namespace, Prop};
use crate::ops::{self, CliOutcome, Processed, VerbScan};
use crate::overlay;
use crate::sources::Sources;
use crate::tree::{self, Segment};
use crate::types::{CliRequest, Kind, MissingKey};

/// A configuration object bound to its overlay sources.
///
/// `Overfig` keeps two JSON documents. The **baseline** is the seed object
/// with the configured file and string layers merged in, plus any explicit
/// edits — it is what [`save`](Self::save) writes back out. The **live**
/// document starts as a copy of the baseline and additionally carries
/// whatever the overlay sources (CLI tokens, system properties, environment
/// variables) put there. Overlay values are transient: they never leak into
/// the baseline.
///
/// Every scalar in the documents is addressable by a dotted, indexed path
/// (`database.url`, `ports[2]`), and each carries an override flag telling
/// the two documents apart at that spot.
pub struct Overfig<C> {
    live: Value,
    baseline: Value,
    ns: Namespace,
    file: Option<PathBuf>,
    save_file: Option<PathBuf>,
    json_str: Option<String>,
    env_prefix: Option<String>,
    env: IndexMap<String, String>,
    props: IndexMap<String, String>,
    strict: bool,
    missing_key: MissingKey,
    last_args: Option<Vec<String>>,
    _phantom: PhantomData<C>,
}

impl<C: Serialize> Overfig<C> {
    /// Start binding a configuration object to its overlay sources.
    pub fn bind(seed: C) -> OverfigBuilder<C> {
        OverfigBuilder::new(seed)
    }
}

/// Builder for binding a seed object and its baseline layers.
///
/// Baseline layers merge in a fixed order — seed, then
/// [`file()`](Self::file), then [`json_str()`](Self::json_str) — each layer
/// sparse, overriding only the keys it defines.
pub struct OverfigBuilder<C> {
    seed: C,
    file: Option<PathBuf>,
    json_str: Option<String>,
    save_file: Option<PathBuf>,
    env_prefix: Option<String>,
    env_vars: Option<IndexMap<String, String>>,
    props: IndexMap<String, String>,
    strict: bool,
    missing_key: MissingKey,
}

impl<C> OverfigBuilder<C> {
    fn new(seed: C) -> Self {
        Self {
            seed,
            file: None,
            json_str: None,
            save_file: None,
            env_prefix: None,
            env_vars: None,
            props: IndexMap::new(),
            strict: false,
            missing_key: MissingKey::default(),
        }
    }

    /// Merge a JSON file into the baseline. A missing or malformed file is
    /// reported and skipped unless [`strict`](Self::strict) is on. This path
    /// is also the default target for [`save`](Overfig::save).
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Merge a JSON string into the baseline, above the file layer.
    pub fn json_str(mut self, text: impl Into<String>) -> Self {
        self.json_str = Some(text.into());
        self
    }

    /// Write saves here instead of the [`file`](Self::file) path.
    pub fn save_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_file = Some(path.into());
        self
    }

    /// Enable the environment layer. Variables are looked up as
    /// `{prefix}{path}`, probing the exact, lowercase, and uppercase
    /// spellings. Without a prefix the environment is not consulted at all;
    /// pass an empty string for unprefixed lookup.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Replace the environment snapshot taken at load time. Meant for tests
    /// and hosts that manage their own environment.
    pub fn env_vars(mut self, vars: IndexMap<String, String>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Add one system property, the layer between CLI tokens and the
    /// environment.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Add several system properties at once.
    pub fn props<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in pairs {
            self.props.insert(name.into(), value.into());
        }
        self
    }

    /// Enable or disable strict mode (default: off). In strict mode unknown
    /// keys, type mismatches, and unreadable baseline documents are errors
    /// instead of warnings.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Pick how `get`/`set` verbs report keys missing from the namespace
    /// (default: [`MissingKey::Succeed`]).
    pub fn missing_key(mut self, policy: MissingKey) -> Self {
        self.missing_key = policy;
        self
    }

    /// Serialize the seed, merge the baseline layers, and traverse the
    /// result into the property namespace.
    pub fn load(self) -> Result<Overfig<C>, OverfigError>
    where
        C: Serialize,
    {
        let mut tree = serde_json::to_value(&self.seed)?;
        if !tree.is_object() {
            return Err(OverfigError::RootNotObject);
        }
        // Fail fast on unaddressable member names before any layer lands.
        Namespace::traverse(&tree)?;

        if let Some(path) = &self.file {
            match fs::read_to_string(path) {
                Ok(text) => merge_layer(&mut tree, &text, self.strict)?,
                Err(source) if self.strict => {
                    return Err(OverfigError::Io {
                        path: path.clone(),
                        source,
                    });
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "cannot read baseline file; skipping");
                }
            }
        }
        if let Some(text) = &self.json_str {
            merge_layer(&mut tree, text, self.strict)?;
        }

        let ns = Namespace::traverse(&tree)?;
        let env = self
            .env_vars
            .unwrap_or_else(|| std::env::vars().collect());
        debug!(properties = ns.len(), "configuration bound");

        Ok(Overfig {
            live: tree.clone(),
            baseline: tree,
            ns,
            file: self.file,
            save_file: self.save_file,
            json_str: self.json_str,
            env_prefix: self.env_prefix,
            env,
            props: self.props,
            strict: self.strict,
            missing_key: self.missing_key,
            last_args: None,
            _phantom: PhantomData,
        })
    }
}

fn merge_layer(tree: &mut Value, text: &str, strict: bool) -> Result<(), OverfigError> {
    let doc: Value = match serde_json::from_str(text) {
        Ok(doc) => doc,
        Err(source) if strict => return Err(OverfigError::Serialize(source)),
        Err(error) => {
            warn!(%error, "malformed baseline document; skipping");
            return Ok(());
        }
    };
    tree::merge_defined(tree, &doc, strict)?;
    Ok(())
}

/// Write a value at `key`, growing any array on the way whose length does
/// not reach the addressed index. Fills come from the container's element
/// kind, `null` when that is unknown.
fn write_materializing(
    tree: &mut Value,
    ns: &Namespace,
    key: &str,
    value: Value,
) -> Result<(), OverfigError> {
    let segments =
        tree::parse_path(key).ok_or_else(|| OverfigError::KeyNotFound(key.to_string()))?;
    let mut current = tree;
    let mut walked = String::new();
    for segment in &segments {
        match segment {
            Segment::Key(name) => {
                walked = tree::join_key(&walked, name);
                current = current
                    .as_object_mut()
                    .and_then(|map| map.get_mut(name))
                    .ok_or_else(|| OverfigError::KeyNotFound(key.to_string()))?;
            }
            Segment::Index(index) => {
                let container = walked.clone();
                walked.push_str(&format!("[{index}]"));
                let items =
                    current
                        .as_array_mut()
                        .ok_or_else(|| OverfigError::ContainerMismatch {
                            path: container.clone(),
                        })?;
                if *index >= items.len() {
                    let fill = ns
                        .get(&container)
                        .and_then(|prop| prop.elem_kind)
                        .map(default_value)
                        .unwrap_or(Value::Null);
                    items.resize(index + 1, fill);
                }
                current = &mut items[*index];
            }
        }
    }
    *current = value;
    Ok(())
}

impl<C> Overfig<C> {
    /// Run one overlay pass: size containers, resolve every property against
    /// the sources, execute an embedded `get`/`set` verb if the tokens carry
    /// one.
    ///
    /// Returns the tokens that neither a property nor a verb consumed, plus
    /// the verb outcome. The tokens given here are remembered and re-applied
    /// by [`load_str`](Self::load_str) after a re-baseline; verbs are not.
    pub fn process<I, S>(&mut self, args: I) -> Result<Processed, OverfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        let scan = ops::scan_verb(&mut tokens);
        self.last_args = Some(tokens.clone());

        let remaining = self.overlay_pass(&tokens)?;

        let verb = match scan {
            Some(VerbScan::Request(request)) => Some(self.handle(request)?),
            Some(VerbScan::Usage(verb)) => Some(CliOutcome::Usage { verb }),
            None => None,
        };
        Ok(Processed { remaining, verb })
    }

    /// Execute a `get`/`set` request from a host with its own argument
    /// parser. `set` coerces, applies as an explicit edit, and persists via
    /// [`save`](Self::save).
    pub fn handle(&mut self, request: CliRequest) -> Result<CliOutcome, OverfigError> {
        match request {
            CliRequest::Get { key } => Ok(self.lookup_outcome(key)),
            CliRequest::Set { key, value } => {
                if !self.ns.contains(&key) {
                    return Ok(CliOutcome::NotFound { key });
                }
                let old = self.get(&key).map(|v| ops::format_value(&v))?;
                self.set_text(&key, &value)?;
                self.save()?;
                let new = self.get(&key).map(|v| ops::format_value(&v))?;
                Ok(CliOutcome::Previous { key, old, new })
            }
        }
    }

    fn lookup_outcome(&self, key: String) -> CliOutcome {
        if self.ns.contains(&key)
            && let Some(value) = tree::get_path(&self.live, &key)
        {
            return CliOutcome::Found {
                value: ops::format_value(value),
                key,
            };
        }
        CliOutcome::NotFound { key }
    }

    fn overlay_pass(&mut self, args: &[String]) -> Result<Vec<String>, OverfigError> {
        let sources = Sources {
            args,
            props: &self.props,
            env: &self.env,
            env_prefix: self.env_prefix.as_deref(),
        };
        if growth::grow(&mut self.live, &self.ns, &sources)? {
            self.ns = self.ns.rebuild(&self.live)?;
        }
        let sources = Sources {
            args,
            props: &self.props,
            env: &self.env,
            env_prefix: self.env_prefix.as_deref(),
        };
        overlay::apply(&mut self.live, &mut self.ns, &sources)
    }

    /// The resolved value at `key`, from the live document.
    pub fn get(&self, key: &str) -> Result<Value, OverfigError> {
        if !self.ns.contains(key) {
            return Err(OverfigError::KeyNotFound(key.to_string()));
        }
        tree::get_path(&self.live, key)
            .cloned()
            .ok_or_else(|| OverfigError::KeyNotFound(key.to_string()))
    }

    /// Explicitly set a property from a typed value. Explicit edits clear
    /// the override flag, land in the baseline, and survive
    /// [`save`](Self::save).
    pub fn set<V: Serialize>(&mut self, key: &str, value: V) -> Result<(), OverfigError> {
        let value = serde_json::to_value(value)?;
        let kind = {
            let prop = self
                .ns
                .get(key)
                .ok_or_else(|| OverfigError::KeyNotFound(key.to_string()))?;
            if !prop.supported {
                return Err(OverfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "cannot assign directly to an array container".to_string(),
                });
            }
            prop.kind
        };
        let value_kind = Kind::of(&value).ok_or_else(|| OverfigError::InvalidValue {
            key: key.to_string(),
            reason: "objects are not assignable; set their members individually".to_string(),
        })?;
        if value_kind == Kind::Array {
            return Err(OverfigError::InvalidValue {
                key: key.to_string(),
                reason: "arrays are not assignable; set their elements individually".to_string(),
            });
        }
        let accepted = value_kind == kind
            || kind == Kind::Null
            || value_kind == Kind::Null
            || (kind == Kind::Float && value_kind == Kind::Int);
        if !accepted {
            return Err(OverfigError::InvalidValue {
                key: key.to_string(),
                reason: format!("expected {kind}, got {value_kind}"),
            });
        }
        let value = if kind == Kind::Float
            && let Some(int) = value.as_i64()
        {
            Value::from(int as f64)
        } else {
            value
        };
        self.apply_explicit(key, value)
    }

    /// Explicitly set a property from text, coerced by the property's kind.
    pub fn set_text(&mut self, key: &str, text: &str) -> Result<(), OverfigError> {
        let prop = self
            .ns
            .get(key)
            .ok_or_else(|| OverfigError::KeyNotFound(key.to_string()))?;
        let value = coerce(key, text, prop.kind)?;
        self.apply_explicit(key, value)
    }

    fn apply_explicit(&mut self, key: &str, value: Value) -> Result<(), OverfigError> {
        let value_kind = Kind::of(&value);
        let slot = tree::get_path_mut(&mut self.live, key)
            .ok_or_else(|| OverfigError::KeyNotFound(key.to_string()))?;
        *slot = value.clone();
        write_materializing(&mut self.baseline, &self.ns, key, value)?;
        if let Some(prop) = self.ns.get_mut(key) {
            prop.overridden = false;
            // An explicit edit pins down a previously unknowable type.
            if prop.kind == Kind::Null
                && let Some(kind) = value_kind
                && kind != Kind::Null
            {
                prop.kind = kind;
            }
        }
        Ok(())
    }

    /// The live document as JSON.
    pub fn json(&self) -> Result<String, OverfigError> {
        Ok(serde_json::to_string(&self.live)?)
    }

    pub fn json_pretty(&self) -> Result<String, OverfigError> {
        Ok(serde_json::to_string_pretty(&self.live)?)
    }

    /// The baseline document as JSON: seed plus baseline layers plus
    /// explicit edits. Transient overlay values and grown slots never appear
    /// here.
    pub fn original_json(&self) -> Result<String, OverfigError> {
        Ok(serde_json::to_string(&self.baseline)?)
    }

    pub fn original_json_pretty(&self) -> Result<String, OverfigError> {
        Ok(serde_json::to_string_pretty(&self.baseline)?)
    }

    /// Serialize the baseline and write it to the save target — the
    /// [`save_file`](OverfigBuilder::save_file) if configured, else the
    /// [`file`](OverfigBuilder::file) path. With neither, the text is only
    /// returned.
    pub fn save(&self) -> Result<String, OverfigError> {
        let mut text = self.original_json()?;
        text.push('\n');
        self.write_out(text)
    }

    /// [`save`](Self::save), pretty-printed.
    pub fn save_pretty(&self) -> Result<String, OverfigError> {
        let mut text = self.original_json_pretty()?;
        text.push('\n');
        self.write_out(text)
    }

    fn write_out(&self, text: String) -> Result<String, OverfigError> {
        if let Some(path) = self.save_target() {
            let path = path.to_path_buf();
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).map_err(|source| OverfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&path, &text).map_err(|source| OverfigError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "configuration saved");
        }
        Ok(text)
    }

    fn save_target(&self) -> Option<&Path> {
        self.save_file.as_deref().or(self.file.as_deref())
    }

    /// Re-baseline from a JSON document: paths the document defines take its
    /// values in both documents and their override flags clear, then the
    /// overlay sources from the last [`process`](Self::process) call are
    /// re-applied. Either everything applies or nothing does.
    ///
    /// Returns whether the document was applied; malformed text is reported
    /// and skipped unless strict.
    pub fn load_str(&mut self, text: &str) -> Result<bool, OverfigError> {
        let doc: Value = match serde_json::from_str(text) {
            Ok(doc) => doc,
            Err(source) if self.strict => return Err(OverfigError::Serialize(source)),
            Err(error) => {
                warn!(%error, "malformed reload document; keeping current state");
                return Ok(false);
            }
        };

        let mut baseline = self.baseline.clone();
        let mut live = self.live.clone();
        let outcome = tree::merge_defined(&mut baseline, &doc, self.strict)?;
        tree::merge_defined(&mut live, &doc, self.strict)?;
        // The live document may disagree with the incoming types where an
        // overlay landed earlier; the baseline decides.
        for path in &outcome.defined {
            if let Some(base) = tree::get_path(&baseline, path)
                && let Some(slot) = tree::get_path_mut(&mut live, path)
                && *slot != *base
            {
                *slot = base.clone();
            }
        }

        let mut ns = self.ns.rebuild(&live)?;
        for path in &outcome.defined {
            if let Some(prop) = ns.get_mut(path) {
                prop.overridden = false;
            }
        }

        if let Some(args) = self.last_args.clone() {
            let sources = Sources {
                args: &args,
                props: &self.props,
                env: &self.env,
                env_prefix: self.env_prefix.as_deref(),
            };
            if growth::grow(&mut live, &ns, &sources)? {
                ns = ns.rebuild(&live)?;
            }
            let sources = Sources {
                args: &args,
                props: &self.props,
                env: &self.env,
                env_prefix: self.env_prefix.as_deref(),
            };
            overlay::apply(&mut live, &mut ns, &sources)?;
        }

        self.baseline = baseline;
        self.live = live;
        self.ns = ns;
        debug!(defined = outcome.defined.len(), "configuration re-baselined");
        Ok(true)
    }

    /// Re-read the configured baseline layers, in their load order. Returns
    /// whether any layer applied.
    pub fn reload(&mut self) -> Result<bool, OverfigError> {
        let mut applied = false;
        if let Some(path) = self.file.clone() {
            match fs::read_to_string(&path) {
                Ok(text) => applied |= self.load_str(&text)?,
                Err(source) if self.strict => {
                    return Err(OverfigError::Io { path, source });
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "cannot read baseline file; skipping");
                }
            }
        }
        if let Some(text) = self.json_str.clone() {
            applied |= self.load_str(&text)?;
        }
        Ok(applied)
    }

    /// Deserialize the live document back into the bound type.
    pub fn snapshot(&self) -> Result<C, OverfigError>
    where
        C: DeserializeOwned,
    {
        Ok(serde_json::from_value(self.live.clone())?)
    }

    /// Whether an overlay source changed this property's value.
    pub fn is_overridden(&self, key: &str) -> bool {
        self.ns.get(key).is_some_and(|prop| prop.overridden)
    }

    /// Paths currently carrying an overlay value, in document order.
    pub fn overridden_paths(&self) -> Vec<&str> {
        self.ns
            .iter()
            .filter(|prop| prop.overridden)
            .map(|prop| prop.path.as_str())
            .collect()
    }

    /// Every addressable path, in document order.
    pub fn paths(&self) -> Vec<&str> {
        self.ns.paths().collect()
    }

    /// Every property with its metadata, in document order.
    pub fn entries(&self) -> impl Iterator<Item = &Prop> {
        self.ns.iter()
    }

    /// The missing-key policy verbs report exit codes under.
    pub fn missing_key_policy(&self) -> MissingKey {
        self.missing_key
    }
}
