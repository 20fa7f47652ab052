//! Transient configuration overlays for Rust applications. Define a struct,
//! bind it, and let the command line, system properties, and environment
//! reshape it — without touching what gets saved.
//!
//! Overfig takes any `Serialize` configuration object, merges optional
//! baseline documents over it, and then resolves every addressable property
//! against a stack of overlay sources through a builder API:
//!
//! ```ignore
//! let mut fig = Overfig::bind(AppConfig::default())
//!     .file("app.json")
//!     .env_prefix("MYAPP_")
//!     .load()?;
//! let out = fig.process(std::env::args().skip(1))?;
//! let config: AppConfig = fig.snapshot()?;
//! ```
//!
//! That reads `app.json` over the compiled defaults, overrides `port` when
//! the process was started with `port=9090` or `MYAPP_port=9090`, runs an
//! embedded `get`/`set` verb if one was passed, and hands back both the
//! unclaimed arguments and a typed view of the result.
//!
//! # Why overfig
//!
//! Most applications need two different answers to "what is the config":
//! the values the program should run with *right now*, and the values the
//! user actually wrote down. A `port=9090` on the command line or a
//! `MYAPP_debug=true` in the environment should shape this run — and only
//! this run. The typical approach conflates the two: overrides get folded
//! into one config object, and saving it back to disk freezes a transient
//! experiment into permanent state.
//!
//! Overfig keeps the two answers apart. Every binding carries a **baseline**
//! document (seed plus configured file and string layers, plus explicit
//! edits) and a **live** document (baseline plus whatever the overlay
//! sources put there). [`json()`](Overfig::json) and
//! [`snapshot()`](Overfig::snapshot) read the live document;
//! [`original_json()`](Overfig::original_json) and
//! [`save()`](Overfig::save) read the baseline. Overlay values never leak
//! into a save, no matter how many times the config is saved and reloaded.
//!
//! # Design: the document is the namespace
//!
//! The bound object's JSON serialization is the schema for everything.
//! Traversing it yields a flat namespace of dotted, indexed paths:
//!
//! - **Objects** contribute their member names as path segments:
//!   `database.url`.
//! - **Arrays** contribute an indexed path per element — `ports[0]`,
//!   `ports[1]` — plus a marker for the container itself. Nested arrays
//!   stack suffixes: `grid[0][1]`.
//! - **Scalars** (including `null` for unset `Option` fields) are the
//!   addressable leaves. Each remembers its JSON kind, and override text is
//!   coerced to that kind — `"9090"` becomes an integer for an integer
//!   property, and text that will not parse is a hard error rather than a
//!   silently ignored override.
//!
//! Serde attributes are honored for free: a `#[serde(rename = "max-retries")]`
//! member is addressable as `max-retries`, and a `#[serde(skip)]` member
//! does not exist as far as overrides are concerned.
//!
//! # Layer precedence
//!
//! ```text
//! Baseline          seed struct ← file() ← json_str()
//!        ↑ overridden by
//! Environment       {prefix}{path}, exact/lower/upper spelling
//!        ↑ overridden by
//! System properties prop() / props()
//!        ↑ overridden by
//! CLI tokens        name=value, bare boolean flags
//! ```
//!
//! Resolution is first-match-wins from the top: for each property the CLI
//! tokens are consulted first, then the property map, then the environment,
//! and the first source that has an opinion supplies the value. Every layer
//! is **sparse** — a source only speaks for the keys it names, and unset
//! keys fall through to the baseline.
//!
//! # Container growth
//!
//! An override may address an array slot that does not exist yet:
//! `ports[7]=7` against a four-element array. Before any value lands,
//! each container is sized once to the highest index any source addresses —
//! intermediate slots are filled with the element kind's default (`0`,
//! `""`, `false`), never trimmed, and the result is the same no matter how
//! often it runs. Growth is a live-document affair: grown slots are fully
//! addressable and appear in [`json()`](Overfig::json), but they stay out
//! of the baseline until an explicit edit pins them down.
//!
//! # Override tracking
//!
//! Each property carries a flag telling the two documents apart at that
//! spot: [`is_overridden()`](Overfig::is_overridden) answers whether an
//! overlay source *changed* the value — a source that supplies the value
//! the property already had consumes its token but raises no flag. Explicit
//! edits ([`set()`](Overfig::set), [`set_text()`](Overfig::set_text), the
//! `set` verb) clear the flag: they update the baseline, so live and
//! baseline agree again.
//!
//! # Embedded verbs
//!
//! The token stream given to [`process()`](Overfig::process) may carry one
//! `get <key>` or `set <key> <value>` verb among the overrides. `get`
//! reports the resolved live value; `set` coerces, applies as an explicit
//! edit, and persists via [`save()`](Overfig::save). Outcomes come back as
//! [`CliOutcome`] values — including "key not found" and usage errors — and
//! the host decides how to print and whether to exit;
//! [`exit_code()`](CliOutcome::exit_code) maps an outcome to a process exit
//! code under a chosen [`MissingKey`] policy. Tokens no property and no
//! verb claimed come back in [`Processed::remaining`], in order, for the
//! host's own parser.
//!
//! # Environment variables
//!
//! The environment layer is opt-in: configure a prefix with
//! [`env_prefix()`](OverfigBuilder::env_prefix) (empty string for
//! unprefixed lookup). With prefix `MYAPP_`, a property probes three
//! spellings and takes the first non-empty hit:
//!
//! | Config key | Probed variables |
//! |------------|------------------|
//! | `port` | `MYAPP_port`, `myapp_port`, `MYAPP_PORT` |
//! | `database.url` | `MYAPP_database.url`, `myapp_database.url`, `MYAPP_DATABASE.URL` |
//!
//! System properties probe the same three spellings of the bare path — no
//! prefix. Both layers ignore variables set to the empty string.
//!
//! # Strict mode
//!
//! Lenient by default: unknown keys in baseline documents are reported and
//! ignored, type-mismatched baseline values are skipped, and an unreadable
//! or malformed baseline document degrades to the layers below it. With
//! [`strict(true)`](OverfigBuilder::strict) all of these fail the load
//! instead. Malformed *override text* — `port=abc` — is always a hard
//! error; leniency is for documents, not for tokens someone just typed.
//!
//! # Re-baselining
//!
//! [`load_str()`](Overfig::load_str) merges a new document in as baseline:
//! defined paths take the document's values in both documents, their
//! override flags clear, and the overlay sources from the last
//! [`process()`](Overfig::process) call are re-applied on top.
//! [`reload()`](Overfig::reload) does the same from the configured file
//! and string layers. Either a document applies completely or not at all.
//!
//! # Clap adapter
//!
//! The core has **no dependency on any CLI framework** —
//! [`process()`](Overfig::process) takes any iterator of strings. For
//! [clap](https://docs.rs/clap) users, the `cli` module (behind the `clap`
//! Cargo feature, on by default) provides [`OverlayArgs`], a derive type
//! that captures the trailing overlay tokens from a clap command line, and
//! [`ConfigCommand`] for hosts that want `get`/`set` as real subcommands.
//! To use overfig without clap:
//!
//! ```toml
//! overfig = { version = "...", default-features = false }
//! ```
//!
//! # Error handling
//!
//! All fallible operations return [`OverfigError`]. Errors are designed to
//! be user-facing: coercion failures name the key, the offending text, and
//! the expected kind; unknown keys name the key; I/O errors carry the path.
//! See the [`error`] module for the full set.

pub mod error;
pub mod types;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod coerce;
mod growth;
mod namespace;
mod ops;
mod overlay;
mod sources;
mod tree;

#[cfg(test)]
mod fixtures;

pub use builder::{Overfig, OverfigBuilder};
#[cfg(feature = "clap")]
pub use cli::{ConfigCommand, OverlayArgs};
pub use error::OverfigError;
pub use namespace::Prop;
pub use ops::{CliOutcome, Processed};
pub use types::{CliRequest, CliVerb, Kind, MissingKey};
