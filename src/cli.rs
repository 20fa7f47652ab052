//! Clap adapter for overfig.
//!
//! This module is the **optional integration layer** between overfig's
//! parser-agnostic core and the [clap](https://docs.rs/clap) CLI parser. It
//! is compiled only when the `clap` Cargo feature is enabled (on by
//! default).
//!
//! The module provides two clap derive types. [`OverlayArgs`] captures the
//! trailing free-form tokens clap would otherwise reject — `name=value`
//! overrides, bare boolean flags, and embedded `get`/`set` verbs — and hands
//! them to [`process`](crate::Overfig::process) unparsed. [`ConfigCommand`]
//! is for hosts that prefer `get`/`set` as first-class clap subcommands; its
//! [`into_request()`](ConfigCommand::into_request) bridge produces a
//! [`CliRequest`](crate::CliRequest) for the clap-free
//! [`handle()`](crate::Overfig::handle) API.
//!
//! If you use a different CLI parser (or no CLI at all), skip this module
//! entirely: `process` takes any iterator of strings.

use clap::{Args, Subcommand};

use crate::types::CliRequest;

/// Clap-derived catch-all for overlay tokens.
///
/// Embed this into your app's clap derive:
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[arg(long)]
///     verbose: bool,
///
///     #[command(flatten)]
///     overlay: OverlayArgs,
/// }
/// ```
///
/// Everything after the app's own flags lands in
/// [`overrides`](Self::overrides), hyphens included, and goes to
/// [`process`](crate::Overfig::process) as-is.
#[derive(Debug, Args)]
pub struct OverlayArgs {
    /// Overlay tokens: `name=value` overrides, bare boolean flags, and the
    /// `get <key>` / `set <key> <value>` verbs.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub overrides: Vec<String>,
}

impl OverlayArgs {
    /// The captured tokens, ready for [`process`](crate::Overfig::process).
    pub fn into_args(self) -> Vec<String> {
        self.overrides
    }
}

/// `get`/`set` as first-class clap subcommands, for hosts that want clap's
/// help and error output instead of the embedded token scan.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved value of a config key.
    Get {
        /// Dotted key path (e.g. "database.url", "ports[2]").
        key: String,
    },
    /// Persist a configuration value to the save target.
    Set {
        /// Dotted key path (e.g. "database.url", "ports[2]").
        key: String,
        /// Value to set, coerced to the key's type.
        value: String,
    },
}

impl ConfigCommand {
    /// Convert clap-parsed subcommands into a parser-agnostic
    /// [`CliRequest`].
    pub fn into_request(self) -> CliRequest {
        match self {
            ConfigCommand::Get { key } => CliRequest::Get { key },
            ConfigCommand::Set { key, value } => CliRequest::Set { key, value },
        }
    }
}
