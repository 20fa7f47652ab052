//! Configuration structs for the overfig demo application.
//!
//! This module defines a multi-level config hierarchy to showcase overfig's
//! path namespace. The root [`DemoConfig`] contains two nested sub-configs —
//! [`ServerConfig`] and [`DisplayConfig`] — plus a `tags` array for indexed
//! addressing.
//!
//! Each struct derives [`Serialize`]/[`Deserialize`]; the `Default` impl
//! provides the compiled defaults that seed the binding.
//!
//! # Path mapping
//!
//! With the env prefix `OVERFIG_DEMO_`, properties resolve from these
//! sources (CLI token shown first, environment variable second):
//!
//! | CLI token              | Env var                          |
//! |------------------------|----------------------------------|
//! | `name=demo`            | `OVERFIG_DEMO_NAME`              |
//! | `verbose`              | `OVERFIG_DEMO_VERBOSE`           |
//! | `server.host=0.0.0.0`  | `OVERFIG_DEMO_SERVER.HOST`       |
//! | `server.port=9999`     | `OVERFIG_DEMO_SERVER.PORT`       |
//! | `display.color=blue`   | `OVERFIG_DEMO_DISPLAY.COLOR`     |
//! | `tags[0]=alpha`        | `OVERFIG_DEMO_TAGS[0]`           |

use serde::{Deserialize, Serialize};

/// Root configuration for the demo application.
///
/// Contains top-level scalar keys, two nested sub-configs, and an array to
/// demonstrate indexed paths and container growth.
#[derive(Serialize, Deserialize, Debug)]
pub struct DemoConfig {
    /// Application name shown in the echo banner.
    pub name: String,

    /// Enable verbose output.
    pub verbose: bool,

    /// Server settings (nested config).
    pub server: ServerConfig,

    /// Display and formatting settings (nested config).
    pub display: DisplayConfig,

    /// Free-form labels. Address elements as `tags[0]`, `tags[1]`, ... —
    /// addressing past the end grows the array for this run.
    pub tags: Vec<String>,
}

/// Server-related configuration, accessed via `server.*` dotted keys.
#[derive(Serialize, Deserialize, Debug)]
pub struct ServerConfig {
    /// Hostname to bind to.
    pub host: String,

    /// Port number.
    pub port: u16,

    /// Maximum number of allowed connections.
    pub max_connections: u32,
}

/// Display and output formatting configuration.
///
/// The `color` key is used by the echo output to colorize terminal output
/// via ANSI codes.
#[derive(Serialize, Deserialize, Debug)]
pub struct DisplayConfig {
    /// Terminal color for the echo output.
    ///
    /// Supported values: red, green, yellow, blue, magenta, cyan, white.
    pub color: String,

    /// Output format (pretty or plain).
    pub format: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            name: "overfig-demo".to_string(),
            verbose: false,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                max_connections: 100,
            },
            display: DisplayConfig {
                color: "yellow".to_string(),
                format: "pretty".to_string(),
            },
            tags: vec!["demo".to_string()],
        }
    }
}
