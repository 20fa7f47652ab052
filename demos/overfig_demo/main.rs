//! # overfig demo application
//!
//! A sample CLI tool that showcases how to integrate
//! [overfig](https://docs.rs/overfig) into a real application. This is
//! **not** a real app — it exists purely to demonstrate and manually verify
//! overfig's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example overfig_demo
//! cargo run --example overfig_demo -- server.port=9999 verbose
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature               | How to exercise it                                                   |
//! |-----------------------|----------------------------------------------------------------------|
//! | Compiled defaults     | `cargo run --example overfig_demo`                                   |
//! | Baseline file         | Create `overfig-demo.json` in cwd, then run                          |
//! | CLI override (nested) | `cargo run --example overfig_demo -- server.port=9999`               |
//! | Bare boolean flag     | `cargo run --example overfig_demo -- verbose`                        |
//! | Indexed override      | `cargo run --example overfig_demo -- "tags[3]=delta"`                |
//! | Env var override      | `OVERFIG_DEMO_SERVER.PORT=9999 cargo run --example overfig_demo`     |
//! | `get` verb            | `cargo run --example overfig_demo -- get server.port`                |
//! | `set` verb            | `cargo run --example overfig_demo -- set display.color blue`         |
//! | Override markers      | Override anything, then look for the `*` in the echo output          |
//! | Colored output        | Default is yellow; override `display.color` to change it             |

mod config;

use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use serde_json::Value;

use overfig::{Overfig, OverlayArgs};

use config::DemoConfig;

// ---------------------------------------------------------------------------
// CLI definitions
// ---------------------------------------------------------------------------

/// overfig demo — a sample CLI app for showcasing overfig integration.
#[derive(Parser, Debug)]
#[command(name = "overfig-demo")]
struct Cli {
    /// Baseline file to read and to write on `set` (default:
    /// overfig-demo.json in the working directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail on unknown keys and malformed baseline documents.
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    overlay: OverlayArgs,
}

// ---------------------------------------------------------------------------
// ANSI color helpers
// ---------------------------------------------------------------------------

fn ansi_color_code(name: &str) -> &str {
    match name {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        "white" => "\x1b[37m",
        _ => "\x1b[0m",
    }
}

const RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// Echo
// ---------------------------------------------------------------------------

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Print every resolved property, one per line, with a `*` marker on paths
/// an overlay source changed.
fn echo_all(fig: &Overfig<DemoConfig>, resolved: &DemoConfig) {
    let color = ansi_color_code(&resolved.display.color);

    if resolved.verbose {
        println!(
            "{color}[verbose] Resolved configuration for {:?}{RESET}",
            resolved.name
        );
        println!();
    }

    let entries: Vec<(String, String, bool)> = fig
        .entries()
        .filter(|prop| prop.supported)
        .map(|prop| {
            let value = fig
                .get(&prop.path)
                .map(|v| render(&v))
                .unwrap_or_default();
            (prop.path.clone(), value, prop.overridden)
        })
        .collect();

    if resolved.display.format == "plain" {
        for (key, value, overridden) in &entries {
            let marker = if *overridden { "*" } else { "" };
            println!("{key}{marker}={value}");
        }
    } else {
        let max_key_len = entries.iter().map(|(k, _, _)| k.len()).max().unwrap_or(0);
        for (key, value, overridden) in &entries {
            let marker = if *overridden { " *" } else { "" };
            println!("{color}{key:<max_key_len$}{RESET}  {value}{marker}");
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    let path = cli
        .config
        .unwrap_or_else(|| PathBuf::from("overfig-demo.json"));

    let mut fig = Overfig::bind(DemoConfig::default())
        .file(path)
        .env_prefix("OVERFIG_DEMO_")
        .strict(cli.strict)
        .load()
        .unwrap_or_else(|e| {
            eprintln!("Failed to load config:\n{e}");
            exit(1);
        });

    let out = fig.process(cli.overlay.into_args()).unwrap_or_else(|e| {
        eprintln!("{e}");
        exit(1);
    });

    if !out.remaining.is_empty() {
        eprintln!("Ignoring unrecognized arguments: {:?}", out.remaining);
    }

    // Verb outcomes are values; printing and exiting is the host's call.
    if let Some(outcome) = out.verb {
        println!("{outcome}");
        exit(outcome.exit_code(fig.missing_key_policy()));
    }

    let resolved: DemoConfig = fig.snapshot().unwrap_or_else(|e| {
        eprintln!("Failed to materialize config:\n{e}");
        exit(1);
    });
    echo_all(&fig, &resolved);
}
