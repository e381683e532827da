//! Tracing subscriber setup for the `stratum` binary.
//!
//! The engine crates only emit events. Each plugin's lifecycle runs inside a
//! `plugin{key=...}` span, so every template write and marker patch logged
//! under it carries the plugin key.
//!
//! | Flag(s)   | Level | Extras                          |
//! |-----------|-------|---------------------------------|
//! | (none)    | WARN  |                                 |
//! | `-v`      | INFO  |                                 |
//! | `-vv`     | DEBUG | event targets                   |
//! | `-vvv`    | TRACE | targets, plugin span timings    |
//! | `--quiet` | ERROR |                                 |
//!
//! `RUST_LOG` replaces the level filter. With `--output-format json` log
//! lines are JSON objects as well, so stderr stays machine readable.

use std::io::IsTerminal as _;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{GlobalArgs, OutputFormat};

/// Crates whose events the default filter lets through.
const CRATES: [&str; 3] = ["stratum", "stratum_core", "stratum_adapters"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: &'static str,
    ansi: bool,
    json: bool,
}

impl LogSettings {
    fn from_args(args: &GlobalArgs, stderr_is_terminal: bool) -> Self {
        Self {
            level: derive_level(args),
            ansi: !args.no_color && stderr_is_terminal,
            json: args.output_format == OutputFormat::Json,
        }
    }

    fn show_targets(&self) -> bool {
        matches!(self.level, "debug" | "trace")
    }

    fn span_events(&self) -> FmtSpan {
        if self.level == "trace" {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber. Call once, before any event fires.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let settings = LogSettings::from_args(args, std::io::stderr().is_terminal());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(settings.level)));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(settings.show_targets())
        .with_span_events(settings.span_events());

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if settings.json {
        registry
            .with(layer.json().with_current_span(true).with_span_list(false))
            .try_init()
    } else {
        registry.with(layer.with_ansi(settings.ansi)).try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}

fn filter_directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn derive_level(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
