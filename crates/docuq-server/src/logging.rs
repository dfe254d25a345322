//! Tracing setup.
//!
//! Verbosity comes from a preset chosen by CLI flags, refined by `--log target=level`
//! overrides. `RUST_LOG` replaces both when set. Output is text or JSON.

use std::collections::BTreeMap;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Root of every target emitted by this workspace.
const TARGET_ROOT: &str = "docuq";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: '{}'. Use 'text' or 'json'.", s)),
        }
    }
}

/// Verbosity presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup, requests and pipeline progress; vendor and storage chatter only on warnings
    #[default]
    Production,
    Verbose,
    Debug,
    Trace,
    /// Warnings and errors only
    Quiet,
}

impl LogPreset {
    /// Pick a preset from CLI flags. Quiet beats trace beats debug beats verbose.
    pub fn from_flags(verbose: bool, debug: bool, trace: bool, quiet: bool) -> Self {
        match (quiet, trace, debug, verbose) {
            (true, ..) => LogPreset::Quiet,
            (_, true, ..) => LogPreset::Trace,
            (_, _, true, _) => LogPreset::Debug,
            (_, _, _, true) => LogPreset::Verbose,
            _ => LogPreset::Production,
        }
    }

    fn directives(self) -> Vec<String> {
        let pairs: &[(&str, &str)] = match self {
            LogPreset::Production => &[
                ("docuq::startup", "info"),
                ("docuq::api", "info"),
                ("docuq::pipeline", "info"),
                ("docuq::mistral", "warn"),
                ("docuq::session", "warn"),
                ("docuq::db", "warn"),
                ("tower_http", "warn"),
            ],
            LogPreset::Verbose => &[("docuq", "info"), ("tower_http", "info")],
            LogPreset::Debug => &[("docuq", "debug"), ("tower_http", "debug")],
            LogPreset::Trace => &[("docuq", "trace"), ("tower_http", "trace")],
            LogPreset::Quiet => &[("docuq", "warn"), ("tower_http", "error")],
        };
        pairs
            .iter()
            .map(|(target, level)| format!("{}={}", target, level))
            .collect()
    }
}

/// Logging configuration built from CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Per-target levels keyed by full target name, e.g. `docuq::pipeline`
    pub overrides: BTreeMap<String, Level>,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn from_cli(
        verbose: bool,
        debug: bool,
        trace: bool,
        quiet: bool,
        log_overrides: Vec<String>,
        format: LogFormat,
    ) -> Self {
        let overrides = log_overrides
            .iter()
            .flat_map(|arg| arg.split(','))
            .filter_map(parse_override)
            .collect();

        Self {
            preset: LogPreset::from_flags(verbose, debug, trace, quiet),
            overrides,
            format,
        }
    }

    /// Filter directives as a comma-separated string, overrides last.
    pub fn filter_directives(&self) -> String {
        let mut directives = self.preset.directives();
        directives.extend(
            self.overrides
                .iter()
                .map(|(target, level)| format!("{}={}", target, level.as_str().to_lowercase())),
        );
        directives.join(",")
    }

    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }
        EnvFilter::try_new(self.filter_directives()).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Parse `target=level`; bare targets are placed under `docuq::`.
fn parse_override(part: &str) -> Option<(String, Level)> {
    let (target, level) = part.split_once('=')?;
    let target = target.trim();
    let level: Level = level.trim().parse().ok()?;

    let full_target = if target == TARGET_ROOT
        || target.starts_with("docuq::")
        || target == "tower_http"
    {
        target.to_string()
    } else {
        format!("{}::{}", TARGET_ROOT, target)
    };
    Some((full_target, level))
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) {
    let filter = config.build_filter();
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_file(false).with_line_number(false))
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init(),
    }
}
