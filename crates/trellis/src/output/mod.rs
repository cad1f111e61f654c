//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or JSON for programmatic
//! use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - [`tree`]: Feature graph rendering with ASCII/Unicode connectors

pub mod color;
pub mod tree;

use crate::domain::{Feature, FeatureId};
use crate::graph::{FeatureCycle, SignatureConflict};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, info, success, warning};
pub use tree::{print_feature_graph, print_forest};

use color::{bold, colorize_feature, dimmed};

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `TRELLIS_ASCII`: Set to "1" or "true" for ASCII-only connectors (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `TRELLIS_COLOR`: Set to "0" or "false" to disable colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        let use_ascii = match env::var("TRELLIS_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "TRELLIS_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // Respect NO_COLOR (https://no-color.org/), TRELLIS_COLOR for explicit control
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TRELLIS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(handle, "{json}")
}

/// Print a one-hop list of features under a heading naming `subject`.
///
/// JSON output is the bare list of feature identities.
pub fn print_features(
    subject: &str,
    heading: &str,
    features: &[Feature],
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            let ids: Vec<&FeatureId> = features.iter().map(|f| &f.id).collect();
            print_json(&ids)
        }
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_features_text(
                &mut handle,
                subject,
                heading,
                features,
                &OutputConfig::from_env(),
            )
        }
    }
}

fn write_features_text<W: Write>(
    w: &mut W,
    subject: &str,
    heading: &str,
    features: &[Feature],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}:",
        info(subject, config),
        bold(heading, config)
    )?;
    if features.is_empty() {
        writeln!(w, "  {}", dimmed("(none)", config))?;
    }
    for feature in features {
        writeln!(w, "  {}", colorize_feature(&feature.id, config))?;
    }
    Ok(())
}

/// Print groups of mutually dependent features.
pub fn print_cycles(cycles: &[FeatureCycle], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(&cycles),
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_cycles_text(&mut handle, cycles, &OutputConfig::from_env())
        }
    }
}

fn write_cycles_text<W: Write>(
    w: &mut W,
    cycles: &[FeatureCycle],
    config: &OutputConfig,
) -> io::Result<()> {
    if cycles.is_empty() {
        return writeln!(w, "{}", success("No dependency cycles found.", config));
    }

    let separator = if config.use_ascii { " <-> " } else { " ⇄ " };
    writeln!(
        w,
        "{}",
        error(
            &format!("Found {} dependency cycle(s):", cycles.len()),
            config
        )
    )?;
    for (i, cycle) in cycles.iter().enumerate() {
        let members: Vec<String> = cycle
            .members
            .iter()
            .map(|m| colorize_feature(m, config))
            .collect();
        writeln!(w, "  {}. {}", i + 1, members.join(separator))?;
    }
    Ok(())
}

/// Write a list of signature conflicts as text.
pub fn write_conflicts_text<W: Write>(
    w: &mut W,
    conflicts: &[SignatureConflict],
    config: &OutputConfig,
) -> io::Result<()> {
    for conflict in conflicts {
        writeln!(
            w,
            "  {} {} {}, {} {}",
            warning(&conflict.signature, config),
            dimmed("owned by", config),
            colorize_feature(&conflict.owner, config),
            dimmed("also declared by", config),
            colorize_feature(&conflict.ignored, config)
        )?;
    }
    Ok(())
}
