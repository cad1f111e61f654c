//! CLI argument structs for all commands.

use clap::Parser;
use std::path::PathBuf;

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {}

/// Product and version filter shared by whole-catalog commands
#[derive(Parser, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Only consider this product
    #[arg(short, long)]
    pub product: Option<String>,

    /// Only consider this version of the product
    #[arg(short, long, requires = "product")]
    pub version: Option<String>,
}

impl ScopeArgs {
    /// Whether any filter was given.
    pub fn is_set(&self) -> bool {
        self.product.is_some()
    }
}

/// Arguments for the `roots` command
#[derive(Parser, Debug, Clone)]
pub struct RootsArgs {
    /// Scope override; defaults to `roots` in the configuration
    #[command(flatten)]
    pub scope: ScopeArgs,
}

/// A feature addressed by product, title and version
#[derive(Parser, Debug, Clone)]
pub struct FeatureArgs {
    /// Product the feature belongs to
    pub product: String,

    /// Feature title
    pub feature: String,

    /// Product version
    pub version: String,
}

impl FeatureArgs {
    /// `Title [Product@Version]`, for headings.
    pub fn label(&self) -> String {
        format!("{} [{}@{}]", self.feature, self.product, self.version)
    }
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Feature to center the graph on
    #[command(flatten)]
    pub target: FeatureArgs,
}

/// Arguments for the `deps` command
#[derive(Parser, Debug, Clone)]
pub struct DepsArgs {
    /// Feature to inspect
    #[command(flatten)]
    pub target: FeatureArgs,

    /// List the features that depend on this one instead
    #[arg(short, long)]
    pub reverse: bool,
}

/// Arguments for the `cycles` command
#[derive(Parser, Debug, Clone)]
pub struct CyclesArgs {
    /// Scope to search; defaults to the whole catalog
    #[command(flatten)]
    pub scope: ScopeArgs,
}

/// Arguments for the `ingest` command
#[derive(Parser, Debug, Clone)]
pub struct IngestArgs {
    /// Analysis report (JSON) to record into the invocation ledger
    pub report: PathBuf,
}
