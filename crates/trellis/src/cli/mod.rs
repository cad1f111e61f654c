//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a new trellis repository
//! - `info`: Show data files, counts and signature conflicts
//! - `roots`: Show the graphs of all root features
//! - `graph`: Show the graph around one feature
//! - `deps`: List one feature's direct dependencies or dependents
//! - `cycles`: Report groups of mutually dependent features
//! - `ingest`: Record an analysis report into the invocation ledger
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! trellis ingest reports/shop-1.0.json
//! trellis roots --product Shop
//! trellis graph Shop "Add item" 1.0
//! trellis deps Shop "Add item" 1.0 --reverse
//! ```

mod args;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    CyclesArgs, DepsArgs, FeatureArgs, GraphArgs, InfoArgs, IngestArgs, InitArgs, RootsArgs,
    ScopeArgs,
};

/// Trellis - feature dependency graphs for living documentation
///
/// Resolves recorded call-graph data down to which documented features
/// depend on which. Data lives in `.trellis/` as JSONL files.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new trellis repository
    ///
    /// Creates the `.trellis/` directory with configuration and empty data
    /// files. Run this once in your project root.
    Init(InitArgs),

    /// Show repository information
    ///
    /// Displays data file paths, summary counts, signature conflicts and
    /// records skipped while loading.
    Info(InfoArgs),

    /// Show the graphs of all root features
    ///
    /// A root is a feature that no other feature of its release depends on.
    /// Without filters, the `roots` scope from the configuration applies.
    Roots(RootsArgs),

    /// Show the graph around one feature
    ///
    /// Expands both the features it depends on and the features that depend
    /// on it, whether or not it is a root.
    Graph(GraphArgs),

    /// List a feature's direct dependencies
    ///
    /// With `--reverse`, lists the features that directly depend on it.
    Deps(DepsArgs),

    /// Report groups of mutually dependent features
    Cycles(CyclesArgs),

    /// Record an analysis report into the invocation ledger
    ///
    /// Flattens the report's invocation tree into ledger entries and merges
    /// them with what is already recorded.
    Ingest(IngestArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any error from locating the repository, loading data, running
    /// the query or writing output.
    pub async fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Trellis feature dependency graphs");
            println!("Use --help for more information");
            return Ok(());
        };

        match command {
            Commands::Init(args) => execute::execute_init(args).await,
            Commands::Info(args) => {
                execute::execute_info(&open_app().await?, args, output_mode).await
            }
            Commands::Roots(args) => {
                execute::execute_roots(&open_app().await?, args, output_mode).await
            }
            Commands::Graph(args) => {
                execute::execute_graph(&open_app().await?, args, output_mode).await
            }
            Commands::Deps(args) => {
                execute::execute_deps(&open_app().await?, args, output_mode).await
            }
            Commands::Cycles(args) => {
                execute::execute_cycles(&open_app().await?, args, output_mode).await
            }
            Commands::Ingest(args) => {
                execute::execute_ingest(&open_app().await?, args, output_mode).await
            }
        }
    }
}

/// Open the repository containing the working directory.
async fn open_app() -> Result<crate::app::App> {
    Ok(crate::app::App::from_directory(&std::env::current_dir()?).await?)
}
