//! Command execution functions.
//!
//! One function per command. Each receives the loaded [`App`] (except
//! `init`, which runs before a repository exists) and prints its result in
//! the requested [`OutputMode`].

use anyhow::Result;
use std::io::{self, Write};

use super::args::{CyclesArgs, DepsArgs, GraphArgs, InfoArgs, IngestArgs, InitArgs, RootsArgs};
use crate::app::App;
use crate::ingest;
use crate::output::{self, OutputConfig, OutputMode};
use crate::service::RootScope;

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;

    if !args.quiet {
        println!("Initializing trellis repository...");
    }

    let result = init::init(&current_dir).await?;

    if !args.quiet {
        println!("Initialized trellis in {}", result.trellis_dir.display());
        println!("  Config:      {}", result.config_file.display());
        println!("  Features:    {}", result.features_file.display());
        println!("  Invocations: {}", result.invocations_file.display());
    }

    Ok(())
}

/// Execute the info command
pub async fn execute_info(app: &App, _args: &InfoArgs, output_mode: OutputMode) -> Result<()> {
    let store = app.store();
    let features = store.feature_count().await;
    let releases = store.scopes().await.len();
    let ledger_entries = store.invocation_count().await;
    let conflicts = app.service().signature_conflicts(&RootScope::All).await?;
    let warnings: Vec<String> = app.load_warnings().iter().map(ToString::to_string).collect();

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "features_file": app.features_path().display().to_string(),
                "invocations_file": app.invocations_path().display().to_string(),
                "root_scope": app.config().roots,
                "signature_conflicts_policy": app.config().signature_conflicts,
                "features": features,
                "releases": releases,
                "ledger_entries": ledger_entries,
                "signature_conflicts": conflicts,
                "load_warnings": warnings,
            }))?;
        }
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            let stdout = io::stdout();
            let mut w = stdout.lock();

            writeln!(w, "Trellis Repository Information")?;
            writeln!(w, "==============================")?;
            writeln!(w)?;
            writeln!(w, "Features file:    {}", app.features_path().display())?;
            writeln!(w, "Invocations file: {}", app.invocations_path().display())?;
            writeln!(w, "Root scope:       {}", app.config().roots)?;
            writeln!(w)?;
            writeln!(
                w,
                "{features} features in {releases} release(s), {ledger_entries} ledger entries"
            )?;

            if !conflicts.is_empty() {
                writeln!(w)?;
                writeln!(
                    w,
                    "{}",
                    output::warning(
                        &format!("{} signature conflict(s):", conflicts.len()),
                        &config
                    )
                )?;
                output::write_conflicts_text(&mut w, &conflicts, &config)?;
            }

            if !warnings.is_empty() {
                writeln!(w)?;
                writeln!(
                    w,
                    "{}",
                    output::warning(
                        &format!("{} record(s) skipped while loading:", warnings.len()),
                        &config
                    )
                )?;
                for warning in &warnings {
                    writeln!(w, "  {warning}")?;
                }
            }
        }
    }

    Ok(())
}

/// Execute the roots command
pub async fn execute_roots(app: &App, args: &RootsArgs, output_mode: OutputMode) -> Result<()> {
    let forest = if args.scope.is_set() {
        let scope = RootScope::from_filters(args.scope.product.clone(), args.scope.version.clone());
        app.service().top_level_feature_graphs_in(&scope).await?
    } else {
        app.service().top_level_feature_graphs().await?
    };

    if forest.is_empty() && output_mode == OutputMode::Text {
        println!("No features found.");
        return Ok(());
    }

    output::print_forest(&forest, output_mode)?;
    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    let target = &args.target;
    let graph = app
        .service()
        .feature_graph(&target.product, &target.feature, &target.version)
        .await?;

    output::print_feature_graph(&graph, output_mode)?;
    Ok(())
}

/// Execute the deps command
pub async fn execute_deps(app: &App, args: &DepsArgs, output_mode: OutputMode) -> Result<()> {
    let target = &args.target;
    let service = app.service();

    let (features, heading) = if args.reverse {
        let dependents = service
            .direct_dependents(&target.product, &target.feature, &target.version)
            .await?;
        (dependents, "is used by")
    } else {
        let dependencies = service
            .direct_dependencies(&target.product, &target.feature, &target.version)
            .await?;
        (dependencies, "depends on")
    };

    output::print_features(&target.label(), heading, &features, output_mode)?;
    Ok(())
}

/// Execute the cycles command
pub async fn execute_cycles(app: &App, args: &CyclesArgs, output_mode: OutputMode) -> Result<()> {
    let scope = RootScope::from_filters(args.scope.product.clone(), args.scope.version.clone());
    let cycles = app.service().cycles(&scope).await?;

    output::print_cycles(&cycles, output_mode)?;
    Ok(())
}

/// Execute the ingest command
pub async fn execute_ingest(app: &App, args: &IngestArgs, output_mode: OutputMode) -> Result<()> {
    let report = ingest::load_report(&args.report).await?;
    let summary = ingest::ingest_report(app.store(), &report).await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&summary)?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!(
                "{} {} ledger entries for {}@{}",
                output::success("Recorded", &config),
                summary.entries,
                summary.product,
                summary.version
            );
        }
    }
    Ok(())
}
