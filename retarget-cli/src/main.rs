mod app;
mod batch;
mod output;

use anyhow::Context;
use clap::Parser;
use log::info;
use retarget::{ImageStore, MappingTable, RetargetConfig, Retargeter};

use crate::app::Cli;

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .context("failed to set Ctrl+C handler")?;

    let cli = Cli::parse();

    // Show retarget info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.json {
        let level = if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("retarget", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    anyhow::ensure!(
        cli.output.is_dir(),
        "output directory does not exist: {}",
        cli.output.display()
    );

    let mapping = match &cli.mapping {
        Some(path) => MappingTable::from_path(path)
            .with_context(|| format!("failed to load mapping table: {}", path.display()))?,
        None => MappingTable::builtin().context("built-in mapping table is invalid")?,
    };

    let jobs = batch::collect_jobs(&cli.inputs, &cli.output)?;
    info!(
        "Retargeting {} file(s) away from {} ({} mapped types)",
        jobs.len(),
        mapping.source(),
        mapping.len()
    );

    let config = RetargetConfig {
        strip_internal: cli.strip_internal,
        strip_target: cli.strip_target,
        dry_run: cli.dry_run,
        overwrite: cli.overwrite,
    };
    let retargeter = Retargeter::new(config, mapping, Box::new(ImageStore::new()));
    let summary = retargeter.run(&jobs);

    output::print_output(&summary, cli.json, output::print_summary)
}
