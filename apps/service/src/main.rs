#![warn(clippy::all)]

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod cli;
mod config;
mod monitoring;
mod render;

use cli::Cli;
use config::Settings;
use monitoring::{Outcome, ProbeDispatcher, ProbeExecutor, Target};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_with_level(cli.log_level());

    let settings = Settings::from_config(cli.settings.as_deref()).context("Error loading settings")?;
    let settings = cli.apply_overrides(settings);
    settings.validate().context("Error in settings")?;

    if cli.print_settings {
        print!("{settings}");
        return Ok(());
    }

    let targets_path = match &cli.targets {
        Some(path) => path.clone(),
        None => config::default_targets_path()?,
    };
    let entries = config::read_targets_file(&targets_path).context("Error opening config")?;
    let targets = Target::from_entries(entries, settings.default_port);

    let executor = Arc::new(ProbeExecutor::new(&settings)?);
    let dispatcher = ProbeDispatcher::new(executor, settings.max_concurrency);

    let format = cli.format;
    let results = dispatcher.run(targets, |result| render::print(result, format)).await;

    let failing = results
        .iter()
        .filter(|result| matches!(result.outcome, Outcome::Down | Outcome::Error(_)))
        .count();
    info!("{} of {} targets need attention", failing, results.len());

    Ok(())
}
