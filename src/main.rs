// src/main.rs
use anyhow::Result;
use clap::Parser;

use coastal_index::batch::process_batch;
use coastal_index::cli::{Cli, Commands};
use coastal_index::{Config, RunOutcome, Workflow};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_target(false)
        .parse_default_env()
        .init();

    let threads = cli.threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;
    log::debug!("coastal-index {} using {} threads", coastal_index::VERSION, threads);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply(&mut config);
    config.validate()?;

    let workflow = match &cli.command {
        Commands::Chlorophyll { .. } => Workflow::Chlorophyll,
        Commands::Turbidity { .. } => Workflow::Turbidity,
        Commands::Mangrove { .. } => Workflow::Mangrove,
        Commands::Batch { file } => {
            let outcomes = process_batch(file, &config)?;
            let done = outcomes
                .iter()
                .filter(|(_, o)| matches!(o, Ok(RunOutcome::Completed(_))))
                .count();
            log::info!("{}/{} operations completed", done, outcomes.len());
            return Ok(());
        }
    };

    match workflow.run(&config) {
        Ok(RunOutcome::Completed(report)) => {
            log::info!("Processing complete: {}", report.raster.display());
            if let Some(stats) = report.statistics {
                log::debug!("{}", serde_json::to_string(&stats)?);
            }
            Ok(())
        }
        // Already reported; a missing scene is not a failure.
        Ok(RunOutcome::MissingInput(_)) => Ok(()),
        Err(e) if workflow == Workflow::Mangrove => {
            log::error!("ERROR: {}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
