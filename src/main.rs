use anyhow::Result;
use clap::Parser;
use dilemma_core::metrics::init_logging;
use dilemma_lib::app::{App, RunOutcome, ShutdownManager};
use dilemma_lib::cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let world = args.build_world()?;
    init_logging(world.settings().flags.quiet);
    if args.resume {
        tracing::info!(step = world.step_count(), "Resumed from checkpoint");
    }

    let shutdown = ShutdownManager::new();
    shutdown.listen_for_ctrl_c();

    let mut app = App::new(world, args.checkpoint.clone(), shutdown)?;
    let outcome = tokio::task::spawn_blocking(move || app.run()).await??;

    match outcome {
        RunOutcome::Completed { steps } => tracing::info!(steps, "Exited clean"),
        RunOutcome::Interrupted { steps } => tracing::info!(steps, "Stopped by user"),
    }
    Ok(())
}
