//! The simulation runner.
//!
//! [`App`] drives a [`World`] step by step and hangs the optional outputs
//! off the step counter: stat lines, example automata and periodic
//! checkpoints. It is synchronous; the binary runs it on a blocking task and
//! interrupts it through the [`ShutdownManager`] flag.

pub mod shutdown;

pub use shutdown::ShutdownManager;

use anyhow::{Context, Result};
use dilemma_core::metrics::Metrics;
use dilemma_core::world::World;
use dilemma_io::report::{ExampleExporter, StatsReporter};
use dilemma_io::CheckpointPersistence;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// `step_n` was reached.
    Completed { steps: u64 },
    /// Shutdown was requested between steps.
    Interrupted { steps: u64 },
}

pub struct App {
    world: World,
    checkpoint: Option<PathBuf>,
    stats: Option<StatsReporter<Box<dyn Write + Send>>>,
    examples: Option<ExampleExporter>,
    metrics: Metrics,
    shutdown: ShutdownManager,
    last_saved: Option<u64>,
}

impl App {
    /// Opens the configured outputs for `world`. A stat file that cannot be
    /// opened is skipped with a warning.
    pub fn new(
        world: World,
        checkpoint: Option<PathBuf>,
        shutdown: ShutdownManager,
    ) -> Result<Self> {
        let stats = match StatsReporter::from_settings(world.settings()) {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Failed to open the stat file, running without it: {e}");
                None
            }
        };
        let examples = ExampleExporter::from_settings(world.settings());
        Ok(Self {
            world,
            checkpoint,
            stats,
            examples,
            metrics: Metrics::default(),
            shutdown,
            last_saved: None,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    /// Steps until `step_n` is reached or shutdown is requested.
    ///
    /// A checkpoint, if configured, is written every `backup_rate` steps,
    /// at the end of the run, and once more when interrupted.
    pub fn run(&mut self) -> Result<RunOutcome> {
        let settings = self.world.settings().clone();
        tracing::info!(
            step = self.world.step_count(),
            width = self.world.width(),
            height = self.world.height(),
            fingerprint = %settings.fingerprint(),
            "Simulation starting"
        );
        if settings.step_n != 0 && self.world.step_count() >= settings.step_n {
            tracing::info!(step_n = settings.step_n, "Nothing to do, step limit already reached");
            return Ok(RunOutcome::Completed { steps: 0 });
        }

        let mut steps = 0;
        loop {
            if self.shutdown.is_shutdown_requested() {
                self.save_checkpoint()?;
                self.flush_stats();
                tracing::info!(step = self.world.step_count(), steps, "Simulation interrupted");
                return Ok(RunOutcome::Interrupted { steps });
            }

            let started = Instant::now();
            let outcome = self.world.step();
            self.report();
            self.metrics.record_step(
                self.world.step_count(),
                started.elapsed(),
                outcome,
                self.world.average_score(),
            );
            let running = self.world.advance();
            steps += 1;

            if self.world.step_count() % u64::from(settings.backup_rate) == 0 {
                if let Err(e) = self.save_checkpoint() {
                    tracing::warn!("Periodic checkpoint failed: {e:#}");
                }
            }
            if !running {
                break;
            }
        }

        self.save_checkpoint()?;
        self.flush_stats();
        tracing::info!(
            step = self.world.step_count(),
            steps,
            elapsed_s = self.metrics.elapsed().as_secs_f64(),
            "Simulation complete"
        );
        Ok(RunOutcome::Completed { steps })
    }

    /// Writes the checkpoint unless there is no path or this step is
    /// already saved.
    fn save_checkpoint(&mut self) -> Result<()> {
        let Some(path) = &self.checkpoint else {
            return Ok(());
        };
        let step = self.world.step_count();
        if self.last_saved == Some(step) {
            return Ok(());
        }
        self.world
            .save(path)
            .with_context(|| format!("Failed to write checkpoint {}", path.display()))?;
        self.last_saved = Some(step);
        tracing::info!(step, path = %path.display(), "Checkpoint written");
        Ok(())
    }

    /// Feeds the optional outputs. A failing output is switched off.
    fn report(&mut self) {
        if let Some(stats) = &mut self.stats {
            if let Err(e) = stats.observe(&self.world) {
                tracing::warn!("Stat output failed, disabling it: {e}");
                self.stats = None;
            }
        }
        if let Some(examples) = &mut self.examples {
            if let Err(e) = examples.observe(&self.world) {
                tracing::warn!("Example export failed, disabling it: {e}");
                self.examples = None;
            }
        }
    }

    fn flush_stats(&mut self) {
        if let Some(stats) = &mut self.stats {
            if let Err(e) = stats.flush() {
                tracing::warn!("Failed to flush stat output: {e}");
            }
        }
    }
}
