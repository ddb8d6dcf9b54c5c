//! Step timing and logging setup.
//!
//! Provides structured logging and metrics tracking for monitoring
//! simulation throughput.

use crate::world::StepOutcome;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Running statistics over completed steps.
pub struct Metrics {
    steps: u64,
    culled: u64,
    retired: u64,
    busy: Duration,
    log_every: u64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Metrics {
    /// Creates a collector that logs a summary every `log_every` steps.
    #[must_use]
    pub fn new(log_every: u64) -> Self {
        Self {
            steps: 0,
            culled: 0,
            retired: 0,
            busy: Duration::ZERO,
            log_every: log_every.max(1),
            start_time: Instant::now(),
        }
    }

    /// Records a completed step.
    pub fn record_step(&mut self, step: u64, duration: Duration, outcome: StepOutcome, avg_score: f64) {
        self.steps += 1;
        self.culled += outcome.culled as u64;
        self.retired += outcome.retired as u64;
        self.busy += duration;

        tracing::debug!(
            step,
            culled = outcome.culled,
            retired = outcome.retired,
            reborn = outcome.reborn,
            avg_score,
            duration_us = duration.as_micros() as u64,
            "Step complete"
        );
        if self.steps % self.log_every == 0 {
            tracing::info!(
                step,
                avg_score,
                culled = self.culled,
                retired = self.retired,
                mean_step_ms = self.mean_step().as_secs_f64() * 1000.0,
                "Simulation progress"
            );
        }
    }

    /// Steps recorded so far.
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Total cells culled as locally weakest.
    #[must_use]
    pub fn culled(&self) -> u64 {
        self.culled
    }

    /// Total cells that died of old age.
    #[must_use]
    pub fn retired(&self) -> u64 {
        self.retired
    }

    /// Average wall time per recorded step.
    #[must_use]
    pub fn mean_step(&self) -> Duration {
        if self.steps == 0 {
            Duration::ZERO
        } else {
            self.busy / self.steps as u32
        }
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence; otherwise the level is `info`, or `warn`
/// when `quiet` is set.
pub fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::default();
        assert_eq!(metrics.step_count(), 0);
        assert_eq!(metrics.mean_step(), Duration::ZERO);
    }

    #[test]
    fn test_record_step_accumulates() {
        let mut metrics = Metrics::new(2);
        let outcome = StepOutcome {
            culled: 3,
            retired: 1,
            reborn: 4,
        };
        metrics.record_step(1, Duration::from_millis(10), outcome, 12.5);
        metrics.record_step(2, Duration::from_millis(30), outcome, 13.0);
        assert_eq!(metrics.step_count(), 2);
        assert_eq!(metrics.culled(), 6);
        assert_eq!(metrics.retired(), 2);
        assert_eq!(metrics.mean_step(), Duration::from_millis(20));
    }
}
