//! Graceful shutdown handling for the runner.
//!
//! The simulation polls a shared flag between steps; a signal handler (or a
//! test) flips it from another thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Manages graceful shutdown of a run.
#[derive(Debug, Clone)]
pub struct ShutdownManager {
    shutdown_requested: Arc<AtomicBool>,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownManager {
    /// Creates a new shutdown manager.
    pub fn new() -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests shutdown.
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        tracing::info!("Shutdown requested");
    }

    /// Checks if shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Spawns a task that requests shutdown on Ctrl-C.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen_for_ctrl_c(&self) {
        let manager = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received, finishing the current step...");
                manager.request_shutdown();
            }
        });
    }
}
