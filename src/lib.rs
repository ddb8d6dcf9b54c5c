//! # Dilemma
//!
//! Command-line runner for the spatial Prisoner's Dilemma simulation.
//!
//! The engine lives in `dilemma_core`, automaton data in `dilemma_data` and
//! checkpoints and reports in `dilemma_io`. This crate wires them into a
//! resumable, interruptible run.

pub mod app;
pub mod cli;

pub use app::{App, RunOutcome, ShutdownManager};
pub use cli::Args;
