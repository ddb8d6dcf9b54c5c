//! # Dilemma IO
//!
//! Persistence and output layer for the dilemma simulation.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - The versioned text checkpoint format
//! - Atomic checkpoint saving and loading
//! - Graphviz export of single automata
//! - Periodic statistics and example reporters

/// Line-oriented checkpoint encoder and decoder
pub mod checkpoint;
/// Error types and result aliases for I/O operations
pub mod error;
/// Graphviz rendering of automata
pub mod graph;
/// Checkpoint files on disk
pub mod persistence;
/// Statistics and example automaton output during a run
pub mod report;

pub use error::{IoError, Result};
pub use persistence::{load, save, CheckpointPersistence};
