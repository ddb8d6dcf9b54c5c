//! # Dilemma Core
//!
//! The evolution engine for the dilemma simulation: probabilistic
//! finite-state strategies playing a noisy Prisoner's Dilemma on a torus.
//!
//! This crate contains the deterministic simulation logic, including:
//! - A seeded random stream with fixed-point probabilities
//! - Automaton initialization, matches, crossover and mutation
//! - The population grid and its play / select / spawn phases
//! - Settings validation and structured logging
//!
//! ## Example
//!
//! ```
//! use dilemma_core::config::Settings;
//! use dilemma_core::world::World;
//!
//! let settings = Settings {
//!     board_size_x: 8,
//!     board_size_y: 8,
//!     turn_n: 10,
//!     ..Settings::default()
//! };
//! let mut world = World::new(settings).unwrap();
//! let outcome = world.step();
//! assert_eq!(outcome.reborn, outcome.culled + outcome.retired);
//! world.advance();
//! assert_eq!(world.step_count(), 1);
//! ```

/// Automaton behaviour: initialization, matches, reproduction, reachability
pub mod automaton;
/// Simulation settings, limits and validation
pub mod config;
/// Toroidal grid geometry and neighbourhood scans
pub mod grid;
/// Step timing and tracing initialization
pub mod metrics;
/// Deterministic random stream and fixed-point probabilities
pub mod rng;
/// The population grid and its per-step phases
pub mod world;

pub use automaton::AutomatonLogic;
pub use config::{Flags, Settings};
pub use metrics::{init_logging, Metrics};
pub use rng::{from_fixed, to_fixed, RandomStream, StreamState, FIXED_ONE};
pub use world::{StepOutcome, World};
