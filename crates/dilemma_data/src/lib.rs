//! Plain data types shared by the dilemma simulation crates.
//!
//! Behaviour lives in `dilemma_core`; this crate only describes what an
//! automaton *is* so that the engine, the checkpoint codec and the exporters
//! agree on one representation.

pub mod data;

pub use data::automaton::{key_to_index, Automaton, State, Status, RESOLUTION, TRANSITION_SLOTS};
pub use data::color::Rgb;
