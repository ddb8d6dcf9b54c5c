//! Core data structures for the dilemma simulation.

pub mod automaton;
pub mod color;
