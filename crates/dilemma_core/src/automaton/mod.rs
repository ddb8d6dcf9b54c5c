//! Behaviour of strategy automata.
//!
//! [`dilemma_data::Automaton`] is plain data; this module gives it its
//! semantics through the [`AutomatonLogic`] extension trait. Every stochastic
//! operation takes the caller's [`RandomStream`] so draw order stays under the
//! world's control.

use crate::config::Settings;
use crate::rng::RandomStream;
use dilemma_data::{Automaton, Rgb, State, Status, RESOLUTION};
use std::collections::BTreeSet;

pub mod crossover;
pub mod play;
pub mod reachability;

pub use crossover::{cross_into, jitter_color, mutate};
pub use play::play_match;
pub use reachability::{reachable_states, slot_is_live};

/// Draws a cooperation probability for a fresh or mutated state.
pub fn random_action(settings: &Settings, rng: &mut RandomStream) -> u16 {
    if settings.flags.deterministic {
        if rng.coin() {
            0
        } else {
            RESOLUTION
        }
    } else {
        rng.below(u64::from(RESOLUTION) + 1) as u16
    }
}

/// Re-randomizes one state: its action, then its eight transitions.
pub fn randomize_state(state: &mut State, state_n: usize, settings: &Settings, rng: &mut RandomStream) {
    state.action = random_action(settings, rng);
    for slot in state.next.iter_mut() {
        *slot = rng.below(state_n as u64) as u16;
    }
}

/// Draws a newborn's remaining lifetime in `[0, settings.lifetime)`.
pub fn random_lifetime(settings: &Settings, rng: &mut RandomStream) -> u16 {
    rng.below(u64::from(settings.lifetime)) as u16
}

pub trait AutomatonLogic {
    /// A fully random automaton with `settings.state_n` states.
    fn new_random(settings: &Settings, rng: &mut RandomStream) -> Self;
    /// Overwrites lifetime, colour and every state with random values.
    fn randomize(&mut self, settings: &Settings, rng: &mut RandomStream);
    /// Start-of-step bookkeeping: clear score and status, age by one step.
    fn reset(&mut self);
    /// Rebirth from two parents, reusing this automaton's storage.
    fn cross_from(
        &mut self,
        parent1: &Automaton,
        parent2: &Automaton,
        settings: &Settings,
        rng: &mut RandomStream,
    );
    /// States reachable from state 0 through transitions that can fire.
    fn reachable_states(&self, settings: &Settings) -> BTreeSet<usize>;
}

impl AutomatonLogic for Automaton {
    fn new_random(settings: &Settings, rng: &mut RandomStream) -> Self {
        let mut automaton = Automaton::default();
        automaton.randomize(settings, rng);
        automaton
    }

    fn randomize(&mut self, settings: &Settings, rng: &mut RandomStream) {
        let state_n = usize::from(settings.state_n);
        self.score = 0;
        self.status = Status::Alive;
        self.lifetime = random_lifetime(settings, rng);
        self.color = Rgb::from_packed(rng.below(u64::from(Rgb::MAX_PACKED) + 1) as u32);
        self.states.resize(state_n, State::default());
        for state in self.states.iter_mut() {
            randomize_state(state, state_n, settings, rng);
        }
    }

    fn reset(&mut self) {
        self.score = 0;
        self.status = Status::Alive;
        self.lifetime = self.lifetime.saturating_sub(1);
    }

    fn cross_from(
        &mut self,
        parent1: &Automaton,
        parent2: &Automaton,
        settings: &Settings,
        rng: &mut RandomStream,
    ) {
        cross_into(self, parent1, parent2, settings, rng);
    }

    fn reachable_states(&self, settings: &Settings) -> BTreeSet<usize> {
        reachable_states(self, settings)
    }
}
