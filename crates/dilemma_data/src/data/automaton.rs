use super::color::Rgb;
use serde::{Deserialize, Serialize};

/// Fixed-point scale of a state's cooperation probability.
///
/// An `action` of `RESOLUTION` always cooperates, `0` always defects.
pub const RESOLUTION: u16 = 1024;

/// Number of transition slots per state, one for each 3-bit key.
pub const TRANSITION_SLOTS: usize = 8;

/// Maps a `(mistake, own decision, opponent action)` key to its slot in
/// [`State::next`].
#[inline]
#[must_use]
pub const fn key_to_index(mistake: bool, own: bool, opponent: bool) -> usize {
    ((mistake as usize) << 2) | ((own as usize) << 1) | (opponent as usize)
}

/// Lifecycle tag of a grid cell during one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    /// Not yet judged in this step.
    #[default]
    Alive,
    /// Has a weaker neighbour; can only die of old age.
    Strong,
    /// Eligible to be picked as a parent.
    Survived,
    /// Will be overwritten by a child during spawn.
    Dead,
}

/// One state of a strategy automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct State {
    /// Probability of cooperating, scaled by [`RESOLUTION`].
    pub action: u16,
    /// Next-state table indexed by [`key_to_index`].
    pub next: [u16; TRANSITION_SLOTS],
}

impl State {
    /// Follows the transition selected by the given key bits.
    #[inline]
    #[must_use]
    pub fn follow(&self, mistake: bool, own: bool, opponent: bool) -> usize {
        self.next[key_to_index(mistake, own, opponent)] as usize
    }

    /// Cooperation probability as a float, for display only.
    #[must_use]
    pub fn cooperation(&self) -> f64 {
        f64::from(self.action) / f64::from(RESOLUTION)
    }
}

/// A probabilistic finite-state strategy occupying one grid cell.
///
/// The automaton exclusively owns its state array. A child born into a dead
/// cell overwrites the fields of the existing value instead of replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Automaton {
    /// Payoff accumulated during the current step.
    pub score: i64,
    /// Remaining steps before death by old age.
    pub lifetime: u16,
    /// Selection status for the current step.
    pub status: Status,
    /// Cosmetic colour, inherited with jitter.
    pub color: Rgb,
    /// States; state 0 is the start state of every match.
    pub states: Vec<State>,
}

impl Automaton {
    /// Number of states.
    #[must_use]
    pub fn state_n(&self) -> usize {
        self.states.len()
    }

    /// Checks that every action is in range and every transition targets an
    /// existing state.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let n = self.states.len();
        n > 0
            && self.states.iter().all(|s| {
                s.action <= RESOLUTION && s.next.iter().all(|&target| (target as usize) < n)
            })
    }

    /// Same strategy, colour and remaining lifetime, ignoring per-step score
    /// and status.
    #[must_use]
    pub fn same_genome(&self, other: &Automaton) -> bool {
        self.lifetime == other.lifetime && self.color == other.color && self.states == other.states
    }
}
