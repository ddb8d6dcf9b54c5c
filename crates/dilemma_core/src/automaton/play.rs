//! One iterated match between two automata.

use crate::config::Settings;
use crate::rng::RandomStream;
use dilemma_data::{Automaton, RESOLUTION};

/// Payoff of a single turn for the side that played `own` against `other`.
///
/// Cooperating costs 1 and gives the opponent 3.
#[inline]
#[must_use]
pub fn payoff(own: bool, other: bool) -> i64 {
    3 * i64::from(other) - i64::from(own)
}

/// Plays `settings.turn_n` turns and returns the score gained by each side.
///
/// Both automata start in state 0; the current state is local to the match.
/// Per turn, four values are drawn in a fixed order: both mistake flags, then
/// both decisions.
pub fn play_match(
    first: &Automaton,
    second: &Automaton,
    settings: &Settings,
    rng: &mut RandomStream,
) -> (i64, i64) {
    let mistake_aware = settings.flags.mistake_aware;
    let decision_aware = settings.flags.decision_aware;
    let resolution = u64::from(RESOLUTION);

    let (mut s1, mut s2) = (0usize, 0usize);
    let (mut score1, mut score2) = (0i64, 0i64);
    for _ in 0..settings.turn_n {
        let err1 = rng.chance(settings.mistake_rate);
        let err2 = rng.chance(settings.mistake_rate);
        let dec1 = rng.below(resolution) < u64::from(first.states[s1].action);
        let dec2 = rng.below(resolution) < u64::from(second.states[s2].action);
        let act1 = err1 ^ dec1;
        let act2 = err2 ^ dec2;

        score1 += payoff(act1, act2);
        score2 += payoff(act2, act1);

        s1 = first.states[s1].follow(err1 && mistake_aware, dec1 && decision_aware, act2);
        s2 = second.states[s2].follow(err2 && mistake_aware, dec2 && decision_aware, act1);
    }
    (score1, score2)
}
