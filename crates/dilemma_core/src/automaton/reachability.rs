use crate::config::Settings;
use dilemma_data::{Automaton, State, RESOLUTION, TRANSITION_SLOTS};
use std::collections::BTreeSet;

/// Whether the transition in `slot` of `state` can ever be taken.
///
/// Mistake slots need mistake awareness and a non-zero mistake rate. The
/// own-decision bit is always 0 without decision awareness; with it, a
/// pure defector never decides 1 and a pure cooperator never decides 0.
#[must_use]
pub fn slot_is_live(state: &State, slot: usize, settings: &Settings) -> bool {
    let mistake = slot & 0b100 != 0;
    let own = slot & 0b010 != 0;
    if mistake && !(settings.flags.mistake_aware && settings.mistake_rate > 0) {
        return false;
    }
    if !settings.flags.decision_aware {
        return !own;
    }
    if own {
        state.action != 0
    } else {
        state.action != RESOLUTION
    }
}

/// Ids of all states reachable from state 0 through live transitions.
///
/// Depth-first with an explicit stack of `(state, next slot)` frames.
#[must_use]
pub fn reachable_states(automaton: &Automaton, settings: &Settings) -> BTreeSet<usize> {
    let state_n = automaton.state_n();
    if state_n == 0 {
        return BTreeSet::new();
    }
    let mut seen = vec![false; state_n];
    seen[0] = true;
    let mut stack: Vec<(usize, usize)> = vec![(0, 0)];

    while let Some(frame) = stack.last_mut() {
        let (state_id, slot) = *frame;
        if slot == TRANSITION_SLOTS {
            stack.pop();
            continue;
        }
        frame.1 += 1;
        let state = &automaton.states[state_id];
        if !slot_is_live(state, slot, settings) {
            continue;
        }
        let target = state.next[slot] as usize;
        if !seen[target] {
            seen[target] = true;
            stack.push((target, 0));
        }
    }

    seen.iter()
        .enumerate()
        .filter_map(|(id, &reached)| reached.then_some(id))
        .collect()
}
