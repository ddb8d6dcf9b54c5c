//! Graphviz export of a single automaton.
//!
//! The start state is a double circle labelled `S<p>` and every other state
//! a circle labelled with its cooperation probability. An edge label starts
//! with `@` for a normal transition or `#` for one taken after a mistake,
//! followed by the own-decision bit when decisions are observable and the
//! opponent's move. Transitions that can never fire are left out, as are
//! unreachable states unless `show_unreachable` is set.

use dilemma_core::automaton::{reachable_states, slot_is_live};
use dilemma_core::config::Settings;
use dilemma_data::{Automaton, TRANSITION_SLOTS};

/// Renders `automaton` as a `digraph` in DOT syntax.
#[must_use]
pub fn to_dot(automaton: &Automaton, settings: &Settings) -> String {
    let reachable = reachable_states(automaton, settings);
    let shown = |id: usize| settings.flags.show_unreachable || reachable.contains(&id);

    let mut out = String::from("digraph automaton {\n");
    for (id, state) in automaton.states.iter().enumerate() {
        if id == 0 {
            out.push_str(&format!(
                "  node [shape = doublecircle, label = \"S{:.3}\"] ST_0;\n",
                state.cooperation()
            ));
        } else if shown(id) {
            out.push_str(&format!(
                "  node [shape = circle, label = \"{:.3}\"] ST_{id};\n",
                state.cooperation()
            ));
        }
    }
    for (id, state) in automaton.states.iter().enumerate() {
        if !shown(id) {
            continue;
        }
        for slot in 0..TRANSITION_SLOTS {
            if !slot_is_live(state, slot, settings) {
                continue;
            }
            out.push_str(&format!(
                "  ST_{id} -> ST_{} [label = \"{}\"];\n",
                state.next[slot],
                edge_label(slot, settings)
            ));
        }
    }
    out.push_str("}\n");
    out
}

fn edge_label(slot: usize, settings: &Settings) -> String {
    let mut label = String::with_capacity(3);
    label.push(if slot & 0b100 != 0 { '#' } else { '@' });
    if settings.flags.decision_aware {
        label.push(if slot & 0b010 != 0 { '1' } else { '0' });
    }
    label.push(if slot & 0b001 != 0 { '1' } else { '0' });
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use dilemma_core::rng::FIXED_ONE;
    use dilemma_data::{key_to_index, State, RESOLUTION};

    /// Tit-for-tat with an unreachable third state.
    fn tit_for_tat() -> Automaton {
        let mut cooperate = State {
            action: RESOLUTION,
            next: [0; 8],
        };
        let mut defect = State {
            action: 0,
            next: [1; 8],
        };
        for mistake in [false, true] {
            for own in [false, true] {
                cooperate.next[key_to_index(mistake, own, false)] = 1;
                defect.next[key_to_index(mistake, own, true)] = 0;
            }
        }
        Automaton {
            states: vec![
                cooperate,
                defect,
                State {
                    action: 256,
                    next: [2; 8],
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_graph() {
        let dot = to_dot(&tit_for_tat(), &Settings::default());
        assert!(dot.starts_with("digraph automaton {\n"));
        assert!(dot.contains("node [shape = doublecircle, label = \"S1.000\"] ST_0;"));
        assert!(dot.contains("node [shape = circle, label = \"0.000\"] ST_1;"));
        assert!(dot.contains("ST_0 -> ST_1 [label = \"@0\"];"));
        assert!(dot.contains("ST_0 -> ST_0 [label = \"@1\"];"));
        assert!(dot.contains("ST_1 -> ST_0 [label = \"@1\"];"));
        assert!(!dot.contains('#'));
        assert!(!dot.contains("ST_2"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_unreachable_states_on_request() {
        let mut settings = Settings::default();
        settings.flags.show_unreachable = true;
        let dot = to_dot(&tit_for_tat(), &settings);
        assert!(dot.contains("label = \"0.250\"] ST_2;"));
        assert!(dot.contains("ST_2 -> ST_2 [label = \"@0\"];"));
    }

    #[test]
    fn test_mistake_and_decision_edges() {
        let mut settings = Settings {
            mistake_rate: FIXED_ONE / 100,
            ..Settings::default()
        };
        settings.flags.mistake_aware = true;
        settings.flags.decision_aware = true;
        let dot = to_dot(&tit_for_tat(), &settings);
        // ST_0 always cooperates: only own-bit-1 edges.
        assert!(dot.contains("ST_0 -> ST_1 [label = \"@10\"];"));
        assert!(dot.contains("ST_0 -> ST_1 [label = \"#10\"];"));
        assert!(!dot.contains("ST_0 -> ST_1 [label = \"@00\"];"));
        // ST_1 always defects: only own-bit-0 edges.
        assert!(dot.contains("ST_1 -> ST_0 [label = \"@01\"];"));
        assert!(!dot.contains("ST_1 -> ST_0 [label = \"@11\"];"));
        assert_eq!(dot.matches(" -> ").count(), 8);
    }
}
