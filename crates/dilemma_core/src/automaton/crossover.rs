use super::{random_action, random_lifetime, randomize_state};
use crate::config::Settings;
use crate::rng::RandomStream;
use dilemma_data::{Automaton, Rgb, State, Status};

/// Moves each colour channel by -1, 0 or +1 using a single draw.
pub fn jitter_color(color: Rgb, rng: &mut RandomStream) -> Rgb {
    let x = rng.below(27) as i16;
    color.shifted(x % 3 - 1, (x / 3) % 3 - 1, x / 9 - 1)
}

/// Overwrites `child` with offspring of `parent1` and `parent2`.
///
/// The child's state vector is reused. With probability `cross_rate` each
/// state is taken whole from either parent; otherwise the child clones
/// `parent1`. Mutation follows, and the child comes back `Alive`.
///
/// # Panics
/// If the parents have different state counts.
pub fn cross_into(
    child: &mut Automaton,
    parent1: &Automaton,
    parent2: &Automaton,
    settings: &Settings,
    rng: &mut RandomStream,
) {
    assert_eq!(
        parent1.state_n(),
        parent2.state_n(),
        "crossover parents must have the same number of states"
    );
    child.states.resize(parent1.state_n(), State::default());
    child.lifetime = random_lifetime(settings, rng);

    if rng.chance(settings.cross_rate) {
        let base = if rng.coin() { parent1.color } else { parent2.color };
        child.color = jitter_color(base, rng);
        for (i, state) in child.states.iter_mut().enumerate() {
            *state = if rng.coin() {
                parent1.states[i]
            } else {
                parent2.states[i]
            };
        }
    } else {
        child.color = jitter_color(parent1.color, rng);
        child.states.copy_from_slice(&parent1.states);
    }

    mutate(child, settings, rng);
    child.status = Status::Alive;
}

/// Applies state, action and edge mutations in place.
///
/// A state hit by a full re-randomization is not mutated further.
pub fn mutate(automaton: &mut Automaton, settings: &Settings, rng: &mut RandomStream) {
    let state_n = automaton.state_n();
    for state in automaton.states.iter_mut() {
        if rng.chance(settings.state_mut_rate) {
            randomize_state(state, state_n, settings, rng);
            continue;
        }
        if rng.chance(settings.action_mut_rate) {
            state.action = random_action(settings, rng);
        }
        for slot in state.next.iter_mut() {
            if rng.chance(settings.edge_mut_rate) {
                *slot = rng.below(state_n as u64) as u16;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::AutomatonLogic;
    use crate::rng::FIXED_ONE;

    fn no_mutation(cross_rate: u64) -> Settings {
        Settings {
            state_n: 16,
            cross_rate,
            state_mut_rate: 0,
            action_mut_rate: 0,
            edge_mut_rate: 0,
            ..Settings::default()
        }
    }

    fn close(a: Rgb, b: Rgb) -> bool {
        let d = |x: u8, y: u8| (i16::from(x) - i16::from(y)).abs() <= 1;
        d(a.r, b.r) && d(a.g, b.g) && d(a.b, b.b)
    }

    #[test]
    fn test_clone_copies_first_parent() {
        let settings = no_mutation(0);
        let mut rng = RandomStream::seed(1);
        let p1 = Automaton::new_random(&settings, &mut rng);
        let p2 = Automaton::new_random(&settings, &mut rng);
        let mut child = Automaton::new_random(&settings, &mut rng);
        child.status = Status::Dead;
        child.cross_from(&p1, &p2, &settings, &mut rng);
        assert_eq!(child.states, p1.states);
        assert!(close(child.color, p1.color));
        assert_eq!(child.status, Status::Alive);
        assert!(child.lifetime < settings.lifetime);
    }

    #[test]
    fn test_crossover_takes_whole_states_from_parents() {
        let settings = no_mutation(FIXED_ONE);
        let mut rng = RandomStream::seed(2);
        let p1 = Automaton::new_random(&settings, &mut rng);
        let p2 = Automaton::new_random(&settings, &mut rng);
        let mut child = Automaton::default();
        child.cross_from(&p1, &p2, &settings, &mut rng);
        assert_eq!(child.state_n(), 16);
        for (i, state) in child.states.iter().enumerate() {
            assert!(*state == p1.states[i] || *state == p2.states[i]);
        }
        assert!(close(child.color, p1.color) || close(child.color, p2.color));
    }

    #[test]
    fn test_full_edge_mutation_keeps_targets_valid() {
        let settings = Settings {
            edge_mut_rate: FIXED_ONE,
            action_mut_rate: FIXED_ONE,
            ..no_mutation(FIXED_ONE)
        };
        let mut rng = RandomStream::seed(3);
        let p = Automaton::new_random(&settings, &mut rng);
        let mut child = Automaton::default();
        child.cross_from(&p, &p, &settings, &mut rng);
        assert!(child.is_well_formed());
    }

    #[test]
    fn test_jitter_stays_in_channel_bounds() {
        let mut rng = RandomStream::seed(4);
        let white = Rgb {
            r: 255,
            g: 255,
            b: 255,
        };
        for _ in 0..200 {
            let c = jitter_color(white, &mut rng);
            assert!(close(c, white));
            let k = jitter_color(Rgb::default(), &mut rng);
            assert!(close(k, Rgb::default()));
        }
    }

    #[test]
    #[should_panic(expected = "same number of states")]
    fn test_mismatched_parents_panic() {
        let mut rng = RandomStream::seed(5);
        let small = Automaton::new_random(&no_mutation(0), &mut rng);
        let big = Automaton::new_random(
            &Settings {
                state_n: 3,
                ..no_mutation(0)
            },
            &mut rng,
        );
        let mut child = Automaton::default();
        cross_into(&mut child, &small, &big, &no_mutation(0), &mut rng);
    }
}
