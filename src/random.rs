use tracing::debug;

use crate::prelude::*;

/// Uses a sprout-like algorithm to generate a random automaton with a total transition function.
/// `symbols` determines the number of distinct symbols in the alphabet, see
/// [`Alphabet::of_size`]. `probability` determines the probability of a back edge to some state
/// being inserted. The algorithm is as follows:
/// 1. Start with a single state.
/// 2. For each symbol, go through the existing states in order and with probability `probability`
///    add a back edge to that state.
/// 3. If no back edge was added, insert an edge to a new state.
/// 4. Repeat until all states and symbols have been treated.
///
/// Every state is accepting with probability one half. As long as `probability` is positive, the
/// procedure terminates with probability one.
pub fn random_sprout_fsm(rng: &mut fastrand::Rng, symbols: usize, probability: f64) -> Fsm {
    let alphabet = Alphabet::of_size(symbols);
    let mut transitions = vec![];
    let mut states = 1;
    let mut current = 0;
    while current < states {
        'symbols: for symbol in alphabet.universe() {
            for target in 0..=current {
                if rng.f64() < probability {
                    transitions.push(((current, *symbol), target));
                    continue 'symbols;
                }
            }
            transitions.push(((current, *symbol), states));
            states += 1;
        }
        current += 1;
    }
    let accepting: Vec<usize> = (0..states).filter(|_| rng.bool()).collect();
    debug!("sprouted random automaton with {states} states");
    Fsm::new(alphabet.universe().copied(), states, 0, accepting, transitions)
        .expect("sprouted automata are well-formed")
}

/// Generates a random automaton with `size` states (at least one) over an alphabet with `symbols`
/// symbols. Each transition is present with probability `density`, its target is drawn uniformly.
/// Every state is accepting with probability one half and `0` is the initial state. Depending on
/// the transitions drawn, some states may be unreachable.
pub fn random_fsm(rng: &mut fastrand::Rng, symbols: usize, size: usize, density: f64) -> Fsm {
    let size = size.max(1);
    let alphabet = Alphabet::of_size(symbols);
    let mut transitions = vec![];
    for q in 0..size {
        for symbol in alphabet.universe() {
            if rng.f64() < density {
                transitions.push(((q, *symbol), rng.usize(..size)));
            }
        }
    }
    let accepting: Vec<usize> = (0..size).filter(|_| rng.bool()).collect();
    Fsm::new(alphabet.universe().copied(), size, 0, accepting, transitions)
        .expect("random automata are well-formed")
}

/// Draws a random weight of degree at most `max_degree` (at least one) whose coefficients are
/// all `0` or `1`, so that counting words by their size is supported.
pub fn random_weight(rng: &mut fastrand::Rng, max_degree: usize) -> Weight {
    let max_degree = max_degree.max(1);
    let mut terms: Vec<(u64, usize)> = (1..=max_degree)
        .filter(|_| rng.u8(..4) == 0)
        .map(|exponent| (1, exponent))
        .collect();
    if terms.is_empty() {
        terms.push((1, rng.usize(1..=max_degree)));
    }
    Weight::from_terms(terms).unwrap_or_else(|_| Weight::x())
}

/// Works as [`random_fsm`], but returns a [`Wfsm`] whose transitions carry weights drawn by
/// [`random_weight`].
pub fn random_wfsm(
    rng: &mut fastrand::Rng,
    symbols: usize,
    size: usize,
    density: f64,
    max_degree: usize,
) -> Wfsm {
    let skeleton = random_fsm(rng, symbols, size, density);
    let transitions = skeleton
        .transitions()
        .map(|(q, symbol, p)| ((q, *symbol), (p, random_weight(rng, max_degree))))
        .collect::<Vec<_>>();
    Wfsm::new(
        skeleton.alphabet().universe().copied(),
        skeleton.num_states(),
        skeleton.start(),
        skeleton.accepting(),
        transitions,
    )
    .expect("random weighted automata are well-formed")
}

/// Generates a random word over the `alphabet`, whose length is drawn uniformly from the range
/// `min_len..=max_len`.
pub fn random_word<S: Symbol>(
    rng: &mut fastrand::Rng,
    alphabet: &Alphabet<S>,
    min_len: usize,
    max_len: usize,
) -> Vec<S> {
    let length = rng.usize(min_len..=max_len);
    if alphabet.is_empty() {
        return vec![];
    }
    (0..length)
        .map(|_| alphabet.as_slice()[rng.usize(..alphabet.size())].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::OrderedSet;

    const SEEDS: std::ops::Range<u64> = 0..40;

    #[test]
    fn generators_are_reproducible() {
        let first = random_fsm(&mut fastrand::Rng::with_seed(7), 2, 6, 0.8);
        let second = random_fsm(&mut fastrand::Rng::with_seed(7), 2, 6, 0.8);
        assert_eq!(first, second);
        assert_eq!(first.num_states(), 6);

        let sprouted = random_sprout_fsm(&mut fastrand::Rng::with_seed(7), 3, 0.5);
        assert!(sprouted.has_explicit_garbage());
        assert_eq!(sprouted.alphabet().size(), 3);

        let wfsm = random_wfsm(&mut fastrand::Rng::with_seed(7), 2, 4, 0.9, 3);
        assert!(wfsm.has_unit_coefficients());
        assert!(wfsm.max_degree() <= 3);
    }

    #[test_log::test]
    fn minimization_preserves_counting() {
        for seed in SEEDS {
            let mut rng = fastrand::Rng::with_seed(seed);
            let fsm = random_fsm(&mut rng, 2, 1 + seed as usize % 8, 0.7).with_explicit_garbage();
            let minimized = fsm.minimize(true).unwrap();
            assert!(minimized.num_states() <= fsm.num_states());
            assert_eq!(minimized.smart_enumeration(12), fsm.smart_enumeration(12));
            assert_eq!(
                minimized.minimize(false).unwrap().num_states(),
                minimized.num_states(),
                "seed {seed}"
            );
        }
    }

    #[test]
    fn membership_agrees_with_enumeration() {
        for seed in SEEDS.take(15) {
            let mut rng = fastrand::Rng::with_seed(seed);
            let fsm = random_fsm(&mut rng, 2, 5, 0.6);
            for length in 0..=6 {
                let accepted = fsm.words_generated(length);
                assert_eq!(accepted, fsm.brute_words_generated(length), "seed {seed}");
                for word in &accepted {
                    assert!(fsm.process_word(word));
                }
                assert_eq!(
                    fsm.smart_enumeration(length)[length],
                    accepted.len() as Count
                );
            }
        }
    }

    #[test]
    fn products_agree_with_operands() {
        for seed in SEEDS {
            let mut rng = fastrand::Rng::with_seed(seed);
            let left = random_fsm(&mut rng, 2, 4, 0.7);
            let right = random_sprout_fsm(&mut rng, 2, 0.6);
            let union = left.union(&right);
            let intersection = left.intersection(&right);
            for _ in 0..50 {
                let word = random_word(&mut rng, left.alphabet(), 0, 10);
                let (l, r) = (left.process_word(&word), right.process_word(&word));
                assert_eq!(union.process_word(&word), l || r, "seed {seed}, {word:?}");
                assert_eq!(
                    intersection.process_word(&word),
                    l && r,
                    "seed {seed}, {word:?}"
                );
            }
        }
    }

    #[test]
    fn list_intersection_strategies_agree() {
        for seed in SEEDS.take(15) {
            let mut rng = fastrand::Rng::with_seed(seed);
            let machines: Vec<Fsm> = (0..1 + seed as usize % 5)
                .map(|_| random_fsm(&mut rng, 2, 4, 0.8))
                .collect();
            let balanced = Fsm::intersection_of_list(&machines, true).unwrap();
            let unminimized = Fsm::intersection_of_list(&machines, false).unwrap();
            let linear = Fsm::slower_intersection_of_list(&machines).unwrap();
            let expected = linear.smart_enumeration(10);
            assert_eq!(balanced.smart_enumeration(10), expected, "seed {seed}");
            assert_eq!(unminimized.smart_enumeration(10), expected, "seed {seed}");
        }
    }

    #[test_log::test]
    fn weighted_round_trip_preserves_counting() {
        for seed in SEEDS {
            let mut rng = fastrand::Rng::with_seed(seed);
            let wfsm = random_wfsm(&mut rng, 2, 1 + seed as usize % 6, 0.8, 3);
            let (encoded, table) = Wfsm::convert_wfsm_to_fsm([&wfsm]);
            let decoded = Wfsm::convert_fsm_to_wfsm(&encoded[0], &table).unwrap();
            assert_eq!(decoded, wfsm, "seed {seed}");
            assert_eq!(
                decoded.smart_enumeration(15).unwrap(),
                wfsm.smart_enumeration(15).unwrap()
            );
        }
    }

    #[test]
    fn weighted_enumeration_agrees_with_brute_force() {
        for seed in SEEDS.take(15) {
            let mut rng = fastrand::Rng::with_seed(seed);
            let wfsm = random_wfsm(&mut rng, 2, 4, 0.8, 2);
            let counts = wfsm.smart_enumeration(6).unwrap();
            for size in 0..=6 {
                let words = wfsm.words_generated(size).unwrap();
                assert_eq!(
                    words,
                    wfsm.brute_words_generated(size).unwrap(),
                    "seed {seed}"
                );
                // words whose weight contains several exponents are counted once per exponent
                let with_multiplicity: Count = words
                    .iter()
                    .filter_map(|w| wfsm.weight_of_word(w))
                    .map(|weight| weight.get(size).copied().unwrap_or(0))
                    .sum();
                assert_eq!(counts[size], with_multiplicity, "seed {seed}, size {size}");
            }
        }
    }

    #[test_log::test]
    fn weighted_minimization_preserves_counting() {
        for seed in SEEDS {
            let mut rng = fastrand::Rng::with_seed(seed);
            let wfsm = random_wfsm(&mut rng, 2, 1 + seed as usize % 7, 0.7, 3);
            let minimized = wfsm.minimize(true).unwrap();
            assert!(
                minimized.num_states() <= wfsm.num_states().max(1),
                "seed {seed}"
            );
            assert_eq!(
                minimized.smart_enumeration(20).unwrap(),
                wfsm.smart_enumeration(20).unwrap(),
                "seed {seed}"
            );
            assert_eq!(minimized.minimize(true).unwrap(), minimized, "seed {seed}");
        }
    }

    #[test]
    fn weighted_products_with_shared_weights() {
        for seed in SEEDS {
            let mut rng = fastrand::Rng::with_seed(seed);
            let letter_weights: Vec<(char, Weight)> = Alphabet::of_size(2)
                .universe()
                .map(|symbol| (*symbol, random_weight(&mut rng, 3)))
                .collect();
            let left = random_fsm(&mut rng, 2, 4, 0.8)
                .convert_to_wfsm(letter_weights.clone())
                .unwrap();
            let right = random_sprout_fsm(&mut rng, 2, 0.5)
                .convert_to_wfsm(letter_weights)
                .unwrap();
            let union = left.union(&right).unwrap();
            let intersection = left.intersection(&right).unwrap();
            let list = Wfsm::intersection_of_list(&[left.clone(), right.clone()], true).unwrap();

            let union_counts = union.smart_enumeration(8).unwrap();
            let intersection_counts = intersection.smart_enumeration(8).unwrap();
            assert_eq!(list.smart_enumeration(8).unwrap(), intersection_counts);
            for size in 0..=8 {
                let left_words = left.words_generated(size).unwrap();
                let right_words = right.words_generated(size).unwrap();
                let both: OrderedSet<_> = left_words.intersection(&right_words).cloned().collect();
                let either: OrderedSet<_> = left_words.union(&right_words).cloned().collect();
                assert_eq!(
                    intersection.words_generated(size).unwrap(),
                    both,
                    "seed {seed}"
                );
                assert_eq!(union.words_generated(size).unwrap(), either, "seed {seed}");
                let multiplicity = |words: &OrderedSet<Vec<char>>| -> Count {
                    words
                        .iter()
                        .filter_map(|w| {
                            left.weight_of_word(w).or_else(|| right.weight_of_word(w))
                        })
                        .map(|weight| weight.get(size).copied().unwrap_or(0))
                        .sum()
                };
                assert_eq!(
                    intersection_counts[size],
                    multiplicity(&both),
                    "seed {seed}"
                );
                assert_eq!(union_counts[size], multiplicity(&either), "seed {seed}");
            }
        }
    }

    #[test]
    fn weighted_products_with_independent_weights() {
        for seed in SEEDS {
            let mut rng = fastrand::Rng::with_seed(seed);
            let left = random_wfsm(&mut rng, 2, 3, 0.8, 2);
            let right = random_wfsm(&mut rng, 2, 3, 0.8, 2);

            // every word in the intersection is read with the same weight by both operands
            let intersection = left.intersection(&right).unwrap();
            for _ in 0..50 {
                let word = random_word(&mut rng, left.alphabet(), 0, 8);
                if intersection.process_word(&word) {
                    assert!(left.process_word(&word) && right.process_word(&word));
                    let weight = intersection.weight_of_word(&word);
                    assert_eq!(weight, left.weight_of_word(&word), "seed {seed}");
                    assert_eq!(weight, right.weight_of_word(&word), "seed {seed}");
                }
            }

            match left.union(&right) {
                Ok(union) => {
                    for _ in 0..50 {
                        let word = random_word(&mut rng, left.alphabet(), 0, 8);
                        let (l, r) = (left.process_word(&word), right.process_word(&word));
                        assert_eq!(union.process_word(&word), l || r, "seed {seed}");
                        if l {
                            assert_eq!(union.weight_of_word(&word), left.weight_of_word(&word));
                        } else if r {
                            assert_eq!(union.weight_of_word(&word), right.weight_of_word(&word));
                        }
                    }
                }
                Err(FsmError::ConflictingWeights { .. }) => {}
                Err(e) => panic!("unexpected error {e}"),
            }
        }
    }
}
