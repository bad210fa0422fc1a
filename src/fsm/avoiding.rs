use bit_set::BitSet;

use super::{Fsm, TransitionTable};
use crate::{alphabet::Alphabet, Symbol};

impl<S: Symbol> Fsm<S> {
    /// Returns an automaton that accepts precisely the words which do not contain `pattern` as a
    /// contiguous factor. If no `alphabet` is given, it consists of the symbols that appear in
    /// `pattern`.
    ///
    /// State `i` (for `i < pattern.len()`) means that the longest suffix of the input read so far
    /// which is a prefix of `pattern` has length `i`. When the next symbol does not extend this
    /// prefix, the automaton falls back to the longest suffix of the matched prefix extended by the
    /// symbol that is again a prefix of `pattern`. The state `pattern.len()` is reached once the
    /// pattern has been seen, it is rejecting and absorbing.
    ///
    /// # Example
    /// ```
    /// use finite_state_machines::prelude::*;
    /// let no_double_a = Fsm::fsm_for_words_avoiding("aa".chars(), Some(&Alphabet::new(['a', 'b'])));
    /// assert!(no_double_a.process_word("abab".chars()));
    /// assert!(!no_double_a.process_word("baab".chars()));
    /// ```
    pub fn fsm_for_words_avoiding<P>(pattern: P, alphabet: Option<&Alphabet<S>>) -> Self
    where
        P: IntoIterator<Item = S>,
    {
        let pattern: Vec<S> = pattern.into_iter().collect();
        let alphabet = match alphabet {
            Some(alphabet) => alphabet.clone(),
            None => Alphabet::new(pattern.iter().cloned()),
        };
        let matched = pattern.len();

        let size = (matched + 1) * alphabet.size();
        let mut table = TransitionTable::new(matched + 1, alphabet.size(), size);
        for state in 0..matched {
            for (position, symbol) in alphabet.universe().enumerate() {
                let target = if *symbol == pattern[state] {
                    state + 1
                } else {
                    fallback(&pattern, state, symbol)
                };
                table.insert(state, position, target);
            }
        }
        for position in 0..alphabet.size() {
            table.insert(matched, position, matched);
        }

        let accepting: BitSet = (0..matched).collect();
        Self::from_parts(alphabet, 0, accepting, table)
    }
}

/// Computes the length of the longest proper suffix of `pattern[..state]` followed by `symbol`
/// that is a prefix of `pattern`.
fn fallback<S: Symbol>(pattern: &[S], state: usize, symbol: &S) -> usize {
    (1..=state)
        .map(|skip| state + 1 - skip)
        .find(|&length| {
            pattern[state + 1 - length..state] == pattern[..length - 1]
                && pattern[length - 1] == *symbol
        })
        .unwrap_or(0)
}
