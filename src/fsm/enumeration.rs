use tracing::trace;

use super::{Fsm, WordLevel};
use crate::{
    math::{self, Count, OrderedSet},
    Symbol,
};

impl<S: Symbol> Fsm<S> {
    /// Returns the set of words of the given `length` that are accepted.
    ///
    /// The words are computed level by level: level zero consists of the empty word, which ends
    /// in the initial state, and level `k` is obtained by extending the words of level `k - 1`
    /// along every transition. All levels up to `length` are cached inside the automaton,
    /// so subsequent calls for smaller or slightly larger lengths are cheap.
    pub fn words_generated(&self, length: usize) -> OrderedSet<Vec<S>> {
        self.fill_word_cache(length);
        let cache = self.word_cache.borrow();
        let words = self
            .accepting
            .iter()
            .filter_map(|q| cache[length].get(&q))
            .flatten()
            .cloned()
            .collect();
        words
    }

    fn fill_word_cache(&self, length: usize) {
        let mut cache = self.word_cache.borrow_mut();
        if cache.is_empty() {
            let mut initial = WordLevel::default();
            initial.insert(self.start, OrderedSet::from([vec![]]));
            cache.push(initial);
        }
        while cache.len() <= length {
            let last = cache.last().expect("level zero is always present");
            let mut next = WordLevel::<S>::default();
            for (&q, words) in last {
                for (symbol, p) in self.table.successors(q) {
                    let symbol = &self.alphabet.as_slice()[symbol];
                    next.entry(p).or_default().extend(words.iter().map(|w| {
                        let mut extended = w.clone();
                        extended.push(symbol.clone());
                        extended
                    }));
                }
            }
            trace!("cached words of length {}", cache.len());
            cache.push(next);
        }
    }

    /// Returns the accepted words of the given `length` by running every word of that length over
    /// the alphabet. This is only meant as an oracle for testing [`Fsm::words_generated`], as its
    /// running time is exponential in `length`.
    pub fn brute_words_generated(&self, length: usize) -> OrderedSet<Vec<S>> {
        let mut words: Vec<Vec<S>> = vec![vec![]];
        for _ in 0..length {
            words = words
                .into_iter()
                .flat_map(|w| {
                    self.alphabet.universe().map(move |symbol| {
                        let mut extended = w.clone();
                        extended.push(symbol.clone());
                        extended
                    })
                })
                .collect();
        }
        words
            .into_iter()
            .filter(|w| self.process_word(w))
            .collect()
    }

    /// Returns the number of accepted words of the given `length` by enumerating them explicitly.
    /// Prefer [`Fsm::smart_enumeration`], which does not materialize any word.
    pub fn brute_enumeration(&self, length: usize) -> Count {
        self.words_generated(length).len() as Count
    }

    /// Returns the counting sequence of accepted words up to the given `length`, i.e. a vector
    /// whose `n`-th entry is the number of accepted words of length `n`.
    ///
    /// Only the number of words ending in each state is tracked, using one vector for the current
    /// length and one for the next.
    ///
    /// # Example
    /// ```
    /// use finite_state_machines::prelude::*;
    /// let ab_free = Fsm::fsm_for_words_avoiding(['a', 'b'], None);
    /// assert_eq!(ab_free.smart_enumeration(4), vec![1, 2, 3, 4, 5]);
    /// ```
    pub fn smart_enumeration(&self, length: usize) -> Vec<Count> {
        let mut counts: Vec<Count> = vec![0; self.num_states()];
        counts[self.start] = 1;
        let mut enumeration = Vec::with_capacity(length + 1);
        enumeration.push(math::sum_at(&counts, self.accepting.iter()));

        let mut next: Vec<Count> = vec![0; self.num_states()];
        for _ in 0..length {
            next.iter_mut().for_each(|c| *c = 0);
            for (q, _, p) in self.table.iter() {
                next[p] = next[p].saturating_add(counts[q]);
            }
            std::mem::swap(&mut counts, &mut next);
            enumeration.push(math::sum_at(&counts, self.accepting.iter()));
        }
        enumeration
    }
}
