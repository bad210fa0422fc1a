use std::collections::VecDeque;

use tracing::trace;

use super::Wfsm;
use crate::{
    error::FsmError,
    fsm::WordLevel,
    math::{self, Count, OrderedSet},
    Symbol,
};

impl<S: Symbol> Wfsm<S> {
    fn ensure_unit_coefficients(&self, operation: &str) -> Result<(), FsmError> {
        if self.has_unit_coefficients() {
            Ok(())
        } else {
            Err(FsmError::Unsupported(format!(
                "{operation} requires every coefficient of every weight to be 0 or 1"
            )))
        }
    }

    /// Returns the set of accepted words of the given `size`, where the size of a word is an
    /// exponent of its weight.
    ///
    /// Words of size `n` are obtained from words of size `n - k` for `k` between one and
    /// [`Wfsm::max_degree`], by extending them along a transition whose weight contains `x^k`.
    /// All sizes up to `size` are cached. Counting words by their size is only meaningful if no
    /// weight has a coefficient larger than one, otherwise [`FsmError::Unsupported`] is returned.
    pub fn words_generated(&self, size: usize) -> Result<OrderedSet<Vec<S>>, FsmError> {
        self.ensure_unit_coefficients("words_generated")?;
        self.fill_word_cache(size);
        let cache = self.word_cache.borrow();
        let words = self
            .accepting()
            .filter_map(|q| cache[size].get(&q))
            .flatten()
            .cloned()
            .collect();
        Ok(words)
    }

    fn fill_word_cache(&self, size: usize) {
        let mut cache = self.word_cache.borrow_mut();
        if cache.is_empty() {
            let mut initial = WordLevel::default();
            initial.insert(self.start(), OrderedSet::from([vec![]]));
            cache.push(initial);
        }
        while cache.len() <= size {
            let current = cache.len();
            let mut next = WordLevel::<S>::default();
            for (q, symbol, p, weight) in self.transitions() {
                for (exponent, _) in weight.terms() {
                    let Some(previous) = current.checked_sub(exponent) else {
                        break;
                    };
                    if let Some(words) = cache[previous].get(&q) {
                        next.entry(p).or_default().extend(words.iter().map(|w| {
                            let mut extended = w.clone();
                            extended.push(symbol.clone());
                            extended
                        }));
                    }
                }
            }
            trace!("cached weighted words of size {current}");
            cache.push(next);
        }
    }

    /// Returns the accepted words of the given `size` by running every word that is short enough
    /// and checking its weight. This is an oracle for testing [`Wfsm::words_generated`], its
    /// running time is exponential in `size`.
    pub fn brute_words_generated(&self, size: usize) -> Result<OrderedSet<Vec<S>>, FsmError> {
        self.ensure_unit_coefficients("brute_words_generated")?;
        // every transition increases the size by at least one
        let mut words: Vec<Vec<S>> = vec![vec![]];
        let mut found = OrderedSet::new();
        for length in 0..=size {
            let has_size = |word: &Vec<S>| {
                self.weight_of_word(word)
                    .is_some_and(|weight| weight.get(size).is_some_and(|c| *c > 0))
            };
            found.extend(
                words
                    .iter()
                    .filter(|w| self.process_word(*w) && has_size(*w))
                    .cloned(),
            );
            if length < size {
                words = words
                    .into_iter()
                    .flat_map(|w| {
                        self.alphabet().universe().map(move |symbol| {
                            let mut extended = w.clone();
                            extended.push(symbol.clone());
                            extended
                        })
                    })
                    .collect();
            }
        }
        Ok(found)
    }

    /// Returns the number of accepted words of the given `size` by enumerating them.
    pub fn brute_enumeration(&self, size: usize) -> Result<Count, FsmError> {
        Ok(self.words_generated(size)?.len() as Count)
    }

    /// Returns the counting sequence of accepted words by size up to `size`, that is the first
    /// coefficients of the generating function of the accepted language.
    ///
    /// The number of words of size `n` ending in each state only depends on the counts of the
    /// previous [`Wfsm::max_degree`] sizes, so only a window of that many count vectors plus the
    /// current one is kept. Fails with [`FsmError::Unsupported`] if a weight has a coefficient
    /// larger than one.
    ///
    /// # Example
    /// ```
    /// use finite_state_machines::prelude::*;
    /// // compositions of n into parts 1 and 2
    /// let compositions = Wfsm::new(
    ///     ['a', 'b'],
    ///     1,
    ///     0,
    ///     [0],
    ///     [((0, 'a'), (0, Weight::x())), ((0, 'b'), (0, Weight::monomial(2).unwrap()))],
    /// )
    /// .unwrap();
    /// assert_eq!(compositions.smart_enumeration(6).unwrap(), vec![1, 1, 2, 3, 5, 8, 13]);
    /// ```
    pub fn smart_enumeration(&self, size: usize) -> Result<Vec<Count>, FsmError> {
        self.ensure_unit_coefficients("smart_enumeration")?;
        let degree = self.max_degree();
        let states = self.num_states();

        let mut window: VecDeque<Vec<Count>> = (0..=degree).map(|_| vec![0; states]).collect();
        window[degree][self.start()] = 1;
        let mut enumeration = Vec::with_capacity(size + 1);
        enumeration.push(math::sum_at(&window[degree], self.accepting()));

        for _ in 0..size {
            let mut next: Vec<Count> = vec![0; states];
            for (q, _, p, weight) in self.positional_transitions() {
                for (exponent, coefficient) in weight.terms() {
                    let contribution =
                        window[degree + 1 - exponent][q].saturating_mul(coefficient as Count);
                    next[p] = next[p].saturating_add(contribution);
                }
            }
            enumeration.push(math::sum_at(&next, self.accepting()));
            window.pop_front();
            window.push_back(next);
        }
        Ok(enumeration)
    }
}
