use std::{borrow::Borrow, cell::RefCell};

use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::trace;

use crate::{
    alphabet::Alphabet,
    error::FsmError,
    fsm::{Fsm, WordLevel},
    math::{Count, Map},
    Symbol,
};

mod weight;
pub use weight::Weight;

mod encoding;
pub use encoding::DecodeTable;

mod enumeration;

mod operations;

/// A deterministic finite automaton whose transitions carry a [`Weight`].
///
/// The underlying automaton (see [`Wfsm::skeleton`]) determines which words are accepted, while the
/// weights determine their *size*: the weight of a word is the product of the weights along its
/// run and the exponents of this product are the sizes the word can have. If every weight is `x`,
/// the size of a word is its length.
///
/// Union, intersection and minimization are not implemented on weighted automata directly.
/// Instead, the weighted automata are encoded as ordinary [`Fsm`]s over a synthetic alphabet, in
/// which each combination of symbol and weight is a separate symbol, see
/// [`Wfsm::convert_wfsm_to_fsm`].
pub struct Wfsm<S: Symbol = char> {
    skeleton: Fsm<S>,
    weights: Map<(usize, usize), Weight>,
    max_degree: usize,
    word_cache: RefCell<Vec<WordLevel<S>>>,
}

impl<S: Symbol> Wfsm<S> {
    /// Builds a new weighted automaton. The arguments are the same as for [`Fsm::new`], except that
    /// each transition additionally carries a [`Weight`]. Fails under the same conditions as
    /// [`Fsm::new`] and additionally if two transitions for the same state and symbol carry
    /// different weights.
    pub fn new<A, F, T>(
        alphabet: A,
        num_states: usize,
        start: usize,
        accepting: F,
        weighted_transitions: T,
    ) -> Result<Self, FsmError>
    where
        A: IntoIterator<Item = S>,
        F: IntoIterator<Item = usize>,
        T: IntoIterator<Item = ((usize, S), (usize, Weight))>,
    {
        let weighted_transitions = weighted_transitions.into_iter().collect_vec();
        let skeleton = Fsm::new(
            alphabet,
            num_states,
            start,
            accepting,
            weighted_transitions
                .iter()
                .map(|((q, symbol), (p, _))| ((*q, symbol.clone()), *p)),
        )?;

        let mut weights = Map::default();
        for ((q, symbol), (_, weight)) in weighted_transitions {
            let position = skeleton
                .alphabet()
                .position(&symbol)
                .ok_or_else(|| FsmError::UnknownSymbol(format!("{:?}", symbol)))?;
            if let Some(previous) = weights.insert((q, position), weight.clone()) {
                if previous != weight {
                    return Err(FsmError::NonDeterministic {
                        state: q,
                        symbol: format!("{:?}", symbol),
                    });
                }
            }
        }
        Ok(Self::from_parts(skeleton, weights))
    }

    /// Assembles a weighted automaton from an automaton and weights for each of its transitions,
    /// keyed by state and position of the symbol.
    pub(crate) fn from_parts(skeleton: Fsm<S>, weights: Map<(usize, usize), Weight>) -> Self {
        debug_assert_eq!(skeleton.table().len(), weights.len());
        let max_degree = weights.values().map(Weight::degree).max().unwrap_or(0);
        Self {
            skeleton,
            weights,
            max_degree,
            word_cache: RefCell::new(vec![]),
        }
    }

    /// Gives access to the unweighted automaton obtained by forgetting all weights.
    pub fn skeleton(&self) -> &Fsm<S> {
        &self.skeleton
    }

    /// Gives a reference to the alphabet.
    pub fn alphabet(&self) -> &Alphabet<S> {
        self.skeleton.alphabet()
    }

    /// Returns the number of states.
    pub fn num_states(&self) -> usize {
        self.skeleton.num_states()
    }

    /// Returns the index of the initial state.
    pub fn start(&self) -> usize {
        self.skeleton.start()
    }

    /// Iterates over the indices of the accepting states in ascending order.
    pub fn accepting(&self) -> impl Iterator<Item = usize> + '_ {
        self.skeleton.accepting()
    }

    /// Checks whether `state` is accepting.
    pub fn is_accepting(&self, state: usize) -> bool {
        self.skeleton.is_accepting(state)
    }

    /// Returns the highest exponent that appears in any of the weights.
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Returns true if and only if every state has a transition on every symbol.
    pub fn has_explicit_garbage(&self) -> bool {
        self.skeleton.has_explicit_garbage()
    }

    /// Returns true if every weight only has coefficients `0` and `1`.
    pub fn has_unit_coefficients(&self) -> bool {
        self.weights.values().all(Weight::has_unit_coefficients)
    }

    /// Returns the target and weight of the transition from `state` on `symbol`, if it exists.
    pub fn transition(&self, state: usize, symbol: &S) -> Option<(usize, &Weight)> {
        let target = self.skeleton.transition(state, symbol)?;
        let position = self.alphabet().position(symbol)?;
        Some((target, &self.weights[&(state, position)]))
    }

    /// Iterates over all transitions as quadruples of source, symbol, target and weight, ordered
    /// by source and symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, &S, usize, &Weight)> + '_ {
        self.skeleton.table().iter().map(|(q, symbol, p)| {
            (
                q,
                &self.alphabet().as_slice()[symbol],
                p,
                &self.weights[&(q, symbol)],
            )
        })
    }

    /// Iterates over the transitions as quadruples of source, symbol position, target and weight.
    pub(crate) fn positional_transitions(
        &self,
    ) -> impl Iterator<Item = (usize, usize, usize, &Weight)> + '_ {
        self.skeleton
            .table()
            .iter()
            .map(|(q, symbol, p)| (q, symbol, p, &self.weights[&(q, symbol)]))
    }

    /// Returns whether `word` is accepted, the weights play no role in this.
    pub fn process_word<W>(&self, word: W) -> bool
    where
        W: IntoIterator,
        W::Item: Borrow<S>,
    {
        self.skeleton.process_word(word)
    }

    /// Computes the weight of `word`, which is the product of the weights along its run, given by
    /// its coefficients. Returns `None` if the run is not defined, the acceptance of `word` plays
    /// no role. The weight of the empty word is `1`.
    pub fn weight_of_word<W>(&self, word: W) -> Option<Vec<Count>>
    where
        W: IntoIterator,
        W::Item: Borrow<S>,
    {
        let mut state = self.start();
        let mut product = vec![1];
        for symbol in word {
            let (next, weight) = self.transition(state, symbol.borrow())?;
            product = weight.multiply(&product);
            state = next;
        }
        Some(product)
    }

    /// Adds an explicit garbage state as [`Fsm::add_explicit_garbage`] does. Every transition that
    /// is added carries the weight `x`.
    pub fn add_explicit_garbage(&mut self) {
        if self.has_explicit_garbage() {
            return;
        }
        self.skeleton.add_explicit_garbage();
        for (q, symbol, _) in self.skeleton.table().iter() {
            self.weights.entry((q, symbol)).or_insert_with(Weight::x);
        }
        self.max_degree = self.max_degree.max(1);
        trace!("added explicit garbage state to weighted automaton");
    }

    /// Consumes `self` and returns it with an explicit garbage state.
    pub fn with_explicit_garbage(mut self) -> Self {
        self.add_explicit_garbage();
        self
    }
}

impl<S: Symbol> Fsm<S> {
    /// Turns `self` into a weighted automaton by giving every transition on a symbol the weight
    /// that `letter_weights` assigns to the symbol. The symbols that are given a weight must be
    /// precisely those of the alphabet, otherwise [`FsmError::WeightKeysMismatch`] is returned.
    pub fn convert_to_wfsm<I>(&self, letter_weights: I) -> Result<Wfsm<S>, FsmError>
    where
        I: IntoIterator<Item = (S, Weight)>,
    {
        let mut by_position = vec![None; self.alphabet().size()];
        for (symbol, weight) in letter_weights {
            let position = self
                .alphabet()
                .position(&symbol)
                .ok_or(FsmError::WeightKeysMismatch)?;
            by_position[position] = Some(weight);
        }
        let by_position: Vec<Weight> = by_position
            .into_iter()
            .collect::<Option<_>>()
            .ok_or(FsmError::WeightKeysMismatch)?;

        let weights = self
            .table()
            .iter()
            .map(|(q, symbol, _)| ((q, symbol), by_position[symbol].clone()))
            .collect();
        Ok(Wfsm::from_parts(self.clone(), weights))
    }
}

impl<S: Symbol> Clone for Wfsm<S> {
    fn clone(&self) -> Self {
        Self {
            skeleton: self.skeleton.clone(),
            weights: self.weights.clone(),
            max_degree: self.max_degree,
            word_cache: self.word_cache.clone(),
        }
    }
}

impl<S: Symbol> PartialEq for Wfsm<S> {
    fn eq(&self, other: &Self) -> bool {
        self.skeleton == other.skeleton && self.weights == other.weights
    }
}

impl<S: Symbol> Eq for Wfsm<S> {}

impl<S: Symbol> std::fmt::Debug for Wfsm<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wfsm")
            .field("alphabet", self.alphabet())
            .field("num_states", &self.num_states())
            .field("start", &self.start())
            .field("accepting", &self.accepting().collect_vec())
            .field("transitions", &self.transitions().collect_vec())
            .finish()
    }
}

impl<S: Symbol> std::fmt::Display for Wfsm<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string())
                .chain(self.alphabet().universe().map(|s| format!("{:?}", s))),
        );
        for q in 0..self.num_states() {
            let mut label = if q == self.start() {
                format!("-> {q}")
            } else {
                q.to_string()
            };
            if self.is_accepting(q) {
                label = label.green().bold().to_string();
            }
            let mut row = vec![label];
            for symbol in self.alphabet().universe() {
                row.push(match self.transition(q, symbol) {
                    Some((p, weight)) => format!("{p} [{weight}]"),
                    None => "-".to_string(),
                });
            }
            builder.push_record(row);
        }
        let table = builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string();
        write!(f, "{table}")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::prelude::*;

    /// Compositions of a number into parts `1` (written `a`) and `2` (written `b`).
    pub fn compositions() -> Wfsm {
        Wfsm::new(
            ['a', 'b'],
            1,
            0,
            [0],
            [
                ((0, 'a'), (0, Weight::x())),
                ((0, 'b'), (0, Weight::monomial(2).unwrap())),
            ],
        )
        .unwrap()
    }

    /// Words over `a` and `b` that end in `b`, where `a` has size 1 and `b` has size 3. The
    /// transition function is partial, as `b` cannot be read twice in a row.
    pub fn ends_in_heavy_b() -> Wfsm {
        Wfsm::new(
            ['a', 'b'],
            2,
            0,
            [1],
            [
                ((0, 'a'), (0, Weight::x())),
                ((0, 'b'), (1, Weight::monomial(3).unwrap())),
                ((1, 'a'), (0, Weight::x())),
            ],
        )
        .unwrap()
    }

    #[test]
    fn construction_is_validated() {
        let conflicting = Wfsm::new(
            ['a'],
            1,
            0,
            [0],
            [
                ((0, 'a'), (0, Weight::x())),
                ((0, 'a'), (0, Weight::monomial(2).unwrap())),
            ],
        );
        assert!(matches!(
            conflicting,
            Err(FsmError::NonDeterministic { state: 0, .. })
        ));
        let unknown = Wfsm::new(['a'], 1, 0, [0], [((0, 'b'), (0, Weight::x()))]);
        assert!(matches!(unknown, Err(FsmError::UnknownSymbol(_))));
        assert_eq!(compositions().max_degree(), 2);
        assert!(compositions().has_unit_coefficients());
    }

    #[test]
    fn weighted_transitions() {
        let wfsm = ends_in_heavy_b();
        assert_eq!(
            wfsm.transition(0, &'b'),
            Some((1, &Weight::monomial(3).unwrap()))
        );
        assert_eq!(wfsm.transition(1, &'b'), None);
        assert_eq!(wfsm.transitions().count(), 3);
        assert!(wfsm.process_word("aab".chars()));
        assert!(!wfsm.process_word("abb".chars()));
        assert_eq!(wfsm.weight_of_word("ab".chars()), Some(vec![0, 0, 0, 0, 1]));
        assert_eq!(wfsm.weight_of_word("".chars()), Some(vec![1]));
        assert_eq!(wfsm.weight_of_word("bb".chars()), None);
    }

    #[test_log::test]
    fn weighted_explicit_garbage() {
        let mut wfsm = ends_in_heavy_b();
        wfsm.add_explicit_garbage();
        assert!(wfsm.has_explicit_garbage());
        assert_eq!(wfsm.num_states(), 3);
        assert_eq!(wfsm.transition(1, &'b'), Some((2, &Weight::x())));
        assert_eq!(wfsm.transition(2, &'a'), Some((2, &Weight::x())));
        let once = wfsm.clone();
        wfsm.add_explicit_garbage();
        assert_eq!(wfsm, once);
        assert_eq!(
            wfsm.smart_enumeration(10).unwrap(),
            ends_in_heavy_b().smart_enumeration(10).unwrap()
        );
    }

    #[test]
    fn garbage_raises_the_degree_of_transitionless_automata() {
        let mut wfsm = Wfsm::new(['a'], 1, 0, [0], []).unwrap();
        assert_eq!(wfsm.max_degree(), 0);
        wfsm.add_explicit_garbage();
        assert_eq!(wfsm.max_degree(), 1);
        assert_eq!(wfsm.smart_enumeration(3).unwrap(), vec![1, 0, 0, 0]);
    }

    #[test]
    fn converting_automata_to_weighted_ones() {
        let fsm = Fsm::fsm_for_words_avoiding("bb".chars(), Some(&Alphabet::new(['a', 'b'])));
        let mismatched = fsm.convert_to_wfsm([('a', Weight::x())]);
        assert_eq!(mismatched.unwrap_err(), FsmError::WeightKeysMismatch);
        let foreign = fsm.convert_to_wfsm([
            ('a', Weight::x()),
            ('b', Weight::x()),
            ('c', Weight::x()),
        ]);
        assert_eq!(foreign.unwrap_err(), FsmError::WeightKeysMismatch);

        let unit = fsm
            .convert_to_wfsm([('a', Weight::x()), ('b', Weight::x())])
            .unwrap();
        assert_eq!(
            unit.smart_enumeration(8).unwrap(),
            fsm.smart_enumeration(8)
        );

        let heavy = fsm
            .convert_to_wfsm([('a', Weight::x()), ('b', Weight::monomial(2).unwrap())])
            .unwrap();
        assert_eq!(heavy.transition(1, &'a'), Some((0, &Weight::x())));
        assert_eq!(heavy.max_degree(), 2);
    }

    #[test]
    fn display_shows_weights() {
        let shown = ends_in_heavy_b().to_string();
        assert!(shown.contains("1 [x^3]"));
        assert!(shown.contains("0 [x]"));
        assert!(shown.contains("-> 0"));
    }
}
