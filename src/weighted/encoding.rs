use bit_set::BitSet;
use itertools::Itertools;
use tracing::debug;

use super::{Weight, Wfsm};
use crate::{
    alphabet::Alphabet,
    error::FsmError,
    fsm::{Fsm, TransitionTable},
    math::{Bijection, Map},
    Symbol,
};

/// Translates the synthetic symbols of encoded weighted automata back into pairs of symbol and
/// weight. It is produced by [`Wfsm::convert_wfsm_to_fsm`] and consumed by
/// [`Wfsm::convert_fsm_to_wfsm`].
///
/// Besides the translation, the table remembers the union of the alphabets of the encoded
/// automata, so that decoding restores symbols which no transition uses.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodeTable<S: Symbol = char> {
    symbols: Bijection<usize, (S, Weight)>,
    alphabet: Alphabet<S>,
}

impl<S: Symbol> DecodeTable<S> {
    /// Returns the number of synthetic symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if no synthetic symbol has been assigned.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns the symbol and weight that the `synthetic` symbol stands for.
    pub fn get(&self, synthetic: usize) -> Option<&(S, Weight)> {
        self.symbols.get_by_left(&synthetic)
    }

    /// Returns the synthetic symbol that encodes `symbol` carrying `weight`, if there is one.
    pub fn synthetic(&self, symbol: &S, weight: &Weight) -> Option<usize> {
        self.symbols
            .get_by_right(&(symbol.clone(), weight.clone()))
            .copied()
    }

    /// Gives a reference to the union of the alphabets of all encoded automata.
    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// Iterates over the synthetic symbols in ascending order together with what they encode.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &S, &Weight)> + '_ {
        self.symbols
            .iter()
            .map(|(synthetic, (symbol, weight))| (*synthetic, symbol, weight))
    }
}

impl<S: Symbol> std::fmt::Debug for DecodeTable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(synthetic, symbol, weight)| {
                (synthetic, format!("{:?}[{}]", symbol, weight))
            }))
            .finish()
    }
}

impl<S: Symbol> Wfsm<S> {
    /// Encodes the given weighted automata as ordinary automata over a shared synthetic alphabet.
    /// Every distinct pair of symbol and weight that appears on a transition of any of the
    /// `machines` is replaced by a synthetic symbol, the pairs are numbered in the order in which
    /// they are first encountered. The alphabet of each encoded automaton consists of the
    /// synthetic symbols it uses, its states are the same as before.
    ///
    /// Encoding several automata at once ensures that they agree on the synthetic symbols, which is
    /// necessary to combine them. The returned [`DecodeTable`] reverts the encoding, see
    /// [`Wfsm::convert_fsm_to_wfsm`].
    ///
    /// # Example
    /// ```
    /// use finite_state_machines::prelude::*;
    /// let light = Wfsm::new(['a'], 1, 0, [0], [((0, 'a'), (0, Weight::x()))]).unwrap();
    /// let heavy = Wfsm::new(['a'], 1, 0, [0], [((0, 'a'), (0, Weight::monomial(2).unwrap()))])
    ///     .unwrap();
    /// let (encoded, table) = Wfsm::convert_wfsm_to_fsm([&light, &heavy]);
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(encoded[1].alphabet().as_slice(), &[1]);
    /// let decoded = Wfsm::convert_fsm_to_wfsm(&encoded[1], &table).unwrap();
    /// assert_eq!(decoded, heavy);
    /// ```
    pub fn convert_wfsm_to_fsm<'a, I>(machines: I) -> (Vec<Fsm<usize>>, DecodeTable<S>)
    where
        I: IntoIterator<Item = &'a Wfsm<S>>,
        S: 'a,
    {
        let machines = machines.into_iter().collect_vec();
        let mut symbols: Bijection<usize, (S, Weight)> = Bijection::new();
        let mut encoded = Vec::with_capacity(machines.len());

        for machine in &machines {
            let transitions = machine
                .transitions()
                .map(|(q, symbol, p, weight)| {
                    let pair = (symbol.clone(), weight.clone());
                    let synthetic = match symbols.get_by_right(&pair) {
                        Some(&synthetic) => synthetic,
                        None => {
                            let synthetic = symbols.len();
                            symbols.insert(synthetic, pair);
                            synthetic
                        }
                    };
                    (q, synthetic, p)
                })
                .collect_vec();

            let alphabet: Alphabet<usize> = transitions.iter().map(|(_, a, _)| *a).collect();
            let mut table =
                TransitionTable::new(machine.num_states(), alphabet.size(), transitions.len());
            for (q, synthetic, p) in transitions {
                if let Some(position) = alphabet.position(&synthetic) {
                    table.insert(q, position, p);
                }
            }
            let accepting: BitSet = machine.accepting().collect();
            encoded.push(Fsm::from_parts(alphabet, machine.start(), accepting, table));
        }

        let alphabet = Alphabet::new(
            machines
                .iter()
                .flat_map(|machine| machine.alphabet().universe().cloned()),
        );
        debug!(
            "encoded {} weighted automata with {} synthetic symbols",
            encoded.len(),
            symbols.len()
        );
        (encoded, DecodeTable { symbols, alphabet })
    }

    /// Decodes an automaton over synthetic symbols back into a weighted automaton, using a `table`
    /// produced by [`Wfsm::convert_wfsm_to_fsm`]. The alphabet of the result is the one recorded
    /// in the table.
    ///
    /// Fails with [`FsmError::UnknownSyntheticSymbol`] if `machine` uses a symbol that the table
    /// does not know. As the decoded automaton must be deterministic, it also fails with
    /// [`FsmError::ConflictingWeights`] if two synthetic symbols leaving the same state decode to
    /// the same symbol with different weights.
    pub fn convert_fsm_to_wfsm(
        machine: &Fsm<usize>,
        table: &DecodeTable<S>,
    ) -> Result<Self, FsmError> {
        let alphabet = table.alphabet().clone();
        let mut transitions =
            TransitionTable::new(machine.num_states(), alphabet.size(), machine.table().len());
        let mut weights = Map::default();

        for (q, &synthetic, p) in machine.transitions() {
            let (symbol, weight) = table
                .get(synthetic)
                .ok_or(FsmError::UnknownSyntheticSymbol(synthetic))?;
            let position = alphabet
                .position(symbol)
                .ok_or_else(|| FsmError::UnknownSymbol(format!("{:?}", symbol)))?;
            if transitions.insert(q, position, p).is_some() {
                return Err(FsmError::ConflictingWeights {
                    state: q,
                    symbol: format!("{:?}", symbol),
                });
            }
            weights.insert((q, position), weight.clone());
        }

        let accepting: BitSet = machine.accepting().collect();
        let skeleton = Fsm::from_parts(alphabet, machine.start(), accepting, transitions);
        Ok(Self::from_parts(skeleton, weights))
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::weighted::tests::{compositions, ends_in_heavy_b};

    #[test]
    fn encoding_round_trip_restores_the_automaton() {
        for wfsm in [compositions(), ends_in_heavy_b()] {
            let (encoded, table) = Wfsm::convert_wfsm_to_fsm([&wfsm]);
            assert_eq!(encoded.len(), 1);
            assert_eq!(encoded[0].num_states(), wfsm.num_states());
            let decoded = Wfsm::convert_fsm_to_wfsm(&encoded[0], &table).unwrap();
            assert_eq!(decoded, wfsm);
            assert_eq!(
                decoded.smart_enumeration(15).unwrap(),
                wfsm.smart_enumeration(15).unwrap()
            );
        }
    }

    #[test]
    fn encoded_automata_accept_the_encoded_words() {
        let wfsm = ends_in_heavy_b();
        let (encoded, table) = Wfsm::convert_wfsm_to_fsm([&wfsm]);
        let a = table.synthetic(&'a', &Weight::x()).unwrap();
        let b = table.synthetic(&'b', &Weight::monomial(3).unwrap()).unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(table.get(b), Some(&('b', Weight::monomial(3).unwrap())));
        assert!(encoded[0].process_word([a, a, b]));
        assert!(!encoded[0].process_word([a, b, b]));
        // counting by length in the encoding counts the symbols, not the sizes
        assert_eq!(encoded[0].smart_enumeration(3), vec![0, 1, 1, 2]);
    }

    #[test]
    fn synthetic_symbols_are_shared() {
        let light = Wfsm::new(
            ['a', 'b'],
            1,
            0,
            [0],
            [((0, 'a'), (0, Weight::x())), ((0, 'b'), (0, Weight::x()))],
        )
        .unwrap();
        let heavy = Wfsm::new(
            ['a', 'c'],
            1,
            0,
            [0],
            [
                ((0, 'a'), (0, Weight::x())),
                ((0, 'c'), (0, Weight::monomial(2).unwrap())),
            ],
        )
        .unwrap();
        let (encoded, table) = Wfsm::convert_wfsm_to_fsm([&light, &heavy]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.alphabet().as_slice(), &['a', 'b', 'c']);
        assert_eq!(encoded[0].alphabet().as_slice(), &[0, 1]);
        assert_eq!(encoded[1].alphabet().as_slice(), &[0, 2]);
        assert_eq!(
            table.iter().map(|(s, _, _)| s).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        // decoding restores the symbols that are not used by the machine
        let decoded = Wfsm::convert_fsm_to_wfsm(&encoded[0], &table).unwrap();
        assert_eq!(decoded.alphabet().as_slice(), &['a', 'b', 'c']);
        assert_eq!(decoded.transition(0, &'c'), None);
        assert_eq!(
            decoded.smart_enumeration(5).unwrap(),
            light.smart_enumeration(5).unwrap()
        );
    }

    #[test]
    fn same_symbol_with_different_weights_is_encoded_twice() {
        let first = compositions();
        let light = Wfsm::new(['a'], 1, 0, [0], [((0, 'a'), (0, Weight::x()))]).unwrap();
        let (_, table) = Wfsm::convert_wfsm_to_fsm([&first, &light]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.synthetic(&'a', &Weight::monomial(2).unwrap()),
            None,
            "the pair is only encoded when it appears on a transition"
        );
        assert_eq!(table.synthetic(&'b', &Weight::monomial(2).unwrap()), Some(1));

        let heavy = Wfsm::new(['a'], 1, 0, [0], [((0, 'a'), (0, Weight::monomial(2).unwrap()))])
            .unwrap();
        let (_, table) = Wfsm::convert_wfsm_to_fsm([&first, &heavy]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.synthetic(&'a', &Weight::monomial(2).unwrap()), Some(2));
    }

    #[test]
    fn decoding_detects_unknown_and_conflicting_symbols() {
        let (_, table) = Wfsm::convert_wfsm_to_fsm([&compositions()]);

        let unknown = Fsm::new([7usize], 1, 0, [0], [((0, 7), 0)]).unwrap();
        assert_eq!(
            Wfsm::convert_fsm_to_wfsm(&unknown, &table).unwrap_err(),
            FsmError::UnknownSyntheticSymbol(7)
        );

        let light = Wfsm::new(['a'], 1, 0, [0], [((0, 'a'), (0, Weight::x()))]).unwrap();
        let heavy = Wfsm::new(['a'], 1, 0, [0], [((0, 'a'), (0, Weight::monomial(2).unwrap()))])
            .unwrap();
        let (_, table) = Wfsm::convert_wfsm_to_fsm([&light, &heavy]);
        let both = Fsm::new([0usize, 1], 1, 0, [0], [((0, 0), 0), ((0, 1), 0)]).unwrap();
        assert!(matches!(
            Wfsm::convert_fsm_to_wfsm(&both, &table),
            Err(FsmError::ConflictingWeights { state: 0, .. })
        ));
    }

    #[test]
    fn encoding_nothing() {
        let (encoded, table) = Wfsm::<char>::convert_wfsm_to_fsm([]);
        assert!(encoded.is_empty());
        assert!(table.is_empty());
        assert!(table.alphabet().is_empty());
    }
}
