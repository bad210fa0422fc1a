use std::{borrow::Borrow, cell::RefCell, collections::VecDeque};

use bit_set::BitSet;
use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::trace;

use crate::{
    alphabet::Alphabet,
    error::FsmError,
    math::{Map, OrderedSet},
    Symbol,
};

mod table;
pub use table::TransitionTable;

mod enumeration;

mod product;
pub use product::Operation;

mod minimize;
pub use minimize::VERIFICATION_LENGTH;

mod avoiding;

/// Accepted words of one length, grouped by the state in which they end.
pub(crate) type WordLevel<S> = Map<usize, OrderedSet<Vec<S>>>;

/// A deterministic finite automaton over symbols of type `S`.
///
/// States are identified by the indices `0..num_states`. The transition function may be partial,
/// in which case every missing transition leads into an implicit garbage state that is rejecting
/// and absorbing. [`Fsm::add_explicit_garbage`] materializes this state, which makes the transition
/// function total. This is for example required by [`Fsm::minimize`].
///
/// Apart from [`Fsm::add_explicit_garbage`], automata are never modified after construction. The
/// words computed by [`Fsm::words_generated`] are cached per length inside the automaton.
pub struct Fsm<S: Symbol = char> {
    alphabet: Alphabet<S>,
    start: usize,
    accepting: BitSet,
    table: TransitionTable,
    word_cache: RefCell<Vec<WordLevel<S>>>,
}

impl<S: Symbol> Fsm<S> {
    /// Builds a new automaton with the given `alphabet` and `num_states` states, of which `start` is
    /// the initial one and `accepting` are the final ones. The `transitions` map a pair of state
    /// and symbol to the target state.
    ///
    /// Fails if a state index is out of bounds, a transition uses a symbol outside of the alphabet
    /// or if two transitions for the same state and symbol lead to different targets.
    pub fn new<A, F, T>(
        alphabet: A,
        num_states: usize,
        start: usize,
        accepting: F,
        transitions: T,
    ) -> Result<Self, FsmError>
    where
        A: IntoIterator<Item = S>,
        F: IntoIterator<Item = usize>,
        T: IntoIterator<Item = ((usize, S), usize)>,
    {
        let alphabet = Alphabet::new(alphabet);
        if start >= num_states {
            return Err(FsmError::InvalidStart { start, num_states });
        }
        let mut accepting_set = BitSet::with_capacity(num_states);
        for state in accepting {
            if state >= num_states {
                return Err(FsmError::InvalidAccepting { state, num_states });
            }
            accepting_set.insert(state);
        }

        let transitions = transitions.into_iter();
        let mut table =
            TransitionTable::new(num_states, alphabet.size(), transitions.size_hint().0);
        for ((origin, symbol), target) in transitions {
            if origin >= num_states || target >= num_states {
                return Err(FsmError::InvalidTransition {
                    origin,
                    target,
                    num_states,
                });
            }
            let position = alphabet
                .position(&symbol)
                .ok_or_else(|| FsmError::UnknownSymbol(format!("{:?}", symbol)))?;
            if let Some(previous) = table.insert(origin, position, target) {
                if previous != target {
                    return Err(FsmError::NonDeterministic {
                        state: origin,
                        symbol: format!("{:?}", symbol),
                    });
                }
            }
        }

        Ok(Self::from_parts(alphabet, start, accepting_set, table))
    }

    /// Assembles an automaton from parts that are known to be consistent.
    pub(crate) fn from_parts(
        alphabet: Alphabet<S>,
        start: usize,
        accepting: BitSet,
        table: TransitionTable,
    ) -> Self {
        debug_assert_eq!(alphabet.size(), table.symbols());
        debug_assert!(start < table.states());
        Self {
            alphabet,
            start,
            accepting,
            table,
            word_cache: RefCell::new(vec![]),
        }
    }

    /// Gives a reference to the alphabet.
    pub fn alphabet(&self) -> &Alphabet<S> {
        &self.alphabet
    }

    /// Returns the number of states.
    pub fn num_states(&self) -> usize {
        self.table.states()
    }

    /// Returns the index of the initial state.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Iterates over the indices of the accepting states in ascending order.
    pub fn accepting(&self) -> impl Iterator<Item = usize> + '_ {
        self.accepting.iter()
    }

    /// Checks whether `state` is accepting.
    pub fn is_accepting(&self, state: usize) -> bool {
        self.accepting.contains(state)
    }

    /// Gives access to the underlying transition table, where symbols are identified by their
    /// position in the alphabet.
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Returns the target of the transition from `state` on `symbol`, or `None` if the transition
    /// leads into the implicit garbage state or the symbol is unknown.
    pub fn transition(&self, state: usize, symbol: &S) -> Option<usize> {
        if state >= self.num_states() {
            return None;
        }
        self.table.get(state, self.alphabet.position(symbol)?)
    }

    /// Iterates over all defined transitions as triples of source, symbol and target.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, &S, usize)> + '_ {
        self.table
            .iter()
            .map(|(q, symbol, p)| (q, &self.alphabet.as_slice()[symbol], p))
    }

    /// Returns true if and only if every state has a transition on every symbol, i.e. the garbage
    /// state (if there is one) is explicit.
    pub fn has_explicit_garbage(&self) -> bool {
        self.table.is_total()
    }

    /// Runs `word` from the initial state and returns whether an accepting state is reached. If a
    /// transition is missing or a symbol is unknown, the word is rejected.
    pub fn process_word<W>(&self, word: W) -> bool
    where
        W: IntoIterator,
        W::Item: Borrow<S>,
    {
        let mut state = self.start;
        for symbol in word {
            match self.transition(state, symbol.borrow()) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_accepting(state)
    }

    /// Adds an explicit garbage state rather than relying on an implicit one. The new state is
    /// rejecting, loops on every symbol and is the target of every previously missing transition.
    /// Does nothing if the transition function is already total.
    pub fn add_explicit_garbage(&mut self) {
        if self.has_explicit_garbage() {
            return;
        }
        let garbage = self.table.add_state();
        for state in 0..=garbage {
            for symbol in 0..self.alphabet.size() {
                if self.table.get(state, symbol).is_none() {
                    self.table.insert(state, symbol, garbage);
                }
            }
        }
        trace!("added explicit garbage state {garbage}");
    }

    /// Consumes `self` and returns it with an explicit garbage state, see [`Fsm::add_explicit_garbage`].
    pub fn with_explicit_garbage(mut self) -> Self {
        self.add_explicit_garbage();
        self
    }

    /// Returns a new automaton that only keeps the initial state and the states from which an
    /// accepting state can be reached. Transitions into removed states are dropped, so they lead
    /// into the implicit garbage state instead. If the initial state cannot reach acceptance, it
    /// is kept without any transitions. The accepted language does not change, the states
    /// keep their relative order.
    pub fn trim(&self) -> Self {
        let mut predecessors = vec![vec![]; self.num_states()];
        for (q, _, p) in self.table.iter() {
            predecessors[p].push(q);
        }
        let mut live = self.accepting.clone();
        let mut queue: VecDeque<usize> = self.accepting.iter().collect();
        while let Some(p) = queue.pop_front() {
            for &q in &predecessors[p] {
                if live.insert(q) {
                    queue.push_back(q);
                }
            }
        }

        let mut kept = live.clone();
        kept.insert(self.start);
        let renaming: Map<usize, usize> = kept.iter().enumerate().map(|(i, q)| (q, i)).collect();
        let mut table =
            TransitionTable::new(renaming.len(), self.alphabet.size(), self.table.len());
        for (q, symbol, p) in self.table.iter() {
            // a dead start is kept without any outgoing edges
            if live.contains(q) && live.contains(p) {
                table.insert(renaming[&q], symbol, renaming[&p]);
            }
        }
        let accepting = self.accepting.iter().map(|q| renaming[&q]).collect();
        trace!(
            "trimmed automaton from {} to {} states",
            self.num_states(),
            renaming.len()
        );
        Self::from_parts(self.alphabet.clone(), renaming[&self.start], accepting, table)
    }
}

impl<S: Symbol> Clone for Fsm<S> {
    fn clone(&self) -> Self {
        Self {
            alphabet: self.alphabet.clone(),
            start: self.start,
            accepting: self.accepting.clone(),
            table: self.table.clone(),
            word_cache: self.word_cache.clone(),
        }
    }
}

impl<S: Symbol> PartialEq for Fsm<S> {
    fn eq(&self, other: &Self) -> bool {
        self.alphabet == other.alphabet
            && self.start == other.start
            && self.accepting == other.accepting
            && self.table == other.table
    }
}

impl<S: Symbol> Eq for Fsm<S> {}

impl<S: Symbol> std::fmt::Debug for Fsm<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fsm")
            .field("alphabet", &self.alphabet)
            .field("num_states", &self.num_states())
            .field("start", &self.start)
            .field("accepting", &self.accepting().collect_vec())
            .field("transitions", &self.transitions().collect_vec())
            .finish()
    }
}

impl<S: Symbol> std::fmt::Display for Fsm<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once("State".to_string())
                .chain(self.alphabet.universe().map(|s| format!("{:?}", s))),
        );
        for q in 0..self.num_states() {
            let mut label = if q == self.start {
                format!("-> {q}")
            } else {
                q.to_string()
            };
            if self.is_accepting(q) {
                label = label.green().bold().to_string();
            }
            let row = std::iter::once(label).chain((0..self.alphabet.size()).map(|symbol| {
                self.table
                    .get(q, symbol)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string())
            }));
            builder.push_record(row);
        }
        let table = builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string();
        write!(f, "{table}")
    }
}
