use itertools::Either;

use crate::math::OrderedMap;

/// Tables with at most this many cells are always stored densely.
const DENSE_LIMIT: usize = 1 << 20;

/// Stores the transition function of a deterministic automaton, mapping a state and the position
/// of a symbol in the alphabet to the target state. The function may be partial, a missing entry
/// means that the transition leads into the implicit garbage state.
///
/// Usually the table is a flat vector indexed by `state * symbols + symbol`. For very large tables
/// in which only few transitions are defined, a sparse ordered map is used instead.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TransitionTable {
    states: usize,
    symbols: usize,
    defined: usize,
    storage: Storage,
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum Storage {
    Dense(Vec<Option<usize>>),
    Sparse(OrderedMap<(usize, usize), usize>),
}

impl TransitionTable {
    /// Creates an empty table for `states` states over an alphabet with `symbols` symbols. The
    /// `expected` number of transitions is used to decide on the representation.
    pub fn new(states: usize, symbols: usize, expected: usize) -> Self {
        let cells = states.saturating_mul(symbols);
        let storage = if cells <= DENSE_LIMIT || expected.saturating_mul(4) >= cells {
            Storage::Dense(vec![None; cells])
        } else {
            Storage::Sparse(OrderedMap::new())
        };
        Self {
            states,
            symbols,
            defined: 0,
            storage,
        }
    }

    /// Returns the number of states the table has rows for.
    pub fn states(&self) -> usize {
        self.states
    }

    /// Returns the number of symbols the table has columns for.
    pub fn symbols(&self) -> usize {
        self.symbols
    }

    /// Returns the number of transitions that are defined.
    pub fn len(&self) -> usize {
        self.defined
    }

    /// Returns true if no transition is defined at all.
    pub fn is_empty(&self) -> bool {
        self.defined == 0
    }

    /// Returns true if and only if a transition is defined for every state and symbol.
    pub fn is_total(&self) -> bool {
        self.defined == self.states * self.symbols
    }

    /// Returns true if the table is stored as a sparse map.
    pub fn is_sparse(&self) -> bool {
        matches!(self.storage, Storage::Sparse(_))
    }

    /// Looks up the target of the transition from `state` on the symbol at position `symbol`.
    #[inline(always)]
    pub fn get(&self, state: usize, symbol: usize) -> Option<usize> {
        debug_assert!(state < self.states && symbol < self.symbols);
        match &self.storage {
            Storage::Dense(targets) => targets[state * self.symbols + symbol],
            Storage::Sparse(targets) => targets.get(&(state, symbol)).copied(),
        }
    }

    /// Sets the target of the transition from `state` on the symbol at position `symbol`,
    /// returning the previous target if there was one.
    pub fn insert(&mut self, state: usize, symbol: usize, target: usize) -> Option<usize> {
        assert!(
            state < self.states && symbol < self.symbols && target < self.states,
            "transition ({state}, {symbol}) -> {target} is out of bounds"
        );
        let previous = match &mut self.storage {
            Storage::Dense(targets) => targets[state * self.symbols + symbol].replace(target),
            Storage::Sparse(targets) => targets.insert((state, symbol), target),
        };
        if previous.is_none() {
            self.defined += 1;
        }
        previous
    }

    /// Appends a new state without any outgoing transitions and returns its index.
    pub fn add_state(&mut self) -> usize {
        if let Storage::Dense(targets) = &mut self.storage {
            targets.extend(std::iter::repeat(None).take(self.symbols));
        }
        self.states += 1;
        self.states - 1
    }

    /// Iterates over the defined transitions leaving `state` as pairs of symbol position and target.
    pub fn successors(&self, state: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        match &self.storage {
            Storage::Dense(targets) => Either::Left(
                targets[state * self.symbols..(state + 1) * self.symbols]
                    .iter()
                    .enumerate()
                    .filter_map(|(symbol, target)| target.map(|p| (symbol, p))),
            ),
            Storage::Sparse(targets) => Either::Right(
                targets
                    .range((state, 0)..(state + 1, 0))
                    .map(|(&(_, symbol), &p)| (symbol, p)),
            ),
        }
    }

    /// Iterates over all defined transitions as triples of source, symbol position and target,
    /// ordered by source and then symbol.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        match &self.storage {
            Storage::Dense(targets) => Either::Left(
                targets
                    .iter()
                    .enumerate()
                    .filter_map(|(i, target)| {
                        target.map(|p| (i / self.symbols, i % self.symbols, p))
                    }),
            ),
            Storage::Sparse(targets) => {
                Either::Right(targets.iter().map(|(&(q, symbol), &p)| (q, symbol, p)))
            }
        }
    }
}
