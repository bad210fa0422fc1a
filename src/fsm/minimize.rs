use std::collections::VecDeque;

use bit_set::BitSet;
use itertools::Itertools;
use tracing::{debug, error};

use super::{Fsm, TransitionTable};
use crate::{
    error::FsmError,
    math::OrderedMap,
    progress::{NoProgress, Progress},
    Symbol,
};

/// Length up to which the counting sequences of an automaton and its minimization are compared
/// when verification is requested.
pub const VERIFICATION_LENGTH: usize = 20;

/// A partition of the states into blocks, where `block_of` is the inverse of `blocks`.
struct Partition {
    blocks: Vec<Vec<usize>>,
    block_of: Vec<usize>,
}

impl Partition {
    /// Creates the partition into accepting and rejecting states, omitting an empty block.
    fn by_acceptance(size: usize, accepting: &BitSet) -> Self {
        let (acc, rej): (Vec<usize>, Vec<usize>) = (0..size).partition(|q| accepting.contains(*q));
        let blocks: Vec<Vec<usize>> = [acc, rej].into_iter().filter(|b| !b.is_empty()).collect();
        let mut block_of = vec![0; size];
        for (i, block) in blocks.iter().enumerate() {
            for &q in block {
                block_of[q] = i;
            }
        }
        Self { blocks, block_of }
    }

    fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Moves the states in `inside` out of `block` into a new block, whose index is returned.
    fn split(&mut self, block: usize, inside: &BitSet) -> usize {
        let new_block = self.blocks.len();
        let (moved, kept): (Vec<usize>, Vec<usize>) = self.blocks[block]
            .iter()
            .partition(|q| inside.contains(**q));
        for &q in &moved {
            self.block_of[q] = new_block;
        }
        self.blocks[block] = kept;
        self.blocks.push(moved);
        new_block
    }
}

impl<S: Symbol> Fsm<S> {
    /// Minimizes the automaton using Hopcroft's algorithm, see [`Fsm::minimize_with`].
    pub fn minimize(&self, verify: bool) -> Result<Self, FsmError> {
        self.minimize_with(verify, &mut NoProgress)
    }

    /// Minimizes the automaton using Hopcroft's partition refinement algorithm.
    ///
    /// Starting from the partition into accepting and rejecting states, the blocks are refined
    /// until no block can be split any further. A block `B` is split by a splitter `A` and a
    /// symbol `a` if some, but not all states of `B` move into `A` on `a`. The splitters that still
    /// need to be processed are kept in a worklist. When a block that is in the worklist is split,
    /// both halves are in the worklist afterwards, otherwise only the smaller half is added.
    /// The blocks of the final partition become the states of the minimized automaton, they are
    /// numbered by the smallest state they contain.
    ///
    /// The automaton must have an explicit garbage state, otherwise [`FsmError::MissingExplicitGarbage`]
    /// is returned. If `verify` is set, the counting sequences up to [`VERIFICATION_LENGTH`] of
    /// `self` and the result are compared and [`FsmError::IncorrectMinimization`] is returned if
    /// they differ. Unreachable states are not removed.
    pub fn minimize_with<P: Progress + ?Sized>(
        &self,
        verify: bool,
        progress: &mut P,
    ) -> Result<Self, FsmError> {
        if !self.has_explicit_garbage() {
            return Err(FsmError::MissingExplicitGarbage);
        }
        let size = self.num_states();
        let symbols = self.alphabet.size();

        let mut inverse = vec![vec![vec![]; size]; symbols];
        for (q, symbol, p) in self.table.iter() {
            inverse[symbol][p].push(q);
        }

        let mut partition = Partition::by_acceptance(size, &self.accepting);
        let mut worklist = VecDeque::new();
        let mut queued = BitSet::with_capacity(size);
        if let Some(smallest) = (0..partition.len()).min_by_key(|&b| partition.blocks[b].len()) {
            if partition.len() > 1 {
                worklist.push_back(smallest);
                queued.insert(smallest);
            }
        }
        let mut peak = worklist.len();

        while let Some(splitter) = worklist.pop_front() {
            queued.remove(splitter);
            let splitter_states = partition.blocks[splitter].clone();
            for symbol in 0..symbols {
                let mut preimage = BitSet::with_capacity(size);
                for &p in &splitter_states {
                    for &q in &inverse[symbol][p] {
                        preimage.insert(q);
                    }
                }
                if preimage.is_empty() {
                    continue;
                }

                let mut touched: OrderedMap<usize, usize> = OrderedMap::new();
                for q in preimage.iter() {
                    *touched.entry(partition.block_of[q]).or_default() += 1;
                }
                for (block, count) in touched {
                    if count == partition.blocks[block].len() {
                        continue;
                    }
                    let new_block = partition.split(block, &preimage);
                    if queued.contains(block) {
                        worklist.push_back(new_block);
                        queued.insert(new_block);
                    } else {
                        let smaller = if partition.blocks[new_block].len()
                            < partition.blocks[block].len()
                        {
                            new_block
                        } else {
                            block
                        };
                        worklist.push_back(smaller);
                        queued.insert(smaller);
                    }
                }
            }
            peak = peak.max(worklist.len());
            progress.report("minimize", worklist.len(), peak, partition.len());
        }
        progress.finish("minimize", partition.len());

        let representatives: Vec<usize> = partition
            .blocks
            .iter()
            .map(|block| *block.iter().min().expect("blocks are never empty"))
            .collect();
        let order: Vec<usize> = (0..partition.len())
            .sorted_by_key(|&b| representatives[b])
            .collect();
        let mut renaming = vec![0; partition.len()];
        for (new, &block) in order.iter().enumerate() {
            renaming[block] = new;
        }

        let mut table = TransitionTable::new(partition.len(), symbols, partition.len() * symbols);
        for (new, &block) in order.iter().enumerate() {
            let representative = representatives[block];
            for symbol in 0..symbols {
                let target = self
                    .table
                    .get(representative, symbol)
                    .ok_or(FsmError::MissingExplicitGarbage)?;
                table.insert(new, symbol, renaming[partition.block_of[target]]);
            }
        }
        let accepting = order
            .iter()
            .enumerate()
            .filter(|(_, block)| self.is_accepting(representatives[**block]))
            .map(|(new, _)| new)
            .collect();
        let start = renaming[partition.block_of[self.start]];
        let minimized = Self::from_parts(self.alphabet.clone(), start, accepting, table);
        debug!(
            "minimization: {} -> {} states",
            size,
            minimized.num_states()
        );

        if verify {
            let expected = self.smart_enumeration(VERIFICATION_LENGTH);
            let found = minimized.smart_enumeration(VERIFICATION_LENGTH);
            if expected != found {
                error!("minimization changed the counting sequence");
                return Err(FsmError::IncorrectMinimization { expected, found });
            }
        }
        Ok(minimized)
    }
}
