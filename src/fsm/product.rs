use std::{borrow::Cow, collections::VecDeque};

use bit_set::BitSet;
use tracing::{debug, trace};

use super::{Fsm, TransitionTable};
use crate::{
    error::FsmError,
    math::Map,
    progress::{NoProgress, Progress},
    Symbol,
};

/// Determines how the acceptance of the two components of a product state is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A product state accepts if one of its components does.
    Union,
    /// A product state accepts if both of its components do.
    Intersection,
}

impl Operation {
    /// Combines the acceptance of the left and right component.
    pub fn combine(self, left: bool, right: bool) -> bool {
        match self {
            Operation::Union => left || right,
            Operation::Intersection => left && right,
        }
    }
}

/// A state of the product automaton. `None` stands for a component that has run out of
/// transitions because the symbol does not belong to its alphabet.
type ProductState = (Option<usize>, Option<usize>);

impl<S: Symbol> Fsm<S> {
    /// Returns `self` if it has an explicit garbage state and a copy with explicit garbage otherwise.
    fn normalized(&self) -> Cow<'_, Self> {
        if self.has_explicit_garbage() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(self.clone().with_explicit_garbage())
        }
    }

    /// Returns the union of `self` and `other`, computed through a product construction. The
    /// result is not minimized.
    pub fn union(&self, other: &Self) -> Self {
        self.parallel(other, Operation::Union)
    }

    /// Returns the intersection of `self` and `other`, computed through a product construction.
    /// The result is not minimized.
    pub fn intersection(&self, other: &Self) -> Self {
        self.parallel(other, Operation::Intersection)
    }

    /// Runs `self` and `other` in parallel, see [`Fsm::parallel_with`].
    pub fn parallel(&self, other: &Self, operation: Operation) -> Self {
        self.parallel_with(other, operation, &mut NoProgress)
    }

    /// Builds the automaton that runs `self` and `other` in lock-step and accepts depending on the
    /// given `operation`. Its alphabet is the union of both alphabets.
    ///
    /// Both automata are first given an explicit garbage state (on a copy, if necessary). Only the
    /// pairs of states that are reachable from the pair of initial states are constructed, they are
    /// numbered in the order in which a breadth-first search discovers them, visiting the symbols
    /// in ascending order. In particular, the pair of initial states is state `0`. Once both
    /// components have run out of transitions, the pair is not materialized, instead the
    /// transition leads into the implicit garbage state of the result.
    pub fn parallel_with<P: Progress + ?Sized>(
        &self,
        other: &Self,
        operation: Operation,
        progress: &mut P,
    ) -> Self {
        let left = self.normalized();
        let right = other.normalized();
        let alphabet = left.alphabet.union(&right.alphabet);
        let left_positions: Vec<Option<usize>> = alphabet
            .universe()
            .map(|sym| left.alphabet.position(sym))
            .collect();
        let right_positions: Vec<Option<usize>> = alphabet
            .universe()
            .map(|sym| right.alphabet.position(sym))
            .collect();

        let initial: ProductState = (Some(left.start), Some(right.start));
        let mut states: Vec<ProductState> = vec![initial];
        let mut interned: Map<ProductState, usize> = Map::default();
        interned.insert(initial, 0);
        let mut queue = VecDeque::from([0usize]);
        let mut transitions = vec![];
        let mut peak = 1;

        while let Some(source) = queue.pop_front() {
            let (l, r) = states[source];
            for symbol in 0..alphabet.size() {
                let target_pair = (
                    l.zip(left_positions[symbol])
                        .and_then(|(q, a)| left.table.get(q, a)),
                    r.zip(right_positions[symbol])
                        .and_then(|(q, a)| right.table.get(q, a)),
                );
                if target_pair == (None, None) {
                    continue;
                }
                let target = *interned.entry(target_pair).or_insert_with(|| {
                    states.push(target_pair);
                    queue.push_back(states.len() - 1);
                    states.len() - 1
                });
                transitions.push((source, symbol, target));
            }
            peak = peak.max(queue.len());
            progress.report("product", queue.len(), peak, states.len());
        }
        progress.finish("product", states.len());

        let mut table = TransitionTable::new(states.len(), alphabet.size(), transitions.len());
        for (source, symbol, target) in transitions {
            table.insert(source, symbol, target);
        }
        let accepting: BitSet = states
            .iter()
            .enumerate()
            .filter(|(_, (l, r))| {
                operation.combine(
                    l.is_some_and(|q| left.is_accepting(q)),
                    r.is_some_and(|q| right.is_accepting(q)),
                )
            })
            .map(|(i, _)| i)
            .collect();

        debug!(
            "{:?} of automata with {} and {} states has {} states",
            operation,
            left.num_states(),
            right.num_states(),
            states.len()
        );
        Self::from_parts(alphabet, 0, accepting, table)
    }

    /// Computes the intersection of the given `machines` through repeated pairwise intersections,
    /// see [`Fsm::intersection_of_list_with`].
    pub fn intersection_of_list(machines: &[Self], minimize: bool) -> Result<Self, FsmError> {
        Self::intersection_of_list_with(machines, minimize, &mut NoProgress)
    }

    /// Computes the intersection of the given `machines` in rounds. In every round, consecutive
    /// pairs are intersected, a machine left without a partner is passed on to the next round
    /// unchanged. So the result is computed as `((A ∩ B) ∩ (C ∩ D)) ∩ ((E ∩ F) ∩ ...)`, which in
    /// general is faster than intersecting one machine after the other.
    ///
    /// If `minimize` is set, every intermediate product is minimized, which keeps the sizes of the
    /// intermediate automata in check. Fails if `machines` is empty.
    pub fn intersection_of_list_with<P: Progress + ?Sized>(
        machines: &[Self],
        minimize: bool,
        progress: &mut P,
    ) -> Result<Self, FsmError> {
        if machines.is_empty() {
            return Err(FsmError::EmptyMachineList);
        }
        debug!("intersecting {} automata", machines.len());

        let mut current: Vec<Cow<'_, Self>> = machines.iter().map(Cow::Borrowed).collect();
        let mut round = 1;
        while current.len() > 1 {
            trace!("round {round} with {} automata", current.len());
            let mut next = Vec::with_capacity((current.len() + 1) / 2);
            let mut remaining = current.into_iter();
            while let Some(left) = remaining.next() {
                let Some(right) = remaining.next() else {
                    next.push(left);
                    break;
                };
                let product = left.parallel_with(&right, Operation::Intersection, progress);
                let product = if minimize {
                    product
                        .with_explicit_garbage()
                        .minimize_with(false, progress)?
                } else {
                    product
                };
                next.push(Cow::Owned(product));
            }
            current = next;
            round += 1;
        }

        Ok(current
            .pop()
            .ok_or(FsmError::EmptyMachineList)?
            .into_owned())
    }

    /// Computes the intersection of the given `machines` by intersecting one machine after the
    /// other, i.e. as `(((A ∩ B) ∩ C) ∩ D) ∩ ...`, and minimizing each intermediate result with
    /// verification. This is usually slower than [`Fsm::intersection_of_list`].
    pub fn slower_intersection_of_list(machines: &[Self]) -> Result<Self, FsmError> {
        let (first, rest) = machines.split_first().ok_or(FsmError::EmptyMachineList)?;
        debug!("intersecting {} automata one by one", machines.len());
        let mut result = first.clone();
        for (i, machine) in rest.iter().enumerate() {
            trace!(
                "intersection with machine {} ({} + {} states)",
                i + 1,
                result.num_states(),
                machine.num_states()
            );
            result = result
                .intersection(machine)
                .with_explicit_garbage()
                .minimize(true)?;
        }
        Ok(result)
    }
}
