use tracing::{debug, error};

use super::Wfsm;
use crate::{
    error::FsmError,
    fsm::{Fsm, Operation, VERIFICATION_LENGTH},
    progress::{NoProgress, Progress},
    Symbol,
};

impl<S: Symbol> Wfsm<S> {
    /// Returns the union of `self` and `other`, see [`Wfsm::parallel_with`].
    pub fn union(&self, other: &Self) -> Result<Self, FsmError> {
        self.parallel(other, Operation::Union)
    }

    /// Returns the intersection of `self` and `other`, see [`Wfsm::parallel_with`].
    pub fn intersection(&self, other: &Self) -> Result<Self, FsmError> {
        self.parallel(other, Operation::Intersection)
    }

    /// Runs `self` and `other` in parallel, see [`Wfsm::parallel_with`].
    pub fn parallel(&self, other: &Self, operation: Operation) -> Result<Self, FsmError> {
        self.parallel_with(other, operation, &mut NoProgress)
    }

    /// Combines `self` and `other` according to `operation`. Both automata are encoded over a
    /// shared synthetic alphabet, combined with [`Fsm::parallel_with`] and the trimmed product is
    /// decoded again. The result is not minimized.
    ///
    /// Once the operands read a symbol with different weights, the product continues in only one
    /// of them. For an intersection, such states can never accept and are trimmed. For a union,
    /// a state that would keep two differently weighted transitions on the same symbol makes the
    /// result non-deterministic, in which case [`FsmError::ConflictingWeights`] is returned.
    pub fn parallel_with<P: Progress + ?Sized>(
        &self,
        other: &Self,
        operation: Operation,
        progress: &mut P,
    ) -> Result<Self, FsmError> {
        let (encoded, table) = Self::convert_wfsm_to_fsm([self, other]);
        let product = encoded[0].parallel_with(&encoded[1], operation, progress);
        Self::convert_fsm_to_wfsm(&product.trim(), &table)
    }

    /// Minimizes the weighted automaton, see [`Wfsm::minimize_with`].
    pub fn minimize(&self, verify: bool) -> Result<Self, FsmError> {
        self.minimize_with(verify, &mut NoProgress)
    }

    /// Minimizes the weighted automaton by minimizing its encoding with [`Fsm::minimize_with`].
    /// Two states are merged if they lead to the same states on the same symbols with the same
    /// weights. In contrast to [`Fsm::minimize`], an explicit garbage state is not required, it is
    /// added to the encoding and removed again from the result.
    ///
    /// If `verify` is set, the minimization of the encoding is verified and, provided that
    /// counting by size is supported, the counting sequences by size up to
    /// [`VERIFICATION_LENGTH`] are compared as well.
    pub fn minimize_with<P: Progress + ?Sized>(
        &self,
        verify: bool,
        progress: &mut P,
    ) -> Result<Self, FsmError> {
        let (encoded, table) = Self::convert_wfsm_to_fsm([self]);
        let minimized = encoded
            .into_iter()
            .next()
            .ok_or(FsmError::EmptyMachineList)?
            .with_explicit_garbage()
            .minimize_with(verify, progress)?;
        let result = Self::convert_fsm_to_wfsm(&minimized.trim(), &table)?;
        debug!(
            "weighted minimization: {} -> {} states",
            self.num_states(),
            result.num_states()
        );

        if verify && self.has_unit_coefficients() {
            let expected = self.smart_enumeration(VERIFICATION_LENGTH)?;
            let found = result.smart_enumeration(VERIFICATION_LENGTH)?;
            if expected != found {
                error!("weighted minimization changed the counting sequence");
                return Err(FsmError::IncorrectMinimization { expected, found });
            }
        }
        Ok(result)
    }

    /// Computes the intersection of the given `machines`, see [`Wfsm::intersection_of_list_with`].
    pub fn intersection_of_list(machines: &[Self], minimize: bool) -> Result<Self, FsmError> {
        Self::intersection_of_list_with(machines, minimize, &mut NoProgress)
    }

    /// Computes the intersection of the given `machines` by encoding all of them at once and
    /// intersecting the encodings with [`Fsm::intersection_of_list_with`]. The trimmed result is
    /// decoded again. Fails with [`FsmError::EmptyMachineList`] if `machines` is empty.
    pub fn intersection_of_list_with<P: Progress + ?Sized>(
        machines: &[Self],
        minimize: bool,
        progress: &mut P,
    ) -> Result<Self, FsmError> {
        let (encoded, table) = Self::convert_wfsm_to_fsm(machines);
        let intersection = Fsm::intersection_of_list_with(&encoded, minimize, progress)?;
        Self::convert_fsm_to_wfsm(&intersection.trim(), &table)
    }
}
