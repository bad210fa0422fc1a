use thiserror::Error;

use crate::math::Count;

/// Abstracts the types of errors that can occur when constructing, combining or transforming
/// automata. Rejecting a word is never an error.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum FsmError {
    #[error("start state {start} does not exist, there are only {num_states} states")]
    InvalidStart { start: usize, num_states: usize },
    #[error("accepting state {state} does not exist, there are only {num_states} states")]
    InvalidAccepting { state: usize, num_states: usize },
    #[error("transition {origin} -> {target} mentions a state that does not exist, there are only {num_states} states")]
    InvalidTransition {
        origin: usize,
        target: usize,
        num_states: usize,
    },
    #[error("symbol `{0}` is not part of the alphabet")]
    UnknownSymbol(String),
    #[error("state {state} has more than one transition on symbol `{symbol}`")]
    NonDeterministic { state: usize, symbol: String },
    #[error("cannot minimize without explicit garbage")]
    MissingExplicitGarbage,
    #[error("minimization changed the counting sequence from {expected:?} to {found:?}")]
    IncorrectMinimization {
        expected: Vec<Count>,
        found: Vec<Count>,
    },
    #[error("not supported: {0}")]
    Unsupported(String),
    #[error("the letters that are given a weight must match the alphabet")]
    WeightKeysMismatch,
    #[error("invalid weight: {0}")]
    InvalidWeight(#[from] WeightError),
    #[error("state {state} would have differently weighted transitions on symbol `{symbol}`")]
    ConflictingWeights { state: usize, symbol: String },
    #[error("synthetic symbol {0} does not appear in the decode table")]
    UnknownSyntheticSymbol(usize),
    #[error("must be given at least one automaton")]
    EmptyMachineList,
}

/// Errors that can occur when constructing a [`crate::Weight`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum WeightError {
    #[error("weights must not be the zero polynomial")]
    Zero,
    #[error("weights must have a zero constant term, found {0}")]
    NonZeroConstantTerm(u64),
    #[error("coefficient of x^{0} does not fit into 64 bits")]
    CoefficientOverflow(usize),
}
