//! Library for working with deterministic finite automata over finite words, with a focus on
//! counting the words they accept.
//!
//! The central type is [`Fsm`], a deterministic finite automaton given by a frozen [`Alphabet`],
//! a number of states, a designated start state, a set of accepting states and a (possibly
//! partial) transition function. Missing transitions lead into an *implicit* garbage state, which
//! can be materialized with [`Fsm::add_explicit_garbage`]. On top of membership testing, an [`Fsm`]
//! supports
//! - enumeration of the accepted words of a given length ([`Fsm::words_generated`]) and counting
//!   them without materializing any word ([`Fsm::smart_enumeration`]),
//! - boolean combination through a product construction ([`Fsm::union`], [`Fsm::intersection`],
//!   [`Fsm::intersection_of_list`]),
//! - minimization through Hopcroft's partition refinement ([`Fsm::minimize`]),
//! - construction of automata that accept precisely the words avoiding a given pattern as a
//!   contiguous factor ([`Fsm::fsm_for_words_avoiding`]).
//!
//! A [`Wfsm`] additionally attaches a [`Weight`] to each transition, which is a polynomial in a single
//! formal variable `x`. The exponents of a weight describe by how many units the *size* of a word
//! grows when the transition is taken, so counting by size generalizes counting by length. All
//! combinatorial operations on weighted automata are obtained by encoding them as unweighted
//! automata over a synthetic alphabet (see [`Wfsm::convert_wfsm_to_fsm`]), running the unweighted
//! algorithm and decoding the result again.
//!
//! # Example
//! ```
//! use finite_state_machines::prelude::*;
//!
//! // accepts the words over {0, 1} with an even number of ones
//! let parity = Fsm::new(
//!     ['0', '1'],
//!     2,
//!     0,
//!     [0],
//!     [((0, '0'), 0), ((0, '1'), 1), ((1, '0'), 1), ((1, '1'), 0)],
//! )
//! .unwrap();
//! assert!(parity.process_word("0110".chars()));
//! assert_eq!(parity.smart_enumeration(3), vec![1, 1, 2, 4]);
//! ```
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use finite_state_machines::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::Alphabet,
        error::{FsmError, WeightError},
        fsm::{Fsm, Operation, TransitionTable},
        math,
        math::Count,
        progress::{NoProgress, Progress, TracingProgress},
        weighted::{DecodeTable, Weight, Wfsm},
        Symbol,
    };
}

/// Defines some mathematical helpers that are used throughout the crate, such as the
/// type aliases for sets, maps and bijections.
pub mod math;

/// Module that contains the definition of a frozen, indexed alphabet.
pub mod alphabet;
pub use alphabet::Alphabet;

/// Errors that can be produced when building or transforming automata.
pub mod error;
pub use error::{FsmError, WeightError};

/// Observational side channel for reporting the progress of long running constructions.
pub mod progress;
pub use progress::{NoProgress, Progress, TracingProgress};

/// Deterministic finite automata, their boolean combinations, minimization and counting.
pub mod fsm;
pub use fsm::{Fsm, Operation};

/// Weighted automata, whose transitions carry a polynomial weight, and the encoding that
/// reduces them to ordinary automata.
pub mod weighted;
pub use weighted::{DecodeTable, Weight, Wfsm};

/// Implements the generation of random automata. This is feature gated behind the `random` feature.
#[cfg(feature = "random")]
pub mod random;

use std::{fmt::Debug, hash::Hash};

/// A symbol is simply a type that can be used to label the transitions of an automaton. It
/// must be totally ordered, as alphabets are kept sorted.
pub trait Symbol: Clone + Eq + Ord + Hash + Debug {}

impl<T: Clone + Eq + Ord + Hash + Debug> Symbol for T {}
