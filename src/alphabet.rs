use itertools::Itertools;

use crate::{math::Map, Symbol};

/// A finite, frozen collection of symbols. The symbols are stored sorted and without duplicates,
/// so that each of them is identified by its position. An alphabet is never modified once it has
/// been constructed, operations that combine alphabets (such as [`Alphabet::union`]) produce a new one.
///
/// # Example
/// ```
/// use finite_state_machines::Alphabet;
/// let alphabet = Alphabet::new(['b', 'a', 'b']);
/// assert_eq!(alphabet.size(), 2);
/// assert_eq!(alphabet.position(&'b'), Some(1));
/// assert_eq!(alphabet.nth(0), Some(&'a'));
/// ```
#[derive(Clone)]
pub struct Alphabet<S: Symbol = char> {
    symbols: Vec<S>,
    positions: Map<S, usize>,
}

impl<S: Symbol> Alphabet<S> {
    /// Creates a new alphabet from an iterator over the symbols. Duplicates are removed and the
    /// symbols are sorted.
    pub fn new<I: IntoIterator<Item = S>>(symbols: I) -> Self {
        let symbols: Vec<S> = symbols.into_iter().unique().sorted().collect();
        let positions = symbols
            .iter()
            .enumerate()
            .map(|(i, sym)| (sym.clone(), i))
            .collect();
        Self { symbols, positions }
    }

    /// Returns the number of symbols in the alphabet.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if and only if the alphabet contains no symbol at all.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns the position of `symbol` in the alphabet, or `None` if it is not contained.
    #[inline(always)]
    pub fn position(&self, symbol: &S) -> Option<usize> {
        self.positions.get(symbol).copied()
    }

    /// Returns the symbol at position `pos`, if it exists.
    pub fn nth(&self, pos: usize) -> Option<&S> {
        self.symbols.get(pos)
    }

    /// Checks whether `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: &S) -> bool {
        self.positions.contains_key(symbol)
    }

    /// Iterates over the symbols in ascending order.
    pub fn universe(&self) -> std::slice::Iter<'_, S> {
        self.symbols.iter()
    }

    /// Gives the symbols as a slice, in ascending order.
    pub fn as_slice(&self) -> &[S] {
        &self.symbols
    }

    /// Builds the alphabet that contains the symbols of both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.universe().chain(other.universe()).cloned())
    }
}

impl Alphabet<char> {
    /// Creates a new alphabet of the given size. The symbols are just the first `size` letters
    /// of the latin alphabet, i.e. 'a' to 'z'.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "Alphabet is too large");
        Self::new((0..size).map(|i| (b'a' + i as u8) as char))
    }
}

impl<S: Symbol> FromIterator<S> for Alphabet<S> {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl<S: Symbol> PartialEq for Alphabet<S> {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl<S: Symbol> Eq for Alphabet<S> {}

impl<S: Symbol> std::fmt::Debug for Alphabet<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.symbols.iter()).finish()
    }
}
