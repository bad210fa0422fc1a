use std::collections::{BTreeMap, BTreeSet};

/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Type alias for sets whose iteration order is determined by the elements.
pub type OrderedSet<S> = BTreeSet<S>;
/// Type alias for maps whose iteration order is determined by the keys.
pub type OrderedMap<K, V> = BTreeMap<K, V>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiBTreeMap<L, R>;

/// The integer type in which numbers of words are counted. Additions saturate, so the counts
/// are exact as long as they stay below `u128::MAX`.
pub type Count = u128;

/// Sums up the entries of `counts` at the positions given by `indices`.
pub(crate) fn sum_at<I: IntoIterator<Item = usize>>(counts: &[Count], indices: I) -> Count {
    indices
        .into_iter()
        .fold(0, |acc: Count, i| acc.saturating_add(counts[i]))
}
