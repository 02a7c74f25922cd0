use std::fmt::Debug;

use itertools::Itertools;

use crate::{math::OrderedSet, Symbol};

/// A finite set of input symbols. The symbols are kept in the order in which they were
/// first inserted, so iterating over an alphabet is deterministic. Duplicates are ignored.
///
/// # Example
/// ```
/// use moore::Alphabet;
///
/// let alphabet = Alphabet::from_iter(['b', 'a', 'b']);
/// assert_eq!(alphabet.len(), 2);
/// assert_eq!(alphabet.universe().collect::<Vec<_>>(), vec![&'b', &'a']);
/// ```
#[derive(Clone)]
pub struct Alphabet<A: Symbol>(OrderedSet<A>);

impl<A: Symbol> Alphabet<A> {
    /// Creates an empty alphabet.
    pub fn new() -> Self {
        Self(OrderedSet::default())
    }

    /// Adds `symbol`, returns `false` if it was already present.
    pub fn insert(&mut self, symbol: A) -> bool {
        self.0.insert(symbol)
    }

    /// Returns true if `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: &A) -> bool {
        self.0.contains(symbol)
    }

    /// Iterates over all symbols in insertion order.
    pub fn universe(&self) -> impl Iterator<Item = &A> + Clone + '_ {
        self.0.iter()
    }

    /// Returns the position of `symbol` in the alphabet, if present.
    pub fn position(&self, symbol: &A) -> Option<usize> {
        self.0.get_index_of(symbol)
    }

    /// Returns the symbol at position `pos`, if it exists.
    pub fn nth(&self, pos: usize) -> Option<&A> {
        self.0.get_index(pos)
    }

    /// The number of distinct symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there is no symbol in the alphabet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<A: Symbol> Default for Alphabet<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Two alphabets are equal if they contain the same symbols, regardless of their order.
impl<A: Symbol> PartialEq for Alphabet<A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.universe().all(|sym| other.contains(sym))
    }
}
impl<A: Symbol> Eq for Alphabet<A> {}

impl<A: Symbol> Debug for Alphabet<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.universe().map(|sym| format!("{sym:?}")).join(", ")
        )
    }
}

impl<A: Symbol> FromIterator<A> for Alphabet<A> {
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<A: Symbol> Extend<A> for Alphabet<A> {
    fn extend<T: IntoIterator<Item = A>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl<A: Symbol> From<Vec<A>> for Alphabet<A> {
    fn from(value: Vec<A>) -> Self {
        value.into_iter().collect()
    }
}

impl<A: Symbol, const N: usize> From<[A; N]> for Alphabet<A> {
    fn from(value: [A; N]) -> Self {
        value.into_iter().collect()
    }
}

impl<'a, A: Symbol> IntoIterator for &'a Alphabet<A> {
    type Item = &'a A;
    type IntoIter = indexmap::set::Iter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Alphabet;

    #[test_log::test]
    fn alphabet_ignores_duplicates_and_keeps_order() {
        let mut alphabet = Alphabet::from([2, 0, 2, 1]);
        assert_eq!(alphabet.len(), 3);
        assert_eq!(alphabet.position(&0), Some(1));
        assert_eq!(alphabet.nth(2), Some(&1));
        assert!(!alphabet.insert(0));
        assert!(alphabet.insert(7));
        assert_eq!(format!("{alphabet:?}"), "{2, 0, 1, 7}");
    }

    #[test_log::test]
    fn equality_ignores_order() {
        assert_eq!(Alphabet::from(['a', 'b']), Alphabet::from(['b', 'a']));
        assert_ne!(Alphabet::from(['a']), Alphabet::from(['a', 'c']));
        assert!(Alphabet::<char>::default().is_empty());
    }
}
