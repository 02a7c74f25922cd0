use std::hash::Hash;

use itertools::Itertools;

use crate::moore::StateId;

/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;
/// A map that remembers the order in which keys were inserted.
pub type OrderedMap<K, V> = indexmap::IndexMap<K, V, fxhash::FxBuildHasher>;
/// A set that remembers the order in which elements were inserted.
pub type OrderedSet<S> = indexmap::IndexSet<S, fxhash::FxBuildHasher>;

/// Represents a bijective mapping between `L` and `R`, that is a mapping which associates
/// each `L` with precisely one `R` and vice versa.
pub type Bijection<L, R> = bimap::BiHashMap<L, R>;

/// A partition groups the states of a machine into disjoint classes. Classes are numbered
/// densely, and the numbering is canonical: the class of state `q0` is class `0`, and
/// whenever a state opens a new class it gets the next unused number when scanning the
/// states in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    class_of: Vec<usize>,
    size: usize,
}

impl Partition {
    /// Builds a partition by grouping states `0..keys.len()` whose keys are equal. Only
    /// equality is required of the keys, which is why this performs a linear search over
    /// the representatives found so far.
    pub fn from_keys<K: Eq>(keys: &[K]) -> Self {
        let mut representatives: Vec<&K> = vec![];
        let class_of = keys
            .iter()
            .map(|key| match representatives.iter().position(|rep| *rep == key) {
                Some(class) => class,
                None => {
                    representatives.push(key);
                    representatives.len() - 1
                }
            })
            .collect();
        Self {
            class_of,
            size: representatives.len(),
        }
    }

    /// Same as [`Self::from_keys`], but uses hashing to group the keys.
    pub fn from_hashable_keys<K: Eq + Hash>(keys: &[K]) -> Self {
        let mut seen: Map<&K, usize> = Map::default();
        let class_of = keys
            .iter()
            .map(|key| {
                let next = seen.len();
                *seen.entry(key).or_insert(next)
            })
            .collect();
        Self {
            class_of,
            size: seen.len(),
        }
    }

    /// The class of every element, indexed by position.
    pub(crate) fn assignment(&self) -> &[usize] {
        &self.class_of
    }

    /// Returns the number of classes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of partitioned elements.
    pub fn domain_size(&self) -> usize {
        self.class_of.len()
    }

    /// Returns the class that contains `state`, or `None` if the state is not part of
    /// the partitioned domain.
    pub fn class_of(&self, state: StateId) -> Option<usize> {
        self.class_of.get(state.index()).copied()
    }

    /// Returns true if `p` and `q` belong to the same class.
    pub fn equivalent(&self, p: StateId, q: StateId) -> bool {
        matches!((self.class_of(p), self.class_of(q)), (Some(x), Some(y)) if x == y)
    }

    /// Returns the members of the class with the given id in ascending order.
    pub fn class(&self, class: usize) -> impl Iterator<Item = StateId> + '_ {
        self.class_of
            .iter()
            .enumerate()
            .filter(move |(_, c)| **c == class)
            .map(|(q, _)| StateId::new(q))
    }

    /// Returns the smallest member of each class, ordered by class id.
    pub fn representatives(&self) -> Vec<StateId> {
        let mut reps = vec![None; self.size];
        for (q, c) in self.class_of.iter().enumerate() {
            reps[*c].get_or_insert(StateId::new(q));
        }
        reps.into_iter().flatten().collect()
    }

    /// Returns all classes, each one sorted ascendingly.
    pub fn classes(&self) -> Vec<Vec<StateId>> {
        (0..self.size).map(|c| self.class(c).collect()).collect()
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.classes()
                .into_iter()
                .map(|class| format!("{{{}}}", class.into_iter().join(", ")))
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Partition;
    use crate::moore::StateId;

    #[test_log::test]
    fn partition_by_output() {
        let partition = Partition::from_keys(&["a", "b", "c", "c", "b"]);
        assert_eq!(partition.size(), 3);
        assert_eq!(
            partition.classes(),
            vec![
                vec![StateId::new(0)],
                vec![StateId::new(1), StateId::new(4)],
                vec![StateId::new(2), StateId::new(3)],
            ]
        );
        assert!(partition.equivalent(StateId::new(2), StateId::new(3)));
        assert!(!partition.equivalent(StateId::new(0), StateId::new(1)));
        assert_eq!(partition.class_of(StateId::new(7)), None);
        assert_eq!(partition.to_string(), "{{q0}, {q1, q4}, {q2, q3}}");
    }

    #[test_log::test]
    fn hashable_keys_agree_with_linear_grouping() {
        let keys = [(0, Some(1)), (1, None), (0, Some(1)), (0, Some(2))];
        assert_eq!(
            Partition::from_keys(&keys),
            Partition::from_hashable_keys(&keys)
        );
        assert_eq!(
            Partition::from_keys(&keys).representatives(),
            vec![StateId::new(0), StateId::new(1), StateId::new(3)]
        );
    }
}
