//! An ordered set based on a skip list.

use core::fmt;
use core::ops::Index;

use crate::alloc::{Allocator, Global};
use crate::compare::{Ascending, Compare};
use crate::error::Error;
use crate::set_unit::SetUnit;

use super::map::{Keys, SkipMap};
use super::raw::DEFAULT_SEED;

/// An ordered set of keys balanced probabilistically.
///
/// Implemented as a [`SkipMap`] storing an internal zero-sized marker
/// value.
///
/// # Examples
///
/// ```
/// use cairn::SkipSet;
///
/// let mut set = SkipSet::try_new()?;
///
/// assert!(set.try_insert(2)?);
/// assert!(set.try_insert(1)?);
/// assert!(!set.try_insert(2)?);
///
/// let items: Vec<_> = set.iter().copied().collect();
/// assert_eq!(items, [1, 2]);
/// # Ok::<_, cairn::Error>(())
/// ```
pub struct SkipSet<K, C = Ascending, A: Allocator = Global> {
    map: SkipMap<K, SetUnit, C, A>,
}

impl<K> SkipSet<K> {
    /// An empty set with the default order, allocator and seed.
    pub fn try_new() -> Result<Self, Error> {
        Self::try_new_in(Ascending, DEFAULT_SEED, Global)
    }

    /// An empty set whose level generator starts from `seed`.
    pub fn try_with_seed(seed: u64) -> Result<Self, Error> {
        Self::try_new_in(Ascending, seed, Global)
    }
}

impl<K, C> SkipSet<K, C> {
    /// An empty set ordered by `compare`.
    pub fn try_with_compare(compare: C) -> Result<Self, Error> {
        Self::try_new_in(compare, DEFAULT_SEED, Global)
    }
}

impl<K, C, A: Allocator> SkipSet<K, C, A> {
    /// An empty set ordered by `compare`, allocating from `alloc`.
    pub fn try_new_in(compare: C, seed: u64, alloc: A) -> Result<Self, Error> {
        Ok(Self {
            map: SkipMap::try_new_in(compare, seed, alloc)?,
        })
    }

    /// Number of keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the set holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Keys in ascending comparator order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.map.keys(),
        }
    }

    /// The smallest key.
    pub fn first(&self) -> Option<&K> {
        Some(self.map.first()?.0)
    }

    /// The largest key. Walks the whole bottom level.
    pub fn last(&self) -> Option<&K> {
        Some(self.map.last()?.0)
    }

    /// Drop every key, keeping the set usable.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K, C, A> SkipSet<K, C, A>
where
    C: Compare<K>,
    A: Allocator,
{
    /// Whether the key is present.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Insert a key if not present yet; reports whether it was added.
    pub fn try_insert(&mut self, key: K) -> Result<bool, Error> {
        self.map.try_insert(key, SetUnit)
    }

    /// Remove a key; reports whether it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        self.map.remove(key).is_some()
    }
}

impl<K, C, A> SkipSet<K, C, A>
where
    K: Clone,
    C: Clone,
    A: Allocator + Clone,
{
    /// Copy the set, preserving every key's level count.
    pub fn try_clone(&self) -> Result<Self, Error> {
        Ok(Self {
            map: self.map.try_clone()?,
        })
    }
}

impl<K, C, A> fmt::Debug for SkipSet<K, C, A>
where
    K: fmt::Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K, C, A: Allocator> IntoIterator for &'a SkipSet<K, C, A> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, C, A> Index<usize> for SkipSet<K, C, A>
where
    A: Allocator,
{
    type Output = K;

    /// Access the `index`-th key in order; O(index).
    ///
    /// # Panics
    ///
    /// Panics when `index >= len`.
    fn index(&self, index: usize) -> &K {
        self.iter().nth(index).expect("set index out of bounds")
    }
}

/// Borrowing in-order iterator over a [`SkipSet`]. Forward only.
pub struct Iter<'a, K> {
    inner: Keys<'a, K, SetUnit>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestExt;

    use std::prelude::v1::*;

    #[test]
    fn insert_contains_remove() {
        let mut set = SkipSet::try_new().abort();

        assert!(set.try_insert(2).abort());
        assert!(set.try_insert(1).abort());
        assert!(!set.try_insert(2).abort());

        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(!set.contains(&3));

        assert!(set.remove(&1));
        assert!(!set.remove(&1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn iterates_in_order() {
        let mut set = SkipSet::try_new().abort();

        for key in [9, 4, 7, 1] {
            set.try_insert(key).abort();
        }

        let items: Vec<_> = set.iter().copied().collect();
        assert_eq!(items, [1, 4, 7, 9]);

        assert_eq!(set.first(), Some(&1));
        assert_eq!(set.last(), Some(&9));
        assert_eq!(set[0], 1);
        assert_eq!(set[2], 7);
    }
}
