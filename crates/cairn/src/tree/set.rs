//! An ordered set based on a red-black tree.

use core::fmt;
use core::ops::Index;

use crate::alloc::{Allocator, Global};
use crate::compare::{Ascending, Compare};
use crate::error::Error;
use crate::set_unit::SetUnit;

use super::map::{Keys, TreeMap};

/// An ordered set of keys with O(log n) operations.
///
/// Implemented as a [`TreeMap`] storing an internal zero-sized marker
/// value, so the balancing machinery is shared with the map.
///
/// # Examples
///
/// ```
/// use cairn::TreeSet;
///
/// let mut set = TreeSet::new();
///
/// assert!(set.try_insert(3)?);
/// assert!(set.try_insert(1)?);
/// assert!(!set.try_insert(3)?);
///
/// assert!(set.contains(&1));
///
/// let items: Vec<_> = set.iter().copied().collect();
/// assert_eq!(items, [1, 3]);
/// # Ok::<_, cairn::Error>(())
/// ```
pub struct TreeSet<K, C = Ascending, A: Allocator = Global> {
    map: TreeMap<K, SetUnit, C, A>,
}

impl<K> TreeSet<K> {
    /// An empty set with the default order and allocator.
    pub fn new() -> Self {
        Self::new_in(Ascending, Global)
    }
}

impl<K> Default for TreeSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> TreeSet<K, C> {
    /// An empty set ordered by `compare`.
    pub fn with_compare(compare: C) -> Self {
        Self::new_in(compare, Global)
    }
}

impl<K, C, A: Allocator> TreeSet<K, C, A> {
    /// An empty set ordered by `compare`, allocating from `alloc`.
    pub fn new_in(compare: C, alloc: A) -> Self {
        Self {
            map: TreeMap::new_in(compare, alloc),
        }
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

    /// The largest key.
    pub fn last(&self) -> Option<&K> {
        Some(self.map.last()?.0)
    }

    /// Drop every key, keeping the set usable.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K, C, A> TreeSet<K, C, A>
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

impl<K, C, A> TreeSet<K, C, A>
where
    K: Clone,
    C: Clone,
    A: Allocator + Clone,
{
    /// Copy the set, preserving its exact shape.
    pub fn try_clone(&self) -> Result<Self, Error> {
        Ok(Self {
            map: self.map.try_clone()?,
        })
    }
}

impl<K, C, A> fmt::Debug for TreeSet<K, C, A>
where
    K: fmt::Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K, C, A: Allocator> IntoIterator for &'a TreeSet<K, C, A> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing in-order iterator over a [`TreeSet`].
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

impl<'a, K> DoubleEndedIterator for Iter<'a, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K, C, A> Index<usize> for TreeSet<K, C, A>
where
    A: Allocator,
{
    type Output = K;

    /// Access the `index`-th key in order.
    ///
    /// This walks the tree and is O(index); it exists for parity with the
    /// indexed access of the maps.
    ///
    /// # Panics
    ///
    /// Panics when `index >= len`.
    fn index(&self, index: usize) -> &K {
        self.iter().nth(index).expect("set index out of bounds")
    }
}
