//! An unordered set based on separate chaining.

use core::fmt;

use crate::alloc::{Allocator, Global};
use crate::error::Error;
use crate::hash::{Fnv, HashFn};
use crate::set_unit::SetUnit;

use super::map::{HashMap, Keys};

/// An unordered set of keys with amortized O(1) operations.
///
/// Implemented as a [`HashMap`] storing an internal zero-sized marker
/// value, so the chaining and load-factor machinery is shared with the
/// map.
///
/// # Examples
///
/// ```
/// use cairn::HashSet;
///
/// let mut set = HashSet::try_new()?;
///
/// assert!(set.try_insert("a")?);
/// assert!(!set.try_insert("a")?);
/// assert!(set.contains(&"a"));
/// assert!(set.remove(&"a"));
/// # Ok::<_, cairn::Error>(())
/// ```
pub struct HashSet<K, H = Fnv, A: Allocator = Global> {
    map: HashMap<K, SetUnit, H, A>,
}

impl<K> HashSet<K> {
    /// An empty set with the standard hash and allocator.
    pub fn try_new() -> Result<Self, Error> {
        Self::try_new_in(Fnv, Global)
    }
}

impl<K, H> HashSet<K, H> {
    /// An empty set hashing through `hasher`.
    pub fn try_with_hasher(hasher: H) -> Result<Self, Error> {
        Self::try_new_in(hasher, Global)
    }
}

impl<K, H, A: Allocator> HashSet<K, H, A> {
    /// An empty set hashing through `hasher`, allocating from `alloc`.
    pub fn try_new_in(hasher: H, alloc: A) -> Result<Self, Error> {
        Ok(Self {
            map: HashMap::try_new_in(hasher, alloc)?,
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

    /// Current bucket count; always a schedule prime.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.map.bucket_count()
    }

    /// Keys in unspecified order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.map.keys(),
        }
    }

    /// Drop every key, keeping the set usable.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K, H, A> HashSet<K, H, A>
where
    K: PartialEq,
    H: HashFn<K>,
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

impl<K, H, A> HashSet<K, H, A>
where
    K: Clone,
    H: Clone,
    A: Allocator + Clone,
{
    /// Copy the set with the same bucket count.
    pub fn try_clone(&self) -> Result<Self, Error> {
        Ok(Self {
            map: self.map.try_clone()?,
        })
    }
}

impl<K, H, A> fmt::Debug for HashSet<K, H, A>
where
    K: fmt::Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K, H, A: Allocator> IntoIterator for &'a HashSet<K, H, A> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a [`HashSet`]. Forward only, unspecified order.
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
        let mut set = HashSet::try_new().abort();

        assert!(set.try_insert(1u32).abort());
        assert!(set.try_insert(2).abort());
        assert!(!set.try_insert(1).abort());

        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(!set.contains(&3));

        assert!(set.remove(&1));
        assert!(!set.remove(&1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn adapts_like_the_map() {
        let mut set = HashSet::try_new().abort();

        for key in 0..30u32 {
            assert!(set.try_insert(key).abort());
        }

        assert!(set.bucket_count() > 17);

        for key in 0..30u32 {
            assert!(set.remove(&key));
        }

        assert_eq!(set.bucket_count(), 17);
        assert!(set.is_empty());
    }

    #[test]
    fn iterates_every_key_once() {
        let mut set = HashSet::try_new().abort();

        for key in 0..20u32 {
            set.try_insert(key).abort();
        }

        let mut keys: Vec<_> = set.iter().copied().collect();
        keys.sort_unstable();

        let expected: Vec<_> = (0..20).collect();
        assert_eq!(keys, expected);
    }
}
