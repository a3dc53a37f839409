//! An unordered map based on separate chaining.

use core::fmt;
use core::marker::PhantomData;
use core::ops::Index;

use crate::alloc::{Allocator, Global};
use crate::error::Error;
use crate::hash::{Fnv, HashFn};

use super::raw::{RawIter, RawTable};

/// An unordered map from `K` to `V` with amortized O(1) operations.
///
/// Collisions chain within a bucket; the bucket count follows a fixed
/// prime schedule and adapts automatically to the load factor before
/// every insert and erase. The hash seam is the [`HashFn`] parameter,
/// [`Fnv`] by default, and the table reduces hashes modulo its bucket
/// count itself.
///
/// Iteration visits every entry exactly once in an unspecified order that
/// is stable between modifying operations.
///
/// # Examples
///
/// ```
/// use cairn::HashMap;
///
/// let mut map = HashMap::try_new()?;
///
/// assert!(map.try_insert("a", 1)?);
/// assert!(map.try_insert("b", 2)?);
/// assert!(!map.try_insert("a", 3)?);
///
/// assert_eq!(map.get(&"a"), Some(&1));
/// assert_eq!(map.remove(&"b"), Some(2));
/// # Ok::<_, cairn::Error>(())
/// ```
pub struct HashMap<K, V, H = Fnv, A: Allocator = Global> {
    table: RawTable<K, V, H, A>,
}

impl<K, V> HashMap<K, V> {
    /// An empty map with the standard hash and allocator. Allocates the
    /// initial bucket array and is therefore fallible.
    pub fn try_new() -> Result<Self, Error> {
        Self::try_new_in(Fnv, Global)
    }
}

impl<K, V, H> HashMap<K, V, H> {
    /// An empty map hashing through `hasher`.
    pub fn try_with_hasher(hasher: H) -> Result<Self, Error> {
        Self::try_new_in(hasher, Global)
    }
}

impl<K, V, H, A: Allocator> HashMap<K, V, H, A> {
    /// An empty map hashing through `hasher`, allocating from `alloc`.
    pub fn try_new_in(hasher: H, alloc: A) -> Result<Self, Error> {
        Ok(Self {
            table: RawTable::try_new_in(hasher, alloc)?,
        })
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the map holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Current bucket count; always a schedule prime.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Entries in unspecified order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            raw: RawIter::new(&self.table),
            _marker: PhantomData,
        }
    }

    /// Entries in unspecified order, values mutable.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            raw: RawIter::new(&self.table),
            _marker: PhantomData,
        }
    }

    /// Keys in unspecified order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Values in unspecified order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Drop every entry, keeping the map and its bucket array usable.
    pub fn clear(&mut self) {
        self.table.clear();
    }
}

impl<K, V, H, A> HashMap<K, V, H, A>
where
    K: PartialEq,
    H: HashFn<K>,
    A: Allocator,
{
    /// Whether the key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        !self.table.find(key).is_null()
    }

    /// Borrow the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.table.get(key)
    }

    /// Mutably borrow the value stored under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.table.get_mut(key)
    }

    /// Insert an entry if the key is not present yet.
    ///
    /// Returns `Ok(true)` when the entry was added, `Ok(false)` when the
    /// key was already present (the arguments are dropped and the stored
    /// value is untouched). A failed allocation leaves the map unchanged,
    /// including the bucket array.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<bool, Error> {
        self.table.try_insert(key, value)
    }

    /// Remove an entry, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.table.remove(key)
    }

    /// Overwrite the value under an existing key; reports whether the key
    /// was found.
    pub fn modify(&mut self, key: &K, value: V) -> bool {
        self.table.modify(key, value)
    }
}

impl<K, V, H, A> HashMap<K, V, H, A>
where
    K: Clone,
    V: Clone,
    H: Clone,
    A: Allocator + Clone,
{
    /// Copy the map with the same bucket count.
    pub fn try_clone(&self) -> Result<Self, Error> {
        Ok(Self {
            table: self.table.try_clone()?,
        })
    }
}

impl<K, V, H, A> Index<&K> for HashMap<K, V, H, A>
where
    K: PartialEq,
    H: HashFn<K>,
    A: Allocator,
{
    type Output = V;

    /// Access the value under `key`.
    ///
    /// # Panics
    ///
    /// Panics when the key is absent.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K, V, H, A> fmt::Debug for HashMap<K, V, H, A>
where
    K: fmt::Debug,
    V: fmt::Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, H, A: Allocator> IntoIterator for &'a HashMap<K, V, H, A> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, H, A: Allocator> IntoIterator for &'a mut HashMap<K, V, H, A> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Borrowing iterator over a [`HashMap`]. Forward only, unspecified order.
pub struct Iter<'a, K, V> {
    raw: RawIter<K, V>,
    _marker: PhantomData<&'a (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.raw.next()?;
        let node: &'a _ = unsafe { &*node.as_ptr() };
        Some(node.pair().as_refs())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.len(), Some(self.raw.len()))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> core::iter::FusedIterator for Iter<'_, K, V> {}

/// Borrowing iterator with mutable values. Forward only.
pub struct IterMut<'a, K, V> {
    raw: RawIter<K, V>,
    _marker: PhantomData<(&'a K, &'a mut V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.raw.next()?;
        let node: &'a mut _ = unsafe { &mut *node.as_ptr() };
        Some(node.pair_mut().key_value_mut())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.raw.len(), Some(self.raw.len()))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> core::iter::FusedIterator for IterMut<'_, K, V> {}

/// Iterator over a [`HashMap`]'s keys.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Iterator over a [`HashMap`]'s values.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.next()?.1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

#[cfg(test)]
impl<K, V, H, A> HashMap<K, V, H, A>
where
    K: PartialEq,
    H: HashFn<K>,
    A: Allocator,
{
    pub(crate) fn check_invariants(&self) {
        self.table.check_invariants();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestExt;

    use std::prelude::v1::*;
    use std::string::ToString;

    #[test]
    fn starts_at_the_first_schedule_prime() {
        let map = HashMap::<u32, u32>::try_new().abort();
        assert_eq!(map.bucket_count(), 17);
        assert!(map.is_empty());
    }

    #[test]
    fn insert_get_remove() {
        let mut map = HashMap::try_new().abort();

        assert!(map.try_insert("a", 1).abort());
        assert!(map.try_insert("b", 2).abort());
        assert!(!map.try_insert("a", 3).abort());

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&"a"), Some(&1));
        assert!(map.contains_key(&"b"));
        assert!(!map.contains_key(&"c"));

        assert_eq!(map.remove(&"a"), Some(1));
        assert_eq!(map.remove(&"a"), None);
        map.check_invariants();
    }

    #[test]
    fn modify_overwrites_existing_only() {
        let mut map = HashMap::try_new().abort();

        assert!(map.try_insert(1u32, "one").abort());
        assert!(map.modify(&1, "uno"));
        assert_eq!(map.get(&1), Some(&"uno"));

        assert!(!map.modify(&2, "dos"));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn grows_through_the_schedule() {
        let mut map = HashMap::try_new().abort();

        for key in 0..100u32 {
            assert!(map.try_insert(key, key).abort());
            map.check_invariants();
        }

        assert_eq!(map.len(), 100);
        // 100 entries over 193 buckets sits inside the load window.
        assert_eq!(map.bucket_count(), 193);

        for key in 0..100u32 {
            assert_eq!(map.get(&key), Some(&key));
        }
    }

    #[test]
    fn shrinks_back_down() {
        let mut map = HashMap::try_new().abort();

        for key in 0..100u32 {
            assert!(map.try_insert(key, key).abort());
        }

        for key in 0..100u32 {
            assert_eq!(map.remove(&key), Some(key));
            map.check_invariants();
        }

        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), 17);
    }

    #[test]
    fn iteration_visits_every_entry_once() {
        let mut map = HashMap::try_new().abort();

        for key in 0..40u32 {
            assert!(map.try_insert(key, key * 3).abort());
        }

        let mut seen: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        seen.sort_unstable();

        let expected: Vec<_> = (0..40).map(|k| (k, k * 3)).collect();
        assert_eq!(seen, expected);
        assert_eq!(map.iter().len(), 40);
    }

    #[test]
    fn iteration_order_is_stable_between_modifications() {
        let mut map = HashMap::try_new().abort();

        for key in 0..20u32 {
            assert!(map.try_insert(key, ()).abort());
        }

        let first: Vec<_> = map.keys().copied().collect();
        let second: Vec<_> = map.keys().copied().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn iter_mut_changes_values_only() {
        let mut map = HashMap::try_new().abort();

        for key in 0..10u32 {
            assert!(map.try_insert(key, 0u32).abort());
        }

        for (key, value) in map.iter_mut() {
            *value = key * key;
        }

        for key in 0..10u32 {
            assert_eq!(map.get(&key), Some(&(key * key)));
        }
    }

    #[test]
    fn string_keys() {
        let mut map = HashMap::try_new().abort();

        for n in 0..30u32 {
            assert!(map.try_insert(n.to_string(), n).abort());
        }

        assert_eq!(map.get(&"17".to_string()), Some(&17));
        map.check_invariants();
    }

    #[test]
    fn custom_hasher_with_collisions() {
        // Constant hash forces every entry into one chain.
        let mut map = HashMap::try_with_hasher(|_: &u32| 0u32).abort();

        for key in 0..12u32 {
            assert!(map.try_insert(key, key).abort());
        }

        for key in 0..12u32 {
            assert_eq!(map.get(&key), Some(&key));
        }

        map.check_invariants();

        for key in 0..12u32 {
            assert_eq!(map.remove(&key), Some(key));
        }

        assert!(map.is_empty());
    }

    #[test]
    fn try_clone_is_independent() {
        let mut map = HashMap::try_new().abort();

        for key in 0..25u32 {
            assert!(map.try_insert(key, key).abort());
        }

        let mut copy = map.try_clone().abort();
        copy.check_invariants();
        assert_eq!(copy.len(), map.len());
        assert_eq!(copy.bucket_count(), map.bucket_count());

        assert_eq!(copy.remove(&3), Some(3));
        assert!(map.contains_key(&3));
    }

    #[test]
    fn index_returns_values() {
        let mut map = HashMap::try_new().abort();
        assert!(map.try_insert(1u32, "one").abort());
        assert_eq!(map[&1], "one");
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_panics_on_absent_key() {
        let map = HashMap::<u32, u32>::try_new().abort();
        let _ = map[&1];
    }

    #[test]
    fn clear_keeps_bucket_array() {
        let mut map = HashMap::try_new().abort();

        for key in 0..30u32 {
            assert!(map.try_insert(key, ()).abort());
        }

        let buckets = map.bucket_count();
        map.clear();

        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), buckets);
        assert!(map.try_insert(1, ()).abort());
    }
}
