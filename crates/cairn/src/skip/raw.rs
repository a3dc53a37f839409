//! The probabilistic skip list underlying [`SkipMap`] and [`SkipSet`].
//!
//! Every node carries a forward-pointer array whose length is drawn by
//! repeated fair coin flips at insertion time. A sentinel head node owns no
//! pair; its forward array always spans the current list level, growing on
//! demand when a taller node arrives and shrinking back when the top
//! levels empty out.
//!
//! [`SkipMap`]: crate::skip::SkipMap
//! [`SkipSet`]: crate::skip::SkipSet

use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ptr::{self, NonNull};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::alloc::{alloc_array, alloc_one, dealloc_array, dealloc_one, Allocator};
use crate::compare::{equivalent, Compare};
use crate::error::Error;
use crate::pair::Pair;

/// Hard cap on node height. At p = 0.5 the chance of drawing this many
/// heads is 2^-32, far beyond any realistic list length.
pub(crate) const MAX_LEVELS: usize = 32;

/// Seed for the default level generator; any fixed value works, this one
/// is the 64-bit golden ratio constant.
pub(crate) const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub(crate) struct Node<K, V> {
    /// Uninitialized in the head sentinel, initialized everywhere else.
    pair: MaybeUninit<Pair<K, V>>,
    links: NonNull<*mut Node<K, V>>,
    levels: usize,
}

impl<K, V> Node<K, V> {
    #[inline]
    unsafe fn link(&self, level: usize) -> *mut Node<K, V> {
        *self.links.as_ptr().add(level)
    }

    #[inline]
    unsafe fn set_link(&mut self, level: usize, next: *mut Node<K, V>) {
        *self.links.as_ptr().add(level) = next;
    }

    /// The stored pair. Must not be called on the head sentinel.
    #[inline]
    pub(crate) unsafe fn pair(&self) -> &Pair<K, V> {
        self.pair.assume_init_ref()
    }

    #[inline]
    pub(crate) unsafe fn pair_mut(&mut self) -> &mut Pair<K, V> {
        self.pair.assume_init_mut()
    }

    #[inline]
    unsafe fn key(&self) -> &K {
        self.pair().key()
    }
}

pub(crate) struct RawSkipList<K, V, C, A: Allocator> {
    head: *mut Node<K, V>,
    /// Allocated capacity of the head's forward array; the head's logical
    /// level count never exceeds it. Grow-only, so shrinking levels never
    /// allocates.
    head_cap: usize,
    len: usize,
    compare: C,
    rng: SmallRng,
    alloc: A,
    _marker: PhantomData<Node<K, V>>,
}

impl<K, V, C, A: Allocator> RawSkipList<K, V, C, A> {
    pub(crate) fn try_new_in(compare: C, seed: u64, alloc: A) -> Result<Self, Error> {
        let head = Self::create_node_in(&alloc, None, 1)?;

        Ok(Self {
            head,
            head_cap: 1,
            len: 0,
            compare,
            rng: SmallRng::seed_from_u64(seed),
            alloc,
            _marker: PhantomData,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// The head's logical level count, which equals the current list
    /// level.
    #[inline]
    pub(crate) fn levels(&self) -> usize {
        unsafe { (*self.head).levels }
    }

    pub(crate) fn first_node(&self) -> *mut Node<K, V> {
        unsafe { (*self.head).link(0) }
    }

    /// Draw a node height: count fair coin flips until the first tails.
    fn random_levels(&mut self) -> usize {
        let mut levels = 1;

        while levels < MAX_LEVELS && self.rng.random_bool(0.5) {
            levels += 1;
        }

        levels
    }

    fn create_node_in(
        alloc: &A,
        pair: Option<Pair<K, V>>,
        levels: usize,
    ) -> Result<*mut Node<K, V>, Error> {
        let links = alloc_array::<*mut Node<K, V>, _>(alloc, levels)?;

        unsafe {
            for i in 0..levels {
                links.as_ptr().add(i).write(ptr::null_mut());
            }
        }

        let node = match alloc_one::<Node<K, V>, _>(alloc) {
            Ok(node) => node,
            Err(error) => {
                unsafe { dealloc_array(alloc, links, levels) };
                return Err(error.into());
            }
        };

        unsafe {
            ptr::write(
                node.as_ptr(),
                Node {
                    pair: match pair {
                        Some(pair) => MaybeUninit::new(pair),
                        None => MaybeUninit::uninit(),
                    },
                    links,
                    levels,
                },
            );
        }

        Ok(node.as_ptr())
    }

    /// Reclaim a data node, handing back its payload.
    unsafe fn destroy_node(&self, node: *mut Node<K, V>) -> Pair<K, V> {
        let pair = ptr::read((*node).pair.as_ptr());
        dealloc_array(&self.alloc, (*node).links, (*node).levels);
        dealloc_one(&self.alloc, NonNull::new_unchecked(node));
        pair
    }

    /// Grow the head's forward array to `new_levels`.
    fn expand_levels(&mut self, new_levels: usize) -> Result<(), Error> {
        unsafe {
            let head = &mut *self.head;

            if new_levels <= self.head_cap {
                head.levels = new_levels;
                return Ok(());
            }

            let links = alloc_array::<*mut Node<K, V>, _>(&self.alloc, new_levels)?;

            for i in 0..new_levels {
                let next = if i < head.levels {
                    head.link(i)
                } else {
                    ptr::null_mut()
                };
                links.as_ptr().add(i).write(next);
            }

            dealloc_array(&self.alloc, head.links, self.head_cap);
            head.links = links;
            head.levels = new_levels;
            self.head_cap = new_levels;
        }

        Ok(())
    }

    /// Drop the head's empty top levels; never below one.
    fn shrink_levels(&mut self) {
        unsafe {
            let head = &mut *self.head;

            while head.levels > 1 && head.link(head.levels - 1).is_null() {
                head.levels -= 1;
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        unsafe {
            let mut cur = (*self.head).link(0);

            while !cur.is_null() {
                let next = (*cur).link(0);
                drop(self.destroy_node(cur));
                cur = next;
            }

            for i in 0..(*self.head).levels {
                (*self.head).set_link(i, ptr::null_mut());
            }
            (*self.head).levels = 1;
        }

        self.len = 0;
    }
}

impl<K, V, C, A> RawSkipList<K, V, C, A>
where
    C: Compare<K>,
    A: Allocator,
{
    /// Top-down search. At each level, advance while the next node still
    /// sorts before the target, descending at each overshoot.
    pub(crate) fn find(&self, key: &K) -> *mut Node<K, V> {
        if self.len == 0 {
            return ptr::null_mut();
        }

        unsafe {
            let mut cur = self.head;

            for i in (0..self.levels()).rev() {
                loop {
                    let next = (*cur).link(i);

                    if next.is_null() {
                        break;
                    }

                    if equivalent(&self.compare, key, (*next).key()) {
                        return next;
                    }

                    if self.compare.compare(key, (*next).key()) {
                        break;
                    }

                    cur = next;
                }
            }
        }

        ptr::null_mut()
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        let node = self.find(key);

        if node.is_null() {
            None
        } else {
            Some(unsafe { (*node).pair().value() })
        }
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let node = self.find(key);

        if node.is_null() {
            None
        } else {
            Some(unsafe { (*node).pair_mut().value_mut() })
        }
    }

    /// Overwrite the value stored under an existing key.
    pub(crate) fn modify(&mut self, key: &K, value: V) -> bool {
        let node = self.find(key);

        if node.is_null() {
            return false;
        }

        unsafe {
            (*node).pair_mut().set_value(value);
        }

        true
    }

    /// Insert without overwrite. Returns `Ok(false)` and drops the
    /// arguments when the key is already present.
    pub(crate) fn try_insert(&mut self, key: K, value: V) -> Result<bool, Error> {
        let new_levels = self.random_levels();

        if new_levels > self.levels() {
            self.expand_levels(new_levels)?;
        }

        let mut update = [ptr::null_mut::<Node<K, V>>(); MAX_LEVELS];

        unsafe {
            let mut cur = self.head;

            for i in (0..self.levels()).rev() {
                loop {
                    let next = (*cur).link(i);

                    // Advancing on equal keys parks `cur` on an existing
                    // duplicate, caught below.
                    if next.is_null() || self.compare.compare(&key, (*next).key()) {
                        break;
                    }

                    cur = next;
                }

                if i < new_levels {
                    update[i] = cur;
                }
            }

            if cur != self.head && equivalent(&self.compare, &key, (*cur).key()) {
                // Give back any levels grown for this attempt.
                self.shrink_levels();
                return Ok(false);
            }

            let node = match Self::create_node_in(&self.alloc, Some(Pair::new(key, value)), new_levels)
            {
                Ok(node) => node,
                Err(error) => {
                    self.shrink_levels();
                    return Err(error);
                }
            };

            for i in 0..new_levels {
                (*node).set_link(i, (*update[i]).link(i));
                (*update[i]).set_link(i, node);
            }
        }

        self.len += 1;
        Ok(true)
    }

    /// Remove a key, returning the stored value.
    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        if self.len == 0 {
            return None;
        }

        let mut update = [ptr::null_mut::<Node<K, V>>(); MAX_LEVELS];

        unsafe {
            let mut cur = self.head;

            for i in (0..self.levels()).rev() {
                loop {
                    let next = (*cur).link(i);

                    if next.is_null() || !self.compare.compare((*next).key(), key) {
                        break;
                    }

                    cur = next;
                }

                update[i] = cur;
            }

            let node = (*update[0]).link(0);

            if node.is_null() || !equivalent(&self.compare, key, (*node).key()) {
                return None;
            }

            for i in 0..(*node).levels {
                debug_assert_eq!((*update[i]).link(i), node);
                (*update[i]).set_link(i, (*node).link(i));
            }

            self.shrink_levels();
            self.len -= 1;

            let (_key, value) = self.destroy_node(node).into_parts();
            Some(value)
        }
    }
}

impl<K, V, C, A> RawSkipList<K, V, C, A>
where
    K: Clone,
    V: Clone,
    C: Clone,
    A: Allocator + Clone,
{
    /// Copy the list, preserving every node's height.
    pub(crate) fn try_clone(&self) -> Result<Self, Error> {
        let mut new = Self::try_new_in(self.compare.clone(), 0, self.alloc.clone())?;
        new.rng = self.rng.clone();

        if self.levels() > 1 {
            new.expand_levels(self.levels())?;
        }

        unsafe {
            let mut tails = [new.head; MAX_LEVELS];
            let mut cur = (*self.head).link(0);

            while !cur.is_null() {
                let src = &*cur;
                let node =
                    Self::create_node_in(&new.alloc, Some(src.pair().clone()), src.levels)?;

                for (i, tail) in tails.iter_mut().enumerate().take(src.levels) {
                    (**tail).set_link(i, node);
                    *tail = node;
                }

                new.len += 1;
                cur = src.link(0);
            }
        }

        Ok(new)
    }
}

impl<K, V, C, A: Allocator> Drop for RawSkipList<K, V, C, A> {
    fn drop(&mut self) {
        unsafe {
            let mut cur = (*self.head).link(0);

            while !cur.is_null() {
                let next = (*cur).link(0);
                drop(self.destroy_node(cur));
                cur = next;
            }

            // The head holds no pair; only its storage goes back.
            dealloc_array(&self.alloc, (*self.head).links, self.head_cap);
            dealloc_one(&self.alloc, NonNull::new_unchecked(self.head));
        }
    }
}

/// Forward cursor over the level-0 chain.
pub(crate) struct RawIter<K, V> {
    cur: *mut Node<K, V>,
    remaining: usize,
}

impl<K, V> RawIter<K, V> {
    pub(crate) fn new<C, A: Allocator>(list: &RawSkipList<K, V, C, A>) -> Self {
        Self {
            cur: list.first_node(),
            remaining: list.len(),
        }
    }

    pub(crate) fn next(&mut self) -> Option<NonNull<Node<K, V>>> {
        if self.cur.is_null() {
            return None;
        }

        let node = self.cur;
        self.remaining -= 1;

        unsafe {
            self.cur = (*node).link(0);
            Some(NonNull::new_unchecked(node))
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
impl<K, V, C, A> RawSkipList<K, V, C, A>
where
    C: Compare<K>,
    A: Allocator,
{
    /// Audit every structural invariant. Panics on violation.
    pub(crate) fn check_invariants(&self) {
        use std::prelude::v1::*;

        unsafe {
            assert!(self.levels() >= 1, "head has no levels");
            assert!(self.levels() <= self.head_cap, "head levels exceed capacity");

            if self.len == 0 {
                assert_eq!(self.levels(), 1, "empty list with grown head");
                assert!((*self.head).link(0).is_null());
                return;
            }

            // The top level must justify the current list level.
            if self.levels() > 1 {
                assert!(
                    !(*self.head).link(self.levels() - 1).is_null(),
                    "top level is empty"
                );
            }

            // Level 0 enumerates everything in strictly ascending order.
            let mut nodes = Vec::new();
            let mut cur = (*self.head).link(0);

            while !cur.is_null() {
                let node = &*cur;
                assert!(node.levels >= 1 && node.levels <= MAX_LEVELS);
                assert!(
                    node.levels <= self.levels(),
                    "node is taller than the list"
                );

                if let Some(&prev) = nodes.last() {
                    let prev: *mut Node<K, V> = prev;
                    assert!(
                        self.compare.compare((*prev).key(), node.key()),
                        "level 0 is not strictly ascending"
                    );
                }

                nodes.push(cur);
                cur = node.link(0);
            }

            assert_eq!(nodes.len(), self.len, "len does not match level 0");

            // Each level chain is exactly the nodes tall enough for it, in
            // the same order.
            for level in 1..self.levels() {
                let expected: Vec<_> = nodes
                    .iter()
                    .copied()
                    .filter(|&n| (*n).levels > level)
                    .collect();

                let mut actual = Vec::new();
                let mut cur = (*self.head).link(level);

                while !cur.is_null() {
                    actual.push(cur);
                    cur = (*cur).link(level);
                }

                assert_eq!(actual, expected, "level chain is inconsistent");
            }
        }
    }
}
