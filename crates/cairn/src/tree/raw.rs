//! The red-black tree underlying [`TreeMap`] and [`TreeSet`].
//!
//! Nodes are heap records linked by parent and child pointers; the tree
//! exclusively owns its nodes through the root's downward chain, while
//! parent pointers are plain back-references. Rebalancing distinguishes the
//! four insert and four erase orientations explicitly, and the rotation
//! routines reattach the rotated subtree to its grandparent themselves so
//! parent/child links stay mutually consistent at every step.
//!
//! [`TreeMap`]: crate::tree::TreeMap
//! [`TreeSet`]: crate::tree::TreeSet

use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};

use crate::alloc::{alloc_one, dealloc_one, Allocator};
use crate::compare::Compare;
use crate::error::Error;
use crate::pair::Pair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

pub(crate) struct Node<K, V> {
    pair: Pair<K, V>,
    color: Color,
    parent: *mut Node<K, V>,
    left: *mut Node<K, V>,
    right: *mut Node<K, V>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn pair(&self) -> &Pair<K, V> {
        &self.pair
    }

    pub(crate) fn pair_mut(&mut self) -> &mut Pair<K, V> {
        &mut self.pair
    }

    unsafe fn min_of(node: *mut Self) -> *mut Self {
        let mut cur = node;

        while !(*cur).left.is_null() {
            cur = (*cur).left;
        }

        cur
    }

    unsafe fn max_of(node: *mut Self) -> *mut Self {
        let mut cur = node;

        while !(*cur).right.is_null() {
            cur = (*cur).right;
        }

        cur
    }

    /// In-order neighbor: right-then-leftmost, else ascend while coming
    /// from a right child.
    pub(crate) unsafe fn successor(node: *mut Self) -> *mut Self {
        if !(*node).right.is_null() {
            return Self::min_of((*node).right);
        }

        let mut cur = node;
        let mut parent = (*cur).parent;

        while !parent.is_null() && (*parent).right == cur {
            cur = parent;
            parent = (*cur).parent;
        }

        parent
    }

    pub(crate) unsafe fn predecessor(node: *mut Self) -> *mut Self {
        if !(*node).left.is_null() {
            return Self::max_of((*node).left);
        }

        let mut cur = node;
        let mut parent = (*cur).parent;

        while !parent.is_null() && (*parent).left == cur {
            cur = parent;
            parent = (*cur).parent;
        }

        parent
    }
}

pub(crate) struct RawTree<K, V, C, A: Allocator> {
    root: *mut Node<K, V>,
    len: usize,
    compare: C,
    alloc: A,
    _marker: PhantomData<Node<K, V>>,
}

impl<K, V, C, A: Allocator> RawTree<K, V, C, A> {
    pub(crate) fn new_in(compare: C, alloc: A) -> Self {
        Self {
            root: ptr::null_mut(),
            len: 0,
            compare,
            alloc,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn first_node(&self) -> *mut Node<K, V> {
        if self.root.is_null() {
            ptr::null_mut()
        } else {
            unsafe { Node::min_of(self.root) }
        }
    }

    pub(crate) fn last_node(&self) -> *mut Node<K, V> {
        if self.root.is_null() {
            ptr::null_mut()
        } else {
            unsafe { Node::max_of(self.root) }
        }
    }

    pub(crate) fn clear(&mut self) {
        unsafe {
            Self::drop_subtree(&self.alloc, self.root);
        }

        self.root = ptr::null_mut();
        self.len = 0;
    }

    /// Reclaim a node's storage, handing back its payload.
    unsafe fn destroy_node(alloc: &A, node: *mut Node<K, V>) -> Pair<K, V> {
        let pair = ptr::read(&(*node).pair);
        dealloc_one(alloc, NonNull::new_unchecked(node));
        pair
    }

    unsafe fn drop_subtree(alloc: &A, node: *mut Node<K, V>) {
        if node.is_null() {
            return;
        }

        // Depth is bounded by 2*log2(len) in a valid red-black tree.
        Self::drop_subtree(alloc, (*node).left);
        Self::drop_subtree(alloc, (*node).right);
        drop(Self::destroy_node(alloc, node));
    }
}

impl<K, V, C, A> RawTree<K, V, C, A>
where
    C: Compare<K>,
    A: Allocator,
{
    /// Standard BST descent; key equality is incomparability under the
    /// ordering predicate.
    pub(crate) fn find(&self, key: &K) -> *mut Node<K, V> {
        let mut cur = self.root;

        while !cur.is_null() {
            let node = unsafe { &*cur };

            if self.compare.compare(key, node.pair.key()) {
                cur = node.left;
            } else if self.compare.compare(node.pair.key(), key) {
                cur = node.right;
            } else {
                return cur;
            }
        }

        ptr::null_mut()
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        let node = self.find(key);

        if node.is_null() {
            None
        } else {
            Some(unsafe { (*node).pair.value() })
        }
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let node = self.find(key);

        if node.is_null() {
            None
        } else {
            Some(unsafe { (*node).pair.value_mut() })
        }
    }

    /// Overwrite the value stored under an existing key.
    pub(crate) fn modify(&mut self, key: &K, value: V) -> bool {
        let node = self.find(key);

        if node.is_null() {
            return false;
        }

        unsafe {
            (*node).pair.set_value(value);
        }

        true
    }

    /// Insert without overwrite. Returns `Ok(false)` and drops the
    /// arguments when the key is already present.
    pub(crate) fn try_insert(&mut self, key: K, value: V) -> Result<bool, Error> {
        let mut parent = ptr::null_mut::<Node<K, V>>();
        let mut cur = self.root;
        let mut went_left = false;

        while !cur.is_null() {
            let node = unsafe { &*cur };

            if self.compare.compare(&key, node.pair.key()) {
                parent = cur;
                went_left = true;
                cur = node.left;
            } else if self.compare.compare(node.pair.key(), &key) {
                parent = cur;
                went_left = false;
                cur = node.right;
            } else {
                return Ok(false);
            }
        }

        let color = if parent.is_null() {
            Color::Black
        } else {
            Color::Red
        };

        let node = self.create_node(key, value, color, parent)?;

        if parent.is_null() {
            self.root = node;
        } else if went_left {
            unsafe { (*parent).left = node };
        } else {
            unsafe { (*parent).right = node };
        }

        self.len += 1;

        unsafe {
            self.fix_insert(node);
        }

        Ok(true)
    }

    /// Remove a key, returning the stored value.
    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        let node = self.find(key);

        if node.is_null() {
            return None;
        }

        Some(unsafe { self.remove_node(node) })
    }

    fn create_node(
        &self,
        key: K,
        value: V,
        color: Color,
        parent: *mut Node<K, V>,
    ) -> Result<*mut Node<K, V>, Error> {
        let node = alloc_one::<Node<K, V>, _>(&self.alloc)?;

        unsafe {
            ptr::write(
                node.as_ptr(),
                Node {
                    pair: Pair::new(key, value),
                    color,
                    parent,
                    left: ptr::null_mut(),
                    right: ptr::null_mut(),
                },
            );
        }

        Ok(node.as_ptr())
    }

    /// Left rotation around `x`; fixes the three affected parent links and
    /// the attachment to `x`'s old parent.
    unsafe fn rotate_left(&mut self, x: *mut Node<K, V>) {
        let y = (*x).right;

        (*x).right = (*y).left;
        if !(*y).left.is_null() {
            (*(*y).left).parent = x;
        }

        (*y).parent = (*x).parent;
        if (*x).parent.is_null() {
            self.root = y;
        } else if (*(*x).parent).left == x {
            (*(*x).parent).left = y;
        } else {
            (*(*x).parent).right = y;
        }

        (*y).left = x;
        (*x).parent = y;
    }

    unsafe fn rotate_right(&mut self, x: *mut Node<K, V>) {
        let y = (*x).left;

        (*x).left = (*y).right;
        if !(*y).right.is_null() {
            (*(*y).right).parent = x;
        }

        (*y).parent = (*x).parent;
        if (*x).parent.is_null() {
            self.root = y;
        } else if (*(*x).parent).left == x {
            (*(*x).parent).left = y;
        } else {
            (*(*x).parent).right = y;
        }

        (*y).right = x;
        (*x).parent = y;
    }

    /// Restore the red-black invariants above a freshly inserted red node.
    unsafe fn fix_insert(&mut self, mut x: *mut Node<K, V>) {
        while x != self.root && (*(*x).parent).color == Color::Red {
            let parent = (*x).parent;
            let grand = (*parent).parent;

            if (*grand).left == parent {
                let uncle = (*grand).right;

                if !uncle.is_null() && (*uncle).color == Color::Red {
                    (*parent).color = Color::Black;
                    (*uncle).color = Color::Black;
                    (*grand).color = Color::Red;
                    x = grand;
                } else {
                    if (*parent).right == x {
                        x = parent;
                        self.rotate_left(x);
                    }

                    let parent = (*x).parent;
                    let grand = (*parent).parent;
                    (*parent).color = Color::Black;
                    (*grand).color = Color::Red;
                    self.rotate_right(grand);
                }
            } else {
                let uncle = (*grand).left;

                if !uncle.is_null() && (*uncle).color == Color::Red {
                    (*parent).color = Color::Black;
                    (*uncle).color = Color::Black;
                    (*grand).color = Color::Red;
                    x = grand;
                } else {
                    if (*parent).left == x {
                        x = parent;
                        self.rotate_right(x);
                    }

                    let parent = (*x).parent;
                    let grand = (*parent).parent;
                    (*parent).color = Color::Black;
                    (*grand).color = Color::Red;
                    self.rotate_left(grand);
                }
            }
        }

        (*self.root).color = Color::Black;
    }

    /// Replace `old` with `new` (possibly null) in `old`'s parent link.
    unsafe fn transplant(&mut self, old: *mut Node<K, V>, new: *mut Node<K, V>) {
        let parent = (*old).parent;

        if parent.is_null() {
            self.root = new;
        } else if (*parent).left == old {
            (*parent).left = new;
        } else {
            (*parent).right = new;
        }

        if !new.is_null() {
            (*new).parent = parent;
        }
    }

    unsafe fn remove_node(&mut self, mut node: *mut Node<K, V>) -> V {
        // Two children: swap payloads with the in-order predecessor and
        // erase at the reduced position instead.
        if !(*node).left.is_null() && !(*node).right.is_null() {
            let target = Node::max_of((*node).left);
            mem::swap(&mut (*node).pair, &mut (*target).pair);
            node = target;
        }

        let child = if !(*node).left.is_null() {
            (*node).left
        } else {
            (*node).right
        };

        if !child.is_null() {
            // A one-child node is black with a red child; promoting and
            // blackening the child restores the black height.
            self.transplant(node, child);
            (*child).color = Color::Black;
        } else if node == self.root {
            self.root = ptr::null_mut();
        } else {
            if (*node).color == Color::Black {
                self.fix_double_black(node);
            }

            let parent = (*node).parent;
            if (*parent).left == node {
                (*parent).left = ptr::null_mut();
            } else {
                (*parent).right = ptr::null_mut();
            }
        }

        self.len -= 1;
        let (_key, value) = Self::destroy_node(&self.alloc, node).into_parts();
        value
    }

    /// Repair the doubly-black deficit at `x`, a black leaf still linked
    /// into the tree.
    unsafe fn fix_double_black(&mut self, mut x: *mut Node<K, V>) {
        while x != self.root && (*x).color == Color::Black {
            let parent = (*x).parent;

            if (*parent).left == x {
                let mut sibling = (*parent).right;

                if (*sibling).color == Color::Red {
                    (*sibling).color = Color::Black;
                    (*parent).color = Color::Red;
                    self.rotate_left(parent);
                    sibling = (*parent).right;
                }

                let near_black =
                    (*sibling).left.is_null() || (*(*sibling).left).color == Color::Black;
                let far_black =
                    (*sibling).right.is_null() || (*(*sibling).right).color == Color::Black;

                if near_black && far_black {
                    (*sibling).color = Color::Red;
                    x = parent;
                } else {
                    if far_black {
                        // Bring the red near nephew to the far side.
                        (*(*sibling).left).color = Color::Black;
                        (*sibling).color = Color::Red;
                        self.rotate_right(sibling);
                        sibling = (*parent).right;
                    }

                    (*sibling).color = (*parent).color;
                    (*parent).color = Color::Black;
                    if !(*sibling).right.is_null() {
                        (*(*sibling).right).color = Color::Black;
                    }
                    self.rotate_left(parent);
                    x = self.root;
                }
            } else {
                let mut sibling = (*parent).left;

                if (*sibling).color == Color::Red {
                    (*sibling).color = Color::Black;
                    (*parent).color = Color::Red;
                    self.rotate_right(parent);
                    sibling = (*parent).left;
                }

                let near_black =
                    (*sibling).right.is_null() || (*(*sibling).right).color == Color::Black;
                let far_black =
                    (*sibling).left.is_null() || (*(*sibling).left).color == Color::Black;

                if near_black && far_black {
                    (*sibling).color = Color::Red;
                    x = parent;
                } else {
                    if far_black {
                        (*(*sibling).right).color = Color::Black;
                        (*sibling).color = Color::Red;
                        self.rotate_left(sibling);
                        sibling = (*parent).left;
                    }

                    (*sibling).color = (*parent).color;
                    (*parent).color = Color::Black;
                    if !(*sibling).left.is_null() {
                        (*(*sibling).left).color = Color::Black;
                    }
                    self.rotate_right(parent);
                    x = self.root;
                }
            }
        }

        (*x).color = Color::Black;
    }
}

impl<K, V, C, A> RawTree<K, V, C, A>
where
    K: Clone,
    V: Clone,
    C: Clone,
    A: Allocator + Clone,
{
    /// Structural copy preserving shape and colors.
    pub(crate) fn try_clone(&self) -> Result<Self, Error> {
        let mut new = Self::new_in(self.compare.clone(), self.alloc.clone());

        if !self.root.is_null() {
            new.root = unsafe { Self::clone_subtree(&new, self.root, ptr::null_mut())? };
            new.len = self.len;
        }

        Ok(new)
    }

    unsafe fn clone_subtree(
        dst: &Self,
        src: *const Node<K, V>,
        parent: *mut Node<K, V>,
    ) -> Result<*mut Node<K, V>, Error> {
        let src = &*src;

        let node = match alloc_one::<Node<K, V>, _>(&dst.alloc) {
            Ok(node) => node.as_ptr(),
            Err(error) => return Err(error.into()),
        };

        ptr::write(
            node,
            Node {
                pair: src.pair.clone(),
                color: src.color,
                parent,
                left: ptr::null_mut(),
                right: ptr::null_mut(),
            },
        );

        if !src.left.is_null() {
            match Self::clone_subtree(dst, src.left, node) {
                Ok(left) => (*node).left = left,
                Err(error) => {
                    Self::drop_subtree(&dst.alloc, node);
                    return Err(error);
                }
            }
        }

        if !src.right.is_null() {
            match Self::clone_subtree(dst, src.right, node) {
                Ok(right) => (*node).right = right,
                Err(error) => {
                    Self::drop_subtree(&dst.alloc, node);
                    return Err(error);
                }
            }
        }

        Ok(node)
    }
}

impl<K, V, C, A: Allocator> Drop for RawTree<K, V, C, A> {
    fn drop(&mut self) {
        unsafe {
            Self::drop_subtree(&self.alloc, self.root);
        }
    }
}

/// Cursor pair over the tree in in-order sequence; double ended.
pub(crate) struct RawIter<K, V> {
    front: *mut Node<K, V>,
    back: *mut Node<K, V>,
    remaining: usize,
}

impl<K, V> RawIter<K, V> {
    pub(crate) fn new<C, A: Allocator>(tree: &RawTree<K, V, C, A>) -> Self {
        Self {
            front: tree.first_node(),
            back: tree.last_node(),
            remaining: tree.len(),
        }
    }

    pub(crate) fn next(&mut self) -> Option<NonNull<Node<K, V>>> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.front;
        self.remaining -= 1;

        unsafe {
            self.front = Node::successor(node);
            Some(NonNull::new_unchecked(node))
        }
    }

    pub(crate) fn next_back(&mut self) -> Option<NonNull<Node<K, V>>> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.back;
        self.remaining -= 1;

        unsafe {
            self.back = Node::predecessor(node);
            Some(NonNull::new_unchecked(node))
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
impl<K, V, C, A> RawTree<K, V, C, A>
where
    C: Compare<K>,
    A: Allocator,
{
    /// Audit every structural invariant. Panics on violation.
    pub(crate) fn check_invariants(&self) {
        unsafe {
            if self.root.is_null() {
                assert_eq!(self.len, 0, "empty tree with nonzero len");
                return;
            }

            assert!((*self.root).parent.is_null(), "root has a parent");
            assert_eq!((*self.root).color, Color::Black, "root is not black");

            let mut count = 0;
            self.check_subtree(self.root, &mut count);
            assert_eq!(count, self.len, "len does not match reachable nodes");

            let mut prev = ptr::null_mut::<Node<K, V>>();
            let mut cur = self.first_node();

            while !cur.is_null() {
                if !prev.is_null() {
                    assert!(
                        self.compare.compare((*prev).pair.key(), (*cur).pair.key()),
                        "in-order traversal is not strictly ascending"
                    );
                }

                prev = cur;
                cur = Node::successor(cur);
            }
        }
    }

    /// Black height of the tree, root exclusive, counting nil leaves.
    pub(crate) fn black_height(&self) -> usize {
        unsafe {
            let mut cur = self.root;

            if cur.is_null() {
                return 0;
            }

            let mut height = 0;
            cur = (*cur).left;

            while !cur.is_null() {
                if (*cur).color == Color::Black {
                    height += 1;
                }
                cur = (*cur).left;
            }

            height + 1
        }
    }

    /// Returns the subtree's black height counting nil leaves as one.
    unsafe fn check_subtree(&self, node: *mut Node<K, V>, count: &mut usize) -> usize {
        *count += 1;
        let n = &*node;

        if n.color == Color::Red {
            for child in [n.left, n.right] {
                if !child.is_null() {
                    assert_eq!((*child).color, Color::Black, "red node has a red child");
                }
            }
        }

        for child in [n.left, n.right] {
            if !child.is_null() {
                assert_eq!((*child).parent, node, "child's parent link is stale");
            }
        }

        let left_height = if n.left.is_null() {
            1
        } else {
            self.check_subtree(n.left, count)
        };

        let right_height = if n.right.is_null() {
            1
        } else {
            self.check_subtree(n.right, count)
        };

        assert_eq!(left_height, right_height, "black heights diverge");

        left_height + (n.color == Color::Black) as usize
    }
}
