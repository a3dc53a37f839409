//! Ordered and hashed containers with shared-ownership smart pointers and
//! pluggable allocation.
//!
//! The crate provides three keyed map families with matching set variants,
//! all backed by the same allocation and error model:
//!
//! * [`TreeMap`] / [`TreeSet`] — a red-black tree ordered by a pluggable
//!   [`Compare`] predicate.
//! * [`SkipMap`] / [`SkipSet`] — a probabilistic skip list with the same
//!   ordered contract.
//! * [`HashMap`] / [`HashSet`] — a separately chained hash table driven by a
//!   fixed prime bucket schedule and automatic load-factor adaptation.
//!
//! Alongside the containers live [`Shared`] and [`Weak`], a single-threaded
//! reference-counted pointer pair with aliasing projections, checked
//! downcasting and pluggable deleters, plus [`Unique`], a single-owner
//! pointer over the same deleter seam.
//!
//! Every operation that allocates is fallible and returns [`Result`];
//! nothing in this crate aborts on allocation failure. Allocation goes
//! through the [`Allocator`] trait with [`Global`] as the default, and
//! [`Global`] honors the thread-local budget installed by the [`limit`]
//! module.
//!
//! The containers are single-threaded by design: instances are exclusively
//! owned by their creator and reference counters are deliberately
//! non-atomic.
//!
//! [`Allocator`]: crate::alloc::Allocator
//! [`Global`]: crate::alloc::Global
//! [`Compare`]: crate::compare::Compare

#![no_std]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::type_complexity)]

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "alloc")]
extern crate alloc as rust_alloc;

#[cfg(not(feature = "alloc"))]
compile_error!("The `alloc` feature is required to build cairn.");

/// A `Result` alias specialized towards the crate [`Error`].
pub type Result<T, E = crate::error::Error> = core::result::Result<T, E>;

pub use self::error::Error;
pub mod error;

pub mod alloc;

pub mod limit;

pub use self::compare::{Ascending, Compare, Descending};
pub mod compare;

pub use self::hash::{Fnv, HashFn, Hashable};
pub mod hash;

pub use self::pair::Pair;
pub mod pair;

pub use self::rc::{DefaultDelete, Deleter, Shared, SliceDelete, Weak};
pub mod rc;

pub use self::unique::Unique;
pub mod unique;

pub use self::tree::{TreeMap, TreeSet};
pub mod tree;

pub use self::skip::{SkipMap, SkipSet};
pub mod skip;

pub use self::table::{HashMap, HashSet};
pub mod table;

mod set_unit;

#[cfg(test)]
mod testing;

#[cfg(test)]
mod tests;
