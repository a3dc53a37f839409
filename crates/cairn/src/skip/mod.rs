//! An ordered map and set backed by a probabilistic skip list.

pub use self::map::SkipMap;
pub mod map;

pub use self::set::SkipSet;
pub mod set;

pub(crate) mod raw;
