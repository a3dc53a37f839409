//! Allocator plumbing shared by every container in the crate.

pub use self::allocator::Allocator;
mod allocator;

pub use self::global::Global;
mod global;

use core::alloc::Layout;
use core::fmt;
use core::ptr::NonNull;

use crate::error::Error;

/// Error raised while allocating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    pub(crate) layout: Layout,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Failed to allocate {} bytes of memory",
            self.layout.size()
        )
    }
}

#[cfg(feature = "std")]
impl ::std::error::Error for AllocError {}

/// Allocate storage for a single `T`, uninitialized.
pub(crate) fn alloc_one<T, A: Allocator>(alloc: &A) -> Result<NonNull<T>, AllocError> {
    let layout = Layout::new::<T>();
    Ok(alloc.allocate(layout)?.cast())
}

/// Release storage previously obtained from [`alloc_one`].
///
/// The pointee is not dropped; callers run `drop_in_place` first when the
/// slot was initialized.
pub(crate) unsafe fn dealloc_one<T, A: Allocator>(alloc: &A, ptr: NonNull<T>) {
    alloc.deallocate(ptr.cast(), Layout::new::<T>());
}

/// Allocate storage for `n` contiguous `T`, uninitialized.
pub(crate) fn alloc_array<T, A: Allocator>(alloc: &A, n: usize) -> Result<NonNull<T>, Error> {
    let layout = Layout::array::<T>(n).map_err(|_| Error::LayoutError)?;
    Ok(alloc.allocate(layout)?.cast())
}

/// Release storage previously obtained from [`alloc_array`] with the same `n`.
pub(crate) unsafe fn dealloc_array<T, A: Allocator>(alloc: &A, ptr: NonNull<T>, n: usize) {
    // The layout was valid when the array was allocated.
    let layout = Layout::array::<T>(n).unwrap_unchecked();
    alloc.deallocate(ptr.cast(), layout);
}
