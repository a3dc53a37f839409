// In no-std environments, the implementor must define these functions.
//
// Normally these make use of thread-local storage, but if you want them to be
// completely disabled simply return dummy values, or store the budget in
// static storage if the environment is single threaded.
extern "C" {
    /// Take the given amount of memory from the current budget. Return
    /// `false` if the budget has been breached, or `true` otherwise.
    fn __cairn_memory_take(amount: usize) -> bool;

    /// Release the given amount of memory to the current budget.
    fn __cairn_memory_release(amount: usize);

    /// Get the remaining memory budget for the current thread.
    fn __cairn_memory_get() -> usize;

    /// Replace the memory budget for the current thread and return the one
    /// which was previously set.
    fn __cairn_memory_replace(value: usize) -> usize;
}

pub(super) fn cairn_memory_take(amount: usize) -> bool {
    // SAFETY: implementor is expected to have read the documentation and
    // implemented this correctly.
    unsafe { __cairn_memory_take(amount) }
}

pub(super) fn cairn_memory_release(amount: usize) {
    // SAFETY: implementor is expected to have read the documentation and
    // implemented this correctly.
    unsafe { __cairn_memory_release(amount) }
}

pub(super) fn cairn_memory_get() -> usize {
    // SAFETY: implementor is expected to have read the documentation and
    // implemented this correctly.
    unsafe { __cairn_memory_get() }
}

pub(super) fn cairn_memory_replace(value: usize) -> usize {
    // SAFETY: implementor is expected to have read the documentation and
    // implemented this correctly.
    unsafe { __cairn_memory_replace(value) }
}
