//! Synchronisation utilities for robust mutex handling
//!
//! Message callbacks are user code and run while the dispatcher holds the
//! message's lock. A panicking callback poisons that lock; these helpers
//! turn the poison into a module error instead of a second panic.

use std::sync::{LockResult, MutexGuard, PoisonError};

/// Handle poisoned mutex cases with consistent error handling
///
/// # Arguments
/// * `result` - The result from a mutex lock operation
/// * `error_constructor` - Function to create the appropriate error type
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use ses::core::sync::handle_mutex_poison;
/// use ses::dispatch::DispatchError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(mutex.lock(), |message| {
///     DispatchError::Synchronisation { message }
/// })
/// .unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). This indicates a panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}

/// Lock a mutex whose protected state stays consistent across a panic
///
/// Only for plain bookkeeping values (counters, timestamps) that are
/// written in a single statement, where the data behind a poisoned lock
/// is still valid.
pub fn lock_recovering<T: ?Sized>(result: LockResult<MutexGuard<'_, T>>) -> MutexGuard<'_, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}
