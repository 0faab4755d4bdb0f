//! Per-month mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::Month;

/// Acquires a std mutex, recovering the data of a poisoned lock.
///
/// Engine state is only ever replaced wholesale under the lock, so a panic
/// in another holder cannot leave it half-written.
pub(crate) fn acquire<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registry of one lock per month.
///
/// Uploads, attendance processing and payroll transitions for the same
/// month run one at a time; different months proceed in parallel.
#[derive(Debug, Default)]
pub(crate) struct MonthLocks {
    locks: Mutex<HashMap<Month, Arc<Mutex<()>>>>,
}

impl MonthLocks {
    /// Returns the lock handle of `month`, creating it on first use.
    ///
    /// Callers lock the returned handle with [`acquire`] and hold the guard
    /// for the duration of the month-scoped operation.
    pub(crate) fn handle(&self, month: Month) -> Arc<Mutex<()>> {
        Arc::clone(acquire(&self.locks).entry(month).or_default())
    }
}
