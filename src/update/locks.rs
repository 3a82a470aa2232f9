//! Per-unit write serialization.
//!
//! Concurrent updates to the same unit would otherwise race at the
//! filesystem level (last write wins). One lock per unit name serializes the
//! whole resolve-authorize-write-reload sequence for that unit while leaving
//! updates to different units independent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lock table keyed by unit name.
#[derive(Default)]
pub struct UnitLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UnitLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for a unit, creating it on first use.
    ///
    /// The caller holds the returned Arc and locks it for the duration of the
    /// update. Entries are never removed; the set of edited unit names is
    /// small and bounded by the host's unit count.
    pub fn for_unit(&self, unit: &str) -> Arc<Mutex<()>> {
        let mut table = lock_unpoisoned(&self.inner);
        Arc::clone(table.entry(unit.to_string()).or_default())
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
