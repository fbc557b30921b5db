//! Status - StoreRelay の処理件数

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Snapshot of what a relay has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStats {
    /// Documents written to the store.
    pub persisted: usize,
    /// Messages that were not a valid envelope document.
    pub rejected: usize,
    /// Store writes or stream reads that failed.
    pub failed: usize,
}

#[derive(Debug, Default)]
pub(crate) struct RelayCounters {
    persisted: AtomicUsize,
    rejected: AtomicUsize,
    failed: AtomicUsize,
}

impl RelayCounters {
    pub(crate) fn record_persisted(&self) {
        self.persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RelayStats {
        RelayStats {
            persisted: self.persisted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
