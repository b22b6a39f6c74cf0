//! Cooperative stop signal with an acknowledgment ledger
//!
//! Stopping is separate from closing channels: raising the
//! signal never touches buffered work. Workers poll [`StopSign::signaled`]
//! between units of work, acknowledge with [`StopSign::deal`], and exit.
//! The orchestrator compares [`StopSign::deal_total`] against its worker
//! count to see whether anyone is still stuck mid-unit.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Stop flag plus per-participant acknowledgment counts
#[derive(Debug, Default)]
pub struct StopSign {
    /// Mirrors the flag for lock-free polling. Only written under `deal_counts`' write lock.
    signaled: AtomicBool,
    deal_counts: RwLock<HashMap<String, u32>>,
}

impl StopSign {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal. Returns `false` if it was already raised.
    pub fn sign(&self) -> bool {
        let _ledger = self.write();
        if self.signaled.load(Ordering::Acquire) {
            tracing::debug!("Stop signal already raised");
            return false;
        }
        self.signaled.store(true, Ordering::Release);
        tracing::info!("Stop signal raised");
        true
    }

    /// Whether a stop has been requested
    pub fn signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }

    /// Record that participant `code` observed the signal
    ///
    /// Silently ignored while the signal is not raised.
    pub fn deal(&self, code: &str) {
        let mut ledger = self.write();
        if !self.signaled.load(Ordering::Acquire) {
            return;
        }

        match ledger.get_mut(code) {
            Some(count) => *count = count.saturating_add(1),
            None => {
                ledger.insert(code.to_owned(), 1);
            }
        }
        drop(ledger);

        tracing::debug!(code, "Stop signal acknowledged");
        crate::metrics::record_stop_ack(code);
    }

    /// Acknowledgments recorded for `code`
    pub fn deal_count(&self, code: &str) -> u32 {
        self.read().get(code).copied().unwrap_or(0)
    }

    /// Acknowledgments recorded across all participants
    pub fn deal_total(&self) -> u32 {
        self.read()
            .values()
            .fold(0u32, |total, count| total.saturating_add(*count))
    }

    /// Lower the signal and clear the ledger
    ///
    /// Quiesce the previous round first: `sign`/`deal` calls racing with a
    /// reset may land on either side of it.
    pub fn reset(&self) {
        let mut ledger = self.write();
        ledger.clear();
        self.signaled.store(false, Ordering::Release);
        tracing::info!("Stop signal reset");
    }

    /// Human-readable state, ledger sorted by participant code
    pub fn summary(&self) -> String {
        self.to_string()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, u32>> {
        self.deal_counts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, u32>> {
        self.deal_counts.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Display for StopSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ledger = self.read();
        if !self.signaled.load(Ordering::Acquire) {
            return f.write_str("signaled: false");
        }
        let sorted: BTreeMap<&str, u32> = ledger.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        write!(f, "signaled: true, deal_count: {sorted:?}")
    }
}
