//! Clock sources for the sale ledger.
//!
//! The ledger never reads wall-clock time on its own. Every operation samples
//! the injected [`Clock`] exactly once and uses that instant for all of its
//! time gates.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current unix time in seconds
pub trait Clock: Send + Sync {
    /// Current unix timestamp in seconds
    fn now(&self) -> u64;

    /// Seconds elapsed since `since`, zero when `since` lies in the future
    fn elapsed_since(&self, since: u64) -> u64 {
        self.now().saturating_sub(since)
    }
}

/// Wall clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        Utc::now().timestamp().max(0) as u64
    }
}

/// Manually driven clock that can be fast-forwarded.
///
/// Moving backwards is rejected, matching a host ledger whose block time only
/// ever increases.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Create a clock frozen at the current system time
    pub fn starting_now() -> Self {
        Self::new(SystemClock.now())
    }

    /// Move the clock forward by `secs`
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump to an absolute timestamp. Returns false (and leaves the clock
    /// untouched) if `timestamp` is in the past.
    pub fn travel_to(&self, timestamp: u64) -> bool {
        let current = self.now.load(Ordering::SeqCst);
        if timestamp < current {
            return false;
        }
        self.now.store(timestamp, Ordering::SeqCst);
        true
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
