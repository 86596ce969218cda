//! Memory Tracker Module
//!
//! Process-wide approximate byte accounting with a hard upper limit.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CacheError, Result};

// == Memory Tracker ==
/// Lock-free counter of approximate bytes in use.
///
/// Upper layers report deltas (key size + value size + fixed overhead); the
/// tracker never inspects objects. Accounting is intentionally approximate:
/// updates use relaxed ordering because no happens-before relationship is
/// claimed, and release saturates at zero so over-release from the
/// approximate model can never wrap the counter.
#[derive(Debug)]
pub struct MemoryTracker {
    max_bytes: u64,
    current_bytes: AtomicU64,
}

impl MemoryTracker {
    // == Constructor ==
    /// Creates a tracker enforcing `max_bytes`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `max_bytes` is zero.
    pub fn new(max_bytes: u64) -> Result<Self> {
        if max_bytes == 0 {
            return Err(CacheError::InvalidArgument(
                "memory limit must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            max_bytes,
            current_bytes: AtomicU64::new(0),
        })
    }

    // == Reserve ==
    /// Records `bytes` of new usage.
    ///
    /// Returns true if usage is still within the limit afterwards. The
    /// reservation is recorded either way; callers react to the overshoot by
    /// scheduling eviction, not by failing the write.
    pub fn reserve(&self, bytes: u64) -> bool {
        self.current_bytes.fetch_add(bytes, Ordering::Relaxed);
        !self.is_over_limit()
    }

    // == Release ==
    /// Records `bytes` freed. Saturates at zero.
    pub fn release(&self, bytes: u64) {
        let mut current = self.current_bytes.load(Ordering::Relaxed);
        loop {
            let next = current.saturating_sub(bytes);
            match self.current_bytes.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }

    // == Accessors ==
    /// Returns the current approximate usage in bytes.
    pub fn current_usage(&self) -> u64 {
        self.current_bytes.load(Ordering::Relaxed)
    }

    /// Returns the configured limit in bytes.
    pub fn max_limit(&self) -> u64 {
        self.max_bytes
    }

    /// Returns true if usage exceeds the limit.
    pub fn is_over_limit(&self) -> bool {
        self.current_usage() > self.max_bytes
    }
}
