// src/pool/stats.rs
//! Statistics tracking for cache pools.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Live counters shared by a pool and its guards.
#[derive(Default)]
pub(crate) struct PoolStatsInner {
    pub(crate) allocated: AtomicUsize,
    pub(crate) acquired: AtomicUsize,
    pub(crate) returned: AtomicUsize,
    pub(crate) discarded: AtomicUsize,
    pub(crate) refills: AtomicUsize,
    pub(crate) bypassed: AtomicUsize,
}

impl PoolStatsInner {
    #[inline]
    pub(crate) fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, available: usize) -> PoolStats {
        PoolStats {
            available,
            allocated: self.allocated.load(Ordering::Relaxed),
            acquired: self.acquired.load(Ordering::Relaxed),
            returned: self.returned.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            refills: self.refills.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of pool statistics.
///
/// Counters use `Relaxed` ordering; under concurrent load the values are
/// eventually consistent rather than an exact point-in-time view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of caches currently idle in the pool
    pub available: usize,
    /// Total number of caches allocated since pool creation
    pub allocated: usize,
    /// Total number of acquire() calls
    pub acquired: usize,
    /// Total number of caches handed back by guards
    pub returned: usize,
    /// Caches dropped instead of pooled (pool full or explicit discard)
    pub discarded: usize,
    /// Full buffer refills from the entropy source
    pub refills: usize,
    /// Requests that skipped the pool and went straight to the source
    pub bypassed: usize,
}

impl PoolStats {
    /// Returns the number of caches currently checked out.
    ///
    /// # Examples
    ///
    /// ```
    /// use secrand::prelude::*;
    ///
    /// let pool = CachePool::new(OsEntropy, PoolConfig::default())?;
    /// let _cache = pool.acquire();
    ///
    /// assert_eq!(pool.stats().in_use(), 1);
    /// # Ok::<(), secrand::RandError>(())
    /// ```
    pub fn in_use(&self) -> usize {
        self.acquired.saturating_sub(self.returned)
    }

    /// Returns the pool hit rate as a percentage (0.0-100.0).
    ///
    /// A higher hit rate indicates better cache reuse and fewer allocations.
    pub fn hit_rate(&self) -> f64 {
        if self.acquired == 0 {
            return 0.0;
        }
        let reused = self.acquired.saturating_sub(self.allocated);
        (reused as f64 / self.acquired as f64) * 100.0
    }

    /// Total calls made into the entropy source, cached and direct.
    pub fn source_calls(&self) -> usize {
        self.refills + self.bypassed
    }
}
