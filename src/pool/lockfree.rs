// src/pool/lockfree.rs
//! Lock-free pool of random byte caches.
//!
//! # Ownership
//!
//! A [`Cache`] lives either inside the pool's idle queue or inside exactly one
//! [`CacheGuard`]. `acquire` moves it out of the queue and the guard's `Drop`
//! moves it back, so two callers can never hold the same cache and the cache
//! itself needs no lock. The only shared state is the queue and the counters.
//!
//! # Pool Size Limits
//!
//! When a guard is dropped and `max_pool_size` caches are already idle, the
//! cache is dropped instead of queued; its buffers are zeroed by the lanes'
//! `#[zeroize(drop)]`. Losing a cache only costs a later refill.
//!
//! The idle counter and the queue are not updated in one transaction, so the
//! pool may transiently hold a few more than `max_pool_size` caches under
//! heavy concurrency. This bound is best-effort and has no effect on
//! correctness.

use super::config::PoolConfig;
use super::stats::{PoolStats, PoolStatsInner};
use crate::cache::Cache;
use crate::error::Result;
use crate::source::{EntropySource, OsEntropy};
use std::sync::atomic::{AtomicUsize, Ordering};

// ---------------------------------------------------------------------------
// Lock-free queue with approximate size tracking
// ---------------------------------------------------------------------------

/// Wrapper around `crossbeam::SegQueue` that tracks an approximate length.
///
/// The counter and the queue are **not** updated atomically, so `len()` may
/// be briefly stale.  This is acceptable for pool-sizing heuristics.
struct LockFreeQueue<T> {
    items: crossbeam::queue::SegQueue<T>,
    size: AtomicUsize,
}

impl<T> LockFreeQueue<T> {
    fn new() -> Self {
        Self {
            items: crossbeam::queue::SegQueue::new(),
            size: AtomicUsize::new(0),
        }
    }

    #[inline]
    fn push(&self, item: T) {
        self.items.push(item);
        self.size.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn pop(&self) -> Option<T> {
        self.items.pop().inspect(|_| {
            self.size.fetch_sub(1, Ordering::Relaxed);
        })
    }

    /// Approximate queue length, may be briefly stale.
    #[inline]
    fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// CachePool
// ---------------------------------------------------------------------------

/// Concurrent pool handing out exclusively owned [`Cache`] instances.
///
/// The pool owns the entropy source used for every refill of its caches, so
/// caches filled from one source are never mixed into a pool using another.
///
/// # Example
///
/// ```rust
/// use secrand::prelude::*;
/// use std::sync::Arc;
/// use std::thread;
///
/// let pool = Arc::new(CachePool::new(OsEntropy, PoolConfig::default())?);
///
/// let handles: Vec<_> = (0..4).map(|_| {
///     let pool = Arc::clone(&pool);
///     thread::spawn(move || {
///         let mut out = [0u8; 16];
///         for _ in 0..1000 {
///             pool.acquire().fill(&mut out).unwrap();
///         }
///     })
/// }).collect();
/// for h in handles { h.join().unwrap(); }
///
/// assert_eq!(pool.stats().acquired, 4000);
/// # Ok::<(), secrand::RandError>(())
/// ```
pub struct CachePool<S: EntropySource = OsEntropy> {
    idle: LockFreeQueue<Cache>,
    source: S,
    config: PoolConfig,
    stats: PoolStatsInner,
}

impl Default for CachePool<OsEntropy> {
    fn default() -> Self {
        Self::from_valid(OsEntropy, PoolConfig::default())
    }
}

impl<S: EntropySource> CachePool<S> {
    /// Creates a pool and pre-warms it with `config.min_pool_size` caches.
    ///
    /// Fails if `config` does not pass [`PoolConfig::validate`].
    pub fn new(source: S, config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(source, config))
    }

    pub(crate) fn from_valid(source: S, config: PoolConfig) -> Self {
        let idle = LockFreeQueue::new();
        for _ in 0..config.min_pool_size {
            idle.push(Cache::new(&config));
        }
        let stats = PoolStatsInner::default();
        stats
            .allocated
            .store(config.min_pool_size, Ordering::Relaxed);
        Self {
            idle,
            source,
            config,
            stats,
        }
    }

    /// Checks out a cache, allocating an empty one if none is idle.
    ///
    /// Never blocks and never fails. The cache goes back to the pool when
    /// the returned guard is dropped.
    #[inline]
    pub fn acquire(&self) -> CacheGuard<'_, S> {
        PoolStatsInner::bump(&self.stats.acquired);

        let cache = self.idle.pop().unwrap_or_else(|| {
            PoolStatsInner::bump(&self.stats.allocated);
            tracing::debug!(
                footprint = self.config.cache_footprint(),
                "allocating new random cache"
            );
            Cache::new(&self.config)
        });

        CacheGuard {
            cache: Some(cache),
            pool: self,
        }
    }

    /// Number of caches currently idle in the pool.
    #[inline]
    pub fn available(&self) -> usize {
        self.idle.len()
    }

    /// Returns a snapshot of pool statistics.
    pub fn stats(&self) -> PoolStats {
        self.stats.snapshot(self.idle.len())
    }

    /// Pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Entropy source used for refills.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Drops every idle cache. Buffers are zeroed as they drop.
    pub fn clear(&self) {
        while self.idle.pop().is_some() {}
    }

    /// Pre-allocates caches until about `target_size` are idle (capped at
    /// `max_pool_size`).
    ///
    /// New caches start empty; their first use performs a refill.
    pub fn warm(&self, target_size: usize) {
        let target = target_size.min(self.config.max_pool_size);
        let current = self.idle.len();
        for _ in current..target {
            PoolStatsInner::bump(&self.stats.allocated);
            self.idle.push(Cache::new(&self.config));
        }
    }

    pub(crate) fn record_bypass(&self) {
        PoolStatsInner::bump(&self.stats.bypassed);
    }

    fn release(&self, cache: Cache) {
        PoolStatsInner::bump(&self.stats.returned);
        if self.idle.len() < self.config.max_pool_size {
            self.idle.push(cache);
        } else {
            PoolStatsInner::bump(&self.stats.discarded);
            tracing::debug!("pool full, discarding random cache");
        }
    }
}

impl<S: EntropySource + std::fmt::Debug> std::fmt::Debug for CachePool<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachePool")
            .field("source", &self.source)
            .field("config", &self.config)
            .field("available", &self.idle.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// CacheGuard
// ---------------------------------------------------------------------------

const HELD: &str = "guard holds its cache until dropped";

/// Exclusive checkout of a [`Cache`] from a [`CachePool`].
///
/// The guard is the only handle through which a cache can be drained. On drop
/// the cache is returned to the pool if space permits, otherwise it is
/// dropped and zeroed.
pub struct CacheGuard<'p, S: EntropySource = OsEntropy> {
    cache: Option<Cache>,
    pool: &'p CachePool<S>,
}

impl<S: EntropySource> CacheGuard<'_, S> {
    /// Fills `out` with fresh bytes from the checked-out cache, refilling it
    /// from the pool's source when needed.
    ///
    /// `out` must fit the cache: at most `buffer_size` bytes, and fewer than
    /// `small_cutoff` bytes for the small lane. Larger requests return
    /// [`RandError::RequestTooLarge`](crate::RandError::RequestTooLarge).
    #[inline]
    pub fn fill(&mut self, out: &mut [u8]) -> Result<()> {
        let cache = self.cache.as_mut().expect(HELD);
        if cache.take(&self.pool.source, out)? {
            PoolStatsInner::bump(&self.pool.stats.refills);
            tracing::trace!(requested = out.len(), "refilled random cache");
        }
        Ok(())
    }

    /// Drops the cache now instead of returning it to the pool.
    pub fn discard(mut self) {
        if self.cache.take().is_some() {
            PoolStatsInner::bump(&self.pool.stats.returned);
            PoolStatsInner::bump(&self.pool.stats.discarded);
        }
    }
}

impl<S: EntropySource> std::ops::Deref for CacheGuard<'_, S> {
    type Target = Cache;
    fn deref(&self) -> &Self::Target {
        self.cache.as_ref().expect(HELD)
    }
}

impl<S: EntropySource> Drop for CacheGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(cache) = self.cache.take() {
            self.pool.release(cache);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
