// src/cache/core.rs
//! The checkout unit lent out by the pool.

use super::lane::Lane;
use crate::error::Result;
use crate::pool::PoolConfig;
use crate::source::EntropySource;

/// A pair of pre-filled random byte buffers owned by one caller at a time.
///
/// Requests of at least `small_cutoff` bytes drain the *large* lane, whose
/// consumption is rounded up to whole blocks. Shorter requests drain the
/// *small* lane byte by byte so that a 4-byte request does not throw away
/// half a block. With the small lane disabled every request goes to the
/// large lane.
///
/// A `Cache` cannot be constructed outside the crate: the only way to reach
/// one is [`CachePool::acquire`](crate::pool::CachePool::acquire), which
/// guarantees exclusive ownership and therefore needs no locking here.
pub struct Cache {
    large: Lane,
    small: Lane,
    small_cutoff: usize,
}

impl Cache {
    pub(crate) fn new(config: &PoolConfig) -> Self {
        Self {
            large: Lane::new(config.buffer_size, config.block_size),
            small: Lane::new(config.small_lane_size(), 1),
            small_cutoff: config.small_cutoff,
        }
    }

    /// Fills `out` with bytes never served before by any cache.
    ///
    /// Returns `true` if a lane had to be refilled from `source`. A refill
    /// failure is returned as-is and leaves the affected lane empty.
    #[inline]
    pub(crate) fn take<S>(&mut self, source: &S, out: &mut [u8]) -> Result<bool>
    where
        S: EntropySource + ?Sized,
    {
        if out.len() < self.small_cutoff {
            self.small.take(source, out)
        } else {
            self.large.take(source, out)
        }
    }

    /// Fresh bytes remaining in the large buffer.
    #[inline]
    pub fn available(&self) -> usize {
        self.large.available()
    }

    /// Fresh bytes remaining in the small buffer.
    #[inline]
    pub fn small_available(&self) -> usize {
        self.small.available()
    }

    /// Size of the large buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.large.capacity()
    }

    /// Consumption granularity of the large buffer.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.large.block()
    }
}

impl std::fmt::Debug for Cache {
    // Never print buffer contents.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("capacity", &self.large.capacity())
            .field("available", &self.large.available())
            .field("small_capacity", &self.small.capacity())
            .field("small_available", &self.small.available())
            .finish()
    }
}
