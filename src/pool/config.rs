// src/pool/config.rs
//! Configuration for cache pools

use crate::error::{RandError, Result};

/// Tuning constants for caches, the pool that lends them, and the request
/// router in front of both.
///
/// None of these values are part of the security contract; any combination
/// accepted by [`validate`](Self::validate) preserves the guarantee that no
/// random byte is ever served twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Size of each cache's large buffer (bytes, power of two)
    pub buffer_size: usize,
    /// Granularity of consumption from the large buffer (bytes, power of two)
    pub block_size: usize,
    /// Size of each cache's small buffer (bytes)
    pub small_buffer_size: usize,
    /// Requests shorter than this are served from the small buffer; 0 disables it
    pub small_cutoff: usize,
    /// Requests longer than this skip the pool and hit the source directly
    pub bypass_threshold: usize,
    /// Maximum number of idle caches to keep in the pool
    pub max_pool_size: usize,
    /// Number of caches to pre-allocate at startup
    pub min_pool_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            buffer_size: 4096,      // 512 blocks of 8 bytes
            block_size: 8,
            small_buffer_size: 1024,
            small_cutoff: 32,       // waste at 32+ bytes is at most 7/40
            bypass_threshold: 512,
            max_pool_size: 256,
            min_pool_size: 0,
        }
    }
}

impl PoolConfig {
    /// Configuration for memory-constrained targets.
    pub fn compact() -> Self {
        Self {
            buffer_size: 1024,
            block_size: 8,
            small_buffer_size: 256,
            small_cutoff: 32,
            bypass_threshold: 128,
            max_pool_size: 16,
            min_pool_size: 0,
        }
    }

    /// One block-aligned buffer per cache, no small-request lane.
    pub fn single_lane() -> Self {
        Self {
            small_buffer_size: 0,
            small_cutoff: 0,
            ..Self::default()
        }
    }

    /// Checks that the sizes can be honoured by every cache lane.
    pub fn validate(&self) -> Result<()> {
        if !self.buffer_size.is_power_of_two() {
            return Err(invalid(format!(
                "buffer_size {} must be a non-zero power of two",
                self.buffer_size
            )));
        }
        if !self.block_size.is_power_of_two() || self.block_size > self.buffer_size {
            return Err(invalid(format!(
                "block_size {} must be a power of two no larger than buffer_size {}",
                self.block_size, self.buffer_size
            )));
        }
        if self.bypass_threshold > self.buffer_size {
            return Err(invalid(format!(
                "bypass_threshold {} exceeds buffer_size {}",
                self.bypass_threshold, self.buffer_size
            )));
        }
        // Small lane serves n in 1..small_cutoff, so it must hold small_cutoff - 1 bytes.
        if self.small_cutoff > 0 && self.small_cutoff > self.small_buffer_size {
            return Err(invalid(format!(
                "small_cutoff {} exceeds small_buffer_size {}",
                self.small_cutoff, self.small_buffer_size
            )));
        }
        if self.min_pool_size > self.max_pool_size {
            return Err(invalid(format!(
                "min_pool_size {} exceeds max_pool_size {}",
                self.min_pool_size, self.max_pool_size
            )));
        }
        Ok(())
    }

    /// Bytes allocated by one cache.
    pub fn cache_footprint(&self) -> usize {
        self.buffer_size + self.small_lane_size()
    }

    /// Effective small buffer size; zero when the lane is disabled.
    pub(crate) fn small_lane_size(&self) -> usize {
        if self.small_cutoff == 0 {
            0
        } else {
            self.small_buffer_size
        }
    }
}

fn invalid(msg: String) -> RandError {
    RandError::InvalidConfig(msg)
}
