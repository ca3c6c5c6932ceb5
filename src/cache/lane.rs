// src/cache/lane.rs
//! Arena-with-cursor byte buffer drained from its tail.

use crate::error::{RandError, Result};
use crate::source::EntropySource;
use zeroize::Zeroize;

/// A fixed-size arena of random bytes plus a cursor counting how many bytes
/// at its tail are still unconsumed.
///
/// Layout of `data` at any point between operations:
///
/// ```text
/// [0 ............ capacity - available) [capacity - available ... capacity)
///            spent (zeroed)                    fresh, never served
/// ```
///
/// `available` only shrinks, in multiples of `block`, until a full refill
/// resets it to `capacity`. Nothing outside the fresh region is ever copied
/// out, so no byte is served twice.
#[derive(Zeroize)]
#[zeroize(drop)]
pub(crate) struct Lane {
    data: Vec<u8>,
    available: usize,
    block: usize,
}

impl Lane {
    /// Creates an empty lane. `block` must be a power of two dividing `capacity`.
    pub(crate) fn new(capacity: usize, block: usize) -> Self {
        debug_assert!(block.is_power_of_two());
        debug_assert_eq!(capacity % block, 0);
        Self {
            data: vec![0; capacity],
            available: 0,
            block,
        }
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub(crate) fn available(&self) -> usize {
        self.available
    }

    #[inline(always)]
    pub(crate) fn block(&self) -> usize {
        self.block
    }

    /// Copies `out.len()` fresh bytes into `out`, refilling the whole arena
    /// first when the tail is too short.
    ///
    /// Returns `true` if a refill happened. Consumption is rounded up to the
    /// block size; the rounded-off bytes are discarded along with the rest of
    /// the spent region.
    pub(crate) fn take<S>(&mut self, source: &S, out: &mut [u8]) -> Result<bool>
    where
        S: EntropySource + ?Sized,
    {
        let n = out.len();
        let capacity = self.capacity();
        if n > capacity {
            return Err(RandError::RequestTooLarge {
                requested: n,
                capacity,
            });
        }

        let mut refilled = false;
        if n > self.available {
            // Nothing is marked fresh until the source has fully succeeded.
            self.available = 0;
            source.fill(&mut self.data)?;
            self.available = capacity;
            refilled = true;
        }

        let start = capacity - self.available;
        out.copy_from_slice(&self.data[start..start + n]);

        let consumed = (n + self.block - 1) & !(self.block - 1);
        self.data[start..start + consumed].zeroize();
        self.available -= consumed;

        Ok(refilled)
    }

    #[cfg(test)]
    pub(crate) fn spent(&self) -> &[u8] {
        &self.data[..self.capacity() - self.available]
    }
}
