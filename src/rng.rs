// src/rng.rs
//! Request routing in front of the cache pool, plus the process-wide instance.
//!
//! [`SecureRng::fill`] is the single entry point for random bytes:
//!
//! 1. **Empty request**: returns immediately.
//! 2. **Large request** (`> bypass_threshold`): one direct call into the
//!    entropy source. The pool is not touched; once a transfer is large the
//!    fixed cost of the call is a small fraction of it.
//! 3. **Small request**: check out a cache, drain it, return it.

use crate::error::{RandError, Result};
use crate::pool::{CachePool, PoolConfig, PoolStats};
use crate::source::{EntropySource, OsEntropy};
use std::sync::LazyLock;

/// Cached front end to an [`EntropySource`].
///
/// Construct one per process (or use [`global`]) and share it by reference
/// or `Arc`; it is `Send + Sync` and every method takes `&self`.
///
/// # Examples
///
/// ```
/// use secrand::SecureRng;
///
/// let rng: SecureRng = SecureRng::default();
/// let mut key = [0u8; 32];
/// rng.fill(&mut key)?;
/// # Ok::<(), secrand::RandError>(())
/// ```
pub struct SecureRng<S: EntropySource = OsEntropy> {
    pool: CachePool<S>,
}

impl Default for SecureRng<OsEntropy> {
    fn default() -> Self {
        Self {
            pool: CachePool::default(),
        }
    }
}

impl<S: EntropySource> SecureRng<S> {
    /// Creates a router over a fresh pool for `source`.
    pub fn new(source: S, config: PoolConfig) -> Result<Self> {
        Ok(Self {
            pool: CachePool::new(source, config)?,
        })
    }

    /// Default tuning over a custom source.
    pub fn with_source(source: S) -> Self {
        Self {
            pool: CachePool::from_valid(source, PoolConfig::default()),
        }
    }

    /// Fills `buf` completely with secure random bytes.
    ///
    /// Returns the number of bytes written, which is always `buf.len()` on
    /// success. Source failures are returned on both the cached and the
    /// direct path; no weaker fallback is ever used.
    pub fn fill(&self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len();
        if n == 0 {
            return Ok(0);
        }

        if n > self.pool.config().bypass_threshold {
            self.pool.record_bypass();
            tracing::trace!(len = n, "bypassing cache pool");
            self.pool.source().fill(buf)?;
            return Ok(n);
        }

        self.pool.acquire().fill(buf)?;
        Ok(n)
    }

    /// Stream adapter over [`fill`](Self::fill).
    pub fn reader(&self) -> Reader<'_, S> {
        Reader { rng: self }
    }

    /// Random token text; see [`crate::text::generate`].
    pub fn text(&self) -> Result<String> {
        crate::text::generate(self)
    }

    /// Pool backing this router.
    pub fn pool(&self) -> &CachePool<S> {
        &self.pool
    }

    /// Shortcut for `self.pool().stats()`.
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Byte stream backed by a [`SecureRng`].
///
/// `read` behaves exactly like [`SecureRng::fill`]: it always fills the whole
/// buffer or fails. The reader also implements [`rand_core::RngCore`] and
/// [`rand_core::CryptoRng`], so it can drive [`random_int`](crate::random_int),
/// [`probable_prime`](crate::probable_prime) or any `rand` API.
///
/// # Panics
///
/// `RngCore::fill_bytes`, `next_u32` and `next_u64` have no error channel and
/// panic if the entropy source fails. Use `try_fill_bytes` or `io::Read` to
/// handle the failure instead.
pub struct Reader<'a, S: EntropySource = OsEntropy> {
    rng: &'a SecureRng<S>,
}

impl<S: EntropySource> Clone for Reader<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: EntropySource> Copy for Reader<'_, S> {}

impl<S: EntropySource> std::io::Read for Reader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.rng.fill(buf).map_err(Into::into)
    }
}

impl<S: EntropySource> rand_core::RngCore for Reader<'_, S> {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(err) = self.rng.fill(dest) {
            panic!("secure random source failed: {}", err);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
        self.rng.fill(dest).map(|_| ()).map_err(RandError::into)
    }
}

impl<S: EntropySource> rand_core::CryptoRng for Reader<'_, S> {}

// ---------------------------------------------------------------------------
// Process-wide instance
// ---------------------------------------------------------------------------

static GLOBAL: LazyLock<SecureRng> = LazyLock::new(SecureRng::default);

/// The process-wide [`SecureRng`] over the operating system CSPRNG.
///
/// Created on first use with [`PoolConfig::default`]. Code that needs a
/// different source or tuning should own its own `SecureRng` instead.
pub fn global() -> &'static SecureRng {
    &GLOBAL
}

/// Fills `buf` from the process-wide instance.
///
/// # Examples
///
/// ```
/// let mut nonce = [0u8; 12];
/// assert_eq!(secrand::fill(&mut nonce)?, 12);
/// # Ok::<(), secrand::RandError>(())
/// ```
pub fn fill(buf: &mut [u8]) -> Result<usize> {
    GLOBAL.fill(buf)
}

/// Reader over the process-wide instance.
pub fn reader() -> Reader<'static> {
    GLOBAL.reader()
}

/// Random token text from the process-wide instance.
///
/// # Examples
///
/// ```
/// let token = secrand::text()?;
/// assert_eq!(token.len(), 26);
/// # Ok::<(), secrand::RandError>(())
/// ```
pub fn text() -> Result<String> {
    GLOBAL.text()
}
