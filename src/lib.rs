// src/lib.rs
//! # Pooled Secure Random Bytes
//!
//! A fast front end to the operating system CSPRNG for programs that ask for
//! many small amounts of random data (keys, nonces, IDs, tokens).
//!
//! Every request under [`PoolConfig::bypass_threshold`] bytes (512 by
//! default) is served from a pre-filled 4 KiB cache checked out of a
//! lock-free pool, so the cost of one system call is shared by many requests.
//! Larger requests go straight to the OS source.
//!
//! Features:
//! - No random byte is ever served twice; spent bytes are zeroed immediately
//! - Contention-free caches: each caller owns its cache while using it
//! - Lock-free pool built on `crossbeam`'s `SegQueue`
//! - Caches are securely zeroed on drop using the `zeroize` crate
//! - `io::Read` and `rand_core::{RngCore, CryptoRng}` adapters
//! - Uniform big integers, probable primes and base32 token text
//!
//! ```
//! let mut id = [0u8; 16];
//! secrand::fill(&mut id)?;
//!
//! let token = secrand::text()?;
//! assert_eq!(token.len(), 26);
//! # Ok::<(), secrand::RandError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod error;
pub mod integer;
pub mod pool;
pub mod rng;
pub mod source;
pub mod text;

// Re-export main types
pub use cache::Cache;
pub use error::{RandError, Result, ResultExt};
pub use integer::{probable_prime, random_int};
pub use pool::{CacheGuard, CachePool, PoolConfig, PoolStats};
pub use rng::{Reader, SecureRng, fill, global, reader, text};
pub use source::{EntropySource, OsEntropy};

/// Commonly used imports.
pub mod prelude {
    pub use crate::cache::Cache;
    pub use crate::error::{RandError, Result, ResultExt};
    pub use crate::integer::{probable_prime, random_int};
    pub use crate::pool::{CacheGuard, CachePool, PoolConfig, PoolStats};
    pub use crate::rng::{Reader, SecureRng};
    pub use crate::source::{EntropySource, OsEntropy};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_basic_fill() {
        let mut buf = [0u8; 64];
        assert_eq!(crate::fill(&mut buf).unwrap(), 64);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_custom_pool() {
        let rng = SecureRng::new(OsEntropy, PoolConfig::compact()).unwrap();
        let mut buf = [0u8; 100];
        for _ in 0..50 {
            rng.fill(&mut buf).unwrap();
        }
        let stats = rng.stats();
        assert_eq!(stats.acquired, 50);
        assert_eq!(stats.allocated, 1);
    }

    #[test]
    fn test_compact_bypass() {
        let rng = SecureRng::new(OsEntropy, PoolConfig::compact()).unwrap();
        let mut buf = [0u8; 200];
        rng.fill(&mut buf).unwrap();
        assert_eq!(rng.stats().bypassed, 1);
        assert_eq!(rng.stats().acquired, 0);
    }
}
