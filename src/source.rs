// src/source.rs
//! The secure random source behind every cache refill.
//!
//! The crate never produces entropy itself. Everything it hands out was
//! written by an [`EntropySource`], which in production is the operating
//! system CSPRNG reached through [`getrandom`].

use crate::error::Result;

/// A provider of cryptographically secure random bytes.
///
/// Implementations must fill `dst` completely or return an error; a partial
/// fill reported as success would break the freshness guarantee of every
/// cache built on top. Sources are shared by all threads using a pool, so
/// they must be `Send + Sync`.
pub trait EntropySource: Send + Sync {
    /// Fills `dst` entirely with fresh random bytes.
    fn fill(&self, dst: &mut [u8]) -> Result<()>;
}

/// Operating system CSPRNG via `getrandom`.
///
/// On Linux this is `getrandom(2)`, on macOS `getentropy`, on Windows
/// `ProcessPrng`; see the `getrandom` documentation for the full table.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    #[inline]
    fn fill(&self, dst: &mut [u8]) -> Result<()> {
        let len = dst.len();
        getrandom::fill(dst).map_err(|err| {
            tracing::error!(len, %err, "OS entropy source failed");
            err.into()
        })
    }
}

impl<S: EntropySource + ?Sized> EntropySource for &S {
    #[inline]
    fn fill(&self, dst: &mut [u8]) -> Result<()> {
        (**self).fill(dst)
    }
}

impl<S: EntropySource + ?Sized> EntropySource for std::sync::Arc<S> {
    #[inline]
    fn fill(&self, dst: &mut [u8]) -> Result<()> {
        (**self).fill(dst)
    }
}
