// src/pool/mod.rs
//! Concurrent pool lending random byte caches.

pub(crate) mod config;
pub(crate) mod lockfree;
pub(crate) mod stats;

pub use config::PoolConfig;
pub use lockfree::{CacheGuard, CachePool};
pub use stats::PoolStats;
