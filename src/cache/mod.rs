// src/cache/mod.rs
//! Pre-filled random byte caches

pub mod core;
pub(crate) mod lane;

pub use self::core::Cache;
