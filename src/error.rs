// src/error.rs
//! Error types for random generation with conversion support

use std::fmt;

/// Errors that can occur while generating random data.
///
/// Misuse errors ([`InvalidBound`](Self::InvalidBound),
/// [`BitsTooSmall`](Self::BitsTooSmall), [`InvalidConfig`](Self::InvalidConfig))
/// are detected before any randomness is drawn. [`Source`](Self::Source) means
/// the secure random source itself failed; it is never retried or masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RandError {
    /// Upper bound for a random integer was zero
    InvalidBound,
    /// Requested prime bit length is below 2
    BitsTooSmall(usize),
    /// A cache lane was asked for more bytes than it can ever hold
    RequestTooLarge {
        /// Number of bytes requested
        requested: usize,
        /// Capacity of the lane that received the request
        capacity: usize,
    },
    /// Configuration values are inconsistent
    InvalidConfig(String),
    /// The secure random source reported a failure
    Source(String),
}

impl RandError {
    /// Returns `true` for errors caused by invalid arguments rather than I/O.
    pub fn is_misuse(&self) -> bool {
        !matches!(self, Self::Source(_))
    }
}

impl fmt::Display for RandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBound => write!(f, "Upper bound must be greater than zero"),
            Self::BitsTooSmall(bits) => {
                write!(f, "Prime size must be at least 2 bits, got {}", bits)
            }
            Self::RequestTooLarge {
                requested,
                capacity,
            } => write!(
                f,
                "Request of {} bytes exceeds cache capacity of {} bytes",
                requested, capacity
            ),
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::Source(msg) => write!(f, "Secure random source failed: {}", msg),
        }
    }
}

impl std::error::Error for RandError {}

// ============================================================================
// ERROR CONVERSION
// ============================================================================

/// Convert RandError to std::io::Error
impl From<RandError> for std::io::Error {
    fn from(err: RandError) -> Self {
        use std::io::ErrorKind;
        match err {
            RandError::Source(_) => std::io::Error::new(ErrorKind::Other, err),
            _ => std::io::Error::new(ErrorKind::InvalidInput, err),
        }
    }
}

/// Convert std::io::Error to RandError
impl From<std::io::Error> for RandError {
    fn from(err: std::io::Error) -> Self {
        match err.get_ref().and_then(|inner| inner.downcast_ref::<RandError>()) {
            Some(inner) => inner.clone(),
            None => RandError::Source(err.to_string()),
        }
    }
}

impl From<getrandom::Error> for RandError {
    fn from(err: getrandom::Error) -> Self {
        RandError::Source(err.to_string())
    }
}

/// Unwraps a RandError that crossed an `RngCore` boundary, otherwise wraps
/// the foreign error as a source failure
impl From<rand_core::Error> for RandError {
    fn from(err: rand_core::Error) -> Self {
        match err.take_inner().downcast::<RandError>() {
            Ok(inner) => *inner,
            Err(other) => RandError::Source(other.to_string()),
        }
    }
}

/// Convert RandError to rand_core::Error so it can cross `RngCore::try_fill_bytes`
impl From<RandError> for rand_core::Error {
    fn from(err: RandError) -> Self {
        rand_core::Error::new(err)
    }
}

/// Convert RandError to anyhow::Error
#[cfg(feature = "anyhow")]
impl From<RandError> for anyhow::Error {
    fn from(err: RandError) -> Self {
        anyhow::anyhow!("{}", err)
    }
}

/// Allow using ? with anyhow::Error
#[cfg(feature = "anyhow")]
impl From<anyhow::Error> for RandError {
    fn from(err: anyhow::Error) -> Self {
        RandError::Source(err.to_string())
    }
}

/// Result type alias for random generation
pub type Result<T> = std::result::Result<T, RandError>;

/// Extension trait for converting Results between different error types
pub trait ResultExt<T> {
    /// Convert to anyhow::Result
    #[cfg(feature = "anyhow")]
    fn into_anyhow(self) -> anyhow::Result<T>;

    /// Convert to io::Result
    fn into_io(self) -> std::io::Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    #[cfg(feature = "anyhow")]
    fn into_anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| e.into())
    }

    fn into_io(self) -> std::io::Result<T> {
        self.map_err(|e| e.into())
    }
}
