// src/text.rs
//! Random token text.

use crate::error::Result;
use crate::rng::SecureRng;
use crate::source::EntropySource;

/// RFC 4648 base32 alphabet.
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Length of generated text: ceil(128 / log2(32)) = 26 characters.
pub const TEXT_LEN: usize = 26;

/// Generates a [`TEXT_LEN`]-character base32 string carrying at least 128
/// bits of randomness, suitable for secret tokens and passwords.
///
/// Each character comes from one random byte reduced mod 32. Since 32
/// divides 256 every symbol is equally likely.
pub fn generate<S: EntropySource>(rng: &SecureRng<S>) -> Result<String> {
    let mut src = [0u8; TEXT_LEN];
    rng.fill(&mut src)?;
    Ok(src
        .iter()
        .map(|&b| ALPHABET[(b & 31) as usize] as char)
        .collect())
}
