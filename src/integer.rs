// src/integer.rs
//! Uniform big integers and probable primes drawn from any secure RNG.
//!
//! Both functions pull raw bytes through [`RngCore::try_fill_bytes`], so a
//! source failure surfaces as [`RandError::Source`] instead of a panic. They
//! add no caching of their own; pass a [`Reader`](crate::Reader) to route
//! their draws through the cache pool.

use crate::error::{RandError, Result};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::RngCore;

/// Miller-Rabin rounds for [`probable_prime`]. Error probability is at most
/// 4^-20 for adversarial input and far lower for random candidates.
const MILLER_RABIN_ROUNDS: usize = 20;

/// Primes used for trial division before Miller-Rabin.
const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Returns a uniform random value in `[0, max)`.
///
/// Rejection-samples `bitlen(max - 1)` random bits until the value falls
/// below `max`; each attempt succeeds with probability above one half.
///
/// # Errors
///
/// [`RandError::InvalidBound`] if `max` is zero, before any bytes are drawn.
/// [`RandError::Source`] if `rng` fails.
///
/// # Examples
///
/// ```
/// use num_bigint::BigUint;
///
/// let max = BigUint::from(1000u32);
/// let n = secrand::random_int(&mut secrand::reader(), &max)?;
/// assert!(n < max);
/// # Ok::<(), secrand::RandError>(())
/// ```
pub fn random_int<R: RngCore + ?Sized>(rng: &mut R, max: &BigUint) -> Result<BigUint> {
    if max.is_zero() {
        return Err(RandError::InvalidBound);
    }

    let top = max - 1u32;
    let bits = top.bits();
    if bits == 0 {
        return Ok(BigUint::zero());
    }

    let mut bytes = vec![0u8; bits.div_ceil(8) as usize];
    // Bits of the leading byte that belong to the value.
    let lead = match bits % 8 {
        0 => 8,
        b => b,
    };
    loop {
        rng.try_fill_bytes(&mut bytes)?;
        bytes[0] &= ((1u16 << lead) - 1) as u8;
        let n = BigUint::from_bytes_be(&bytes);
        if &n < max {
            return Ok(n);
        }
    }
}

/// Returns a number of exactly `bits` bits that is prime with high
/// probability.
///
/// Candidates have their two highest bits set, so the product of two such
/// primes has exactly `2 * bits` bits, and their lowest bit set.
///
/// # Errors
///
/// [`RandError::BitsTooSmall`] if `bits < 2`. [`RandError::Source`] if `rng`
/// fails.
pub fn probable_prime<R: RngCore + ?Sized>(rng: &mut R, bits: usize) -> Result<BigUint> {
    if bits < 2 {
        return Err(RandError::BitsTooSmall(bits));
    }

    let lead = match bits % 8 {
        0 => 8,
        b => b,
    };
    let mut bytes = vec![0u8; bits.div_ceil(8)];
    let last = bytes.len() - 1;

    loop {
        rng.try_fill_bytes(&mut bytes)?;
        bytes[0] &= ((1u16 << lead) - 1) as u8;
        if lead >= 2 {
            bytes[0] |= 3 << (lead - 2);
        } else {
            // Top two bits straddle the first two bytes.
            bytes[0] |= 1;
            if bytes.len() > 1 {
                bytes[1] |= 0x80;
            }
        }
        bytes[last] |= 1;

        let candidate = BigUint::from_bytes_be(&bytes);
        if candidate.bits() == bits as u64 && is_probable_prime(rng, &candidate)? {
            return Ok(candidate);
        }
    }
}

/// Trial division followed by Miller-Rabin with random bases.
pub(crate) fn is_probable_prime<R: RngCore + ?Sized>(rng: &mut R, n: &BigUint) -> Result<bool> {
    let two = BigUint::from(2u32);
    if n < &two {
        return Ok(false);
    }
    for &p in SMALL_PRIMES.iter() {
        let p = BigUint::from(p);
        if n == &p {
            return Ok(true);
        }
        if (n % &p).is_zero() {
            return Ok(false);
        }
    }

    // n is odd and above 97 from here on.
    let n_minus_1 = n - 1u32;
    let s = n_minus_1.trailing_zeros().unwrap_or(0);
    let d = &n_minus_1 >> s;
    // Bases are drawn from [2, n - 2].
    let base_range = n - 3u32;

    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = random_int(rng, &base_range)? + &two;
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_1 {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
            if x.is_one() {
                return Ok(false);
            }
        }
        return Ok(false);
    }
    Ok(true)
}
