// demos/basic_usage.rs
//! Basic usage example of the pooled random byte service

use num_bigint::BigUint;
use secrand::prelude::*;

fn main() -> Result<()> {
    println!("=== Process-wide Instance ===\n");

    // 1. Small requests are served from pooled caches
    let mut nonce = [0u8; 12];
    secrand::fill(&mut nonce)?;
    println!("Nonce: {}", hex(&nonce));

    let token = secrand::text()?;
    println!("Token: {}", token);

    println!("\n=== Dedicated Instance ===\n");

    // 2. An owned instance with its own tuning
    let rng = SecureRng::new(OsEntropy, PoolConfig::compact())?;

    let mut key = [0u8; 32];
    for _ in 0..100 {
        rng.fill(&mut key)?;
    }

    // Large requests skip the pool
    let mut blob = vec![0u8; 4096];
    rng.fill(&mut blob)?;

    let stats = rng.stats();
    println!(
        "Pool stats: acquired={}, allocated={}, refills={}, bypassed={}, hit_rate={:.1}%",
        stats.acquired,
        stats.allocated,
        stats.refills,
        stats.bypassed,
        stats.hit_rate()
    );

    println!("\n=== Integers and Primes ===\n");

    // 3. Helpers draw through the same caches via the reader
    let mut reader = rng.reader();
    let die = random_int(&mut reader, &BigUint::from(6u32))? + 1u32;
    println!("Dice roll: {}", die);

    let p = probable_prime(&mut reader, 128)?;
    println!("128-bit prime: {}", p);

    match random_int(&mut reader, &BigUint::from(0u32)) {
        Err(err) if err.is_misuse() => println!("Rejected zero bound: {}", err),
        other => println!("Unexpected: {:?}", other),
    }

    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
