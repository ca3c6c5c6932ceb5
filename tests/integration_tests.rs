// tests/integration_tests.rs
//! Integration tests for the pooled random byte service

use num_bigint::BigUint;
use secrand::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread;

/// Hands out a unique u64 tag per 8-byte chunk and counts calls.
#[derive(Default)]
struct TaggingSource {
    calls: AtomicUsize,
    next: AtomicU64,
}

impl EntropySource for TaggingSource {
    fn fill(&self, dst: &mut [u8]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for chunk in dst.chunks_mut(8) {
            let tag = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            chunk.copy_from_slice(&tag.to_le_bytes()[..chunk.len()]);
        }
        Ok(())
    }
}

/// Fails once `armed` is set.
#[derive(Default)]
struct FlakySource {
    armed: AtomicBool,
}

impl EntropySource for FlakySource {
    fn fill(&self, dst: &mut [u8]) -> Result<()> {
        if self.armed.load(Ordering::SeqCst) {
            return Err(RandError::Source("device removed".into()));
        }
        OsEntropy.fill(dst)
    }
}

/// Flags any refill that starts while another refill of the same buffer is
/// still running.
#[derive(Default)]
struct OwnershipSource {
    filling: Mutex<HashSet<usize>>,
    overlaps: AtomicUsize,
    calls: AtomicUsize,
}

impl EntropySource for OwnershipSource {
    fn fill(&self, dst: &mut [u8]) -> Result<()> {
        let key = dst.as_ptr() as usize;
        if !self.filling.lock().unwrap().insert(key) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::yield_now();
        OsEntropy.fill(dst)?;
        self.filling.lock().unwrap().remove(&key);
        Ok(())
    }
}

#[test]
fn test_zero_length_fill() {
    let rng = SecureRng::new(TaggingSource::default(), PoolConfig::default()).unwrap();
    assert_eq!(rng.fill(&mut []).unwrap(), 0);
    assert_eq!(rng.pool().source().calls.load(Ordering::SeqCst), 0);
    assert_eq!(rng.stats().acquired, 0);
}

#[test]
fn test_bypass_calls_source_once_per_request() {
    let rng = SecureRng::new(TaggingSource::default(), PoolConfig::default()).unwrap();
    let mut buf = vec![0u8; 4096];
    for expected in 1..=5 {
        rng.fill(&mut buf).unwrap();
        assert_eq!(rng.pool().source().calls.load(Ordering::SeqCst), expected);
    }
    assert_eq!(rng.stats().acquired, 0);
    assert_eq!(rng.pool().available(), 0);
}

#[test]
fn test_sequential_threshold_requests_share_one_refill() {
    let config = PoolConfig::single_lane();
    let rng = SecureRng::new(TaggingSource::default(), config.clone()).unwrap();
    let per_request = config.bypass_threshold;
    let rounds = config.buffer_size / per_request;

    let mut buf = vec![0u8; per_request];
    for _ in 0..rounds {
        rng.fill(&mut buf).unwrap();
    }
    let total = per_request * rounds;
    assert!(rng.stats().refills <= total.div_ceil(config.buffer_size));
}

#[test]
fn test_small_lane_never_repeats_bytes() {
    // Byte-granular lane: every byte position of a refill is served once.
    let rng = SecureRng::new(TaggingSource::default(), PoolConfig::default()).unwrap();
    let mut served = Vec::new();
    for _ in 0..200 {
        let mut buf = [0u8; 8];
        rng.fill(&mut buf).unwrap();
        served.push(u64::from_le_bytes(buf));
    }
    // Small lane starts at offset 0 and consumes exactly 8 bytes per request,
    // so each request sees one whole tag.
    let unique: HashSet<_> = served.iter().collect();
    assert_eq!(unique.len(), served.len());
}

#[test]
fn test_concurrent_fills_are_distinct() {
    let rng = Arc::new(SecureRng::new(TaggingSource::default(), PoolConfig::single_lane()).unwrap());
    let threads = 16;
    let per_thread = 500;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let rng = Arc::clone(&rng);
            thread::spawn(move || {
                let mut out = Vec::with_capacity(per_thread);
                for _ in 0..per_thread {
                    let mut buf = [0u8; 24];
                    rng.fill(&mut buf).unwrap();
                    out.push(buf);
                }
                out
            })
        })
        .collect();

    let mut tags = HashSet::new();
    for h in handles {
        for buf in h.join().unwrap() {
            for chunk in buf.chunks_exact(8) {
                let tag = u64::from_le_bytes(chunk.try_into().unwrap());
                assert!(tags.insert(tag), "tag {} served twice", tag);
            }
        }
    }

    let stats = rng.stats();
    assert_eq!(stats.acquired, threads * per_thread);
    assert_eq!(stats.returned, threads * per_thread);
    assert_eq!(stats.in_use(), 0);
    assert!(stats.allocated <= threads);
}

#[test]
fn test_each_cache_has_one_owner_at_a_time() {
    let rng = Arc::new(
        SecureRng::new(OwnershipSource::default(), PoolConfig::single_lane()).unwrap(),
    );
    let threads = 8;
    let running = Arc::new(AtomicBool::new(true));

    let monitor = {
        let rng = Arc::clone(&rng);
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut high_water = 0;
            while running.load(Ordering::SeqCst) {
                high_water = high_water.max(rng.stats().in_use());
                thread::yield_now();
            }
            high_water
        })
    };

    let workers: Vec<_> = (0..threads)
        .map(|_| {
            let rng = Arc::clone(&rng);
            thread::spawn(move || {
                // Threshold-sized requests force a refill every few calls.
                let mut buf = [0u8; 512];
                for _ in 0..400 {
                    rng.fill(&mut buf).unwrap();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    running.store(false, Ordering::SeqCst);
    let high_water = monitor.join().unwrap();

    let source = rng.pool().source();
    assert_eq!(source.overlaps.load(Ordering::SeqCst), 0);
    assert!(source.calls.load(Ordering::SeqCst) >= threads * 400 / 8);
    assert!(high_water <= threads, "{} caches out at once", high_water);

    let stats = rng.stats();
    assert_eq!(stats.in_use(), 0);
    assert!(stats.allocated <= threads);
}

#[test]
fn test_concurrent_os_fills_never_collide() {
    let rng: Arc<SecureRng> = Arc::new(SecureRng::default());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let rng = Arc::clone(&rng);
            thread::spawn(move || {
                (0..2000)
                    .map(|_| {
                        let mut buf = [0u8; 16];
                        rng.fill(&mut buf).unwrap();
                        buf
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for h in handles {
        for buf in h.join().unwrap() {
            assert!(seen.insert(buf));
        }
    }
    assert_eq!(seen.len(), 16_000);
}

#[test]
fn test_source_failure_surfaces_on_every_path() {
    let rng = SecureRng::new(FlakySource::default(), PoolConfig::default()).unwrap();
    let mut small = [0u8; 4];
    let mut medium = [0u8; 64];
    let mut large = [0u8; 2048];

    // Prime the caches while the source works.
    rng.fill(&mut small).unwrap();
    rng.fill(&mut medium).unwrap();

    rng.pool().source().armed.store(true, Ordering::SeqCst);
    // Requests still covered by cached bytes succeed without a source call.
    rng.fill(&mut small).unwrap();
    assert!(matches!(rng.fill(&mut large), Err(RandError::Source(_))));

    // Exhaust the large lane; the next refill must fail loudly.
    let mut drained = false;
    for _ in 0..100 {
        if let Err(err) = rng.fill(&mut medium) {
            assert!(matches!(err, RandError::Source(_)));
            drained = true;
            break;
        }
    }
    assert!(drained);
}

#[test]
fn test_text_shape() {
    for _ in 0..500 {
        let t = secrand::text().unwrap();
        assert_eq!(t.len(), 26);
        assert!(t.bytes().all(|c| c.is_ascii_uppercase() || (b'2'..=b'7').contains(&c)));
    }
}

#[test]
fn test_random_int_range_and_misuse() {
    let mut reader = secrand::reader();
    let max = BigUint::from(10u32);
    for _ in 0..2000 {
        assert!(random_int(&mut reader, &max).unwrap() < max);
    }
    let err = random_int(&mut reader, &BigUint::from(0u32)).unwrap_err();
    assert_eq!(err, RandError::InvalidBound);
}

#[test]
fn test_probable_prime_via_pool() {
    let rng: SecureRng = SecureRng::default();
    let p = probable_prime(&mut rng.reader(), 128).unwrap();
    assert_eq!(p.bits(), 128);
    assert!(rng.stats().acquired > 0);
    assert!(matches!(
        probable_prime(&mut rng.reader(), 1),
        Err(RandError::BitsTooSmall(1))
    ));
}

#[test]
fn test_reader_as_io_read() {
    use std::io::Read;
    let mut reader = secrand::reader();
    let mut buf = vec![0u8; 1000];
    reader.read_exact(&mut buf).unwrap();
    assert!(buf.iter().any(|&b| b != 0));
}

#[test]
fn test_pool_statistics_accuracy() {
    let rng = SecureRng::new(
        OsEntropy,
        PoolConfig {
            max_pool_size: 2,
            min_pool_size: 1,
            ..PoolConfig::default()
        },
    )
    .unwrap();

    let pool = rng.pool();
    let a = pool.acquire();
    let b = pool.acquire();
    let c = pool.acquire();
    assert_eq!(pool.stats().in_use(), 3);
    drop((a, b, c));

    let stats = pool.stats();
    assert_eq!(stats.allocated, 3);
    assert_eq!(stats.available, 2);
    assert_eq!(stats.discarded, 1);
    assert!(stats.hit_rate() >= 0.0 && stats.hit_rate() <= 100.0);
}
