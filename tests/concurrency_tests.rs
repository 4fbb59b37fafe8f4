//! Integration Tests for Concurrent Access
//!
//! Drives one shared cache from many threads and tasks at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use aged_cache::{AgedCache, CacheConfig, ManualClock};
use tracing_subscriber::EnvFilter;

// == Helper Functions ==

const THREADS: usize = 8;
const KEYS: usize = 16;
const ITERATIONS: usize = 2_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn shared_cache<V: Clone>() -> (Arc<AgedCache<String, V, ManualClock>>, ManualClock) {
    let clock = ManualClock::default();
    let config = CacheConfig::new().with_shard_amount(4);
    let cache = AgedCache::with_config(config, clock.clone()).unwrap();
    (Arc::new(cache), clock)
}

// == Interleaved Put/Get ==

#[test]
fn test_interleaved_put_get_on_overlapping_keys() {
    init_tracing();
    // Values record (key index, writer thread, iteration)
    let (cache, _clock) = shared_cache::<(usize, usize, usize)>();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..ITERATIONS {
                    let k = (i + t) % KEYS;
                    cache.put(format!("key-{}", k), (k, t, i), 60_000);

                    let probe = (i * 7 + t) % KEYS;
                    if let Some((k, writer, iteration)) = cache.get(&format!("key-{}", probe)) {
                        assert_eq!(k, probe, "value stored under the wrong key");
                        assert!(writer < THREADS);
                        assert!(iteration < ITERATIONS);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    assert_eq!(cache.size(), KEYS);
    for k in 0..KEYS {
        let (stored_k, _, _) = cache.get(&format!("key-{}", k)).expect("key should be live");
        assert_eq!(stored_k, k);
    }
}

// == Cleanup During Writes ==

#[test]
fn test_cleanup_scan_never_loses_live_entries() {
    init_tracing();
    let (cache, clock) = shared_cache::<usize>();
    let done = Arc::new(AtomicBool::new(false));

    let sweeper = {
        let cache = Arc::clone(&cache);
        let clock = clock.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                clock.advance_ms(1);
                let _ = cache.size();
                let _ = cache.is_empty();
            }
        })
    };

    let writers: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..ITERATIONS {
                    cache.put(format!("long-{}-{}", t, i), i, i64::MAX);
                    cache.put(format!("short-{}-{}", t, i), i, 0);
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().expect("writer thread panicked");
    }
    done.store(true, Ordering::Release);
    sweeper.join().expect("sweeper thread panicked");

    clock.advance_ms(1);
    assert_eq!(cache.size(), THREADS * ITERATIONS);
    for t in 0..THREADS {
        for i in (0..ITERATIONS).step_by(97) {
            assert_eq!(cache.get(&format!("long-{}-{}", t, i)), Some(i));
            assert_eq!(cache.get(&format!("short-{}-{}", t, i)), None);
        }
    }
}

// == Expired Reads Racing Writes ==

#[test]
fn test_expired_reads_race_with_fresh_puts() {
    init_tracing();
    let (cache, clock) = shared_cache::<usize>();

    let writer = {
        let cache = Arc::clone(&cache);
        let clock = clock.clone();
        thread::spawn(move || {
            for i in 0..ITERATIONS {
                cache.put("hot".to_string(), i, 0);
                clock.advance_ms(1);
            }
        })
    };

    let readers: Vec<_> = (0..THREADS)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    if let Some(value) = cache.get("hot") {
                        assert!(value < ITERATIONS);
                    }
                }
            })
        })
        .collect();

    writer.join().expect("writer thread panicked");
    for reader in readers {
        reader.join().expect("reader thread panicked");
    }

    assert!(cache.size() <= 1);
    cache.put("hot".to_string(), ITERATIONS, 1_000);
    assert_eq!(cache.get("hot"), Some(ITERATIONS));
}

// == Async Tasks ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_across_tokio_tasks() {
    init_tracing();
    let (cache, clock) = shared_cache::<String>();

    let handles: Vec<_> = (0..32)
        .map(|n| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                let key = format!("task-{}", n);
                cache.put(key.clone(), format!("value-{}", n), 100 + n as i64);
                cache.get(&key)
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let value = handle.await.expect("task should not panic");
        assert_eq!(value, Some(format!("value-{}", n)));
    }
    assert_eq!(cache.size(), 32);

    // task-n lives 100 + n ms, so the first 16 are gone after 116 ms
    clock.advance_ms(116);
    assert_eq!(cache.size(), 16);
    assert_eq!(cache.get("task-15"), None);
    assert_eq!(cache.get("task-16"), Some("value-16".to_string()));
}

// == Independent Instances ==

#[test]
fn test_caches_do_not_share_state() {
    let (first, first_clock) = shared_cache::<u32>();
    let (second, _) = shared_cache::<u32>();

    first.put("key".to_string(), 1, 10);
    second.put("key".to_string(), 2, 10);
    first_clock.advance_ms(11);

    assert_eq!(first.get("key"), None);
    assert_eq!(second.get("key"), Some(2));
}

// == Stats Snapshot ==

#[test]
fn test_stats_snapshot_json_shape() {
    let (cache, _) = shared_cache::<u32>();
    cache.put("key".to_string(), 1, 1_000);
    let _ = cache.get("key");
    let _ = cache.get("missing");

    let json = serde_json::to_value(cache.stats()).unwrap();
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["expirations"], 0);
    assert_eq!(json["total_entries"], 1);
}
