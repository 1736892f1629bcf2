use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cortado::{Cache, Item, SyncCache};

fn make(size: usize, samples: usize) -> Cache<String> {
    Cache::new(size, samples)
}

// ---------------------------------------------------------------------------
// Fundamental API correctness
// ---------------------------------------------------------------------------

#[test]
fn get_returns_none_on_miss() {
    let mut cache = make(10, 100);
    assert_eq!(cache.get("missing"), None);
}

#[test]
fn set_get_update_del_round_trip() {
    let mut cache = make(1_000, 10_000);

    cache.set(Item::new("a", "a".to_string()));
    assert_eq!(cache.get("a"), Some(&"a".to_string()));

    cache.set(Item::new("a", "aa".to_string()));
    assert_eq!(cache.get("a"), Some(&"aa".to_string()));
    assert_eq!(cache.len(), 1, "update must not create a second entry");

    cache.del("a");
    assert_eq!(cache.get("a"), None);
    assert!(cache.is_empty());
}

#[test]
fn entries_survive_while_under_capacity() {
    let mut cache = make(1_000, 10_000);
    let evicted = Arc::new(AtomicUsize::new(0));

    for key in ["one", "two", "three"] {
        let counter = Arc::clone(&evicted);
        cache.set(Item::new(key, key.to_string()).with_on_evict(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
        assert_eq!(evicted.load(Ordering::Relaxed), 0, "key {:?}", key);
        assert_eq!(cache.get(key), Some(&key.to_string()));
    }

    for key in ["one", "two", "three"] {
        cache.set(Item::new(key, format!("{key}{key}")));
        assert_eq!(cache.get(key), Some(&format!("{key}{key}")));
    }

    for key in ["one", "two", "three"] {
        cache.del(key);
        assert_eq!(cache.get(key), None);
    }
}

#[test]
fn stats_track_requests() {
    let mut cache = make(100, 1_000);
    cache.set(Item::new("k", "v".to_string()));
    cache.get("k");
    cache.get("k");
    cache.get("nope");

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.request_count(), 3);
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[test]
fn expiry_purge_returns_no_torn_values() {
    const INSERTS: usize = 5_000;

    let value_for = |i: usize| format!("a string {i}");
    let key_for = |i: usize| format!("key-{i:05}");

    let mut cache = make(1_000, 10_000);
    let deadline = Instant::now() + Duration::from_millis(100);
    for i in 0..INSERTS {
        cache.set(Item::expiring(key_for(i), value_for(i), deadline));
    }

    // Before the deadline every hit must return the matching value.
    for i in (0..INSERTS).step_by(7) {
        if let Some(v) = cache.get(&key_for(i)) {
            assert_eq!(v, &value_for(i), "key {}", key_for(i));
        }
    }

    std::thread::sleep(Duration::from_millis(150));

    // After the deadline a probe may only ever answer "gone"; probing a
    // resident entry purges it in place.
    for i in 0..INSERTS {
        assert_eq!(cache.get(&key_for(i)), None, "key {}", key_for(i));
    }
    assert!(cache.is_empty(), "every probed entry must have been purged");
    assert!(cache.check_invariants().is_ok());
}

#[test]
fn eviction_hook_fires_on_expiry_purge() {
    let mut cache = make(100, 1_000);
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);

    let past = Instant::now() - Duration::from_millis(1);
    cache.set(
        Item::expiring("gone", "v".to_string(), past).with_on_evict(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        }),
    );
    assert_eq!(cache.get("gone"), None);
    assert_eq!(cache.get("gone"), None); // second probe is a plain miss
    assert_eq!(fired.load(Ordering::Relaxed), 1);
}

// ---------------------------------------------------------------------------
// Capacity and overflow stability
// ---------------------------------------------------------------------------

#[test]
fn overflow_churn_stays_bounded() {
    const KEYS: usize = 10_000;
    const SETS: usize = 1_000_000;

    let mut cache = make(1_000, 10_000);
    for i in 0..SETS {
        let key = format!("key-{}", i % KEYS);
        cache.set(Item::new(key, "payload".to_string()));
        if i % 100_000 == 0 {
            assert!(cache.check_invariants().is_ok(), "iteration {i}");
        }
        debug_assert!(cache.len() <= 1_000);
    }
    assert!(cache.len() <= 1_000, "len {} exceeds capacity", cache.len());
    assert!(cache.check_invariants().is_ok());
}

#[test]
fn eviction_hook_fires_at_most_once_per_item() {
    const INSERTS: usize = 500;

    let mut cache = make(20, 200);
    let fired = Arc::new(AtomicUsize::new(0));

    for i in 0..INSERTS {
        let counter = Arc::clone(&fired);
        cache.set(
            Item::new(format!("k{i}"), "v".to_string()).with_on_evict(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            }),
        );
    }

    // Every inserted item is either still resident (hook unfired) or left
    // the cache exactly once.
    assert_eq!(
        fired.load(Ordering::Relaxed) + cache.len(),
        INSERTS,
        "hooks fired {} with {} resident",
        fired.load(Ordering::Relaxed),
        cache.len()
    );
}

// ---------------------------------------------------------------------------
// Admission behavior
// ---------------------------------------------------------------------------

#[test]
fn hot_key_outlives_cold_flood() {
    let mut cache = make(100, 100_000);

    cache.set(Item::new("hot", "hot".to_string()));
    for i in 0..200usize {
        cache.get("hot");
        // A unique cold key per round: one write, one read, never again.
        let cold = format!("cold-{i}");
        cache.set(Item::new(cold.clone(), cold.clone()));
        cache.get(&cold);
    }

    assert!(
        cache.get("hot").is_some(),
        "the hammered key must still be resident"
    );
    assert!(cache.check_invariants().is_ok());
}

#[test]
fn single_slot_cache_still_serves() {
    let mut cache = make(1, 10);
    cache.set(Item::new("a", "a".to_string()));
    assert_eq!(cache.get("a"), Some(&"a".to_string()));

    // Each newcomer either takes the slot or is denied; the cache must
    // keep answering consistently either way.
    for i in 0..50usize {
        cache.set(Item::new(format!("k{i}"), format!("v{i}")));
        if let Some(v) = cache.get(&format!("k{i}")) {
            assert_eq!(v, &format!("v{i}"));
        }
        assert!(cache.check_invariants().is_ok());
    }
}

#[test]
fn promotion_swap_keeps_keys_and_values_paired() {
    // size 3 → window 1, probation 1, protected 1: every probation hit
    // with a full protected segment promotes by swapping node contents
    // with the protected tail.  Reads on both sides of the swap must keep
    // returning their own key's value.
    let mut cache = make(3, 100);
    cache.set(Item::new("a", "a".to_string()));
    cache.set(Item::new("b", "b".to_string()));
    assert_eq!(cache.get("a"), Some(&"a".to_string()));
    cache.set(Item::new("c", "c".to_string()));

    assert_eq!(cache.get("b"), Some(&"b".to_string()));
    assert_eq!(cache.get("a"), Some(&"a".to_string()));
    assert_eq!(cache.get("b"), Some(&"b".to_string()));
    assert_eq!(cache.get("c"), Some(&"c".to_string()));
    assert!(cache.check_invariants().is_ok());
}

#[test]
fn first_sighting_candidate_is_denied_admission() {
    // size 2 → window of 1, main stage of 1.  "a" wins the empty main
    // stage; "b", displaced next and never read, is turned away by the
    // doorkeeper on its first sighting.
    let mut cache = make(2, 10);
    let denied = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&denied);

    cache.set(Item::new("a", "a".to_string()));
    cache.set(Item::new("b", "b".to_string()).with_on_evict(move || {
        counter.fetch_add(1, Ordering::Relaxed);
    }));
    cache.set(Item::new("c", "c".to_string()));

    assert_eq!(denied.load(Ordering::Relaxed), 1, "b must have been denied");
    assert_eq!(cache.get("b"), None);
    assert!(cache.get("a").is_some(), "the incumbent must survive");
}

// ---------------------------------------------------------------------------
// SyncCache
// ---------------------------------------------------------------------------

#[test]
fn sync_cache_round_trips() {
    let cache: SyncCache<String> = SyncCache::new(100, 1_000);
    cache.set(Item::new("k", "v".to_string()));
    assert_eq!(cache.get("k"), Some("v".to_string()));
    cache.del("k");
    assert_eq!(cache.get("k"), None);
}

#[test]
fn sync_cache_concurrent_churn_stays_bounded() {
    let cache: Arc<SyncCache<String>> = Arc::new(SyncCache::new(1_000, 10_000));
    let mut handles = Vec::new();

    for t in 0..8 {
        let c = Arc::clone(&cache);
        handles.push(std::thread::spawn(move || {
            for j in 0..2_000 {
                let key = format!("t{}-k{}", t, j % 300);
                c.set(Item::new(key.clone(), key.clone()));
                let _ = c.get(&key);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert!(
        cache.len() <= 1_000,
        "len {} exceeds capacity",
        cache.len()
    );
}
