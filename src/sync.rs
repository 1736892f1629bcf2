//! Thread-safe veneer over the single-threaded core.
//!
//! One mutex, held across exactly one core operation per call.  There is no
//! reader/writer split to exploit: a read reorders the queues and feeds the
//! frequency sketch, so it mutates just as much as a write does.

use parking_lot::Mutex;

use crate::cache::Cache;
use crate::item::Item;
use crate::metrics::stats::Stats;

/// A mutex-serialized [`Cache`] that can be shared across threads.
///
/// # Example
/// ```
/// use cortado::{Item, SyncCache};
/// use std::sync::Arc;
///
/// let cache: Arc<SyncCache<u64>> = Arc::new(SyncCache::new(1_000, 10_000));
/// let worker = Arc::clone(&cache);
/// std::thread::spawn(move || worker.set(Item::new("answer", 42)))
///     .join()
///     .unwrap();
/// assert_eq!(cache.get("answer"), Some(42));
/// ```
pub struct SyncCache<V> {
    inner: Mutex<Cache<V>>,
}

impl<V> SyncCache<V> {
    /// See [`Cache::new`].
    pub fn new(size: usize, samples: usize) -> Self {
        SyncCache {
            inner: Mutex::new(Cache::new(size, samples)),
        }
    }

    /// Returns a clone of the value for `key`, if resident and not expired.
    ///
    /// The clone keeps the lock scope to the lookup itself; the borrow the
    /// core hands out cannot outlive the guard.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// See [`Cache::set`].
    pub fn set(&self, item: Item<V>) {
        self.inner.lock().set(item);
    }

    /// See [`Cache::del`].
    pub fn del(&self, key: &str) {
        self.inner.lock().del(key);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn stats(&self) -> Stats {
        self.inner.lock().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn shared_across_threads() {
        let cache: Arc<SyncCache<String>> = Arc::new(SyncCache::new(1_000, 10_000));
        let mut handles = Vec::new();
        for t in 0..8 {
            let c = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for j in 0..200 {
                    let key = format!("t{}-k{}", t, j);
                    c.set(Item::new(key.clone(), key.clone()));
                    if let Some(v) = c.get(&key) {
                        assert_eq!(v, key, "value must never be torn");
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(cache.len() <= 1_000);
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncCache<Vec<u8>>>();
    }
}
