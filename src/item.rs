//! Cache entry — a key, a value, and optional expiry / eviction hooks.
//!
//! # Example
//! ```
//! use cortado::{Cache, Item};
//! use std::time::{Duration, Instant};
//!
//! let mut cache: Cache<String> = Cache::new(100, 1_000);
//! cache.set(Item::new("greeting", "hello".to_string()));
//! cache.set(
//!     Item::expiring("session", "token".to_string(), Instant::now() + Duration::from_secs(60))
//!         .with_on_evict(|| println!("session gone")),
//! );
//! assert_eq!(cache.get("greeting"), Some(&"hello".to_string()));
//! ```

use std::time::Instant;

use crate::policy::Segment;

/// A single cache entry, created by the caller and handed to
/// [`Cache::set`](crate::Cache::set), which takes ownership.
///
/// The entry carries its own expiry deadline and an optional eviction hook
/// that the cache invokes exactly once, at the moment the entry leaves the
/// cache for any reason (admission loss, displacement, explicit delete, or
/// expiry discovered on read).
pub struct Item<V> {
    pub(crate) key: String,
    pub(crate) value: V,
    /// Absolute deadline.  `None` = immortal.
    pub(crate) expire_at: Option<Instant>,
    /// Fired at most once, after the entry is unlinked and unmapped.
    pub(crate) on_evict: Option<Box<dyn FnOnce() + Send>>,
    /// Which queue currently owns this entry.  Managed by the cache.
    pub(crate) segment: Segment,
    /// Hash of `key`, computed once on first insertion.
    pub(crate) key_hash: u64,
}

impl<V> Item<V> {
    /// Creates an entry that never expires.
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Item {
            key: key.into(),
            value,
            expire_at: None,
            on_evict: None,
            segment: Segment::Window,
            key_hash: 0,
        }
    }

    /// Creates an entry that expires once `expire_at` has passed.
    ///
    /// Expiry is enforced lazily: the entry is purged when a read lands on
    /// it after the deadline.  Until then it stays resident and counts
    /// against capacity.
    pub fn expiring(key: impl Into<String>, value: V, expire_at: Instant) -> Self {
        Item {
            expire_at: Some(expire_at),
            ..Item::new(key, value)
        }
    }

    /// Registers a hook invoked when this entry leaves the cache.
    ///
    /// The hook runs synchronously inside the cache operation that caused
    /// the removal, after the entry is already gone from the cache's own
    /// bookkeeping.  Do not call back into the cache from the hook.
    pub fn with_on_evict(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_evict = Some(Box::new(hook));
        self
    }

    /// Returns the entry's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        self.expire_at.is_some_and(|deadline| now > deadline)
    }

    /// Consumes the entry, firing its eviction hook if one was registered.
    pub(crate) fn fire_on_evict(mut self) {
        if let Some(hook) = self.on_evict.take() {
            hook();
        }
    }
}
