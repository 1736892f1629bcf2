//! Single-threaded W-TinyLFU cache core.
//!
//! ## Algorithm
//!
//! Capacity is split across three queues backed by one node arena and one
//! key→node map:
//!
//! | Queue         | Share            | Role |
//! |---------------|------------------|------|
//! | **Window**    | 1 % of capacity  | Every new entry starts here; its LRU evictee becomes the admission candidate |
//! | **Probation** | ~20 % of main    | Admitted entries awaiting frequency proof; eviction victim pool |
//! | **Protected** | ~80 % of main    | Entries re-accessed while on probation |
//!
//! A candidate pushed out of the window only displaces the probation tail
//! if (a) the doorkeeper has seen it before this epoch and (b) its sketch
//! estimate is strictly greater than the victim's — ties keep the
//! incumbent, so a stream of equal-frequency newcomers cannot thrash the
//! main stage.
//!
//! The frequency sketch ages with read demand: every `samples`-th read
//! halves the sketch and clears the doorkeeper.  Writes deliberately do not
//! advance the epoch.
//!
//! ## References
//! - Einziger, Friedman, Manes (2017). *TinyLFU: A Highly Efficient Cache
//!   Admission Policy.* ACM Transactions on Storage.

use std::time::Instant;

use ahash::{AHashMap, RandomState};

use crate::error::InvariantError;
use crate::item::Item;
use crate::metrics::stats::{Stats, StatsCounter};
use crate::policy::arena::NodeArena;
use crate::policy::slru::SegmentedLru;
use crate::policy::window::WindowLru;
use crate::policy::sketch::{Cm4, Doorkeeper};
use crate::policy::Segment;

/// Doorkeeper false-positive rate.
const DOORKEEPER_FPR: f64 = 0.01;

/// An in-memory bounded cache with W-TinyLFU admission.
///
/// The core is **not** thread-safe: every operation takes `&mut self`,
/// because even reads reorder the queues and feed the frequency sketch.
/// Use [`SyncCache`](crate::SyncCache) to share one instance across
/// threads.
///
/// # Example
/// ```
/// use cortado::{Cache, Item};
///
/// let mut cache: Cache<String> = Cache::new(1_000, 10_000);
/// cache.set(Item::new("a", "alpha".to_string()));
/// assert_eq!(cache.get("a"), Some(&"alpha".to_string()));
/// cache.del("a");
/// assert_eq!(cache.get("a"), None);
/// ```
pub struct Cache<V> {
    /// Reads since the last epoch reset.
    w: usize,
    /// Epoch length: every `samples`-th read halves the sketch.
    samples: usize,

    sketch: Cm4,
    doorkeeper: Doorkeeper,

    arena: NodeArena<V>,
    /// key → arena index.  Shared by all three queues; exactly one queue
    /// owns each node at any time.
    map: AHashMap<String, usize>,

    window: WindowLru,
    main: SegmentedLru,

    hasher: RandomState,
    stats: StatsCounter,
}

impl<V> Cache<V> {
    /// Creates a cache holding at most `size` entries, aging its frequency
    /// state every `samples` reads.
    ///
    /// Degenerate arguments are clamped: every internal structure gets a
    /// capacity of at least one, so `Cache::new(0, 0)` yields a small but
    /// functional cache.
    pub fn new(size: usize, samples: usize) -> Self {
        let size = size.max(1);
        let samples = samples.max(1);

        // Standard W-TinyLFU split: 1 % window, and the main stage divided
        // one fifth probation / four fifths protected.
        let window_cap = (size / 100).max(1);
        let main_cap = (size - window_cap).max(1);
        let probation_cap = (main_cap / 5).max(1);
        let protected_cap = main_cap - probation_cap;

        let mut arena = NodeArena::with_capacity(size + 6);
        let window = WindowLru::new(&mut arena, window_cap);
        let main = SegmentedLru::new(&mut arena, probation_cap, protected_cap);

        Cache {
            w: 0,
            samples,
            sketch: Cm4::new(size),
            doorkeeper: Doorkeeper::new(samples, DOORKEEPER_FPR),
            arena,
            map: AHashMap::with_capacity(size),
            window,
            main,
            hasher: RandomState::new(),
            stats: StatsCounter::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Read path
    // -----------------------------------------------------------------------

    /// Returns the value for `key` if it is resident and not expired.
    ///
    /// Every read advances the sampling epoch and feeds the frequency
    /// sketch — misses included, since the sketch tracks access intent
    /// rather than residency.  An expired entry is purged here (its
    /// eviction hook fires) and reads as a miss.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.w += 1;
        if self.w == self.samples {
            self.sketch.reset();
            self.doorkeeper.reset();
            self.w = 0;
        }

        let h = self.hasher.hash_one(key);
        self.sketch.add(h);

        let Some(&idx) = self.map.get(key) else {
            self.stats.misses += 1;
            return None;
        };

        let (segment, expired) = match self.arena.item(idx) {
            Some(item) => (item.segment, item.is_expired(Instant::now())),
            None => {
                self.stats.misses += 1;
                return None;
            }
        };

        if expired {
            if let Some(item) = self.unlink_entry(idx) {
                self.stats.evictions += 1;
                item.fire_on_evict();
            }
            self.stats.misses += 1;
            return None;
        }

        match segment {
            Segment::Window => self.window.touch(idx, &mut self.arena),
            _ => self.main.touch(idx, &mut self.arena, &mut self.map),
        }

        self.stats.hits += 1;
        // A swap promotion moves the key's contents into the old protected
        // tail node, so `idx` may now hold the demoted entry.  Re-resolve
        // through the map, which `touch` keeps current.
        self.map
            .get(key)
            .and_then(|&idx| self.arena.item(idx))
            .map(|item| &item.value)
    }

    // -----------------------------------------------------------------------
    // Write path
    // -----------------------------------------------------------------------

    /// Inserts `item`, taking ownership.
    ///
    /// If the key is already resident only the value is replaced and the
    /// entry is touched as a read would touch it; the admission machinery
    /// is not consulted.  Otherwise the entry enters the window, and the
    /// window's evictee (if any) contests the probation tail for a place
    /// in the main stage.
    pub fn set(&mut self, item: Item<V>) {
        if let Some(&idx) = self.map.get(item.key.as_str()) {
            let Some(resident) = self.arena.item_mut(idx) else {
                return;
            };
            resident.value = item.value;
            let h = resident.key_hash;
            let segment = resident.segment;
            self.sketch.add(h);
            match segment {
                Segment::Window => self.window.touch(idx, &mut self.arena),
                _ => self.main.touch(idx, &mut self.arena, &mut self.map),
            }
            return;
        }

        let mut item = item;
        item.key_hash = self.hasher.hash_one(item.key.as_str());

        let Some(candidate) = self.window.add(item, &mut self.arena, &mut self.map) else {
            return;
        };

        // The window overflowed; `candidate` now has to earn a place in
        // the main stage.
        let Some(victim_hash) = self.main.victim(&self.arena).map(|v| v.key_hash) else {
            // Main still has room — admit unconditionally.
            self.main.add(candidate, &mut self.arena, &mut self.map);
            return;
        };

        if !self.doorkeeper.allow(candidate.key_hash) {
            // First sighting this epoch: not worth displacing anyone.
            self.discard(candidate);
            return;
        }

        if self.sketch.estimate(candidate.key_hash) > self.sketch.estimate(victim_hash) {
            if let Some(victim) = self.main.add(candidate, &mut self.arena, &mut self.map) {
                self.discard(victim);
            }
        } else {
            // Tie goes to the incumbent.
            self.discard(candidate);
        }
    }

    /// Removes the entry for `key`, firing its eviction hook.
    pub fn del(&mut self, key: &str) {
        let Some(&idx) = self.map.get(key) else {
            return;
        };
        if let Some(item) = self.unlink_entry(idx) {
            item.fire_on_evict();
        }
    }

    // -----------------------------------------------------------------------
    // Internal plumbing
    // -----------------------------------------------------------------------

    /// Unlinks the entry at `idx` from its queue and the map, returning the
    /// owned item.  The eviction hook is the caller's to fire — by the time
    /// it runs, the cache no longer knows the entry.
    fn unlink_entry(&mut self, idx: usize) -> Option<Item<V>> {
        let segment = self.arena.item(idx).map(|item| item.segment)?;
        match segment {
            Segment::Window => self.window.remove(idx, &mut self.arena),
            _ => self.main.remove(idx, &mut self.arena),
        }
        let item = self.arena.release(idx)?;
        self.map.remove(item.key.as_str());
        Some(item)
    }

    /// Drops an item that lost its place, counting the eviction.
    fn discard(&mut self, item: Item<V>) {
        self.stats.evictions += 1;
        item.fire_on_evict();
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Number of resident entries (expired-but-unread entries included).
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns a snapshot of hit/miss/eviction counters.
    pub fn stats(&self) -> Stats {
        self.stats.snapshot()
    }

    /// Walks every queue and cross-checks the internal bookkeeping.
    ///
    /// Intended for tests and debug assertions; the checks are O(n).
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let window_len = self.check_queue(
            self.window.head_sentinel(),
            self.window.tail_sentinel(),
            Segment::Window,
        )?;
        let (probation_head, probation_tail) = self.main.probation_sentinels();
        let probation_len = self.check_queue(probation_head, probation_tail, Segment::Probation)?;
        let (protected_head, protected_tail) = self.main.protected_sentinels();
        let protected_len = self.check_queue(protected_head, protected_tail, Segment::Protected)?;

        if window_len != self.window.len() {
            return Err(InvariantError::new(format!(
                "window queue holds {} entries but counter says {}",
                window_len,
                self.window.len()
            )));
        }
        if probation_len != self.main.probation_len() || protected_len != self.main.protected_len()
        {
            return Err(InvariantError::new(format!(
                "segment counters ({}, {}) disagree with queues ({}, {})",
                self.main.probation_len(),
                self.main.protected_len(),
                probation_len,
                protected_len
            )));
        }
        let total = window_len + probation_len + protected_len;
        if total != self.map.len() {
            return Err(InvariantError::new(format!(
                "queues hold {} entries but map holds {}",
                total,
                self.map.len()
            )));
        }
        if window_len > self.window.cap() {
            return Err(InvariantError::new("window over capacity"));
        }
        if protected_len > self.main.protected_cap() {
            return Err(InvariantError::new("protected segment over capacity"));
        }
        if probation_len + protected_len > self.main.cap() {
            return Err(InvariantError::new("main stage over capacity"));
        }
        Ok(())
    }

    /// Walks one queue head→tail, checking segment tags and map agreement.
    fn check_queue(
        &self,
        head: usize,
        tail: usize,
        expected: Segment,
    ) -> Result<usize, InvariantError> {
        let mut count = 0usize;
        let mut idx = self.arena.next_of(head);
        while idx != tail {
            let Some(item) = self.arena.item(idx) else {
                return Err(InvariantError::new("sentinel or freed slot linked in queue"));
            };
            if item.segment != expected {
                return Err(InvariantError::new(format!(
                    "entry {:?} tagged {:?} found in the {:?} queue",
                    item.key(),
                    item.segment,
                    expected
                )));
            }
            if self.map.get(item.key()) != Some(&idx) {
                return Err(InvariantError::new(format!(
                    "map entry for {:?} does not point at its node",
                    item.key()
                )));
            }
            count += 1;
            idx = self.arena.next_of(idx);
        }
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
