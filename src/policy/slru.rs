//! Segmented LRU — the main cache stage.
//!
//! Two queues share the capacity left over after the admission window:
//! **probation** (one fifth of the main stage) receives entries that won an
//! admission contest, and **protected** (the rest) holds entries that were
//! re-accessed while on probation.  Eviction pressure always lands on the
//! probation tail, so an entry must prove itself twice — once to get in,
//! once to stay — before it is insulated from scans.
//!
//! Promotion out of a full protected segment trades places with the
//! protected tail by swapping node *contents*: both nodes keep their
//! identity, the two affected map entries are rewritten, and no allocation
//! happens.

use ahash::AHashMap;

use crate::item::Item;
use crate::policy::arena::NodeArena;
use crate::policy::Segment;

pub(crate) struct SegmentedLru {
    probation_head: usize,
    probation_tail: usize,
    protected_head: usize,
    protected_tail: usize,
    probation_cap: usize,
    protected_cap: usize,
    probation_len: usize,
    protected_len: usize,
}

impl SegmentedLru {
    pub(crate) fn new<V>(
        arena: &mut NodeArena<V>,
        probation_cap: usize,
        protected_cap: usize,
    ) -> Self {
        let (probation_head, probation_tail) = arena.sentinel_pair();
        let (protected_head, protected_tail) = arena.sentinel_pair();
        SegmentedLru {
            probation_head,
            probation_tail,
            protected_head,
            protected_tail,
            probation_cap,
            protected_cap,
            probation_len: 0,
            protected_len: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Access path
    // -----------------------------------------------------------------------

    /// Records a hit on the entry at `idx`.
    ///
    /// Protected entries just move to their MRU position.  Probationary
    /// entries are promoted: directly while protected has room, otherwise
    /// by swapping contents with the protected tail (the coldest protected
    /// entry is demoted into this probation node in the same move).
    pub(crate) fn touch<V>(
        &mut self,
        idx: usize,
        arena: &mut NodeArena<V>,
        map: &mut AHashMap<String, usize>,
    ) {
        let Some(segment) = arena.item(idx).map(|item| item.segment) else {
            return;
        };

        if segment == Segment::Protected {
            arena.move_after(self.protected_head, idx);
            return;
        }

        if self.protected_len < self.protected_cap {
            arena.unlink(idx);
            self.probation_len -= 1;
            if let Some(item) = arena.item_mut(idx) {
                item.segment = Segment::Protected;
            }
            arena.link_after(self.protected_head, idx);
            self.protected_len += 1;
            return;
        }

        if self.protected_cap == 0 {
            // Degenerate split (tiny caches): no protected tail to trade
            // with, so the hit only refreshes recency within probation.
            arena.move_after(self.probation_head, idx);
            return;
        }

        // Swap contents with the protected tail.  The touched entry ends up
        // in the protected node, the demoted entry in the probation node;
        // both map entries are rewritten to follow their keys.
        let back = arena.prev_of(self.protected_tail);
        arena.swap_items(idx, back);
        if let Some(item) = arena.item_mut(back) {
            item.segment = Segment::Protected;
            map.insert(item.key.clone(), back);
        }
        if let Some(item) = arena.item_mut(idx) {
            item.segment = Segment::Probation;
            map.insert(item.key.clone(), idx);
        }
        arena.move_after(self.probation_head, idx);
        arena.move_after(self.protected_head, back);
    }

    // -----------------------------------------------------------------------
    // Admission path
    // -----------------------------------------------------------------------

    /// Inserts an admitted entry at the head of probation.
    ///
    /// At full capacity the probation tail slot is reused in place and the
    /// displaced entry — the victim that just lost its admission contest —
    /// is returned for disposal.
    pub(crate) fn add<V>(
        &mut self,
        mut item: Item<V>,
        arena: &mut NodeArena<V>,
        map: &mut AHashMap<String, usize>,
    ) -> Option<Item<V>> {
        item.segment = Segment::Probation;

        if self.probation_len < self.probation_cap || self.len() < self.cap() {
            let key = item.key.clone();
            let idx = arena.alloc(item);
            map.insert(key, idx);
            arena.link_after(self.probation_head, idx);
            self.probation_len += 1;
            return None;
        }

        let idx = arena.prev_of(self.probation_tail);
        let old = arena.take_item(idx);
        if let Some(old) = &old {
            map.remove(old.key.as_str());
        }
        let key = item.key.clone();
        arena.put_item(idx, item);
        map.insert(key, idx);
        arena.move_after(self.probation_head, idx);
        old
    }

    /// The entry the next admission would displace, if the stage is full.
    ///
    /// Returns `None` while there is still room — in that case admission is
    /// unconditional and no frequency contest is needed.
    pub(crate) fn victim<'a, V>(&self, arena: &'a NodeArena<V>) -> Option<&'a Item<V>> {
        if self.len() < self.cap() {
            return None;
        }
        arena.item(arena.prev_of(self.probation_tail))
    }

    /// Unlinks an entry from whichever segment holds it; the caller owns
    /// map cleanup and slot release.
    pub(crate) fn remove<V>(&mut self, idx: usize, arena: &mut NodeArena<V>) {
        let Some(segment) = arena.item(idx).map(|item| item.segment) else {
            return;
        };
        arena.unlink(idx);
        match segment {
            Segment::Protected => self.protected_len -= 1,
            _ => self.probation_len -= 1,
        }
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    pub(crate) fn len(&self) -> usize {
        self.probation_len + self.protected_len
    }

    pub(crate) fn cap(&self) -> usize {
        self.probation_cap + self.protected_cap
    }

    pub(crate) fn probation_len(&self) -> usize {
        self.probation_len
    }

    pub(crate) fn protected_len(&self) -> usize {
        self.protected_len
    }

    pub(crate) fn probation_cap(&self) -> usize {
        self.probation_cap
    }

    pub(crate) fn protected_cap(&self) -> usize {
        self.protected_cap
    }

    pub(crate) fn probation_sentinels(&self) -> (usize, usize) {
        (self.probation_head, self.probation_tail)
    }

    pub(crate) fn protected_sentinels(&self) -> (usize, usize) {
        (self.protected_head, self.protected_tail)
    }
}
