//! Admission window — a small LRU every new entry passes through.
//!
//! The window is sized at 1% of total capacity (minimum one slot).  A new
//! entry always lands here first, which gives it one residency round to
//! accumulate frequency before it has to defend a place in the main cache.
//! When the window is full, `add` pushes out the least-recently-used entry
//! and hands it back to the caller as the admission candidate.

use ahash::AHashMap;

use crate::item::Item;
use crate::policy::arena::NodeArena;
use crate::policy::Segment;

/// Fixed-size recency window over the shared node arena.
pub(crate) struct WindowLru {
    head: usize,
    tail: usize,
    cap: usize,
    len: usize,
}

impl WindowLru {
    pub(crate) fn new<V>(arena: &mut NodeArena<V>, cap: usize) -> Self {
        let (head, tail) = arena.sentinel_pair();
        WindowLru {
            head,
            tail,
            cap,
            len: 0,
        }
    }

    /// Moves an entry to the MRU position.
    #[inline]
    pub(crate) fn touch<V>(&mut self, idx: usize, arena: &mut NodeArena<V>) {
        arena.move_after(self.head, idx);
    }

    /// Inserts `item` at the MRU position.
    ///
    /// While there is room the entry gets a fresh slot.  At capacity the
    /// LRU slot is reused in place: the outgoing entry's map binding is
    /// dropped before the overwrite, the incoming key bound after, and the
    /// displaced item is returned so the caller can run the admission
    /// contest on it.
    pub(crate) fn add<V>(
        &mut self,
        mut item: Item<V>,
        arena: &mut NodeArena<V>,
        map: &mut AHashMap<String, usize>,
    ) -> Option<Item<V>> {
        item.segment = Segment::Window;

        if self.len < self.cap {
            let key = item.key.clone();
            let idx = arena.alloc(item);
            map.insert(key, idx);
            arena.link_after(self.head, idx);
            self.len += 1;
            return None;
        }

        let idx = arena.prev_of(self.tail);
        let old = arena.take_item(idx);
        if let Some(old) = &old {
            map.remove(old.key.as_str());
        }
        let key = item.key.clone();
        arena.put_item(idx, item);
        map.insert(key, idx);
        arena.move_after(self.head, idx);
        old
    }

    /// Unlinks an entry; the caller owns map cleanup and slot release.
    pub(crate) fn remove<V>(&mut self, idx: usize, arena: &mut NodeArena<V>) {
        arena.unlink(idx);
        self.len -= 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn cap(&self) -> usize {
        self.cap
    }

    #[cfg(test)]
    pub(crate) fn tail_index<V>(&self, arena: &NodeArena<V>) -> usize {
        arena.prev_of(self.tail)
    }

    /// HEAD sentinel, for walking the queue front-to-back.
    pub(crate) fn head_sentinel(&self) -> usize {
        self.head
    }

    /// TAIL sentinel, terminating a front-to-back walk.
    pub(crate) fn tail_sentinel(&self) -> usize {
        self.tail
    }
}
