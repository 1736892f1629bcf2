//! 4-bit approximate frequency counter using a Count-Min sketch.
//!
//! The sketch is 4 rows × `W` columns of saturating 4-bit counters, where
//! `W` is the next power of two at or above the requested capacity.  Each
//! row packs two counters per byte.  `add` bumps one counter per row (the
//! column is a per-row mix of the key hash); `estimate` returns the minimum
//! of the four reads — the Count-Min estimator, which over-counts on
//! collisions but never under-counts.
//!
//! Aging is driven from outside: the cache halves every counter via
//! [`Cm4::reset`] at each sampling-epoch boundary, so estimates decay
//! exponentially with read demand (Einziger, Friedman & Manes, *TinyLFU: A
//! Highly Efficient Cache Admission Policy*, 2017).

const DEPTH: usize = 4;

/// Per-row multiplicative mixing constants.  Distinct odd constants give
/// four nearly-independent column derivations from one 64-bit hash.
const SEEDS: [u64; DEPTH] = [
    0x9E37_79B9_7F4A_7C15,
    0xC2B2_AE3D_27D4_EB4F,
    0x1656_67B1_9E37_79F9,
    0x27D4_EB2F_1656_67C5,
];

/// Byte mask applied while halving: keeps each nibble's shifted-out low bit
/// from bleeding into its neighbour.
const HALVE_MASK: u8 = 0x77;

/// One row of 4-bit counters.  Column `2i` lives in the low nibble of byte
/// `i`, column `2i + 1` in the high nibble.
struct NibbleRow(Vec<u8>);

impl NibbleRow {
    fn new(width: usize) -> Self {
        NibbleRow(vec![0u8; width.div_ceil(2)])
    }

    #[inline]
    fn get(&self, col: usize) -> u8 {
        (self.0[col >> 1] >> ((col & 1) << 2)) & 0x0F
    }

    /// Bumps the counter at `col`, saturating at 15.
    #[inline]
    fn inc(&mut self, col: usize) {
        let shift = (col & 1) << 2;
        let byte = &mut self.0[col >> 1];
        if (*byte >> shift) & 0x0F < 15 {
            *byte += 1 << shift;
        }
    }

    /// Halves every counter in the row: each becomes `floor(prev / 2)`.
    fn halve(&mut self) {
        for byte in &mut self.0 {
            *byte = (*byte >> 1) & HALVE_MASK;
        }
    }
}

/// 4-bit Count-Min sketch with externally driven aging.
pub(crate) struct Cm4 {
    rows: [NibbleRow; DEPTH],
    /// `width − 1`; width is a power of two.
    mask: u64,
}

impl Cm4 {
    /// Creates a sketch sized for roughly `capacity` distinct keys.
    pub(crate) fn new(capacity: usize) -> Self {
        let width = capacity.next_power_of_two().max(1);
        Cm4 {
            rows: std::array::from_fn(|_| NibbleRow::new(width)),
            mask: (width - 1) as u64,
        }
    }

    #[inline]
    fn column(&self, h: u64, row: usize) -> usize {
        ((h.wrapping_mul(SEEDS[row]) >> 32) & self.mask) as usize
    }

    /// Records one access for `h` in every row.
    #[inline]
    pub(crate) fn add(&mut self, h: u64) {
        for row in 0..DEPTH {
            let col = self.column(h, row);
            self.rows[row].inc(col);
        }
    }

    /// Estimated access count for `h`, in `[0, 15]`.
    #[inline]
    pub(crate) fn estimate(&self, h: u64) -> u8 {
        let mut freq = 15u8;
        for row in 0..DEPTH {
            let col = self.column(h, row);
            freq = freq.min(self.rows[row].get(col));
        }
        freq
    }

    /// Halves every counter.  Called at each sampling-epoch boundary so the
    /// sketch forgets old hot-sets.
    pub(crate) fn reset(&mut self) {
        for row in &mut self.rows {
            row.halve();
        }
    }
}
