//! Fixed-Size Pressure History for Trend Classification
//!
//! ## Overview
//!
//! The forecast needs one number: how much the pressure changed over the
//! last H history samples (3 hours at the default cadence). `RingHistory`
//! keeps exactly H slots, overwrites the slot under its write cursor on each
//! sample and reports the difference between the current pressure and the
//! slot the cursor points at - which, once the ring has wrapped, is the
//! oldest sample.
//!
//! ## Memory Layout
//!
//! ```text
//! RingHistory<5> after 7 samples:
//! ┌──────┬──────┬──────┬──────┬──────┐
//! │  s5  │  s6  │  s2  │  s3  │  s4  │  ← slots
//! └──────┴──────┴──────┴──────┴──────┘
//!                  ↑
//!               cursor = 2 (oldest sample, next overwrite)
//! wrapped = true
//! ```
//!
//! ## Insufficient History
//!
//! Before the cursor has returned to slot 0 once, the slot under the cursor
//! is still the initial zero and any delta against it would be nonsense.
//! [`RingHistory::delta`] returns `None` until the wrap flag is set, and the
//! classifier turns `None` into [`ForecastCode::Unknown`](crate::ForecastCode::Unknown).
//!
//! The history never shrinks and is only reset by a restart.

/// Circular buffer of pressure samples with a wrap flag
///
/// ## Internal Invariants
///
/// - `cursor < H`
/// - `wrapped` becomes true on the H-th record and never goes back
#[derive(Debug, Clone)]
pub struct RingHistory<const H: usize> {
    /// Pressure samples in hPa; zero until first written
    slots: [f32; H],

    /// Slot the next record overwrites (the oldest sample once wrapped)
    cursor: usize,

    /// Set the first time the cursor returns to slot 0
    wrapped: bool,
}

impl<const H: usize> RingHistory<H> {
    const CAPACITY_OK: () = assert!(H > 0, "history capacity must be non-zero");

    /// Create an empty history
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;
        Self {
            slots: [0.0; H],
            cursor: 0,
            wrapped: false,
        }
    }

    /// Record one history sample
    ///
    /// Overwrites the slot under the cursor and advances the cursor modulo
    /// H. The wrap flag is set the first time the cursor returns to 0.
    pub fn record_pressure(&mut self, value: f32) {
        self.slots[self.cursor] = value;
        self.cursor = (self.cursor + 1) % H;

        if self.cursor == 0 {
            self.wrapped = true;
        }
    }

    /// Pressure change relative to the oldest sample
    ///
    /// `current - slot[cursor]`, or `None` while the history has not yet
    /// wrapped.
    pub fn delta(&self, current_pressure: f32) -> Option<f32> {
        if !self.wrapped {
            return None;
        }

        Some(current_pressure - self.slots[self.cursor])
    }

    /// Whether a full window of samples is available
    pub fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    /// Slot the next sample will overwrite
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of slots (H)
    pub const fn capacity(&self) -> usize {
        H
    }

    /// Iterate recorded samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let (start, count) = if self.wrapped { (self.cursor, H) } else { (0, self.cursor) };
        (0..count).map(move |i| self.slots[(start + i) % H])
    }
}

impl<const H: usize> Default for RingHistory<H> {
    fn default() -> Self {
        Self::new()
    }
}
