//! Bounded Offline Queue for Undelivered Readings
//!
//! ## Overview
//!
//! Readings that could not reach the sink wait here until a later cycle
//! drains them, oldest first, one per flush cycle. The queue lives in RAM
//! only; a power loss drops it.
//!
//! ## Overflow Policy
//!
//! When full, the oldest reading is evicted to admit the newest. A long
//! outage therefore keeps the most recent B readings, which is what a
//! dashboard wants to backfill first:
//!
//! ```text
//! B = 3, push R1..R4:
//!
//! [R1]            push R1
//! [R1 R2]         push R2
//! [R1 R2 R3]      push R3   (full)
//! [R2 R3 R4]      push R4   → R1 evicted
//! ```
//!
//! Entries leave the queue only through eviction or after the sink
//! confirmed delivery of that exact entry ([`OfflineQueue::pop_oldest`]
//! after a successful send).
//!
//! ## Backdating
//!
//! Queued readings carry no timestamp. The age of the oldest entry is
//! approximated as `len × flush_interval`, assuming one reading was queued
//! per missed flush cycle. Clock drift or skipped cycles make this inexact.

use heapless::Deque;

use crate::reading::DerivedReading;

/// Fixed-capacity FIFO of derived readings with overwrite-oldest eviction
#[derive(Debug, Clone)]
pub struct OfflineQueue<const B: usize> {
    entries: Deque<DerivedReading, B>,
}

impl<const B: usize> OfflineQueue<B> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self { entries: Deque::new() }
    }

    /// Append a reading, evicting the oldest when full
    ///
    /// Returns the evicted reading, if any. The new reading is always kept.
    pub fn push(&mut self, reading: DerivedReading) -> Option<DerivedReading> {
        let evicted = if self.entries.is_full() {
            self.entries.pop_front()
        } else {
            None
        };

        // Cannot fail: a slot was freed above if the deque was full
        let _ = self.entries.push_back(reading);
        evicted
    }

    /// Oldest queued reading, without removing it
    pub fn peek_oldest(&self) -> Option<&DerivedReading> {
        self.entries.front()
    }

    /// Remove the oldest reading
    ///
    /// No-op on an empty queue.
    pub fn pop_oldest(&mut self) -> Option<DerivedReading> {
        self.entries.pop_front()
    }

    /// Number of queued readings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the next push evicts
    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    /// Maximum number of readings (B)
    pub const fn capacity(&self) -> usize {
        B
    }

    /// Approximate age of the oldest entry in seconds
    ///
    /// `len × flush_interval_secs`; zero when empty.
    pub fn oldest_age_secs(&self, flush_interval_secs: u64) -> u64 {
        self.len() as u64 * flush_interval_secs
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &DerivedReading> {
        self.entries.iter()
    }
}

impl<const B: usize> Default for OfflineQueue<B> {
    fn default() -> Self {
        Self::new()
    }
}
