//! Sink rate limiting
//!
//! The upstream service accepts one update per rate-limit interval. Only a
//! confirmed success moves the window; failed attempts do not, so the next
//! eligible cycle may retry immediately.
//!
//! ```text
//!   success              success
//!      │◄── rate_limit ──►│
//! ─────●──────────────────●────────→ t
//!      ↑ blocked ↑        ↑ ready
//! ```

use crate::time::{elapsed_ms, Timestamp};

/// Single-timestamp spacing gate for sink deliveries
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Minimum spacing between successful deliveries
    interval_ms: u64,
    /// Last confirmed successful delivery
    last_success: Option<Timestamp>,
}

impl RateLimiter {
    /// Create a limiter that has never sent
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_success: None,
        }
    }

    /// Whether another delivery may be attempted at `now`
    pub fn is_ready(&self, now: Timestamp) -> bool {
        match self.last_success {
            None => true,
            Some(last) => elapsed_ms(last, now) >= self.interval_ms,
        }
    }

    /// Record a confirmed successful delivery
    pub fn mark_success(&mut self, now: Timestamp) {
        self.last_success = Some(now);
    }

    /// Timestamp of the last confirmed success
    pub fn last_success(&self) -> Option<Timestamp> {
        self.last_success
    }

    /// Milliseconds until the gate opens (zero when ready)
    pub fn wait_ms(&self, now: Timestamp) -> u64 {
        match self.last_success {
            None => 0,
            Some(last) => self.interval_ms.saturating_sub(elapsed_ms(last, now)),
        }
    }
}
