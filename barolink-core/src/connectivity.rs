//! Connectivity gate
//!
//! Wraps the [`Uplink`] capability with the reconnect throttle: while the
//! uplink is down, reconnects are requested at most once per
//! reconnect-retry interval so a flapping network stack is not hammered
//! every flush cycle.

use crate::time::{elapsed_ms, Timestamp};
use crate::traits::Uplink;

/// Availability check plus throttled reconnect requests
#[derive(Debug, Clone)]
pub struct ConnectivityGate {
    retry_interval_ms: u64,
    last_reconnect: Option<Timestamp>,
    reconnects: u32,
}

impl ConnectivityGate {
    /// Create a gate that has never requested a reconnect
    pub const fn new(retry_interval_ms: u64) -> Self {
        Self {
            retry_interval_ms,
            last_reconnect: None,
            reconnects: 0,
        }
    }

    /// Whether the uplink is usable right now
    pub fn is_open<U: Uplink>(&self, uplink: &mut U) -> bool {
        uplink.is_available()
    }

    /// Request a reconnect unless one was requested within the retry interval
    ///
    /// Returns whether a request was issued.
    pub fn try_reconnect<U: Uplink>(&mut self, uplink: &mut U, now: Timestamp) -> bool {
        let due = match self.last_reconnect {
            None => true,
            Some(last) => elapsed_ms(last, now) >= self.retry_interval_ms,
        };

        if due {
            uplink.request_reconnect();
            self.last_reconnect = Some(now);
            self.reconnects = self.reconnects.saturating_add(1);
        }

        due
    }

    /// Reconnect requests issued since boot
    pub fn reconnects(&self) -> u32 {
        self.reconnects
    }
}
