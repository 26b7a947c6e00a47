//! Rolling Event Log for External Observability
//!
//! ## Overview
//!
//! Every scheduler transition appends one [`LogEntry`] to a bounded ring of
//! the last L entries. The debug page reads it through
//! [`NodeSnapshot`](crate::NodeSnapshot); nothing in the engine reads it back.
//!
//! Entries are structured ([`NodeEvent`]) rather than preformatted text so
//! that a full log costs `L × ~24` bytes and tests can match on variants.
//! [`NodeEvent`] implements `Display` for rendering.
//!
//! ## Guarantees
//!
//! - Recording never blocks and never fails; a full log drops its oldest entry
//! - With the `log` feature, each entry is mirrored to the `log` facade:
//!   deliveries at info, rejections and evictions at warn, the rest at debug

use core::fmt;

use heapless::Deque;

use crate::time::Timestamp;
use crate::traits::StatusCode;

/// One scheduler transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeEvent {
    /// Flush boundary with no valid samples; no reading produced
    EmptyWindow,
    /// Fresh reading accepted by the sink
    Delivered,
    /// Fresh reading refused; it was queued
    Rejected {
        /// Status returned by the sink
        status: StatusCode,
    },
    /// Fresh reading skipped because the rate-limit window was still closed
    RateLimited {
        /// Whether the reading was queued instead of dropped
        queued: bool,
    },
    /// Fresh reading queued because the uplink was down
    QueuedOffline {
        /// Queue length after the push
        queue_len: usize,
    },
    /// Queue was full; its oldest reading was dropped
    Evicted,
    /// Reconnect requested from the uplink
    ReconnectRequested,
    /// Oldest queued reading accepted by the sink
    BacklogDelivered {
        /// Backdating applied to the reading
        seconds_ago: u64,
        /// Readings still queued
        remaining: usize,
    },
    /// Oldest queued reading refused; it stays queued
    BacklogRejected {
        /// Status returned by the sink
        status: StatusCode,
    },
}

impl fmt::Display for NodeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWindow => write!(f, "flush: no valid samples"),
            Self::Delivered => write!(f, "reading delivered"),
            Self::Rejected { status } => write!(f, "reading rejected ({}), queued", status),
            Self::RateLimited { queued: true } => write!(f, "rate limited, reading queued"),
            Self::RateLimited { queued: false } => write!(f, "rate limited, reading skipped"),
            Self::QueuedOffline { queue_len } => write!(f, "uplink down, queued ({})", queue_len),
            Self::Evicted => write!(f, "queue full, oldest reading dropped"),
            Self::ReconnectRequested => write!(f, "reconnect requested"),
            Self::BacklogDelivered { seconds_ago, remaining } => {
                write!(f, "backlog delivered ({}s ago, {} left)", seconds_ago, remaining)
            }
            Self::BacklogRejected { status } => write!(f, "backlog rejected ({})", status),
        }
    }
}

/// A timestamped [`NodeEvent`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogEntry {
    /// Monotonic time of the transition
    pub at_ms: Timestamp,
    /// What happened
    pub event: NodeEvent,
}

/// Overwrite-oldest ring of the last L events
#[derive(Debug, Clone)]
pub struct EventLog<const L: usize> {
    entries: Deque<LogEntry, L>,
}

impl<const L: usize> EventLog<L> {
    /// Create an empty log
    pub const fn new() -> Self {
        Self { entries: Deque::new() }
    }

    /// Append an event, dropping the oldest entry when full
    pub fn record(&mut self, at_ms: Timestamp, event: NodeEvent) {
        mirror(at_ms, &event);

        if self.entries.is_full() {
            self.entries.pop_front();
        }
        let _ = self.entries.push_back(LogEntry { at_ms, event });
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}

impl<const L: usize> Default for EventLog<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(unused_variables)]
fn mirror(at_ms: Timestamp, event: &NodeEvent) {
    match event {
        NodeEvent::Delivered | NodeEvent::BacklogDelivered { .. } => {
            log_info!("[{}ms] {}", at_ms, event);
        }
        NodeEvent::Rejected { .. } | NodeEvent::BacklogRejected { .. } | NodeEvent::Evicted => {
            log_warn!("[{}ms] {}", at_ms, event);
        }
        _ => {
            log_debug!("[{}ms] {}", at_ms, event);
        }
    }
}
