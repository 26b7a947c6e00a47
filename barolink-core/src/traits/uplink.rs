//! Uplink and sink capabilities
//!
//! The uplink answers "can we reach the network at all"; the sink is the
//! one upstream time-series endpoint. The core only ever inspects whether a
//! delivery succeeded, never the response body.

use core::fmt;

use crate::reading::DerivedReading;
use crate::time::EpochSeconds;

/// Network availability and reconnect control
pub trait Uplink {
    /// Whether the uplink is currently usable
    fn is_available(&mut self) -> bool;

    /// Ask the network stack to (re)connect
    ///
    /// Must not block for long; the connectivity gate throttles how often
    /// this is called.
    fn request_reconnect(&mut self);
}

/// The upstream time-series endpoint
pub trait Sink {
    /// Deliver one reading
    ///
    /// `created_at` is `None` for a fresh reading and the backdated creation
    /// time for a queued one. Blocks until the transport's own timeout.
    fn deliver(&mut self, reading: &DerivedReading, created_at: Option<EpochSeconds>) -> StatusCode;
}

/// Status of a delivery attempt
///
/// HTTP status semantics; `0` stands for "no response at all"
/// (DNS, connect or read failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// The only status counted as delivered
    pub const OK: StatusCode = StatusCode(200);

    /// No HTTP response was received
    pub const TRANSPORT_FAILURE: StatusCode = StatusCode(0);

    /// Wrap a raw status
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Raw status value
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Whether the sink accepted the reading
    pub const fn is_success(self) -> bool {
        self.0 == Self::OK.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusCode {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.0)
    }
}
