//! Sampling, forecast and delivery engine for Barolink telemetry nodes
//!
//! Samples temperature, humidity and pressure at fixed cadences, reduces each
//! flush window to one [`DerivedReading`], classifies the short-term pressure
//! trend and relays readings to a single upstream sink under its rate limit.
//! Readings that cannot be delivered are kept in a bounded offline queue and
//! drained later with backdated timestamps.
//!
//! Key constraints:
//! - Runs on a single cooperative timeline (no locks, no threads)
//! - No heap allocation: every buffer is a const-generic fixed capacity
//! - Nothing in a tick is fatal; failures degrade to caching, skipping or queuing
//!
//! ```no_run
//! use barolink_core::{NodeConfig, TelemetryNode};
//! # use barolink_core::traits::{EnvironmentSensors, Uplink, Sink, StatusCode, WallClock};
//! # use barolink_core::DerivedReading;
//! # struct Board; struct Wifi; struct Cloud; struct Ntp;
//! # impl EnvironmentSensors for Board {
//! #     fn read_pressure(&mut self) -> f32 { 1013.0 }
//! #     fn read_primary_temperature(&mut self) -> f32 { 21.0 }
//! #     fn read_secondary(&mut self) -> Option<(f32, f32)> { Some((21.0, 40.0)) }
//! # }
//! # impl Uplink for Wifi { fn is_available(&mut self) -> bool { true } fn request_reconnect(&mut self) {} }
//! # impl Sink for Cloud { fn deliver(&mut self, _: &DerivedReading, _: Option<u64>) -> StatusCode { StatusCode::OK } }
//! # impl WallClock for Ntp { fn epoch_secs(&self) -> u64 { 0 } }
//!
//! let mut node: TelemetryNode<_, _, _, _> =
//!     TelemetryNode::new(NodeConfig::default(), Board, Wifi, Cloud, Ntp, 0);
//!
//! // Called from the main loop with a monotonic millisecond clock
//! let report = node.tick(5_000);
//! assert!(report.due.sample);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod aggregator;
pub mod backlog;
pub mod cadence;
pub mod config;
pub mod connectivity;
pub mod constants;
pub mod errors;
pub mod event_log;
pub mod forecast;
pub mod history;
pub mod node;
pub mod rate_limit;
pub mod reading;
pub mod scheduler;
pub mod time;
pub mod traits;

#[cfg(feature = "std")]
pub mod runner;

// Public API
pub use aggregator::{SampleAggregator, WindowAverage};
pub use backlog::OfflineQueue;
pub use cadence::{Cadences, DueSteps};
pub use config::NodeConfig;
pub use errors::{ConfigError, TelemetryError};
pub use event_log::{EventLog, LogEntry, NodeEvent};
pub use forecast::{classify, ForecastCode};
pub use history::RingHistory;
pub use node::{NodeSnapshot, TelemetryNode, TickReport};
pub use reading::{DerivedReading, LastKnownReadings};
pub use scheduler::{DeliveryCounters, DrainOutcome, FlushOutcome, FreshOutcome, SchedulerState};

#[cfg(feature = "std")]
pub use runner::CooperativeRunner;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
