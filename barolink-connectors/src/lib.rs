//! Hosted Capability Implementations for Barolink Nodes
//!
//! ## Overview
//!
//! `barolink-core` only knows capabilities. This crate provides concrete
//! ones for nodes that run on a hosted OS (a Raspberry Pi, a gateway box, a
//! CI machine replaying sensor data):
//!
//! | Capability | Type                           | Transport                 |
//! |------------|--------------------------------|---------------------------|
//! | `Sink`     | [`http::HttpSink`]             | HTTP(S) POST, JSON body   |
//! | `Uplink`   | [`uplink::TcpReachUplink`]     | TCP connect check         |
//!
//! ## Failure Model
//!
//! Nothing here returns an error into the scheduler. The sink folds every
//! failure into a [`StatusCode`](barolink_core::traits::StatusCode): the
//! server's status when one arrived, `TRANSPORT_FAILURE` (0) when none did.
//! The scheduler decides what to queue and when to retry; the sink sends
//! each reading exactly once per call.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use barolink_connectors::http::{HttpConfig, HttpSink};
//! use barolink_connectors::uplink::TcpReachUplink;
//!
//! let sink = HttpSink::new(
//!     HttpConfig::new("https://api.example.com/update")
//!         .api_key_in_body("WRITE-KEY")
//!         .timeout_secs(10),
//! )?;
//! let uplink = TcpReachUplink::new("api.example.com:443", Duration::from_secs(2))?;
//! # drop((sink, uplink));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(feature = "http")]
pub mod http;

pub mod uplink;

#[cfg(feature = "http")]
pub use http::{AuthMethod, HttpConfig, HttpError, HttpSink};
pub use uplink::TcpReachUplink;

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The target host name did not resolve to any socket address
    #[error("Address resolution failed: {0}")]
    Resolve(String),

    /// A connector was built with unusable settings
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Delivery statistics common to all connectors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Requests answered with 200
    pub messages_sent: u64,
    /// Requests answered with anything else, or not answered
    pub messages_failed: u64,
    /// Request body bytes sent
    pub bytes_sent: u64,
    /// Reconnect requests handled
    pub reconnections: u32,
    /// Last error message
    pub last_error: Option<String>,
}
