//! Capability traits for the collaborators around the core
//!
//! The engine never touches registers, radios or sockets. Board support
//! code implements these traits and hands the implementations to
//! [`TelemetryNode`](crate::TelemetryNode). Keep them small - a capability
//! is a question ("what is the pressure?", "is the uplink up?"), not a driver.

pub mod sensors;
pub mod time;
pub mod uplink;

pub use sensors::EnvironmentSensors;
pub use time::{TimeSource, WallClock};
pub use uplink::{Sink, StatusCode, Uplink};
