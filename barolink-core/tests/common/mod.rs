//! Shared fixtures for integration tests
//!
//! Scripted capabilities whose behaviour the test flips between ticks
//! through the node's `*_mut()` accessors, plus a clock-stepping helper.

#![allow(dead_code)]

use std::collections::VecDeque;

use barolink_core::time::{EpochSeconds, FixedTime, FixedWallClock, TimeSource, Timestamp};
use barolink_core::traits::{EnvironmentSensors, Sink, StatusCode, Uplink};
use barolink_core::{DerivedReading, NodeConfig, TelemetryNode, TickReport};

/// Wall-clock epoch every test starts from
pub const EPOCH_START: EpochSeconds = 1_700_000_000;

/// Short cadences so a test covers many flush cycles in few ticks
pub const SAMPLE_MS: u64 = 5_000;
pub const HISTORY_MS: u64 = 600_000;
pub const FLUSH_MS: u64 = 60_000;
pub const DRAIN_MS: u64 = 20_000;
pub const RATE_LIMIT_MS: u64 = 15_000;

pub fn test_config() -> NodeConfig {
    NodeConfig::default()
        .sample_interval_ms(SAMPLE_MS)
        .history_interval_ms(HISTORY_MS)
        .flush_interval_ms(FLUSH_MS)
        .drain_interval_ms(DRAIN_MS)
        .rate_limit_ms(RATE_LIMIT_MS)
        .temperature_offset_c(0.0)
}

/// Sensors returning fixed values that tests may change between ticks
#[derive(Debug, Clone)]
pub struct ScriptedSensors {
    pub temperature: f32,
    pub pressure: f32,
    pub secondary: Option<(f32, f32)>,
}

impl Default for ScriptedSensors {
    fn default() -> Self {
        Self {
            temperature: 21.0,
            pressure: 1013.0,
            secondary: Some((20.5, 45.0)),
        }
    }
}

impl EnvironmentSensors for ScriptedSensors {
    fn read_pressure(&mut self) -> f32 {
        self.pressure
    }

    fn read_primary_temperature(&mut self) -> f32 {
        self.temperature
    }

    fn read_secondary(&mut self) -> Option<(f32, f32)> {
        self.secondary
    }
}

/// Uplink with a manual switch
#[derive(Debug, Default)]
pub struct SwitchUplink {
    pub down: bool,
    pub reconnects: u32,
}

impl Uplink for SwitchUplink {
    fn is_available(&mut self) -> bool {
        !self.down
    }

    fn request_reconnect(&mut self) {
        self.reconnects += 1;
    }
}

/// One recorded delivery attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attempt {
    pub reading: DerivedReading,
    pub created_at: Option<EpochSeconds>,
    pub status: StatusCode,
}

/// Sink answering from a script, then with a default status
#[derive(Debug)]
pub struct ScriptedSink {
    pub script: VecDeque<StatusCode>,
    pub default: StatusCode,
    pub attempts: Vec<Attempt>,
}

impl Default for ScriptedSink {
    fn default() -> Self {
        Self {
            script: VecDeque::new(),
            default: StatusCode::OK,
            attempts: Vec::new(),
        }
    }
}

impl ScriptedSink {
    pub fn fresh_attempts(&self) -> usize {
        self.attempts.iter().filter(|a| a.created_at.is_none()).count()
    }

    pub fn backlog_attempts(&self) -> Vec<&Attempt> {
        self.attempts.iter().filter(|a| a.created_at.is_some()).collect()
    }
}

impl Sink for ScriptedSink {
    fn deliver(&mut self, reading: &DerivedReading, created_at: Option<EpochSeconds>) -> StatusCode {
        let status = self.script.pop_front().unwrap_or(self.default);
        self.attempts.push(Attempt { reading: *reading, created_at, status });
        status
    }
}

pub type TestNode<const B: usize> =
    TelemetryNode<ScriptedSensors, SwitchUplink, ScriptedSink, FixedWallClock, 18, B, 32>;

pub fn build_node<const B: usize>(config: NodeConfig) -> TestNode<B> {
    TelemetryNode::new(
        config,
        ScriptedSensors::default(),
        SwitchUplink::default(),
        ScriptedSink::default(),
        FixedWallClock::new(EPOCH_START),
        0,
    )
}

/// Drives a node in sample-interval steps, keeping the wall clock in step
pub struct Harness<const B: usize> {
    pub node: TestNode<B>,
    time: FixedTime,
}

impl<const B: usize> Harness<B> {
    pub fn new(config: NodeConfig) -> Self {
        Self { node: build_node(config), time: FixedTime::new(0) }
    }

    /// Monotonic time of the last tick
    pub fn now(&self) -> Timestamp {
        self.time.now()
    }

    /// Advance one sample interval and tick
    pub fn step(&mut self) -> TickReport {
        self.time.advance(SAMPLE_MS);
        self.node.clock_mut().advance(SAMPLE_MS / 1_000);
        self.node.tick(self.time.now())
    }

    /// Step until the next flush has run; returns that tick's report
    pub fn run_to_flush(&mut self) -> TickReport {
        loop {
            let report = self.step();
            if report.flush.is_some() {
                return report;
            }
        }
    }

    /// Step until `ms` more milliseconds have passed
    pub fn run_for(&mut self, ms: u64) -> Vec<TickReport> {
        let until = self.now() + ms;
        let mut reports = Vec::new();
        while self.now() < until {
            reports.push(self.step());
        }
        reports
    }

    pub fn epoch(&self) -> EpochSeconds {
        EPOCH_START + self.now() / 1_000
    }
}
