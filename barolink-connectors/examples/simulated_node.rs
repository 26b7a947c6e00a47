//! Run a node with simulated sensors against a real HTTP endpoint
//!
//! ```text
//! cargo run --example simulated_node -- https://api.example.com/update WRITE-KEY api.example.com:443
//! ```

use std::time::Duration;

use barolink_connectors::http::{HttpConfig, HttpSink};
use barolink_connectors::uplink::TcpReachUplink;
use barolink_core::time::{MonotonicClock, SystemWallClock, TimeSource};
use barolink_core::traits::EnvironmentSensors;
use barolink_core::{CooperativeRunner, NodeConfig, TelemetryNode};

/// Slow sine drift around a typical indoor climate
struct SimulatedBoard {
    clock: MonotonicClock,
}

impl SimulatedBoard {
    fn phase(&self) -> f32 {
        (self.clock.now() as f32 / 600_000.0).sin()
    }
}

impl EnvironmentSensors for SimulatedBoard {
    fn read_pressure(&mut self) -> f32 {
        1013.0 + 2.0 * self.phase()
    }

    fn read_primary_temperature(&mut self) -> f32 {
        21.0 + self.phase()
    }

    fn read_secondary(&mut self) -> Option<(f32, f32)> {
        Some((20.5 + self.phase(), 45.0 - 5.0 * self.phase()))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let endpoint = args.next().ok_or("usage: simulated_node <endpoint> <api-key> <check-host:port>")?;
    let key = args.next().ok_or("missing api key")?;
    let check = args.next().ok_or("missing check address")?;

    let sink = HttpSink::new(HttpConfig::new(endpoint).api_key_in_body(key))?;
    let uplink = TcpReachUplink::new(check, Duration::from_secs(2))?
        .with_reconnect_hook(|| eprintln!("uplink down, waiting for the network"));

    let config = match std::env::var("BAROLINK_CONFIG") {
        Ok(path) => NodeConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        Err(_) => NodeConfig::default(),
    };

    let board = SimulatedBoard { clock: MonotonicClock::new() };
    let time = MonotonicClock::new();
    let node: TelemetryNode<_, _, _, _> =
        TelemetryNode::try_new(config, board, uplink, sink, SystemWallClock, time.now())?;

    let mut runner = CooperativeRunner::new(node, time);
    runner.run()
}
