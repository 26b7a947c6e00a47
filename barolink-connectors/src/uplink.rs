//! TCP reachability uplink
//!
//! On a hosted OS the network stack owns the link; the node can only ask
//! whether its endpoint is reachable. [`TcpReachUplink`] answers
//! `is_available` with a bounded TCP connect to the sink's host and hands
//! reconnect requests to an optional hook (restart an interface, kick a
//! modem, or just log).

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use barolink_core::traits::Uplink;
use log::{debug, info};

use crate::{ConnectionStats, ConnectorError};

/// Reachability check by TCP connect
pub struct TcpReachUplink {
    target: SocketAddr,
    timeout: Duration,
    on_reconnect: Option<Box<dyn FnMut() + Send>>,
    last_check_ok: Option<bool>,
    stats: ConnectionStats,
}

impl TcpReachUplink {
    /// Resolve `target` once and check it with the given connect timeout
    pub fn new(target: impl ToSocketAddrs, timeout: Duration) -> Result<Self, ConnectorError> {
        if timeout.is_zero() {
            return Err(ConnectorError::ConfigError("Connect timeout must be non-zero".into()));
        }

        let target = target
            .to_socket_addrs()
            .map_err(|e| ConnectorError::Resolve(e.to_string()))?
            .next()
            .ok_or_else(|| ConnectorError::Resolve("no addresses".into()))?;

        Ok(Self {
            target,
            timeout,
            on_reconnect: None,
            last_check_ok: None,
            stats: ConnectionStats::default(),
        })
    }

    /// Run `hook` whenever the scheduler requests a reconnect
    pub fn with_reconnect_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_reconnect = Some(Box::new(hook));
        self
    }

    /// Checked address
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Reconnect statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }
}

impl Uplink for TcpReachUplink {
    fn is_available(&mut self) -> bool {
        let result = TcpStream::connect_timeout(&self.target, self.timeout);
        let ok = result.is_ok();

        if self.last_check_ok != Some(ok) {
            match &result {
                Ok(_) => info!("uplink to {} is up", self.target),
                Err(e) => info!("uplink to {} is down: {}", self.target, e),
            }
        }
        if let Err(e) = result {
            self.stats.last_error = Some(e.to_string());
        }

        self.last_check_ok = Some(ok);
        ok
    }

    fn request_reconnect(&mut self) {
        self.stats.reconnections += 1;
        debug!("reconnect requested ({} so far)", self.stats.reconnections);

        if let Some(hook) = self.on_reconnect.as_mut() {
            hook();
        }
    }
}
