//! HTTP Sink for Time-Series Update Endpoints
//!
//! ## Overview
//!
//! [`HttpSink`] implements the core [`Sink`] capability by POSTing one JSON
//! object per reading to a single endpoint. It targets the "update channel"
//! style APIs of hosted time-series services: one reading per request, an
//! API key either in a header or in the body, and a per-account rate limit
//! the core scheduler already respects.
//!
//! ## Wire Format
//!
//! ```text
//! POST /update HTTP/1.1
//! Content-Type: application/json
//!
//! {
//!   "temperature": 19.6,
//!   "secondary_temperature": 20.5,
//!   "humidity": 45.0,
//!   "pressure": 1013.2,
//!   "forecast": 3,
//!   "absolute_humidity": 7.7,
//!   "dew_point": 9.6,
//!   "created_at": "2023-11-14T22:12:20Z",   // backlog readings only
//!   "api_key": "WRITE-KEY"                  // AuthMethod::BodyKey only
//! }
//! ```
//!
//! ## Status Mapping
//!
//! | Outcome                       | `StatusCode`          |
//! |-------------------------------|-----------------------|
//! | 200                           | `OK` (delivered)      |
//! | any other HTTP status         | that status           |
//! | DNS / connect / read failure  | `TRANSPORT_FAILURE`   |
//!
//! There are no retries here. A failed reading goes back to the scheduler,
//! which queues it and drains it on a later cycle under the rate limit.

use std::collections::HashMap;
use std::time::Duration;

use barolink_core::time::EpochSeconds;
use barolink_core::traits::{Sink, StatusCode};
use barolink_core::DerivedReading;
use base64::Engine;
use chrono::{DateTime, SecondsFormat};
use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::ConnectionStats;

/// HTTP-specific errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network failure before any response
    #[error("Request failed: {0}")]
    Request(String),

    /// Server answered with an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Payload could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid sink configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Authentication methods
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication
    None,
    /// Bearer token
    Bearer(String),
    /// Basic authentication
    Basic { username: String, password: String },
    /// API key in a request header
    ApiKey { header: String, value: String },
    /// API key as an `api_key` field in the JSON body
    BodyKey(String),
}

/// HTTP sink configuration
#[derive(Clone, Debug)]
pub struct HttpConfig {
    /// Full URL readings are POSTed to
    pub endpoint: String,
    /// Connect and read timeout for one request
    pub timeout: Duration,
    /// Authentication method
    pub auth: AuthMethod,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl HttpConfig {
    /// Create a configuration for an endpoint URL
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(10),
            auth: AuthMethod::None,
            headers: HashMap::new(),
            user_agent: format!("Barolink/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set bearer token authentication
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthMethod::Bearer(token.into());
        self
    }

    /// Set basic authentication
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Basic {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Send an API key in a header
    pub fn api_key(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth = AuthMethod::ApiKey {
            header: header.into(),
            value: value.into(),
        };
        self
    }

    /// Send an API key in the JSON body
    pub fn api_key_in_body(mut self, key: impl Into<String>) -> Self {
        self.auth = AuthMethod::BodyKey(key.into());
        self
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Override the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    fn validate(&self) -> Result<(), HttpError> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(HttpError::Config("Endpoint must start with http:// or https://".into()));
        }
        if self.timeout.is_zero() {
            return Err(HttpError::Config("Timeout must be non-zero".into()));
        }
        match &self.auth {
            AuthMethod::ApiKey { header, .. } if header.is_empty() => {
                Err(HttpError::Config("API key header name is empty".into()))
            }
            AuthMethod::BodyKey(key) if key.is_empty() => Err(HttpError::Config("API key is empty".into())),
            _ => Ok(()),
        }
    }
}

/// JSON body of one update request
#[derive(Debug, Serialize)]
pub struct ReadingPayload<'a> {
    pub temperature: f32,
    pub secondary_temperature: f32,
    pub humidity: f32,
    pub pressure: f32,
    pub forecast: u8,
    pub absolute_humidity: f32,
    pub dew_point: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<&'a str>,
}

impl<'a> ReadingPayload<'a> {
    /// Build the body for a reading, stamping backlog entries
    pub fn new(reading: &DerivedReading, created_at: Option<EpochSeconds>, api_key: Option<&'a str>) -> Self {
        Self {
            temperature: reading.temperature,
            secondary_temperature: reading.secondary_temperature,
            humidity: reading.humidity,
            pressure: reading.pressure,
            forecast: reading.forecast.as_u8(),
            absolute_humidity: reading.absolute_humidity,
            dew_point: reading.dew_point,
            created_at: created_at.and_then(rfc3339),
            api_key,
        }
    }
}

/// Epoch seconds as an RFC 3339 UTC timestamp
fn rfc3339(secs: EpochSeconds) -> Option<String> {
    let secs = i64::try_from(secs).ok()?;
    DateTime::from_timestamp(secs, 0).map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// One-request-per-reading sink using the ureq client
pub struct HttpSink {
    config: HttpConfig,
    agent: ureq::Agent,
    stats: ConnectionStats,
}

impl HttpSink {
    /// Validate the configuration and build the HTTP agent
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        config.validate()?;

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            stats: ConnectionStats::default(),
        })
    }

    /// POST one reading; returns the HTTP status of a non-error response
    pub fn post_reading(
        &mut self,
        reading: &DerivedReading,
        created_at: Option<EpochSeconds>,
    ) -> Result<u16, HttpError> {
        let body_key = match &self.config.auth {
            AuthMethod::BodyKey(key) => Some(key.as_str()),
            _ => None,
        };
        let payload = ReadingPayload::new(reading, created_at, body_key);
        let json = serde_json::to_string(&payload).map_err(|e| HttpError::Serialization(e.to_string()))?;

        let request = self.build_request();
        match request.send_string(&json) {
            Ok(response) => {
                self.stats.bytes_sent += json.len() as u64;
                Ok(response.status())
            }
            Err(ureq::Error::Status(status, response)) => {
                self.stats.bytes_sent += json.len() as u64;
                Err(HttpError::ServerError {
                    status,
                    message: response.into_string().unwrap_or_default(),
                })
            }
            Err(ureq::Error::Transport(e)) => Err(HttpError::Request(e.to_string())),
        }
    }

    /// Delivery statistics since construction
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Active configuration
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Build request with authentication and headers
    fn build_request(&self) -> ureq::Request {
        let mut request = self.agent.post(&self.config.endpoint);

        match &self.config.auth {
            AuthMethod::None | AuthMethod::BodyKey(_) => {}
            AuthMethod::Bearer(token) => {
                request = request.set("Authorization", &format!("Bearer {}", token));
            }
            AuthMethod::Basic { username, password } => {
                let credentials =
                    base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password));
                request = request.set("Authorization", &format!("Basic {}", credentials));
            }
            AuthMethod::ApiKey { header, value } => {
                request = request.set(header, value);
            }
        }

        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }

        request
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
    }
}

impl Sink for HttpSink {
    fn deliver(&mut self, reading: &DerivedReading, created_at: Option<EpochSeconds>) -> StatusCode {
        let status = match self.post_reading(reading, created_at) {
            Ok(code) => StatusCode::new(code),
            Err(HttpError::ServerError { status, message }) => {
                self.stats.last_error = Some(format!("{}: {}", status, message));
                StatusCode::new(status)
            }
            Err(e) => {
                warn!("update request failed: {}", e);
                self.stats.last_error = Some(e.to_string());
                StatusCode::TRANSPORT_FAILURE
            }
        };

        if status.is_success() {
            self.stats.messages_sent += 1;
        } else {
            self.stats.messages_failed += 1;
        }
        debug!("POST {} -> {}", self.config.endpoint, status);

        status
    }
}
