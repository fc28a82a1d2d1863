use std::{error, fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;

pub use connection::{ConnectionSignal, ConnectionState};
pub use supervisor::{supervise, TransportEvent, DEFAULT_BACKOFF};

pub mod config;
pub mod connection;
pub mod decode;
pub mod mqtt;
pub mod sse;
pub mod supervisor;

/// A push channel delivering raw location payloads.
#[async_trait]
pub trait Transport: Send {
    fn name(&self) -> &'static str;

    /// Opens the channel. Resolves once it is established.
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Waits for the next payload. `Ok(None)` means the peer closed the
    /// channel.
    async fn next_payload(&mut self) -> Result<Option<Bytes>, TransportError>;
}

#[derive(Debug, Clone)]
pub enum TransportError {
    RequestError(Arc<reqwest::Error>),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
    },
    Mqtt(String),
    NotConnected,
    /// Nothing arrived, not even a keep-alive, within the idle limit.
    IdleTimeout(Duration),
    LineTooLong {
        limit: usize,
    },
}

impl error::Error for TransportError {}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransportError::RequestError(e) => write!(f, "HTTP request error: {}", e),
            TransportError::InvalidResponse { status_code, url } => {
                write!(f, "invalid response from {}: {}", url, status_code)
            }
            TransportError::Mqtt(e) => write!(f, "MQTT error: {}", e),
            TransportError::NotConnected => write!(f, "transport is not connected"),
            TransportError::IdleTimeout(limit) => {
                write!(f, "no data for {} s, assuming the connection is dead", limit.as_secs_f32())
            }
            TransportError::LineTooLong { limit } => {
                write!(f, "stream line exceeds {} bytes", limit)
            }
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::RequestError(Arc::new(err))
    }
}

impl From<rumqttc::ConnectionError> for TransportError {
    fn from(err: rumqttc::ConnectionError) -> Self {
        TransportError::Mqtt(err.to_string())
    }
}

impl From<rumqttc::ClientError> for TransportError {
    fn from(err: rumqttc::ClientError) -> Self {
        TransportError::Mqtt(err.to_string())
    }
}
