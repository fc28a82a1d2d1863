use std::{error, fmt, str::FromStr, time::Duration};

use model::config::TransportConfig;

use crate::{mqtt::MqttTransport, sse::SseTransport, Transport};

/// Loading the transport configuration failed. Fatal for the session.
#[derive(Debug)]
pub enum ConfigError {
    RequestError(reqwest::Error),
    InvalidResponse {
        status_code: reqwest::StatusCode,
        url: String,
    },
    Incomplete(&'static str),
}

impl error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::RequestError(e) => write!(f, "could not fetch config: {}", e),
            ConfigError::InvalidResponse { status_code, url } => {
                write!(f, "config endpoint {} answered {}", url, status_code)
            }
            ConfigError::Incomplete(field) => write!(f, "config is missing `{}`", field),
        }
    }
}

impl From<reqwest::Error> for ConfigError {
    fn from(err: reqwest::Error) -> Self {
        ConfigError::RequestError(err)
    }
}

/// Fetches the transport configuration once. Not retried.
pub async fn fetch_config(url: &str) -> Result<TransportConfig, ConfigError> {
    log::info!("Requesting transport config from '{url}'.");
    let response = reqwest::get(url).await?;
    match response.status() {
        status if status.is_success() => Ok(response.json().await?),
        status_code => Err(ConfigError::InvalidResponse {
            status_code,
            url: url.to_owned(),
        }),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportKind {
    /// The relay's server-sent event stream.
    #[default]
    Sse,
    Mqtt,
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sse" | "stream" => Ok(Self::Sse),
            "mqtt" => Ok(Self::Mqtt),
            other => Err(format!("unknown transport `{other}`")),
        }
    }
}

impl TransportKind {
    /// Builds the transport, checking that `config` has what it needs. The
    /// stream is given up after `idle_limit` without data; MQTT relies on its
    /// own keep-alive.
    pub fn build(
        &self,
        config: &TransportConfig,
        idle_limit: Duration,
    ) -> Result<Box<dyn Transport>, ConfigError> {
        Ok(match self {
            Self::Sse => Box::new(SseTransport::from_config(config)?.with_idle_limit(idle_limit)),
            Self::Mqtt => Box::new(MqttTransport::from_config(config)?),
        })
    }
}
