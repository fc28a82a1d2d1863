use std::time::Duration;

use tracker::{ViewportPolicy, ZeroCoordinatePolicy, DEFAULT_PADDING_PX};
use transport::{config::TransportKind, sse::DEFAULT_IDLE_LIMIT, DEFAULT_BACKOFF};
use utility::env;

pub const DEFAULT_CONFIG_URL: &str = "http://localhost:5001/api/config";

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub config_url: String,
    pub transport: TransportKind,
    pub reconnect: Duration,
    /// How long the stream may stay silent before it counts as lost.
    pub idle_limit: Duration,
    pub viewport: ViewportPolicy,
    pub padding_px: u32,
    pub zero_coordinates: ZeroCoordinatePolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            config_url: DEFAULT_CONFIG_URL.to_owned(),
            transport: TransportKind::default(),
            reconnect: DEFAULT_BACKOFF,
            idle_limit: DEFAULT_IDLE_LIMIT,
            viewport: ViewportPolicy::default(),
            padding_px: DEFAULT_PADDING_PX,
            zero_coordinates: ZeroCoordinatePolicy::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            config_url: env::var("DASHBOARD_CONFIG_URL").unwrap_or(defaults.config_url),
            transport: env::parse_or("DASHBOARD_TRANSPORT", defaults.transport),
            reconnect: Duration::from_secs(env::parse_or(
                "DASHBOARD_RECONNECT_SECS",
                defaults.reconnect.as_secs(),
            )),
            idle_limit: Duration::from_secs(env::parse_or(
                "DASHBOARD_IDLE_SECS",
                defaults.idle_limit.as_secs(),
            )),
            viewport: env::parse_or("DASHBOARD_VIEWPORT", defaults.viewport),
            padding_px: env::parse_or("DASHBOARD_PADDING_PX", defaults.padding_px),
            zero_coordinates: if env::flag("DASHBOARD_KEEP_ZERO_COORDINATES") {
                ZeroCoordinatePolicy::Keep
            } else {
                ZeroCoordinatePolicy::Suppress
            },
        }
    }
}
