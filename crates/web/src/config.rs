use model::config::{TransportConfig, DEFAULT_MQTT_PORT};
use utility::env;

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub bind: String,
    pub static_dir: String,
    /// MQTT settings; `stream_url` is filled in per request.
    pub transport: TransportConfig,
}

impl WebConfig {
    pub fn from_env() -> Self {
        Self {
            bind: env::var("WEB_BIND").unwrap_or_else(|| "0.0.0.0:5001".to_owned()),
            static_dir: env::var("WEB_STATIC_DIR").unwrap_or_else(|| "./frontend".to_owned()),
            transport: TransportConfig {
                mqtt_host: env::var("MQTT_SERVER"),
                mqtt_port: env::parse_or("MQTT_PORT", DEFAULT_MQTT_PORT),
                mqtt_user: env::var("MQTT_USER"),
                mqtt_pass: env::var("MQTT_PASS"),
                mqtt_topic: env::var("MQTT_TOPIC"),
                stream_url: None,
            },
        }
    }
}
