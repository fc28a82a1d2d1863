use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Connection details a dashboard fetches from the relay before connecting.
/// Field names match the relay's `/api/config` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransportConfig {
    pub mqtt_host: Option<String>,
    #[serde(default = "default_mqtt_port")]
    pub mqtt_port: u16,
    pub mqtt_user: Option<String>,
    pub mqtt_pass: Option<String>,
    pub mqtt_topic: Option<String>,
    /// Absolute URL of the relay's push stream.
    #[serde(default)]
    pub stream_url: Option<String>,
}

pub const DEFAULT_MQTT_PORT: u16 = 1883;

fn default_mqtt_port() -> u16 {
    DEFAULT_MQTT_PORT
}

impl TransportConfig {
    /// Username and password, but only if both are set.
    pub fn mqtt_credentials(&self) -> Option<(&str, &str)> {
        match (self.mqtt_user.as_deref(), self.mqtt_pass.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some((user, pass))
            }
            _ => None,
        }
    }
}
