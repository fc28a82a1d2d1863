use std::sync::Arc;

use web::{config::WebConfig, mqtt::MqttPublisher, relay::Relay, start_web_server, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = WebConfig::from_env();

    // relay
    let mqtt = MqttPublisher::connect(&config.transport);
    if mqtt.is_none() {
        log::warn!("MQTT_SERVER or MQTT_TOPIC not set, updates are only pushed to the stream.");
    }
    let state = WebState {
        relay: Relay::new(mqtt),
        transport: Arc::new(config.transport.clone()),
    };

    // web server
    if let Err(why) = start_web_server(state, &config).await {
        log::error!("web server failed: {}", why);
        std::process::exit(1);
    }
}
