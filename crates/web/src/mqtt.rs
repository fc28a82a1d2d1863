use std::{error::Error, time::Duration};

use model::{bus_update::BusUpdate, config::TransportConfig};
use rumqttc::{AsyncClient, MqttOptions, QoS};
use tokio::time::sleep;

const REQUEST_CAPACITY: usize = 16;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Forwards relayed updates to an MQTT topic as retained messages, so late
/// subscribers immediately get the latest position.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    topic: String,
}

impl MqttPublisher {
    /// Starts a publisher if `config` names a broker and a topic.
    pub fn connect(config: &TransportConfig) -> Option<Self> {
        let host = config.mqtt_host.as_deref()?;
        let topic = config.mqtt_topic.clone()?;

        let mut options = MqttOptions::new(
            format!("bus-relay-{}", std::process::id()),
            host,
            config.mqtt_port,
        );
        options.set_keep_alive(Duration::from_secs(30));
        if let Some((user, password)) = config.mqtt_credentials() {
            options.set_credentials(user, password);
        }

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        // the event loop reconnects on its own as long as it is polled
        tokio::spawn(async move {
            loop {
                if let Err(why) = eventloop.poll().await {
                    log::error!("MQTT publisher connection failed: {why}");
                    sleep(RECONNECT_DELAY).await;
                }
            }
        });

        log::info!("Forwarding updates to MQTT topic '{topic}' on {host}.");
        Some(Self { client, topic })
    }

    /// Queues `update` without waiting for the broker.
    pub fn publish(&self, update: &BusUpdate) -> Result<(), Box<dyn Error + Send + Sync>> {
        let payload = serde_json::to_vec(update)?;
        self.client
            .try_publish(self.topic.clone(), QoS::AtLeastOnce, true, payload)?;
        Ok(())
    }
}
