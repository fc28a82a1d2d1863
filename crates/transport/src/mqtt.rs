use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use model::config::TransportConfig;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};

use crate::{config::ConfigError, Transport, TransportError};

const REQUEST_CAPACITY: usize = 16;

/// Subscribes to the location topic on an MQTT broker.
///
/// Reconnecting is left to the supervisor: after an error the event loop is
/// dropped and [`Transport::connect`] builds a fresh one.
pub struct MqttTransport {
    options: MqttOptions,
    topic: String,
    connection: Option<(AsyncClient, EventLoop)>,
}

impl MqttTransport {
    pub fn new<H, T>(host: H, port: u16, topic: T) -> Self
    where
        H: Into<String>,
        T: Into<String>,
    {
        let client_id = format!("bus-tracker-{}", std::process::id());
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(Duration::from_secs(30));
        options.set_clean_session(true);
        Self {
            options,
            topic: topic.into(),
            connection: None,
        }
    }

    pub fn with_credentials(mut self, user: &str, password: &str) -> Self {
        self.options.set_credentials(user, password);
        self
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, ConfigError> {
        let host = config
            .mqtt_host
            .as_deref()
            .ok_or(ConfigError::Incomplete("mqtt_host"))?;
        let topic = config
            .mqtt_topic
            .as_deref()
            .ok_or(ConfigError::Incomplete("mqtt_topic"))?;

        let transport = Self::new(host, config.mqtt_port, topic);
        Ok(match config.mqtt_credentials() {
            Some((user, password)) => transport.with_credentials(user, password),
            None => transport,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl Transport for MqttTransport {
    fn name(&self) -> &'static str {
        "mqtt"
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        let (host, port) = self.options.broker_address();
        log::info!("Connecting to MQTT broker {host}:{port}.");
        self.connection = None;

        let (client, mut eventloop) = AsyncClient::new(self.options.clone(), REQUEST_CAPACITY);
        loop {
            if let Event::Incoming(Packet::ConnAck(_)) = eventloop.poll().await? {
                break;
            }
        }
        client.subscribe(self.topic.clone(), QoS::AtLeastOnce).await?;
        log::info!("Subscribed to '{}'.", self.topic);

        self.connection = Some((client, eventloop));
        Ok(())
    }

    async fn next_payload(&mut self) -> Result<Option<Bytes>, TransportError> {
        let (_, eventloop) = self
            .connection
            .as_mut()
            .ok_or(TransportError::NotConnected)?;
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    return Ok(Some(publish.payload));
                }
                Ok(Event::Incoming(Packet::Disconnect)) => {
                    self.connection = None;
                    return Ok(None);
                }
                Ok(_) => {}
                Err(why) => {
                    self.connection = None;
                    return Err(why.into());
                }
            }
        }
    }
}
