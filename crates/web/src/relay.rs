use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::response::sse::Event;
use model::{bus_update::BusUpdate, polling::PollingStatus, Received};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use crate::mqtt::MqttPublisher;

const BROADCAST_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum RelayEvent {
    BusUpdate(Received<BusUpdate>),
    StatusUpdate(PollingStatus),
}

impl RelayEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BusUpdate(_) => "bus_update",
            Self::StatusUpdate(_) => "status_update",
        }
    }

    pub fn to_sse(&self) -> Option<Event> {
        let event = Event::default().event(self.name());
        let result = match self {
            Self::BusUpdate(update) => event.json_data(update),
            Self::StatusUpdate(status) => event.json_data(status),
        };
        result
            .map_err(|why| log::error!("could not encode {}: {}", self.name(), why))
            .ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub relayed: bool,
    pub polling_active: bool,
}

/// Hub between the publisher and connected dashboards. Holds the latest
/// update and the polling flag.
#[derive(Clone)]
pub struct Relay {
    inner: Arc<RelayInner>,
}

struct RelayInner {
    sender: broadcast::Sender<RelayEvent>,
    latest: RwLock<Option<Received<BusUpdate>>>,
    polling: AtomicBool,
    mqtt: Option<MqttPublisher>,
}

impl Relay {
    pub fn new(mqtt: Option<MqttPublisher>) -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            inner: Arc::new(RelayInner {
                sender,
                latest: RwLock::new(None),
                polling: AtomicBool::new(true),
                mqtt,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RelayEvent> {
        self.inner.sender.subscribe()
    }

    pub fn polling_status(&self) -> PollingStatus {
        PollingStatus::new(self.inner.polling.load(Ordering::SeqCst))
    }

    pub fn set_polling(&self, active: bool) -> PollingStatus {
        self.inner.polling.store(active, Ordering::SeqCst);
        self.announce(PollingStatus::new(active))
    }

    pub fn toggle_polling(&self) -> PollingStatus {
        let was_active = self.inner.polling.fetch_xor(true, Ordering::SeqCst);
        self.announce(PollingStatus::new(!was_active))
    }

    fn announce(&self, status: PollingStatus) -> PollingStatus {
        log::info!("{}", status.label());
        // no subscribers is fine
        let _ = self.inner.sender.send(RelayEvent::StatusUpdate(status));
        status
    }

    pub async fn latest(&self) -> Option<Received<BusUpdate>> {
        self.inner.latest.read().await.clone()
    }

    /// Stores and forwards `update` unless polling is paused. Publishes are
    /// serialized on the `latest` lock, so `latest` always equals the last
    /// broadcast update.
    pub async fn publish(&self, update: BusUpdate) -> PublishOutcome {
        let mut latest = self.inner.latest.write().await;
        if !self.inner.polling.load(Ordering::SeqCst) {
            log::info!("Polling paused, update not relayed.");
            return PublishOutcome {
                relayed: false,
                polling_active: false,
            };
        }

        let trip_complete = update.is_trip_complete();
        if let Some(mqtt) = &self.inner.mqtt {
            if let Err(why) = mqtt.publish(&update) {
                log::error!("could not forward update to MQTT: {why}");
            }
        }

        let received = Received::now(update);
        *latest = Some(received.clone());
        let receivers = self
            .inner
            .sender
            .send(RelayEvent::BusUpdate(received))
            .unwrap_or(0);
        log::info!("Pushed update to {receivers} dashboard(s).");

        if trip_complete {
            log::info!("Bus is past stop, pausing polling.");
            self.set_polling(false);
        }

        PublishOutcome {
            relayed: true,
            polling_active: self.polling_status().polling_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(latitude: f64) -> BusUpdate {
        BusUpdate {
            bus_lat: Some(latitude),
            bus_lon: Some(-74.0),
            eta_message: Some("Arriving in 5 minutes".to_owned()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn publish_reaches_subscribers_and_latest() {
        let relay = Relay::new(None);
        let mut receiver = relay.subscribe();

        let outcome = relay.publish(update(40.71)).await;
        assert!(outcome.relayed);

        match receiver.recv().await.unwrap() {
            RelayEvent::BusUpdate(received) => assert_eq!(received.content, update(40.71)),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(relay.latest().await.unwrap().content, update(40.71));
    }

    #[tokio::test]
    async fn paused_relay_drops_updates() {
        let relay = Relay::new(None);
        assert_eq!(relay.toggle_polling(), PollingStatus::new(false));

        let outcome = relay.publish(update(40.71)).await;
        assert_eq!(
            outcome,
            PublishOutcome {
                relayed: false,
                polling_active: false
            }
        );
        assert!(relay.latest().await.is_none());

        assert_eq!(relay.toggle_polling(), PollingStatus::new(true));
        assert!(relay.publish(update(40.72)).await.relayed);
    }

    #[tokio::test]
    async fn toggling_is_broadcast() {
        let relay = Relay::new(None);
        let mut receiver = relay.subscribe();
        relay.toggle_polling();

        match receiver.recv().await.unwrap() {
            RelayEvent::StatusUpdate(status) => assert!(!status.polling_active),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn trip_completion_pauses_polling() {
        let relay = Relay::new(None);
        let done = BusUpdate {
            eta_message: Some("past stop".to_owned()),
            dist: Some(5.0),
            ..update(40.75)
        };

        let outcome = relay.publish(done).await;
        assert!(outcome.relayed);
        assert!(!outcome.polling_active);
        assert!(!relay.polling_status().polling_active);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_publishes_keep_latest_in_step() {
        let relay = Relay::new(None);
        let mut receiver = relay.subscribe();

        let tasks = (0..20)
            .map(|i| {
                let relay = relay.clone();
                tokio::spawn(async move { relay.publish(update(40.0 + i as f64 * 0.01)).await })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            assert!(task.await.unwrap().relayed);
        }

        let mut last = None;
        for _ in 0..20 {
            match receiver.recv().await.unwrap() {
                RelayEvent::BusUpdate(received) => last = Some(received.content),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(relay.latest().await.map(|received| received.content), last);
    }

    #[test]
    fn events_encode_for_sse() {
        let status = RelayEvent::StatusUpdate(PollingStatus::new(true));
        assert_eq!(status.name(), "status_update");
        assert!(status.to_sse().is_some());
        assert!(RelayEvent::BusUpdate(Received::now(update(1.0))).to_sse().is_some());
    }
}
