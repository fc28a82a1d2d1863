use std::time::Duration;

use model::location::LocationEvent;
use tokio::{sync::mpsc, time::sleep};

use crate::{
    connection::{ConnectionSignal, ConnectionState},
    decode::decode_payload,
    Transport,
};

pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Status(ConnectionState),
    Location(LocationEvent),
}

/// Keeps `transport` connected and forwards decoded location events in
/// delivery order. After a drop or failure it waits `backoff` and connects
/// again. Returns once `events` has no receiver left.
pub async fn supervise(
    mut transport: Box<dyn Transport>,
    backoff: Duration,
    events: mpsc::Sender<TransportEvent>,
) {
    let mut state = ConnectionState::Connecting;
    loop {
        log::info!("{} transport {}", transport.name(), state);
        if events.send(TransportEvent::Status(state.clone())).await.is_err() {
            return;
        }

        let signal = match &state {
            ConnectionState::Connecting => match transport.connect().await {
                Ok(()) => ConnectionSignal::Established,
                Err(why) => {
                    log::error!("{} transport failed to connect: {}", transport.name(), why);
                    ConnectionSignal::Failed(why.to_string())
                }
            },
            ConnectionState::Connected => match receive(transport.as_mut(), &events).await {
                Some(signal) => signal,
                None => return,
            },
            ConnectionState::Disconnected | ConnectionState::Error(_) => {
                sleep(backoff).await;
                ConnectionSignal::Retry
            }
        };
        state = state.next(signal);
    }
}

/// Forwards payloads until the channel breaks. `None` if nobody listens
/// anymore.
async fn receive(
    transport: &mut dyn Transport,
    events: &mpsc::Sender<TransportEvent>,
) -> Option<ConnectionSignal> {
    loop {
        match transport.next_payload().await {
            Ok(Some(payload)) => {
                let Some(event) = decode_payload(&payload) else {
                    continue;
                };
                if events.send(TransportEvent::Location(event)).await.is_err() {
                    return None;
                }
            }
            Ok(None) => return Some(ConnectionSignal::Lost),
            Err(why) => {
                log::error!("{} transport failed: {}", transport.name(), why);
                return Some(ConnectionSignal::Failed(why.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::TransportError;

    /// Plays back a fixed script, then hangs like an idle connection.
    struct Scripted {
        connects: VecDeque<Result<(), TransportError>>,
        payloads: VecDeque<Result<Option<Bytes>, TransportError>>,
    }

    #[async_trait]
    impl Transport for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn connect(&mut self) -> Result<(), TransportError> {
            match self.connects.pop_front() {
                Some(result) => result,
                None => std::future::pending().await,
            }
        }

        async fn next_payload(&mut self) -> Result<Option<Bytes>, TransportError> {
            match self.payloads.pop_front() {
                Some(result) => result,
                None => std::future::pending().await,
            }
        }
    }

    fn payload(json: &'static str) -> Result<Option<Bytes>, TransportError> {
        Ok(Some(Bytes::from_static(json.as_bytes())))
    }

    async fn collect(transport: Scripted, count: usize) -> Vec<TransportEvent> {
        let (tx, mut rx) = mpsc::channel(8);
        tokio::spawn(supervise(Box::new(transport), Duration::from_millis(1), tx));

        let mut events = vec![];
        while events.len() < count {
            events.push(rx.recv().await.unwrap());
        }
        events
    }

    #[tokio::test]
    async fn reconnects_after_drop_and_skips_garbage() {
        let transport = Scripted {
            connects: VecDeque::from([Ok(()), Ok(())]),
            payloads: VecDeque::from([
                payload(r#"{"bus_lat": 40.71, "bus_lon": -74.0}"#),
                payload("garbage"),
                Ok(None),
                payload(r#"{"bus_lat": 40.72, "bus_lon": -74.01}"#),
            ]),
        };

        let events = collect(transport, 7).await;
        assert_eq!(
            events,
            vec![
                TransportEvent::Status(ConnectionState::Connecting),
                TransportEvent::Status(ConnectionState::Connected),
                TransportEvent::Location(LocationEvent::bus_at(40.71, -74.0)),
                TransportEvent::Status(ConnectionState::Disconnected),
                TransportEvent::Status(ConnectionState::Connecting),
                TransportEvent::Status(ConnectionState::Connected),
                TransportEvent::Location(LocationEvent::bus_at(40.72, -74.01)),
            ]
        );
    }

    #[tokio::test]
    async fn failed_connect_is_retried() {
        let transport = Scripted {
            connects: VecDeque::from([Err(TransportError::Mqtt("refused".to_owned())), Ok(())]),
            payloads: VecDeque::new(),
        };

        let events = collect(transport, 4).await;
        assert_eq!(
            events,
            vec![
                TransportEvent::Status(ConnectionState::Connecting),
                TransportEvent::Status(ConnectionState::Error(
                    "MQTT error: refused".to_owned()
                )),
                TransportEvent::Status(ConnectionState::Connecting),
                TransportEvent::Status(ConnectionState::Connected),
            ]
        );
    }

    #[tokio::test]
    async fn stops_when_nobody_listens() {
        let transport = Scripted {
            connects: VecDeque::from([Ok(())]),
            payloads: VecDeque::from([payload(r#"{"bus_lat": 1.0, "bus_lon": 1.0}"#)]),
        };
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        tokio::time::timeout(
            Duration::from_secs(1),
            supervise(Box::new(transport), Duration::from_millis(1), tx),
        )
        .await
        .unwrap();
    }
}
