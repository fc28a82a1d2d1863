use std::{collections::VecDeque, pin::Pin, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use model::config::TransportConfig;
use reqwest::header::ACCEPT;
use tokio::time::timeout;

use crate::{config::ConfigError, Transport, TransportError};

/// Event carrying a location payload.
pub const BUS_UPDATE_EVENT: &str = "bus_update";
/// Event carrying the relay's polling state.
pub const STATUS_UPDATE_EVENT: &str = "status_update";

/// The relay sends a keep-alive comment every 15 s. Three missed ones mean the
/// connection is gone.
pub const DEFAULT_IDLE_LIMIT: Duration = Duration::from_secs(45);
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental `text/event-stream` parser. Lines may be split across chunks
/// arbitrarily, but an unterminated line may not grow past `max_line` bytes.
#[derive(Debug)]
pub struct SseParser {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    max_line: usize,
}

impl Default for SseParser {
    fn default() -> Self {
        Self::with_max_line(DEFAULT_MAX_LINE_BYTES)
    }
}

impl SseParser {
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            buffer: vec![],
            event: None,
            data: vec![],
            max_line,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseMessage>, TransportError> {
        self.buffer.extend_from_slice(chunk);

        let mut messages = vec![];
        while let Some(end) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw = self.buffer.drain(..=end).collect::<Vec<_>>();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                messages.extend(self.dispatch());
                continue;
            }
            // comment, used for keep-alive
            if line.starts_with(':') {
                continue;
            }
            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_owned()),
                "data" => self.data.push(value.to_owned()),
                _ => {}
            }
        }
        if self.buffer.len() > self.max_line {
            self.buffer.clear();
            return Err(TransportError::LineTooLong {
                limit: self.max_line,
            });
        }
        Ok(messages)
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = self.data.join("\n");
        self.data.clear();
        Some(SseMessage { event, data })
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Reads location updates from the relay's event stream.
pub struct SseTransport {
    client: reqwest::Client,
    url: String,
    stream: Option<ByteStream>,
    parser: SseParser,
    pending: VecDeque<SseMessage>,
    idle_limit: Duration,
}

impl SseTransport {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            stream: None,
            parser: SseParser::default(),
            pending: VecDeque::new(),
            idle_limit: DEFAULT_IDLE_LIMIT,
        }
    }

    pub fn with_idle_limit(mut self, idle_limit: Duration) -> Self {
        self.idle_limit = idle_limit;
        self
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, ConfigError> {
        config
            .stream_url
            .as_deref()
            .map(Self::new)
            .ok_or(ConfigError::Incomplete("stream_url"))
    }

    fn take_payload(&mut self) -> Option<Bytes> {
        while let Some(message) = self.pending.pop_front() {
            match message.event.as_deref() {
                None | Some("message") | Some(BUS_UPDATE_EVENT) => {
                    return Some(Bytes::from(message.data));
                }
                Some(STATUS_UPDATE_EVENT) => log::info!("relay status: {}", message.data),
                Some(other) => log::debug!("ignoring `{other}` event"),
            }
        }
        None
    }
}

#[async_trait]
impl Transport for SseTransport {
    fn name(&self) -> &'static str {
        "sse"
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        log::info!("Connecting to event stream '{}'.", self.url);
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let status_code = response.status();
        if !status_code.is_success() {
            return Err(TransportError::InvalidResponse {
                status_code,
                url: self.url.clone(),
            });
        }

        self.stream = Some(Box::pin(response.bytes_stream()));
        self.parser = SseParser::with_max_line(self.parser.max_line);
        self.pending.clear();
        Ok(())
    }

    async fn next_payload(&mut self) -> Result<Option<Bytes>, TransportError> {
        loop {
            if let Some(payload) = self.take_payload() {
                return Ok(Some(payload));
            }
            let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
            match timeout(self.idle_limit, stream.next()).await {
                Ok(Some(Ok(chunk))) => match self.parser.push(&chunk) {
                    Ok(messages) => self.pending.extend(messages),
                    Err(why) => {
                        self.stream = None;
                        return Err(why);
                    }
                },
                Ok(Some(Err(why))) => {
                    self.stream = None;
                    return Err(why.into());
                }
                Ok(None) => {
                    self.stream = None;
                    return Ok(None);
                }
                Err(_) => {
                    self.stream = None;
                    return Err(TransportError::IdleTimeout(self.idle_limit));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use axum::{
        body::Body,
        http::{header, StatusCode},
        response::IntoResponse,
        routing::get,
        Router,
    };
    use futures::stream;

    use super::*;
    use crate::testing::serve;

    fn event_stream<S>(chunks: S) -> impl IntoResponse
    where
        S: Stream<Item = Result<&'static str, Infallible>> + Send + 'static,
    {
        (
            [(header::CONTENT_TYPE, "text/event-stream")],
            Body::from_stream(chunks),
        )
    }

    #[test]
    fn parses_named_events() {
        let mut parser = SseParser::default();
        let messages = parser
            .push(b"event: status_update\ndata: {\"polling_active\":true}\n\n: keep-alive\n\nevent: bus_update\ndata: {\"bus_lat\":1}\n\n")
            .unwrap();
        assert_eq!(
            messages,
            vec![
                SseMessage {
                    event: Some("status_update".to_owned()),
                    data: "{\"polling_active\":true}".to_owned(),
                },
                SseMessage {
                    event: Some("bus_update".to_owned()),
                    data: "{\"bus_lat\":1}".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn reassembles_split_lines() {
        let mut parser = SseParser::default();
        assert!(parser.push(b"event: bus_upd").unwrap().is_empty());
        assert!(parser.push(b"ate\r\ndata: {\"bus_").unwrap().is_empty());
        assert!(parser.push(b"lat\":1}\r\n").unwrap().is_empty());
        let messages = parser.push(b"\r\n").unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].event.as_deref(), Some("bus_update"));
        assert_eq!(messages[0].data, "{\"bus_lat\":1}");
    }

    #[test]
    fn joins_multi_line_data() {
        let mut parser = SseParser::default();
        let messages = parser.push(b"data: a\ndata: b\n\n").unwrap();
        assert_eq!(messages[0].data, "a\nb");
        assert_eq!(messages[0].event, None);
    }

    #[test]
    fn unterminated_line_is_capped() {
        let mut parser = SseParser::with_max_line(16);
        assert!(parser.push(b"data: 0123456789").unwrap().is_empty());
        assert!(matches!(
            parser.push(b"abcdef"),
            Err(TransportError::LineTooLong { limit: 16 })
        ));

        // the parser starts over after the overflow
        let messages = parser.push(b"data: ok\n\n").unwrap();
        assert_eq!(messages[0].data, "ok");
    }

    #[tokio::test]
    async fn yields_only_bus_updates() {
        let router = Router::new().route(
            "/stream",
            get(|| async {
                event_stream(stream::iter([
                    Ok("event: status_update\ndata: {\"polling_active\":true}\n\n"),
                    Ok("event: bus_update\ndata: {\"bus_lat\":40.7,"),
                    Ok("\"bus_lon\":-74.0}\n\n"),
                ]))
            }),
        );
        let url = serve(router).await;

        let mut transport = SseTransport::new(format!("{url}/stream"));
        transport.connect().await.unwrap();
        let payload = transport.next_payload().await.unwrap().unwrap();
        assert_eq!(&payload[..], b"{\"bus_lat\":40.7,\"bus_lon\":-74.0}");
        assert_eq!(transport.next_payload().await.unwrap(), None);
        assert!(matches!(
            transport.next_payload().await,
            Err(TransportError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn silent_stream_times_out() {
        let router = Router::new().route(
            "/stream",
            get(|| async {
                let status = "event: status_update\ndata: {\"polling_active\":true}\n\n";
                event_stream(stream::iter([Ok(status)]).chain(stream::pending()))
            }),
        );
        let url = serve(router).await;

        let mut transport =
            SseTransport::new(format!("{url}/stream")).with_idle_limit(Duration::from_millis(200));
        transport.connect().await.unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), transport.next_payload())
            .await
            .expect("silent stream was never given up");
        assert!(matches!(result, Err(TransportError::IdleTimeout(_))));
        assert!(matches!(
            transport.next_payload().await,
            Err(TransportError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn rejects_error_status() {
        let router = Router::new().route(
            "/stream",
            get(|| async { (StatusCode::NOT_FOUND, "nope") }),
        );
        let url = serve(router).await;

        let mut transport = SseTransport::new(format!("{url}/stream"));
        assert!(matches!(
            transport.connect().await,
            Err(TransportError::InvalidResponse { .. })
        ));
    }
}
