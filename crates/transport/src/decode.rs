use model::location::LocationEvent;

/// Decodes a payload at the transport boundary. Malformed payloads are
/// logged and dropped, they never reach the tracker.
pub fn decode_payload(payload: &[u8]) -> Option<LocationEvent> {
    match LocationEvent::decode(payload) {
        Ok(event) => {
            log::debug!("received bus update: {:?}", event);
            Some(event)
        }
        Err(why) => {
            log::warn!("dropping payload ({} bytes): {}", payload.len(), why);
            None
        }
    }
}
