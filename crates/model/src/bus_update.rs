use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{location::LocationEvent, Coordinate, DecodeError, ExampleData};

/// The location payload as published by the relay. Field names are fixed by
/// the upstream feed; every field may be missing or `null`.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BusUpdate {
    pub bus_lat: Option<f64>,
    pub bus_lon: Option<f64>,
    pub home_lat: Option<f64>,
    pub home_lon: Option<f64>,
    pub stop_lat: Option<f64>,
    pub stop_lon: Option<f64>,
    pub school_lat: Option<f64>,
    pub school_lon: Option<f64>,
    /// Remaining distance as reported upstream.
    pub dist: Option<f64>,
    #[serde(rename = "stsMsg")]
    pub status_message: Option<String>,
    #[serde(rename = "etaMsg")]
    pub eta_message: Option<String>,
    #[serde(rename = "lst10Min")]
    pub last_ten_minutes: Option<serde_json::Value>,
    #[serde(rename = "childBuses")]
    pub child_buses: Option<serde_json::Value>,
}

impl BusUpdate {
    pub fn from_slice(payload: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(payload)?)
    }

    pub fn bus(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.bus_lat, self.bus_lon)
    }

    pub fn home(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.home_lat, self.home_lon)
    }

    pub fn stop(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.stop_lat, self.stop_lon)
    }

    pub fn school(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.school_lat, self.school_lon)
    }

    /// The bus has passed the stop and is far enough away that this trip is
    /// over for the rider.
    pub fn is_trip_complete(&self) -> bool {
        self.eta_message.as_deref() == Some("past stop")
            && self.dist.is_some_and(|dist| dist > 4.9)
    }
}

impl From<BusUpdate> for LocationEvent {
    fn from(update: BusUpdate) -> Self {
        Self {
            bus: update.bus(),
            home: update.home(),
            stop: update.stop(),
            school: update.school(),
            eta_message: update.eta_message,
            status_message: update.status_message,
            distance: update.dist,
        }
    }
}

impl ExampleData for BusUpdate {
    fn example_data() -> Self {
        Self {
            bus_lat: Some(40.7162),
            bus_lon: Some(-74.0021),
            home_lat: Some(40.7211),
            home_lon: Some(-73.9974),
            stop_lat: Some(40.7195),
            stop_lon: Some(-73.9990),
            school_lat: Some(40.7306),
            school_lon: Some(-73.9866),
            dist: Some(0.8),
            status_message: Some("On route".to_owned()),
            eta_message: Some("Arriving in 4 minutes".to_owned()),
            last_ten_minutes: None,
            child_buses: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_upstream_field_names() {
        let payload = br#"{
            "bus_lat": 40.71, "bus_lon": -74.0,
            "home_lat": 40.72, "home_lon": -73.99,
            "stop_lat": null, "stop_lon": -73.98,
            "etaMsg": "Bus is approaching school",
            "stsMsg": "On route",
            "dist": 1.5,
            "childBuses": [{"id": 7}],
            "unknown": true
        }"#;
        let update = BusUpdate::from_slice(payload).unwrap();
        let event = LocationEvent::from(update);

        assert_eq!(event.bus, Some(Coordinate::new(40.71, -74.0)));
        assert_eq!(event.home, Some(Coordinate::new(40.72, -73.99)));
        // half a coordinate is no coordinate
        assert_eq!(event.stop, None);
        assert_eq!(event.school, None);
        assert_eq!(event.eta_message.as_deref(), Some("Bus is approaching school"));
        assert_eq!(event.status_message.as_deref(), Some("On route"));
        assert_eq!(event.distance, Some(1.5));
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert!(BusUpdate::from_slice(b"not json").is_err());
        assert!(BusUpdate::from_slice(b"[1, 2]").is_err());
        assert!(BusUpdate::from_slice(br#"{"bus_lat": "north"}"#).is_err());
    }

    #[test]
    fn serializes_without_missing_fields() {
        let update = BusUpdate {
            bus_lat: Some(1.0),
            eta_message: Some("soon".to_owned()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "bus_lat": 1.0, "etaMsg": "soon" }));
    }

    #[test]
    fn trip_completes_only_past_stop_and_far_away() {
        let mut update = BusUpdate {
            eta_message: Some("past stop".to_owned()),
            dist: Some(5.2),
            ..Default::default()
        };
        assert!(update.is_trip_complete());

        update.dist = Some(3.0);
        assert!(!update.is_trip_complete());

        update.dist = Some(5.2);
        update.eta_message = Some("Past Stop".to_owned());
        assert!(!update.is_trip_complete());
    }
}
