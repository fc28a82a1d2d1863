use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{bus_update::BusUpdate, Coordinate, DecodeError};

/// One decoded location message. Every position is optional; a missing
/// position means "no update for that marker this tick".
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationEvent {
    pub bus: Option<Coordinate>,
    pub home: Option<Coordinate>,
    pub stop: Option<Coordinate>,
    pub school: Option<Coordinate>,
    pub eta_message: Option<String>,
    pub status_message: Option<String>,
    pub distance: Option<f64>,
}

impl LocationEvent {
    /// Decodes a raw payload in the upstream wire format.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        BusUpdate::from_slice(payload).map(Self::from)
    }

    /// An event that only moves the bus.
    pub fn bus_at(latitude: f64, longitude: f64) -> Self {
        Self {
            bus: Some(Coordinate::new(latitude, longitude)),
            ..Default::default()
        }
    }

    pub fn with_home(mut self, home: Coordinate) -> Self {
        self.home = Some(home);
        self
    }

    pub fn with_stop(mut self, stop: Coordinate) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_school(mut self, school: Coordinate) -> Self {
        self.school = Some(school);
        self
    }

    pub fn with_eta<S: Into<String>>(mut self, eta_message: S) -> Self {
        self.eta_message = Some(eta_message.into());
        self
    }

    /// The ETA message, treating an empty string like a missing one.
    pub fn eta(&self) -> Option<&str> {
        self.eta_message.as_deref().filter(|eta| !eta.is_empty())
    }
}
