use std::{error::Error, fmt};

use chrono::{DateTime, Local};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use serde_with;

pub mod bus_update;
pub mod config;
pub mod location;
pub mod polling;

pub trait ExampleData {
    fn example_data() -> Self;
}

/// A position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a coordinate only if both components are known.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        Some(Self::new(latitude?, longitude?))
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// True if either component is zero. Upstream feeds use zero as a
    /// placeholder for "no fix".
    pub fn has_zero_component(&self) -> bool {
        self.latitude == 0.0 || self.longitude == 0.0
    }

    pub fn as_pair(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// A value together with the local time it was received.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Received<T> {
    pub received_at: DateTime<Local>,
    #[serde(flatten)]
    pub content: T,
}

impl<T> Received<T> {
    pub fn now(content: T) -> Self {
        Self {
            received_at: Local::now(),
            content,
        }
    }
}

/// A payload that could not be decoded into a location event.
#[derive(Debug)]
pub struct DecodeError(serde_json::Error);

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "malformed location payload: {}", self.0)
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(why: serde_json::Error) -> Self {
        Self(why)
    }
}
