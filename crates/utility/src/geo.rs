use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Axis aligned box in degrees, given by its south west and north east corners.
///
/// Boxes never wrap around the antimeridian; a box spanning it simply becomes
/// very wide, which is what the map surface expects for a local commute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub min_longitude: f64,
    pub max_latitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// A degenerate box covering exactly one point.
    pub fn around(latitude: f64, longitude: f64) -> Self {
        Self {
            min_latitude: latitude,
            min_longitude: longitude,
            max_latitude: latitude,
            max_longitude: longitude,
        }
    }

    /// The minimal box containing every given `(latitude, longitude)` pair, or
    /// `None` if the iterator is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut points = points.into_iter();
        let (latitude, longitude) = points.next()?;
        let mut bounds = Self::around(latitude, longitude);
        for (latitude, longitude) in points {
            bounds.extend(latitude, longitude);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, latitude: f64, longitude: f64) {
        self.min_latitude = self.min_latitude.min(latitude);
        self.min_longitude = self.min_longitude.min(longitude);
        self.max_latitude = self.max_latitude.max(latitude);
        self.max_longitude = self.max_longitude.max(longitude);
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_latitude + self.max_latitude) / 2.0,
            (self.min_longitude + self.max_longitude) / 2.0,
        )
    }
}
