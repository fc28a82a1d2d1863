use std::str::FromStr;

use model::{location::LocationEvent, Coordinate};
use utility::geo::BoundingBox;

pub const DEFAULT_PADDING_PX: u32 = 50;

/// How the viewport follows the commute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewportPolicy {
    /// Fit whatever of bus, home and stop is known (at least two points).
    #[default]
    Corridor,
    /// Only move the viewport when both bus and home are known.
    RequireAnchors,
}

impl FromStr for ViewportPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "corridor" => Ok(Self::Corridor),
            "require-anchors" | "require_anchors" => Ok(Self::RequireAnchors),
            other => Err(format!("unknown viewport policy `{other}`")),
        }
    }
}

/// Points the renderer has to keep visible, with their bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportRequest {
    pub points: Vec<Coordinate>,
    pub bounds: BoundingBox,
    pub padding_px: u32,
    pub includes_school: bool,
}

impl ViewportRequest {
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.bounds.contains(coordinate.latitude, coordinate.longitude)
    }
}

/// The school only comes into view once the bus is about to arrive there.
pub fn is_approaching(eta_message: Option<&str>) -> bool {
    eta_message.is_some_and(|eta| eta.to_lowercase().contains("approaching"))
}

impl ViewportPolicy {
    pub(crate) fn request(
        &self,
        event: &LocationEvent,
        padding_px: u32,
    ) -> Option<ViewportRequest> {
        if *self == Self::RequireAnchors && (event.bus.is_none() || event.home.is_none())
        {
            return None;
        }

        let mut points = [event.bus, event.home, event.stop]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        let includes_school = match event.school {
            Some(school) if is_approaching(event.eta_message.as_deref()) => {
                points.push(school);
                true
            }
            _ => false,
        };
        if points.len() < 2 {
            return None;
        }

        let bounds = BoundingBox::from_points(points.iter().map(Coordinate::as_pair))?;
        Some(ViewportRequest {
            points,
            bounds,
            padding_px,
            includes_school,
        })
    }
}
