use model::{location::LocationEvent, Coordinate};

use crate::{
    render::MarkerId,
    trail::{TrailState, ZeroCoordinatePolicy},
    viewport::{ViewportPolicy, ViewportRequest, DEFAULT_PADDING_PX},
};

/// Banner text shown when an update carries no ETA.
pub const NO_ETA_MESSAGE: &str = "No ETA message";

/// Marker positions carried by one event. `None` leaves a marker where it is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarkerPositions {
    pub bus: Option<Coordinate>,
    pub home: Option<Coordinate>,
    pub stop: Option<Coordinate>,
    pub school: Option<Coordinate>,
}

impl MarkerPositions {
    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, Coordinate)> {
        [
            (MarkerId::Bus, self.bus),
            (MarkerId::Home, self.home),
            (MarkerId::Stop, self.stop),
            (MarkerId::School, self.school),
        ]
        .into_iter()
        .filter_map(|(marker, position)| position.map(|position| (marker, position)))
    }
}

/// Everything the renderer needs after one event.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackUpdate {
    pub markers: MarkerPositions,
    pub trail: Vec<Coordinate>,
    /// Whether this event appended to the trail.
    pub trail_extended: bool,
    pub viewport: Option<ViewportRequest>,
    pub banner: String,
}

/// Turns the stream of location events of one session into trail and
/// viewport decisions.
#[derive(Debug, Clone)]
pub struct LiveTrackState {
    trail: TrailState,
    viewport_policy: ViewportPolicy,
    padding_px: u32,
}

impl Default for LiveTrackState {
    fn default() -> Self {
        Self::new(ViewportPolicy::default(), ZeroCoordinatePolicy::default())
    }
}

impl LiveTrackState {
    pub fn new(viewport_policy: ViewportPolicy, zero_policy: ZeroCoordinatePolicy) -> Self {
        Self {
            trail: TrailState::new(zero_policy),
            viewport_policy,
            padding_px: DEFAULT_PADDING_PX,
        }
    }

    pub fn with_padding(mut self, padding_px: u32) -> Self {
        self.padding_px = padding_px;
        self
    }

    /// Applies one event. Never fails: missing data leaves markers stale,
    /// the trail unchanged or the viewport where it is.
    pub fn ingest(&mut self, event: &LocationEvent) -> TrackUpdate {
        let trail_extended = event
            .bus
            .is_some_and(|position| self.trail.push(position));

        TrackUpdate {
            markers: MarkerPositions {
                bus: event.bus,
                home: event.home,
                stop: event.stop,
                school: event.school,
            },
            trail: self.trail.points().to_vec(),
            trail_extended,
            viewport: self.viewport_policy.request(event, self.padding_px),
            banner: event.eta().unwrap_or(NO_ETA_MESSAGE).to_owned(),
        }
    }

    pub fn trail(&self) -> &TrailState {
        &self.trail
    }

    pub fn viewport_policy(&self) -> ViewportPolicy {
        self.viewport_policy
    }
}
