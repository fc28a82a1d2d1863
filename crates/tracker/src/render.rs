use std::fmt;

use model::Coordinate;
use utility::geo::BoundingBox;

use crate::state::TrackUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerId {
    Bus,
    Home,
    Stop,
    School,
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Bus => "Bus",
            Self::Home => "Home",
            Self::Stop => "Bus Stop",
            Self::School => "School",
        };
        f.write_str(name)
    }
}

/// The map surface. Calls are fire-and-forget.
pub trait Renderer: Send {
    fn set_marker_position(&mut self, marker: MarkerId, position: Coordinate);
    fn set_trail(&mut self, points: &[Coordinate]);
    fn fit_viewport(&mut self, bounds: &BoundingBox, padding_px: u32);
    fn set_banner_text(&mut self, text: &str);
}

impl TrackUpdate {
    /// Pushes this update to `renderer`. Absent markers are not touched, the
    /// trail is only redrawn when it grew.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        renderer.set_banner_text(&self.banner);
        for (marker, position) in self.markers.iter() {
            renderer.set_marker_position(marker, position);
        }
        if self.trail_extended {
            renderer.set_trail(&self.trail);
        }
        if let Some(viewport) = &self.viewport {
            renderer.fit_viewport(&viewport.bounds, viewport.padding_px);
        }
    }
}

/// Renders to the log; the terminal is the map.
#[derive(Debug, Default)]
pub struct LogRenderer {
    banner: String,
}

impl Renderer for LogRenderer {
    fn set_marker_position(&mut self, marker: MarkerId, position: Coordinate) {
        log::debug!("{marker} marker at {position}");
    }

    fn set_trail(&mut self, points: &[Coordinate]) {
        match points.last() {
            Some(last) => log::info!("trail: {} points, latest {last}", points.len()),
            None => log::info!("trail: empty"),
        }
    }

    fn fit_viewport(&mut self, bounds: &BoundingBox, padding_px: u32) {
        let (latitude, longitude) = bounds.center();
        log::debug!(
            "viewport: ({:.5}, {:.5}) .. ({:.5}, {:.5}), center ({latitude:.5}, {longitude:.5}), padding {padding_px}px",
            bounds.min_latitude,
            bounds.min_longitude,
            bounds.max_latitude,
            bounds.max_longitude,
        );
    }

    fn set_banner_text(&mut self, text: &str) {
        // only changes are logged
        if self.banner != text {
            log::info!("{text}");
            self.banner = text.to_owned();
        }
    }
}

#[cfg(test)]
mod tests {
    use model::location::LocationEvent;

    use super::*;
    use crate::LiveTrackState;

    #[derive(Debug, Default)]
    struct Calls(Vec<String>);

    impl Renderer for Calls {
        fn set_marker_position(&mut self, marker: MarkerId, _: Coordinate) {
            self.0.push(format!("marker {marker}"));
        }

        fn set_trail(&mut self, points: &[Coordinate]) {
            self.0.push(format!("trail {}", points.len()));
        }

        fn fit_viewport(&mut self, _: &BoundingBox, padding_px: u32) {
            self.0.push(format!("fit {padding_px}"));
        }

        fn set_banner_text(&mut self, text: &str) {
            self.0.push(format!("banner {text}"));
        }
    }

    #[test]
    fn repeated_position_does_not_redraw_trail() {
        let mut state = LiveTrackState::default();
        let event = LocationEvent::bus_at(40.71, -74.00)
            .with_home(Coordinate::new(40.72, -73.99))
            .with_eta("5 min");

        let mut calls = Calls::default();
        state.ingest(&event).render(&mut calls);
        state.ingest(&event).render(&mut calls);

        assert_eq!(
            calls.0,
            vec![
                "banner 5 min",
                "marker Bus",
                "marker Home",
                "trail 1",
                "fit 50",
                "banner 5 min",
                "marker Bus",
                "marker Home",
                "fit 50",
            ]
        );
    }
}
