pub use state::{LiveTrackState, MarkerPositions, TrackUpdate, NO_ETA_MESSAGE};
pub use trail::{TrailState, ZeroCoordinatePolicy};
pub use viewport::{ViewportPolicy, ViewportRequest, DEFAULT_PADDING_PX};

pub mod render;
pub mod session;
pub mod state;
pub mod trail;
pub mod viewport;
