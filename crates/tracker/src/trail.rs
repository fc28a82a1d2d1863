use model::Coordinate;

/// Which bus positions may enter the breadcrumb trail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZeroCoordinatePolicy {
    /// Positions with a zero latitude or longitude are treated as "no fix"
    /// and never appended. This matches what existing feeds expect, at the
    /// price of dropping real positions on the equator or prime meridian.
    #[default]
    Suppress,
    /// Every finite position is appended.
    Keep,
}

impl ZeroCoordinatePolicy {
    pub fn admits(&self, position: &Coordinate) -> bool {
        if !position.is_finite() {
            return false;
        }
        match self {
            Self::Suppress => !position.has_zero_component(),
            Self::Keep => true,
        }
    }
}

/// Ordered history of bus positions for one session.
///
/// The trail only grows. Consecutive points are never identical; anything
/// else, including near duplicates and collinear points, is kept as is.
#[derive(Debug, Clone, Default)]
pub struct TrailState {
    points: Vec<Coordinate>,
    policy: ZeroCoordinatePolicy,
}

impl TrailState {
    pub fn new(policy: ZeroCoordinatePolicy) -> Self {
        Self {
            points: Vec::new(),
            policy,
        }
    }

    /// Appends `position` unless it is inadmissible or exactly repeats the
    /// last point. Returns whether the trail grew.
    pub(crate) fn push(&mut self, position: Coordinate) -> bool {
        if !self.policy.admits(&position) {
            return false;
        }
        let repeats_last = self.points.last().is_some_and(|last| {
            last.latitude == position.latitude && last.longitude == position.longitude
        });
        if repeats_last {
            return false;
        }
        self.points.push(position);
        true
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn last(&self) -> Option<&Coordinate> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn policy(&self) -> ZeroCoordinatePolicy {
        self.policy
    }
}
