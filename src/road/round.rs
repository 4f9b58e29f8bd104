use super::{sample_lane, Direction, End, PathSample, PathShape};
use crate::math::{Arc2d, ParametricCurve2d, Point2d};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A road along a circular arc, or a full circle.
///
/// The inner and outer lanes sit at `radius ± lane_width / 2`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoundRoad {
    arc: Arc2d,
    half_width: f64,
}

impl RoundRoad {
    /// Creates a full circle road. Both of its ends lie on the +X axis from the centre.
    pub fn circle(centre: Point2d, radius: f64, lane_width: f64) -> Self {
        Self {
            arc: Arc2d::circle(centre, radius),
            half_width: 0.5 * lane_width,
        }
    }

    /// Creates a road along an arc, from angle `start` to `start + sweep` in radians.
    pub fn arc(centre: Point2d, radius: f64, start: f64, sweep: f64, lane_width: f64) -> Self {
        Self {
            arc: Arc2d::new(centre, radius, start, sweep),
            half_width: 0.5 * lane_width,
        }
    }

    pub fn centre(&self) -> Point2d {
        self.arc.centre()
    }

    pub fn radius(&self) -> f64 {
        self.arc.radius()
    }

    pub fn endpoint(&self, end: End) -> Point2d {
        match end {
            End::A => self.arc.sample(0.0),
            End::B => self.arc.sample(1.0),
        }
    }

    pub fn length(&self) -> f64 {
        (self.arc.angle(1.0) - self.arc.angle(0.0)).abs() * self.arc.radius()
    }
}

impl PathShape for RoundRoad {
    type Lane = Direction;

    fn position(&self, lane: Direction, u: f64) -> PathSample {
        sample_lane(&self.arc, self.half_width, lane, u)
    }
}
