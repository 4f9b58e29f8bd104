use super::{sample_lane, Direction, End, PathSample, PathShape};
use crate::math::{LineSegment2d, Point2d};
use cgmath::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A straight road between two points.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StraightRoad {
    line: LineSegment2d,
    half_width: f64,
}

impl StraightRoad {
    /// Creates a straight road from A to B whose lanes are `lane_width` wide.
    pub fn new(a: Point2d, b: Point2d, lane_width: f64) -> Self {
        Self {
            line: LineSegment2d::from_ends(a, b),
            half_width: 0.5 * lane_width,
        }
    }

    pub fn endpoint(&self, end: End) -> Point2d {
        match end {
            End::A => self.line.start(),
            End::B => self.line.end(),
        }
    }

    pub fn length(&self) -> f64 {
        (self.line.end() - self.line.start()).magnitude()
    }
}

impl PathShape for StraightRoad {
    type Lane = Direction;

    fn position(&self, lane: Direction, u: f64) -> PathSample {
        sample_lane(&self.line, self.half_width, lane, u)
    }
}
