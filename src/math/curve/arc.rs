use super::ParametricCurve2d;
use crate::math::{Point2d, Vector2d};
use crate::util::Interval;
use std::f64::consts::TAU;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A circular arc, parameterised over `[0, 1]` by angle.
///
/// A positive `sweep` runs counter-clockwise, a negative one clockwise.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Arc2d {
    centre: Point2d,
    radius: f64,
    /// The angle at `t = 0`, in radians.
    start: f64,
    /// The signed angle swept between `t = 0` and `t = 1`, in radians.
    sweep: f64,
}

impl Arc2d {
    /// Creates an arc.
    pub const fn new(centre: Point2d, radius: f64, start: f64, sweep: f64) -> Self {
        Self {
            centre,
            radius,
            start,
            sweep,
        }
    }

    /// Creates a full counter-clockwise circle starting on the +X axis.
    pub const fn circle(centre: Point2d, radius: f64) -> Self {
        Self::new(centre, radius, 0.0, TAU)
    }

    pub fn centre(&self) -> Point2d {
        self.centre
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Gets the angle in radians at the given `t`.
    pub fn angle(&self, t: f64) -> f64 {
        Interval::new(self.start, self.start + self.sweep).lerp(t)
    }
}

impl ParametricCurve2d for Arc2d {
    fn sample(&self, t: f64) -> Point2d {
        let (sin, cos) = self.angle(t).sin_cos();
        self.centre + self.radius * Vector2d::new(cos, sin)
    }

    fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, 1.0)
    }

    fn sample_dt(&self, t: f64) -> Vector2d {
        let (sin, cos) = self.angle(t).sin_cos();
        self.radius * self.sweep * Vector2d::new(-sin, cos)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use cgmath::InnerSpace;

    #[test]
    fn circle_closes_on_itself() {
        let arc = Arc2d::circle(Point2d::new(5.0, 5.0), 10.0);
        let a = arc.sample(0.0);
        let b = arc.sample(1.0);
        assert_approx_eq!(a.x, 15.0);
        assert_approx_eq!(a.y, 5.0);
        assert_approx_eq!(b.x, a.x);
        assert_approx_eq!(b.y, a.y);
    }

    #[test]
    fn derivative_is_tangent() {
        let arc = Arc2d::new(Point2d::new(0.0, 0.0), 3.0, 0.5, -2.0);
        for i in 0..10 {
            let t = 0.1 * i as f64;
            let radial = arc.sample(t) - arc.centre();
            let tan = arc.sample_dt(t);
            assert_approx_eq!(radial.dot(tan), 0.0, 1e-9);
            assert_approx_eq!(tan.magnitude(), 6.0, 1e-9);
        }
    }
}
