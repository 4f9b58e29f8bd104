use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use cgmath::{Matrix4, Vector4};

/// Squared magnitudes below this are treated as a zero vector.
const DEGENERATE_MAGNITUDE2: f64 = 1e-12;

/// Rotates a vector 90 degrees counter-clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Normalises `v`, or returns `None` if it is too short to have a direction.
pub fn try_normalize(v: Vector2d) -> Option<Vector2d> {
    if v.magnitude2() < DEGENERATE_MAGNITUDE2 {
        None
    } else {
        Some(v.normalize())
    }
}

/// Builds a world transform for an object standing on the ground plane.
///
/// The object's local +X axis is aligned with `dir`, +Y points up and
/// the origin is placed at `pos`, raised by `height`.
///
/// # Parameters
/// * `pos` - The ground plane position, where `pos.y` is the world z coordinate
/// * `dir` - A unit vector giving the heading on the ground plane
/// * `height` - The world y coordinate
pub fn ground_transform(pos: Point2d, dir: Vector2d, height: f64) -> Matrix4<f64> {
    Matrix4::from_cols(
        Vector4::new(dir.x, 0.0, dir.y, 0.0),
        Vector4::new(0.0, 1.0, 0.0, 0.0),
        Vector4::new(-dir.y, 0.0, dir.x, 0.0),
        Vector4::new(pos.x, height, pos.y, 1.0),
    )
}
