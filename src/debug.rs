use crate::math::Point2d;
#[cfg(feature = "debug")]
use serde_json::{json, Value};

#[cfg(feature = "debug")]
thread_local!(
    /// Shapes recorded since the last call to [take_debug_frame].
    static DEBUG_FRAME: std::cell::RefCell<Vec<Value>> = Default::default();
);

/// Appends a shape to the current frame. The shape is only built when
/// debugging is enabled.
#[cfg(feature = "debug")]
fn record(shape: impl FnOnce() -> Value) {
    DEBUG_FRAME.with(|frame| frame.borrow_mut().push(shape()));
}

/// Records the chord of a path a vehicle has chosen through an intersection,
/// from where it enters to where it leaves.
#[allow(unused)]
pub fn debug_line(name: &str, from: Point2d, to: Point2d) {
    #[cfg(feature = "debug")]
    record(|| json!({ "type": "line", "name": name, "p1": [from.x, from.y], "p2": [to.x, to.y] }));
}

/// Records a point of interest, such as where a vehicle had to recover.
#[allow(unused)]
pub fn debug_point(name: &str, point: Point2d) {
    #[cfg(feature = "debug")]
    record(|| json!({ "type": "point", "name": name, "p": [point.x, point.y] }));
}

/// Takes everything recorded during the frame as a JSON array,
/// leaving the next frame empty.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> Value {
    Value::Array(DEBUG_FRAME.with(|frame| frame.take()))
}
