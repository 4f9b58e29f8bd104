use crate::math::{rot90, try_normalize, ParametricCurve2d, Point2d, Vector2d};
use crate::RoadId;
pub use junction::{Choices, Junction, Slot, SlotLink, Traversal};
pub use round::RoundRoad;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
pub use straight::StraightRoad;

mod junction;
mod round;
mod straight;

/// One of the two ends of a road.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum End {
    A,
    B,
}

/// The direction of travel along an ordinary road.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Lane 0, running from B to A.
    Backward,
    /// Lane 1, running from A to B.
    Forward,
}

/// The lane a vehicle occupies on the road it is travelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Lane {
    /// A lane of an ordinary road.
    Road(Direction),
    /// A path through an intersection.
    Junction(Traversal),
    /// Just entered an intersection; no exit has been chosen yet.
    Entering,
}

/// A reference to a neighbouring road and the lane to continue in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Link {
    pub road: RoadId,
    pub lane: Lane,
}

/// The result of sampling a road lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSample {
    /// The position on the ground plane.
    pub pos: Point2d,
    /// The unit vector of the direction of travel.
    pub dir: Vector2d,
}

/// A shape that maps a lane and path parameter to a position.
pub trait PathShape {
    /// The kind of lane this shape can be driven in.
    type Lane: Copy;

    /// Samples the lane at path parameter `u`, where `u = 0` is where the lane
    /// begins and `u = 1` is where it ends. Values outside `[0, 1]` extrapolate.
    fn position(&self, lane: Self::Lane, u: f64) -> PathSample;
}

/// The geometry of a road.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Shape {
    Straight(StraightRoad),
    Round(RoundRoad),
    Junction(Junction),
}

/// A drivable road segment or an intersection.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Road {
    /// The road ID.
    id: RoadId,
    /// A human readable name.
    name: String,
    /// The geometry of the road.
    shape: Shape,
    /// Speed limit in units per second.
    speed_limit: f64,
    /// The roads connected to ends A and B.
    ends: [Option<Link>; 2],
}

impl End {
    pub const BOTH: [End; 2] = [End::A, End::B];

    fn index(self) -> usize {
        match self {
            End::A => 0,
            End::B => 1,
        }
    }
}

impl Direction {
    /// Gets the direction from its numeric lane id.
    pub fn from_index(lane: u8) -> Option<Self> {
        match lane {
            0 => Some(Direction::Backward),
            1 => Some(Direction::Forward),
            _ => None,
        }
    }

    /// The numeric lane id.
    pub fn index(self) -> u8 {
        match self {
            Direction::Backward => 0,
            Direction::Forward => 1,
        }
    }

    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Backward => Direction::Forward,
            Direction::Forward => Direction::Backward,
        }
    }

    /// The end of the road that this lane arrives at.
    pub fn arrival_end(self) -> End {
        match self {
            Direction::Backward => End::A,
            Direction::Forward => End::B,
        }
    }

    /// The lane that departs from the given end.
    pub fn leaving(end: End) -> Self {
        match end {
            End::A => Direction::Forward,
            End::B => Direction::Backward,
        }
    }

    /// The lane that arrives at the given end.
    pub fn arriving(end: End) -> Self {
        Self::leaving(end).reversed()
    }
}

impl Road {
    /// Creates a new road.
    pub(crate) fn new(id: RoadId, name: &str, shape: Shape, speed_limit: f64) -> Self {
        Self {
            id,
            name: name.to_owned(),
            shape,
            speed_limit,
            ends: [None, None],
        }
    }

    /// Gets the road ID.
    pub fn id(&self) -> RoadId {
        self.id
    }

    /// Gets the name of the road.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the geometry of the road.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Gets the speed limit in units per second.
    pub fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    /// Whether this road is an intersection.
    pub fn is_intersection(&self) -> bool {
        matches!(self.shape, Shape::Junction(_))
    }

    /// Gets the intersection, if this road is one.
    pub fn as_junction(&self) -> Option<&Junction> {
        match &self.shape {
            Shape::Junction(junction) => Some(junction),
            _ => None,
        }
    }

    pub(crate) fn as_junction_mut(&mut self) -> Option<&mut Junction> {
        match &mut self.shape {
            Shape::Junction(junction) => Some(junction),
            _ => None,
        }
    }

    /// Gets the neighbour connected to the given end, if there is one.
    pub fn end(&self, end: End) -> Option<Link> {
        self.ends[end.index()]
    }

    pub(crate) fn set_end(&mut self, end: End, link: Link) {
        self.ends[end.index()] = Some(link);
    }

    /// Gets the given endpoint of the road's centre line.
    /// Both ends of an intersection are its centre.
    pub fn endpoint(&self, end: End) -> Point2d {
        match &self.shape {
            Shape::Straight(road) => road.endpoint(end),
            Shape::Round(road) => road.endpoint(end),
            Shape::Junction(junction) => junction.centre(),
        }
    }

    /// The length of the road's centre line.
    /// For an intersection, this is the length of a path straight through it.
    pub fn length(&self) -> f64 {
        match &self.shape {
            Shape::Straight(road) => road.length(),
            Shape::Round(road) => road.length(),
            Shape::Junction(junction) => junction.length(),
        }
    }

    /// Samples the given lane at path parameter `u`.
    ///
    /// Returns `None` if the kind of lane doesn't belong on this road,
    /// such as an intersection traversal on a straight road.
    pub fn position(&self, lane: Lane, u: f64) -> Option<PathSample> {
        match (&self.shape, lane) {
            (Shape::Straight(road), Lane::Road(dir)) => Some(road.position(dir, u)),
            (Shape::Round(road), Lane::Road(dir)) => Some(road.position(dir, u)),
            (Shape::Junction(junction), Lane::Junction(traversal)) => {
                Some(junction.position(traversal, u))
            }
            _ => None,
        }
    }
}

/// Gets the unit vector pointing to the right of the given direction.
pub(crate) fn right_of(dir: Vector2d) -> Vector2d {
    -rot90(dir)
}

/// Samples a lane that runs alongside a centre line curve.
///
/// The curve is traversed from `t = 0` to `t = 1` when travelling forward,
/// and in reverse otherwise. The lane sits `half_width` to the right of the
/// direction of travel.
pub(crate) fn sample_lane(
    curve: &impl ParametricCurve2d,
    half_width: f64,
    dir: Direction,
    u: f64,
) -> PathSample {
    let (t, sign) = match dir {
        Direction::Forward => (u, 1.0),
        Direction::Backward => (1.0 - u, -1.0),
    };
    let tan = try_normalize(curve.sample_dt(t)).unwrap_or_else(Vector2d::unit_x);
    let dir = sign * tan;
    PathSample {
        pos: curve.sample(t) + right_of(dir) * half_width,
        dir,
    }
}
