use super::{right_of, Direction, End, PathSample, PathShape};
use crate::math::{try_normalize, Arc2d, LineSegment2d, ParametricCurve2d, Point2d, Vector2d};
use crate::util::rotated_range;
use crate::RoadId;
use arrayvec::ArrayVec;
use cgmath::prelude::*;
use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// The largest angle a turn through an intersection may sweep, in radians.
/// Larger sweeps are wrapped around so the vehicle turns the short way.
const MAX_TURN_SWEEP: f64 = 95.0 * std::f64::consts::PI / 180.0;

/// Chord components shorter than this do not count as a turn.
const TURN_EPSILON: f64 = 1e-6;

/// One of the four connection points of an intersection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Slot {
    /// Towards +X.
    East,
    /// Towards +Z.
    North,
    /// Towards -X.
    West,
    /// Towards -Z.
    South,
}

/// The road connected to an intersection slot, and which of its ends touches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotLink {
    pub road: RoadId,
    pub end: End,
}

/// A path through an intersection, entering at one slot and leaving at another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Traversal {
    pub incoming: Slot,
    pub outgoing: Slot,
}

/// The exits available to a vehicle entering an intersection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choices {
    /// The slot the vehicle entered through.
    pub incoming: Slot,
    /// The slots the vehicle may leave through. Never empty.
    pub exits: ArrayVec<Slot, 4>,
}

/// A four way intersection.
///
/// Roads connect to the slots at one lane width from the centre,
/// so the roads' endpoints lie on the edges of the intersection.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Junction {
    centre: Point2d,
    lane_width: f64,
    slots: [Option<SlotLink>; 4],
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::East, Slot::North, Slot::West, Slot::South];

    pub fn index(self) -> usize {
        match self {
            Slot::East => 0,
            Slot::North => 1,
            Slot::West => 2,
            Slot::South => 3,
        }
    }

    /// Gets a slot from its index, modulo 4.
    pub fn from_index(idx: usize) -> Self {
        Self::ALL[idx % 4]
    }

    /// Gets the slot `offset` quarter turns counter-clockwise from this one.
    pub fn offset(self, offset: usize) -> Self {
        Self::from_index(self.index() + offset)
    }

    /// The unit vector pointing out of the intersection through this slot.
    pub fn outward(self) -> Vector2d {
        match self {
            Slot::East => Vector2d::new(1.0, 0.0),
            Slot::North => Vector2d::new(0.0, 1.0),
            Slot::West => Vector2d::new(-1.0, 0.0),
            Slot::South => Vector2d::new(0.0, -1.0),
        }
    }
}

impl Traversal {
    /// Packs the traversal as `(outgoing << 2) | incoming`.
    pub fn packed(self) -> u8 {
        ((self.outgoing.index() as u8) << 2) | self.incoming.index() as u8
    }

    /// Unpacks a value created by [Traversal::packed].
    pub fn from_packed(lane: u8) -> Self {
        Self {
            incoming: Slot::from_index((lane & 3) as usize),
            outgoing: Slot::from_index(((lane >> 2) & 3) as usize),
        }
    }
}

impl Junction {
    /// Creates an intersection with no connections.
    pub fn new(centre: Point2d, lane_width: f64) -> Self {
        Self {
            centre,
            lane_width,
            slots: [None; 4],
        }
    }

    pub fn centre(&self) -> Point2d {
        self.centre
    }

    /// The length of a path straight through the intersection.
    pub fn length(&self) -> f64 {
        2.0 * self.lane_width
    }

    /// Gets the road connected to the given slot.
    pub fn slot(&self, slot: Slot) -> Option<SlotLink> {
        self.slots[slot.index()]
    }

    /// Iterates over the occupied slots.
    pub fn connections(&self) -> impl Iterator<Item = (Slot, SlotLink)> + '_ {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.slot(slot).map(|link| (slot, link)))
    }

    /// The point where a road must end to connect to the given slot.
    pub fn slot_point(&self, slot: Slot) -> Point2d {
        self.centre + slot.outward() * self.lane_width
    }

    pub(crate) fn connect(&mut self, slot: Slot, link: SlotLink) {
        self.slots[slot.index()] = Some(link);
    }

    /// Lists the exits available to a vehicle arriving through the road end `from`.
    ///
    /// Slots connected to `from.road` are never offered as exits, including the
    /// other end of a road that loops back to this intersection, unless the
    /// intersection is a dead end, in which case the vehicle turns around.
    /// If `preferred_turn` (a number of quarter turns from the incoming slot)
    /// is nonzero and leads to an exit, it is the only exit offered.
    ///
    /// Returns `None` if `from` isn't connected to the intersection.
    pub fn pick_direction(&self, from: SlotLink, preferred_turn: usize) -> Option<Choices> {
        let (incoming, _) = self.connections().find(|(_, link)| *link == from)?;

        let mut exits = rotated_range(4, incoming.index() + 1)
            .map(Slot::from_index)
            .filter(|slot| matches!(self.slot(*slot), Some(link) if link.road != from.road))
            .collect::<ArrayVec<_, 4>>();

        if preferred_turn % 4 != 0 {
            let preferred = incoming.offset(preferred_turn);
            if exits.contains(&preferred) {
                exits.clear();
                exits.push(preferred);
            }
        }

        if exits.is_empty() {
            exits.push(incoming);
        }

        Some(Choices { incoming, exits })
    }

    /// Picks the first occupied slot. Used to recover when a vehicle
    /// is heading for a slot with nothing connected to it.
    pub fn pick_something(&self) -> Option<(Slot, SlotLink)> {
        let picked = self.connections().next();
        match picked {
            Some((slot, link)) => {
                warn!("Recovering at intersection {:?}: leaving via {:?} to {:?}", self.centre, slot, link.road)
            }
            None => warn!("Intersection at {:?} has no connections", self.centre),
        }
        picked
    }

    /// The lane that a vehicle leaving through the given slot continues in.
    pub fn exit_lane(&self, slot: Slot) -> Option<(RoadId, Direction)> {
        self.slot(slot)
            .map(|link| (link.road, Direction::leaving(link.end)))
    }

    /// The position and direction of a vehicle entering through a slot.
    fn entry(&self, slot: Slot) -> (Point2d, Vector2d) {
        let dir = -slot.outward();
        (self.slot_point(slot) + right_of(dir) * 0.5 * self.lane_width, dir)
    }

    /// The position and direction of a vehicle leaving through a slot.
    fn exit(&self, slot: Slot) -> (Point2d, Vector2d) {
        let dir = slot.outward();
        (self.slot_point(slot) + right_of(dir) * 0.5 * self.lane_width, dir)
    }
}

impl PathShape for Junction {
    type Lane = Traversal;

    fn position(&self, lane: Traversal, u: f64) -> PathSample {
        let (p0, d0) = self.entry(lane.incoming);
        let (p1, d1) = self.exit(lane.outgoing);
        let chord = p1 - p0;

        let pos = if chord.x.abs() > TURN_EPSILON && chord.y.abs() > TURN_EPSILON {
            turning_arc(p0, p1, d1).sample(u)
        } else {
            LineSegment2d::from_ends(p0, p1).sample(u)
        };

        // U-turns pass through a zero direction halfway, so fall back to the chord
        let dir = try_normalize(d0.lerp(d1, u))
            .or_else(|| try_normalize(chord))
            .unwrap_or(d1);

        PathSample { pos, dir }
    }
}

/// Finds the arc from `p0` to `p1` that leaves in direction `d1`, pivoting
/// around the corner of the intersection. The entry direction must be
/// perpendicular to `d1`.
fn turning_arc(p0: Point2d, p1: Point2d, d1: Vector2d) -> Arc2d {
    let pivot = p0 + d1 * (p1 - p0).dot(d1);
    let [v0, v1] = [p0 - pivot, p1 - pivot];
    let start = v0.y.atan2(v0.x);
    let mut sweep = v1.y.atan2(v1.x) - start;
    if sweep > MAX_TURN_SWEEP {
        sweep -= TAU;
    } else if sweep < -MAX_TURN_SWEEP {
        sweep += TAU;
    }
    Arc2d::new(pivot, v0.magnitude(), start, sweep)
}
