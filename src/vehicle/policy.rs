use crate::road::Slot;
use rand::seq::SliceRandom;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a vehicle chooses where to go.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Policy {
    /// Drives a fixed circuit. At a dead end the vehicle starts the road
    /// over from the beginning, and at intersections it takes the first exit
    /// counter-clockwise from where it came in.
    Looped,
    /// Wanders at random, turning around at dead ends.
    Wander {
        /// Quarter turns counter-clockwise from the incoming slot to the slot
        /// the vehicle would rather leave by, or 0 for no preference.
        preferred_turn: usize,
    },
}

/// What a vehicle does when it reaches a road end with nothing connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DeadEnd {
    /// Start the same lane again from the beginning.
    Restart,
    /// Turn around into the opposite lane.
    Reverse,
}

impl Default for Policy {
    fn default() -> Self {
        Policy::Wander { preferred_turn: 0 }
    }
}

impl Policy {
    /// The turn to prefer at intersections.
    pub fn preferred_turn(&self) -> usize {
        match self {
            Policy::Looped => 0,
            Policy::Wander { preferred_turn } => *preferred_turn,
        }
    }

    pub(crate) fn dead_end(&self) -> DeadEnd {
        match self {
            Policy::Looped => DeadEnd::Restart,
            Policy::Wander { .. } => DeadEnd::Reverse,
        }
    }

    /// Chooses one of the exits of an intersection.
    pub(crate) fn choose<R: Rng + ?Sized>(&self, exits: &[Slot], rng: &mut R) -> Option<Slot> {
        match self {
            Policy::Looped => exits.first().copied(),
            Policy::Wander { .. } => exits.choose(rng).copied(),
        }
    }
}
