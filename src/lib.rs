pub use cgmath;
pub use network::{JunctionBuilder, NetworkBuilder, NetworkConfig, RoadNetwork, DEFAULT_LANE_WIDTH};
pub use road::{
    Choices, Direction, End, Junction, Lane, Link, PathSample, PathShape, Road, RoundRoad, Shape,
    Slot, SlotLink, StraightRoad, Traversal,
};
pub use simulation::Simulation;
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::Interval;
pub use vehicle::{Drive, Policy, Vehicle, VehicleAttributes, DEFAULT_PROBE_STEP, MAX_CATCH_UP_ATTEMPTS};

mod debug;
pub mod math;
mod network;
mod road;
mod simulation;
mod util;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Road] or intersection.
    pub struct RoadId;
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type RoadSet = SlotMap<RoadId, Road>;
type VehicleSet = SlotMap<VehicleId, Vehicle>;
