pub use self::drive::Drive;
pub use self::policy::Policy;
use crate::math::{ground_transform, Point2d, Vector2d};
use crate::road::Direction;
use crate::{RoadId, RoadNetwork, VehicleId};
use cgmath::Matrix4;
use log::warn;
use rand::Rng;

mod drive;
mod policy;

/// The default parameter increment used to measure distance along a lane.
pub const DEFAULT_PROBE_STEP: f64 = 0.02;

/// The number of times a vehicle's drive is stepped in one call
/// to [Vehicle::simulate_until] while it catches up to the target time.
pub const MAX_CATCH_UP_ATTEMPTS: usize = 10;

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's ID
    id: VehicleId,
    /// The driving state
    drive: Drive,
    /// The world transform as of the last update.
    transform: Matrix4<f64>,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug)]
pub struct VehicleAttributes {
    /// The desired speed in units per second. Roads with a lower speed limit slow the vehicle down.
    pub speed: f64,
    /// How the vehicle picks its way through the network.
    pub policy: Policy,
    /// The path parameter increment used to measure distance travelled along a lane.
    /// Smaller values follow curves more accurately. Must be positive.
    pub probe_step: f64,
}

impl Default for VehicleAttributes {
    fn default() -> Self {
        Self {
            speed: 10.0,
            policy: Policy::default(),
            probe_step: DEFAULT_PROBE_STEP,
        }
    }
}

impl Vehicle {
    /// Creates a new vehicle on an ordinary road.
    pub(crate) fn new(
        id: VehicleId,
        attributes: &VehicleAttributes,
        network: &RoadNetwork,
        road: RoadId,
        dir: Direction,
        u: f64,
        time: f64,
    ) -> Self {
        let drive = Drive::new(network, road, dir, u, time, attributes);
        let sample = drive.sample();
        Self {
            id,
            drive,
            transform: ground_transform(sample.pos, sample.dir, 0.0),
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// Gets the vehicle's driving state.
    pub fn drive(&self) -> &Drive {
        &self.drive
    }

    /// The ID of the road or intersection the vehicle is on.
    pub fn road_id(&self) -> RoadId {
        self.drive.road()
    }

    /// The coordinates of the vehicle on the ground plane.
    pub fn position(&self) -> Point2d {
        self.drive.sample().pos
    }

    /// A unit vector aligned with the vehicle's heading.
    pub fn direction(&self) -> Vector2d {
        self.drive.sample().dir
    }

    /// The vehicle's world transform, for rendering.
    /// The vehicle faces along its local +X axis.
    pub fn transform(&self) -> Matrix4<f64> {
        self.transform
    }

    /// Sets a factor multiplied with the vehicle's desired speed.
    pub fn set_speed_adjust(&mut self, factor: f64) {
        self.drive.set_speed_adjust(factor);
    }

    /// Advances the vehicle to time `t`, stepping its drive until it catches up.
    pub(crate) fn simulate_until(&mut self, t: f64, network: &RoadNetwork, rng: &mut impl Rng) {
        for _ in 0..MAX_CATCH_UP_ATTEMPTS {
            self.drive.step(t, network, rng);
            if self.drive.time() >= t {
                break;
            }
        }
        if self.drive.time() < t {
            warn!(
                "Vehicle {:?} is stuck on {} at u = {:.3}, {:.3}s behind",
                self.id,
                network[self.drive.road()].name(),
                self.drive.u(),
                t - self.drive.time()
            );
        }

        let sample = self.drive.sample();
        self.transform = ground_transform(sample.pos, sample.dir, 0.0);
    }
}
