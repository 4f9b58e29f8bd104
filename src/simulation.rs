#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::road::Direction;
use crate::vehicle::{Vehicle, VehicleAttributes};
use crate::{RoadId, RoadNetwork, VehicleId, VehicleSet};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Distribution;

/// A simulation of vehicles driving around a road network.
pub struct Simulation {
    /// The roads and intersections.
    network: RoadNetwork,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The time the simulation has been advanced to.
    time: f64,
    /// The current frame of simulation.
    frame: usize,
    /// The source of randomness for vehicles choosing where to go.
    rng: StdRng,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation of the given network, starting at time 0.
    pub fn new(network: RoadNetwork) -> Self {
        Self::with_rng(network, StdRng::from_entropy())
    }

    /// Creates a new simulation whose random choices are determined by `seed`.
    pub fn with_seed(network: RoadNetwork, seed: u64) -> Self {
        Self::with_rng(network, StdRng::seed_from_u64(seed))
    }

    fn with_rng(network: RoadNetwork, rng: StdRng) -> Self {
        Self {
            network,
            vehicles: VehicleSet::with_key(),
            time: 0.0,
            frame: 0,
            rng,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        }
    }

    /// Adds a vehicle to an ordinary road.
    ///
    /// # Parameters
    /// * `attributes` - The vehicle's speed and driving policy
    /// * `road` - The road to place the vehicle on; must not be an intersection
    /// * `dir` - The lane to place the vehicle in
    /// * `u` - The path parameter along the lane, clamped to `[0, 1]`
    ///
    /// Panics if `road` is an intersection or `attributes.probe_step` isn't positive.
    pub fn add_vehicle(
        &mut self,
        attributes: &VehicleAttributes,
        road: RoadId,
        dir: Direction,
        u: f64,
    ) -> VehicleId {
        let (network, time) = (&self.network, self.time);
        self.vehicles
            .insert_with_key(|id| Vehicle::new(id, attributes, network, road, dir, u, time))
    }

    /// Removes a vehicle from the simulation.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> Option<Vehicle> {
        self.vehicles.remove(id)
    }

    /// Randomly assigns a speed adjustment factor to each vehicle,
    /// which is sampled from a normal distribution with a mean of 1 (no adjustment)
    /// and standard deviation of `stddev`.
    pub fn randomise_speeds(&mut self, stddev: f64) {
        let distr = rand_distr::Normal::new(1.0, stddev).expect("Invalid standard deviation");
        for vehicle in self.vehicles.values_mut() {
            let factor = distr.sample(&mut self.rng).clamp(0.75, 1.25);
            vehicle.set_speed_adjust(factor);
        }
    }

    /// Advances every vehicle to time `t`.
    ///
    /// Time only moves forward; a `t` earlier than the current time is ignored.
    pub fn simulate_until(&mut self, t: f64) {
        if t < self.time {
            debug!("Ignoring request to simulate back to {} from {}", t, self.time);
            return;
        }

        for vehicle in self.vehicles.values_mut() {
            vehicle.simulate_until(t, &self.network, &mut self.rng);
        }
        self.time = t;
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Advances the simulation by `dt`.
    pub fn step(&mut self, dt: f64) {
        self.simulate_until(self.time + dt);
    }

    /// The time the simulation has been advanced to.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the road network.
    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Returns an iterator over all the vehicles in the simulation.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> &Vehicle {
        &self.vehicles[vehicle_id]
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&self) -> serde_json::Value {
        self.debug.clone()
    }
}
