use super::policy::{DeadEnd, Policy};
use super::VehicleAttributes;
use crate::debug::{debug_line, debug_point};
use crate::road::{Direction, Lane, PathSample, Road, SlotLink, Traversal};
use crate::{RoadId, RoadNetwork};
use cgmath::prelude::*;
use log::{trace, warn};
use rand::Rng;

/// Probe distances shorter than this mean the lane has no length to travel.
const MIN_PROBE_DISTANCE: f64 = 1e-9;

/// The state of a vehicle driving through a road network.
///
/// Each step advances the path parameter `u` at the vehicle's speed. When `u`
/// reaches 1 the vehicle moves onto the next road, choosing an exit whenever
/// it enters an intersection.
#[derive(Clone, Debug)]
pub struct Drive {
    /// The road or intersection being travelled.
    road: RoadId,
    /// The lane within the road.
    lane: Lane,
    /// The path parameter in `[0, 1]`.
    u: f64,
    /// The simulation time up to which the drive has been advanced.
    time: f64,
    /// The desired speed in units per second.
    speed: f64,
    /// A factor applied to `speed`.
    speed_adjust: f64,
    /// The parameter increment used to measure distance along the lane.
    probe_step: f64,
    /// How to choose exits and handle dead ends.
    policy: Policy,
    /// The road travelled before the current one.
    last_road: Option<RoadId>,
    /// The road end through which the vehicle last left an ordinary road.
    /// Tells apart the two slots of a road with both ends on one intersection.
    arrived_through: Option<SlotLink>,
    /// The most recently evaluated position and direction.
    sample: PathSample,
}

impl Drive {
    /// Creates a drive on an ordinary road.
    ///
    /// # Parameters
    /// * `network` - The road network
    /// * `road` - The road to start on, which must not be an intersection
    /// * `dir` - The lane to start in
    /// * `u` - The path parameter to start at
    /// * `time` - The current simulation time
    /// * `attributes` - The vehicle's speed and driving policy
    ///
    /// Panics if `attributes.probe_step` isn't positive.
    pub(crate) fn new(
        network: &RoadNetwork,
        road: RoadId,
        dir: Direction,
        u: f64,
        time: f64,
        attributes: &VehicleAttributes,
    ) -> Self {
        assert!(
            attributes.probe_step > 0.0,
            "Probe step must be positive, got {}",
            attributes.probe_step
        );
        let lane = Lane::Road(dir);
        let sample = network[road]
            .position(lane, u.clamp(0.0, 1.0))
            .expect("Vehicles must start on an ordinary road");
        Self {
            road,
            lane,
            u: u.clamp(0.0, 1.0),
            time,
            speed: attributes.speed,
            speed_adjust: 1.0,
            probe_step: attributes.probe_step,
            policy: attributes.policy,
            last_road: None,
            arrived_through: None,
            sample,
        }
    }

    pub fn road(&self) -> RoadId {
        self.road
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    /// The path parameter along the current road, in `[0, 1]`.
    pub fn u(&self) -> f64 {
        self.u
    }

    /// The simulation time the drive has been advanced to.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The desired speed, including any adjustment.
    pub fn speed(&self) -> f64 {
        self.speed * self.speed_adjust
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// The road travelled before the current one.
    pub fn last_road(&self) -> Option<RoadId> {
        self.last_road
    }

    /// The position and direction as of the last step.
    pub fn sample(&self) -> PathSample {
        self.sample
    }

    pub(crate) fn set_speed_adjust(&mut self, factor: f64) {
        self.speed_adjust = factor;
    }

    /// Advances the drive towards time `t`.
    ///
    /// A single step travels to the end of the current road at most.
    /// Any time left over is banked by leaving `time` short of `t`,
    /// so callers should repeat the step until `time` catches up.
    pub(crate) fn step(&mut self, t: f64, network: &RoadNetwork, rng: &mut impl Rng) {
        if self.u >= 1.0 {
            self.transition(network);
        }
        if self.lane == Lane::Entering {
            self.choose_exit(network, rng);
        }
        self.advance(t, network);
        if let Some(sample) = network[self.road].position(self.lane, self.u) {
            self.sample = sample;
        }
    }

    /// Moves along the current lane, correcting for the lane's parameterisation
    /// so that the distance travelled matches the vehicle's speed.
    fn advance(&mut self, t: f64, network: &RoadNetwork) {
        let elapsed = t - self.time;
        if elapsed <= 0.0 || self.u >= 1.0 {
            return;
        }

        let road = &network[self.road];
        let (Some(here), Some(probe)) = (
            road.position(self.lane, self.u),
            road.position(self.lane, self.u + self.probe_step),
        ) else {
            return;
        };

        let measured = (probe.pos - here.pos).magnitude();
        if measured < MIN_PROBE_DISTANCE {
            self.u = 1.0;
            return;
        }

        let distance = f64::min(self.speed(), road.speed_limit()) * elapsed;
        let du = self.probe_step * distance / measured;
        let u = self.u + du;

        if u > 1.0 {
            let leftover = elapsed * (u - 1.0) / du;
            self.u = 1.0;
            self.time = t - leftover;
        } else {
            self.u = u;
            self.time = t;
        }
    }

    /// Moves onto the next road after reaching the end of the current one.
    fn transition(&mut self, network: &RoadNetwork) {
        let road = &network[self.road];
        match self.lane {
            Lane::Road(dir) => self.leave_road(road, dir),
            Lane::Junction(traversal) => self.leave_junction(road, traversal),
            Lane::Entering => {}
        }
    }

    fn leave_road(&mut self, road: &Road, dir: Direction) {
        if let Some(link) = road.end(dir.arrival_end()) {
            self.arrived_through = Some(SlotLink {
                road: self.road,
                end: dir.arrival_end(),
            });
            self.enter(link.road, link.lane);
            return;
        }
        match self.policy.dead_end() {
            DeadEnd::Restart => {
                trace!("Restarting {} in {:?}", road.name(), dir);
            }
            DeadEnd::Reverse => {
                trace!("Turning around at the end of {}", road.name());
                self.lane = Lane::Road(dir.reversed());
            }
        }
        self.u = 0.0;
    }

    fn leave_junction(&mut self, road: &Road, traversal: Traversal) {
        let Some(junction) = road.as_junction() else {
            return;
        };
        let exit = junction.slot(traversal.outgoing).or_else(|| {
            debug_point("empty slot", self.sample.pos);
            junction.pick_something().map(|(_, link)| link)
        });
        if let Some(link) = exit {
            self.enter(link.road, Lane::Road(Direction::leaving(link.end)));
        }
    }

    /// Chooses the way out of the intersection the vehicle just entered.
    fn choose_exit(&mut self, network: &RoadNetwork, rng: &mut impl Rng) {
        let Some(junction) = network[self.road].as_junction() else {
            return;
        };

        let choices = self
            .arrived_through
            .and_then(|from| junction.pick_direction(from, self.policy.preferred_turn()));
        let traversal = match choices {
            Some(choices) => {
                let outgoing = self.policy.choose(&choices.exits, rng);
                Traversal {
                    incoming: choices.incoming,
                    outgoing: outgoing.unwrap_or(choices.incoming),
                }
            }
            None => {
                warn!(
                    "Vehicle entered intersection {} from an unconnected road end {:?}",
                    network[self.road].name(),
                    self.arrived_through
                );
                let Some((slot, _)) = junction.pick_something() else {
                    return;
                };
                Traversal {
                    incoming: slot,
                    outgoing: slot,
                }
            }
        };

        self.lane = Lane::Junction(traversal);
        if let (Some(entry), Some(exit)) = (
            network[self.road].position(self.lane, 0.0),
            network[self.road].position(self.lane, 1.0),
        ) {
            debug_line("traversal", entry.pos, exit.pos);
        }
    }

    fn enter(&mut self, road: RoadId, lane: Lane) {
        self.last_road = Some(self.road);
        self.road = road;
        self.lane = lane;
        self.u = 0.0;
    }
}
