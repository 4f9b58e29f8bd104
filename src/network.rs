use crate::math::Point2d;
use crate::road::{Direction, End, Junction, Lane, Link, Road, RoundRoad, Shape, Slot, SlotLink, StraightRoad};
use crate::util::Interval;
use crate::{RoadId, RoadSet};
use itertools::iproduct;
use log::{debug, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// The default width of a lane, which is also the distance from the
/// centre of an intersection to the ends of the roads it connects.
pub const DEFAULT_LANE_WIDTH: f64 = 15.0;

/// The default distance within which a road end is considered
/// to touch an intersection slot.
const DEFAULT_TOLERANCE: f64 = 1e-4;

/// The parameters shared by all roads in a network.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkConfig {
    /// The width of a lane.
    pub lane_width: f64,
    /// The speed limit through intersections, in units per second.
    pub junction_speed_limit: f64,
    /// The per-axis distance within which a road end connects to an intersection slot.
    pub tolerance: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            lane_width: DEFAULT_LANE_WIDTH,
            junction_speed_limit: f64::INFINITY,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// A network of roads and intersections.
///
/// Built with a [NetworkBuilder] and immutable afterwards.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoadNetwork {
    config: NetworkConfig,
    roads: RoadSet,
}

/// The first phase of building a [RoadNetwork], in which ordinary roads are added.
pub struct NetworkBuilder {
    network: RoadNetwork,
}

/// The second phase of building a [RoadNetwork], in which intersections are
/// added and connected to the roads that end at their edges.
pub struct JunctionBuilder {
    network: RoadNetwork,
}

impl RoadNetwork {
    /// Gets the road or intersection with the given ID, if it exists.
    pub fn get(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(id)
    }

    /// Gets the intersection with the given ID, if it exists and is an intersection.
    pub fn junction(&self, id: RoadId) -> Option<&Junction> {
        self.get(id).and_then(Road::as_junction)
    }

    /// Returns an iterator over all the roads and intersections.
    pub fn iter(&self) -> impl Iterator<Item = &Road> {
        self.roads.values()
    }

    /// The number of roads and intersections.
    pub fn len(&self) -> usize {
        self.roads.len()
    }

    /// Whether the network has no roads.
    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn lane_width(&self) -> f64 {
        self.config.lane_width
    }

    /// Whether two points coincide within the network's tolerance.
    fn touches(&self, a: Point2d, b: Point2d) -> bool {
        let tol = self.config.tolerance;
        Interval::disc(a.x, tol).contains(b.x) && Interval::disc(a.y, tol).contains(b.y)
    }
}

impl Index<RoadId> for RoadNetwork {
    type Output = Road;

    fn index(&self, id: RoadId) -> &Road {
        &self.roads[id]
    }
}

impl NetworkBuilder {
    /// Starts building a network.
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            network: RoadNetwork {
                config,
                roads: RoadSet::with_key(),
            },
        }
    }

    /// Adds a straight road from `a` to `b`.
    pub fn add_straight(&mut self, name: &str, a: Point2d, b: Point2d, speed_limit: f64) -> RoadId {
        let shape = Shape::Straight(StraightRoad::new(a, b, self.network.lane_width()));
        self.add_road(name, shape, speed_limit)
    }

    /// Adds a road around a full circle. Ends A and B both lie on the +X axis from the centre.
    pub fn add_round(&mut self, name: &str, centre: Point2d, radius: f64, speed_limit: f64) -> RoadId {
        let shape = Shape::Round(RoundRoad::circle(centre, radius, self.network.lane_width()));
        self.add_road(name, shape, speed_limit)
    }

    /// Adds a road along a circular arc from angle `start` to `start + sweep`, in radians.
    pub fn add_arc(
        &mut self,
        name: &str,
        centre: Point2d,
        radius: f64,
        start: f64,
        sweep: f64,
        speed_limit: f64,
    ) -> RoadId {
        let lane_width = self.network.lane_width();
        let shape = Shape::Round(RoundRoad::arc(centre, radius, start, sweep, lane_width));
        self.add_road(name, shape, speed_limit)
    }

    /// Specifies that `end_a` of road `a` continues onto `end_b` of road `b`, in both directions.
    pub fn connect(&mut self, a: RoadId, end_a: End, b: RoadId, end_b: End) {
        let roads = &mut self.network.roads;
        roads[a].set_end(end_a, Link { road: b, lane: Lane::Road(Direction::leaving(end_b)) });
        roads[b].set_end(end_b, Link { road: a, lane: Lane::Road(Direction::leaving(end_a)) });
    }

    /// Finishes adding ordinary roads and moves on to adding intersections.
    pub fn finish_roads(self) -> JunctionBuilder {
        JunctionBuilder { network: self.network }
    }

    fn add_road(&mut self, name: &str, shape: Shape, speed_limit: f64) -> RoadId {
        self.network
            .roads
            .insert_with_key(|id| Road::new(id, name, shape, speed_limit))
    }
}

impl JunctionBuilder {
    /// Gets the network built so far.
    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Adds an intersection centred at `centre`, and connects it to every road
    /// with an end one lane width away along the X or Z axis.
    pub fn add_intersection(&mut self, name: &str, centre: Point2d) -> RoadId {
        let config = self.network.config;
        let junction = Junction::new(centre, config.lane_width);
        let id = self.network.roads.insert_with_key(|id| {
            Road::new(id, name, Shape::Junction(junction.clone()), config.junction_speed_limit)
        });

        let matches = iproduct!(self.network.roads.iter(), End::BOTH, Slot::ALL)
            .filter(|((_, road), _, _)| !road.is_intersection())
            .filter(|((_, road), end, slot)| {
                self.network.touches(road.endpoint(*end), junction.slot_point(*slot))
            })
            .map(|((road_id, _), end, slot)| (road_id, end, slot))
            .collect::<Vec<_>>();

        for (road_id, end, slot) in matches {
            self.wire(id, slot, road_id, end);
        }

        id
    }

    /// Finishes building the network.
    pub fn build(self) -> RoadNetwork {
        for road in self.network.iter() {
            if let Some(junction) = road.as_junction() {
                for (slot, link) in junction.connections() {
                    assert!(
                        self.network.get(link.road).is_some(),
                        "Intersection {} slot {:?} refers to a missing road",
                        road.name(),
                        slot
                    );
                }
            }
        }
        self.network
    }

    /// Connects one end of an ordinary road to a slot of an intersection.
    fn wire(&mut self, junction_id: RoadId, slot: Slot, road_id: RoadId, end: End) {
        let roads = &mut self.network.roads;

        if let Some(existing) = roads[road_id].end(end) {
            warn!(
                "Road {} end {:?} is already connected to {:?}; not connecting it to {}",
                roads[road_id].name(),
                end,
                existing.road,
                roads[junction_id].name()
            );
            return;
        }

        let Some(junction) = roads[junction_id].as_junction_mut() else {
            return;
        };
        if junction.slot(slot).is_some() {
            warn!("Slot {:?} is already occupied; not connecting road end {:?}", slot, end);
            return;
        }
        junction.connect(slot, SlotLink { road: road_id, end });

        roads[road_id].set_end(end, Link { road: junction_id, lane: Lane::Entering });
        debug!(
            "Connected {} end {:?} to {} at {:?}",
            roads[road_id].name(),
            end,
            roads[junction_id].name(),
            slot
        );
    }
}
