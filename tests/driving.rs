//! Tests that drive vehicles through small road networks.

use assert_approx_eq::assert_approx_eq;
use road_sim::{
    math::Point2d, Direction, End, Lane, NetworkBuilder, NetworkConfig, Policy, RoadId,
    RoadNetwork, Simulation, VehicleAttributes,
};
use std::f64::consts::PI;

/// Two roads of length 100 either side of an intersection at (100, 100).
fn two_roads() -> (RoadNetwork, RoadId, RoadId, RoadId) {
    let mut builder = NetworkBuilder::new(NetworkConfig::default());
    let first = builder.add_straight("first", Point2d::new(-15.0, 100.0), Point2d::new(85.0, 100.0), 20.0);
    let second = builder.add_straight("second", Point2d::new(115.0, 100.0), Point2d::new(215.0, 100.0), 20.0);
    let mut junctions = builder.finish_roads();
    let junction = junctions.add_intersection("junction", Point2d::new(100.0, 100.0));
    (junctions.build(), first, junction, second)
}

/// Four roads of length 100 meeting at an intersection at (100, 100),
/// listed east, north, west, south.
fn crossroads() -> (RoadNetwork, RoadId, [RoadId; 4]) {
    let mut builder = NetworkBuilder::new(NetworkConfig::default());
    let east = builder.add_straight("east", Point2d::new(115.0, 100.0), Point2d::new(215.0, 100.0), 20.0);
    let north = builder.add_straight("north", Point2d::new(100.0, 115.0), Point2d::new(100.0, 215.0), 20.0);
    let west = builder.add_straight("west", Point2d::new(-15.0, 100.0), Point2d::new(85.0, 100.0), 20.0);
    let south = builder.add_straight("south", Point2d::new(100.0, -15.0), Point2d::new(100.0, 85.0), 20.0);
    let mut junctions = builder.finish_roads();
    let junction = junctions.add_intersection("junction", Point2d::new(100.0, 100.0));
    (junctions.build(), junction, [east, north, west, south])
}

fn attributes(speed: f64, policy: Policy) -> VehicleAttributes {
    VehicleAttributes {
        speed,
        policy,
        ..Default::default()
    }
}

/// Test that a vehicle drives along a road, through an intersection and along the next road.
#[test]
fn drives_through_an_intersection() {
    let (network, first, junction, second) = two_roads();
    let junction_len = network[junction].length();
    let mut sim = Simulation::with_seed(network, 1);
    let veh = sim.add_vehicle(&attributes(10.0, Policy::default()), first, Direction::Forward, 0.0);

    let mut visited = vec![first];
    for i in 1..=229 {
        sim.simulate_until(i as f64 * 0.1);
        let road = sim.get_vehicle(veh).road_id();
        if visited.last() != Some(&road) {
            visited.push(road);
        }
    }

    assert_eq!(visited, [first, junction, second]);
    let drive = sim.get_vehicle(veh).drive();
    assert_eq!(drive.lane(), Lane::Road(Direction::Forward));
    // 229 units travelled in total
    assert_approx_eq!(drive.u(), (229.0 - 100.0 - junction_len) / 100.0, 1e-6);
    assert!(drive.u() > 0.98);
}

/// Test that one large step ends in the same place as two smaller steps.
#[test]
fn leftover_time_is_not_lost() {
    let (network, _, [_, _, west, _]) = crossroads();
    let mut big = Simulation::with_seed(network.clone(), 1);
    let mut small = Simulation::with_seed(network, 1);
    let attribs = attributes(10.0, Policy::Looped);
    let big_veh = big.add_vehicle(&attribs, west, Direction::Forward, 0.0);
    let small_veh = small.add_vehicle(&attribs, west, Direction::Forward, 0.0);

    big.simulate_until(17.0);
    small.simulate_until(9.5);
    small.simulate_until(17.0);

    let a = big.get_vehicle(big_veh).drive();
    let b = small.get_vehicle(small_veh).drive();
    assert_eq!(a.road(), b.road());
    assert_eq!(a.lane(), b.lane());
    assert_approx_eq!(a.u(), b.u(), 1e-6);
    assert_approx_eq!(a.time(), 17.0);
    assert_approx_eq!(b.time(), 17.0);
}

/// Test that a looped vehicle returns to where it started after one lap.
#[test]
fn looped_vehicle_completes_a_lap() {
    let mut builder = NetworkBuilder::new(NetworkConfig::default());
    let circle = builder.add_round("circle", Point2d::new(0.0, 0.0), 50.0, 100.0);
    let network = builder.finish_roads().build();
    let lane_radius = 50.0 + 0.5 * network.lane_width();

    let mut sim = Simulation::with_seed(network, 1);
    let veh = sim.add_vehicle(&attributes(10.0, Policy::Looped), circle, Direction::Forward, 0.25);

    let lap_time = 2.0 * PI * lane_radius / 10.0;
    let mut t = 0.0;
    while t + 0.5 < lap_time {
        t += 0.5;
        sim.simulate_until(t);
    }
    sim.simulate_until(lap_time);

    let drive = sim.get_vehicle(veh).drive();
    assert_eq!(drive.road(), circle);
    assert_eq!(drive.lane(), Lane::Road(Direction::Forward));
    assert_approx_eq!(drive.u(), 0.25, 0.01);
}

/// Test that a wandering vehicle never leaves an intersection the way it came in.
#[test]
fn wandering_never_turns_back_at_intersections() {
    let (network, junction, roads) = crossroads();
    let mut sim = Simulation::with_seed(network, 42);
    let veh = sim.add_vehicle(&attributes(20.0, Policy::default()), roads[2], Direction::Forward, 0.0);

    let mut visited = vec![roads[2]];
    for _ in 0..2000 {
        sim.step(0.1);
        let road = sim.get_vehicle(veh).road_id();
        if visited.last() != Some(&road) {
            visited.push(road);
        }
    }

    let exits = visited
        .windows(3)
        .filter(|w| w[1] == junction)
        .map(|w| (w[0], w[2]))
        .collect::<Vec<_>>();
    assert!(exits.len() > 10);
    for (from, to) in &exits {
        assert_ne!(from, to);
        assert!(roads.contains(to));
    }
    // More than one exit was taken
    assert!(exits.iter().any(|(_, to)| *to != exits[0].1));
}

/// Test that a preferred turn is always taken when it is available.
#[test]
fn preferred_turn_is_taken() {
    let (network, junction, [east, _, west, south]) = crossroads();
    // The south road ends at the intersection, the east road starts there
    let cases = [(1, south, Direction::Backward), (2, east, Direction::Forward)];
    for (turn, expected, lane) in cases {
        let mut sim = Simulation::with_seed(network.clone(), 3);
        let policy = Policy::Wander { preferred_turn: turn };
        let veh = sim.add_vehicle(&attributes(10.0, policy), west, Direction::Forward, 0.5);
        sim.simulate_until(9.0);
        let drive = sim.get_vehicle(veh).drive();
        assert_eq!(drive.road(), expected);
        assert_eq!(drive.last_road(), Some(junction));
        assert_eq!(drive.lane(), Lane::Road(lane));
    }
}

/// Test that a vehicle turns around at the end of a road with nothing connected.
#[test]
fn dead_end_reverses() {
    let mut builder = NetworkBuilder::new(NetworkConfig::default());
    let road = builder.add_straight("cul-de-sac", Point2d::new(0.0, 0.0), Point2d::new(0.0, 50.0), 20.0);
    let network = builder.finish_roads().build();
    assert_eq!(network[road].end(End::B), None);

    let mut sim = Simulation::with_seed(network, 1);
    let veh = sim.add_vehicle(&attributes(10.0, Policy::default()), road, Direction::Forward, 0.0);
    sim.simulate_until(6.0);

    let vehicle = sim.get_vehicle(veh);
    assert_eq!(vehicle.road_id(), road);
    assert_eq!(vehicle.drive().lane(), Lane::Road(Direction::Backward));
    assert_approx_eq!(vehicle.drive().u(), 0.2, 1e-9);
    assert_approx_eq!(vehicle.position().y, 40.0, 1e-9);
    assert_approx_eq!(vehicle.direction().y, -1.0, 1e-9);
}

/// Test that a vehicle that can't catch up in one frame continues in the next.
#[test]
fn stuck_vehicles_catch_up_later() {
    let mut builder = NetworkBuilder::new(NetworkConfig::default());
    let origin = Point2d::new(0.0, 0.0);
    let points = (0..15)
        .map(|i| builder.add_straight(&format!("point {}", i), origin, origin, 20.0))
        .collect::<Vec<_>>();
    let road = builder.add_straight("road", origin, Point2d::new(100.0, 0.0), 20.0);
    for pair in points.windows(2) {
        builder.connect(pair[0], End::B, pair[1], End::A);
    }
    builder.connect(points[14], End::B, road, End::A);
    let network = builder.finish_roads().build();

    let mut sim = Simulation::with_seed(network, 1);
    let veh = sim.add_vehicle(&attributes(10.0, Policy::default()), points[0], Direction::Forward, 0.0);

    sim.simulate_until(1.0);
    assert_eq!(sim.time(), 1.0);
    assert!(sim.get_vehicle(veh).drive().time() < 1.0);
    assert_ne!(sim.get_vehicle(veh).road_id(), road);

    sim.simulate_until(2.0);
    let drive = sim.get_vehicle(veh).drive();
    assert_eq!(drive.road(), road);
    assert_approx_eq!(drive.time(), 2.0);
    assert_approx_eq!(drive.u(), 0.2, 1e-9);
}

/// Test that the world transform follows the vehicle.
#[test]
fn transform_tracks_position() {
    let (network, first, _, _) = two_roads();
    let mut sim = Simulation::with_seed(network, 1);
    let veh = sim.add_vehicle(&attributes(10.0, Policy::default()), first, Direction::Forward, 0.0);
    for i in 1..=40 {
        sim.simulate_until(i as f64 * 0.5);
        let vehicle = sim.get_vehicle(veh);
        let m = vehicle.transform();
        assert_approx_eq!(m.w.x, vehicle.position().x);
        assert_approx_eq!(m.w.y, 0.0);
        assert_approx_eq!(m.w.z, vehicle.position().y);
        assert_approx_eq!(m.x.x, vehicle.direction().x);
        assert_approx_eq!(m.x.z, vehicle.direction().y);
    }
}

/// Test that time doesn't run backwards.
#[test]
fn earlier_times_are_ignored() {
    let (network, first, _, _) = two_roads();
    let mut sim = Simulation::with_seed(network, 1);
    let veh = sim.add_vehicle(&attributes(10.0, Policy::default()), first, Direction::Forward, 0.0);
    sim.simulate_until(5.0);
    let u = sim.get_vehicle(veh).drive().u();
    sim.simulate_until(2.0);
    assert_eq!(sim.time(), 5.0);
    assert_eq!(sim.frame(), 1);
    assert_eq!(sim.get_vehicle(veh).drive().u(), u);
}

/// Test that speed adjustments stay within bounds and vehicles can be removed.
#[test]
fn randomised_speeds_and_removal() {
    let (network, first, _, second) = two_roads();
    let mut sim = Simulation::with_seed(network, 9);
    let ids = (0..20)
        .map(|i| {
            let road = if i % 2 == 0 { first } else { second };
            sim.add_vehicle(&attributes(10.0, Policy::default()), road, Direction::Backward, 0.0)
        })
        .collect::<Vec<_>>();

    sim.randomise_speeds(0.5);
    for vehicle in sim.iter_vehicles() {
        let speed = vehicle.drive().speed();
        assert!((7.5..=12.5).contains(&speed));
    }

    assert!(sim.remove_vehicle(ids[3]).is_some());
    assert!(sim.remove_vehicle(ids[3]).is_none());
    assert_eq!(sim.iter_vehicles().count(), 19);
}
