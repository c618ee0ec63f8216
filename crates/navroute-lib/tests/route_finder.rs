//! Integration tests for the A* route finder.
//!
//! These tests verify:
//! - The cheaper of two airway routes is chosen
//! - Altitude restrictions steer the route onto the other airway
//! - Disconnected networks report no route
//! - Leg extraction is repeatable
//! - Progress reporting and cancellation
//! - Radio navaid routing by navaid type
//! - Changing airways is penalised

mod common;

use common::{
    crossing_airways, init_tracing, radio_navaids, two_airways, two_airways_restricted, DEPARTURE,
    DESTINATION,
};
use navroute_lib::{
    Connections, DataSource, Modes, NetworkBuilder, NodeRecord, NodeType, Point3D, Pos,
    RouteFinder, RouteNetwork, SearchOutcome,
};

fn nav_ids(finder: &RouteFinder<'_>) -> Vec<i64> {
    finder
        .extract_legs()
        .0
        .iter()
        .map(|leg| leg.nav_id)
        .collect()
}

#[test]
fn cheaper_airway_is_chosen() {
    init_tracing();
    let mut network = two_airways();
    let mut finder = RouteFinder::new(&mut network);

    assert!(finder.calculate_route(DEPARTURE, DESTINATION, 0, Modes::VICTOR));
    assert_eq!(finder.outcome(), SearchOutcome::Found);

    let (legs, distance) = finder.extract_legs();
    let ids: Vec<_> = legs.iter().map(|leg| leg.nav_id).collect();
    assert_eq!(ids, vec![1, 3, 4, 5]);

    let airways: Vec<_> = legs.iter().map(|leg| leg.airway_id).collect();
    assert_eq!(airways, vec![None, Some(200), Some(200), Some(200)]);
    assert!(legs.iter().all(|leg| leg.node_type == NodeType::Waypoint));

    let points: Vec<Point3D> = [
        DEPARTURE,
        Pos::new(0.0, 0.0),
        Pos::new(0.66, -0.1),
        Pos::new(1.33, -0.1),
        Pos::new(2.0, 0.0),
        DESTINATION,
    ]
    .into_iter()
    .map(Point3D::from)
    .collect();
    let expected: f32 = points
        .windows(2)
        .map(|pair| pair[0].gc_distance_meter(&pair[1]))
        .sum();
    assert!(
        (distance - expected).abs() < expected * 1e-4,
        "distance {distance} differs from {expected}"
    );
}

#[test]
fn leg_positions_match_nodes() {
    let mut network = two_airways();
    let mut finder = RouteFinder::new(&mut network);
    assert!(finder.calculate_route(DEPARTURE, DESTINATION, 0, Modes::VICTOR));

    let (legs, _) = finder.extract_legs();
    let third = &legs[2];
    assert_eq!(third.nav_id, 4);
    assert!((third.pos.lon_x - 1.33).abs() < 1e-3);
    assert!((third.pos.lat_y + 0.1).abs() < 1e-3);
}

#[test]
fn extraction_is_repeatable() {
    let mut network = two_airways();
    let mut finder = RouteFinder::new(&mut network);
    assert!(finder.calculate_route(DEPARTURE, DESTINATION, 0, Modes::VICTOR));

    let first = finder.extract_legs();
    let second = finder.extract_legs();
    assert_eq!(first, second);
}

#[test]
fn cruise_altitude_outside_band_uses_other_airway() {
    let mut network = two_airways_restricted(Some((20_000, 30_000)), None);
    let mut finder = RouteFinder::new(&mut network);

    assert!(finder.calculate_route(DEPARTURE, DESTINATION, 10_000, Modes::VICTOR));
    assert_eq!(nav_ids(&finder), vec![1, 2, 5]);

    assert!(finder.calculate_route(DEPARTURE, DESTINATION, 25_000, Modes::VICTOR));
    assert_eq!(nav_ids(&finder), vec![1, 3, 4, 5]);
}

#[test]
fn disjoint_altitude_bands_along_path_are_not_combined() {
    let mut network = two_airways_restricted(Some((20_000, 30_000)), Some((31_000, 40_000)));
    let mut finder = RouteFinder::new(&mut network);

    assert!(finder.calculate_route(DEPARTURE, DESTINATION, 0, Modes::VICTOR));
    assert_eq!(nav_ids(&finder), vec![1, 2, 5]);
}

#[test]
fn disconnected_network_has_no_route() {
    let mut builder = NetworkBuilder::new(DataSource::Airway);
    builder
        .add_node(NodeRecord::waypoint(1, Pos::new(5.0, 5.0), Connections::VICTOR))
        .expect("node");
    let mut network = builder.build().expect("network");
    let mut finder = RouteFinder::new(&mut network);

    let found = finder.calculate_route(Pos::new(0.0, 0.0), Pos::new(10.0, 0.0), 0, Modes::VICTOR);
    assert!(!found);
    assert_eq!(finder.outcome(), SearchOutcome::NotFound);

    let (legs, distance) = finder.extract_legs();
    assert!(legs.is_empty());
    assert_eq!(distance, 0.0);
}

#[test]
fn failed_search_replaces_previous_route() {
    let mut network = two_airways();
    let mut finder = RouteFinder::new(&mut network);
    assert!(finder.calculate_route(DEPARTURE, DESTINATION, 0, Modes::VICTOR));
    assert!(!finder.extract_legs().0.is_empty());

    // Jet mode has no usable airway in this network
    assert!(!finder.calculate_route(DEPARTURE, DESTINATION, 0, Modes::JET));
    assert!(finder.extract_legs().0.is_empty());
}

#[test]
fn progress_callback_can_abort() {
    let mut network = two_airways();
    let mut calls = Vec::new();
    {
        let mut finder = RouteFinder::new(&mut network);
        finder.set_progress_callback(|total, current| {
            calls.push((total, current));
            false
        });

        assert!(!finder.calculate_route(DEPARTURE, DESTINATION, 0, Modes::VICTOR));
        assert_eq!(finder.outcome(), SearchOutcome::Aborted);
        assert_eq!(finder.expanded_nodes(), 1);
        assert!(finder.extract_legs().0.is_empty());
    }

    assert_eq!(calls.len(), 1);
    let (total, current) = calls[0];
    let expected = Point3D::from(DEPARTURE).direct_distance_meter(&Point3D::from(DESTINATION));
    assert!((total - expected).abs() < 1.0);
    assert_eq!(total, current, "departure is expanded first");
}

#[test]
fn progress_callback_returning_true_continues() {
    let mut network = two_airways();
    let mut finder = RouteFinder::new(&mut network);
    finder.set_progress_callback(|_, _| true);

    assert!(finder.calculate_route(DEPARTURE, DESTINATION, 0, Modes::VICTOR));
    assert_eq!(nav_ids(&finder), vec![1, 3, 4, 5]);
}

#[test]
fn radio_routes_prefer_vors_over_ndbs() {
    let mut network = radio_navaids();
    let mut finder = RouteFinder::new(&mut network);
    let (from, to) = (Pos::new(0.0, 0.0), Pos::new(3.0, 0.0));

    assert!(finder.calculate_route(from, to, 0, Modes::RADIO));
    let (legs, _) = finder.extract_legs();
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].nav_id, 20);
    assert_eq!(legs[0].node_type, NodeType::VorDme);
    assert_eq!(legs[0].airway_id, None);

    assert!(finder.calculate_route(from, to, 0, Modes::RADIO_NDB));
    assert_eq!(nav_ids(&finder), vec![10]);
}

fn victor_route(mut network: RouteNetwork) -> Vec<i64> {
    let mut finder = RouteFinder::new(&mut network);
    assert!(finder.calculate_route(DEPARTURE, DESTINATION, 0, Modes::VICTOR));
    nav_ids(&finder)
}

#[test]
fn staying_on_one_airway_keeps_the_shorter_route() {
    assert_eq!(victor_route(crossing_airways("V2", "V2", false)), vec![1, 3, 5]);
    assert_eq!(victor_route(crossing_airways("V2", "V2", true)), vec![1, 3, 4, 5]);
}

#[test]
fn changing_airways_costs_extra() {
    init_tracing();
    assert_eq!(victor_route(crossing_airways("V2", "V3", false)), vec![1, 2, 5]);
}

#[test]
fn airway_is_remembered_across_generated_hops() {
    assert_eq!(victor_route(crossing_airways("V2", "V3", true)), vec![1, 2, 5]);
}
