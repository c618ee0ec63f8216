//! Hand-built networks shared by the integration tests.

#![allow(dead_code)]

use navroute_lib::{
    Connections, DataSource, EdgeRecord, EdgeType, NetworkBuilder, NetworkConfig, NodeRecord,
    NodeType, Pos, RouteNetwork,
};

pub const DEPARTURE: Pos = Pos {
    lon_x: -0.0001,
    lat_y: 0.0,
};
pub const DESTINATION: Pos = Pos {
    lon_x: 2.0001,
    lat_y: 0.0,
};

/// Install a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Radii that keep generated hops from bridging the airway network, so only
/// the stored airways connect departure and destination.
pub fn tight_config() -> NetworkConfig {
    NetworkConfig {
        min_nearest_distance_wp_meter: 0.0,
        max_nearest_distance_wp_meter: 100.0,
        nearest_dest_distance_meter: 100.0,
        ..NetworkConfig::airway()
    }
}

fn airway(builder: &mut NetworkBuilder, from: i64, to: i64, airway_id: i64, name: &str) {
    builder
        .add_edge(from, EdgeRecord::airway(to, airway_id, name, EdgeType::Victor))
        .add_edge(to, EdgeRecord::airway(from, airway_id, name, EdgeType::Victor));
}

/// Two victor airways between A (1) and E (5):
///
/// ```text
///            B (2)
///   V1    /       \    V1
/// A (1)                E (5)
///    \ C (3) -- D (4) /
///            V2
/// ```
///
/// V2 through C and D is the shorter one.
pub fn two_airways() -> RouteNetwork {
    two_airways_restricted(None, None)
}

/// [`two_airways`] with altitude bands on the V2 segments A to C and C to D.
pub fn two_airways_restricted(
    a_to_c: Option<(i32, i32)>,
    c_to_d: Option<(i32, i32)>,
) -> RouteNetwork {
    let mut builder = NetworkBuilder::new(DataSource::Airway).with_config(tight_config());
    let nodes = [
        (1, Pos::new(0.0, 0.0)),
        (2, Pos::new(1.0, 0.5)),
        (3, Pos::new(0.66, -0.1)),
        (4, Pos::new(1.33, -0.1)),
        (5, Pos::new(2.0, 0.0)),
    ];
    for (id, pos) in nodes {
        builder
            .add_node(NodeRecord::waypoint(id, pos, Connections::VICTOR))
            .expect("valid node");
    }

    airway(&mut builder, 1, 2, 100, "V1");
    airway(&mut builder, 2, 5, 100, "V1");

    builder
        .add_edge(1, restricted(3, a_to_c))
        .add_edge(3, EdgeRecord::airway(1, 200, "V2", EdgeType::Victor))
        .add_edge(3, restricted(4, c_to_d))
        .add_edge(4, EdgeRecord::airway(3, 200, "V2", EdgeType::Victor));
    airway(&mut builder, 4, 5, 200, "V2");

    builder.build().expect("network builds")
}

fn restricted(to: i64, window: Option<(i32, i32)>) -> EdgeRecord {
    let record = EdgeRecord::airway(to, 200, "V2", EdgeType::Victor);
    match window {
        Some((min_alt_ft, max_alt_ft)) => record.with_altitude(min_alt_ft, max_alt_ft),
        None => record,
    }
}

/// Radio navaids between (0, 0) and (3, 0): an NDB on the direct line and a
/// VOR-DME slightly north of it.
pub fn radio_navaids() -> RouteNetwork {
    let mut builder = NetworkBuilder::new(DataSource::RadioNavaid);
    builder
        .add_node(NodeRecord::navaid(
            10,
            Pos::new(1.5, 0.0),
            NodeType::Ndb,
            200_000.0,
        ))
        .expect("ndb");
    builder
        .add_node(NodeRecord::navaid(
            20,
            Pos::new(1.5, 0.2),
            NodeType::VorDme,
            200_000.0,
        ))
        .expect("vor");
    builder.build().expect("network builds")
}

/// Two routes from A (1) to E (5). The northern one follows V1 through B (2).
/// The southern one through C (3) is slightly shorter and uses `first` to C
/// and `second` onwards to E:
///
/// ```text
///        B (2)
///   V1 /     \ V1
/// A (1)       E (5)
///      \     /
///       C (3) - C' (4)
/// ```
///
/// With `via_direct_hop` the `second` airway starts at C' (4), 55 m east of C,
/// which is only reachable by a generated hop.
pub fn crossing_airways(first: &str, second: &str, via_direct_hop: bool) -> RouteNetwork {
    let mut builder = NetworkBuilder::new(DataSource::Airway).with_config(tight_config());
    let nodes = [
        (1, Pos::new(0.0, 0.0)),
        (2, Pos::new(1.0, 0.3)),
        (3, Pos::new(1.0, -0.25)),
        (4, Pos::new(1.0005, -0.25)),
        (5, Pos::new(2.0, 0.0)),
    ];
    for (id, pos) in nodes {
        builder
            .add_node(NodeRecord::waypoint(id, pos, Connections::VICTOR))
            .expect("valid node");
    }

    airway(&mut builder, 1, 2, 100, "V1");
    airway(&mut builder, 2, 5, 100, "V1");
    airway(&mut builder, 1, 3, 300, first);
    let second_id = if first == second { 300 } else { 400 };
    let second_start = if via_direct_hop { 4 } else { 3 };
    airway(&mut builder, second_start, 5, second_id, second);

    builder.build().expect("network builds")
}
