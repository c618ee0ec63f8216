use criterion::{criterion_group, criterion_main, Criterion};
use navroute_lib::{
    plan_route, Connections, DataSource, EdgeRecord, EdgeType, Modes, NetworkBuilder, NodeRecord,
    Pos, RouteNetwork, RouteRequest,
};
use once_cell::sync::Lazy;
use std::hint::black_box;

const GRID: i64 = 40;
const SPACING_DEG: f32 = 0.2;

static AIRWAY_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    RouteRequest::new(Pos::new(0.01, 0.01), Pos::new(7.79, 7.79)).with_modes(Modes::VICTOR)
});
static WAYPOINT_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    RouteRequest::new(Pos::new(0.01, 0.01), Pos::new(7.79, 7.79)).with_modes(Modes::WAYPOINT)
});

fn node_id(row: i64, col: i64) -> i64 {
    row * 1000 + col
}

/// Square grid of waypoints joined by victor airways along rows and columns.
fn grid_network() -> RouteNetwork {
    let mut builder = NetworkBuilder::new(DataSource::Airway);
    for row in 0..GRID {
        for col in 0..GRID {
            let pos = Pos::new(col as f32 * SPACING_DEG, row as f32 * SPACING_DEG);
            builder
                .add_node(NodeRecord::waypoint(node_id(row, col), pos, Connections::VICTOR))
                .expect("grid node");
        }
    }

    for row in 0..GRID {
        for col in 0..GRID {
            let from = node_id(row, col);
            let mut link = |to: i64, airway_id: i64| {
                let name = format!("V{airway_id}");
                builder
                    .add_edge(from, EdgeRecord::airway(to, airway_id, &name, EdgeType::Victor))
                    .add_edge(to, EdgeRecord::airway(from, airway_id, &name, EdgeType::Victor));
            };
            if col + 1 < GRID {
                link(node_id(row, col + 1), row);
            }
            if row + 1 < GRID {
                link(node_id(row + 1, col), 1000 + col);
            }
        }
    }

    builder.build().expect("grid network builds")
}

fn benchmark_routing(c: &mut Criterion) {
    let mut network = grid_network();

    c.bench_function("airway_grid_diagonal", |b| {
        let request = &*AIRWAY_REQUEST;
        b.iter(|| {
            let plan = plan_route(&mut network, request).expect("route exists");
            black_box(plan.legs.len())
        });
    });

    c.bench_function("waypoint_grid_diagonal", |b| {
        let request = &*WAYPOINT_REQUEST;
        b.iter(|| {
            let plan = plan_route(&mut network, request).expect("route exists");
            black_box(plan.distance_nm)
        });
    });
}

criterion_group!(benches, benchmark_routing);
criterion_main!(benches);
