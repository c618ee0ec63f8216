//! Aeronautical route network and successor generation.
//!
//! This module provides:
//! - [`RouteNetwork`] - nodes, directed edges and the routing parameters
//! - [`RouteNetwork::neighbours`] - successor generation for the search
//! - [`NetworkBuilder`] - bulk-load interface used by data loaders
//! - [`NetworkConfig`] - search radii and detour factors
//!
//! # Successor Generation
//!
//! Successors are only generated towards the destination. Every candidate
//! must be closer to the destination than the node being expanded and must
//! not exceed a detour bound relative to the remaining straight line
//! distance. On the airway network stored airway and track edges are tried
//! first; a radius search over waypoints fills in when the airway network is
//! sparse or when leaving the departure. On the radio navaid network only the
//! radius search is used.

mod builder;
mod types;

pub use builder::{EdgeRecord, NetworkBuilder, NodeRecord};
pub use types::{
    airway_hash, Connections, Edge, EdgeType, Modes, Neighbours, Node, NodeId, NodeRef, NodeType,
    RouteType, TrackDirection, MAX_ALTITUDE_FT,
};

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geo::{nm_to_meter, Point3D, Pos};
use crate::spatial::SpatialIndex;

static INVALID_NODE: Node = Node::INVALID;

/// Distance slack when checking that a radius search candidate lies ahead.
const AHEAD_SLACK_METER: f32 = 100.0;

/// Larger slack for the first hop of radio navaid routes so that navaids
/// slightly behind the departure can still be used.
const AHEAD_SLACK_RADIO_DEPARTURE_METER: f32 = 4000.0;

/// The radius search is repeated with a wider radius below this number of
/// candidates.
const MIN_NEAREST_RESULTS: usize = 6;

/// Which kind of navigation data the network was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Airways, tracks and waypoints.
    Airway,
    /// VOR, DME and NDB stations.
    RadioNavaid,
}

/// Search radii and detour factors for successor generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub min_nearest_distance_radio_meter: f32,
    pub max_nearest_distance_radio_meter: f32,
    pub min_nearest_distance_wp_meter: f32,
    pub max_nearest_distance_wp_meter: f32,
    /// Nodes closer than this to the destination get a direct edge to it.
    pub nearest_dest_distance_meter: f32,
    pub direct_distance_factor_airway: f32,
    pub direct_distance_factor_radio: f32,
    pub direct_distance_factor_wp: f32,
}

impl NetworkConfig {
    /// Defaults for the airway and waypoint network.
    pub fn airway() -> Self {
        Self {
            min_nearest_distance_radio_meter: nm_to_meter(20.0),
            max_nearest_distance_radio_meter: nm_to_meter(200.0),
            min_nearest_distance_wp_meter: nm_to_meter(5.0),
            max_nearest_distance_wp_meter: nm_to_meter(100.0),
            nearest_dest_distance_meter: nm_to_meter(100.0),
            direct_distance_factor_airway: 1.2,
            direct_distance_factor_radio: 1.2,
            direct_distance_factor_wp: 1.05,
        }
    }

    /// Defaults for the radio navaid network.
    pub fn radio() -> Self {
        Self {
            nearest_dest_distance_meter: nm_to_meter(200.0),
            ..Self::airway()
        }
    }

    pub fn for_source(source: DataSource) -> Self {
        match source {
            DataSource::Airway => Self::airway(),
            DataSource::RadioNavaid => Self::radio(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::airway()
    }
}

/// Route network holding all nodes and edges plus the per search parameters.
#[derive(Debug)]
pub struct RouteNetwork {
    source: DataSource,
    config: NetworkConfig,
    index: SpatialIndex<Node>,
    /// Allowed flight levels of eastbound tracks keyed by track id.
    alt_levels_east: HashMap<i64, Vec<u16>>,
    /// Allowed flight levels of westbound tracks keyed by track id.
    alt_levels_west: HashMap<i64, Vec<u16>>,
    departure: Node,
    destination: Node,
    altitude_ft: i32,
    modes: Modes,
    direct_distance_meter: f32,
    gc_distance_meter: f32,
}

impl RouteNetwork {
    /// Create an empty network.
    pub fn new(source: DataSource) -> Self {
        Self::with_config(source, NetworkConfig::for_source(source))
    }

    pub fn with_config(source: DataSource, config: NetworkConfig) -> Self {
        Self {
            source,
            config,
            index: SpatialIndex::new(),
            alt_levels_east: HashMap::new(),
            alt_levels_west: HashMap::new(),
            departure: Node::INVALID,
            destination: Node::INVALID,
            altitude_ft: 0,
            modes: Modes::empty(),
            direct_distance_meter: 0.0,
            gc_distance_meter: 0.0,
        }
    }

    /// Replace the node set. Indexes are rewritten to match the arena
    /// positions and the spatial index is rebuilt.
    pub(crate) fn load(
        &mut self,
        nodes: Vec<Node>,
        alt_levels_east: HashMap<i64, Vec<u16>>,
        alt_levels_west: HashMap<i64, Vec<u16>>,
    ) {
        self.clear();
        {
            let items = self.index.items_mut();
            items.extend(nodes);
            for (index, node) in items.iter_mut().enumerate() {
                node.node_ref = NodeRef::Graph(index);
            }
        }
        self.alt_levels_east = alt_levels_east;
        self.alt_levels_west = alt_levels_west;
        self.update_index();
    }

    /// Rebuild the spatial index after the node set changed.
    pub fn update_index(&mut self) {
        self.index.update_index();
    }

    /// Drop all nodes, edges and parameters.
    pub fn clear(&mut self) {
        self.index.clear();
        self.alt_levels_east.clear();
        self.alt_levels_west.clear();
        self.clear_parameters();
    }

    /// Set departure, destination, cruise altitude and routing modes.
    ///
    /// Creates the virtual departure and destination nodes. Invalid positions
    /// produce invalid points which never match during the search.
    pub fn set_parameters(
        &mut self,
        departure: Pos,
        destination: Pos,
        altitude_ft: i32,
        modes: Modes,
    ) {
        if !departure.is_valid() || !destination.is_valid() {
            warn!(?departure, ?destination, "route parameters contain invalid positions");
        }

        self.departure = Node::virtual_node(NodeRef::Departure, Point3D::from(departure));
        self.destination = Node::virtual_node(NodeRef::Destination, Point3D::from(destination));
        self.altitude_ft = altitude_ft;
        self.modes = modes;

        if self.departure.pos.is_valid() && self.destination.pos.is_valid() {
            self.direct_distance_meter = self
                .departure
                .pos
                .direct_distance_meter(&self.destination.pos);
            self.gc_distance_meter = self.departure.pos.gc_distance_meter(&self.destination.pos);
        } else {
            self.direct_distance_meter = 0.0;
            self.gc_distance_meter = 0.0;
        }

        debug!(
            altitude_ft,
            modes = ?modes,
            gc_distance_meter = self.gc_distance_meter,
            "route parameters set"
        );
    }

    /// Remove departure and destination.
    pub fn clear_parameters(&mut self) {
        self.departure = Node::INVALID;
        self.destination = Node::INVALID;
        self.altitude_ft = 0;
        self.modes = Modes::empty();
        self.direct_distance_meter = 0.0;
        self.gc_distance_meter = 0.0;
    }

    pub fn is_loaded(&self) -> bool {
        !self.index.is_empty()
    }

    pub fn has_parameters(&self) -> bool {
        self.departure.is_valid() && self.destination.is_valid()
    }

    pub fn data_source(&self) -> DataSource {
        self.source
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: NetworkConfig) {
        self.config = config;
    }

    pub fn modes(&self) -> Modes {
        self.modes
    }

    pub fn altitude_ft(&self) -> i32 {
        self.altitude_ft
    }

    /// Number of nodes loaded from the data source.
    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn nodes(&self) -> &[Node] {
        self.index.items()
    }

    /// Resolve a node reference. Unknown references resolve to an invalid node.
    pub fn node(&self, node_ref: NodeRef) -> &Node {
        match node_ref {
            NodeRef::Graph(index) => self.index.get(index).unwrap_or(&INVALID_NODE),
            NodeRef::Departure => &self.departure,
            NodeRef::Destination => &self.destination,
            NodeRef::Invalid => &INVALID_NODE,
        }
    }

    pub fn departure_node(&self) -> &Node {
        &self.departure
    }

    pub fn destination_node(&self) -> &Node {
        &self.destination
    }

    /// Chord distance between departure and destination.
    pub fn direct_distance_meter(&self) -> f32 {
        self.direct_distance_meter
    }

    /// Great-circle distance between departure and destination.
    pub fn gc_distance_meter(&self) -> f32 {
        self.gc_distance_meter
    }

    /// Airway routing is active when the network holds airways and one of
    /// the airway or track modes is set.
    pub fn is_airway_routing(&self) -> bool {
        self.source == DataSource::Airway
            && self.modes.intersects(Modes::AIRWAY | Modes::TRACK)
            && !self.modes.contains(Modes::POINT_TO_POINT)
    }

    /// Generate the successors of `origin`.
    ///
    /// `prev_edge` is the edge the search used to reach `origin` and is used
    /// for the track continuity rules.
    pub fn neighbours(&self, result: &mut Neighbours, origin: &Node, prev_edge: Option<&Edge>) {
        result.clear();

        let dest_pos = self.destination.pos;
        let origin_to_dest = origin.pos.direct_distance_meter(&dest_pos);
        let mid_track = self.modes.contains(Modes::TRACK) && is_mid_track(origin, prev_edge);

        match self.source {
            DataSource::Airway => {
                self.airway_neighbours(result, origin, prev_edge, origin_to_dest);

                if result.len() < 2 || origin.node_type == NodeType::Departure {
                    let mut exclude: HashSet<NodeRef> = result.nodes.iter().copied().collect();
                    let found = result.len();
                    self.search_nearest(
                        result,
                        origin,
                        self.config.min_nearest_distance_wp_meter,
                        self.config.max_nearest_distance_wp_meter,
                        &exclude,
                    );

                    if result.len() < MIN_NEAREST_RESULTS {
                        exclude.extend(result.nodes[found..].iter().copied());
                        self.search_nearest(
                            result,
                            origin,
                            self.config.min_nearest_distance_wp_meter,
                            self.config.max_nearest_distance_wp_meter * 2.0,
                            &exclude,
                        );
                    }
                }

                if mid_track {
                    // Backwards so that removal does not shift unvisited entries
                    for i in (0..result.len()).rev() {
                        if breaks_track_continuity(origin, prev_edge, &result.edges[i]) {
                            result.remove(i);
                        }
                    }
                }
            }
            DataSource::RadioNavaid => {
                self.search_nearest(
                    result,
                    origin,
                    self.config.min_nearest_distance_radio_meter,
                    self.config.max_nearest_distance_radio_meter,
                    &HashSet::new(),
                );
            }
        }

        // Leaving a track in the middle is not allowed
        if origin.node_ref != NodeRef::Destination
            && origin_to_dest < self.config.nearest_dest_distance_meter
            && !mid_track
            && !result.contains(NodeRef::Destination)
        {
            let length = origin.pos.gc_distance_meter(&dest_pos);
            result.push(
                NodeRef::Destination,
                Edge::direct(NodeRef::Destination, length),
            );
        }
    }

    /// Stored airway and track edges of `origin` leading towards the destination.
    fn airway_neighbours(
        &self,
        result: &mut Neighbours,
        origin: &Node,
        prev_edge: Option<&Edge>,
        origin_to_dest: f32,
    ) {
        if self.modes.contains(Modes::POINT_TO_POINT) {
            return;
        }

        let dest_pos = self.destination.pos;
        let track_mode = self.modes.contains(Modes::TRACK);
        let max_detour = origin_to_dest * self.config.direct_distance_factor_airway;

        for edge in &origin.edges {
            if !self.match_edge(edge) {
                continue;
            }

            let successor = self.node(edge.to);
            if !successor.is_valid() || !self.match_node(successor) {
                continue;
            }

            if track_mode && breaks_track_continuity(origin, prev_edge, edge) {
                continue;
            }

            let successor_to_dest = successor.pos.direct_distance_meter(&dest_pos);
            if successor_to_dest < origin_to_dest
                && edge.length_meter + successor_to_dest <= max_detour
            {
                result.push(edge.to, *edge);
            }
        }
    }

    /// Append nodes found by a radius search around `origin`.
    ///
    /// Candidates must lie ahead of `origin`, must not exceed the detour
    /// bound and must not be closer than `min_distance_meter`. Nodes in
    /// `exclude` are skipped.
    pub fn search_nearest(
        &self,
        result: &mut Neighbours,
        origin: &Node,
        min_distance_meter: f32,
        max_distance_meter: f32,
        exclude: &HashSet<NodeRef>,
    ) {
        let dest_pos = self.destination.pos;
        let origin_to_dest = origin.pos.direct_distance_meter(&dest_pos);
        let radio = self.source == DataSource::RadioNavaid;
        let departure = origin.node_type == NodeType::Departure;

        let max_distance = if radio {
            max_distance_meter
        } else {
            max_distance_meter.min(origin_to_dest)
        };

        let min_distance = if radio && departure {
            0.0
        } else if departure {
            min_distance_meter / 2.0
        } else {
            min_distance_meter
        };

        let slack = if radio && departure {
            AHEAD_SLACK_RADIO_DEPARTURE_METER
        } else {
            AHEAD_SLACK_METER
        };

        let factor = if radio {
            self.config.direct_distance_factor_radio
        } else {
            self.config.direct_distance_factor_wp
        };
        let max_detour = origin_to_dest * factor;
        let nodes = self.index.items();

        let found = self
            .index
            .radius_filtered(&origin.pos, max_distance, |distance, index| {
                let node_ref = NodeRef::Graph(index);
                if node_ref == origin.node_ref || exclude.contains(&node_ref) {
                    return false;
                }
                if distance < min_distance {
                    return false;
                }

                let node = &nodes[index];
                if !self.match_node(node) {
                    return false;
                }

                let node_to_dest = node.pos.direct_distance_meter(&dest_pos);
                node_to_dest < origin_to_dest + slack && distance + node_to_dest <= max_detour
            });

        for (index, _) in found {
            let to = NodeRef::Graph(index);
            let length = origin.pos.gc_distance_meter(&nodes[index].pos);
            result.push(to, Edge::direct(to, length));
        }
    }

    /// Check whether a node can be used with the current modes.
    pub fn match_node(&self, node: &Node) -> bool {
        match node.node_type {
            NodeType::Departure | NodeType::Destination => return true,
            NodeType::None => return false,
            _ => {}
        }

        match self.source {
            DataSource::RadioNavaid => match node.node_type {
                NodeType::Vor | NodeType::VorDme | NodeType::Dme => {
                    self.modes.contains(Modes::RADIO_VOR)
                }
                NodeType::Ndb => self.modes.contains(Modes::RADIO_NDB),
                _ => false,
            },
            DataSource::Airway => {
                if self.modes.intersects(Modes::WAYPOINT | Modes::POINT_TO_POINT) {
                    return true;
                }
                let connections = node.connections;
                (self.modes.contains(Modes::VICTOR) && connections.contains(Connections::VICTOR))
                    || (self.modes.contains(Modes::JET) && connections.contains(Connections::JET))
                    || (self.modes.contains(Modes::TRACK) && connections.contains(Connections::TRACK))
            }
        }
    }

    /// Check whether an edge can be used with the current modes and altitude.
    pub fn match_edge(&self, edge: &Edge) -> bool {
        if !edge.is_airway() {
            return true;
        }
        if self.modes.contains(Modes::POINT_TO_POINT) {
            return false;
        }

        if self.altitude_ft > 0
            && (self.altitude_ft < edge.min_alt_ft || self.altitude_ft > edge.max_alt_ft)
        {
            return false;
        }

        if self.modes.contains(Modes::NO_RNAV) && edge.route_type == RouteType::Rnav {
            return false;
        }

        let type_matches = match edge.edge_type {
            EdgeType::Victor => self.modes.contains(Modes::VICTOR),
            EdgeType::Jet => self.modes.contains(Modes::JET),
            EdgeType::Both => self.modes.intersects(Modes::AIRWAY),
            EdgeType::Track => self.modes.contains(Modes::TRACK),
            EdgeType::None => true,
        };
        if !type_matches {
            return false;
        }

        if edge.has_alt_levels && self.altitude_ft > 0 {
            if let Some(levels) = self.track_levels(edge.id) {
                let flight_level = self.altitude_ft.saturating_add(50) / 100;
                return levels
                    .iter()
                    .any(|&level| i32::from(level) == flight_level);
            }
        }

        true
    }

    /// Flight levels of a track, looked up in the eastbound table first.
    pub fn track_levels(&self, track_id: i64) -> Option<&[u16]> {
        self.alt_levels_east
            .get(&track_id)
            .or_else(|| self.alt_levels_west.get(&track_id))
            .map(Vec::as_slice)
    }
}

/// `origin` was reached on a track and is not where the track starts or ends.
fn is_mid_track(origin: &Node, prev_edge: Option<&Edge>) -> bool {
    !origin.is_track_endpoint() && prev_edge.is_some_and(Edge::is_track)
}

/// Tracks can only be entered or left at their endpoints and a track cannot
/// be switched for another one in between.
fn breaks_track_continuity(origin: &Node, prev_edge: Option<&Edge>, edge: &Edge) -> bool {
    if origin.is_track_endpoint() {
        return false;
    }

    let prev_track = prev_edge.filter(|prev| prev.is_track());
    match (prev_track, edge.is_track()) {
        (Some(prev), true) => prev.airway_hash != edge.airway_hash,
        (Some(_), false) | (None, true) => true,
        (None, false) => false,
    }
}
