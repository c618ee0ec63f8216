//! A* route search over a [`RouteNetwork`].
//!
//! The open set is a [`Heap`] keyed by accumulated cost plus the chord
//! distance to the destination. Edge costs start at the edge length and are
//! scaled by the factors below, which decide which routes are preferred.
//!
//! Search state lives in a single arena of [`NodeState`] entries, one per
//! graph node plus one each for the virtual departure and destination nodes.
//! It is kept after the search so that [`RouteFinder::extract_legs`] can walk
//! the predecessor chain, and replaced by the next call to
//! [`RouteFinder::calculate_route`].

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::geo::{meter_to_nm, nm_to_meter, Pos};
use crate::heap::Heap;
use crate::network::{
    DataSource, Edge, EdgeType, Modes, Neighbours, Node, NodeId, NodeRef, NodeType,
    RouteNetwork, MAX_ALTITUDE_FT,
};

/// Avoid the direct connection from departure to destination.
const COST_FACTOR_DIRECT: f32 = 2.0;

/// Favor close waypoints when entering or leaving the airway network.
const COST_FACTOR_FORCE_CLOSE_NODES: f32 = 1.5;

/// Transition through a VOR when VOR transitions are preferred.
const COST_FACTOR_FORCE_CLOSE_RADIONAV_VOR: f32 = 1.2;

/// Transition through an NDB when NDB transitions are preferred.
const COST_FACTOR_FORCE_CLOSE_RADIONAV_NDB: f32 = 1.5;

/// Transition through any other node when radio navaid transitions are preferred.
const COST_FACTOR_FORCE_CLOSE_RADIONAV_OTHER: f32 = 2.0;

/// Additional factor for generated hops longer than [`LONG_DIRECT_NM`].
const COST_FACTOR_LONG_DIRECT: f32 = 1.2;

/// Additional factor for generated hops shorter than [`SHORT_DIRECT_NM`].
const COST_FACTOR_SHORT_DIRECT: f32 = 0.8;

const LONG_DIRECT_NM: f32 = 300.0;
const SHORT_DIRECT_NM: f32 = 25.0;

/// Prefer tracks when track routing is enabled.
const COST_FACTOR_TRACK: f32 = 0.8;

/// Radio navaid legs where neither station is likely to be received.
const COST_FACTOR_UNREACHABLE_RADIO: f32 = 2.0;

/// Avoid NDBs more than VORs.
const COST_FACTOR_NDB: f32 = 1.5;

/// Avoid VORs and DMEs without a co-located counterpart.
const COST_FACTOR_VOR: f32 = 1.2;

/// Changing from one airway or track to another.
const COST_FACTOR_AIRWAY_CHANGE: f32 = 1.2;

/// Default penalty for generated hops during airway routing.
pub const DEFAULT_FORCE_AIRWAYS: f32 = 1.3;

/// Minimum time between two progress callback invocations.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// Progress callback receiving the departure to destination distance and the
/// distance of the currently expanded node to the destination, both in meters.
/// Called after the first expansion and then at most every 200 ms. Returning
/// `false` aborts the search.
pub type ProgressCallback<'a> = Box<dyn FnMut(f32, f32) -> bool + 'a>;

/// Cost model settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Prefer VORs when entering or leaving the airway network.
    pub prefer_vor_transition: bool,
    /// Prefer NDBs when entering or leaving the airway network.
    pub prefer_ndb_transition: bool,
    /// Cost factor for generated hops while routing on airways.
    pub force_airways: f32,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            prefer_vor_transition: false,
            prefer_ndb_transition: false,
            force_airways: DEFAULT_FORCE_AIRWAYS,
        }
    }
}

/// Result of the last search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    #[default]
    NotSearched,
    Found,
    NotFound,
    Aborted,
}

/// One leg of a calculated route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    pub nav_id: NodeId,
    /// Airway or track used to reach this node. `None` for direct legs.
    pub airway_id: Option<i64>,
    pub node_type: NodeType,
    pub pos: Pos,
}

/// Per node search state.
#[derive(Debug, Clone, Copy)]
struct NodeState {
    cost: f32,
    predecessor: NodeRef,
    predecessor_edge: Option<Edge>,
    closed: bool,
    /// Altitude window every airway on the path so far allows.
    min_alt_ft: i32,
    max_alt_ft: i32,
    /// Hash of the last airway or track on the path, 0 if none was used yet.
    airway_hash: u32,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            cost: f32::INFINITY,
            predecessor: NodeRef::Invalid,
            predecessor_edge: None,
            closed: false,
            min_alt_ft: 0,
            max_alt_ft: MAX_ALTITUDE_FT,
            airway_hash: 0,
        }
    }
}

/// A* route finder. Runs one search at a time.
pub struct RouteFinder<'a> {
    network: &'a mut RouteNetwork,
    config: FinderConfig,
    progress: Option<ProgressCallback<'a>>,
    open: Heap<NodeRef>,
    states: Vec<NodeState>,
    graph_nodes: usize,
    neighbours: Neighbours,
    outcome: SearchOutcome,
    expanded: usize,
}

impl<'a> RouteFinder<'a> {
    pub fn new(network: &'a mut RouteNetwork) -> Self {
        Self::with_config(network, FinderConfig::default())
    }

    pub fn with_config(network: &'a mut RouteNetwork, config: FinderConfig) -> Self {
        Self {
            network,
            config,
            progress: None,
            open: Heap::new(),
            states: Vec::new(),
            graph_nodes: 0,
            neighbours: Neighbours::default(),
            outcome: SearchOutcome::NotSearched,
            expanded: 0,
        }
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: FinderConfig) {
        self.config = config;
    }

    pub fn set_progress_callback<F>(&mut self, callback: F)
    where
        F: FnMut(f32, f32) -> bool + 'a,
    {
        self.progress = Some(Box::new(callback));
    }

    pub fn clear_progress_callback(&mut self) {
        self.progress = None;
    }

    pub fn network(&self) -> &RouteNetwork {
        &*self.network
    }

    pub fn outcome(&self) -> SearchOutcome {
        self.outcome
    }

    /// Number of nodes expanded by the last search.
    pub fn expanded_nodes(&self) -> usize {
        self.expanded
    }

    /// Search a route. Returns `true` if the destination was reached.
    pub fn calculate_route(
        &mut self,
        from: Pos,
        to: Pos,
        altitude_ft: i32,
        modes: Modes,
    ) -> bool {
        self.network.set_parameters(from, to, altitude_ft, modes);
        self.reset();

        self.outcome = self.search();
        self.outcome == SearchOutcome::Found
    }

    /// Allocate fresh search state for the current network.
    fn reset(&mut self) {
        self.graph_nodes = self.network.node_count();
        self.states.clear();
        self.states.resize(self.graph_nodes + 2, NodeState::default());
        self.open.clear();
        self.neighbours.clear();
        self.expanded = 0;
        self.outcome = SearchOutcome::NotSearched;
    }

    fn search(&mut self) -> SearchOutcome {
        if !self.network.is_loaded() {
            warn!("route network is not loaded");
            return SearchOutcome::NotFound;
        }

        let departure_pos = self.network.departure_node().pos;
        let dest_pos = self.network.destination_node().pos;
        if !departure_pos.is_valid() || !dest_pos.is_valid() {
            warn!("departure or destination position is invalid");
            return SearchOutcome::NotFound;
        }

        let total_distance = departure_pos.direct_distance_meter(&dest_pos);
        let start = Instant::now();
        let mut last_report: Option<Instant> = None;

        if let Some(slot) = slot(self.graph_nodes, NodeRef::Departure) {
            self.states[slot].cost = 0.0;
        }
        self.open.push(NodeRef::Departure, total_distance);

        let mut outcome = SearchOutcome::NotFound;
        while let Some(current) = self.open.pop() {
            if current == NodeRef::Destination {
                outcome = SearchOutcome::Found;
                break;
            }

            if let Some(current_slot) = slot(self.graph_nodes, current) {
                self.states[current_slot].closed = true;
            }

            self.expand_node(current);
            self.expanded += 1;

            if let Some(progress) = self.progress.as_mut() {
                if last_report.map_or(true, |last| last.elapsed() >= PROGRESS_INTERVAL) {
                    last_report = Some(Instant::now());
                    let current_distance = self
                        .network
                        .node(current)
                        .pos
                        .direct_distance_meter(&dest_pos);
                    if !progress(total_distance, current_distance) {
                        outcome = SearchOutcome::Aborted;
                        break;
                    }
                }
            }
        }

        info!(
            outcome = ?outcome,
            expanded = self.expanded,
            open = self.open.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            distance_nm = meter_to_nm(self.network.gc_distance_meter()),
            "route search finished"
        );
        outcome
    }

    /// Push or update the successors of `current`.
    fn expand_node(&mut self, current: NodeRef) {
        let Some(current_slot) = slot(self.graph_nodes, current) else {
            return;
        };
        let current_state = self.states[current_slot];

        let network = &*self.network;
        let current_node = network.node(current);
        network.neighbours(
            &mut self.neighbours,
            current_node,
            current_state.predecessor_edge.as_ref(),
        );
        let dest_pos = network.destination_node().pos;

        for i in 0..self.neighbours.len() {
            let successor = self.neighbours.nodes[i];
            let edge = self.neighbours.edges[i];

            let Some(successor_slot) = slot(self.graph_nodes, successor) else {
                continue;
            };
            if self.states[successor_slot].closed {
                continue;
            }

            let successor_node = network.node(successor);
            let mut cost = edge_cost(network, &self.config, current_node, successor_node, &edge);

            if edge.airway_hash != 0
                && current_state.airway_hash != 0
                && edge.airway_hash != current_state.airway_hash
            {
                cost *= COST_FACTOR_AIRWAY_CHANGE;
            }

            let min_alt_ft = current_state.min_alt_ft.max(edge.min_alt_ft);
            let max_alt_ft = current_state.max_alt_ft.min(edge.max_alt_ft);
            if min_alt_ft > max_alt_ft {
                trace!(?successor, "altitude window of path is empty");
                continue;
            }

            let successor_cost = current_state.cost + cost;
            if !successor_cost.is_finite() {
                continue;
            }

            let queued = self.open.contains(&successor);
            if queued && successor_cost >= self.states[successor_slot].cost {
                continue;
            }

            self.states[successor_slot] = NodeState {
                cost: successor_cost,
                predecessor: current,
                predecessor_edge: Some(edge),
                closed: false,
                min_alt_ft,
                max_alt_ft,
                airway_hash: if edge.airway_hash != 0 {
                    edge.airway_hash
                } else {
                    current_state.airway_hash
                },
            };

            let estimate = successor_cost + successor_node.pos.direct_distance_meter(&dest_pos);
            if queued {
                self.open.change(&successor, estimate);
            } else {
                self.open.push(successor, estimate);
            }
        }
    }

    /// Legs of the last found route in departure to destination order and the
    /// total great-circle distance in meters.
    ///
    /// Returns an empty list if the last search did not find a route.
    pub fn extract_legs(&self) -> (Vec<RouteLeg>, f32) {
        if self.outcome != SearchOutcome::Found {
            debug!(outcome = ?self.outcome, "no route to extract");
            return (Vec::new(), 0.0);
        }

        let network = &*self.network;
        let mut legs = Vec::new();
        let mut distance_meter = 0.0;
        let mut current = NodeRef::Destination;

        // Bounded by the number of states to guard against broken chains
        for _ in 0..self.states.len() {
            let Some(current_slot) = slot(self.graph_nodes, current) else {
                break;
            };
            let state = &self.states[current_slot];
            let node = network.node(current);
            let predecessor = network.node(state.predecessor);

            if predecessor.is_valid() {
                distance_meter += predecessor.pos.gc_distance_meter(&node.pos);
            }

            if !node.is_virtual() {
                legs.push(RouteLeg {
                    nav_id: node.id,
                    airway_id: state
                        .predecessor_edge
                        .filter(Edge::is_airway)
                        .map(|edge| edge.id),
                    node_type: node.node_type,
                    pos: node.pos.to_pos().unwrap_or(Pos::new(0.0, 0.0)),
                });
            }

            if state.predecessor == NodeRef::Departure || !predecessor.is_valid() {
                break;
            }
            current = state.predecessor;
        }

        legs.reverse();
        (legs, distance_meter)
    }
}

/// Arena slot of a node reference. Graph nodes come first, followed by the
/// departure and destination.
fn slot(graph_nodes: usize, node_ref: NodeRef) -> Option<usize> {
    match node_ref {
        NodeRef::Graph(index) if index < graph_nodes => Some(index),
        NodeRef::Graph(_) | NodeRef::Invalid => None,
        NodeRef::Departure => Some(graph_nodes),
        NodeRef::Destination => Some(graph_nodes + 1),
    }
}

/// Cost of traversing `edge` from `current` to `successor`.
fn edge_cost(
    network: &RouteNetwork,
    config: &FinderConfig,
    current: &Node,
    successor: &Node,
    edge: &Edge,
) -> f32 {
    let mut cost = edge.length_meter;

    let from_departure = current.node_type == NodeType::Departure;
    let to_destination = successor.node_type == NodeType::Destination;

    if from_departure && to_destination {
        cost *= COST_FACTOR_DIRECT;
    }

    match network.data_source() {
        DataSource::Airway if network.is_airway_routing() => {
            if from_departure != to_destination {
                // Entering or leaving the airway network
                let transition = if from_departure { successor } else { current };
                cost *= transition_factor(config, transition);
            }

            if edge.edge_type == EdgeType::None {
                cost *= config.force_airways;
                if edge.length_meter > nm_to_meter(LONG_DIRECT_NM) {
                    cost *= COST_FACTOR_LONG_DIRECT;
                } else if edge.length_meter < nm_to_meter(SHORT_DIRECT_NM) {
                    cost *= COST_FACTOR_SHORT_DIRECT;
                }
            } else if edge.is_track() && network.modes().contains(Modes::TRACK) {
                cost *= COST_FACTOR_TRACK;
            }
        }
        DataSource::Airway => {}
        DataSource::RadioNavaid => {
            if current.range_meter + successor.range_meter < edge.length_meter {
                cost *= COST_FACTOR_UNREACHABLE_RADIO;
            }

            match successor.node_type {
                NodeType::Ndb => cost *= COST_FACTOR_NDB,
                NodeType::Vor | NodeType::Dme => cost *= COST_FACTOR_VOR,
                _ => {}
            }
        }
    }

    cost
}

fn transition_factor(config: &FinderConfig, transition: &Node) -> f32 {
    if !config.prefer_vor_transition && !config.prefer_ndb_transition {
        return COST_FACTOR_FORCE_CLOSE_NODES;
    }

    let navaid = transition.navaid_type();
    if config.prefer_vor_transition && navaid.is_vor() {
        COST_FACTOR_FORCE_CLOSE_RADIONAV_VOR
    } else if config.prefer_ndb_transition && navaid.is_ndb() {
        COST_FACTOR_FORCE_CLOSE_RADIONAV_NDB
    } else {
        COST_FACTOR_FORCE_CLOSE_RADIONAV_OTHER
    }
}
