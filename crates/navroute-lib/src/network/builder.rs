//! Bulk-load interface for populating a [`RouteNetwork`].
//!
//! Loaders hand over nodes keyed by their database id and outgoing edges
//! keyed by the id of their source node. [`NetworkBuilder::build`] resolves the
//! ids into arena references, validates the edges and rebuilds the spatial
//! index.

use std::collections::HashMap;

use tracing::info;

use crate::error::{Error, Result};
use crate::geo::{Point3D, Pos};

use super::types::{
    airway_hash, Connections, Edge, EdgeType, Node, NodeId, NodeRef, NodeType, RouteType,
    TrackDirection, MAX_ALTITUDE_FT,
};
use super::{DataSource, NetworkConfig, RouteNetwork};

/// Node as delivered by a data loader.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub pos: Pos,
    pub node_type: NodeType,
    pub subtype: NodeType,
    pub range_meter: f32,
    pub connections: Connections,
}

impl NodeRecord {
    /// Plain waypoint.
    pub fn waypoint(id: NodeId, pos: Pos, connections: Connections) -> Self {
        Self {
            id,
            pos,
            node_type: NodeType::Waypoint,
            subtype: NodeType::None,
            range_meter: 0.0,
            connections,
        }
    }

    /// Radio navaid with a reception range.
    pub fn navaid(id: NodeId, pos: Pos, node_type: NodeType, range_meter: f32) -> Self {
        Self {
            id,
            pos,
            node_type,
            subtype: NodeType::None,
            range_meter,
            connections: Connections::empty(),
        }
    }

    pub fn with_subtype(mut self, subtype: NodeType) -> Self {
        self.subtype = subtype;
        self
    }
}

/// Outgoing edge as delivered by a data loader.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub to_id: NodeId,
    /// Length of the segment. Computed from the node positions when absent.
    pub length_meter: Option<f32>,
    pub airway_id: i64,
    pub airway_name: String,
    pub min_alt_ft: i32,
    pub max_alt_ft: i32,
    pub edge_type: EdgeType,
    pub route_type: RouteType,
}

impl EdgeRecord {
    /// Airway segment without altitude restrictions.
    pub fn airway(to_id: NodeId, airway_id: i64, airway_name: &str, edge_type: EdgeType) -> Self {
        Self {
            to_id,
            length_meter: None,
            airway_id,
            airway_name: airway_name.to_string(),
            min_alt_ft: 0,
            max_alt_ft: MAX_ALTITUDE_FT,
            edge_type,
            route_type: RouteType::Conventional,
        }
    }

    pub fn with_altitude(mut self, min_alt_ft: i32, max_alt_ft: i32) -> Self {
        self.min_alt_ft = min_alt_ft;
        self.max_alt_ft = max_alt_ft;
        self
    }

    pub fn with_length(mut self, length_meter: f32) -> Self {
        self.length_meter = Some(length_meter);
        self
    }

    pub fn with_route_type(mut self, route_type: RouteType) -> Self {
        self.route_type = route_type;
        self
    }
}

/// Collects nodes and edges and turns them into a [`RouteNetwork`].
#[derive(Debug)]
pub struct NetworkBuilder {
    source: DataSource,
    config: NetworkConfig,
    nodes: Vec<NodeRecord>,
    id_to_index: HashMap<NodeId, usize>,
    edges: Vec<(NodeId, EdgeRecord)>,
    alt_levels_east: HashMap<i64, Vec<u16>>,
    alt_levels_west: HashMap<i64, Vec<u16>>,
}

impl NetworkBuilder {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            config: NetworkConfig::for_source(source),
            nodes: Vec::new(),
            id_to_index: HashMap::new(),
            edges: Vec::new(),
            alt_levels_east: HashMap::new(),
            alt_levels_west: HashMap::new(),
        }
    }

    pub fn with_config(mut self, config: NetworkConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a node. Ids must be unique and positions valid.
    pub fn add_node(&mut self, record: NodeRecord) -> Result<&mut Self> {
        if self.id_to_index.contains_key(&record.id) {
            return Err(Error::DuplicateNode { id: record.id });
        }
        if !record.pos.is_valid() {
            return Err(Error::InvalidNodePosition { id: record.id });
        }

        self.id_to_index.insert(record.id, self.nodes.len());
        self.nodes.push(record);
        Ok(self)
    }

    /// Add an outgoing edge of node `from_id`. Bidirectional airways need one
    /// edge per direction.
    pub fn add_edge(&mut self, from_id: NodeId, record: EdgeRecord) -> &mut Self {
        self.edges.push((from_id, record));
        self
    }

    /// Register the allowed flight levels of a track.
    pub fn add_track_levels(
        &mut self,
        track_id: i64,
        direction: TrackDirection,
        flight_levels: Vec<u16>,
    ) -> &mut Self {
        let table = match direction {
            TrackDirection::East => &mut self.alt_levels_east,
            TrackDirection::West => &mut self.alt_levels_west,
        };
        table.insert(track_id, flight_levels);
        self
    }

    /// Resolve all edges and build the network including its spatial index.
    pub fn build(self) -> Result<RouteNetwork> {
        let mut nodes: Vec<Node> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, record)| Node {
                node_ref: NodeRef::Graph(index),
                id: record.id,
                pos: Point3D::from(record.pos),
                range_meter: record.range_meter,
                node_type: record.node_type,
                subtype: record.subtype,
                connections: record.connections,
                edges: Vec::new(),
            })
            .collect();

        let edge_count = self.edges.len();
        for (from_id, record) in self.edges {
            let from = *self
                .id_to_index
                .get(&from_id)
                .ok_or(Error::UnknownNode { id: from_id })?;
            let to = *self
                .id_to_index
                .get(&record.to_id)
                .ok_or(Error::UnknownNode { id: record.to_id })?;

            let invalid = |message: &str| Error::InvalidEdge {
                from: from_id,
                to: record.to_id,
                message: message.to_string(),
            };

            if record.min_alt_ft > record.max_alt_ft {
                return Err(invalid("minimum altitude above maximum altitude"));
            }

            let length_meter = match record.length_meter {
                Some(length) => length,
                None => nodes[from].pos.gc_distance_meter(&nodes[to].pos),
            };
            if !length_meter.is_finite() || length_meter < 0.0 {
                return Err(invalid("length must be a non-negative number"));
            }

            let has_alt_levels = record.edge_type == EdgeType::Track
                && (self.alt_levels_east.contains_key(&record.airway_id)
                    || self.alt_levels_west.contains_key(&record.airway_id));

            nodes[from].edges.push(Edge {
                to: NodeRef::Graph(to),
                length_meter,
                id: record.airway_id,
                airway_hash: airway_hash(&record.airway_name),
                min_alt_ft: record.min_alt_ft,
                max_alt_ft: record.max_alt_ft,
                edge_type: record.edge_type,
                route_type: record.route_type,
                has_alt_levels,
            });
        }

        info!(
            source = ?self.source,
            nodes = nodes.len(),
            edges = edge_count,
            tracks_with_levels = self.alt_levels_east.len() + self.alt_levels_west.len(),
            "built route network"
        );

        let mut network = RouteNetwork::with_config(self.source, self.config);
        network.load(nodes, self.alt_levels_east, self.alt_levels_west);
        Ok(network)
    }
}
