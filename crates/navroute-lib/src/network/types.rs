//! Node, edge and mode types of the route network.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geo::Point3D;
use crate::spatial::Positioned;

/// Database identifier of a navaid or waypoint.
pub type NodeId = i64;

/// Highest altitude an unrestricted edge allows.
pub const MAX_ALTITUDE_FT: i32 = i32::MAX;

/// Reference to a node within one search session.
///
/// Graph nodes are addressed by their position in the network arena. The
/// departure and destination nodes only exist while routing parameters are
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Graph(usize),
    Departure,
    Destination,
    Invalid,
}

impl NodeRef {
    pub fn is_valid(self) -> bool {
        self != NodeRef::Invalid
    }

    pub fn is_virtual(self) -> bool {
        matches!(self, NodeRef::Departure | NodeRef::Destination)
    }
}

/// Kind of a node. Also used as subtype to remember the navaid an airway
/// waypoint is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    #[default]
    None,
    Vor,
    VorDme,
    Dme,
    Ndb,
    Waypoint,
    Departure,
    Destination,
}

impl NodeType {
    /// VOR, VOR-DME or DME.
    pub fn is_vor(self) -> bool {
        matches!(self, NodeType::Vor | NodeType::VorDme | NodeType::Dme)
    }

    pub fn is_ndb(self) -> bool {
        self == NodeType::Ndb
    }
}

bitflags! {
    /// Airway and procedure membership of a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Connections: u8 {
        const VICTOR = 0b0000_0001;
        const JET = 0b0000_0010;
        const TRACK = 0b0000_0100;
        /// First or last waypoint of a track.
        const TRACK_START_END = 0b0000_1000;
        const PROCEDURE = 0b0001_0000;
    }
}

bitflags! {
    /// Routing modes selecting which nodes and edges a search may use.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modes: u16 {
        const RADIO_VOR = 0b0000_0000_0001;
        const RADIO_NDB = 0b0000_0000_0010;
        /// Plain waypoints may be used for direct hops.
        const WAYPOINT = 0b0000_0000_0100;
        const VICTOR = 0b0000_0000_1000;
        const JET = 0b0000_0001_0000;
        /// Exclude airways that are flyable with RNAV equipment only.
        const NO_RNAV = 0b0000_0010_0000;
        const TRACK = 0b0000_0100_0000;
        /// Ignore airways and hop directly between waypoints.
        const POINT_TO_POINT = 0b0000_1000_0000;

        const RADIO = Self::RADIO_VOR.bits() | Self::RADIO_NDB.bits();
        const AIRWAY = Self::VICTOR.bits() | Self::JET.bits();
        const AIRWAY_WAYPOINT = Self::AIRWAY.bits() | Self::WAYPOINT.bits();
        const AIRWAY_TRACK = Self::AIRWAY.bits() | Self::TRACK.bits();
    }
}

/// Classification of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Generated direct hop between two nodes.
    #[default]
    None,
    Victor,
    Jet,
    /// Airway that is both low and high altitude.
    Both,
    Track,
}

/// Equipment requirement of an airway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    #[default]
    None,
    Rnav,
    Conventional,
    Both,
}

/// Direction a track is flown in. Selects the altitude level table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackDirection {
    East,
    West,
}

/// Directed edge. The source node is the node owning the edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: NodeRef,
    pub length_meter: f32,
    /// Airway or track id, 0 for generated edges.
    pub id: i64,
    /// Hash of the airway or track name, 0 for generated edges.
    pub airway_hash: u32,
    pub min_alt_ft: i32,
    pub max_alt_ft: i32,
    pub edge_type: EdgeType,
    pub route_type: RouteType,
    /// Track with per direction altitude levels.
    pub has_alt_levels: bool,
}

impl Edge {
    /// Generated direct hop without airway or altitude restrictions.
    pub fn direct(to: NodeRef, length_meter: f32) -> Self {
        Self {
            to,
            length_meter,
            id: 0,
            airway_hash: 0,
            min_alt_ft: 0,
            max_alt_ft: MAX_ALTITUDE_FT,
            edge_type: EdgeType::None,
            route_type: RouteType::None,
            has_alt_levels: false,
        }
    }

    /// Airway or track edge as opposed to a generated hop.
    pub fn is_airway(&self) -> bool {
        self.edge_type != EdgeType::None
    }

    pub fn is_track(&self) -> bool {
        self.edge_type == EdgeType::Track
    }
}

/// Stable hash of an airway or track name. Never returns 0.
pub fn airway_hash(name: &str) -> u32 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    let hash = hasher.finish();
    ((hash >> 32) as u32 ^ hash as u32).max(1)
}

/// Navaid, waypoint or virtual departure/destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub node_ref: NodeRef,
    pub id: NodeId,
    pub pos: Point3D,
    /// Reception range of radio navaids, 0 otherwise.
    pub range_meter: f32,
    pub node_type: NodeType,
    pub subtype: NodeType,
    pub connections: Connections,
    pub edges: Vec<Edge>,
}

impl Node {
    pub(crate) const INVALID: Node = Node {
        node_ref: NodeRef::Invalid,
        id: -1,
        pos: Point3D {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        },
        range_meter: 0.0,
        node_type: NodeType::None,
        subtype: NodeType::None,
        connections: Connections::empty(),
        edges: Vec::new(),
    };

    /// Departure or destination node for the given position.
    pub(crate) fn virtual_node(node_ref: NodeRef, pos: Point3D) -> Self {
        let node_type = match node_ref {
            NodeRef::Departure => NodeType::Departure,
            NodeRef::Destination => NodeType::Destination,
            _ => NodeType::None,
        };
        Self {
            node_ref,
            id: -1,
            pos,
            node_type,
            ..Self::INVALID
        }
    }

    pub fn is_valid(&self) -> bool {
        self.node_ref.is_valid()
    }

    pub fn is_virtual(&self) -> bool {
        self.node_ref.is_virtual()
    }

    pub fn is_track_endpoint(&self) -> bool {
        self.connections.contains(Connections::TRACK_START_END)
    }

    /// Navaid kind of this node, looking through airway waypoints.
    pub fn navaid_type(&self) -> NodeType {
        if self.node_type == NodeType::Waypoint {
            self.subtype
        } else {
            self.node_type
        }
    }
}

impl Positioned for Node {
    fn position(&self) -> Point3D {
        self.pos
    }
}

/// Candidate successors produced by one neighbour generation call.
///
/// `nodes` and `edges` are parallel. The buffers are reused across
/// expansions.
#[derive(Debug, Clone, Default)]
pub struct Neighbours {
    pub nodes: Vec<NodeRef>,
    pub edges: Vec<Edge>,
}

impl Neighbours {
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn push(&mut self, node: NodeRef, edge: Edge) {
        self.nodes.push(node);
        self.edges.push(edge);
    }

    pub fn remove(&mut self, index: usize) {
        self.nodes.remove(index);
        self.edges.remove(index);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeRef) -> bool {
        self.nodes.contains(&node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &Edge)> + '_ {
        self.nodes.iter().copied().zip(self.edges.iter())
    }
}
