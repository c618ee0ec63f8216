//! Flight route finding library.
//!
//! This crate computes minimum-cost routes through an aeronautical navigation
//! network. Data loaders populate a [`RouteNetwork`] through the
//! [`NetworkBuilder`]; callers then either drive a [`RouteFinder`] directly or
//! use [`plan_route`] for a `Result` based interface.
//!
//! The search is an A* over airways, tracks, waypoints or radio navaids.
//! Successors are generated on the fly from the stored airway edges and from
//! radius queries against a KD-tree backed [`SpatialIndex`].

#![deny(warnings)]

pub mod error;
pub mod finder;
pub mod geo;
pub mod heap;
pub mod network;
pub mod routing;
pub mod spatial;

pub use error::{Error, Result};
pub use finder::{FinderConfig, ProgressCallback, RouteFinder, RouteLeg, SearchOutcome};
pub use geo::{meter_to_nm, nm_to_meter, Point3D, Pos};
pub use heap::Heap;
pub use network::{
    Connections, DataSource, Edge, EdgeRecord, EdgeType, Modes, Neighbours, NetworkBuilder,
    NetworkConfig, Node, NodeId, NodeRecord, NodeRef, NodeType, RouteNetwork, RouteType,
    TrackDirection,
};
pub use routing::{plan_route, plan_route_with_progress, RoutePlan, RouteRequest};
pub use spatial::{Positioned, SpatialIndex};
