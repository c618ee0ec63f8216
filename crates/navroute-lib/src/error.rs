use thiserror::Error;

use crate::network::NodeId;

/// Convenient result alias for the routing library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a route is requested from a network without nodes.
    #[error("route network is not loaded")]
    NetworkNotLoaded,

    /// Raised when the departure or destination position is not a valid coordinate.
    #[error("invalid {which} position")]
    InvalidPosition { which: &'static str },

    /// Raised when no route could be found between the two positions.
    #[error("no route found between departure and destination")]
    RouteNotFound,

    /// Raised when the progress callback cancelled the search.
    #[error("route search was aborted")]
    SearchAborted,

    /// Raised by the network builder when a node id is added twice.
    #[error("duplicate node id {id}")]
    DuplicateNode { id: NodeId },

    /// Raised by the network builder for nodes outside the valid coordinate range.
    #[error("node {id} has an invalid position")]
    InvalidNodePosition { id: NodeId },

    /// Raised by the network builder when an edge references a missing node.
    #[error("edge references unknown node id {id}")]
    UnknownNode { id: NodeId },

    /// Raised by the network builder when an edge violates its invariants.
    #[error("invalid edge {from} -> {to}: {message}")]
    InvalidEdge {
        from: NodeId,
        to: NodeId,
        message: String,
    },
}
