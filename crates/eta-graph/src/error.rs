//! Graph-subsystem error type.

use thiserror::Error;

use eta_core::NodeId;

/// Errors produced by `eta-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid speed profile: {0}")]
    InvalidProfile(String),

    #[error("node {0} added twice")]
    DuplicateNode(NodeId),

    #[error("node {0} not found in graph")]
    UnknownNode(NodeId),

    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("graph source failed: {0}")]
    Source(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
