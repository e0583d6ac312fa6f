//! Domain-level faults and errors (no external dependencies)

use thiserror::Error;

use crate::domain::NodeId;

/// Data problems the core recovers from on its own.
///
/// A fault never aborts a build or a render: the input degrades to an empty
/// or partial tree and the fault is logged or collected for inspection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    #[error("malformed input: expected a sequence of records, got {found}")]
    MalformedInput { found: String },

    #[error("dangling reference: {parent} lists unknown child {child}")]
    DanglingReference { parent: NodeId, child: NodeId },

    #[error("structural cycle: {child} is already on the path leading to {parent}")]
    StructuralCycle { parent: NodeId, child: NodeId },

    #[error("depth limit of {limit} levels reached below {parent}")]
    DepthLimit { parent: NodeId, limit: usize },

    #[error("row limit of {limit} reached, remaining nodes not shown")]
    RowLimit { limit: usize },
}

/// Domain errors are caller mistakes, not data problems.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("node {0} is not shown, expand its ancestors first")]
    HiddenNode(NodeId),

    #[error("invalid record at position {position}: {message}")]
    InvalidRecord { position: usize, message: String },
}
