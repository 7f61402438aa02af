//! Error taxonomy of the brush pipeline.

use crate::brush::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum CsgError {
    /// The half-space intersection of a shape is empty, unbounded or too small
    /// to be a polyhedron.
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },
    /// One or more brushes in a batch operation failed to rebuild; the whole
    /// batch was rolled back.
    #[error("rebuild failed for {} brush(es) {:?}, batch rolled back", .failed.len(), .failed)]
    RebuildFailure { failed: Vec<NodeId> },
    #[error("unknown brush {0:?}")]
    UnknownBrush(NodeId),
    #[error("unknown csg operation {0:?}")]
    UnknownOperation(String),
    #[error("transform is not invertible")]
    SingularTransform,
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CsgError {
    pub fn degenerate(reason: impl Into<String>) -> CsgError {
        CsgError::DegenerateGeometry { reason: reason.into() }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, CsgError::DegenerateGeometry { .. })
    }
}
