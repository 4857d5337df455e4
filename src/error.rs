//! Error types for whittle.
//!
//! Local editing operations never return these: a refused edit is reported as
//! `None`. [`MeshError`] covers mesh construction and the position helpers,
//! while [`ValidationError`] is the diagnostic produced by
//! [`HalfEdgeMesh::validate`](crate::mesh::HalfEdgeMesh::validate).

use thiserror::Error;

use crate::mesh::Element;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building a mesh or driving a helper.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three sides or repeats a vertex.
    #[error("face {face} is degenerate (fewer than three distinct vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// The mesh has non-manifold topology.
    #[error("mesh has non-manifold topology: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// The same directed edge is used by more than one face.
    #[error("directed edge ({v0}, {v1}) is used by more than one face")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// A vertex is not used by any face.
    #[error("vertex {vertex} is not referenced by any face")]
    UnreferencedVertex {
        /// The vertex index.
        vertex: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// A broken structural invariant, naming the first offending element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{element:?}: {message}")]
pub struct ValidationError {
    /// The element at which the violation was detected.
    pub element: Element,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(element: impl Into<Element>, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_message() {
        let err = MeshError::invalid_param("sides", 2, "a polygon needs at least three sides");
        assert_eq!(
            err.to_string(),
            "invalid parameter: sides = 2 (a polygon needs at least three sides)"
        );
    }
}
