//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and the queries,
//! construction helpers and diagnostics built on it.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which represents a polygonal surface
//! with boundary using a half-edge (doubly-connected edge list) data
//! structure. Holes are explicit boundary faces, so every half-edge has a
//! face and every traversal is uniform.
//!
//! # Handles and Identity
//!
//! Mesh elements are addressed by generational handles:
//! - [`VertexId`] - Identifies a vertex
//! - [`EdgeId`] - Identifies an undirected edge
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face or boundary loop
//!
//! Handles stay valid until the element they name is erased. Each record also
//! carries an [`ElementId`], a process-wide creation counter that is never
//! reused.
//!
//! # Construction
//!
//! ```
//! use whittle::mesh::{HalfEdgeMesh, build_from_triangles};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert!(mesh.is_valid());
//! ```

mod builder;
mod halfedge;
mod index;
mod interpolate;
mod validate;

pub use builder::{build_from_polygons, build_from_quads, build_from_triangles};
pub use halfedge::{
    BoneWeight, Edge, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter,
};
pub use index::{EdgeId, Element, ElementId, FaceId, HalfEdgeId, VertexId};
pub use interpolate::Interpolated;
