//! # Whittle
//!
//! A half-edge mesh kernel with local editing operations that keep the mesh
//! valid.
//!
//! Whittle stores polygonal surfaces with boundary as a half-edge mesh whose
//! holes are explicit boundary faces, and edits them one element at a time:
//! flipping, splitting, collapsing, extruding, bevelling, insetting,
//! dissolving and welding. Every edit either completes and leaves a valid
//! mesh, or is refused and leaves the mesh exactly as it was.
//!
//! ## Features
//!
//! - **Stable handles**: generational element handles that survive unrelated
//!   inserts and erases, plus process-unique element identities
//! - **All-or-nothing edits**: operations return `Option` and check every
//!   precondition before they write
//! - **Attribute blending**: bone weights and per-corner uvs and normals
//!   follow the topology through each edit
//! - **Validator**: a parallel structural checker naming the first offending
//!   element
//!
//! ## Quick Start
//!
//! ```
//! use whittle::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//!
//! // Extrude the quad and lift the new ring
//! let f = mesh.face_ids().find(|&f| !mesh.is_boundary_face(f)).unwrap();
//! let top = mesh.extrude_face(f).unwrap();
//! mesh.extrude_positions(top, nalgebra::Vector3::new(0.0, 0.0, 1.0), 0.25).unwrap();
//!
//! assert_eq!(mesh.num_vertices(), 8);
//! assert_eq!(mesh.interior_face_ids().count(), 5);
//! assert!(mesh.is_valid());
//! ```
//!
//! ## Refused Edits
//!
//! ```
//! use whittle::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! // Collapsing any edge of a tetrahedron would fold it flat
//! let e = mesh.edge_ids().next().unwrap();
//! assert!(mesh.collapse_edge(e).is_none());
//! assert_eq!(mesh.num_edges(), 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod mesh;
pub mod ops;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use whittle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result, ValidationError};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, EdgeId, Element, FaceId,
        HalfEdgeId, HalfEdgeMesh, VertexId,
    };
    pub use crate::ops::{EditOptions, Overshoot};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
