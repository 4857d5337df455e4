//! Local editing operations.
//!
//! Every operation is a method on [`HalfEdgeMesh`] that takes a handle to an
//! existing element and returns `Option` of the element that matters after
//! the edit: a new vertex, edge or face, or the same handle for edits that
//! only rewire (such as [`HalfEdgeMesh::flip_edge`]).
//!
//! # All or Nothing
//!
//! Operations decide whether they can proceed before they write anything.
//! `None` means the mesh was not touched at all; `Some` means the edit
//! completed and the mesh satisfies every structural invariant again.
//!
//! # Example
//!
//! ```
//! use whittle::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//! let ids: Vec<_> = mesh.vertex_ids().collect();
//!
//! // Flipping the diagonal turns it to join the other two corners
//! let diagonal = mesh.find_edge(ids[0], ids[2]).unwrap();
//! assert_eq!(mesh.flip_edge(diagonal), Some(diagonal));
//! assert!(mesh.find_edge(ids[1], ids[3]).is_some());
//!
//! // Boundary edges never flip, and a refused edit changes nothing
//! let side = mesh.find_edge(ids[0], ids[1]).unwrap();
//! assert!(mesh.flip_edge(side).is_none());
//!
//! // Splitting it adds a centre vertex joined to all four corners
//! let centre = mesh.split_edge(diagonal).unwrap();
//! assert_eq!(mesh.vertex_degree(centre), 4);
//! assert!(mesh.is_valid());
//! ```

mod bevel;
mod boundary;
mod collapse;
mod dissolve;
mod extrude;
mod flip;
mod inset;
mod positions;
mod split;
mod weld;

use std::collections::HashMap;
use std::fmt::Debug;

use crate::mesh::{HalfEdgeId, HalfEdgeMesh};

/// How bevelled vertices behave when pushed past the end of their edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overshoot {
    /// Stop at the far end of the edge.
    #[default]
    Clamp,
    /// Keep moving along the edge's line.
    Extrapolate,
}

/// Options controlling the editing operations of a mesh.
#[derive(Debug, Clone)]
pub struct EditOptions {
    /// Run the validator after every accepted edit and log any violation.
    ///
    /// Defaults to on in debug builds and off in release builds.
    pub validate_edits: bool,

    /// Behaviour of [`HalfEdgeMesh::bevel_positions`] past the edge end.
    pub bevel_overshoot: Overshoot,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            validate_edits: cfg!(debug_assertions),
            bevel_overshoot: Overshoot::Clamp,
        }
    }
}

impl EditOptions {
    /// Create options with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether accepted edits are validated.
    pub fn with_validate_edits(mut self, validate: bool) -> Self {
        self.validate_edits = validate;
        self
    }

    /// Set the bevel overshoot behaviour.
    pub fn with_bevel_overshoot(mut self, overshoot: Overshoot) -> Self {
        self.bevel_overshoot = overshoot;
        self
    }
}

/// Log a refused edit and return `None`.
pub(crate) fn reject<T>(op: &str, target: impl Debug, reason: &str) -> Option<T> {
    log::debug!("{op}: rejected {target:?}: {reason}");
    None
}

impl HalfEdgeMesh {
    /// Log an accepted edit, validate it if configured, and return `Some`.
    pub(crate) fn finish_edit<T: Debug>(&self, op: &str, result: T) -> Option<T> {
        log::trace!("{op}: accepted, returned {result:?}");
        if self.options.validate_edits {
            if let Err(err) = self.validate() {
                log::error!("{op}: mesh invalid after edit: {err}");
            }
        }
        Some(result)
    }

    /// Walk the loop through `start` as it would run once the `next` links
    /// in `relink` are rewritten. Returns `None` if the walk never gets back
    /// to `start`.
    pub(crate) fn walk_relinked(
        &self,
        start: HalfEdgeId,
        relink: &HashMap<HalfEdgeId, HalfEdgeId>,
    ) -> Option<Vec<HalfEdgeId>> {
        let mut walk = vec![start];
        let mut h = start;
        loop {
            h = relink.get(&h).copied().unwrap_or_else(|| self.next(h));
            if h == start {
                return Some(walk);
            }
            if walk.len() > self.num_halfedges() {
                return None;
            }
            walk.push(h);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::*;
    use crate::mesh::{EdgeId, FaceId, HalfEdgeMesh, VertexId};

    fn pick<T: Copy>(rng: &mut fastrand::Rng, items: &[T]) -> Option<T> {
        if items.is_empty() {
            None
        } else {
            Some(items[rng.usize(..items.len())])
        }
    }

    /// Apply one randomly chosen edit to a random target. Returns the edit's
    /// name and whether it went through, or `None` if it had no target.
    fn random_edit(
        mesh: &mut HalfEdgeMesh,
        rng: &mut fastrand::Rng,
    ) -> Option<(&'static str, bool)> {
        let vertices: Vec<VertexId> = mesh.vertex_ids().collect();
        let edges: Vec<EdgeId> = mesh.edge_ids().collect();
        let faces: Vec<FaceId> = mesh.face_ids().collect();

        let outcome = match rng.usize(..13) {
            0 => ("flip_edge", mesh.flip_edge(pick(rng, &edges)?).is_some()),
            1 => ("bisect_edge", mesh.bisect_edge(pick(rng, &edges)?).is_some()),
            2 => ("split_edge", mesh.split_edge(pick(rng, &edges)?).is_some()),
            3 => ("collapse_edge", mesh.collapse_edge(pick(rng, &edges)?).is_some()),
            4 => ("collapse_face", mesh.collapse_face(pick(rng, &faces)?).is_some()),
            5 => ("extrude_face", mesh.extrude_face(pick(rng, &faces)?).is_some()),
            6 => ("bevel_vertex", mesh.bevel_vertex(pick(rng, &vertices)?).is_some()),
            7 => ("bevel_edge", mesh.bevel_edge(pick(rng, &edges)?).is_some()),
            8 => ("inset_vertex", mesh.inset_vertex(pick(rng, &faces)?).is_some()),
            9 => ("dissolve_edge", mesh.dissolve_edge(pick(rng, &edges)?).is_some()),
            10 => ("dissolve_vertex", mesh.dissolve_vertex(pick(rng, &vertices)?).is_some()),
            11 => ("make_boundary", mesh.make_boundary(pick(rng, &faces)?).is_some()),
            _ => {
                let rim: Vec<EdgeId> = edges
                    .iter()
                    .copied()
                    .filter(|&e| mesh.is_boundary_edge(e))
                    .collect();
                let a = pick(rng, &rim)?;
                let b = pick(rng, &rim)?;
                ("weld_edges", mesh.weld_edges(a, b).is_some())
            }
        };
        Some(outcome)
    }

    #[test]
    fn test_random_edit_sequences_stay_valid() {
        init_logger();
        for seed in 0..40 {
            let mut rng = fastrand::Rng::with_seed(seed);
            for mut mesh in fixtures() {
                for step in 0..30 {
                    let before = snapshot(&mesh);
                    let Some((op, accepted)) = random_edit(&mut mesh, &mut rng) else {
                        continue;
                    };
                    if accepted {
                        if let Err(err) = mesh.validate() {
                            panic!("seed {seed}, step {step}: {op} left the mesh invalid: {err}");
                        }
                    } else {
                        assert!(
                            snapshot(&mesh) == before,
                            "seed {seed}, step {step}: refused {op} changed the mesh"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_annulus_has_two_loops() {
        let (mesh, _) = quad_annulus();
        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.num_vertices(), 24);
        assert_eq!(mesh.interior_face_ids().count(), 12);
        assert_eq!(mesh.num_boundary_loops(), 2);
    }
}
