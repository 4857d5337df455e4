//! Structural validation.
//!
//! [`HalfEdgeMesh::validate`] checks every structural invariant of the mesh
//! and reports the first violation it finds. Checks run in stages, each
//! relying on the ones before: half-edge references first, then edges,
//! vertex rings, face loops and finally the simple-graph property. Within a
//! stage elements are checked in parallel, and the reported failure is the
//! first in store order so results are deterministic.
//!
//! Validation only reads the mesh. Every walk is bounded by the half-edge
//! count, so a corrupted mesh produces an error instead of a hang.

use std::collections::HashSet;

use rayon::prelude::*;
use slotmap::{Key, SecondaryMap};

use super::halfedge::HalfEdgeMesh;
use super::index::{EdgeId, FaceId, HalfEdgeId, VertexId};
use crate::error::ValidationError;

type Check = std::result::Result<(), ValidationError>;

/// Run `check` over `keys` in parallel and return the first failure in key
/// order.
fn first_failure<K, F>(keys: &[K], check: F) -> Check
where
    K: Key + Send + Sync,
    F: Fn(K) -> Option<ValidationError> + Send + Sync,
{
    match keys.par_iter().find_map_first(|&k| check(k)) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

impl HalfEdgeMesh {
    /// Check all structural invariants.
    ///
    /// Returns the offending element and a reason for the first violation
    /// found, or `Ok(())` for a valid mesh. This is a diagnostic aid: the
    /// editing operations decide validity up front and never consult it.
    pub fn validate(&self) -> Check {
        let halfedges: Vec<HalfEdgeId> = self.halfedge_ids().collect();
        first_failure(&halfedges, |h| self.check_halfedge(h))?;

        let mut per_edge: SecondaryMap<EdgeId, usize> = SecondaryMap::new();
        let mut per_vertex: SecondaryMap<VertexId, usize> = SecondaryMap::new();
        for he in self.halfedges.values() {
            if let Some(entry) = per_edge.entry(he.edge) {
                *entry.or_insert(0) += 1;
            }
            if let Some(entry) = per_vertex.entry(he.vertex) {
                *entry.or_insert(0) += 1;
            }
        }

        let edges: Vec<EdgeId> = self.edge_ids().collect();
        first_failure(&edges, |e| self.check_edge(e, &per_edge))?;

        let vertices: Vec<VertexId> = self.vertex_ids().collect();
        first_failure(&vertices, |v| self.check_vertex(v, &per_vertex))?;

        let faces: Vec<FaceId> = self.face_ids().collect();
        first_failure(&faces, |f| self.check_face(f))?;

        let covered: usize = faces.par_iter().map(|&f| self.face_degree(f)).sum();
        if covered != self.num_halfedges() {
            if let Some(&h) = halfedges.first() {
                return Err(ValidationError::new(h, "some half-edges belong to no face loop"));
            }
        }

        self.check_simple_graph(&edges)
    }

    /// Check whether all structural invariants hold.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn check_halfedge(&self, h: HalfEdgeId) -> Option<ValidationError> {
        let fail = |msg: &str| Some(ValidationError::new(h, msg));
        let he = self.halfedge(h);

        if !self.contains_halfedge(he.next) {
            return fail("next is not a live half-edge");
        }
        if !self.contains_halfedge(he.twin) {
            return fail("twin is not a live half-edge");
        }
        if !self.contains_vertex(he.vertex) {
            return fail("origin is not a live vertex");
        }
        if !self.contains_edge(he.edge) {
            return fail("edge is not a live edge");
        }
        if !self.contains_face(he.face) {
            return fail("face is not a live face");
        }

        let twin = self.halfedge(he.twin);
        if twin.twin != h {
            return fail("twin of twin is a different half-edge");
        }
        if twin.edge != he.edge {
            return fail("twin belongs to a different edge");
        }
        if twin.vertex == he.vertex {
            return fail("half-edge starts and ends at the same vertex");
        }
        if self.halfedge(he.next).vertex != twin.vertex {
            return fail("next does not start where this half-edge ends");
        }
        None
    }

    fn check_edge(
        &self,
        e: EdgeId,
        per_edge: &SecondaryMap<EdgeId, usize>,
    ) -> Option<ValidationError> {
        let fail = |msg: &str| Some(ValidationError::new(e, msg));
        let h = self.edge(e).halfedge;

        if !self.contains_halfedge(h) {
            return fail("representative is not a live half-edge");
        }
        if self.edge_of(h) != e {
            return fail("representative belongs to a different edge");
        }
        if per_edge.get(e).copied().unwrap_or(0) != 2 {
            return fail("edge does not have exactly two half-edges");
        }
        if self.is_boundary_halfedge(h) && self.is_boundary_halfedge(self.twin(h)) {
            return fail("edge has boundary loops on both sides");
        }
        None
    }

    fn check_vertex(
        &self,
        v: VertexId,
        per_vertex: &SecondaryMap<VertexId, usize>,
    ) -> Option<ValidationError> {
        let fail = |msg: &str| Some(ValidationError::new(v, msg));
        let start = self.vertex(v).halfedge;

        if !start.is_valid() {
            return fail("vertex has no incident edges");
        }
        if !self.contains_halfedge(start) {
            return fail("representative is not a live half-edge");
        }
        if self.origin(start) != v {
            return fail("representative leaves a different vertex");
        }

        let outgoing = per_vertex.get(v).copied().unwrap_or(0);
        let mut h = start;
        let mut ring = 0usize;
        let mut gaps = 0usize;
        loop {
            ring += 1;
            if self.is_boundary_halfedge(h) {
                gaps += 1;
            }
            h = self.next(self.twin(h));
            if h == start {
                break;
            }
            if ring > outgoing {
                return fail("half-edge ring does not close");
            }
        }
        if ring != outgoing {
            return fail("half-edge ring misses some outgoing half-edges");
        }
        if gaps > 1 {
            return fail("vertex has more than one boundary gap");
        }
        None
    }

    fn check_face(&self, f: FaceId) -> Option<ValidationError> {
        let fail = |msg: &str| Some(ValidationError::new(f, msg));
        let face = self.face(f);
        let start = face.halfedge;

        if !self.contains_halfedge(start) {
            return fail("representative is not a live half-edge");
        }

        let mut h = start;
        let mut degree = 0usize;
        loop {
            if self.face_of(h) != f {
                return fail("loop passes a half-edge of a different face");
            }
            degree += 1;
            h = self.next(h);
            if h == start {
                break;
            }
            if degree > self.num_halfedges() {
                return fail("face loop does not close");
            }
        }

        if !face.boundary && degree < 3 {
            return fail("face has fewer than three sides");
        }
        None
    }

    fn check_simple_graph(&self, edges: &[EdgeId]) -> Check {
        let mut seen: HashSet<(VertexId, VertexId)> = HashSet::with_capacity(edges.len());
        for &e in edges {
            let [a, b] = self.edge_vertices(e);
            let pair = if a < b { (a, b) } else { (b, a) };
            if !seen.insert(pair) {
                return Err(ValidationError::new(e, "another edge joins the same two vertices"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::mesh::{build_from_polygons, Element, HalfEdgeMesh};

    fn two_triangles() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_polygons(&vertices, &[vec![0, 1, 2], vec![0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_valid_mesh() {
        let mesh = two_triangles();
        assert_eq!(mesh.validate(), Ok(()));
        assert!(HalfEdgeMesh::new().is_valid());
    }

    #[test]
    fn test_broken_twin() {
        let mut mesh = two_triangles();
        let h = mesh.halfedge_ids().next().unwrap();
        let n = mesh.next(h);
        mesh.halfedge_mut(h).twin = n;

        let err = mesh.validate().unwrap_err();
        assert!(matches!(err.element, Element::HalfEdge(_)));
    }

    #[test]
    fn test_isolated_vertex() {
        let mut mesh = two_triangles();
        let v = mesh.emplace_vertex();

        let err = mesh.validate().unwrap_err();
        assert_eq!(err.element, Element::Vertex(v));
    }

    #[test]
    fn test_stale_face_representative() {
        let mut mesh = two_triangles();
        let faces: Vec<_> = mesh.interior_face_ids().collect();
        let other = mesh.face(faces[1]).halfedge;
        mesh.face_mut(faces[0]).halfedge = other;

        let err = mesh.validate().unwrap_err();
        assert_eq!(err.element, Element::Face(faces[0]));
    }

    #[test]
    fn test_boundary_on_both_sides() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mut mesh = build_from_polygons(&vertices, &[vec![0, 1, 2]]).unwrap();
        let f = mesh.interior_face_ids().next().unwrap();
        mesh.face_mut(f).boundary = true;

        let err = mesh.validate().unwrap_err();
        assert!(matches!(err.element, Element::Edge(_)));
        assert!(err.to_string().contains("both sides"));
    }

    #[test]
    fn test_pinched_vertex() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        let mut mesh =
            build_from_polygons(&vertices, &[vec![0, 1, 2], vec![3, 4, 5]]).unwrap();
        let ids: Vec<_> = mesh.vertex_ids().collect();

        // Splice the two boundary loops together at vertices 0 and 3
        let x_a = mesh.find_halfedge(ids[1], ids[0]).unwrap();
        let b_a = mesh.find_halfedge(ids[0], ids[2]).unwrap();
        let x_b = mesh.find_halfedge(ids[4], ids[3]).unwrap();
        let b_b = mesh.find_halfedge(ids[3], ids[5]).unwrap();
        let hole = mesh.face_of(x_a);
        let other = mesh.face_of(x_b);
        let other_loop: Vec<_> = mesh.face_halfedges(other).collect();
        let moved: Vec<_> = mesh.vertex_halfedges(ids[3]).collect();

        mesh.halfedge_mut(x_a).next = b_b;
        mesh.halfedge_mut(x_b).next = b_a;
        for h in other_loop {
            mesh.halfedge_mut(h).face = hole;
        }
        for h in moved {
            mesh.halfedge_mut(h).vertex = ids[0];
        }
        mesh.erase_face(other);
        mesh.erase_vertex(ids[3]);

        let err = mesh.validate().unwrap_err();
        assert_eq!(err.element, Element::Vertex(ids[0]));
        assert!(err.to_string().contains("boundary gap"));
    }

    #[test]
    fn test_vertex_representative_elsewhere() {
        let mut mesh = two_triangles();
        let ids: Vec<_> = mesh.vertex_ids().collect();
        let foreign = mesh.vertex(ids[1]).halfedge;
        mesh.vertex_mut(ids[0]).halfedge = foreign;

        let err = mesh.validate().unwrap_err();
        assert_eq!(err.element, Element::Vertex(ids[0]));
    }
}
