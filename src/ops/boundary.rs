//! Turning faces into holes.

use std::collections::HashSet;

use super::reject;
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

impl HalfEdgeMesh {
    /// Turn a face into a boundary loop, punching a hole in the surface.
    ///
    /// A face away from every hole simply becomes one. A face that shares a
    /// single stretch of edges with a boundary loop merges into it: the
    /// shared edges are removed along with the vertices strictly inside the
    /// stretch, and the face keeps its handle as the merged loop.
    ///
    /// Refused when the face already is a boundary loop, meets a boundary
    /// loop only at a vertex, borders more than one loop or meets its loop
    /// along more than one stretch, when a vertex inside the shared stretch
    /// has other edges, or when the face would swallow its loop entirely.
    pub fn make_boundary(&mut self, f: FaceId) -> Option<FaceId> {
        const OP: &str = "make_boundary";
        if !self.contains_face(f) {
            return reject(OP, f, "no such face");
        }
        if self.is_boundary_face(f) {
            return reject(OP, f, "face is already a boundary loop");
        }

        let ring: Vec<HalfEdgeId> = self.face_halfedges(f).collect();
        let n = ring.len();
        let shared: Vec<bool> = ring
            .iter()
            .map(|&h| self.is_boundary_halfedge(self.twin(h)))
            .collect();

        if !shared.iter().any(|&s| s) {
            if ring.iter().any(|&h| self.is_boundary_vertex(self.origin(h))) {
                return reject(OP, f, "face meets a boundary loop at a vertex");
            }
            self.face_mut(f).boundary = true;
            return self.finish_edit(OP, f);
        }

        let holes: HashSet<FaceId> = ring
            .iter()
            .zip(&shared)
            .filter(|&(_, &s)| s)
            .map(|(&h, _)| self.face_of(self.twin(h)))
            .collect();
        if holes.len() > 1 {
            return reject(OP, f, "face borders more than one boundary loop");
        }
        if shared.iter().all(|&s| s) {
            return reject(OP, f, "face is surrounded by a single boundary loop");
        }
        let starts: Vec<usize> = (0..n)
            .filter(|&i| shared[i] && !shared[(i + n - 1) % n])
            .collect();
        if starts.len() != 1 {
            return reject(OP, f, "face meets its boundary loop along more than one stretch");
        }

        let m = shared.iter().filter(|&&s| s).count();
        let run: Vec<HalfEdgeId> = (0..m).map(|j| ring[(starts[0] + j) % n]).collect();
        let twins: Vec<HalfEdgeId> = run.iter().map(|&h| self.twin(h)).collect();
        let hole = self.face_of(twins[0]);
        let first = self.origin(run[0]);
        let last = self.dest(run[m - 1]);
        let inner: Vec<VertexId> = run[..m - 1].iter().map(|&h| self.dest(h)).collect();

        if inner.iter().any(|&v| self.vertex_degree(v) != 2) {
            return reject(OP, f, "a vertex inside the shared stretch has other edges");
        }
        let on_run: HashSet<VertexId> = inner.iter().copied().chain([first, last]).collect();
        if ring
            .iter()
            .map(|&h| self.origin(h))
            .any(|v| !on_run.contains(&v) && self.is_boundary_vertex(v))
        {
            return reject(OP, f, "face meets a boundary loop at a vertex");
        }
        if self.face_degree(hole) == m {
            return reject(OP, f, "face would swallow its boundary loop");
        }

        let f_prev = self.prev(run[0]);
        let f_next = self.next(run[m - 1]);
        let hole_next = self.next(twins[0]);
        let hole_prev = self.prev(twins[m - 1]);
        let moved: Vec<HalfEdgeId> = self
            .face_halfedges(hole)
            .filter(|h| !twins.contains(h))
            .collect();

        self.halfedge_mut(f_prev).next = hole_next;
        self.halfedge_mut(hole_prev).next = f_next;
        for h in moved {
            self.halfedge_mut(h).face = f;
        }
        {
            let face = self.face_mut(f);
            face.boundary = true;
            face.halfedge = f_next;
        }
        if self.vertex(first).halfedge == run[0] {
            self.vertex_mut(first).halfedge = hole_next;
        }
        if self.vertex(last).halfedge == twins[m - 1] {
            self.vertex_mut(last).halfedge = f_next;
        }

        for (&h, &t) in run.iter().zip(&twins) {
            let e = self.edge_of(h);
            self.erase_halfedge(h);
            self.erase_halfedge(t);
            self.erase_edge(e);
        }
        for v in inner {
            self.erase_vertex(v);
        }
        self.erase_face(hole);

        self.finish_edit(OP, f)
    }
}
