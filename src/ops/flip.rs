//! Edge flip.

use super::reject;
use crate::mesh::{EdgeId, HalfEdgeMesh};

impl HalfEdgeMesh {
    /// Rotate a non-boundary edge counter-clockwise inside its two faces.
    ///
    /// Each endpoint of the edge slides one step forward along its face, so
    /// the edge ends up joining the vertex two steps past either end. Only
    /// `next`/`face` links and representatives change; no element is created
    /// or destroyed and no position moves. Returns the same edge.
    ///
    /// ```text
    ///     c                c
    ///    / \              /|\
    ///   /   \            / | \
    ///  b--e--a   -->    b  e  a
    ///   \   /            \ | /
    ///    \ /              \|/
    ///     d                d
    /// ```
    ///
    /// Refused when the edge touches a boundary loop, when either endpoint
    /// has degree two (the flip would strand it), when the two new endpoints
    /// coincide or are already joined, or when the faces share another
    /// vertex so a face would visit it twice.
    pub fn flip_edge(&mut self, e: EdgeId) -> Option<EdgeId> {
        const OP: &str = "flip_edge";
        if !self.contains_edge(e) {
            return reject(OP, e, "no such edge");
        }
        if self.is_boundary_edge(e) {
            return reject(OP, e, "edge is on the boundary");
        }

        let h = self.edge_halfedge(e);
        let t = self.twin(h);
        let fh = self.face_of(h);
        let ft = self.face_of(t);
        if fh == ft {
            return reject(OP, e, "edge has the same face on both sides");
        }

        let a = self.origin(h);
        let b = self.origin(t);
        if self.vertex_degree(a) <= 2 || self.vertex_degree(b) <= 2 {
            return reject(OP, e, "an endpoint has degree two");
        }

        let h_next = self.next(h);
        let t_next = self.next(t);
        let h_next_next = self.next(h_next);
        let t_next_next = self.next(t_next);
        let h_prev = self.prev(h);
        let t_prev = self.prev(t);

        let c = self.origin(h_next_next);
        let d = self.origin(t_next_next);
        if c == d {
            return reject(OP, e, "new endpoints coincide");
        }
        if self.find_edge(c, d).is_some() {
            return reject(OP, e, "new endpoints are already joined");
        }
        if self.face_vertices(fh).any(|v| v == d) || self.face_vertices(ft).any(|v| v == c) {
            return reject(OP, e, "faces share a vertex beyond the edge");
        }

        // h_next moves to the twin's face and t_next to ours
        self.halfedge_mut(h_next).face = ft;
        self.halfedge_mut(t_next).face = fh;
        self.face_mut(fh).halfedge = h;
        self.face_mut(ft).halfedge = t;

        self.halfedge_mut(h_prev).next = t_next;
        self.halfedge_mut(h_next).next = t;
        self.halfedge_mut(t_prev).next = h_next;
        self.halfedge_mut(t_next).next = h;

        self.vertex_mut(a).halfedge = t_next;
        self.vertex_mut(b).halfedge = h_next;

        {
            let he = self.halfedge_mut(h);
            he.vertex = d;
            he.next = h_next_next;
        }
        {
            let he = self.halfedge_mut(t);
            he.vertex = c;
            he.next = t_next_next;
        }

        self.finish_edit(OP, e)
    }
}
