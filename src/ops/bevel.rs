//! Vertex and edge bevel.
//!
//! Both operations replace an element with a new face whose corners sit on
//! the edges that used to leave it. Each such edge is a *spoke*: the bevel
//! gives every spoke its own vertex and joins consecutive spoke vertices by a
//! new edge, whose one side lies in the face between the two spokes and whose
//! other side bounds the new face.
//!
//! New vertices start at the position of the vertex they replace. Use
//! [`HalfEdgeMesh::bevel_positions`] to spread them out.

use super::reject;
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

impl HalfEdgeMesh {
    /// Replace a vertex with a face, one corner per incident edge.
    ///
    /// Every face around the vertex gains a side. Refused for vertices of
    /// degree below three, which would produce a face with fewer than three
    /// sides.
    pub fn bevel_vertex(&mut self, v: VertexId) -> Option<FaceId> {
        const OP: &str = "bevel_vertex";
        if !self.contains_vertex(v) {
            return reject(OP, v, "no such vertex");
        }
        if self.vertex_degree(v) < 3 {
            return reject(OP, v, "vertex has fewer than three edges");
        }

        let spokes: Vec<HalfEdgeId> = self.vertex_halfedges(v).collect();
        let f = self.bevel_spokes(&spokes, &[]);
        self.erase_vertex(v);

        self.finish_edit(OP, f)
    }

    /// Replace an edge with a face, one corner per edge leaving either
    /// endpoint other than the edge itself.
    ///
    /// The two faces on either side of the edge keep their degree; every
    /// other face around the endpoints gains a side. Refused when the
    /// endpoints have fewer than three such edges between them, or when the
    /// edge has the same face on both sides.
    pub fn bevel_edge(&mut self, e: EdgeId) -> Option<FaceId> {
        const OP: &str = "bevel_edge";
        if !self.contains_edge(e) {
            return reject(OP, e, "no such edge");
        }

        let h = self.edge_halfedge(e);
        let t = self.twin(h);
        if self.face_of(h) == self.face_of(t) {
            return reject(OP, e, "edge has the same face on both sides");
        }

        let a = self.origin(h);
        let b = self.origin(t);
        let mut spokes = self.spokes_after(a, h);
        spokes.extend(self.spokes_after(b, t));
        if spokes.len() < 3 {
            return reject(OP, e, "endpoints have fewer than three other edges");
        }

        let f = self.bevel_spokes(&spokes, &[h, t]);
        self.erase_halfedge(h);
        self.erase_halfedge(t);
        self.erase_edge(e);
        self.erase_vertex(a);
        self.erase_vertex(b);

        self.finish_edit(OP, f)
    }

    /// Outgoing half-edges of `v` in rotation order, starting after `skip`
    /// and excluding it.
    fn spokes_after(&self, v: VertexId, skip: HalfEdgeId) -> Vec<HalfEdgeId> {
        let mut ring: Vec<HalfEdgeId> = self.vertex_halfedges(v).collect();
        if let Some(at) = ring.iter().position(|&h| h == skip) {
            ring.rotate_left(at);
            ring.remove(0);
        }
        ring
    }

    /// Give each spoke a fresh origin and stitch a face through them.
    ///
    /// `spokes` must run in rotation order so that consecutive spokes share
    /// a face; `dying` are half-edges between them that the caller erases.
    fn bevel_spokes(&mut self, spokes: &[HalfEdgeId], dying: &[HalfEdgeId]) -> FaceId {
        let k = spokes.len();

        let incoming: Vec<HalfEdgeId> = spokes
            .iter()
            .map(|&s| {
                let p = self.prev(s);
                if dying.contains(&p) {
                    self.prev(p)
                } else {
                    p
                }
            })
            .collect();

        let mut ring: Vec<VertexId> = Vec::with_capacity(k);
        for &s in spokes {
            let source = self.origin(s);
            let position = *self.position(source);
            let weights = self.vertex(source).bone_weights.clone();
            let w = self.emplace_vertex();
            let vertex = self.vertex_mut(w);
            vertex.position = position;
            vertex.bone_weights = weights;
            ring.push(w);
        }

        let face = self.emplace_face(false);
        let mut inner: Vec<HalfEdgeId> = Vec::with_capacity(k);
        for j in 0..k {
            let s = spokes[j];
            let g = self.face_of(s);
            let edge = self.emplace_edge(false);
            let c = self.emplace_halfedge();
            let d = self.emplace_halfedge();
            self.copy_corner(s, c);
            self.copy_corner(s, d);
            {
                let he = self.halfedge_mut(c);
                he.twin = d;
                he.next = s;
                he.vertex = ring[(j + k - 1) % k];
                he.edge = edge;
                he.face = g;
            }
            {
                let he = self.halfedge_mut(d);
                he.twin = c;
                he.vertex = ring[j];
                he.edge = edge;
                he.face = face;
            }
            self.edge_mut(edge).halfedge = c;
            self.halfedge_mut(incoming[j]).next = c;
            if dying.contains(&self.face(g).halfedge) {
                self.face_mut(g).halfedge = c;
            }
            inner.push(d);
        }

        for j in 0..k {
            self.halfedge_mut(spokes[j]).vertex = ring[j];
            self.vertex_mut(ring[j]).halfedge = spokes[j];
            self.halfedge_mut(inner[j]).next = inner[(j + k - 1) % k];
        }
        self.face_mut(face).halfedge = inner[0];

        face
    }
}
