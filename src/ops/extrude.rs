//! Face extrusion.

use super::reject;
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

impl HalfEdgeMesh {
    /// Lift a face onto a fresh ring of vertices joined to the old ring by a
    /// band of quads.
    ///
    /// For a face of degree `n` this creates `n` vertices, `2n` edges (`n`
    /// around the new ring and `n` rails between the rings) and `n` side
    /// faces. The face keeps its handle, degree and boundary flag but is
    /// re-seated onto the new ring. New vertices start at the positions of
    /// the vertices they were lifted from; use
    /// [`extrude_positions`](Self::extrude_positions) to move them.
    ///
    /// ```text
    ///  v3 -------- v2        v3 ---------- v2
    ///   |          |          | v3' -- v2' |
    ///   |    f     |   -->    |  |  f   |  |
    ///   |          |          | v0' -- v1' |
    ///  v0 -------- v1        v0 ---------- v1
    /// ```
    pub fn extrude_face(&mut self, f: FaceId) -> Option<FaceId> {
        const OP: &str = "extrude_face";
        if !self.contains_face(f) {
            return reject(OP, f, "no such face");
        }

        let ring: Vec<HalfEdgeId> = self.face_halfedges(f).collect();
        let n = ring.len();

        let mut lifted: Vec<VertexId> = Vec::with_capacity(n);
        for &h in &ring {
            let v = self.origin(h);
            let position = *self.position(v);
            let weights = self.vertex(v).bone_weights.clone();
            let v2 = self.emplace_vertex();
            let vertex = self.vertex_mut(v2);
            vertex.position = position;
            vertex.bone_weights = weights;
            lifted.push(v2);
        }

        // Top ring: a[i] runs v'[i] -> v'[i+1] inside f, b[i] is its twin
        let mut top = Vec::with_capacity(n);
        let mut top_twin = Vec::with_capacity(n);
        for i in 0..n {
            let h = ring[i];
            let t = self.twin(h);
            let sharp = self.edge(self.edge_of(h)).sharp;
            let edge = self.emplace_edge(sharp);
            let a = self.emplace_halfedge();
            let b = self.emplace_halfedge();
            self.copy_corner(h, a);
            self.copy_corner(t, b);
            {
                let he = self.halfedge_mut(a);
                he.twin = b;
                he.vertex = lifted[i];
                he.edge = edge;
                he.face = f;
            }
            {
                let he = self.halfedge_mut(b);
                he.twin = a;
                he.vertex = lifted[(i + 1) % n];
                he.edge = edge;
            }
            self.edge_mut(edge).halfedge = a;
            self.vertex_mut(lifted[i]).halfedge = a;
            top.push(a);
            top_twin.push(b);
        }
        for i in 0..n {
            self.halfedge_mut(top[i]).next = top[(i + 1) % n];
        }
        self.face_mut(f).halfedge = top[0];

        // Rails: up[i] runs v[i] -> v'[i], down[i] is its twin
        let mut up = Vec::with_capacity(n);
        let mut down = Vec::with_capacity(n);
        for i in 0..n {
            let h = ring[i];
            let v = self.origin(h);
            let sharp = self.edge(self.edge_of(h)).sharp;
            let edge = self.emplace_edge(sharp);
            let u = self.emplace_halfedge();
            let d = self.emplace_halfedge();
            self.copy_corner(h, u);
            self.copy_corner(h, d);
            {
                let he = self.halfedge_mut(u);
                he.twin = d;
                he.vertex = v;
                he.edge = edge;
            }
            {
                let he = self.halfedge_mut(d);
                he.twin = u;
                he.vertex = lifted[i];
                he.edge = edge;
            }
            self.edge_mut(edge).halfedge = u;
            up.push(u);
            down.push(d);
        }

        // Side i: h[i] -> up[i+1] -> b[i] -> down[i]
        for i in 0..n {
            let side = self.emplace_face(false);
            let cycle = [ring[i], up[(i + 1) % n], top_twin[i], down[i]];
            for (k, &h) in cycle.iter().enumerate() {
                let he = self.halfedge_mut(h);
                he.next = cycle[(k + 1) % 4];
                he.face = side;
            }
            self.face_mut(side).halfedge = ring[i];
        }

        self.finish_edit(OP, f)
    }

    pub(crate) fn copy_corner(&mut self, from: HalfEdgeId, to: HalfEdgeId) {
        let src = *self.halfedge(from);
        let he = self.halfedge_mut(to);
        he.corner_uv = src.corner_uv;
        he.corner_normal = src.corner_normal;
    }
}
