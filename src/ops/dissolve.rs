//! Vertex and edge dissolve.
//!
//! Dissolving removes an element and merges the faces around it into one.
//! When one of the merged faces is a boundary loop the result is a boundary
//! loop too: dissolving never fills a hole.

use std::collections::{HashMap, HashSet};

use super::reject;
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

impl HalfEdgeMesh {
    /// Remove an edge, merging the faces on its two sides.
    ///
    /// The merged face keeps the handle of the boundary side if there is
    /// one, and otherwise of the side holding the edge's representative.
    /// At each endpoint the two corners that meet are blended.
    ///
    /// Refused when the edge has the same face (or a boundary loop) on both
    /// sides, when an endpoint would be left with a single edge, or when the
    /// two faces share a vertex besides the endpoints. A face merging into a
    /// boundary loop must not touch any other boundary.
    pub fn dissolve_edge(&mut self, e: EdgeId) -> Option<FaceId> {
        const OP: &str = "dissolve_edge";
        if !self.contains_edge(e) {
            return reject(OP, e, "no such edge");
        }

        let h = self.edge_halfedge(e);
        let t = self.twin(h);
        let fh = self.face_of(h);
        let ft = self.face_of(t);
        if fh == ft {
            return reject(OP, e, "edge has the same face on both sides");
        }
        if self.is_boundary_face(fh) && self.is_boundary_face(ft) {
            return reject(OP, e, "edge has boundary loops on both sides");
        }

        let a = self.origin(h);
        let b = self.origin(t);
        if self.vertex_degree(a) <= 2 || self.vertex_degree(b) <= 2 {
            return reject(OP, e, "an endpoint has degree two");
        }

        let beside: HashSet<VertexId> = self
            .face_vertices(fh)
            .filter(|&v| v != a && v != b)
            .collect();
        if self.face_vertices(ft).any(|v| beside.contains(&v)) {
            return reject(OP, e, "faces share a vertex beyond the edge");
        }

        let (keep, gone) = if self.is_boundary_face(ft) { (ft, fh) } else { (fh, ft) };
        if self.is_boundary_face(keep)
            && self
                .face_vertices(gone)
                .any(|v| v != a && v != b && self.is_boundary_vertex(v))
        {
            return reject(OP, e, "face would join its boundary loop to another gap");
        }
        let h_next = self.next(h);
        let t_next = self.next(t);
        let h_prev = self.prev(h);
        let t_prev = self.prev(t);
        let moved: Vec<HalfEdgeId> = self.face_halfedges(gone).collect();

        // The corners meeting at each endpoint blend into one
        self.interpolate_data(&[t_next, h], t_next);
        self.interpolate_data(&[h_next, t], h_next);

        self.halfedge_mut(h_prev).next = t_next;
        self.halfedge_mut(t_prev).next = h_next;
        for he in moved {
            self.halfedge_mut(he).face = keep;
        }
        self.face_mut(keep).halfedge = h_next;
        if self.vertex(a).halfedge == h {
            self.vertex_mut(a).halfedge = t_next;
        }
        if self.vertex(b).halfedge == t {
            self.vertex_mut(b).halfedge = h_next;
        }

        self.erase_halfedge(h);
        self.erase_halfedge(t);
        self.erase_edge(e);
        self.erase_face(gone);

        self.finish_edit(OP, keep)
    }

    /// Remove a vertex and its edges, merging every face around it.
    ///
    /// The merged face keeps the handle of the boundary loop around the
    /// vertex if there is one, and otherwise of the face holding the
    /// vertex's representative. Where a neighbour's two corners meet they
    /// are blended.
    ///
    /// Refused when the faces around the vertex are not all distinct, when
    /// more than one is a boundary loop, when a neighbour would be left with
    /// a single edge, or when the merged face would have fewer than three
    /// sides or visit a vertex twice. When the merged face is a boundary
    /// loop, none of its vertices may lie on another gap.
    pub fn dissolve_vertex(&mut self, v: VertexId) -> Option<FaceId> {
        const OP: &str = "dissolve_vertex";
        if !self.contains_vertex(v) {
            return reject(OP, v, "no such vertex");
        }

        let spokes: Vec<HalfEdgeId> = self.vertex_halfedges(v).collect();
        let k = spokes.len();
        let faces: Vec<FaceId> = spokes.iter().map(|&h| self.face_of(h)).collect();
        let distinct: HashSet<FaceId> = faces.iter().copied().collect();
        if distinct.len() != k {
            return reject(OP, v, "a face touches the vertex twice");
        }
        let boundary: Vec<FaceId> = faces
            .iter()
            .copied()
            .filter(|&f| self.is_boundary_face(f))
            .collect();
        if boundary.len() > 1 {
            return reject(OP, v, "vertex lies on more than one boundary loop");
        }
        if spokes.iter().any(|&h| self.vertex_degree(self.dest(h)) <= 2) {
            return reject(OP, v, "a neighbour has degree two");
        }

        // In face i, the corner before spoke i comes in along spoke i-1; once
        // both are gone the face continues into face i-1
        let incoming: Vec<HalfEdgeId> = (0..k)
            .map(|i| self.twin(spokes[(i + k - 1) % k]))
            .collect();
        let mut relink: HashMap<HalfEdgeId, HalfEdgeId> = HashMap::new();
        for i in 0..k {
            let before = self.prev(incoming[i]);
            let after = self.next(spokes[(i + k - 1) % k]);
            relink.insert(before, after);
        }

        let start = self.next(spokes[0]);
        let merged = match self.walk_relinked(start, &relink) {
            Some(merged) => merged,
            None => return reject(OP, v, "merged face does not close"),
        };
        let sides: usize = faces.iter().map(|&f| self.face_degree(f)).sum::<usize>() - 2 * k;
        if merged.len() != sides {
            return reject(OP, v, "merged face would split apart");
        }
        if merged.len() < 3 {
            return reject(OP, v, "merged face would have fewer than three sides");
        }
        let mut seen = HashSet::new();
        if !merged.iter().all(|&h| seen.insert(self.origin(h))) {
            return reject(OP, v, "merged face would visit a vertex twice");
        }
        if !boundary.is_empty() {
            // Spokes and their twins go away with the vertex
            let on_loop: HashSet<HalfEdgeId> = merged
                .iter()
                .copied()
                .chain(spokes.iter().map(|&h| self.twin(h)))
                .collect();
            let pinched = merged.iter().any(|&h| {
                self.vertex_halfedges(self.origin(h))
                    .any(|out| self.is_boundary_halfedge(out) && !on_loop.contains(&out))
            });
            if pinched {
                return reject(OP, v, "boundary loop would meet another gap");
            }
        }

        let keep = boundary
            .first()
            .copied()
            .unwrap_or_else(|| self.face_of(self.vertex(v).halfedge));

        for i in 0..k {
            let after = self.next(spokes[(i + k - 1) % k]);
            self.interpolate_data(&[after, incoming[i]], after);
            let neighbour = self.origin(incoming[i]);
            if self.vertex(neighbour).halfedge == incoming[i] {
                self.vertex_mut(neighbour).halfedge = after;
            }
        }
        for (&before, &after) in &relink {
            self.halfedge_mut(before).next = after;
        }
        for &h in &merged {
            self.halfedge_mut(h).face = keep;
        }
        self.face_mut(keep).halfedge = start;

        for &h in &spokes {
            let t = self.twin(h);
            let e = self.edge_of(h);
            self.erase_halfedge(h);
            self.erase_halfedge(t);
            self.erase_edge(e);
        }
        for f in distinct {
            if f != keep {
                self.erase_face(f);
            }
        }
        self.erase_vertex(v);

        self.finish_edit(OP, keep)
    }
}
