//! Boundary edge welding.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;

use super::reject;
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

impl HalfEdgeMesh {
    /// Glue two boundary edges into one interior edge.
    ///
    /// With `e` running `a -> b` and `e2` running `c -> d` inside their
    /// faces, `d` merges into `a` and `c` into `b`, so the faces end up on
    /// opposite sides of `e`. Each merged vertex moves to the midpoint of
    /// the pair and blends its bone weights. `e` survives and becomes sharp
    /// if either edge was. When the edges lie on the same boundary loop the
    /// loop splits in two (or shrinks, if the edges meet at a vertex); when
    /// they lie on different loops the loops join.
    ///
    /// Refused unless both edges lie on the boundary and differ. Also
    /// refused when the merge would create a self-loop or a duplicate edge,
    /// when a face already holds both vertices of a merged pair, or when a
    /// resulting boundary loop would visit a vertex twice.
    pub fn weld_edges(&mut self, e: EdgeId, e2: EdgeId) -> Option<EdgeId> {
        const OP: &str = "weld_edges";
        let target = (e, e2);
        if !self.contains_edge(e) || !self.contains_edge(e2) {
            return reject(OP, target, "no such edge");
        }
        if e == e2 {
            return reject(OP, target, "cannot weld an edge to itself");
        }
        let (Some((h, hb)), Some((h2, hb2))) = (self.inner_side(e), self.inner_side(e2)) else {
            return reject(OP, target, "both edges must have a boundary loop on exactly one side");
        };

        let a = self.origin(h);
        let b = self.dest(h);
        let c = self.origin(h2);
        let d = self.dest(h2);
        if a == c || b == d {
            return reject(OP, target, "welding would create a self-loop");
        }
        let merge = |v: VertexId| {
            if v == d {
                a
            } else if v == c {
                b
            } else {
                v
            }
        };

        for (keep, gone) in [(a, d), (b, c)] {
            if keep == gone {
                continue;
            }
            let keep_faces: HashSet<FaceId> = self
                .vertex_faces(keep)
                .filter(|&f| !self.is_boundary_face(f))
                .collect();
            if self.vertex_faces(gone).any(|f| keep_faces.contains(&f)) {
                return reject(OP, target, "a face holds both vertices of a merged pair");
            }

            let mut joined: HashSet<VertexId> = HashSet::new();
            for u in [keep, gone] {
                for out in self.vertex_halfedges(u) {
                    if self.edge_of(out) == e2 {
                        continue;
                    }
                    let w = merge(self.dest(out));
                    if w == keep {
                        return reject(OP, target, "welding would create a self-loop");
                    }
                    if !joined.insert(w) {
                        return reject(OP, target, "welding would create a duplicate edge");
                    }
                }
            }
        }

        let same_loop = self.face_of(hb) == self.face_of(hb2);
        let p1 = self.prev(hb);
        let n1 = self.next(hb);
        let p2 = self.prev(hb2);
        let n2 = self.next(hb2);

        let mut relink: HashMap<HalfEdgeId, HalfEdgeId> = HashMap::new();
        let starts: Vec<HalfEdgeId> = if n1 == hb2 {
            relink.insert(p1, n2);
            vec![n2]
        } else if n2 == hb {
            relink.insert(p2, n1);
            vec![n1]
        } else {
            relink.insert(p1, n2);
            relink.insert(p2, n1);
            if same_loop {
                vec![n1, n2]
            } else {
                vec![n1]
            }
        };

        let mut loops: Vec<Vec<HalfEdgeId>> = Vec::with_capacity(starts.len());
        for &start in &starts {
            if start == hb || start == hb2 {
                return reject(OP, target, "boundary loop would vanish");
            }
            let Some(walk) = self.walk_relinked(start, &relink) else {
                return reject(OP, target, "boundary loop does not close");
            };
            let mut seen = HashSet::new();
            if !walk.iter().all(|&x| seen.insert(merge(self.origin(x)))) {
                return reject(OP, target, "a boundary loop would visit a vertex twice");
            }
            loops.push(walk);
        }

        let outer = self.face_of(hb);
        let other = self.face_of(hb2);
        let moved_d: Vec<HalfEdgeId> = if d != a {
            self.vertex_halfedges(d).collect()
        } else {
            Vec::new()
        };
        let moved_c: Vec<HalfEdgeId> = if c != b {
            self.vertex_halfedges(c).collect()
        } else {
            Vec::new()
        };

        for (keep, gone) in [(a, d), (b, c)] {
            if keep != gone {
                let sum = self.position(keep).coords + self.position(gone).coords;
                let mid = Point3::from(sum * 0.5);
                self.set_position(keep, mid);
                self.interpolate_data(&[keep, gone], keep);
            }
        }

        for (&from, &to) in &relink {
            self.halfedge_mut(from).next = to;
        }
        for (i, walk) in loops.iter().enumerate() {
            let face = if i == 0 { outer } else { self.emplace_face(true) };
            for &x in walk {
                self.halfedge_mut(x).face = face;
            }
            self.face_mut(face).halfedge = walk[0];
        }

        self.halfedge_mut(h).twin = h2;
        {
            let he = self.halfedge_mut(h2);
            he.twin = h;
            he.edge = e;
        }
        let sharp = self.edge(e2).sharp;
        {
            let edge = self.edge_mut(e);
            edge.halfedge = h;
            edge.sharp |= sharp;
        }
        for x in moved_d {
            self.halfedge_mut(x).vertex = a;
        }
        for x in moved_c {
            self.halfedge_mut(x).vertex = b;
        }
        self.vertex_mut(a).halfedge = h;
        self.vertex_mut(b).halfedge = h2;

        self.erase_halfedge(hb);
        self.erase_halfedge(hb2);
        self.erase_edge(e2);
        if d != a {
            self.erase_vertex(d);
        }
        if c != b {
            self.erase_vertex(c);
        }
        if !same_loop {
            self.erase_face(other);
        }

        self.finish_edit(OP, e)
    }

    /// The non-boundary and boundary half-edges of an edge with a boundary
    /// loop on exactly one side.
    fn inner_side(&self, e: EdgeId) -> Option<(HalfEdgeId, HalfEdgeId)> {
        let h = self.edge_halfedge(e);
        let t = self.twin(h);
        match (self.is_boundary_halfedge(h), self.is_boundary_halfedge(t)) {
            (false, true) => Some((h, t)),
            (true, false) => Some((t, h)),
            _ => None,
        }
    }
}
