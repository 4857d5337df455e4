//! Edge and face collapse.
//!
//! Both operations merge a connected set of vertices into one new vertex,
//! removing the edges between them. They share a planning pass that decides
//! whether the merge keeps the surface a simple two-manifold and records
//! every rewiring it needs, followed by a mutation pass that only executes
//! the plan.
//!
//! A face that loses all but two sides to the merge degenerates into a
//! two-sided sliver and is eliminated: its two surviving edges fuse into one.
//! The planning pass refuses a merge when:
//!
//! - an edge between merged vertices is not one being removed (self-loop)
//! - a face would visit the merged vertex twice, or be cut apart
//! - a face would be left with fewer than two sides
//! - a neighbour would end up joined to the merged vertex by two edges
//! - a fused edge would have boundary loops, or one face, on both sides
//! - a sliver apex would keep no neighbour outside the collapsing region,
//!   as happens on a closed tetrahedron or an isolated triangle
//! - the merged vertex would touch two boundary loops, or one loop twice

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;

use super::reject;
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

/// A face reduced to a two-sided sliver: `p` runs from the merged region to
/// the apex and `q` runs back.
struct Sliver {
    face: FaceId,
    p: HalfEdgeId,
    q: HalfEdgeId,
}

/// Everything the mutation pass needs, gathered before any write.
struct Contraction {
    merged: Vec<VertexId>,
    dying: HashSet<HalfEdgeId>,
    /// Surviving half-edges leaving merged vertices.
    outgoing: Vec<HalfEdgeId>,
    /// Surviving faces that lose sides: `(face, before_run, after_run)`.
    relinks: Vec<(FaceId, HalfEdgeId, HalfEdgeId)>,
    slivers: Vec<Sliver>,
    representative: HalfEdgeId,
}

impl HalfEdgeMesh {
    /// Merge the endpoints of an edge into one vertex at its midpoint.
    ///
    /// The edge disappears, and any triangle on either side collapses into a
    /// single edge. Bone weights of the new vertex blend the two endpoints.
    /// Refused when the merge would break the link condition: the endpoints
    /// may share no neighbours or faces besides those of the edge itself.
    /// Also refused when the endpoints lie on different boundary loops,
    /// since the merged vertex would pinch them together.
    ///
    /// Returns the merged vertex.
    pub fn collapse_edge(&mut self, e: EdgeId) -> Option<VertexId> {
        const OP: &str = "collapse_edge";
        if !self.contains_edge(e) {
            return reject(OP, e, "no such edge");
        }

        let plan = match self.plan_contraction(&[e], None) {
            Ok(plan) => plan,
            Err(reason) => return reject(OP, e, reason),
        };

        let vm = self.contract(plan, self.edge_midpoint(e), &[e], None);
        self.finish_edit(OP, vm)
    }

    /// Shrink a non-boundary face to a single vertex at its centroid.
    ///
    /// All edges of the face are removed, and neighbouring triangles
    /// collapse into single edges. Returns the merged vertex.
    pub fn collapse_face(&mut self, f: FaceId) -> Option<VertexId> {
        const OP: &str = "collapse_face";
        if !self.contains_face(f) {
            return reject(OP, f, "no such face");
        }
        if self.is_boundary_face(f) {
            return reject(OP, f, "face is a boundary loop");
        }

        let edges: Vec<EdgeId> = self.face_halfedges(f).map(|h| self.edge_of(h)).collect();
        let plan = match self.plan_contraction(&edges, Some(f)) {
            Ok(plan) => plan,
            Err(reason) => return reject(OP, f, reason),
        };

        let vm = self.contract(plan, self.face_center(f), &edges, Some(f));
        self.finish_edit(OP, vm)
    }

    fn plan_contraction(
        &self,
        edges: &[EdgeId],
        removed_face: Option<FaceId>,
    ) -> std::result::Result<Contraction, &'static str> {
        let removed: HashSet<EdgeId> = edges.iter().copied().collect();
        let mut dying: HashSet<HalfEdgeId> = HashSet::new();
        let mut merged: Vec<VertexId> = Vec::new();
        for &e in edges {
            let h = self.edge_halfedge(e);
            dying.insert(h);
            dying.insert(self.twin(h));
            for v in self.edge_vertices(e) {
                if !merged.contains(&v) {
                    merged.push(v);
                }
            }
        }
        let in_merged: HashSet<VertexId> = merged.iter().copied().collect();

        // Edges from each outside neighbour into the merged set, and the
        // faces that touch it
        let mut touching: HashMap<VertexId, usize> = HashMap::new();
        let mut outgoing = Vec::new();
        let mut around: Vec<FaceId> = Vec::new();
        for &v in &merged {
            for h in self.vertex_halfedges(v) {
                let w = self.dest(h);
                if in_merged.contains(&w) {
                    if !removed.contains(&self.edge_of(h)) {
                        return Err("merging would create a self-loop");
                    }
                } else {
                    *touching.entry(w).or_insert(0) += 1;
                }
                if !dying.contains(&h) {
                    outgoing.push(h);
                }
                let f = self.face_of(h);
                if Some(f) != removed_face && !around.contains(&f) {
                    around.push(f);
                }
            }
        }

        let mut relinks = Vec::new();
        let mut slivers = Vec::new();
        for &g in &around {
            let hes: Vec<HalfEdgeId> = self.face_halfedges(g).collect();
            let n = hes.len();
            let lost = hes.iter().filter(|h| dying.contains(h)).count();
            let visits = hes.iter().filter(|&&h| in_merged.contains(&self.origin(h))).count();

            if visits != lost + 1 {
                return Err("a face would visit the merged vertex twice");
            }
            if lost == 0 {
                continue;
            }
            if n - lost < 2 {
                return Err("a face would lose all but one side");
            }

            let starts: Vec<usize> = (0..n)
                .filter(|&i| dying.contains(&hes[i]) && !dying.contains(&hes[(i + n - 1) % n]))
                .collect();
            if starts.len() != 1 {
                return Err("a face would be cut apart");
            }
            let first = starts[0];
            let before = hes[(first + n - 1) % n];
            let after = hes[(first + lost) % n];

            if n - lost == 2 {
                slivers.push(Sliver {
                    face: g,
                    p: after,
                    q: before,
                });
            } else {
                relinks.push((g, before, after));
            }
        }

        let mut apexes: HashMap<VertexId, usize> = HashMap::new();
        for sliver in &slivers {
            *apexes.entry(self.origin(sliver.q)).or_insert(0) += 1;

            let fp = self.face_of(self.twin(sliver.p));
            let fq = self.face_of(self.twin(sliver.q));
            if fp == fq {
                return Err("a fused edge would have one face on both sides");
            }
            if self.is_boundary_face(fp) && self.is_boundary_face(fq) {
                return Err("a fused edge would have boundary on both sides");
            }
        }

        for (x, &k) in &touching {
            let m = apexes.get(x).copied().unwrap_or(0);
            if m > 1 || k != m + 1 {
                return Err("a neighbour would be joined to the merged vertex twice");
            }
        }

        for &x in apexes.keys() {
            let stranded = self
                .vertex_neighbors(x)
                .all(|w| in_merged.contains(&w) || apexes.contains_key(&w));
            if stranded {
                return Err("a neighbour would keep no edge outside the collapsed region");
            }
        }

        let sliver_faces: HashSet<FaceId> = slivers.iter().map(|s| s.face).collect();
        let gaps = around
            .iter()
            .filter(|&&g| self.is_boundary_face(g) && !sliver_faces.contains(&g))
            .count();
        if gaps > 1 {
            return Err("the merged vertex would lie on two boundary gaps");
        }

        let erased: HashSet<HalfEdgeId> = slivers.iter().flat_map(|s| [s.p, s.q]).collect();
        let representative = outgoing
            .iter()
            .copied()
            .find(|h| !erased.contains(h))
            .ok_or("no edge would remain at the merged vertex")?;

        Ok(Contraction {
            merged,
            dying,
            outgoing,
            relinks,
            slivers,
            representative,
        })
    }

    fn contract(
        &mut self,
        plan: Contraction,
        position: Point3<f64>,
        edges: &[EdgeId],
        removed_face: Option<FaceId>,
    ) -> VertexId {
        let vm = self.emplace_vertex();
        self.set_position(vm, position);
        self.interpolate_data(&plan.merged, vm);

        for &h in &plan.outgoing {
            self.halfedge_mut(h).vertex = vm;
        }

        for &(g, before, after) in &plan.relinks {
            self.halfedge_mut(before).next = after;
            self.face_mut(g).halfedge = after;
        }

        for sliver in &plan.slivers {
            let p_out = self.twin(sliver.p);
            let q_out = self.twin(sliver.q);
            let keep = self.edge_of(sliver.q);
            let drop = self.edge_of(sliver.p);
            let apex = self.origin(sliver.q);

            {
                let he = self.halfedge_mut(p_out);
                he.twin = q_out;
                he.edge = keep;
            }
            self.halfedge_mut(q_out).twin = p_out;
            self.edge_mut(keep).halfedge = q_out;
            let sharp = self.edge(drop).sharp;
            self.edge_mut(keep).sharp |= sharp;
            if self.vertex(apex).halfedge == sliver.q {
                self.vertex_mut(apex).halfedge = p_out;
            }

            self.erase_halfedge(sliver.p);
            self.erase_halfedge(sliver.q);
            self.erase_edge(drop);
            self.erase_face(sliver.face);
        }

        for &h in &plan.dying {
            self.erase_halfedge(h);
        }
        for &e in edges {
            self.erase_edge(e);
        }
        if let Some(f) = removed_face {
            self.erase_face(f);
        }
        for &v in &plan.merged {
            self.erase_vertex(v);
        }

        self.vertex_mut(vm).halfedge = plan.representative;
        vm
    }
}
