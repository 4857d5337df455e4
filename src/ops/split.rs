//! Edge bisection and edge split.

use nalgebra::Point3;

use super::reject;
use crate::mesh::{EdgeId, HalfEdgeId, HalfEdgeMesh, VertexId};

impl HalfEdgeMesh {
    /// Insert a vertex at the midpoint of an edge without splitting faces.
    ///
    /// Both adjacent faces gain one side. Creates one vertex, one edge and
    /// two half-edges; the new vertex's representative continues along the
    /// original edge's representative direction. Bone weights blend the two
    /// endpoints and each new corner blends the corner it splits with the
    /// next corner of its face.
    ///
    /// ```text
    ///    ----h--->             --h->    --h2->
    /// v1 ----e--- v2   -->  v1 --e-- vm --e2-- v2
    ///   <----t---              <-t2-    <--t--
    /// ```
    pub fn bisect_edge(&mut self, e: EdgeId) -> Option<VertexId> {
        const OP: &str = "bisect_edge";
        if !self.contains_edge(e) {
            return reject(OP, e, "no such edge");
        }
        let vm = self.bisect(e);
        self.finish_edit(OP, vm)
    }

    /// Split an edge at its midpoint and cut each adjacent non-boundary face
    /// in two.
    ///
    /// In each such face a diagonal runs from the new vertex to the vertex
    /// following the edge's far end (in that face's winding), so the far end
    /// gets its own triangle. Boundary loops only gain a side. The returned
    /// vertex's representative lies along the original edge.
    ///
    /// Refused when both diagonals would reach the same vertex, as on two
    /// triangles glued along all their edges.
    pub fn split_edge(&mut self, e: EdgeId) -> Option<VertexId> {
        const OP: &str = "split_edge";
        if !self.contains_edge(e) {
            return reject(OP, e, "no such edge");
        }

        let h = self.edge_halfedge(e);
        let t = self.twin(h);
        if !self.is_boundary_halfedge(h) && !self.is_boundary_halfedge(t) {
            let far_h = self.origin(self.next(self.next(h)));
            let far_t = self.origin(self.next(self.next(t)));
            if far_h == far_t {
                return reject(OP, e, "both diagonals would join the same two vertices");
            }
        }
        let vm = self.bisect(e);

        for side in [h, t] {
            if !self.is_boundary_halfedge(side) {
                self.cut_off_far_corner(side);
            }
        }

        self.finish_edit(OP, vm)
    }

    /// Bisect without logging, for operations that build on it.
    pub(crate) fn bisect(&mut self, e: EdgeId) -> VertexId {
        let h = self.edge_halfedge(e);
        let t = self.twin(h);
        let v1 = self.origin(h);
        let v2 = self.origin(t);
        let h_next = self.next(h);
        let t_next = self.next(t);
        let fh = self.face_of(h);
        let ft = self.face_of(t);

        let vm = self.emplace_vertex();
        let mid = Point3::from((self.position(v1).coords + self.position(v2).coords) * 0.5);
        self.set_position(vm, mid);
        self.interpolate_data(&[v1, v2], vm);

        let e2 = self.emplace_edge(self.edge(e).sharp);

        let h2 = self.emplace_halfedge();
        self.interpolate_data(&[h, h_next], h2);
        let t2 = self.emplace_halfedge();
        self.interpolate_data(&[t, t_next], t2);

        self.vertex_mut(vm).halfedge = h2;
        self.edge_mut(e2).halfedge = h2;

        {
            let he = self.halfedge_mut(h2);
            he.twin = t;
            he.next = h_next;
            he.vertex = vm;
            he.edge = e2;
            he.face = fh;
        }
        {
            let he = self.halfedge_mut(t2);
            he.twin = h;
            he.next = t_next;
            he.vertex = vm;
            he.edge = e;
            he.face = ft;
        }
        {
            let he = self.halfedge_mut(h);
            he.twin = t2;
            he.next = h2;
        }
        {
            let he = self.halfedge_mut(t);
            he.twin = h2;
            he.next = t2;
            he.edge = e2;
        }

        vm
    }

    /// `h` ends at a fresh midpoint and `next(h)` continues along the split
    /// edge to its far end. Cut the far end's corner off into a triangle.
    fn cut_off_far_corner(&mut self, h: HalfEdgeId) {
        let h2 = self.next(h);
        let far_next = self.next(h2);
        let rest = self.next(far_next);
        let face = self.face_of(h);
        let vm = self.origin(h2);
        let c = self.origin(rest);

        let edge = self.emplace_edge(false);
        let diag = self.emplace_halfedge();
        self.interpolate_data(&[far_next, h2], diag);
        let diag_twin = self.emplace_halfedge();
        self.interpolate_data(&[h, rest], diag_twin);
        let corner = self.emplace_face(false);

        self.face_mut(corner).halfedge = diag;
        self.edge_mut(edge).halfedge = diag;

        {
            let he = self.halfedge_mut(diag);
            he.twin = diag_twin;
            he.next = h2;
            he.vertex = c;
            he.edge = edge;
            he.face = corner;
        }
        {
            let he = self.halfedge_mut(diag_twin);
            he.twin = diag;
            he.next = rest;
            he.vertex = vm;
            he.edge = edge;
            he.face = face;
        }

        self.halfedge_mut(h).next = diag_twin;
        self.halfedge_mut(far_next).next = diag;
        self.halfedge_mut(h2).face = corner;
        self.halfedge_mut(far_next).face = corner;
        self.face_mut(face).halfedge = h;
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point3, Vector2};

    use crate::mesh::{BoneWeight, HalfEdgeMesh};
    use crate::ops::test_util::*;

    /// FIVE with the midpoint of the split edge appended as index 5.
    fn with_midpoint(mid: [f64; 3]) -> Vec<[f64; 3]> {
        let mut positions = FIVE.to_vec();
        positions.push(mid);
        positions
    }

    #[test]
    fn test_bisect_quad_and_triangle() {
        let (mut mesh, ids) = quad_and_triangle();
        let e = mesh.find_edge(ids[1], ids[4]).unwrap();
        mesh.vertex_mut(ids[1]).bone_weights = vec![BoneWeight { bone: 2, weight: 1.0 }];

        let far = mesh.dest(mesh.edge_halfedge(e));

        let vm = mesh.bisect_edge(e).unwrap();

        assert_eq!(mesh.validate(), Ok(()));
        assert!((mesh.position(vm) - Point3::new(1.25, 0.0, 0.0)).norm() < 1e-12);
        assert_eq!(mesh.vertex_degree(vm), 2);
        assert_eq!(mesh.vertex(vm).bone_weights, vec![BoneWeight { bone: 2, weight: 0.5 }]);
        assert_eq!(mesh.num_faces(), 3);

        let positions = with_midpoint([1.25, 0.0, 0.0]);
        assert_shape(&mesh, &positions, &[&[0, 3, 4, 5, 1], &[1, 5, 4, 2]]);

        // The representative continues along the original edge direction
        assert_eq!(mesh.dest(mesh.vertex(vm).halfedge), far);
    }

    #[test]
    fn test_bisect_corner_data() {
        let mut mesh = HalfEdgeMesh::new();
        let f = mesh.add_polygon(4, 1.0).unwrap();
        let h = mesh.face(f).halfedge;
        let uv_h = mesh.halfedge(h).corner_uv;
        let uv_next = mesh.halfedge(mesh.next(h)).corner_uv;

        let e = mesh.edge_of(h);
        let vm = mesh.bisect_edge(e).unwrap();

        let h2 = mesh.next(h);
        assert_eq!(mesh.origin(h2), vm);
        let expected: Vector2<f64> = (uv_h + uv_next) * 0.5;
        assert!((mesh.halfedge(h2).corner_uv - expected).norm() < 1e-12);
        assert_eq!(mesh.face_degree(f), 5);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_split_interior_edge() {
        let (mut mesh, ids) = quad_and_triangle();
        let e = mesh.find_edge(ids[1], ids[4]).unwrap();

        let vm = mesh.split_edge(e).unwrap();

        assert_eq!(mesh.validate(), Ok(()));
        assert!((mesh.position(vm) - Point3::new(1.25, 0.0, 0.0)).norm() < 1e-12);
        assert_eq!(mesh.vertex_degree(vm), 4);
        let positions = with_midpoint([1.25, 0.0, 0.0]);
        assert_shape(
            &mesh,
            &positions,
            &[&[0, 3, 4, 5], &[0, 5, 1], &[1, 5, 2], &[5, 4, 2]],
        );

        // Representative lies along the original edge
        let h = mesh.vertex(vm).halfedge;
        let far = mesh.dest(h);
        assert!(far == ids[1] || far == ids[4]);
    }

    #[test]
    fn test_split_boundary_edge() {
        let (mut mesh, ids) = quad_and_triangle();
        let e = mesh.find_edge(ids[0], ids[1]).unwrap();
        let loops = mesh.num_boundary_loops();

        let vm = mesh.split_edge(e).unwrap();

        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.vertex_degree(vm), 3);
        assert_eq!(mesh.num_boundary_loops(), loops);
        let positions = with_midpoint([0.05, 1.05, 0.0]);
        assert_shape(&mesh, &positions, &[&[0, 3, 5], &[5, 3, 4, 1], &[1, 4, 2]]);
    }

    #[test]
    fn test_split_single_triangle() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.5, 0.0, 0.0]];
        let (mut mesh, ids) = mesh_from(&positions[..3], &[&[2, 1, 0]]);
        let e = mesh.find_edge(ids[0], ids[1]).unwrap();

        mesh.split_edge(e).unwrap();

        assert_eq!(mesh.validate(), Ok(()));
        assert_shape(&mesh, &positions, &[&[2, 3, 0], &[2, 1, 3]]);
    }

    #[test]
    fn test_split_refuses_pillow() {
        let (mut mesh, ids) = pillow();
        let before = snapshot(&mesh);

        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            let e = mesh.find_edge(ids[a], ids[b]).unwrap();
            assert!(mesh.split_edge(e).is_none());
        }
        assert!(snapshot(&mesh) == before);

        // Bisecting adds no diagonal, so it still goes through
        let e = mesh.find_edge(ids[0], ids[1]).unwrap();
        assert!(mesh.bisect_edge(e).is_some());
        assert_eq!(mesh.validate(), Ok(()));
    }

    #[test]
    fn test_split_sweep() {
        sweep(|m| m.edge_ids().collect(), |m, e| m.split_edge(e).is_some());
    }

    #[test]
    fn test_bisect_sweep() {
        sweep(|m| m.edge_ids().collect(), |m, e| m.bisect_edge(e).is_some());
    }
}
