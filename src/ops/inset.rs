//! Vertex inset.

use super::reject;
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

impl HalfEdgeMesh {
    /// Insert a vertex at the centroid of a face and fan the face into
    /// triangles around it.
    ///
    /// A face of degree `n` becomes `n` triangles; the original handle is
    /// kept for the first. Bone weights of the new vertex blend every corner
    /// vertex, its corners blend the face's corner data, and each spoke's
    /// outer corner keeps the corner data of the vertex it starts from.
    /// Refused for boundary loops.
    pub fn inset_vertex(&mut self, f: FaceId) -> Option<VertexId> {
        const OP: &str = "inset_vertex";
        if !self.contains_face(f) {
            return reject(OP, f, "no such face");
        }
        if self.is_boundary_face(f) {
            return reject(OP, f, "face is a boundary loop");
        }

        let ring: Vec<HalfEdgeId> = self.face_halfedges(f).collect();
        let corners: Vec<VertexId> = ring.iter().map(|&h| self.origin(h)).collect();
        let n = ring.len();

        let centre = self.emplace_vertex();
        self.set_position(centre, self.face_center(f));
        self.interpolate_data(&corners, centre);

        // Spoke i joins corner i to the centre: inward[i] runs corner -> centre
        let mut inward = Vec::with_capacity(n);
        let mut outward = Vec::with_capacity(n);
        for i in 0..n {
            let edge = self.emplace_edge(false);
            let a = self.emplace_halfedge();
            let b = self.emplace_halfedge();
            self.copy_corner(ring[i], a);
            self.interpolate_data(&ring, b);
            {
                let he = self.halfedge_mut(a);
                he.twin = b;
                he.vertex = corners[i];
                he.edge = edge;
            }
            {
                let he = self.halfedge_mut(b);
                he.twin = a;
                he.vertex = centre;
                he.edge = edge;
            }
            self.edge_mut(edge).halfedge = a;
            inward.push(a);
            outward.push(b);
        }

        // Triangle i: ring[i] -> inward[i+1] -> outward[i]
        for i in 0..n {
            let tri = if i == 0 { f } else { self.emplace_face(false) };
            let cycle = [ring[i], inward[(i + 1) % n], outward[i]];
            for (k, &h) in cycle.iter().enumerate() {
                let he = self.halfedge_mut(h);
                he.next = cycle[(k + 1) % 3];
                he.face = tri;
            }
            self.face_mut(tri).halfedge = ring[i];
        }
        self.vertex_mut(centre).halfedge = outward[0];

        self.finish_edit(OP, centre)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::mesh::{BoneWeight, HalfEdgeMesh};
    use crate::ops::test_util::*;

    #[test]
    fn test_inset_quad() {
        let (mut mesh, ids) = quad_and_triangle();
        let quad = mesh.face_of(mesh.find_halfedge(ids[0], ids[3]).unwrap());
        let centre_pos = mesh.face_center(quad);

        let c = mesh.inset_vertex(quad).unwrap();

        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(*mesh.position(c), centre_pos);
        assert_eq!(mesh.vertex_degree(c), 4);
        assert_eq!(mesh.face_degree(quad), 3);
        assert_eq!(mesh.interior_face_ids().count(), 5);

        let mut positions = FIVE.to_vec();
        positions.push([centre_pos.x, centre_pos.y, centre_pos.z]);
        assert_shape(
            &mesh,
            &positions,
            &[&[0, 3, 5], &[3, 4, 5], &[4, 1, 5], &[1, 0, 5], &[1, 4, 2]],
        );
    }

    #[test]
    fn test_inset_blends_data() {
        let mut mesh = HalfEdgeMesh::new();
        let f = mesh.add_polygon(4, 1.0).unwrap();
        let corners: Vec<_> = mesh.face_vertices(f).collect();
        mesh.vertex_mut(corners[0]).bone_weights = vec![BoneWeight { bone: 0, weight: 1.0 }];

        let c = mesh.inset_vertex(f).unwrap();

        assert!(mesh.is_valid());
        assert!((mesh.position(c) - Point3::origin()).norm() < 1e-12);
        assert_eq!(mesh.vertex(c).bone_weights, vec![BoneWeight { bone: 0, weight: 0.25 }]);
        // Corner uvs of a centred square average to the middle of the map
        let h = mesh.vertex(c).halfedge;
        assert!((mesh.halfedge(h).corner_uv - nalgebra::Vector2::new(0.5, 0.5)).norm() < 1e-12);
    }

    #[test]
    fn test_inset_refuses_boundary() {
        let (mut mesh, _) = single_triangle();
        let hole = mesh.face_ids().find(|&f| mesh.is_boundary_face(f)).unwrap();
        let before = snapshot(&mesh);
        assert!(mesh.inset_vertex(hole).is_none());
        assert!(snapshot(&mesh) == before);
    }

    #[test]
    fn test_inset_sweep() {
        sweep(|m| m.face_ids().collect(), |m, f| m.inset_vertex(f).is_some());
    }
}
