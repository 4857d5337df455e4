//! Attribute interpolation for synthesized elements.
//!
//! When an operation creates a vertex or a corner, it fills the new
//! element's data by blending the data of existing elements with uniform
//! weights. Callers pick the sources to place the blend: bisecting an edge
//! blends its two endpoints for the new vertex, and blends a corner with the
//! next corner of its face for the new corner.

use nalgebra::{Vector2, Vector3};

use super::halfedge::{BoneWeight, HalfEdgeMesh};
use super::index::{HalfEdgeId, VertexId};

/// Element kinds that carry blendable data.
pub trait Interpolated: Copy {
    /// Overwrite the data of `dst` with the uniform blend of `sources`.
    ///
    /// All sources are read before `dst` is written, so `dst` may itself be
    /// one of the sources. An empty source list leaves `dst` untouched.
    fn interpolate(mesh: &mut HalfEdgeMesh, sources: &[Self], dst: Self);
}

impl Interpolated for VertexId {
    fn interpolate(mesh: &mut HalfEdgeMesh, sources: &[Self], dst: Self) {
        if sources.is_empty() {
            return;
        }
        let w = 1.0 / sources.len() as f64;

        let mut blended: Vec<BoneWeight> = Vec::new();
        for &v in sources {
            for bw in &mesh.vertex(v).bone_weights {
                match blended.iter_mut().find(|b| b.bone == bw.bone) {
                    Some(b) => b.weight += w * bw.weight,
                    None => blended.push(BoneWeight {
                        bone: bw.bone,
                        weight: w * bw.weight,
                    }),
                }
            }
        }
        blended.sort_by_key(|b| b.bone);

        mesh.vertex_mut(dst).bone_weights = blended;
    }
}

impl Interpolated for HalfEdgeId {
    fn interpolate(mesh: &mut HalfEdgeMesh, sources: &[Self], dst: Self) {
        if sources.is_empty() {
            return;
        }
        let w = 1.0 / sources.len() as f64;

        let mut uv = Vector2::zeros();
        let mut normal = Vector3::zeros();
        for &h in sources {
            let he = mesh.halfedge(h);
            uv += he.corner_uv * w;
            normal += he.corner_normal * w;
        }

        let he = mesh.halfedge_mut(dst);
        he.corner_uv = uv;
        he.corner_normal = normal;
    }
}

impl HalfEdgeMesh {
    /// Blend the data of `sources` into `dst` with weights `1 / sources.len()`.
    ///
    /// For vertices this blends bone weights; for half-edges it blends corner
    /// uvs and normals.
    pub fn interpolate_data<T: Interpolated>(&mut self, sources: &[T], dst: T) {
        T::interpolate(self, sources, dst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_vertex_weights_blend() {
        let mut mesh = HalfEdgeMesh::new();
        let a = mesh.emplace_vertex();
        let b = mesh.emplace_vertex();
        let m = mesh.emplace_vertex();
        mesh.vertex_mut(a).bone_weights = vec![
            BoneWeight { bone: 0, weight: 1.0 },
            BoneWeight { bone: 3, weight: 0.5 },
        ];
        mesh.vertex_mut(b).bone_weights = vec![BoneWeight { bone: 3, weight: 1.0 }];

        mesh.interpolate_data(&[b, a], m);

        let w = &mesh.vertex(m).bone_weights;
        assert_eq!(w.len(), 2);
        assert_eq!(w[0].bone, 0);
        assert!((w[0].weight - 0.5).abs() < 1e-12);
        assert_eq!(w[1].bone, 3);
        assert!((w[1].weight - 0.75).abs() < 1e-12);
        // Positions are not attributes
        assert_eq!(mesh.vertex(m).position, Point3::origin());
    }

    #[test]
    fn test_corner_blend_in_place() {
        let mut mesh = HalfEdgeMesh::new();
        let h0 = mesh.emplace_halfedge();
        let h1 = mesh.emplace_halfedge();
        mesh.halfedge_mut(h0).corner_uv = Vector2::new(0.0, 1.0);
        mesh.halfedge_mut(h0).corner_normal = Vector3::new(0.0, 0.0, 1.0);
        mesh.halfedge_mut(h1).corner_uv = Vector2::new(1.0, 0.0);
        mesh.halfedge_mut(h1).corner_normal = Vector3::new(1.0, 0.0, 0.0);

        // Destination among the sources
        mesh.interpolate_data(&[h0, h1], h0);

        assert!((mesh.halfedge(h0).corner_uv - Vector2::new(0.5, 0.5)).norm() < 1e-12);
        assert!((mesh.halfedge(h0).corner_normal - Vector3::new(0.5, 0.0, 0.5)).norm() < 1e-12);
        assert_eq!(mesh.halfedge(h1).corner_uv, Vector2::new(1.0, 0.0));
    }

    #[test]
    fn test_no_sources() {
        let mut mesh = HalfEdgeMesh::new();
        let h = mesh.emplace_halfedge();
        mesh.halfedge_mut(h).corner_uv = Vector2::new(0.25, 0.75);
        mesh.interpolate_data::<HalfEdgeId>(&[], h);
        assert_eq!(mesh.halfedge(h).corner_uv, Vector2::new(0.25, 0.75));
    }
}
