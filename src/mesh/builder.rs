//! Mesh construction utilities.
//!
//! This module builds half-edge meshes from indexed polygon lists, generates
//! standalone procedural polygons, and exports finished meshes back to the
//! indexed form renderers and acceleration structures consume.
//!
//! Construction wires records directly through the element store and so
//! bypasses the local-operation machinery; every function here validates its
//! input up front and only returns meshes that satisfy the structural
//! invariants.

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use nalgebra::{Point3, Vector2, Vector3};

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and polygonal faces.
///
/// Faces are lists of vertex indices in counter-clockwise order and may have
/// any number of sides (at least three). Each hole in the surface becomes a
/// boundary face. Vertex handles are allocated in input order, so
/// `mesh.vertex_ids()` yields them in the same order as `vertices`.
///
/// # Errors
/// - [`MeshError::EmptyMesh`] if `faces` is empty
/// - [`MeshError::InvalidVertexIndex`] for an out-of-range index
/// - [`MeshError::DegenerateFace`] for a face with fewer than three sides or a
///   repeated vertex
/// - [`MeshError::NonManifoldEdge`] if two faces use the same directed edge
/// - [`MeshError::NonManifold`] if a vertex's fan is not a single disk or
///   half-disk
/// - [`MeshError::UnreferencedVertex`] for a vertex no face uses
///
/// # Example
/// ```
/// use whittle::mesh::build_from_polygons;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(2.0, 0.5, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
///
/// let mesh = build_from_polygons(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 5);
/// assert_eq!(mesh.num_edges(), 6);
/// assert_eq!(mesh.num_boundary_loops(), 1);
/// ```
pub fn build_from_polygons(vertices: &[Point3<f64>], faces: &[Vec<usize>]) -> Result<HalfEdgeMesh> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    // Validate indices and face shapes before touching the store
    let mut referenced = vec![false; vertices.len()];
    for (fi, face) in faces.iter().enumerate() {
        if face.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        for (i, &vi) in face.iter().enumerate() {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if face[..i].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
            referenced[vi] = true;
        }
    }
    if let Some(vertex) = referenced.iter().position(|&r| !r) {
        return Err(MeshError::UnreferencedVertex { vertex });
    }

    let mut mesh = HalfEdgeMesh::new();

    let vertex_ids: Vec<VertexId> = vertices
        .iter()
        .map(|&pos| {
            let v = mesh.emplace_vertex();
            mesh.set_position(v, pos);
            v
        })
        .collect();

    // Map from directed edge (v0, v1) to half-edge ID, plus the same edges in
    // face order so that the passes below are deterministic.
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId> = HashMap::new();
    let mut directed: Vec<(usize, usize, HalfEdgeId)> = Vec::new();

    // First pass: create interior faces and their half-edge loops
    for face in faces {
        let face_id = mesh.emplace_face(false);
        let loop_hes: Vec<HalfEdgeId> = face.iter().map(|_| mesh.emplace_halfedge()).collect();
        mesh.face_mut(face_id).halfedge = loop_hes[0];

        let n = face.len();
        for i in 0..n {
            let (a, b) = (face[i], face[(i + 1) % n]);
            let he = loop_hes[i];
            {
                let h = mesh.halfedge_mut(he);
                h.vertex = vertex_ids[a];
                h.next = loop_hes[(i + 1) % n];
                h.face = face_id;
            }
            if edge_map.insert((a, b), he).is_some() {
                return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
            }
            directed.push((a, b, he));
        }
    }

    // Second pass: pair twins into edges, creating boundary half-edges for
    // unmatched sides
    let mut boundary_out: HashMap<usize, HalfEdgeId> = HashMap::new();
    let mut boundary_hes: Vec<HalfEdgeId> = Vec::new();
    for &(a, b, he) in &directed {
        if mesh.halfedge(he).edge.is_valid() {
            continue;
        }
        let edge = mesh.emplace_edge(false);
        mesh.edge_mut(edge).halfedge = he;

        let twin = match edge_map.get(&(b, a)) {
            Some(&twin) => twin,
            None => {
                let bhe = mesh.emplace_halfedge();
                mesh.halfedge_mut(bhe).vertex = vertex_ids[b];
                if boundary_out.insert(b, bhe).is_some() {
                    return Err(MeshError::NonManifold {
                        details: format!("vertex {b} has more than one boundary gap"),
                    });
                }
                boundary_hes.push(bhe);
                bhe
            }
        };

        mesh.halfedge_mut(he).twin = twin;
        mesh.halfedge_mut(he).edge = edge;
        mesh.halfedge_mut(twin).twin = he;
        mesh.halfedge_mut(twin).edge = edge;
    }

    // Third pass: chain boundary half-edges into loops, one boundary face each
    link_boundary_loops(&mut mesh, &boundary_hes, &boundary_out, &vertex_ids)?;

    // Fourth pass: seat vertex representatives and reject pinched fans
    seat_vertex_halfedges(&mut mesh, &directed, &boundary_out, &vertex_ids)?;

    Ok(mesh)
}

/// Link boundary half-edges into loops and give each loop a boundary face.
fn link_boundary_loops(
    mesh: &mut HalfEdgeMesh,
    boundary_hes: &[HalfEdgeId],
    boundary_out: &HashMap<usize, HalfEdgeId>,
    vertex_ids: &[VertexId],
) -> Result<()> {
    let index_of: HashMap<VertexId, usize> =
        vertex_ids.iter().enumerate().map(|(i, &v)| (v, i)).collect();

    // A boundary half-edge b -> a continues with the boundary half-edge
    // leaving a. Each one must be continued exactly once for the loops to
    // close.
    let mut continued: HashSet<HalfEdgeId> = HashSet::new();
    for &bhe in boundary_hes {
        let dest = mesh.dest(bhe);
        let next = index_of
            .get(&dest)
            .and_then(|i| boundary_out.get(i))
            .copied()
            .ok_or_else(|| MeshError::NonManifold {
                details: "boundary loop does not close".to_string(),
            })?;
        if !continued.insert(next) {
            return Err(MeshError::NonManifold {
                details: "boundary loops cross at a vertex".to_string(),
            });
        }
        mesh.halfedge_mut(bhe).next = next;
    }

    for &start in boundary_hes {
        if mesh.halfedge(start).face.is_valid() {
            continue;
        }
        let face = mesh.emplace_face(true);
        mesh.face_mut(face).halfedge = start;

        let mut he = start;
        loop {
            mesh.halfedge_mut(he).face = face;
            he = mesh.next(he);
            if he == start {
                break;
            }
        }
    }

    Ok(())
}

/// Point every vertex at an outgoing half-edge, preferring one on a boundary
/// loop, and check that its half-edge ring covers all of its half-edges.
fn seat_vertex_halfedges(
    mesh: &mut HalfEdgeMesh,
    directed: &[(usize, usize, HalfEdgeId)],
    boundary_out: &HashMap<usize, HalfEdgeId>,
    vertex_ids: &[VertexId],
) -> Result<()> {
    let mut outgoing = vec![0usize; vertex_ids.len()];
    for &(a, _, he) in directed {
        outgoing[a] += 1;
        mesh.vertex_mut(vertex_ids[a]).halfedge = he;
    }
    for (&a, &bhe) in boundary_out {
        outgoing[a] += 1;
        mesh.vertex_mut(vertex_ids[a]).halfedge = bhe;
    }

    for (i, &v) in vertex_ids.iter().enumerate() {
        let start = mesh.vertex(v).halfedge;
        let mut he = start;
        let mut ring = 0usize;
        loop {
            ring += 1;
            he = mesh.next(mesh.twin(he));
            if he == start || ring > outgoing[i] {
                break;
            }
        }
        if ring != outgoing[i] {
            return Err(MeshError::NonManifold {
                details: format!("vertex {i} joins more than one fan of faces"),
            });
        }
    }

    Ok(())
}

/// Build a half-edge mesh from vertices and triangle faces.
///
/// # Example
/// ```
/// use whittle::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 2); // the triangle and its boundary loop
/// ```
pub fn build_from_triangles(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh> {
    let polygons: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();
    build_from_polygons(vertices, &polygons)
}

/// Build a half-edge mesh from vertices and quad faces.
pub fn build_from_quads(vertices: &[Point3<f64>], faces: &[[usize; 4]]) -> Result<HalfEdgeMesh> {
    let polygons: Vec<Vec<usize>> = faces.iter().map(|f| f.to_vec()).collect();
    build_from_polygons(vertices, &polygons)
}

impl HalfEdgeMesh {
    /// Add a standalone regular polygon in the XY plane, centred on the
    /// origin, together with the boundary loop around it.
    ///
    /// The first side points along +X. Corner uvs map the polygon's
    /// circumscribed square onto `[0, 1]^2`; face corners get a +Z normal and
    /// boundary corners a -Z normal. Returns `None` for fewer than three
    /// sides.
    ///
    /// # Example
    /// ```
    /// use whittle::mesh::HalfEdgeMesh;
    ///
    /// let mut mesh = HalfEdgeMesh::new();
    /// let face = mesh.add_polygon(6, 1.0).unwrap();
    /// assert_eq!(mesh.face_degree(face), 6);
    /// assert!(mesh.is_valid());
    /// ```
    pub fn add_polygon(&mut self, sides: usize, radius: f64) -> Option<FaceId> {
        if sides < 3 {
            log::debug!("add_polygon: rejected {sides} sides");
            return None;
        }

        let start_angle = (-0.25 - 0.5 / sides as f64) * TAU;
        let ring: Vec<VertexId> = (0..sides)
            .map(|s| {
                let angle = s as f64 / sides as f64 * TAU + start_angle;
                let v = self.emplace_vertex();
                self.set_position(v, Point3::new(radius * angle.cos(), radius * angle.sin(), 0.0));
                v
            })
            .collect();

        let face = self.emplace_face(false);
        let boundary = self.emplace_face(true);
        let uv_of =
            |p: &Point3<f64>| Vector2::new(p.x, p.y) / (2.0 * radius) + Vector2::repeat(0.5);

        let mut inner = Vec::with_capacity(sides);
        for s in 0..sides {
            let a = ring[s];
            let b = ring[(s + 1) % sides];

            let h = self.emplace_halfedge();
            let t = self.emplace_halfedge();
            let e = self.emplace_edge(false);

            let (uv_a, uv_b) = (uv_of(self.position(a)), uv_of(self.position(b)));
            {
                let he = self.halfedge_mut(h);
                he.twin = t;
                he.vertex = a;
                he.edge = e;
                he.face = face;
                he.corner_uv = uv_a;
                he.corner_normal = Vector3::z();
            }
            {
                let he = self.halfedge_mut(t);
                he.twin = h;
                he.vertex = b;
                he.edge = e;
                he.face = boundary;
                he.corner_uv = uv_b;
                he.corner_normal = -Vector3::z();
            }

            self.edge_mut(e).halfedge = h;
            self.vertex_mut(a).halfedge = h;
            inner.push(h);
        }

        for s in 0..sides {
            let (h, h_next) = (inner[s], inner[(s + 1) % sides]);
            self.halfedge_mut(h).next = h_next;
            let (t, t_next) = (self.twin(h_next), self.twin(h));
            self.halfedge_mut(t).next = t_next;
        }
        self.face_mut(face).halfedge = inner[0];
        self.face_mut(boundary).halfedge = self.twin(inner[sides - 1]);

        log::trace!("add_polygon: emplaced {sides}-gon {face:?}");
        Some(face)
    }

    /// Export vertex positions and the index loops of all non-boundary faces.
    ///
    /// Indices refer to positions in the returned vertex list, which follows
    /// the store's iteration order.
    pub fn to_polygons(&self) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
        let index_of: HashMap<VertexId, usize> =
            self.vertex_ids().enumerate().map(|(i, v)| (v, i)).collect();
        let positions = self.vertices().map(|(_, v)| v.position).collect();
        let polygons = self
            .interior_face_ids()
            .map(|f| self.face_vertices(f).map(|v| index_of[&v]).collect())
            .collect();
        (positions, polygons)
    }

    /// Export vertex positions and a fan triangulation of all non-boundary
    /// faces.
    pub fn to_triangles(&self) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let (positions, polygons) = self.to_polygons();
        let triangles = polygons
            .iter()
            .flat_map(|poly| (1..poly.len() - 1).map(move |i| [poly[0], poly[i], poly[i + 1]]))
            .collect();
        (positions, triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        (vertices, vec![vec![0, 1, 2]])
    }

    fn quad_and_triangle() -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
        let vertices = vec![
            Point3::new(-1.0, 1.1, 0.0),
            Point3::new(1.1, 1.0, 0.0),
            Point3::new(2.2, 0.0, 0.0),
            Point3::new(-1.3, -0.7, 0.0),
            Point3::new(1.4, -1.0, 0.0),
        ];
        (vertices, vec![vec![0, 3, 4, 1], vec![1, 4, 2]])
    }

    #[test]
    fn test_single_triangle() {
        let (vertices, faces) = single_triangle();
        let mesh = build_from_polygons(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_edges(), 3);
        assert_eq!(mesh.num_halfedges(), 6);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_boundary_loops(), 1);
        assert!(mesh.is_valid());

        // Boundary vertices point at their boundary half-edge
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_halfedge(mesh.vertex(v).halfedge));
        }
    }

    #[test]
    fn test_mixed_polygons() {
        let (vertices, faces) = quad_and_triangle();
        let mesh = build_from_polygons(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());

        let ids: Vec<VertexId> = mesh.vertex_ids().collect();
        let shared = mesh.find_edge(ids[1], ids[4]).unwrap();
        assert!(!mesh.is_boundary_edge(shared));
        assert_eq!(mesh.vertex_degree(ids[1]), 3);
        assert_eq!(mesh.vertex_degree(ids[2]), 2);
    }

    #[test]
    fn test_closed_tetrahedron() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let faces = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]];
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_boundary_loops(), 0);
        assert_eq!(mesh.num_edges(), 6);
        assert!(mesh.is_valid());
        // Euler characteristic of a sphere
        let chi = mesh.num_vertices() as i64 - mesh.num_edges() as i64 + mesh.num_faces() as i64;
        assert_eq!(chi, 2);
    }

    #[test]
    fn test_two_holes() {
        // A 5x5 grid of quads with two separated interior cells left out has
        // two holes plus the outer rim.
        let n = 6;
        let vertices: Vec<Point3<f64>> = (0..n * n)
            .map(|i| Point3::new((i % n) as f64, (i / n) as f64, 0.0))
            .collect();
        let mut faces = Vec::new();
        for y in 0..n - 1 {
            for x in 0..n - 1 {
                if (x, y) == (1, 1) || (x, y) == (3, 3) {
                    continue;
                }
                let i = y * n + x;
                faces.push([i, i + 1, i + n + 1, i + n]);
            }
        }
        let mesh = build_from_quads(&vertices, &faces).unwrap();
        assert_eq!(mesh.num_boundary_loops(), 3);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_invalid_vertex_index() {
        let (vertices, _) = single_triangle();
        let result = build_from_polygons(&vertices, &[vec![0, 1, 5]]);
        assert!(matches!(result, Err(MeshError::InvalidVertexIndex { face: 0, vertex: 5 })));
    }

    #[test]
    fn test_degenerate_face() {
        let (vertices, _) = single_triangle();
        let result = build_from_polygons(&vertices, &[vec![0, 1, 1]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));

        let result = build_from_polygons(&vertices, &[vec![0, 1]]);
        assert!(matches!(result, Err(MeshError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_rejects_bad_topology() {
        let (vertices, _) = single_triangle();
        assert!(matches!(build_from_polygons(&vertices, &[]), Err(MeshError::EmptyMesh)));

        // Same orientation twice
        let result = build_from_polygons(&vertices, &[vec![0, 1, 2], vec![1, 0, 2], vec![0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::NonManifoldEdge { .. })));

        // Two triangles touching at a single vertex
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        let result = build_from_polygons(&vertices, &[vec![0, 1, 2], vec![0, 3, 4]]);
        assert!(matches!(result, Err(MeshError::NonManifold { .. })));

        // Unused vertex
        let result = build_from_polygons(&vertices, &[vec![0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::UnreferencedVertex { vertex: 3 })));
    }

    #[test]
    fn test_add_polygon() {
        let mut mesh = HalfEdgeMesh::new();
        assert!(mesh.add_polygon(2, 1.0).is_none());
        assert_eq!(mesh.num_vertices(), 0);

        let face = mesh.add_polygon(4, 2.0).unwrap();
        assert!(mesh.is_valid());
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_boundary_loops(), 1);

        // First side points along +X
        let h = mesh.face(face).halfedge;
        let dir = mesh.position(mesh.dest(h)) - mesh.position(mesh.origin(h));
        assert!(dir.y.abs() < 1e-12 && dir.x > 0.0);

        for h in mesh.face_halfedges(face) {
            let p = mesh.position(mesh.origin(h));
            let uv = mesh.halfedge(h).corner_uv;
            assert!((uv.x - (p.x / 4.0 + 0.5)).abs() < 1e-12);
            assert!((uv.y - (p.y / 4.0 + 0.5)).abs() < 1e-12);
            assert_eq!(mesh.halfedge(h).corner_normal, Vector3::z());
            assert_eq!(mesh.halfedge(mesh.twin(h)).corner_normal, -Vector3::z());
        }
        assert!((mesh.face_normal(face) - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = quad_and_triangle();
        let mesh = build_from_polygons(&vertices, &faces).unwrap();
        let (out_vertices, mut out_faces) = mesh.to_polygons();

        assert_eq!(out_vertices, vertices);
        out_faces.sort();
        assert_eq!(out_faces, vec![vec![0, 3, 4, 1], vec![1, 4, 2]]);

        let (_, triangles) = mesh.to_triangles();
        assert_eq!(triangles.len(), 3);
    }
}
