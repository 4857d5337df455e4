//! Half-edge mesh data structure.
//!
//! This module provides the element records, the element store and the
//! topology accessors of a polygonal half-edge mesh.
//!
//! # Structure
//!
//! - Each undirected **edge** owns two **half-edges** pointing in opposite
//!   directions
//! - Each half-edge knows its **twin**, its **next** half-edge around its face,
//!   the **vertex** it leaves, its **edge** and its **face**
//! - Each vertex, edge and face caches one incident half-edge; these
//!   representatives are re-seated explicitly by every operation that moves
//!   or erases the half-edge they name
//!
//! # Boundary Handling
//!
//! Holes are real faces flagged `boundary`. Every half-edge therefore has a
//! face, and walking `next` around a boundary face traces the hole's rim.
//!
//! # Storage
//!
//! Records live in [`SlotMap`]s. Emplacing an element never invalidates the
//! handles of other elements, and erasing is O(1). Erasing does not repair
//! references: callers unlink an element before they erase it.

use nalgebra::{Point3, Vector2, Vector3};
use slotmap::SlotMap;

use super::index::{EdgeId, ElementId, FaceId, HalfEdgeId, VertexId};
use crate::ops::EditOptions;

/// One entry of a vertex's skinning weight vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneWeight {
    /// Index of the influencing bone.
    pub bone: u32,
    /// Influence of that bone.
    pub weight: f64,
}

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub(crate) id: ElementId,

    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Skinning weights carried through edits.
    pub bone_weights: Vec<BoneWeight>,

    /// One outgoing half-edge from this vertex.
    pub halfedge: HalfEdgeId,
}

impl Vertex {
    /// The identity stamped on this vertex when it was emplaced.
    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }
}

/// An undirected edge, made of two opposite half-edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub(crate) id: ElementId,

    /// One of the two half-edges of this edge.
    pub halfedge: HalfEdgeId,

    /// Feature tag. Pure data, never consulted for validity.
    pub sharp: bool,
}

impl Edge {
    /// The identity stamped on this edge when it was emplaced.
    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    pub(crate) id: ElementId,

    /// The next half-edge around the face.
    pub next: HalfEdgeId,

    /// The opposite half-edge (pointing in the reverse direction).
    pub twin: HalfEdgeId,

    /// The vertex this half-edge originates from.
    pub vertex: VertexId,

    /// The undirected edge this half-edge belongs to.
    pub edge: EdgeId,

    /// The face (or boundary loop) this half-edge bounds.
    pub face: FaceId,

    /// Texture coordinate of the corner at `vertex` within `face`.
    pub corner_uv: Vector2<f64>,

    /// Shading normal of the corner at `vertex` within `face`.
    pub corner_normal: Vector3<f64>,
}

impl HalfEdge {
    /// The identity stamped on this half-edge when it was emplaced.
    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub(crate) id: ElementId,

    /// One half-edge on the loop of this face.
    pub halfedge: HalfEdgeId,

    /// Whether this face is a boundary loop (a hole) rather than a polygon.
    pub boundary: bool,
}

impl Face {
    /// The identity stamped on this face when it was emplaced.
    #[inline]
    pub fn id(&self) -> ElementId {
        self.id
    }
}

/// A polygonal half-edge mesh.
///
/// The mesh is edited only through the local operations in [`crate::ops`],
/// each of which either completes and leaves the mesh valid or refuses and
/// leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: SlotMap<VertexId, Vertex>,
    pub(crate) edges: SlotMap<EdgeId, Edge>,
    pub(crate) halfedges: SlotMap<HalfEdgeId, HalfEdge>,
    pub(crate) faces: SlotMap<FaceId, Face>,
    pub(crate) options: EditOptions,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with the given editing options.
    pub fn with_options(options: EditOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The editing options in effect.
    pub fn options(&self) -> &EditOptions {
        &self.options
    }

    /// Replace the editing options.
    pub fn set_options(&mut self, options: EditOptions) {
        self.options = options;
    }

    // ==================== Element Store ====================

    /// Insert a vertex with default fields and return its handle.
    pub fn emplace_vertex(&mut self) -> VertexId {
        self.vertices.insert(Vertex {
            id: ElementId::next(),
            position: Point3::origin(),
            bone_weights: Vec::new(),
            halfedge: HalfEdgeId::invalid(),
        })
    }

    /// Insert an edge with default fields and return its handle.
    pub fn emplace_edge(&mut self, sharp: bool) -> EdgeId {
        self.edges.insert(Edge {
            id: ElementId::next(),
            halfedge: HalfEdgeId::invalid(),
            sharp,
        })
    }

    /// Insert a half-edge with default fields and return its handle.
    pub fn emplace_halfedge(&mut self) -> HalfEdgeId {
        self.halfedges.insert(HalfEdge {
            id: ElementId::next(),
            next: HalfEdgeId::invalid(),
            twin: HalfEdgeId::invalid(),
            vertex: VertexId::invalid(),
            edge: EdgeId::invalid(),
            face: FaceId::invalid(),
            corner_uv: Vector2::zeros(),
            corner_normal: Vector3::zeros(),
        })
    }

    /// Insert a face with default fields and return its handle.
    pub fn emplace_face(&mut self, boundary: bool) -> FaceId {
        self.faces.insert(Face {
            id: ElementId::next(),
            halfedge: HalfEdgeId::invalid(),
            boundary,
        })
    }

    /// Remove a vertex. References to it are not repaired.
    pub fn erase_vertex(&mut self, v: VertexId) -> Option<Vertex> {
        self.vertices.remove(v)
    }

    /// Remove an edge. References to it are not repaired.
    pub fn erase_edge(&mut self, e: EdgeId) -> Option<Edge> {
        self.edges.remove(e)
    }

    /// Remove a half-edge. References to it are not repaired.
    pub fn erase_halfedge(&mut self, h: HalfEdgeId) -> Option<HalfEdge> {
        self.halfedges.remove(h)
    }

    /// Remove a face. References to it are not repaired.
    pub fn erase_face(&mut self, f: FaceId) -> Option<Face> {
        self.faces.remove(f)
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces, boundary loops included.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of boundary loops.
    pub fn num_boundary_loops(&self) -> usize {
        self.faces.values().filter(|f| f.boundary).count()
    }

    /// Check whether a vertex handle still names a live vertex.
    #[inline]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains_key(v)
    }

    /// Check whether an edge handle still names a live edge.
    #[inline]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains_key(e)
    }

    /// Check whether a half-edge handle still names a live half-edge.
    #[inline]
    pub fn contains_halfedge(&self, h: HalfEdgeId) -> bool {
        self.halfedges.contains_key(h)
    }

    /// Check whether a face handle still names a live face.
    #[inline]
    pub fn contains_face(&self, f: FaceId) -> bool {
        self.faces.contains_key(f)
    }

    /// Get a vertex by handle.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    /// Get a mutable vertex by handle.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id]
    }

    /// Get an edge by handle.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    /// Get a mutable edge by handle.
    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id]
    }

    /// Get a half-edge by handle.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id]
    }

    /// Get a mutable half-edge by handle.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId) -> &mut HalfEdge {
        &mut self.halfedges[id]
    }

    /// Get a face by handle.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id]
    }

    /// Get a mutable face by handle.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId) -> &mut Face {
        &mut self.faces[id]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(h).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(h).next
    }

    /// Get the previous half-edge around the face.
    ///
    /// Faces are singly linked, so this walks the face loop.
    pub fn prev(&self, h: HalfEdgeId) -> HalfEdgeId {
        let mut p = h;
        loop {
            let n = self.next(p);
            if n == h {
                return p;
            }
            p = n;
        }
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, h: HalfEdgeId) -> VertexId {
        self.halfedge(h).vertex
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, h: HalfEdgeId) -> VertexId {
        self.origin(self.twin(h))
    }

    /// Get the edge of a half-edge.
    #[inline]
    pub fn edge_of(&self, h: HalfEdgeId) -> EdgeId {
        self.halfedge(h).edge
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, h: HalfEdgeId) -> FaceId {
        self.halfedge(h).face
    }

    /// Get the representative half-edge of an edge.
    #[inline]
    pub fn edge_halfedge(&self, e: EdgeId) -> HalfEdgeId {
        self.edge(e).halfedge
    }

    /// Get the two endpoints of an edge, starting with the origin of its
    /// representative half-edge.
    pub fn edge_vertices(&self, e: EdgeId) -> [VertexId; 2] {
        let h = self.edge_halfedge(e);
        [self.origin(h), self.dest(h)]
    }

    /// Check if a face is a boundary loop.
    #[inline]
    pub fn is_boundary_face(&self, f: FaceId) -> bool {
        self.face(f).boundary
    }

    /// Check if a half-edge lies on a boundary loop.
    #[inline]
    pub fn is_boundary_halfedge(&self, h: HalfEdgeId) -> bool {
        self.is_boundary_face(self.face_of(h))
    }

    /// Check if an edge touches a boundary loop on either side.
    pub fn is_boundary_edge(&self, e: EdgeId) -> bool {
        let h = self.edge_halfedge(e);
        self.is_boundary_halfedge(h) || self.is_boundary_halfedge(self.twin(h))
    }

    /// Check if a vertex touches a boundary loop.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        self.vertex_halfedges(v)
            .any(|h| self.is_boundary_halfedge(h))
    }

    /// Number of edges incident to a vertex.
    pub fn vertex_degree(&self, v: VertexId) -> usize {
        self.vertex_halfedges(v).count()
    }

    /// Number of sides of a face.
    pub fn face_degree(&self, f: FaceId) -> usize {
        self.face_halfedges(f).count()
    }

    /// Find the half-edge running from `a` to `b`, if the two are joined.
    pub fn find_halfedge(&self, a: VertexId, b: VertexId) -> Option<HalfEdgeId> {
        self.vertex_halfedges(a).find(|&h| self.dest(h) == b)
    }

    /// Find the edge joining `a` and `b`, if any.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.find_halfedge(a, b).map(|h| self.edge_of(h))
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex handles.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys()
    }

    /// Iterate over all vertices with their handles.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices.iter()
    }

    /// Iterate over all edge handles.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys()
    }

    /// Iterate over all edges with their handles.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter()
    }

    /// Iterate over all half-edge handles.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.halfedges.keys()
    }

    /// Iterate over all half-edges with their handles.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> + '_ {
        self.halfedges.iter()
    }

    /// Iterate over all face handles, boundary loops included.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.keys()
    }

    /// Iterate over all faces with their handles.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> + '_ {
        self.faces.iter()
    }

    /// Iterate over the handles of non-boundary faces.
    pub fn interior_face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .iter()
            .filter(|(_, f)| !f.boundary)
            .map(|(id, _)| id)
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    pub fn vertex_halfedges(&self, v: VertexId) -> VertexHalfEdgeIter<'_> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_halfedges(v).map(|h| self.dest(h))
    }

    /// Iterate over faces around a vertex, boundary loops included.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        self.vertex_halfedges(v).map(|h| self.face_of(h))
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, self.face(f).halfedge)
    }

    /// Iterate over half-edges of the loop containing `h`, starting at `h`.
    pub fn loop_halfedges(&self, h: HalfEdgeId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, h)
    }

    /// Iterate over vertices of a face.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_halfedges(f).map(|h| self.origin(h))
    }

    // ==================== Geometry ====================

    /// Compute the centroid of a face's vertices.
    pub fn face_center(&self, f: FaceId) -> Point3<f64> {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for v in self.face_vertices(f) {
            sum += self.position(v).coords;
            count += 1;
        }
        if count == 0 {
            return Point3::origin();
        }
        Point3::from(sum / count as f64)
    }

    /// Compute the unit normal of a face.
    ///
    /// Sums the cross products of consecutive corner positions (Newell's
    /// method), which stays meaningful for non-planar polygons. Returns the
    /// zero vector for a face with no area.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        self.face_area_vector(f)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area of a face (of its planar projection for a warped
    /// polygon).
    pub fn face_area(&self, f: FaceId) -> f64 {
        0.5 * self.face_area_vector(f).norm()
    }

    fn face_area_vector(&self, f: FaceId) -> Vector3<f64> {
        let mut sum = Vector3::zeros();
        for h in self.face_halfedges(f) {
            let p0 = self.position(self.origin(h));
            let p1 = self.position(self.dest(h));
            sum += p0.coords.cross(&p1.coords);
        }
        sum
    }

    /// Compute the area-weighted normal at a vertex from its interior faces.
    pub fn vertex_normal(&self, v: VertexId) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        for f in self.vertex_faces(v) {
            if !self.is_boundary_face(f) {
                normal += self.face_area_vector(f);
            }
        }
        normal
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f64 {
        let [a, b] = self.edge_vertices(e);
        (self.position(b) - self.position(a)).norm()
    }

    /// Compute the midpoint of an edge.
    pub fn edge_midpoint(&self, e: EdgeId) -> Point3<f64> {
        let [a, b] = self.edge_vertices(e);
        Point3::from((self.position(a).coords + self.position(b).coords) * 0.5)
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut iter = self.vertices.values();
        let first = iter.next()?;

        let mut min = first.position;
        let mut max = first.position;

        for v in iter {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }
}

/// Iterator over half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> VertexHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, v: VertexId) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a> Iterator for VertexHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // If h goes v -> w, twin(h) goes w -> v and the half-edge after it
        // in its face leaves v again.
        self.current = self.mesh.next(self.mesh.twin(self.current));

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face loop.
pub struct FaceHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> FaceHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, start: HalfEdgeId) -> Self {
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a> Iterator for FaceHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}
