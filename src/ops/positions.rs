//! Position updates that follow extrude and bevel.
//!
//! [`HalfEdgeMesh::extrude_face`], [`HalfEdgeMesh::bevel_vertex`] and
//! [`HalfEdgeMesh::bevel_edge`] only change connectivity; their new vertices
//! start on top of the vertices they came from. An interactive tool then
//! calls these helpers repeatedly with absolute parameters to place them.
//! Neither helper touches connectivity, and calling one twice with the same
//! arguments gives the same positions.

use nalgebra::{Point3, Vector3};

use super::Overshoot;
use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

impl HalfEdgeMesh {
    /// Place the vertices of an extruded face.
    ///
    /// Each vertex of `f` is paired with the vertex it was lifted from, read
    /// live from the ring around the face. The lifted vertex moves to its
    /// source position, pulled toward the centroid of the source ring by
    /// `shrink` (0 leaves it, 1 reaches the centroid, negative values push it
    /// out), then shifted by `offset`.
    pub fn extrude_positions(
        &mut self,
        f: FaceId,
        offset: Vector3<f64>,
        shrink: f64,
    ) -> Result<()> {
        if !self.contains_face(f) {
            return Err(MeshError::invalid_param("face", format!("{f:?}"), "no such face"));
        }

        let pairs: Vec<(VertexId, VertexId)> = self
            .face_halfedges(f)
            .map(|h| (self.origin(h), self.origin(self.next(self.next(self.twin(h))))))
            .collect();
        let centroid = pairs
            .iter()
            .fold(Vector3::zeros(), |acc, &(_, source)| acc + self.position(source).coords)
            / pairs.len() as f64;

        for (v, source) in pairs {
            let p = self.position(source).coords;
            self.set_position(v, Point3::from(p + (centroid - p) * shrink + offset));
        }

        log::trace!("extrude_positions: placed {f:?} with shrink {shrink}");
        Ok(())
    }

    /// Place the vertices of a bevelled face.
    ///
    /// `start_positions[i]` is the position the i-th vertex of `f` (walking
    /// from its representative half-edge) had when the bevel was made. Each
    /// vertex slides from there along the edge leaving the face at it, until
    /// it has moved `distance` along `direction`. Past the far end of the
    /// edge it stops or keeps going depending on
    /// [`EditOptions::bevel_overshoot`](super::EditOptions::bevel_overshoot);
    /// a vertex whose edge is perpendicular to `direction` stays at its
    /// start.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParameter`] when `f` does not exist or
    /// `start_positions` does not hold one position per vertex of `f`. No
    /// vertex moves in that case.
    pub fn bevel_positions(
        &mut self,
        f: FaceId,
        start_positions: &[Point3<f64>],
        direction: Vector3<f64>,
        distance: f64,
    ) -> Result<()> {
        if !self.contains_face(f) {
            return Err(MeshError::invalid_param("face", format!("{f:?}"), "no such face"));
        }
        let ring: Vec<HalfEdgeId> = self.face_halfedges(f).collect();
        if ring.len() != start_positions.len() {
            return Err(MeshError::invalid_param(
                "start_positions",
                start_positions.len(),
                "expected one position per vertex of the face",
            ));
        }

        let clamp = self.options.bevel_overshoot == Overshoot::Clamp;
        let placed: Vec<(VertexId, Point3<f64>)> = ring
            .iter()
            .zip(start_positions)
            .map(|(&h, &start)| {
                let outward = self.next(self.twin(h));
                let along = self.position(self.dest(outward)) - start;
                let rate = along.dot(&direction);
                if rate.abs() < f64::EPSILON {
                    return (self.origin(h), start);
                }
                let mut s = distance / rate;
                if clamp {
                    s = s.clamp(0.0, 1.0);
                }
                (self.origin(h), start + along * s)
            })
            .collect();

        for (v, p) in placed {
            self.set_position(v, p);
        }

        log::trace!("bevel_positions: placed {f:?} at distance {distance}");
        Ok(())
    }
}
