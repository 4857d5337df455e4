//! Handle and identity types for mesh elements.
//!
//! Every record lives in a generational arena, so the handles below stay
//! valid while other elements are inserted or erased and go stale only when
//! the element they name is erased. Handles say *where* a record lives;
//! [`ElementId`] says *which* record it is. Ids are handed out from a
//! process-wide counter and are never reused, so two records compare equal
//! by identity only if they are the same record.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{new_key_type, Key};

new_key_type! {
    /// A stable vertex handle.
    pub struct VertexId;

    /// A stable handle to an undirected edge.
    pub struct EdgeId;

    /// A stable half-edge handle.
    pub struct HalfEdgeId;

    /// A stable face handle (interior polygon or boundary loop).
    pub struct FaceId;
}

macro_rules! impl_handle {
    ($name:ident) => {
        impl $name {
            /// Create a null handle that refers to no element.
            #[inline]
            pub fn invalid() -> Self {
                Self::null()
            }

            /// Check if this handle is non-null.
            ///
            /// A non-null handle may still be stale if its element was erased;
            /// use the mesh's `contains_*` queries for that.
            #[inline]
            pub fn is_valid(self) -> bool {
                !self.is_null()
            }
        }
    };
}

impl_handle!(VertexId);
impl_handle!(EdgeId);
impl_handle!(HalfEdgeId);
impl_handle!(FaceId);

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique, monotonically increasing element identity.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ElementId(u64);

impl ElementId {
    /// Draw the next identity from the global counter.
    pub(crate) fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw identity value.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Any one mesh element, used when reporting where an invariant broke.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Element {
    /// A vertex.
    Vertex(VertexId),
    /// An undirected edge.
    Edge(EdgeId),
    /// A half-edge.
    HalfEdge(HalfEdgeId),
    /// A face or boundary loop.
    Face(FaceId),
}

impl From<VertexId> for Element {
    fn from(v: VertexId) -> Self {
        Element::Vertex(v)
    }
}

impl From<EdgeId> for Element {
    fn from(e: EdgeId) -> Self {
        Element::Edge(e)
    }
}

impl From<HalfEdgeId> for Element {
    fn from(h: HalfEdgeId) -> Self {
        Element::HalfEdge(h)
    }
}

impl From<FaceId> for Element {
    fn from(f: FaceId) -> Self {
        Element::Face(f)
    }
}
