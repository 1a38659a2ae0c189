//! `Entity`: a stable `(codimension, global index)` handle for mesh entities
//!
//! Every element, facet, edge and vertex of a [`GlobalMesh`](crate::topology::mesh::GlobalMesh)
//! is addressed by its codimension (0 = element, `D` = vertex for a
//! `D`-dimensional mesh) and an index that is dense and stable within that
//! codimension. The pair is cheap to copy, hash and order, so it is used as a
//! key throughout the decomposition.

use std::fmt;

/// Handle of one mesh entity.
///
/// Ordering is by codimension first, then by index.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Entity {
    codim: usize,
    index: usize,
}

impl Entity {
    /// Creates a handle for the entity with global `index` at codimension `codim`.
    #[inline]
    pub const fn new(codim: usize, index: usize) -> Self {
        Entity { codim, index }
    }

    /// Shorthand for a codimension-0 entity.
    #[inline]
    pub const fn element(index: usize) -> Self {
        Self::new(0, index)
    }

    #[inline]
    pub const fn codim(self) -> usize {
        self.codim
    }

    /// Global index within the codimension.
    #[inline]
    pub const fn index(self) -> usize {
        self.index
    }

    #[inline]
    pub const fn is_element(self) -> bool {
        self.codim == 0
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entity")
            .field(&self.codim)
            .field(&self.index)
            .finish()
    }
}

/// Prints `codim:index`.
impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.codim, self.index)
    }
}
