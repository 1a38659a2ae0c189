//! MeshError: error type for the concrete mesh and the structured generators.
//!
//! Decomposition failures live in [`crate::decomposition::DecompositionError`],
//! which wraps this type when a mesh query fails underneath it.

use thiserror::Error;

use crate::topology::cell_type::CellType;
use crate::topology::entity::Entity;

/// Errors raised while building or querying a [`ConformingMesh`](crate::topology::conforming::ConformingMesh).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Geometric input is inconsistent (bad extents, wrong coordinate length, ...).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    /// The cell type has no reference-element table.
    #[error("Unsupported cell type: {0:?}")]
    UnsupportedCellType(CellType),
    /// A cell lists a different number of vertices than its type requires.
    #[error("Cell {cell} of type {cell_type:?} has {found} vertices, expected {expected}")]
    VertexCountMismatch {
        cell: usize,
        cell_type: CellType,
        expected: usize,
        found: usize,
    },
    /// A cell references a vertex that does not exist.
    #[error("Cell {cell} references missing vertex {vertex}")]
    MissingVertex { cell: usize, vertex: usize },
    /// Cells of different topological dimension were mixed in one mesh.
    #[error("Cell {cell} has dimension {found}, mesh dimension is {expected}")]
    MixedDimension {
        cell: usize,
        expected: usize,
        found: usize,
    },
    /// More than two cells share one facet.
    #[error("Topology error: facet {facet} is shared by {cells} cells (expected at most 2)")]
    NonManifoldFacet { facet: usize, cells: usize },
    /// Entity handle does not address an entity of this mesh.
    #[error("Unknown entity {0}")]
    UnknownEntity(Entity),
    /// Codimension exceeds the mesh dimension.
    #[error("Codimension {codim} out of range for a mesh of dimension {dimension}")]
    CodimOutOfRange { codim: usize, dimension: usize },
}
