#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-subdomains
//!
//! mesh-subdomains splits the elements of a global conforming mesh into
//! subdomains for overlapping domain-decomposition and multiscale solvers.
//! For every subdomain it provides a locally renumbered index set, the part
//! of the physical boundary the subdomain owns, the coupling interface to each
//! neighboring subdomain, and optional halo-extended ("oversampled") regions
//! whose artificial boundaries are marked as such.
//!
//! ## Features
//! - A [`GlobalMesh`](topology::GlobalMesh) trait describing the mesh capabilities the
//!   decomposition needs, and [`ConformingMesh`](topology::ConformingMesh), an in-memory
//!   implementation for simplices, quadrilaterals, hexahedra and prisms
//! - Structured interval, quadrilateral and hexahedral generators plus block assignment
//! - A two-phase [`DecompositionBuilder`](decomposition::DecompositionBuilder) producing an
//!   immutable [`Partition`](decomposition::Partition)
//! - Debug-build invariant checking through [`DebugInvariants`]
//!
//! ## Usage
//!
//! ```
//! use mesh_subdomains::prelude::*;
//!
//! let g = quad_mesh(4, 4, [0.0, 0.0], [1.0, 1.0])?;
//! let assignment = block_partition(&g, &[2, 2])?;
//! let partition = decompose(&g.mesh, &assignment, 4, FinalizeOptions::default())?;
//! assert_eq!(partition.neighbors_of(0)?.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod data;
pub mod debug_invariants;
pub mod decomposition;
pub mod mesh_error;
pub mod mesh_generation;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::data::coordinates::Coordinates;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::decomposition::{
        CornerMatch, DecompositionBuilder, DecompositionError, DecompositionSummary, ErrorKind,
        FacetMarker, FinalizeOptions, LocalIndexSet, LocalIntersection, Partition, PartKind,
        decompose,
    };
    pub use crate::mesh_error::MeshError;
    pub use crate::mesh_generation::{
        GeneratedMesh, block_partition, hex_mesh, interval_mesh, quad_mesh,
    };
    pub use crate::topology::{CellType, ConformingMesh, Entity, GlobalMesh, Intersection};
}
