//! Entry-point for subdomain decomposition.
//!
//! A caller assigns every element of a [`GlobalMesh`](crate::topology::mesh::GlobalMesh)
//! to one of `size` subdomains through a [`DecompositionBuilder`], then calls
//! [`DecompositionBuilder::finalize`]. The resulting [`Partition`] exposes,
//! per subdomain:
//!
//! - the local element set with consecutively renumbered entities,
//! - the part of the global boundary it owns,
//! - the coupling interface with each neighboring subdomain,
//! - optionally, oversampled (halo-extended) versions of the local set.

pub mod builder;
pub mod error;
mod halo;
pub mod index_set;
pub mod local_index_map;
pub mod partition;

#[cfg(test)]
mod tests;

pub use builder::{CornerMatch, DecompositionBuilder, FinalizeOptions, decompose};
pub use error::{DecompositionError, ErrorKind};
pub use index_set::{BoundaryInfo, FacetMarker, LocalIndexSet, LocalIntersection, MeshPart, PartKind};
pub use local_index_map::LocalIndexMap;
pub use partition::{DecompositionSummary, Partition, SubdomainSummary};
