//! Global mesh topology.
//!
//! This module provides the types the decomposition works against:
//! - [`Entity`](entity::Entity): a `(codimension, index)` handle,
//! - [`CellType`](cell_type::CellType) with reference-element sub-entity tables,
//! - the [`GlobalMesh`](mesh::GlobalMesh) capability trait,
//! - [`ConformingMesh`](conforming::ConformingMesh), an in-memory implementation.

pub mod cell_type;
pub mod conforming;
pub mod entity;
pub mod mesh;

pub use cell_type::CellType;
pub use conforming::ConformingMesh;
pub use entity::Entity;
pub use mesh::{GlobalMesh, Intersection};
