//! Data attached to mesh entities.
#![warn(missing_docs)]

pub mod coordinates;

/// Flat per-vertex coordinate storage.
pub use coordinates::Coordinates;
