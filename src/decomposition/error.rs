//! Decomposition errors for mesh-subdomains

use thiserror::Error;

use crate::mesh_error::MeshError;
use crate::topology::entity::Entity;

/// Coarse classification of a [`DecompositionError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    ConflictingAssignment,
    MissingAssignment,
    Connectivity,
    Lookup,
    Mesh,
}

/// Errors from building or querying a subdomain decomposition.
///
/// Every error is fatal for the operation that raised it: a failed
/// `finalize` leaves no partial result behind.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecompositionError {
    /// A decomposition needs at least one subdomain.
    #[error("Configuration error: a decomposition needs at least one subdomain")]
    NoSubdomains,
    /// Subdomain ids must be used consecutively from 0.
    #[error(
        "Configuration error: non-consecutive numbering, subdomain {missing} of {size} has no elements"
    )]
    NonConsecutiveNumbering { missing: usize, size: usize },
    /// An oversampled view was requested but no oversampling layer was built.
    #[error("Configuration error: oversampling was not enabled at finalize")]
    OversamplingNotEnabled,
    /// Two internal maps that must agree in size do not.
    #[error("Configuration error: {what} has size {found}, expected {expected}")]
    MapSizeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// `add` was called before `prepare`.
    #[error("Configuration error: prepare() must be called before add()")]
    NotPrepared,
    /// `add` was called after `finalize`.
    #[error("Configuration error: the decomposition is already finalized")]
    AlreadyFinalized,
    /// The result was requested before `finalize` succeeded.
    #[error("Configuration error: the decomposition has not been finalized")]
    NotFinalized,
    /// `add` was called with an id outside `0..size`.
    #[error("Configuration error: subdomain {subdomain} out of range for {size} subdomains")]
    InvalidSubdomain { subdomain: usize, size: usize },
    /// A structural invariant of the finished decomposition does not hold.
    #[error("Configuration error: invariant violated: {0}")]
    InvariantViolation(String),

    /// An element was added to two different subdomains.
    #[error(
        "Element {element} is already assigned to subdomain {existing}, cannot assign it to {requested}"
    )]
    ConflictingAssignment {
        element: Entity,
        existing: usize,
        requested: usize,
    },

    /// The mesh contains an element that was never assigned.
    #[error("Element {element} has no subdomain assignment")]
    MissingAssignment { element: Entity },

    /// A multi-element subdomain has no facet connecting two of its elements.
    #[error("Connectivity error: subdomain {subdomain} has {elements} elements but no internal facet")]
    Disconnected { subdomain: usize, elements: usize },

    /// Query for a subdomain outside `0..size`.
    #[error("Lookup error: subdomain {subdomain} out of range for {size} subdomains")]
    UnknownSubdomain { subdomain: usize, size: usize },
    /// Query for the boundary view of a subdomain that does not touch the domain boundary.
    #[error("Lookup error: subdomain {subdomain} has no domain boundary")]
    NoBoundary { subdomain: usize },
    /// Query for the coupling of two subdomains that are not neighbors.
    #[error("Lookup error: subdomain {neighbor} is not a neighbor of subdomain {subdomain}")]
    NotNeighbors { subdomain: usize, neighbor: usize },
    /// The entity is not part of the queried index set.
    #[error("Lookup error: entity {entity} not contained")]
    EntityNotContained { entity: Entity },
    /// The requested oversampling layer does not exist.
    #[error("Lookup error: oversampling layer {layer} requested, {available} available")]
    NoSuchLayer { layer: usize, available: usize },
    /// A codimension-0 entity was expected.
    #[error("Lookup error: {entity} is not an element")]
    NotAnElement { entity: Entity },

    /// The mesh rejected a query.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl DecompositionError {
    /// The taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        use DecompositionError::*;
        match self {
            NoSubdomains
            | NonConsecutiveNumbering { .. }
            | OversamplingNotEnabled
            | MapSizeMismatch { .. }
            | NotPrepared
            | AlreadyFinalized
            | NotFinalized
            | InvalidSubdomain { .. }
            | InvariantViolation(_) => ErrorKind::Configuration,
            ConflictingAssignment { .. } => ErrorKind::ConflictingAssignment,
            MissingAssignment { .. } => ErrorKind::MissingAssignment,
            Disconnected { .. } => ErrorKind::Connectivity,
            UnknownSubdomain { .. }
            | NoBoundary { .. }
            | NotNeighbors { .. }
            | EntityNotContained { .. }
            | NoSuchLayer { .. }
            | NotAnElement { .. } => ErrorKind::Lookup,
            Mesh(_) => ErrorKind::Mesh,
        }
    }
}
