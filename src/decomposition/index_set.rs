//! Restricted index sets: one mesh part seen as if it were its own mesh.
//!
//! Every part of a decomposition (local, boundary, coupling, oversampled) is a
//! [`MeshPart`]: a [`LocalIndexMap`] plus the facets that must look like
//! boundary from inside the part. [`LocalIndexSet`] borrows a part together
//! with the global mesh and answers index queries in local numbering.

use std::collections::BTreeMap;

use crate::decomposition::error::DecompositionError;
use crate::decomposition::local_index_map::LocalIndexMap;
use crate::topology::cell_type::CellType;
use crate::topology::entity::Entity;
use crate::topology::mesh::GlobalMesh;

/// Why a facet is treated as boundary inside a mesh part.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FacetMarker {
    /// The facet lies on the global mesh boundary.
    DomainBoundary,
    /// Fake boundary: the element on the other side belongs to subdomain `neighbor`.
    Subdomain { neighbor: usize },
    /// Fake boundary: the element on the other side is outside an oversampled region.
    Halo,
}

impl FacetMarker {
    /// `true` for locally assigned markers on facets that are interior to the global mesh.
    #[inline]
    pub fn is_fake(self) -> bool {
        !matches!(self, FacetMarker::DomainBoundary)
    }

    /// Integer boundary id for consumers that work with numeric markers.
    pub fn boundary_id(self) -> i32 {
        match self {
            FacetMarker::DomainBoundary => 1,
            FacetMarker::Subdomain { .. } => 2,
            FacetMarker::Halo => 3,
        }
    }
}

/// Per element (global index): local facet id → marker.
pub type BoundaryInfo = BTreeMap<usize, BTreeMap<usize, FacetMarker>>;

/// Storage of one part of the decomposition.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshPart {
    pub(crate) map: LocalIndexMap,
    pub(crate) markers: BoundaryInfo,
}

impl MeshPart {
    pub(crate) fn new(map: LocalIndexMap, markers: BoundaryInfo) -> Self {
        Self { map, markers }
    }

    pub fn index_map(&self) -> &LocalIndexMap {
        &self.map
    }

    pub fn markers(&self) -> &BoundaryInfo {
        &self.markers
    }

    /// Total number of marked facets.
    pub fn marked_facet_count(&self) -> usize {
        self.markers.values().map(BTreeMap::len).sum()
    }
}

/// Which part of the decomposition a [`LocalIndexSet`] shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartKind {
    Local,
    Boundary,
    Coupling { neighbor: usize },
    Oversampled { layer: usize },
}

/// A facet of a part element, with the part's boundary markers applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalIntersection {
    pub local_facet: usize,
    pub facet: Entity,
    /// Element on the other side in the global mesh.
    pub outside: Option<Entity>,
    pub marker: Option<FacetMarker>,
}

impl LocalIntersection {
    /// `true` if the facet bounds the part.
    #[inline]
    pub fn boundary(&self) -> bool {
        self.marker.is_some()
    }

    /// `true` if the facet connects two elements of the part.
    #[inline]
    pub fn neighbor(&self) -> bool {
        self.marker.is_none() && self.outside.is_some()
    }
}

/// Read-only view of one mesh part in local numbering.
#[derive(Debug)]
pub struct LocalIndexSet<'a, M: GlobalMesh> {
    mesh: &'a M,
    part: &'a MeshPart,
    subdomain: usize,
    kind: PartKind,
}

impl<M: GlobalMesh> Clone for LocalIndexSet<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: GlobalMesh> Copy for LocalIndexSet<'_, M> {}

impl<'a, M: GlobalMesh> LocalIndexSet<'a, M> {
    pub(crate) fn new(mesh: &'a M, part: &'a MeshPart, subdomain: usize, kind: PartKind) -> Self {
        Self {
            mesh,
            part,
            subdomain,
            kind,
        }
    }

    pub fn subdomain(&self) -> usize {
        self.subdomain
    }

    pub fn kind(&self) -> PartKind {
        self.kind
    }

    pub fn index_map(&self) -> &'a LocalIndexMap {
        &self.part.map
    }

    /// Local index of `entity`.
    pub fn index(&self, entity: Entity) -> Result<usize, DecompositionError> {
        self.part
            .map
            .local_index(entity)
            .ok_or(DecompositionError::EntityNotContained { entity })
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.part.map.contains(entity)
    }

    /// Local index of the `i`-th sub-entity at codimension `codim` of `element`.
    pub fn sub_index(
        &self,
        element: Entity,
        i: usize,
        codim: usize,
    ) -> Result<usize, DecompositionError> {
        self.require_element(element)?;
        let sub = self.mesh.sub_entity(element, i, codim)?;
        self.index(sub)
    }

    /// Number of entities at codimension `codim`.
    pub fn size(&self, codim: usize) -> usize {
        self.part.map.size(codim)
    }

    /// Number of entities of reference type `cell_type`.
    pub fn size_of_type(&self, cell_type: CellType) -> usize {
        self.part.map.size_of_type(cell_type)
    }

    /// Reference types present at codimension `codim`.
    pub fn geom_types(&self, codim: usize) -> Vec<CellType> {
        self.part.map.geom_types(codim)
    }

    /// Entities at codimension `codim` in local order.
    pub fn entities(&self, codim: usize) -> impl Iterator<Item = Entity> + 'a {
        self.part.map.entities(codim)
    }

    /// Elements in local order.
    pub fn elements(&self) -> impl Iterator<Item = Entity> + 'a {
        self.part.map.elements()
    }

    /// Global entity behind local index `local` at codimension `codim`.
    pub fn global_entity(&self, codim: usize, local: usize) -> Option<Entity> {
        self.part.map.global_entity(codim, local)
    }

    /// Markers recorded for `element`, keyed by local facet id.
    pub fn boundary_markers(&self, element: Entity) -> Option<&'a BTreeMap<usize, FacetMarker>> {
        if !element.is_element() {
            return None;
        }
        self.part.markers.get(&element.index())
    }

    /// `true` if the given facet of `element` carries a locally assigned marker.
    pub fn is_fake_boundary(&self, element: Entity, local_facet: usize) -> bool {
        self.boundary_markers(element)
            .and_then(|m| m.get(&local_facet))
            .is_some_and(|m| m.is_fake())
    }

    /// Facets of `element` with this part's boundary markers applied.
    pub fn intersections(
        &self,
        element: Entity,
    ) -> Result<Vec<LocalIntersection>, DecompositionError> {
        self.require_element(element)?;
        let markers = self.boundary_markers(element);
        Ok(self
            .mesh
            .intersections(element)?
            .into_iter()
            .map(|i| LocalIntersection {
                local_facet: i.local_facet,
                facet: i.facet,
                outside: i.outside,
                marker: markers.and_then(|m| m.get(&i.local_facet).copied()),
            })
            .collect())
    }

    /// Total number of marked facets in this part.
    pub fn marked_facet_count(&self) -> usize {
        self.part.marked_facet_count()
    }

    fn require_element(&self, element: Entity) -> Result<(), DecompositionError> {
        if !element.is_element() {
            return Err(DecompositionError::NotAnElement { entity: element });
        }
        if !self.contains(element) {
            return Err(DecompositionError::EntityNotContained { entity: element });
        }
        Ok(())
    }
}
