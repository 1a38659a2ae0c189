//! Core capability trait for the global mesh consumed by the decomposition.
//!
//! The decomposition never builds or mutates a mesh; it only walks one. The
//! [`GlobalMesh`] trait is the whole surface it relies on: stable element
//! enumeration, sub-entity enumeration per codimension, facet adjacency and
//! corner coordinates.

use crate::mesh_error::MeshError;
use crate::topology::cell_type::CellType;
use crate::topology::entity::Entity;

/// One facet of an element seen from the inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Intersection {
    /// Local facet number within the inside element.
    pub local_facet: usize,
    /// The facet itself (codimension 1).
    pub facet: Entity,
    /// Element on the other side, `None` on the global mesh boundary.
    pub outside: Option<Entity>,
}

impl Intersection {
    /// `true` if the facet lies on the global mesh boundary.
    #[inline]
    pub fn boundary(&self) -> bool {
        self.outside.is_none()
    }

    /// `true` if another element sits on the other side.
    #[inline]
    pub fn neighbor(&self) -> bool {
        self.outside.is_some()
    }
}

/// Read-only mesh capability surface.
///
/// # Contract
/// - Indices are dense per codimension: `0..size(codim)`.
/// - [`GlobalMesh::elements`] yields elements in the same order on every call.
/// - `sub_entities(e, 0)` is `[e]`; `sub_entities(e, dimension())` are the vertices of `e`.
/// - Every interior facet is reported by exactly two elements, every boundary
///   facet by exactly one.
pub trait GlobalMesh {
    /// Topological dimension `D` of the elements.
    fn dimension(&self) -> usize;

    /// Number of coordinates per vertex.
    fn world_dimension(&self) -> usize;

    /// Number of entities at codimension `codim`.
    fn size(&self, codim: usize) -> usize;

    /// All elements in a stable order.
    fn elements<'a>(&'a self) -> Box<dyn Iterator<Item = Entity> + 'a> {
        Box::new((0..self.size(0)).map(Entity::element))
    }

    /// Reference type of an entity.
    fn entity_type(&self, entity: Entity) -> Result<CellType, MeshError>;

    /// Sub-entities of `element` at codimension `codim`, in local numbering order.
    fn sub_entities(&self, element: Entity, codim: usize) -> Result<Vec<Entity>, MeshError>;

    /// The `i`-th sub-entity of `element` at codimension `codim`.
    fn sub_entity(&self, element: Entity, i: usize, codim: usize) -> Result<Entity, MeshError> {
        self.sub_entities(element, codim)?
            .get(i)
            .copied()
            .ok_or_else(|| {
                MeshError::InvalidGeometry(format!(
                    "element {element} has no sub-entity {i} at codimension {codim}"
                ))
            })
    }

    /// Facets of `element` with their neighbors, ordered by local facet number.
    fn intersections(&self, element: Entity) -> Result<Vec<Intersection>, MeshError>;

    /// Corner coordinates of `element`, one `world_dimension()`-sized slice per vertex.
    fn corners(&self, element: Entity) -> Result<Vec<Vec<f64>>, MeshError>;
}
