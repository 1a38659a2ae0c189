//! Dense global→local renumbering of one mesh part.
//!
//! A [`LocalIndexMap`] records, per codimension, which global entities belong
//! to a part and gives each of them a local index. Local indices are assigned
//! in first-seen order, so they are always exactly `0..size(codim)`.

use hashbrown::HashMap;

use crate::mesh_error::MeshError;
use crate::topology::cell_type::CellType;
use crate::topology::entity::Entity;
use crate::topology::mesh::GlobalMesh;

/// Per-codimension global→local index map.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LocalIndexMap {
    local_of: Vec<HashMap<usize, usize>>,
    global_of: Vec<Vec<usize>>,
    /// Entity counts per reference type, in first-seen order.
    type_counts: Vec<(CellType, usize)>,
}

impl LocalIndexMap {
    /// Empty map for a mesh of topological dimension `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            local_of: vec![HashMap::new(); dimension + 1],
            global_of: vec![Vec::new(); dimension + 1],
            type_counts: Vec::new(),
        }
    }

    /// Topological dimension of the underlying mesh.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.global_of.len().saturating_sub(1)
    }

    /// Register `entity` of type `cell_type`.
    ///
    /// Returns the local index and whether the entity was new.
    pub fn insert(&mut self, entity: Entity, cell_type: CellType) -> (usize, bool) {
        let codim = entity.codim();
        let next = self.global_of[codim].len();
        let local = *self.local_of[codim].entry(entity.index()).or_insert(next);
        if local != next {
            return (local, false);
        }
        self.global_of[codim].push(entity.index());
        match self.type_counts.iter_mut().find(|(t, _)| *t == cell_type) {
            Some((_, n)) => *n += 1,
            None => self.type_counts.push((cell_type, 1)),
        }
        (local, true)
    }

    /// Register `element` and every one of its sub-entities.
    ///
    /// Returns `false` if the element was already present, in which case its
    /// sub-entities are too and nothing changes.
    pub fn add_element<M: GlobalMesh + ?Sized>(
        &mut self,
        mesh: &M,
        element: Entity,
    ) -> Result<bool, MeshError> {
        if self.contains(element) {
            return Ok(false);
        }
        self.insert(element, mesh.entity_type(element)?);
        for codim in 1..=self.dimension() {
            for sub in mesh.sub_entities(element, codim)? {
                if !self.contains(sub) {
                    self.insert(sub, mesh.entity_type(sub)?);
                }
            }
        }
        Ok(true)
    }

    /// Local index of `entity`, if it belongs to this map.
    #[inline]
    pub fn local_index(&self, entity: Entity) -> Option<usize> {
        self.local_of
            .get(entity.codim())
            .and_then(|m| m.get(&entity.index()).copied())
    }

    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.local_index(entity).is_some()
    }

    /// Number of entities at codimension `codim`.
    #[inline]
    pub fn size(&self, codim: usize) -> usize {
        self.global_of.get(codim).map_or(0, Vec::len)
    }

    /// Global entity with local index `local` at codimension `codim`.
    #[inline]
    pub fn global_entity(&self, codim: usize, local: usize) -> Option<Entity> {
        self.global_of
            .get(codim)
            .and_then(|g| g.get(local))
            .map(|&index| Entity::new(codim, index))
    }

    /// Entities at codimension `codim` in local order.
    pub fn entities(&self, codim: usize) -> impl Iterator<Item = Entity> + '_ {
        self.global_of
            .get(codim)
            .into_iter()
            .flatten()
            .map(move |&index| Entity::new(codim, index))
    }

    /// Elements in local order.
    pub fn elements(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities(0)
    }

    /// Number of entities of reference type `cell_type`.
    pub fn size_of_type(&self, cell_type: CellType) -> usize {
        self.type_counts
            .iter()
            .find(|(t, _)| *t == cell_type)
            .map_or(0, |(_, n)| *n)
    }

    /// Reference types present at codimension `codim`, in first-seen order.
    pub fn geom_types(&self, codim: usize) -> Vec<CellType> {
        let dim = self.dimension();
        if codim > dim {
            return Vec::new();
        }
        self.type_counts
            .iter()
            .filter(|(t, _)| t.dimension() == dim - codim)
            .map(|(t, _)| *t)
            .collect()
    }

    /// `true` if both directions of the map agree at every codimension.
    pub fn is_dense(&self) -> bool {
        self.local_of.len() == self.global_of.len()
            && self
                .local_of
                .iter()
                .zip(&self.global_of)
                .all(|(local_of, global_of)| {
                    local_of.len() == global_of.len()
                        && global_of
                            .iter()
                            .enumerate()
                            .all(|(local, g)| local_of.get(g) == Some(&local))
                })
    }
}
