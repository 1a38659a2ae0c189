//! In-memory conforming unstructured mesh.
//!
//! Built from vertex coordinates and typed cell→vertex connectivity. All
//! intermediate entities (edges, faces) are derived from the reference-element
//! tables in [`CellType`], identified by their sorted vertex set, and numbered
//! in first-seen order while walking the cells. Facet adjacency follows from
//! the same bookkeeping: the first cell to see a facet owns it, the second one
//! becomes its neighbor.

use hashbrown::HashMap;

use crate::data::coordinates::Coordinates;
use crate::mesh_error::MeshError;
use crate::topology::cell_type::CellType;
use crate::topology::entity::Entity;
use crate::topology::mesh::{GlobalMesh, Intersection};

/// Conforming mesh of cells of one topological dimension.
#[derive(Clone, Debug)]
pub struct ConformingMesh {
    dimension: usize,
    coordinates: Coordinates,
    cell_types: Vec<CellType>,
    /// `entity_types[codim][index]` for `1 <= codim < dimension`.
    entity_types: Vec<Vec<CellType>>,
    /// `cell_sub[codim][cell]` global indices in local numbering order, `1 <= codim <= dimension`.
    cell_sub: Vec<Vec<Vec<usize>>>,
    /// `neighbors[cell][local_facet]`.
    neighbors: Vec<Vec<Option<usize>>>,
}

impl ConformingMesh {
    /// Build a mesh from `vertices` (each of length `world_dimension`) and `cells`.
    pub fn new(
        world_dimension: usize,
        vertices: &[Vec<f64>],
        cells: Vec<(CellType, Vec<usize>)>,
    ) -> Result<Self, MeshError> {
        let coordinates = Coordinates::try_from_points(world_dimension, vertices)?;
        let Some(&(first_type, _)) = cells.first() else {
            return Err(MeshError::InvalidGeometry("mesh has no cells".into()));
        };
        let dimension = first_type.dimension();
        if dimension == 0 {
            return Err(MeshError::UnsupportedCellType(first_type));
        }

        for (cell, (cell_type, verts)) in cells.iter().enumerate() {
            if cell_type.dimension() != dimension {
                return Err(MeshError::MixedDimension {
                    cell,
                    expected: dimension,
                    found: cell_type.dimension(),
                });
            }
            if verts.len() != cell_type.vertex_count() {
                return Err(MeshError::VertexCountMismatch {
                    cell,
                    cell_type: *cell_type,
                    expected: cell_type.vertex_count(),
                    found: verts.len(),
                });
            }
            if let Some(&vertex) = verts.iter().find(|&&v| v >= coordinates.len()) {
                return Err(MeshError::MissingVertex { cell, vertex });
            }
        }

        let mut entity_types = vec![Vec::new(); dimension + 1];
        let mut cell_sub = vec![Vec::new(); dimension + 1];
        for codim in 1..dimension {
            let mut index_of: HashMap<Vec<usize>, usize> = HashMap::new();
            let mut per_cell = Vec::with_capacity(cells.len());
            for (cell_type, verts) in &cells {
                let table = cell_type
                    .sub_entity_table(codim)
                    .ok_or(MeshError::UnsupportedCellType(*cell_type))?;
                let mut subs = Vec::with_capacity(table.len());
                for (i, local) in table.iter().enumerate() {
                    let mut key: Vec<usize> = local.iter().map(|&l| verts[l]).collect();
                    key.sort_unstable();
                    let idx = match index_of.get(&key) {
                        Some(&idx) => idx,
                        None => {
                            let sub_type = cell_type
                                .sub_entity_type(codim, i)
                                .ok_or(MeshError::UnsupportedCellType(*cell_type))?;
                            let idx = index_of.len();
                            entity_types[codim].push(sub_type);
                            index_of.insert(key, idx);
                            idx
                        }
                    };
                    subs.push(idx);
                }
                per_cell.push(subs);
            }
            cell_sub[codim] = per_cell;
        }
        cell_sub[dimension] = cells.iter().map(|(_, verts)| verts.clone()).collect();

        // first owner of a facet, then the neighbor that sees it a second time
        let mut owners: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
        for (cell, facets) in cell_sub[1].iter().enumerate() {
            for (local, &facet) in facets.iter().enumerate() {
                owners.entry(facet).or_default().push((cell, local));
            }
        }
        let mut neighbors: Vec<Vec<Option<usize>>> = cells
            .iter()
            .map(|(ct, _)| vec![None; ct.facet_count()])
            .collect();
        for (&facet, seen) in &owners {
            match seen.as_slice() {
                [_] => {}
                [(c0, f0), (c1, f1)] => {
                    neighbors[*c0][*f0] = Some(*c1);
                    neighbors[*c1][*f1] = Some(*c0);
                }
                _ => {
                    return Err(MeshError::NonManifoldFacet {
                        facet,
                        cells: seen.len(),
                    });
                }
            }
        }

        Ok(Self {
            dimension,
            coordinates,
            cell_types: cells.into_iter().map(|(ct, _)| ct).collect(),
            entity_types,
            cell_sub,
            neighbors,
        })
    }

    /// Vertex coordinates.
    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    /// Vertex indices of `cell` in reference order.
    pub fn cell_vertices(&self, cell: usize) -> Option<&[usize]> {
        self.cell_sub[self.dimension].get(cell).map(Vec::as_slice)
    }

    /// Geometric center of an element.
    pub fn centroid(&self, element: Entity) -> Result<Vec<f64>, MeshError> {
        let corners = self.corners(element)?;
        let mut c = vec![0.0; self.world_dimension()];
        for corner in &corners {
            for (acc, x) in c.iter_mut().zip(corner) {
                *acc += x;
            }
        }
        let n = corners.len() as f64;
        c.iter_mut().for_each(|x| *x /= n);
        Ok(c)
    }

    fn check_element(&self, element: Entity) -> Result<usize, MeshError> {
        if element.is_element() && element.index() < self.cell_types.len() {
            Ok(element.index())
        } else {
            Err(MeshError::UnknownEntity(element))
        }
    }

    fn check_codim(&self, codim: usize) -> Result<(), MeshError> {
        if codim > self.dimension {
            return Err(MeshError::CodimOutOfRange {
                codim,
                dimension: self.dimension,
            });
        }
        Ok(())
    }
}

impl GlobalMesh for ConformingMesh {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn world_dimension(&self) -> usize {
        self.coordinates.dimension()
    }

    fn size(&self, codim: usize) -> usize {
        match codim {
            0 => self.cell_types.len(),
            c if c == self.dimension => self.coordinates.len(),
            c if c < self.dimension => self.entity_types[c].len(),
            _ => 0,
        }
    }

    fn entity_type(&self, entity: Entity) -> Result<CellType, MeshError> {
        let codim = entity.codim();
        self.check_codim(codim)?;
        if entity.index() >= self.size(codim) {
            return Err(MeshError::UnknownEntity(entity));
        }
        Ok(match codim {
            0 => self.cell_types[entity.index()],
            c if c == self.dimension => CellType::Vertex,
            c => self.entity_types[c][entity.index()],
        })
    }

    fn sub_entities(&self, element: Entity, codim: usize) -> Result<Vec<Entity>, MeshError> {
        let cell = self.check_element(element)?;
        self.check_codim(codim)?;
        if codim == 0 {
            return Ok(vec![element]);
        }
        Ok(self.cell_sub[codim][cell]
            .iter()
            .map(|&i| Entity::new(codim, i))
            .collect())
    }

    fn intersections(&self, element: Entity) -> Result<Vec<Intersection>, MeshError> {
        let cell = self.check_element(element)?;
        Ok(self.cell_sub[1][cell]
            .iter()
            .zip(&self.neighbors[cell])
            .enumerate()
            .map(|(local_facet, (&facet, outside))| Intersection {
                local_facet,
                facet: Entity::new(1, facet),
                outside: outside.map(Entity::element),
            })
            .collect())
    }

    fn corners(&self, element: Entity) -> Result<Vec<Vec<f64>>, MeshError> {
        let cell = self.check_element(element)?;
        self.cell_sub[self.dimension][cell]
            .iter()
            .map(|&v| self.coordinates.try_restrict(v).map(<[f64]>::to_vec))
            .collect()
    }
}
