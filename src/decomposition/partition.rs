//! The finished, immutable subdomain decomposition.
//!
//! A [`Partition`] owns every map produced by the builder. Views returned by
//! its accessors borrow from it, and cross references between parts are plain
//! lookups by subdomain id. Once built it is never mutated, so it can be
//! shared freely between solver threads.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use itertools::Itertools;

use crate::decomposition::builder::FinalizeOptions;
use crate::decomposition::error::DecompositionError;
use crate::decomposition::index_set::{LocalIndexSet, MeshPart, PartKind};
use crate::topology::entity::Entity;
use crate::topology::mesh::GlobalMesh;

/// Read-only subdomain decomposition of a global mesh.
#[derive(Debug)]
pub struct Partition<'m, M: GlobalMesh> {
    pub(crate) mesh: &'m M,
    pub(crate) size: usize,
    /// Subdomain of each element, indexed by global element index.
    pub(crate) assignment: Vec<usize>,
    pub(crate) locals: Vec<MeshPart>,
    pub(crate) boundaries: Vec<Option<MeshPart>>,
    pub(crate) couplings: Vec<BTreeMap<usize, MeshPart>>,
    pub(crate) neighbors: Vec<BTreeSet<usize>>,
    /// `oversampled[layer - 1][subdomain]`.
    pub(crate) oversampled: Vec<Vec<MeshPart>>,
    pub(crate) options: FinalizeOptions,
}

impl<'m, M: GlobalMesh> Partition<'m, M> {
    /// The global mesh this decomposition refers to.
    pub fn mesh(&self) -> &'m M {
        self.mesh
    }

    /// Number of subdomains.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Options `finalize` ran with.
    pub fn options(&self) -> &FinalizeOptions {
        &self.options
    }

    pub fn oversampling_available(&self) -> bool {
        !self.oversampled.is_empty()
    }

    /// Number of oversampling layers built.
    pub fn oversampling_layers(&self) -> usize {
        self.oversampled.len()
    }

    /// The subdomain's own elements, or its outermost oversampled region.
    pub fn local_index_set(
        &self,
        subdomain: usize,
        oversampled: bool,
    ) -> Result<LocalIndexSet<'_, M>, DecompositionError> {
        self.check_subdomain(subdomain)?;
        if !oversampled {
            return Ok(LocalIndexSet::new(
                self.mesh,
                &self.locals[subdomain],
                subdomain,
                PartKind::Local,
            ));
        }
        if !self.oversampling_available() {
            return Err(DecompositionError::OversamplingNotEnabled);
        }
        self.oversampled_index_set(subdomain, self.oversampled.len())
    }

    /// Oversampled region of `subdomain` after `layer` layers (1-based).
    pub fn oversampled_index_set(
        &self,
        subdomain: usize,
        layer: usize,
    ) -> Result<LocalIndexSet<'_, M>, DecompositionError> {
        self.check_subdomain(subdomain)?;
        if !self.oversampling_available() {
            return Err(DecompositionError::OversamplingNotEnabled);
        }
        let parts = layer
            .checked_sub(1)
            .and_then(|l| self.oversampled.get(l))
            .ok_or(DecompositionError::NoSuchLayer {
                layer,
                available: self.oversampled.len(),
            })?;
        Ok(LocalIndexSet::new(
            self.mesh,
            &parts[subdomain],
            subdomain,
            PartKind::Oversampled { layer },
        ))
    }

    /// `true` if some element of `subdomain` touches the global mesh boundary.
    pub fn has_boundary(&self, subdomain: usize) -> Result<bool, DecompositionError> {
        self.check_subdomain(subdomain)?;
        Ok(self.boundaries[subdomain].is_some())
    }

    /// Elements of `subdomain` on the global mesh boundary, with their boundary facets.
    pub fn boundary_index_set(
        &self,
        subdomain: usize,
    ) -> Result<LocalIndexSet<'_, M>, DecompositionError> {
        self.check_subdomain(subdomain)?;
        let part = self.boundaries[subdomain]
            .as_ref()
            .ok_or(DecompositionError::NoBoundary { subdomain })?;
        Ok(LocalIndexSet::new(
            self.mesh,
            part,
            subdomain,
            PartKind::Boundary,
        ))
    }

    /// Elements of `subdomain` touching `neighbor`, with the facets pointing into it.
    pub fn coupling_index_set(
        &self,
        subdomain: usize,
        neighbor: usize,
    ) -> Result<LocalIndexSet<'_, M>, DecompositionError> {
        self.check_subdomain(subdomain)?;
        let part = self.couplings[subdomain].get(&neighbor).ok_or(
            DecompositionError::NotNeighbors {
                subdomain,
                neighbor,
            },
        )?;
        Ok(LocalIndexSet::new(
            self.mesh,
            part,
            subdomain,
            PartKind::Coupling { neighbor },
        ))
    }

    /// Subdomains sharing at least one facet with `subdomain`.
    pub fn neighbors_of(&self, subdomain: usize) -> Result<&BTreeSet<usize>, DecompositionError> {
        self.check_subdomain(subdomain)?;
        Ok(&self.neighbors[subdomain])
    }

    /// Subdomain owning `element`.
    pub fn subdomain_of(&self, element: Entity) -> Result<usize, DecompositionError> {
        if !element.is_element() {
            return Err(DecompositionError::NotAnElement { entity: element });
        }
        self.subdomain_of_index(element.index())
    }

    /// Subdomain owning the element with global index `index`.
    pub fn subdomain_of_index(&self, index: usize) -> Result<usize, DecompositionError> {
        self.assignment
            .get(index)
            .copied()
            .ok_or(DecompositionError::EntityNotContained {
                entity: Entity::element(index),
            })
    }

    /// Elements of `subdomain` in local order.
    pub fn elements_of(
        &self,
        subdomain: usize,
    ) -> Result<impl Iterator<Item = Entity> + '_, DecompositionError> {
        self.check_subdomain(subdomain)?;
        Ok(self.locals[subdomain].map.elements())
    }

    /// Per-subdomain statistics.
    pub fn summary(&self) -> DecompositionSummary {
        let subdomains = (0..self.size)
            .map(|s| SubdomainSummary {
                subdomain: s,
                elements: self.locals[s].map.size(0),
                boundary_facets: self.boundaries[s]
                    .as_ref()
                    .map_or(0, MeshPart::marked_facet_count),
                neighbors: self.neighbors[s].iter().copied().collect(),
                oversampled_elements: self.oversampled.last().map(|l| l[s].map.size(0)),
            })
            .collect();
        DecompositionSummary {
            elements: self.assignment.len(),
            oversampling_layers: self.oversampled.len(),
            subdomains,
        }
    }

    fn check_subdomain(&self, subdomain: usize) -> Result<(), DecompositionError> {
        if subdomain < self.size {
            Ok(())
        } else {
            Err(DecompositionError::UnknownSubdomain {
                subdomain,
                size: self.size,
            })
        }
    }
}

/// Statistics of one subdomain.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubdomainSummary {
    pub subdomain: usize,
    pub elements: usize,
    pub boundary_facets: usize,
    pub neighbors: Vec<usize>,
    pub oversampled_elements: Option<usize>,
}

/// Statistics of a whole decomposition.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DecompositionSummary {
    pub elements: usize,
    pub oversampling_layers: usize,
    pub subdomains: Vec<SubdomainSummary>,
}

impl fmt::Display for DecompositionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} elements in {} subdomains ({} oversampling layers)",
            self.elements,
            self.subdomains.len(),
            self.oversampling_layers
        )?;
        for s in &self.subdomains {
            write!(
                f,
                "  subdomain {}: {} elements, {} boundary facets, neighbors [{}]",
                s.subdomain,
                s.elements,
                s.boundary_facets,
                s.neighbors.iter().join(", ")
            )?;
            if let Some(n) = s.oversampled_elements {
                write!(f, ", {n} oversampled elements")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
