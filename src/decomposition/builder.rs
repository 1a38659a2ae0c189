//! Subdomain decomposition builder.
//!
//! The builder runs in three phases:
//!
//! 1. **Accumulation.** [`DecompositionBuilder::add`] assigns one element to a
//!    subdomain and registers the element together with all of its
//!    sub-entities in that subdomain's [`LocalIndexMap`].
//! 2. **Classification.** [`DecompositionBuilder::finalize`] walks the global
//!    mesh once. Each facet of each element is either on the domain boundary,
//!    on the interface to another subdomain (a coupling facet), or interior to
//!    the subdomain.
//! 3. **Halo extension.** Optionally, each subdomain is grown by
//!    `oversampling_layers` layers of neighboring elements (see the `halo` module).
//!
//! The result is moved into an immutable [`Partition`].

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;
use log::{debug, info, trace, warn};

use crate::decomposition::error::DecompositionError;
use crate::decomposition::halo;
use crate::decomposition::index_set::{BoundaryInfo, FacetMarker, MeshPart};
use crate::decomposition::local_index_map::LocalIndexMap;
use crate::decomposition::partition::Partition;
use crate::mesh_error::MeshError;
use crate::topology::entity::Entity;
use crate::topology::mesh::GlobalMesh;

/// How corner coordinates are compared when the halo follows corner adjacency.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum CornerMatch {
    /// Bitwise-equal coordinates. Exact on structured meshes whose vertices
    /// come from one coordinate array; fragile on curved or rotated meshes.
    #[default]
    Exact,
    /// Component-wise `|a - b| <= tol`.
    Tolerance(f64),
}

impl CornerMatch {
    /// `true` if the two points coincide under this rule.
    pub fn matches(self, a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len()
            && match self {
                CornerMatch::Exact => a == b,
                CornerMatch::Tolerance(tol) => a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tol),
            }
    }
}

/// Options for [`DecompositionBuilder::finalize`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FinalizeOptions {
    /// Number of halo layers grown around every subdomain.
    pub oversampling_layers: usize,
    /// How far the halo searches beyond a facet neighbor for elements that
    /// share only a corner with the subdomain. `<= 0` disables the search.
    pub neighbor_recursion_level: i32,
    /// Reject multi-element subdomains without any internal facet.
    pub assert_connected: bool,
    /// Coordinate comparison used by the corner search.
    pub corner_match: CornerMatch,
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        Self {
            oversampling_layers: 0,
            neighbor_recursion_level: 0,
            assert_connected: true,
            corner_match: CornerMatch::Exact,
        }
    }
}

/// Accumulates an element→subdomain assignment and turns it into a [`Partition`].
///
/// The builder is exclusively owned by its caller while it is being filled;
/// it does not synchronize concurrent `add` calls.
#[derive(Debug)]
pub struct DecompositionBuilder<'m, M: GlobalMesh> {
    mesh: &'m M,
    size: usize,
    prepared: bool,
    element_to_subdomain: HashMap<usize, usize>,
    local_maps: Vec<LocalIndexMap>,
    partition: Option<Partition<'m, M>>,
}

/// Everything the classification pass produces.
struct Classification {
    assignment: Vec<usize>,
    local_markers: Vec<BoundaryInfo>,
    boundary_maps: Vec<LocalIndexMap>,
    boundary_markers: Vec<BoundaryInfo>,
    coupling_maps: Vec<BTreeMap<usize, LocalIndexMap>>,
    coupling_markers: Vec<BTreeMap<usize, BoundaryInfo>>,
    neighbors: Vec<BTreeSet<usize>>,
}

impl<'m, M: GlobalMesh> DecompositionBuilder<'m, M> {
    /// Builder for `size` subdomains of `mesh`.
    pub fn new(mesh: &'m M, size: usize) -> Result<Self, DecompositionError> {
        if size == 0 {
            return Err(DecompositionError::NoSubdomains);
        }
        Ok(Self {
            mesh,
            size,
            prepared: false,
            element_to_subdomain: HashMap::new(),
            local_maps: Vec::new(),
            partition: None,
        })
    }

    /// Number of subdomains.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_finalized(&self) -> bool {
        self.partition.is_some()
    }

    /// Initialize the per-subdomain maps. Calling it again has no effect.
    pub fn prepare(&mut self) {
        if self.prepared {
            return;
        }
        let dim = self.mesh.dimension();
        self.local_maps = (0..self.size).map(|_| LocalIndexMap::new(dim)).collect();
        self.element_to_subdomain.reserve(self.mesh.size(0));
        self.prepared = true;
    }

    /// Assign `element` to `subdomain`.
    ///
    /// Assigning an element twice to the same subdomain is a no-op; assigning
    /// it to a different subdomain is an error and the first assignment stays.
    pub fn add(&mut self, element: Entity, subdomain: usize) -> Result<(), DecompositionError> {
        if self.partition.is_some() {
            return Err(DecompositionError::AlreadyFinalized);
        }
        if !self.prepared {
            return Err(DecompositionError::NotPrepared);
        }
        if !element.is_element() {
            return Err(DecompositionError::NotAnElement { entity: element });
        }
        if subdomain >= self.size {
            return Err(DecompositionError::InvalidSubdomain {
                subdomain,
                size: self.size,
            });
        }
        if element.index() >= self.mesh.size(0) {
            return Err(MeshError::UnknownEntity(element).into());
        }
        match self.element_to_subdomain.get(&element.index()) {
            Some(&existing) if existing == subdomain => {
                debug!("element {element} added to subdomain {subdomain} again");
                return Ok(());
            }
            Some(&existing) => {
                return Err(DecompositionError::ConflictingAssignment {
                    element,
                    existing,
                    requested: subdomain,
                });
            }
            None => {}
        }
        self.local_maps[subdomain].add_element(self.mesh, element)?;
        self.element_to_subdomain.insert(element.index(), subdomain);
        Ok(())
    }

    /// Assign every element from `(element, subdomain)` pairs; stops at the first error.
    pub fn add_all<I>(&mut self, assignment: I) -> Result<(), DecompositionError>
    where
        I: IntoIterator<Item = (Entity, usize)>,
    {
        for (element, subdomain) in assignment {
            self.add(element, subdomain)?;
        }
        Ok(())
    }

    /// Subdomain `element` has been assigned to so far.
    pub fn assigned_subdomain(&self, element: Entity) -> Option<usize> {
        if !element.is_element() {
            return None;
        }
        self.element_to_subdomain.get(&element.index()).copied()
    }

    /// [`finalize`](Self::finalize) with [`FinalizeOptions::default`].
    pub fn finalize_default(&mut self) -> Result<&Partition<'m, M>, DecompositionError> {
        self.finalize(FinalizeOptions::default())
    }

    /// Classify every facet, optionally grow halos, and freeze the result.
    ///
    /// A second call returns the stored result unchanged and ignores `options`.
    pub fn finalize(
        &mut self,
        options: FinalizeOptions,
    ) -> Result<&Partition<'m, M>, DecompositionError> {
        if self.partition.is_some() {
            warn!("finalize called on an already finalized decomposition, ignoring");
        } else {
            let partition = self.build(options)?;
            info!(
                "decomposed {} elements into {} subdomains ({} oversampling layers)",
                partition.assignment.len(),
                partition.size,
                partition.oversampled.len()
            );
            self.partition = Some(partition);
        }
        self.partition.as_ref().ok_or(DecompositionError::NotFinalized)
    }

    /// The result, if `finalize` has succeeded.
    pub fn partition(&self) -> Option<&Partition<'m, M>> {
        self.partition.as_ref()
    }

    /// Consume the builder and hand over the result.
    pub fn into_partition(self) -> Result<Partition<'m, M>, DecompositionError> {
        self.partition.ok_or(DecompositionError::NotFinalized)
    }

    fn build(&self, options: FinalizeOptions) -> Result<Partition<'m, M>, DecompositionError> {
        if !self.prepared {
            return Err(DecompositionError::NotPrepared);
        }
        if let Some(missing) = self.local_maps.iter().position(|m| m.size(0) == 0) {
            return Err(DecompositionError::NonConsecutiveNumbering {
                missing,
                size: self.size,
            });
        }

        if options.oversampling_layers == 0 && options.neighbor_recursion_level > 0 {
            warn!(
                "neighbor_recursion_level {} has no effect without oversampling layers",
                options.neighbor_recursion_level
            );
        }

        let classification = self.classify(options.assert_connected)?;
        let Classification {
            assignment,
            local_markers,
            boundary_maps,
            boundary_markers,
            coupling_maps,
            coupling_markers,
            neighbors,
        } = classification;

        let locals: Vec<MeshPart> = self
            .local_maps
            .iter()
            .cloned()
            .zip(local_markers)
            .map(|(map, markers)| MeshPart::new(map, markers))
            .collect();
        let boundaries: Vec<Option<MeshPart>> = boundary_maps
            .into_iter()
            .zip(boundary_markers)
            .map(|(map, markers)| (map.size(0) > 0).then(|| MeshPart::new(map, markers)))
            .collect();
        let couplings: Vec<BTreeMap<usize, MeshPart>> = coupling_maps
            .into_iter()
            .zip(coupling_markers)
            .map(|(maps, mut markers)| {
                maps.into_iter()
                    .map(|(n, map)| {
                        let m = markers.remove(&n).unwrap_or_default();
                        (n, MeshPart::new(map, m))
                    })
                    .collect()
            })
            .collect();

        let mut oversampled: Vec<Vec<MeshPart>> = Vec::with_capacity(options.oversampling_layers);
        for layer in 1..=options.oversampling_layers {
            let previous: Vec<&LocalIndexMap> = match oversampled.last() {
                Some(parts) => parts.iter().map(|p| &p.map).collect(),
                None => self.local_maps.iter().collect(),
            };
            let parts = halo::extend_layer(
                self.mesh,
                &previous,
                options.neighbor_recursion_level,
                options.corner_match,
            )?;
            debug!(
                "oversampling layer {layer}: {} elements over all subdomains",
                parts.iter().map(|p| p.map.size(0)).sum::<usize>()
            );
            oversampled.push(parts);
        }

        let partition = Partition {
            mesh: self.mesh,
            size: self.size,
            assignment,
            locals,
            boundaries,
            couplings,
            neighbors,
            oversampled,
            options,
        };
        crate::debug_invariants!(
            crate::debug_invariants::DebugInvariants::validate_invariants(&partition),
            "Partition::finalize"
        );
        Ok(partition)
    }

    /// Single pass over the global mesh.
    fn classify(&self, assert_connected: bool) -> Result<Classification, DecompositionError> {
        let mesh = self.mesh;
        let dim = mesh.dimension();
        let n_elements = mesh.size(0);

        let lookup = |element: Entity| -> Result<usize, DecompositionError> {
            self.element_to_subdomain
                .get(&element.index())
                .copied()
                .ok_or(DecompositionError::MissingAssignment { element })
        };

        let mut c = Classification {
            assignment: vec![usize::MAX; n_elements],
            local_markers: vec![BoundaryInfo::new(); self.size],
            boundary_maps: (0..self.size).map(|_| LocalIndexMap::new(dim)).collect(),
            boundary_markers: vec![BoundaryInfo::new(); self.size],
            coupling_maps: vec![BTreeMap::new(); self.size],
            coupling_markers: vec![BTreeMap::new(); self.size],
            neighbors: vec![BTreeSet::new(); self.size],
        };
        let mut connected = vec![false; self.size];

        for element in mesh.elements() {
            let s = lookup(element)?;
            let slot = c
                .assignment
                .get_mut(element.index())
                .ok_or(MeshError::UnknownEntity(element))?;
            *slot = s;

            for inter in mesh.intersections(element)? {
                let f = inter.local_facet;
                match inter.outside {
                    None => {
                        trace!("element {element} facet {f}: domain boundary of {s}");
                        c.boundary_maps[s].add_element(mesh, element)?;
                        mark(&mut c.boundary_markers[s], element, f, FacetMarker::DomainBoundary);
                        mark(&mut c.local_markers[s], element, f, FacetMarker::DomainBoundary);
                    }
                    Some(outside) => {
                        let n = lookup(outside)?;
                        if n == s {
                            connected[s] = true;
                            continue;
                        }
                        trace!("element {element} facet {f}: coupling {s} -> {n}");
                        let marker = FacetMarker::Subdomain { neighbor: n };
                        c.neighbors[s].insert(n);
                        mark(&mut c.local_markers[s], element, f, marker);
                        c.coupling_maps[s]
                            .entry(n)
                            .or_insert_with(|| LocalIndexMap::new(dim))
                            .add_element(mesh, element)?;
                        mark(
                            c.coupling_markers[s].entry(n).or_default(),
                            element,
                            f,
                            marker,
                        );
                    }
                }
            }
        }

        // elements() may visit in any stable order, but must visit them all
        if let Some(missing) = c.assignment.iter().position(|&s| s == usize::MAX) {
            return Err(DecompositionError::MissingAssignment {
                element: Entity::element(missing),
            });
        }

        if assert_connected {
            for (s, map) in self.local_maps.iter().enumerate() {
                if map.size(0) > 1 && !connected[s] {
                    return Err(DecompositionError::Disconnected {
                        subdomain: s,
                        elements: map.size(0),
                    });
                }
            }
        }

        Ok(c)
    }
}

fn mark(info: &mut BoundaryInfo, element: Entity, local_facet: usize, marker: FacetMarker) {
    info.entry(element.index())
        .or_default()
        .insert(local_facet, marker);
}

/// Build and finalize a decomposition from an element→subdomain vector
/// indexed by global element index.
pub fn decompose<'m, M: GlobalMesh>(
    mesh: &'m M,
    assignment: &[usize],
    size: usize,
    options: FinalizeOptions,
) -> Result<Partition<'m, M>, DecompositionError> {
    let mut builder = DecompositionBuilder::new(mesh, size)?;
    builder.prepare();
    builder.add_all(
        assignment
            .iter()
            .enumerate()
            .map(|(e, &s)| (Entity::element(e), s)),
    )?;
    builder.finalize(options)?;
    builder.into_partition()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::error::ErrorKind;
    use crate::mesh_generation::interval_mesh;

    #[test]
    fn add_requires_prepare() {
        let g = interval_mesh(3, 0.0, 1.0).unwrap();
        let mut b = DecompositionBuilder::new(&g.mesh, 1).unwrap();
        assert_eq!(
            b.add(Entity::element(0), 0),
            Err(DecompositionError::NotPrepared)
        );
        b.prepare();
        b.prepare();
        assert!(b.add(Entity::element(0), 0).is_ok());
    }

    #[test]
    fn conflicting_assignment_keeps_first() {
        let g = interval_mesh(3, 0.0, 1.0).unwrap();
        let mut b = DecompositionBuilder::new(&g.mesh, 2).unwrap();
        b.prepare();
        b.add(Entity::element(1), 0).unwrap();
        b.add(Entity::element(1), 0).unwrap();
        let err = b.add(Entity::element(1), 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConflictingAssignment);
        assert_eq!(b.assigned_subdomain(Entity::element(1)), Some(0));
    }

    #[test]
    fn add_validates_input() {
        let g = interval_mesh(3, 0.0, 1.0).unwrap();
        let mut b = DecompositionBuilder::new(&g.mesh, 2).unwrap();
        b.prepare();
        assert!(matches!(
            b.add(Entity::element(0), 2),
            Err(DecompositionError::InvalidSubdomain { .. })
        ));
        assert!(matches!(
            b.add(Entity::new(1, 0), 0),
            Err(DecompositionError::NotAnElement { .. })
        ));
        assert_eq!(b.add(Entity::element(9), 0).unwrap_err().kind(), ErrorKind::Mesh);
        assert!(DecompositionBuilder::new(&g.mesh, 0).is_err());
    }

    #[test]
    fn finalize_checks_numbering_and_assignment() {
        let g = interval_mesh(3, 0.0, 1.0).unwrap();
        let mut b = DecompositionBuilder::new(&g.mesh, 3).unwrap();
        b.prepare();
        b.add(Entity::element(0), 0).unwrap();
        b.add(Entity::element(1), 2).unwrap();
        b.add(Entity::element(2), 2).unwrap();
        assert_eq!(
            b.finalize_default().unwrap_err(),
            DecompositionError::NonConsecutiveNumbering { missing: 1, size: 3 }
        );

        let mut b = DecompositionBuilder::new(&g.mesh, 2).unwrap();
        b.prepare();
        b.add(Entity::element(0), 0).unwrap();
        b.add(Entity::element(1), 1).unwrap();
        assert_eq!(
            b.finalize_default().unwrap_err(),
            DecompositionError::MissingAssignment {
                element: Entity::element(2)
            }
        );
        assert!(!b.is_finalized());
    }

    #[test]
    fn disconnected_subdomain_is_rejected_unless_allowed() {
        let g = interval_mesh(3, 0.0, 1.0).unwrap();
        let assignment = [0, 1, 0];
        let err = decompose(&g.mesh, &assignment, 2, FinalizeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            DecompositionError::Disconnected {
                subdomain: 0,
                elements: 2
            }
        );
        let options = FinalizeOptions {
            assert_connected: false,
            ..Default::default()
        };
        let p = decompose(&g.mesh, &assignment, 2, options).unwrap();
        assert_eq!(p.neighbors_of(1).unwrap().len(), 1);
    }

    #[test]
    fn corner_match_rules() {
        assert!(CornerMatch::Exact.matches(&[0.1, 0.2], &[0.1, 0.2]));
        assert!(!CornerMatch::Exact.matches(&[0.1, 0.2], &[0.1, 0.2 + 1e-15]));
        assert!(CornerMatch::Tolerance(1e-12).matches(&[0.1, 0.2], &[0.1, 0.2 + 1e-15]));
        assert!(!CornerMatch::Tolerance(1e-12).matches(&[0.1], &[0.1, 0.2]));
    }
}
