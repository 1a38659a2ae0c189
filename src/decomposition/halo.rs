//! Halo extension ("oversampling") of subdomains.
//!
//! One call of [`extend_layer`] grows every subdomain by one layer:
//!
//! - Every element of the current set that has a facet neighbor outside the
//!   set pulls all of its facet neighbors into a working copy of the set.
//! - With `neighbor_recursion_level > 0`, the neighbors of those neighbors are
//!   searched recursively (up to that depth) for elements sharing a corner
//!   with the original element, so the halo also covers elements that touch
//!   the subdomain only through a vertex or an edge.
//! - A final walk over the mesh marks every facet of the grown set that leads
//!   out of it, so the oversampled region is boundary-bounded on its own.
//!
//! The working copy starts as a clone of the current map, so local indices of
//! the inner layers are preserved and each layer contains the previous one.

use hashbrown::HashMap;

use crate::decomposition::builder::CornerMatch;
use crate::decomposition::error::DecompositionError;
use crate::decomposition::index_set::{BoundaryInfo, FacetMarker, MeshPart};
use crate::decomposition::local_index_map::LocalIndexMap;
use crate::topology::entity::Entity;
use crate::topology::mesh::GlobalMesh;

/// Grow each of `current` (one map per subdomain) by one layer.
pub(crate) fn extend_layer<M: GlobalMesh + ?Sized>(
    mesh: &M,
    current: &[&LocalIndexMap],
    neighbor_recursion_level: i32,
    corner_match: CornerMatch,
) -> Result<Vec<MeshPart>, DecompositionError> {
    let mut grown = Vec::with_capacity(current.len());
    for base in current {
        grown.push(grow(mesh, base, neighbor_recursion_level, corner_match)?);
    }
    let markers = mark_halo_boundaries(mesh, &grown)?;
    Ok(grown
        .into_iter()
        .zip(markers)
        .map(|(map, markers)| MeshPart::new(map, markers))
        .collect())
}

fn grow<M: GlobalMesh + ?Sized>(
    mesh: &M,
    base: &LocalIndexMap,
    neighbor_recursion_level: i32,
    corner_match: CornerMatch,
) -> Result<LocalIndexMap, DecompositionError> {
    let mut working = base.clone();
    for element in base.elements() {
        let intersections = mesh.intersections(element)?;
        let on_boundary = intersections
            .iter()
            .any(|i| i.outside.is_some_and(|o| !base.contains(o)));
        if !on_boundary {
            continue;
        }
        let corners = if neighbor_recursion_level > 0 {
            Some(mesh.corners(element)?)
        } else {
            None
        };
        let mut expanded = HashMap::new();
        for outside in intersections.iter().filter_map(|i| i.outside) {
            if base.contains(outside) {
                continue;
            }
            working.add_element(mesh, outside)?;
            if let Some(corners) = &corners {
                let search = CornerSearch {
                    origin: corners,
                    corner_match,
                };
                search.expand(
                    mesh,
                    &mut working,
                    &mut expanded,
                    outside,
                    neighbor_recursion_level,
                )?;
            }
        }
    }
    Ok(working)
}

/// Recursive search for elements sharing a corner with `origin`.
struct CornerSearch<'a> {
    origin: &'a [Vec<f64>],
    corner_match: CornerMatch,
}

impl CornerSearch<'_> {
    /// Add neighbors of `current` (recursively, `depth` levels) that share a corner with the origin.
    ///
    /// `expanded` holds the largest depth each element was already expanded
    /// with; expanding it again with less depth cannot reach anything new.
    fn expand<M: GlobalMesh + ?Sized>(
        &self,
        mesh: &M,
        working: &mut LocalIndexMap,
        expanded: &mut HashMap<Entity, i32>,
        current: Entity,
        depth: i32,
    ) -> Result<(), DecompositionError> {
        if depth <= 0 {
            return Ok(());
        }
        if expanded.get(&current).is_some_and(|&d| d >= depth) {
            return Ok(());
        }
        expanded.insert(current, depth);
        for candidate in mesh.intersections(current)?.into_iter().filter_map(|i| i.outside) {
            if !working.contains(candidate) {
                let corners = mesh.corners(candidate)?;
                if shares_corner(self.origin, &corners, self.corner_match) {
                    working.add_element(mesh, candidate)?;
                }
            }
            self.expand(mesh, working, expanded, candidate, depth - 1)?;
        }
        Ok(())
    }
}

fn shares_corner(a: &[Vec<f64>], b: &[Vec<f64>], corner_match: CornerMatch) -> bool {
    a.iter()
        .any(|p| b.iter().any(|q| corner_match.matches(p, q)))
}

/// One walk over the mesh: mark every facet of a grown set that leaves it.
fn mark_halo_boundaries<M: GlobalMesh + ?Sized>(
    mesh: &M,
    grown: &[LocalIndexMap],
) -> Result<Vec<BoundaryInfo>, DecompositionError> {
    let mut owners: Vec<Vec<usize>> = vec![Vec::new(); mesh.size(0)];
    for (s, map) in grown.iter().enumerate() {
        for element in map.elements() {
            if let Some(o) = owners.get_mut(element.index()) {
                o.push(s);
            }
        }
    }

    let mut markers = vec![BoundaryInfo::new(); grown.len()];
    for element in mesh.elements() {
        let Some(sets) = owners.get(element.index()).filter(|o| !o.is_empty()) else {
            continue;
        };
        for inter in mesh.intersections(element)? {
            for &s in sets {
                let marker = match inter.outside {
                    None => FacetMarker::DomainBoundary,
                    Some(o) if !grown[s].contains(o) => FacetMarker::Halo,
                    Some(_) => continue,
                };
                markers[s]
                    .entry(element.index())
                    .or_default()
                    .insert(inter.local_facet, marker);
            }
        }
    }
    Ok(markers)
}
