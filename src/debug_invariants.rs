//! Structural invariant checks for decompositions.

use std::collections::BTreeSet;

use crate::decomposition::error::DecompositionError;
use crate::decomposition::index_set::FacetMarker;
use crate::decomposition::partition::Partition;
use crate::topology::mesh::GlobalMesh;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), DecompositionError>;
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

fn violation(message: String) -> DecompositionError {
    DecompositionError::InvariantViolation(message)
}

impl<M: GlobalMesh> DebugInvariants for Partition<'_, M> {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "Partition");
    }

    /// Checks, in order:
    /// - every element belongs to exactly one subdomain and the local element
    ///   sets agree with the assignment;
    /// - every index map is dense;
    /// - boundary sets record exactly the domain boundary facets, each under
    ///   the subdomain owning its element;
    /// - coupling sets only point into their neighbor;
    /// - every oversampling layer contains the previous one.
    fn validate_invariants(&self) -> Result<(), DecompositionError> {
        let n_elements = self.mesh.size(0);
        if self.assignment.len() != n_elements {
            return Err(DecompositionError::MapSizeMismatch {
                what: "element assignment",
                expected: n_elements,
                found: self.assignment.len(),
            });
        }
        for (what, found) in [
            ("local parts", self.locals.len()),
            ("boundary parts", self.boundaries.len()),
            ("coupling parts", self.couplings.len()),
            ("neighbor sets", self.neighbors.len()),
        ] {
            if found != self.size {
                return Err(DecompositionError::MapSizeMismatch {
                    what,
                    expected: self.size,
                    found,
                });
            }
        }

        let total: usize = self.locals.iter().map(|p| p.map.size(0)).sum();
        if total != n_elements {
            return Err(violation(format!(
                "subdomains hold {total} elements, mesh has {n_elements}"
            )));
        }
        for (s, part) in self.locals.iter().enumerate() {
            for element in part.map.elements() {
                if self.assignment.get(element.index()) != Some(&s) {
                    return Err(violation(format!(
                        "element {element} listed in subdomain {s} but assigned elsewhere"
                    )));
                }
            }
        }

        let all_parts = self
            .locals
            .iter()
            .chain(self.boundaries.iter().flatten())
            .chain(self.couplings.iter().flat_map(|c| c.values()))
            .chain(self.oversampled.iter().flatten());
        for part in all_parts {
            if !part.map.is_dense() {
                return Err(violation("local index map is not dense".into()));
            }
        }

        for (s, boundary) in self.boundaries.iter().enumerate() {
            let Some(boundary) = boundary else { continue };
            for (&element, facets) in &boundary.markers {
                if self.assignment.get(element) != Some(&s) {
                    return Err(violation(format!(
                        "boundary element {element} of subdomain {s} belongs elsewhere"
                    )));
                }
                if facets.values().any(|m| *m != FacetMarker::DomainBoundary) {
                    return Err(violation(format!(
                        "boundary set of subdomain {s} holds an interior facet"
                    )));
                }
            }
        }

        for element in self.mesh.elements() {
            let s = self.assignment.get(element.index()).copied().ok_or_else(|| {
                violation(format!("element {element} has no subdomain"))
            })?;
            for inter in self.mesh.intersections(element)? {
                if inter.outside.is_some() {
                    continue;
                }
                let recorded = self
                    .boundaries
                    .get(s)
                    .and_then(Option::as_ref)
                    .and_then(|b| b.markers.get(&element.index()))
                    .and_then(|facets| facets.get(&inter.local_facet));
                if recorded != Some(&FacetMarker::DomainBoundary) {
                    return Err(violation(format!(
                        "boundary facet {} of element {element} missing from subdomain {s}",
                        inter.local_facet
                    )));
                }
            }
        }

        for (s, couplings) in self.couplings.iter().enumerate() {
            let keys: BTreeSet<usize> = couplings.keys().copied().collect();
            if keys != self.neighbors[s] {
                return Err(violation(format!(
                    "coupling sets of subdomain {s} do not match its neighbors"
                )));
            }
            for (&n, part) in couplings {
                for (&element, facets) in &part.markers {
                    let inside = crate::topology::entity::Entity::element(element);
                    for inter in self.mesh.intersections(inside)? {
                        if !facets.contains_key(&inter.local_facet) {
                            continue;
                        }
                        let outside = inter
                            .outside
                            .and_then(|o| self.assignment.get(o.index()).copied());
                        if outside != Some(n) {
                            return Err(violation(format!(
                                "coupling facet {} of element {element} does not lead into {n}",
                                inter.local_facet
                            )));
                        }
                    }
                }
            }
        }

        for (layer, parts) in self.oversampled.iter().enumerate() {
            for (s, part) in parts.iter().enumerate() {
                let inner = match layer {
                    0 => &self.locals[s],
                    l => &self.oversampled[l - 1][s],
                };
                if let Some(e) = inner.map.elements().find(|&e| !part.map.contains(e)) {
                    return Err(violation(format!(
                        "oversampling layer {} of subdomain {s} lost element {e}",
                        layer + 1
                    )));
                }
            }
        }

        Ok(())
    }
}
