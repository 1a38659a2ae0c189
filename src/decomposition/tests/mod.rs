use super::*;
use crate::debug_invariants::DebugInvariants;
use crate::mesh_generation::{block_partition, interval_mesh, quad_mesh};
use crate::topology::entity::Entity;
use crate::topology::mesh::GlobalMesh;


fn e(i: usize) -> Entity {
    Entity::element(i)
}

const LINE: [usize; 9] = [0, 0, 0, 1, 1, 1, 2, 2, 2];

#[test]
fn line_local_sets_are_renumbered_consecutively() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();

    let middle = p.local_index_set(1, false).unwrap();
    assert_eq!(middle.kind(), PartKind::Local);
    assert_eq!(middle.size(0), 3);
    assert_eq!(middle.size(1), 4);
    assert_eq!(middle.index(e(3)).unwrap(), 0);
    assert_eq!(middle.index(e(5)).unwrap(), 2);
    assert_eq!(middle.index(Entity::new(1, 3)).unwrap(), 0);
    assert_eq!(middle.index(Entity::new(1, 6)).unwrap(), 3);
    assert_eq!(middle.sub_index(e(4), 1, 1).unwrap(), 2);
    assert_eq!(
        middle.index(e(0)),
        Err(DecompositionError::EntityNotContained { entity: e(0) })
    );
    assert_eq!(middle.global_entity(0, 1), Some(e(4)));
    assert_eq!(p.elements_of(2).unwrap().collect::<Vec<_>>(), vec![e(6), e(7), e(8)]);
}

#[test]
fn line_boundaries_and_couplings() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();

    assert!(p.has_boundary(0).unwrap());
    assert!(!p.has_boundary(1).unwrap());
    assert!(p.has_boundary(2).unwrap());
    assert_eq!(
        p.boundary_index_set(1).unwrap_err(),
        DecompositionError::NoBoundary { subdomain: 1 }
    );

    let left = p.boundary_index_set(0).unwrap();
    assert_eq!(left.size(0), 1);
    assert!(left.contains(e(0)));
    assert_eq!(
        left.boundary_markers(e(0)).unwrap()[&0],
        FacetMarker::DomainBoundary
    );

    assert_eq!(p.neighbors_of(1).unwrap().iter().copied().collect::<Vec<_>>(), vec![0, 2]);
    let to_left = p.coupling_index_set(1, 0).unwrap();
    assert_eq!(to_left.kind(), PartKind::Coupling { neighbor: 0 });
    assert_eq!(to_left.elements().collect::<Vec<_>>(), vec![e(3)]);
    assert!(to_left.is_fake_boundary(e(3), 0));
    assert!(!to_left.is_fake_boundary(e(3), 1));
    let to_right = p.coupling_index_set(1, 2).unwrap();
    assert_eq!(to_right.elements().collect::<Vec<_>>(), vec![e(5)]);

    assert_eq!(
        p.coupling_index_set(0, 2).unwrap_err(),
        DecompositionError::NotNeighbors {
            subdomain: 0,
            neighbor: 2
        }
    );
}

#[test]
fn local_intersections_carry_markers() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();
    let set = p.local_index_set(0, false).unwrap();

    let first = set.intersections(e(0)).unwrap();
    assert_eq!(first[0].marker, Some(FacetMarker::DomainBoundary));
    assert!(first[1].neighbor());

    let last = set.intersections(e(2)).unwrap();
    assert_eq!(last[1].marker, Some(FacetMarker::Subdomain { neighbor: 1 }));
    assert!(last[1].boundary());
    assert_eq!(last[1].outside, Some(e(3)));

    assert_eq!(
        set.intersections(e(3)).unwrap_err(),
        DecompositionError::EntityNotContained { entity: e(3) }
    );
}

#[test]
fn line_oversampling_layers_grow_monotonically() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let options = FinalizeOptions {
        oversampling_layers: 2,
        ..Default::default()
    };
    let p = decompose(&g.mesh, &LINE, 3, options).unwrap();
    assert!(p.oversampling_available());
    assert_eq!(p.oversampling_layers(), 2);

    let first = p.oversampled_index_set(1, 1).unwrap();
    assert_eq!(first.size(0), 5);
    assert_eq!(first.boundary_markers(e(2)).unwrap()[&0], FacetMarker::Halo);
    assert_eq!(first.boundary_markers(e(6)).unwrap()[&1], FacetMarker::Halo);
    // inner elements keep their local indices
    assert_eq!(first.index(e(3)).unwrap(), 0);

    let outer = p.local_index_set(1, true).unwrap();
    assert_eq!(outer.kind(), PartKind::Oversampled { layer: 2 });
    assert_eq!(outer.size(0), 7);
    assert!(first.elements().all(|el| outer.contains(el)));

    // the left subdomain hits the true boundary on one side
    let left = p.oversampled_index_set(0, 1).unwrap();
    assert_eq!(left.size(0), 4);
    assert_eq!(
        left.boundary_markers(e(0)).unwrap()[&0],
        FacetMarker::DomainBoundary
    );
    assert_eq!(left.boundary_markers(e(3)).unwrap()[&1], FacetMarker::Halo);

    assert_eq!(
        p.oversampled_index_set(1, 3).unwrap_err(),
        DecompositionError::NoSuchLayer {
            layer: 3,
            available: 2
        }
    );
    assert!(p.oversampled_index_set(1, 0).is_err());
}

#[test]
fn oversampling_must_be_requested() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();
    assert!(!p.oversampling_available());
    assert_eq!(
        p.local_index_set(0, true).unwrap_err(),
        DecompositionError::OversamplingNotEnabled
    );
    assert_eq!(
        p.oversampled_index_set(0, 1).unwrap_err().kind(),
        ErrorKind::Configuration
    );
}

fn square() -> (crate::mesh_generation::GeneratedMesh, Vec<usize>) {
    let g = quad_mesh(6, 6, [0.0, 0.0], [6.0, 6.0]).unwrap();
    let assignment = block_partition(&g, &[3, 3]).unwrap();
    (g, assignment)
}

#[test]
fn square_center_subdomain_is_interior() {
    let (g, assignment) = square();
    let p = decompose(&g.mesh, &assignment, 9, FinalizeOptions::default()).unwrap();

    assert!(!p.has_boundary(4).unwrap());
    assert_eq!(
        p.neighbors_of(4).unwrap().iter().copied().collect::<Vec<_>>(),
        vec![1, 3, 5, 7]
    );
    let center = p.local_index_set(4, false).unwrap();
    assert_eq!(center.size(0), 4);
    assert_eq!(center.size(1), 12);
    assert_eq!(center.size(2), 9);
    assert_eq!(center.geom_types(0), vec![crate::topology::cell_type::CellType::Quadrilateral]);
    for n in [1, 3, 5, 7] {
        let c = p.coupling_index_set(4, n).unwrap();
        assert_eq!(c.size(0), 2);
        assert_eq!(c.marked_facet_count(), 2);
    }
}

#[test]
fn square_boundary_facets_by_position() {
    let (g, assignment) = square();
    let p = decompose(&g.mesh, &assignment, 9, FinalizeOptions::default()).unwrap();
    let summary = p.summary();
    let facets: Vec<usize> = summary.subdomains.iter().map(|s| s.boundary_facets).collect();
    assert_eq!(facets, vec![4, 2, 4, 2, 0, 2, 4, 2, 4]);
    assert_eq!(p.neighbors_of(0).unwrap().len(), 2);
    assert_eq!(p.neighbors_of(1).unwrap().len(), 3);
    assert_eq!(p.subdomain_of(e(35)).unwrap(), 8);
    assert_eq!(p.subdomain_of_index(14).unwrap(), 4);
    assert!(matches!(
        p.subdomain_of(Entity::new(2, 0)),
        Err(DecompositionError::NotAnElement { .. })
    ));
    assert_eq!(p.subdomain_of_index(36).unwrap_err().kind(), ErrorKind::Lookup);
}

#[test]
fn square_center_oversampling_with_and_without_corners() {
    let (g, assignment) = square();
    let facet_only = FinalizeOptions {
        oversampling_layers: 1,
        ..Default::default()
    };
    let p = decompose(&g.mesh, &assignment, 9, facet_only).unwrap();
    assert_eq!(p.local_index_set(4, true).unwrap().size(0), 12);

    let with_corners = FinalizeOptions {
        oversampling_layers: 1,
        neighbor_recursion_level: 1,
        ..Default::default()
    };
    let p = decompose(&g.mesh, &assignment, 9, with_corners).unwrap();
    let set = p.local_index_set(4, true).unwrap();
    assert_eq!(set.size(0), 16);
    // diagonal neighbor across the corner at (2, 2)
    assert!(set.contains(e(7)));
    assert_eq!(set.marked_facet_count(), 16);
    assert!(set.elements().all(|el| {
        set.boundary_markers(el)
            .map_or(true, |m| m.values().all(|m| *m == FacetMarker::Halo))
    }));
}

#[test]
fn square_second_layer_without_corners() {
    let (g, assignment) = square();
    let options = FinalizeOptions {
        oversampling_layers: 2,
        ..Default::default()
    };
    let p = decompose(&g.mesh, &assignment, 9, options).unwrap();
    assert_eq!(p.oversampled_index_set(4, 1).unwrap().size(0), 12);
    assert_eq!(p.oversampled_index_set(4, 2).unwrap().size(0), 24);
    assert_eq!(p.summary().subdomains[4].oversampled_elements, Some(24));
}

#[test]
fn finalize_twice_returns_stored_result() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let mut b = DecompositionBuilder::new(&g.mesh, 3).unwrap();
    b.prepare();
    b.add_all(LINE.iter().enumerate().map(|(i, &s)| (e(i), s)))
        .unwrap();
    b.finalize_default().unwrap();
    let again = b
        .finalize(FinalizeOptions {
            oversampling_layers: 3,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(again.oversampling_layers(), 0);
    assert_eq!(
        b.add(e(0), 0).unwrap_err(),
        DecompositionError::AlreadyFinalized
    );
    assert!(b.partition().is_some());
    assert_eq!(b.into_partition().unwrap().size(), 3);
}

#[test]
fn into_partition_requires_finalize() {
    let g = interval_mesh(2, 0.0, 1.0).unwrap();
    let b = DecompositionBuilder::new(&g.mesh, 1).unwrap();
    assert_eq!(
        b.into_partition().unwrap_err(),
        DecompositionError::NotFinalized
    );
}

#[test]
fn lookups_reject_unknown_subdomains() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();
    let unknown = DecompositionError::UnknownSubdomain {
        subdomain: 3,
        size: 3,
    };
    assert_eq!(p.local_index_set(3, false).unwrap_err(), unknown);
    assert_eq!(p.has_boundary(3).unwrap_err(), unknown);
    assert_eq!(p.neighbors_of(3).unwrap_err(), unknown);
    assert_eq!(p.coupling_index_set(3, 0).unwrap_err(), unknown);
    assert!(p.elements_of(3).is_err());
}

#[test]
fn summary_display_and_serde() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();
    let summary = p.summary();
    let expected = "9 elements in 3 subdomains (0 oversampling layers)\n\
                    \x20 subdomain 0: 3 elements, 1 boundary facets, neighbors [1]\n\
                    \x20 subdomain 1: 3 elements, 0 boundary facets, neighbors [0, 2]\n\
                    \x20 subdomain 2: 3 elements, 1 boundary facets, neighbors [1]\n";
    assert_eq!(summary.to_string(), expected);

    let json = serde_json::to_string(&summary).unwrap();
    let back: DecompositionSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}

#[test]
fn finalize_options_serde() {
    let options = FinalizeOptions {
        oversampling_layers: 2,
        neighbor_recursion_level: -1,
        assert_connected: false,
        corner_match: CornerMatch::Tolerance(1e-9),
    };
    let json = serde_json::to_string(&options).unwrap();
    let back: FinalizeOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}

#[test]
fn mesh_part_bincode_round_trip() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();
    let part = &p.locals[1];
    let bytes = bincode::serialize(part).unwrap();
    let back: MeshPart = bincode::deserialize(&bytes).unwrap();
    assert_eq!(&back, part);
}

#[test]
fn invariants_hold_for_finalized_partitions() {
    let (g, assignment) = square();
    let options = FinalizeOptions {
        oversampling_layers: 2,
        neighbor_recursion_level: 2,
        ..Default::default()
    };
    let p = decompose(&g.mesh, &assignment, 9, options).unwrap();
    assert!(p.validate_invariants().is_ok());
    p.debug_assert_invariants();
}

#[test]
fn invariants_detect_inconsistent_assignment() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let mut p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();
    p.assignment[0] = 2;
    assert!(matches!(
        p.validate_invariants(),
        Err(DecompositionError::InvariantViolation(_))
    ));

    let mut p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();
    p.neighbors[0].clear();
    assert_eq!(
        p.validate_invariants().unwrap_err().kind(),
        ErrorKind::Configuration
    );
}

#[test]
fn invariants_detect_unrecorded_boundary_facets() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let mut p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();
    p.boundaries[0] = None;
    assert!(matches!(
        p.validate_invariants(),
        Err(DecompositionError::InvariantViolation(_))
    ));

    let mut p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();
    if let Some(right) = p.boundaries[2].as_mut() {
        right.markers.clear();
    }
    assert!(p.validate_invariants().is_err());
}

#[cfg(any(debug_assertions, feature = "strict-invariants"))]
#[test]
#[should_panic]
fn broken_partition_panics_in_debug() {
    let g = interval_mesh(9, 0.0, 9.0).unwrap();
    let mut p = decompose(&g.mesh, &LINE, 3, FinalizeOptions::default()).unwrap();
    p.assignment.pop();
    p.debug_assert_invariants();
}

#[test]
fn global_mesh_size_matches_assignment() {
    let (g, assignment) = square();
    assert_eq!(assignment.len(), g.mesh.size(0));
}
