#![allow(dead_code)]
use mesh_subdomains::decomposition::{FinalizeOptions, Partition, decompose};
use mesh_subdomains::mesh_generation::{GeneratedMesh, block_partition, hex_mesh, quad_mesh};
use mesh_subdomains::topology::conforming::ConformingMesh;
use mesh_subdomains::topology::entity::Entity;

pub fn el(i: usize) -> Entity {
    Entity::element(i)
}

/// `nx`×`ny` unit-square quads cut into `px`×`py` blocks.
pub fn quad_blocks(nx: usize, ny: usize, px: usize, py: usize) -> (GeneratedMesh, Vec<usize>) {
    let g = quad_mesh(nx, ny, [0.0, 0.0], [nx as f64, ny as f64]).unwrap();
    let assignment = block_partition(&g, &[px, py]).unwrap();
    (g, assignment)
}

/// `n`³ unit-cube hexes cut into `p`³ blocks.
pub fn hex_blocks(n: usize, p: usize) -> (GeneratedMesh, Vec<usize>) {
    let g = hex_mesh(n, n, n, [0.0; 3], [n as f64; 3]).unwrap();
    let assignment = block_partition(&g, &[p, p, p]).unwrap();
    (g, assignment)
}

pub fn finalize<'m>(
    mesh: &'m ConformingMesh,
    assignment: &[usize],
    options: FinalizeOptions,
) -> Partition<'m, ConformingMesh> {
    let size = assignment.iter().max().map_or(0, |m| m + 1);
    decompose(mesh, assignment, size, options).unwrap()
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}
