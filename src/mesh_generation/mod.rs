//! Structured mesh generators and structured subdomain assignment.
//!
//! Every generator numbers vertices and cells lexicographically (x fastest),
//! so cell `(i, j, k)` has global element index `i + nx * (j + ny * k)`.
//! [`block_partition`] uses that numbering to cut the grid into a regular
//! arrangement of subdomain blocks.

use std::cmp::Ordering;

use crate::mesh_error::MeshError;
use crate::topology::cell_type::CellType;
use crate::topology::conforming::ConformingMesh;

/// Output from a structured mesh generator.
#[derive(Clone, Debug)]
pub struct GeneratedMesh {
    pub mesh: ConformingMesh,
    /// Number of cells along each axis.
    pub cells_per_direction: Vec<usize>,
}

fn invalid_geometry(message: impl Into<String>) -> MeshError {
    MeshError::InvalidGeometry(message.into())
}

fn check_extent(min: &[f64], max: &[f64]) -> Result<(), MeshError> {
    for (axis, (lo, hi)) in min.iter().zip(max).enumerate() {
        if lo.partial_cmp(hi) != Some(Ordering::Less) {
            return Err(invalid_geometry(format!(
                "axis {axis}: min {lo} must be smaller than max {hi}"
            )));
        }
    }
    Ok(())
}

/// Generate a 1D interval mesh with `n` segments over `[min, max]`.
pub fn interval_mesh(n: usize, min: f64, max: f64) -> Result<GeneratedMesh, MeshError> {
    if n == 0 {
        return Err(invalid_geometry("n must be positive"));
    }
    check_extent(&[min], &[max])?;

    let dx = (max - min) / n as f64;
    let vertices: Vec<Vec<f64>> = (0..=n).map(|i| vec![min + dx * i as f64]).collect();
    let cells = (0..n)
        .map(|i| (CellType::Segment, vec![i, i + 1]))
        .collect();

    Ok(GeneratedMesh {
        mesh: ConformingMesh::new(1, &vertices, cells)?,
        cells_per_direction: vec![n],
    })
}

/// Generate a structured quadrilateral mesh over `[min, max]` with `nx`×`ny` cells.
pub fn quad_mesh(
    nx: usize,
    ny: usize,
    min: [f64; 2],
    max: [f64; 2],
) -> Result<GeneratedMesh, MeshError> {
    if nx == 0 || ny == 0 {
        return Err(invalid_geometry("nx and ny must be positive"));
    }
    check_extent(&min, &max)?;

    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;
    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        let y = min[1] + dy * j as f64;
        for i in 0..=nx {
            let x = min[0] + dx * i as f64;
            vertices.push(vec![x, y]);
        }
    }

    let mut cells = Vec::with_capacity(nx * ny);
    let row_stride = nx + 1;
    for j in 0..ny {
        for i in 0..nx {
            let v0 = j * row_stride + i;
            let v1 = v0 + 1;
            let v3 = v0 + row_stride;
            let v2 = v3 + 1;
            cells.push((CellType::Quadrilateral, vec![v0, v1, v2, v3]));
        }
    }

    Ok(GeneratedMesh {
        mesh: ConformingMesh::new(2, &vertices, cells)?,
        cells_per_direction: vec![nx, ny],
    })
}

/// Generate a structured hexahedral mesh over `[min, max]` with `nx`×`ny`×`nz` cells.
pub fn hex_mesh(
    nx: usize,
    ny: usize,
    nz: usize,
    min: [f64; 3],
    max: [f64; 3],
) -> Result<GeneratedMesh, MeshError> {
    if nx == 0 || ny == 0 || nz == 0 {
        return Err(invalid_geometry("nx, ny, and nz must be positive"));
    }
    check_extent(&min, &max)?;

    let dx = (max[0] - min[0]) / nx as f64;
    let dy = (max[1] - min[1]) / ny as f64;
    let dz = (max[2] - min[2]) / nz as f64;
    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
    for k in 0..=nz {
        let z = min[2] + dz * k as f64;
        for j in 0..=ny {
            let y = min[1] + dy * j as f64;
            for i in 0..=nx {
                let x = min[0] + dx * i as f64;
                vertices.push(vec![x, y, z]);
            }
        }
    }

    let mut cells = Vec::with_capacity(nx * ny * nz);
    let row_stride = nx + 1;
    let slab_stride = row_stride * (ny + 1);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let v0 = k * slab_stride + j * row_stride + i;
                let v1 = v0 + 1;
                let v3 = v0 + row_stride;
                let v2 = v3 + 1;
                let v4 = v0 + slab_stride;
                let v5 = v4 + 1;
                let v7 = v4 + row_stride;
                let v6 = v7 + 1;
                cells.push((
                    CellType::Hexahedron,
                    vec![v0, v1, v2, v3, v4, v5, v6, v7],
                ));
            }
        }
    }

    Ok(GeneratedMesh {
        mesh: ConformingMesh::new(3, &vertices, cells)?,
        cells_per_direction: vec![nx, ny, nz],
    })
}

/// Assign every cell of a structured mesh to a block subdomain.
///
/// `parts_per_direction[a]` blocks are cut along axis `a` and must lie in
/// `1..=cells_per_direction[a]`; cells are spread over the blocks as evenly as
/// integer division allows. Subdomains are numbered lexicographically (x fastest), so the result uses
/// every id in `0..product(parts_per_direction)`.
///
/// Returns the element→subdomain vector indexed by global element index.
pub fn block_partition(
    generated: &GeneratedMesh,
    parts_per_direction: &[usize],
) -> Result<Vec<usize>, MeshError> {
    let cells = &generated.cells_per_direction;
    if parts_per_direction.len() != cells.len() {
        return Err(invalid_geometry(format!(
            "expected {} partition counts, got {}",
            cells.len(),
            parts_per_direction.len()
        )));
    }
    for (axis, (&parts, &n)) in parts_per_direction.iter().zip(cells).enumerate() {
        if parts == 0 || parts > n {
            return Err(invalid_geometry(format!(
                "axis {axis}: cannot cut {n} cells into {parts} blocks"
            )));
        }
    }

    let total: usize = cells.iter().product();
    let mut assignment = Vec::with_capacity(total);
    for element in 0..total {
        let mut rest = element;
        let mut subdomain = 0;
        let mut stride = 1;
        for (&n, &parts) in cells.iter().zip(parts_per_direction) {
            let ijk = rest % n;
            rest /= n;
            subdomain += (ijk * parts / n) * stride;
            stride *= parts;
        }
        assignment.push(subdomain);
    }
    Ok(assignment)
}
