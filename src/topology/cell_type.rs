//! Cell type metadata and reference-element sub-entity tables.
//!
//! Cells reference their vertices in the following local orderings:
//!
//! - [`CellType::Segment`]: `(0,1)`
//! - [`CellType::Triangle`]: `(0,1,2)`
//! - [`CellType::Quadrilateral`]: `(0,1,2,3)` counter-clockwise
//! - [`CellType::Tetrahedron`]: `(0,1,2,3)`
//! - [`CellType::Hexahedron`]: `(0,..,7)` with `0..=3` the bottom face and
//!   `4..=7` the top face, both counter-clockwise
//! - [`CellType::Prism`]: `(0,1,2)` bottom triangle, `(3,4,5)` top triangle
//!
//! The tables below list, per codimension, which local vertices span each
//! sub-entity. The position in the table is the sub-entity's local number
//! (for codimension 1 this is the local facet id).

/// Common cell types for mesh elements.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Serialize, serde::Deserialize,
)]
pub enum CellType {
    /// 0D vertex.
    #[default]
    Vertex,
    /// 1D segment/edge.
    Segment,
    /// 2D simplex (triangle).
    Triangle,
    /// 2D tensor-product cell (quad).
    Quadrilateral,
    /// 3D simplex (tet).
    Tetrahedron,
    /// 3D tensor-product cell (hex).
    Hexahedron,
    /// 3D wedge/prism.
    Prism,
}

type Table = &'static [&'static [usize]];

const VERTEX: Table = &[&[0]];

const SEGMENT_VERTICES: Table = &[&[0], &[1]];

const TRIANGLE_EDGES: Table = &[&[0, 1], &[1, 2], &[2, 0]];
const TRIANGLE_VERTICES: Table = &[&[0], &[1], &[2]];

const QUAD_EDGES: Table = &[&[0, 1], &[1, 2], &[2, 3], &[3, 0]];
const QUAD_VERTICES: Table = &[&[0], &[1], &[2], &[3]];

const TET_FACES: Table = &[&[0, 1, 2], &[0, 1, 3], &[1, 2, 3], &[0, 2, 3]];
const TET_EDGES: Table = &[&[0, 1], &[1, 2], &[2, 0], &[0, 3], &[1, 3], &[2, 3]];
const TET_VERTICES: Table = &[&[0], &[1], &[2], &[3]];

const HEX_FACES: Table = &[
    &[0, 1, 2, 3],
    &[4, 5, 6, 7],
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[3, 0, 4, 7],
];
const HEX_EDGES: Table = &[
    &[0, 1],
    &[1, 2],
    &[2, 3],
    &[3, 0],
    &[4, 5],
    &[5, 6],
    &[6, 7],
    &[7, 4],
    &[0, 4],
    &[1, 5],
    &[2, 6],
    &[3, 7],
];
const HEX_VERTICES: Table = &[&[0], &[1], &[2], &[3], &[4], &[5], &[6], &[7]];

const PRISM_FACES: Table = &[
    &[0, 1, 2],
    &[3, 4, 5],
    &[0, 1, 4, 3],
    &[1, 2, 5, 4],
    &[2, 0, 3, 5],
];
const PRISM_EDGES: Table = &[
    &[0, 1],
    &[1, 2],
    &[2, 0],
    &[3, 4],
    &[4, 5],
    &[5, 3],
    &[0, 3],
    &[1, 4],
    &[2, 5],
];
const PRISM_VERTICES: Table = &[&[0], &[1], &[2], &[3], &[4], &[5]];

impl CellType {
    /// Topological dimension of the cell.
    pub fn dimension(self) -> usize {
        match self {
            CellType::Vertex => 0,
            CellType::Segment => 1,
            CellType::Triangle | CellType::Quadrilateral => 2,
            CellType::Tetrahedron | CellType::Hexahedron | CellType::Prism => 3,
        }
    }

    /// Number of vertices of the reference element.
    pub fn vertex_count(self) -> usize {
        match self {
            CellType::Vertex => 1,
            CellType::Segment => 2,
            CellType::Triangle => 3,
            CellType::Quadrilateral | CellType::Tetrahedron => 4,
            CellType::Prism => 6,
            CellType::Hexahedron => 8,
        }
    }

    /// Local vertex lists of all sub-entities at codimension `codim`
    /// (relative to this cell). Returns `None` for `codim > dimension()`.
    ///
    /// Codimension 0 is the cell itself and yields `None` here.
    pub fn sub_entity_table(self, codim: usize) -> Option<Table> {
        let dim = self.dimension();
        if codim == 0 || codim > dim {
            return None;
        }
        let table = match (self, dim - codim) {
            (CellType::Vertex, _) => VERTEX,
            (CellType::Segment, 0) => SEGMENT_VERTICES,
            (CellType::Triangle, 1) => TRIANGLE_EDGES,
            (CellType::Triangle, 0) => TRIANGLE_VERTICES,
            (CellType::Quadrilateral, 1) => QUAD_EDGES,
            (CellType::Quadrilateral, 0) => QUAD_VERTICES,
            (CellType::Tetrahedron, 2) => TET_FACES,
            (CellType::Tetrahedron, 1) => TET_EDGES,
            (CellType::Tetrahedron, 0) => TET_VERTICES,
            (CellType::Hexahedron, 2) => HEX_FACES,
            (CellType::Hexahedron, 1) => HEX_EDGES,
            (CellType::Hexahedron, 0) => HEX_VERTICES,
            (CellType::Prism, 2) => PRISM_FACES,
            (CellType::Prism, 1) => PRISM_EDGES,
            (CellType::Prism, 0) => PRISM_VERTICES,
            _ => return None,
        };
        Some(table)
    }

    /// Number of sub-entities at codimension `codim` (1 for codimension 0).
    pub fn sub_entity_count(self, codim: usize) -> usize {
        if codim == 0 {
            return 1;
        }
        self.sub_entity_table(codim).map_or(0, |t| t.len())
    }

    /// Cell type of the `i`-th sub-entity at codimension `codim`.
    pub fn sub_entity_type(self, codim: usize, i: usize) -> Option<CellType> {
        if codim == 0 {
            return (i == 0).then_some(self);
        }
        let table = self.sub_entity_table(codim)?;
        let vertices = table.get(i)?;
        Some(match (self.dimension() - codim, vertices.len()) {
            (0, _) => CellType::Vertex,
            (1, _) => CellType::Segment,
            (2, 3) => CellType::Triangle,
            (2, 4) => CellType::Quadrilateral,
            _ => return None,
        })
    }

    /// Number of facets (codimension-1 sub-entities).
    pub fn facet_count(self) -> usize {
        self.sub_entity_count(1)
    }
}
