//! Geometry/coordinates storage for mesh vertices.
//!
//! Coordinates are stored contiguously with a fixed dimension per vertex.

use crate::mesh_error::MeshError;

/// Coordinate storage with an attached dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinates {
    dimension: usize,
    values: Vec<f64>,
}

impl Coordinates {
    /// Build from one coordinate vector per vertex, validating slice lengths.
    pub fn try_from_points(dimension: usize, points: &[Vec<f64>]) -> Result<Self, MeshError> {
        if dimension == 0 {
            return Err(MeshError::InvalidGeometry(
                "dimension must be non-zero".into(),
            ));
        }
        let mut values = Vec::with_capacity(dimension * points.len());
        for (idx, coord) in points.iter().enumerate() {
            if coord.len() != dimension {
                return Err(MeshError::InvalidGeometry(format!(
                    "vertex {idx} has dimension {}, expected {dimension}",
                    coord.len()
                )));
            }
            values.extend_from_slice(coord);
        }
        Ok(Self { dimension, values })
    }

    /// Returns the spatial dimension per vertex.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len() / self.dimension
    }

    /// `true` if no vertex is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read-only view of the coordinate slice for vertex `v`.
    #[inline]
    pub fn try_restrict(&self, v: usize) -> Result<&[f64], MeshError> {
        let start = v * self.dimension;
        self.values
            .get(start..start + self.dimension)
            .ok_or_else(|| MeshError::InvalidGeometry(format!("no coordinates for vertex {v}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restrict_returns_point_slices() {
        let coords =
            Coordinates::try_from_points(2, &[vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords.try_restrict(1).unwrap(), &[2.0, 3.0]);
        assert!(coords.try_restrict(2).is_err());
    }

    #[test]
    fn rejects_wrong_lengths() {
        let err = Coordinates::try_from_points(2, &[vec![0.0]]).unwrap_err();
        assert!(matches!(err, MeshError::InvalidGeometry(_)));
        assert!(Coordinates::try_from_points(0, &[]).is_err());
    }
}
