//! Core simplex-mesh container.

use nalgebra::Point;

use crate::bbox::Bbox;

/// An unstructured simplex mesh with indexed cells.
///
/// `D` is the spatial dimension and `C == D + 1` the number of vertices per
/// cell. Indices are dense and 0-based, and are only meaningful for the
/// point array they were produced with: any retriangulation renumbers them.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexMesh<const D: usize, const C: usize> {
    /// Vertex coordinates.
    pub points: Vec<Point<f64, D>>,

    /// Cells as index tuples into `points`.
    pub cells: Vec<[usize; C]>,
}

/// A triangle mesh in the plane.
pub type TriMesh = SimplexMesh<2, 3>;

/// A tetrahedral mesh.
pub type TetMesh = SimplexMesh<3, 4>;

impl<const D: usize, const C: usize> SimplexMesh<D, C> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            cells: Vec::new(),
        }
    }

    /// Create a mesh from parts.
    pub fn from_parts(points: Vec<Point<f64, D>>, cells: Vec<[usize; C]>) -> Self {
        Self { points, cells }
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the mesh has no vertices or no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.cells.is_empty()
    }

    /// Axis-aligned bounding box of the vertices, or `None` if there are none.
    pub fn bounds(&self) -> Option<Bbox<D>> {
        Bbox::from_points(&self.points)
    }
}

impl<const D: usize, const C: usize> Default for SimplexMesh<D, C> {
    fn default() -> Self {
        Self::new()
    }
}
