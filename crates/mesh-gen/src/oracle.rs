//! Contract for the external Delaunay triangulation primitive.

use nalgebra::Point;

/// An incremental Delaunay triangulation owned by a single rank.
///
/// The engine never patches connectivity itself: after every `insert` or
/// `relocate` it re-extracts the full finite vertex set and cell list.
/// Implementors must guarantee:
///
/// - indices are dense, 0-based, and valid only for the state just produced;
/// - `finite_vertices` returns vertices in insertion order (ghost vertices
///   inserted last therefore sit at the tail, which ghost stripping relies
///   on);
/// - cells touching the triangulation's outer structure (infinite cells,
///   super-simplex remnants) are excluded from `finite_cells`.
///
/// The generation loop constructs a fresh oracle every iteration through a
/// factory closure, because ghost insertion changes point identity and count
/// each round; only the sliver pass keeps one instance alive and relocates
/// points incrementally.
pub trait Oracle<const D: usize, const C: usize> {
    /// Bulk-insert points into the triangulation.
    fn insert(&mut self, points: &[Point<f64, D>]);

    /// Move existing vertices to new coordinates. `indices` refer to the
    /// vertex numbering of the most recent extraction.
    fn relocate(&mut self, indices: &[usize], positions: &[Point<f64, D>]);

    /// All finite vertices, in insertion order.
    fn finite_vertices(&self) -> Vec<Point<f64, D>>;

    /// Connectivity of all finite cells, indexing into the vertex array
    /// just produced by [`finite_vertices`](Self::finite_vertices).
    fn finite_cells(&self) -> Vec<[usize; C]>;
}
