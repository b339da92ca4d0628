//! Desired-edge-length sizing fields.

use nalgebra::Point;

use mesh_geom::Bbox;

/// A spatially varying target edge length.
///
/// Implemented by closures (variable resolution) and by a bare `f64`
/// (uniform resolution). A scalar field knows its own minimum, so callers
/// need not pass `h0` separately.
pub trait SizingField<const D: usize> {
    /// Desired edge length at `p`. Must be positive everywhere inside the
    /// domain.
    fn eval(&self, p: &Point<f64, D>) -> f64;

    /// Bounding box of the field's support, when it has one. Sizing grids
    /// padded beyond the domain widen the meshing box.
    fn bbox(&self) -> Option<Bbox<D>> {
        None
    }

    /// Global minimum of the field, when known a priori.
    fn min_size(&self) -> Option<f64> {
        None
    }
}

impl<const D: usize, F> SizingField<D> for F
where
    F: Fn(&Point<f64, D>) -> f64,
{
    fn eval(&self, p: &Point<f64, D>) -> f64 {
        self(p)
    }
}

impl<const D: usize> SizingField<D> for f64 {
    fn eval(&self, _p: &Point<f64, D>) -> f64 {
        *self
    }

    fn min_size(&self) -> Option<f64> {
        Some(*self)
    }
}
