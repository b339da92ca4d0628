//! Axis-aligned bounding boxes.

use nalgebra::Point;

use crate::error::{GeomError, GeomResult};

/// An axis-aligned box in `D` dimensions.
///
/// Doubles as a rank extent during domain decomposition: the owned interval
/// of a rank is a `Bbox` padded by the halo width along the decomposition
/// axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox<const D: usize> {
    /// Lower corner.
    pub lo: [f64; D],
    /// Upper corner.
    pub hi: [f64; D],
}

impl<const D: usize> Bbox<D> {
    /// Create a box, validating that every interval is finite and non-empty.
    pub fn new(lo: [f64; D], hi: [f64; D]) -> GeomResult<Self> {
        for i in 0..D {
            if !lo[i].is_finite() || !hi[i].is_finite() {
                return Err(GeomError::InvalidBbox {
                    details: format!("non-finite bound on axis {i}"),
                });
            }
            if lo[i] >= hi[i] {
                return Err(GeomError::InvalidBbox {
                    details: format!("lo {} >= hi {} on axis {i}", lo[i], hi[i]),
                });
            }
        }
        Ok(Self { lo, hi })
    }

    /// Smallest box containing all points, or `None` for an empty slice.
    pub fn from_points(points: &[Point<f64, D>]) -> Option<Self> {
        let first = points.first()?;
        let mut lo = [0.0; D];
        let mut hi = [0.0; D];
        for i in 0..D {
            lo[i] = first[i];
            hi[i] = first[i];
        }
        for p in &points[1..] {
            for i in 0..D {
                lo[i] = lo[i].min(p[i]);
                hi[i] = hi[i].max(p[i]);
            }
        }
        Some(Self { lo, hi })
    }

    /// Component-wise union: min of lower bounds, max of upper bounds.
    pub fn merged(&self, other: &Self) -> Self {
        let mut lo = self.lo;
        let mut hi = self.hi;
        for i in 0..D {
            lo[i] = lo[i].min(other.lo[i]);
            hi[i] = hi[i].max(other.hi[i]);
        }
        Self { lo, hi }
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &Point<f64, D>) -> bool {
        (0..D).all(|i| p[i] >= self.lo[i] && p[i] <= self.hi[i])
    }

    /// The box grown by `pad` on both ends of a single axis.
    pub fn padded_along(&self, axis: usize, pad: f64) -> Self {
        let mut out = *self;
        out.lo[axis] -= pad;
        out.hi[axis] += pad;
        out
    }

    /// Extent along one axis.
    pub fn side(&self, axis: usize) -> f64 {
        self.hi[axis] - self.lo[axis]
    }

    /// Signed distance to the box boundary: negative inside, zero on the
    /// boundary, positive outside.
    ///
    /// Uses the DistMesh rectangle distance (exact on faces, approximate
    /// near corners), which is what the relaxation loop expects.
    pub fn signed_distance(&self, p: &Point<f64, D>) -> f64 {
        let mut inside = f64::INFINITY;
        for i in 0..D {
            inside = inside.min(p[i] - self.lo[i]).min(self.hi[i] - p[i]);
        }
        -inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn test_new_rejects_inverted_interval() {
        assert!(Bbox::new([0.0, 1.0], [1.0, 0.5]).is_err());
        assert!(Bbox::new([0.0, 0.0], [1.0, 1.0]).is_ok());
    }

    #[test]
    fn test_new_rejects_non_finite() {
        assert!(Bbox::new([0.0, f64::NAN], [1.0, 1.0]).is_err());
        assert!(Bbox::new([0.0, 0.0], [f64::INFINITY, 1.0]).is_err());
    }

    #[test]
    fn test_merged_takes_minmax() {
        let a = Bbox::new([0.0, 0.0], [1.0, 1.0]).unwrap();
        let b = Bbox::new([-0.5, 0.2], [0.8, 2.0]).unwrap();
        let m = a.merged(&b);
        assert_eq!(m.lo, [-0.5, 0.0]);
        assert_eq!(m.hi, [1.0, 2.0]);
    }

    #[test]
    fn test_signed_distance_sign_convention() {
        let b = Bbox::new([0.0, 0.0], [1.0, 1.0]).unwrap();
        assert!(b.signed_distance(&Point2::new(0.5, 0.5)) < 0.0);
        assert_eq!(b.signed_distance(&Point2::new(0.0, 0.5)), 0.0);
        assert!(b.signed_distance(&Point2::new(1.5, 0.5)) > 0.0);
    }

    #[test]
    fn test_from_points() {
        let pts = vec![Point2::new(1.0, 2.0), Point2::new(-1.0, 0.5)];
        let b = Bbox::from_points(&pts).unwrap();
        assert_eq!(b.lo, [-1.0, 0.5]);
        assert_eq!(b.hi, [1.0, 2.0]);
        assert!(Bbox::<2>::from_points(&[]).is_none());
    }

    #[test]
    fn test_padded_along() {
        let b = Bbox::new([0.0, 0.0], [1.0, 1.0]).unwrap();
        let p = b.padded_along(1, 0.1);
        assert_eq!(p.lo, [0.0, -0.1]);
        assert_eq!(p.hi, [1.0, 1.1]);
    }
}
