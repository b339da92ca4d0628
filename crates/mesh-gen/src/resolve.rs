//! Input resolution: reconcile domain, sizing, and options into the
//! canonical `(fd, fh, bbox, h0)` the iterator consumes.

use nalgebra::Point;

use mesh_geom::Bbox;

use crate::domain::SignedDistance;
use crate::error::{GenError, GenResult};
use crate::sizing::SizingField;

/// The distance function after bbox reconciliation.
///
/// When a sizing field pads the meshing box beyond a canonical box domain,
/// the domain is rebuilt from the merged box so the lattice fills the
/// padding; every other domain is used as given.
pub(crate) enum DistanceFn<'a, const D: usize, S: SignedDistance<D>> {
    User(&'a S),
    MergedBox(Bbox<D>),
}

impl<'a, const D: usize, S: SignedDistance<D>> DistanceFn<'a, D, S> {
    pub(crate) fn eval(&self, p: &Point<f64, D>) -> f64 {
        match self {
            DistanceFn::User(fd) => fd.eval(p),
            DistanceFn::MergedBox(bbox) => bbox.signed_distance(p),
        }
    }
}

/// The sizing field, possibly restricted to a rank's extent.
///
/// Restriction clamps queries into the extent, which keeps grid-backed
/// fields well-defined for halo points just outside the owned slab.
pub(crate) enum SizingRef<'a, const D: usize, Z: SizingField<D>> {
    Plain(&'a Z),
    Localized { inner: &'a Z, extent: Bbox<D> },
}

impl<'a, const D: usize, Z: SizingField<D>> SizingRef<'a, D, Z> {
    pub(crate) fn eval(&self, p: &Point<f64, D>) -> f64 {
        match self {
            SizingRef::Plain(fh) => fh.eval(p),
            SizingRef::Localized { inner, extent } => {
                let mut q = *p;
                for i in 0..D {
                    q[i] = q[i].clamp(extent.lo[i], extent.hi[i]);
                }
                inner.eval(&q)
            }
        }
    }
}

/// Fully resolved inputs plus the tolerances derived from `h0`.
pub(crate) struct Resolved<'a, const D: usize, S: SignedDistance<D>> {
    pub fd: DistanceFn<'a, D, S>,
    pub bbox: Bbox<D>,
    pub h0: f64,
    /// Interior tolerance for cell trimming: `0.1 * h0`.
    pub geps: f64,
    /// Finite-difference step for boundary projection.
    pub deps: f64,
}

/// Reconcile domain, sizing, and explicit overrides.
pub(crate) fn resolve<'a, const D: usize, S, Z>(
    domain: &'a S,
    sizing: &Z,
    h0_override: Option<f64>,
    bbox_override: Option<Bbox<D>>,
) -> GenResult<Resolved<'a, D, S>>
where
    S: SignedDistance<D>,
    Z: SizingField<D>,
{
    let domain_box = domain.bbox();
    let base = domain_box
        .or(bbox_override)
        .ok_or(GenError::MissingBbox)?;

    let sizing_box = SizingField::<D>::bbox(sizing);
    let bbox = match sizing_box {
        Some(b) => base.merged(&b),
        None => base,
    };

    let fd = if domain.is_box() && sizing_box.is_some() && Some(bbox) != domain_box {
        DistanceFn::MergedBox(bbox)
    } else {
        DistanceFn::User(domain)
    };

    let h0 = SizingField::<D>::min_size(sizing)
        .or(h0_override)
        .ok_or(GenError::MissingMinimumSize)?;
    if !(h0 > 0.0) {
        return Err(GenError::InvalidOption {
            name: "h0",
            details: format!("must be positive, got {h0}"),
        });
    }

    Ok(Resolved {
        fd,
        bbox,
        h0,
        geps: 0.1 * h0,
        deps: f64::EPSILON.sqrt() * h0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rectangle;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    struct PaddedSizing;

    impl SizingField<2> for PaddedSizing {
        fn eval(&self, _p: &Point2<f64>) -> f64 {
            0.1
        }
        fn bbox(&self) -> Option<Bbox<2>> {
            Some(Bbox::new([-0.5, 0.0], [1.0, 1.5]).unwrap())
        }
        fn min_size(&self) -> Option<f64> {
            Some(0.1)
        }
    }

    #[test]
    fn test_scalar_sizing_uses_domain_box() {
        let rect = Rectangle::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let res = resolve(&rect, &0.1_f64, None, None).unwrap();
        assert_eq!(res.bbox.lo, [0.0, 0.0]);
        assert_eq!(res.bbox.hi, [1.0, 1.0]);
        assert_eq!(res.h0, 0.1);
        assert_relative_eq!(res.geps, 0.01);
        // Domain untouched: no padding happened.
        assert!(matches!(res.fd, DistanceFn::User(_)));
    }

    #[test]
    fn test_padded_sizing_rebuilds_box_domain() {
        let rect = Rectangle::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let res = resolve(&rect, &PaddedSizing, None, None).unwrap();
        assert_eq!(res.bbox.lo, [-0.5, 0.0]);
        assert_eq!(res.bbox.hi, [1.0, 1.5]);
        assert!(matches!(res.fd, DistanceFn::MergedBox(_)));
        // The rebuilt distance follows the merged box.
        assert!(res.fd.eval(&Point2::new(-0.25, 0.5)) < 0.0);
    }

    #[test]
    fn test_callable_domain_requires_bbox() {
        let fd = |p: &Point2<f64>| p.coords.norm() - 1.0;
        assert!(matches!(
            resolve(&fd, &0.1_f64, None, None),
            Err(GenError::MissingBbox)
        ));

        let bbox = Bbox::new([-1.0, -1.0], [1.0, 1.0]).unwrap();
        assert!(resolve(&fd, &0.1_f64, None, Some(bbox)).is_ok());
    }

    #[test]
    fn test_variable_sizing_requires_h0() {
        let rect = Rectangle::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let fh = |_p: &Point2<f64>| 0.1;
        assert!(matches!(
            resolve(&rect, &fh, None, None),
            Err(GenError::MissingMinimumSize)
        ));
        assert!(resolve(&rect, &fh, Some(0.1), None).is_ok());
    }
}
