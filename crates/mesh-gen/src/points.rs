//! Initial point placement: staggered lattice plus density rejection.

use nalgebra::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use mesh_geom::Bbox;

use crate::comm::Communicator;
use crate::decomp::blocker;
use crate::domain::SignedDistance;
use crate::error::{GenError, GenResult};
use crate::migration::{flatten_points, unflatten_points};
use crate::options::GenerateOptions;
use crate::resolve::{DistanceFn, SizingRef};
use crate::sizing::SizingField;

/// Vertical spacing factor that makes neighboring lattice points
/// equidistant: `sqrt(3)/2`.
const ROW_SPACING: f64 = 0.866_025_403_784_438_6;

/// Fill `bbox` with a staggered lattice of pitch `h0`.
///
/// Rows (and layers in 3D) at an odd index are shifted half a pitch along
/// the first axis, so 2D cells start out near-equilateral.
pub(crate) fn staggered_lattice<const D: usize>(h0: f64, bbox: &Bbox<D>) -> Vec<Point<f64, D>> {
    let mut spacing = [h0; D];
    let mut counts = [0usize; D];
    for i in 0..D {
        if i > 0 {
            spacing[i] = h0 * ROW_SPACING;
        }
        counts[i] = (bbox.side(i) / spacing[i]).floor() as usize + 1;
    }

    let total: usize = counts.iter().product();
    let mut points = Vec::with_capacity(total);
    for flat in 0..total {
        let mut rest = flat;
        let mut idx = [0usize; D];
        for i in 0..D {
            idx[i] = rest % counts[i];
            rest /= counts[i];
        }
        let mut coords = [0.0; D];
        for i in 0..D {
            coords[i] = bbox.lo[i] + idx[i] as f64 * spacing[i];
        }
        let staggered: usize = idx[1..].iter().sum();
        if staggered % 2 == 1 {
            coords[0] += 0.5 * h0;
        }
        points.push(Point::from(coords));
    }
    points
}

/// The slab of `bbox` owned by `rank` when decomposing along `axis`,
/// widened by `h0` on each interior face so lattices overlap into the halo.
pub(crate) fn rank_local_box<const D: usize>(
    bbox: &Bbox<D>,
    rank: usize,
    size: usize,
    axis: usize,
    h0: f64,
) -> Bbox<D> {
    let width = bbox.side(axis) / size as f64;
    let mut local = *bbox;
    local.lo[axis] = (bbox.lo[axis] + rank as f64 * width - h0).max(bbox.lo[axis]);
    local.hi[axis] = (bbox.lo[axis] + (rank + 1) as f64 * width + h0).min(bbox.hi[axis]);
    local
}

/// Build the starting point set for the relaxation loop.
///
/// Without user points: lattice over the (rank-local) bbox, trimmed to the
/// domain interior, then thinned by rejection sampling so local density
/// follows `1 / fh^D`; fixed points are prepended. With user points: the
/// coordinator partitions them along `axis` and scatters one block per rank.
pub(crate) fn initial_points<const D: usize, S, Z>(
    fd: &DistanceFn<'_, D, S>,
    fh: &SizingRef<'_, D, Z>,
    bbox: &Bbox<D>,
    h0: f64,
    geps: f64,
    opts: &GenerateOptions<D>,
    comm: &impl Communicator,
) -> GenResult<Vec<Point<f64, D>>>
where
    S: SignedDistance<D>,
    Z: SizingField<D>,
{
    let points = match &opts.initial_points {
        Some(user) => scatter_user_points(user, opts.axis, comm),
        None => sample_lattice(fd, fh, bbox, h0, geps, opts, comm),
    };
    if points.is_empty() {
        return Err(GenError::EmptyPointSet { rank: comm.rank() });
    }
    debug!("rank {} starts with {} vertices", comm.rank(), points.len());
    Ok(points)
}

fn sample_lattice<const D: usize, S, Z>(
    fd: &DistanceFn<'_, D, S>,
    fh: &SizingRef<'_, D, Z>,
    bbox: &Bbox<D>,
    h0: f64,
    geps: f64,
    opts: &GenerateOptions<D>,
    comm: &impl Communicator,
) -> Vec<Point<f64, D>>
where
    S: SignedDistance<D>,
    Z: SizingField<D>,
{
    let local_box = if comm.size() > 1 {
        rank_local_box(bbox, comm.rank(), comm.size(), opts.axis, h0)
    } else {
        *bbox
    };

    let candidates: Vec<Point<f64, D>> = staggered_lattice(h0, &local_box)
        .into_iter()
        .filter(|p| fd.eval(p) < geps)
        .collect();

    let sizes: Vec<f64> = candidates.iter().map(|p| fh.eval(p)).collect();
    let local_min = sizes.iter().copied().fold(f64::INFINITY, f64::min);
    // All ranks must thin against the same reference density.
    let r0m = comm.allreduce_min(local_min);

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut points = opts.fixed_points.clone();
    for (p, r0) in candidates.into_iter().zip(sizes) {
        if rng.random::<f64>() < (r0m / r0).powi(D as i32) {
            points.push(p);
        }
    }
    points
}

fn scatter_user_points<const D: usize>(
    user: &[Point<f64, D>],
    axis: usize,
    comm: &impl Communicator,
) -> Vec<Point<f64, D>> {
    if comm.size() == 1 {
        return user.to_vec();
    }
    let sends: Vec<Vec<f64>> = if comm.rank() == 0 {
        let (blocks, _extents) = blocker(user, comm.size(), axis);
        blocks.iter().map(|block| flatten_points(block)).collect()
    } else {
        vec![Vec::new(); comm.size()]
    };
    let received = comm.all_to_all(sends);
    unflatten_points(&received[0])
}
