//! Ghost exchange and result aggregation across ranks.

use nalgebra::Point;
use tracing::debug;

use mesh_geom::{fix_mesh, Bbox};

use crate::comm::Communicator;
use crate::error::{GenError, GenResult};

/// Per-rank extents used by the halo exchange.
pub(crate) struct RankExtents<const D: usize> {
    /// This rank's true (unpadded) extent; entities fully outside it are
    /// dropped after ghost insertion.
    pub owned: Bbox<D>,
    /// Every rank's extent padded by `h0` along the decomposition axis,
    /// indexed by rank.
    pub padded: Vec<Bbox<D>>,
}

fn flatten_box<const D: usize>(b: &Bbox<D>) -> Vec<f64> {
    b.lo.iter().chain(b.hi.iter()).copied().collect()
}

fn unflatten_box<const D: usize>(buf: &[f64]) -> Bbox<D> {
    let mut lo = [0.0; D];
    let mut hi = [0.0; D];
    lo.copy_from_slice(&buf[..D]);
    hi.copy_from_slice(&buf[D..2 * D]);
    Bbox { lo, hi }
}

pub(crate) fn flatten_points<const D: usize>(points: &[Point<f64, D>]) -> Vec<f64> {
    let mut buf = Vec::with_capacity(points.len() * D);
    for p in points {
        buf.extend(p.coords.iter().copied());
    }
    buf
}

pub(crate) fn unflatten_points<const D: usize>(buf: &[f64]) -> Vec<Point<f64, D>> {
    buf.chunks_exact(D)
        .map(|chunk| {
            let mut coords = [0.0; D];
            coords.copy_from_slice(chunk);
            Point::from(coords)
        })
        .collect()
}

/// Compute and broadcast extents from the current point positions.
///
/// Extents are reformed every iteration: point movement shifts each rank's
/// slab, and the halo has to follow it.
pub(crate) fn form_extents<const D: usize>(
    points: &[Point<f64, D>],
    h0: f64,
    axis: usize,
    comm: &impl Communicator,
) -> GenResult<RankExtents<D>> {
    let owned = Bbox::from_points(points).ok_or(GenError::EmptyPointSet { rank: comm.rank() })?;
    let mine = owned.padded_along(axis, h0);

    let gathered = comm.all_gather(&flatten_box(&mine));
    let padded = gathered.iter().map(|buf| unflatten_box(buf)).collect();
    Ok(RankExtents { owned, padded })
}

/// Select the local points every other rank needs as ghosts.
///
/// A point is exported to rank `r` when it falls inside `r`'s padded
/// extent; the own slot stays empty.
pub(crate) fn enqueue<const D: usize>(
    points: &[Point<f64, D>],
    extents: &RankExtents<D>,
    rank: usize,
) -> Vec<Vec<Point<f64, D>>> {
    extents
        .padded
        .iter()
        .enumerate()
        .map(|(r, extent)| {
            if r == rank {
                Vec::new()
            } else {
                points.iter().filter(|p| extent.contains(p)).copied().collect()
            }
        })
        .collect()
}

/// Deliver enqueued ghosts with one all-to-all round.
///
/// Received ghosts are concatenated in source-rank order, which keeps the
/// insertion order identical across reruns.
pub(crate) fn exchange<const D: usize>(
    comm: &impl Communicator,
    exports: Vec<Vec<Point<f64, D>>>,
) -> Vec<Point<f64, D>> {
    let sends: Vec<Vec<f64>> = exports.iter().map(|pts| flatten_points(pts)).collect();
    let received = comm.all_to_all(sends);

    let mut ghosts = Vec::new();
    for (r, buf) in received.iter().enumerate() {
        if r != comm.rank() {
            ghosts.extend(unflatten_points::<D>(buf));
        }
    }
    debug!(
        "ghost exchange on rank {}: received {} vertices",
        comm.rank(),
        ghosts.len()
    );
    ghosts
}

/// Gather all partial meshes onto the coordinator.
///
/// Seam vertices are welded and connectivity renumbered; non-coordinator
/// ranks get `None` and keep their local partial mesh.
pub(crate) fn aggregate<const D: usize, const C: usize>(
    points: &[Point<f64, D>],
    cells: &[[usize; C]],
    comm: &impl Communicator,
    weld_eps: f64,
) -> Option<(Vec<Point<f64, D>>, Vec<[usize; C]>)> {
    let flat_cells: Vec<usize> = cells.iter().flatten().copied().collect();
    let gathered_points = comm.gather_floats(&flatten_points(points), 0);
    let gathered_cells = comm.gather_cells(&flat_cells, 0);

    let (point_bufs, cell_bufs) = match (gathered_points, gathered_cells) {
        (Some(p), Some(c)) => (p, c),
        _ => return None,
    };

    let mut all_points: Vec<Point<f64, D>> = Vec::new();
    let mut all_cells: Vec<[usize; C]> = Vec::new();
    for (point_buf, cell_buf) in point_bufs.iter().zip(cell_bufs.iter()) {
        let offset = all_points.len();
        all_points.extend(unflatten_points::<D>(point_buf));
        for chunk in cell_buf.chunks_exact(C) {
            let mut cell = [0usize; C];
            for (slot, &v) in cell.iter_mut().zip(chunk.iter()) {
                *slot = v + offset;
            }
            all_cells.push(cell);
        }
    }

    debug!(
        "aggregated {} vertices and {} cells from {} ranks",
        all_points.len(),
        all_cells.len(),
        comm.size()
    );
    Some(fix_mesh(all_points, all_cells, weld_eps))
}
