//! The force-equilibrium relaxation loop.

use nalgebra::{Point, SVector};
use tracing::{debug, info};

use mesh_geom::{
    cell_centroid, fix_mesh, linter, remove_external_entities, unique_edges, SimplexMesh,
};

use crate::comm::Communicator;
use crate::domain::SignedDistance;
use crate::error::{GenError, GenResult};
use crate::migration::{aggregate, enqueue, exchange, form_extents};
use crate::options::{GenerateOptions, Verbosity};
use crate::oracle::Oracle;
use crate::points::{initial_points, rank_local_box};
use crate::project::{improve_level_set, project_points_back};
use crate::resolve::{resolve, SizingRef};
use crate::sizing::SizingField;

/// Ratio welding tolerance to the nominal edge length.
pub(crate) const WELD_EPS_FACTOR: f64 = 1e-6;

/// Equilibrium spring lengths overshoot desired lengths by this factor so
/// edges stay slightly compressed: `1 + 0.4 / 2^(D-1)`.
fn l0_multiplier(dim: usize) -> f64 {
    1.0 + 0.4 / 2f64.powi(dim as i32 - 1)
}

/// Index of the point closest to `target`.
fn closest_node<const D: usize>(target: &Point<f64, D>, points: &[Point<f64, D>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, p) in points.iter().enumerate() {
        let d = (p - target).norm_squared();
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// One-sided repulsive spring forces accumulated per vertex.
///
/// Desired lengths are the sizing field at edge midpoints, rescaled so the
/// total desired length matches the total actual length; only compressed
/// edges push.
fn compute_forces<const D: usize, const C: usize, Z: SizingField<D>>(
    points: &[Point<f64, D>],
    cells: &[[usize; C]],
    fh: &SizingRef<'_, D, Z>,
    l0_mult: f64,
) -> Vec<SVector<f64, D>> {
    let mut forces = vec![SVector::<f64, D>::zeros(); points.len()];
    let edges = unique_edges(cells);
    if edges.is_empty() {
        return forces;
    }

    let mut bars = Vec::with_capacity(edges.len());
    let mut lengths = Vec::with_capacity(edges.len());
    let mut desired = Vec::with_capacity(edges.len());
    let mut sum_ld = 0.0;
    let mut sum_hd = 0.0;
    for &[a, b] in &edges {
        let bar = points[a] - points[b];
        let mut len = bar.norm();
        if len == 0.0 {
            len = f64::EPSILON;
        }
        let mid = Point::from((points[a].coords + points[b].coords) * 0.5);
        let h = fh.eval(&mid);
        sum_ld += len.powi(D as i32);
        sum_hd += h.powi(D as i32);
        bars.push(bar);
        lengths.push(len);
        desired.push(h);
    }

    let scale = l0_mult * (sum_ld / sum_hd).powf(1.0 / D as f64);
    for (((&[a, b], bar), &len), &h) in edges.iter().zip(&bars).zip(&lengths).zip(&desired) {
        let force = (h * scale - len).max(0.0);
        let fvec = bar * (force / len);
        forces[a] += fvec;
        forces[b] -= fvec;
    }
    forces
}

/// Gather, weld, and clean the finished mesh.
///
/// The coordinator receives the merged mesh; other ranks break out with
/// their local partial mesh untouched.
fn terminate<const D: usize, const C: usize>(
    points: Vec<Point<f64, D>>,
    cells: Vec<[usize; C]>,
    perform_checks: bool,
    weld_eps: f64,
    comm: &impl Communicator,
) -> (Vec<Point<f64, D>>, Vec<[usize; C]>) {
    let (points, cells) = if comm.size() > 1 {
        match aggregate(&points, &cells, comm, weld_eps) {
            Some(merged) => merged,
            None => return (points, cells),
        }
    } else {
        (points, cells)
    };
    cleanup(points, cells, perform_checks, weld_eps)
}

/// Final cleanup of a finished mesh: the full lint when requested, the
/// light weld-and-sweep otherwise.
pub(crate) fn cleanup<const D: usize, const C: usize>(
    points: Vec<Point<f64, D>>,
    cells: Vec<[usize; C]>,
    perform_checks: bool,
    weld_eps: f64,
) -> (Vec<Point<f64, D>>, Vec<[usize; C]>) {
    if perform_checks {
        let (points, cells, _report) = linter(points, cells, weld_eps);
        (points, cells)
    } else {
        fix_mesh(points, cells, weld_eps)
    }
}

/// Mesh an implicit domain by relaxing a point cloud to force equilibrium.
///
/// Runs exactly `max_iter` rounds of retriangulate, trim, push, project;
/// there is no convergence-based early exit. The oracle factory is invoked
/// once per round since ghost insertion invalidates vertex identity. With
/// more than one rank, the coordinator returns the merged mesh and every
/// other rank returns its local partial mesh.
pub fn generate_mesh<const D: usize, const C: usize, S, Z, O, F>(
    domain: &S,
    sizing: &Z,
    comm: &impl Communicator,
    mut make_oracle: F,
    opts: &GenerateOptions<D>,
) -> GenResult<SimplexMesh<D, C>>
where
    S: SignedDistance<D>,
    Z: SizingField<D>,
    O: Oracle<D, C>,
    F: FnMut() -> O,
{
    assert_eq!(C, D + 1, "a {D}-dimensional cell has {} vertices", D + 1);
    opts.validate()?;
    if comm.size() > 1 && !opts.fixed_points.is_empty() {
        return Err(GenError::FixedPointsInParallel { size: comm.size() });
    }

    let resolved = resolve(domain, sizing, opts.h0, opts.bbox)?;
    let (fd, bbox, h0, geps, deps) = (
        resolved.fd,
        resolved.bbox,
        resolved.h0,
        resolved.geps,
        resolved.deps,
    );
    let weld_eps = h0 * WELD_EPS_FACTOR;
    let l0_mult = l0_multiplier(D);

    let fh = if comm.size() > 1 {
        SizingRef::Localized {
            inner: sizing,
            extent: rank_local_box(&bbox, comm.rank(), comm.size(), opts.axis, h0),
        }
    } else {
        SizingRef::Plain(sizing)
    };

    let mut points = initial_points(&fd, &fh, &bbox, h0, geps, opts, comm)?;

    if opts.verbose >= Verbosity::Summary {
        info!(
            "commencing mesh generation with {} vertices on rank {}",
            points.len(),
            comm.rank()
        );
    }

    let mut count = 0;
    let (mut points, cells) = loop {
        let mut oracle = make_oracle();
        oracle.insert(&points);
        points = oracle.finite_vertices();
        let mut cells = oracle.finite_cells();

        // Fixed points drifted nowhere, but retriangulation renumbered them.
        let fixed_idx: Vec<usize> = opts
            .fixed_points
            .iter()
            .map(|f| closest_node(f, &points))
            .collect();

        let mut ghost_tail = 0usize;
        if comm.size() > 1 {
            let extents = form_extents(&points, h0, opts.axis, comm)?;
            let exports = enqueue(&points, &extents, comm.rank());
            let ghosts = exchange(comm, exports);
            let owned_count = points.len();

            oracle.insert(&ghosts);
            points = oracle.finite_vertices();
            cells = oracle.finite_cells();

            let (p, c, kept) = remove_external_entities(points, cells, &extents.owned);
            ghost_tail = kept.iter().filter(|&&old| old >= owned_count).count();
            points = p;
            cells = c;
        }

        cells.retain(|cell| fd.eval(&cell_centroid(&points, cell)) < -geps);

        if count == opts.max_iter - 1 {
            if opts.verbose >= Verbosity::Summary {
                info!("termination: iteration limit reached on rank {}", comm.rank());
            }
            break terminate(points, cells, opts.perform_checks, weld_eps, comm);
        }

        let mut forces = compute_forces(&points, &cells, &fh, l0_mult);
        for &i in &fixed_idx {
            forces[i] = SVector::zeros();
        }
        let max_move = opts.delta_t
            * forces
                .iter()
                .map(|f| f.norm())
                .fold(0.0_f64, f64::max);

        for (p, f) in points.iter_mut().zip(&forces) {
            *p += f * opts.delta_t;
        }
        project_points_back(&mut points, &fd, deps);

        // Ghosts were only needed to keep this round's triangulation honest.
        if ghost_tail > 0 {
            let owned = points.len() - ghost_tail;
            points.truncate(owned);
        }

        if opts.verbose >= Verbosity::Detailed {
            debug!(
                "iteration {}: max movement {:.6}, {} vertices, {} cells",
                count + 1,
                max_move,
                points.len(),
                cells.len()
            );
        }
        count += 1;
    };

    if comm.rank() == 0 {
        improve_level_set(&mut points, &cells, &fd, deps, 1000.0 * deps);
    }
    Ok(SimplexMesh::from_parts(points, cells))
}
