//! Dihedral-angle-driven sliver removal for tetrahedral meshes.

use nalgebra::Point3;
use tracing::{info, warn};

use mesh_geom::{cell_centroid, circumsphere_grad, dihedral_angles, fix_mesh, TetMesh};

use crate::comm::Communicator;
use crate::domain::SignedDistance;
use crate::error::GenResult;
use crate::generate::{cleanup, WELD_EPS_FACTOR};
use crate::options::{SliverOptions, Verbosity};
use crate::oracle::Oracle;
use crate::project::project_points_back;
use crate::resolve::resolve;
use crate::sizing::SizingField;

/// Fraction of `h0` a flagged vertex is pushed per iteration.
const PUSH: f64 = 0.10;

/// What the sliver pass produced on this rank.
#[derive(Debug, Clone, PartialEq)]
pub enum SliverOutcome {
    /// The cleaned mesh with dihedral angles driven toward the bounds.
    Improved(TetMesh),
    /// This rank did not participate; only the coordinator improves meshes.
    SkippedOnRank { rank: usize },
}

/// Drive out tetrahedra whose dihedral angles violate the configured bounds.
///
/// Flagged cells have their first vertex nudged along the gradient that
/// grows the circumsphere, which flattens the offending sliver out of
/// existence on a later retriangulation. The triangulation is kept alive
/// across iterations and only moved vertices are relocated. Exits early the
/// first iteration that finds no sliver.
pub fn sliver_removal<S, Z, O, F>(
    points: Vec<Point3<f64>>,
    domain: &S,
    sizing: &Z,
    comm: &impl Communicator,
    make_oracle: F,
    opts: &SliverOptions,
) -> GenResult<SliverOutcome>
where
    S: SignedDistance<3>,
    Z: SizingField<3>,
    O: Oracle<3, 4>,
    F: FnOnce() -> O,
{
    opts.validate(comm.size())?;
    if comm.rank() > 0 {
        warn!(
            "sliver removal runs on the coordinator only; rank {} produces no mesh",
            comm.rank()
        );
        return Ok(SliverOutcome::SkippedOnRank { rank: comm.rank() });
    }

    let resolved = resolve(domain, sizing, opts.h0, opts.bbox)?;
    let (fd, h0, geps, deps) = (resolved.fd, resolved.h0, resolved.geps, resolved.deps);
    let weld_eps = h0 * WELD_EPS_FACTOR;
    let min_bound = opts.min_dihedral_deg.to_radians();
    let max_bound = opts.max_dihedral_deg.to_radians();

    if opts.verbose >= Verbosity::Summary {
        info!(
            "bounding dihedral angles to [{}, {}] degrees over at most {} iterations, \
             starting from {} vertices",
            opts.min_dihedral_deg,
            opts.max_dihedral_deg,
            opts.max_iter,
            points.len()
        );
    }

    let mut oracle = make_oracle();
    oracle.insert(&points);

    let mut count = 0;
    loop {
        let mut points = oracle.finite_vertices();
        let mut cells = oracle.finite_cells();
        let before_move = points.clone();

        cells.retain(|cell| fd.eval(&cell_centroid(&points, cell)) < -geps);

        if count != opts.max_iter - 1 {
            let angles = dihedral_angles(&points, &cells);
            let flagged: Vec<usize> = angles
                .iter()
                .enumerate()
                .filter(|(_, a)| a.iter().any(|&x| x < min_bound || x > max_bound))
                .map(|(i, _)| i)
                .collect();

            if flagged.is_empty() {
                if opts.verbose >= Verbosity::Summary {
                    info!("no slivers detected after {} iterations", count);
                }
                let (p, c) = fix_mesh(points, cells, weld_eps);
                return Ok(SliverOutcome::Improved(TetMesh::from_parts(p, c)));
            }
            if opts.verbose >= Verbosity::Summary {
                info!("{} slivers remain", flagged.len());
            }

            for &ci in &flagged {
                let [i0, i1, i2, i3] = cells[ci];
                let grad = circumsphere_grad(&points[i0], &points[i1], &points[i2], &points[i3]);
                let norm = grad.norm();
                if norm > 0.0 {
                    points[i0] += grad * (PUSH * h0 / norm);
                }
            }
        }

        project_points_back(&mut points, &fd, deps);

        if count == opts.max_iter - 1 {
            if opts.verbose >= Verbosity::Summary {
                info!("termination: iteration limit reached");
            }
            let (p, c) = cleanup(points, cells, opts.perform_checks, weld_eps);
            return Ok(SliverOutcome::Improved(TetMesh::from_parts(p, c)));
        }

        let mut moved = Vec::new();
        let mut positions = Vec::new();
        for (i, (now, was)) in points.iter().zip(&before_move).enumerate() {
            if now != was {
                moved.push(i);
                positions.push(*now);
            }
        }
        oracle.relocate(&moved, &positions);
        count += 1;
    }
}
