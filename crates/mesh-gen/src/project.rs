//! Newton projection of stray points back onto the domain boundary.

use nalgebra::{Point, SVector};

use mesh_geom::boundary_vertices;

use crate::domain::SignedDistance;
use crate::resolve::DistanceFn;

/// Forward-difference gradient of the signed distance at `p`, reusing the
/// already-known value `d = fd(p)`.
fn distance_grad<const D: usize, S: SignedDistance<D>>(
    fd: &DistanceFn<'_, D, S>,
    p: &Point<f64, D>,
    d: f64,
    deps: f64,
) -> SVector<f64, D> {
    SVector::from_fn(|i, _| {
        let mut q = *p;
        q[i] += deps;
        (fd.eval(&q) - d) / deps
    })
}

fn newton_step<const D: usize, S: SignedDistance<D>>(
    fd: &DistanceFn<'_, D, S>,
    p: &mut Point<f64, D>,
    d: f64,
    deps: f64,
) {
    let grad = distance_grad(fd, p, d, deps);
    // Clamp keeps the step finite where the gradient (nearly) vanishes.
    let grad2 = grad.norm_squared().max(deps);
    *p -= grad * (d / grad2);
}

/// One Newton step toward the zero level set for every point with `fd > 0`.
///
/// Interior points are left untouched; a single step is enough because the
/// relaxation loop reprojects every iteration.
pub(crate) fn project_points_back<const D: usize, S: SignedDistance<D>>(
    points: &mut [Point<f64, D>],
    fd: &DistanceFn<'_, D, S>,
    deps: f64,
) {
    for p in points.iter_mut() {
        let d = fd.eval(p);
        if d > 0.0 {
            newton_step(fd, p, d, deps);
        }
    }
}

/// Drive boundary vertices onto the zero level set.
///
/// Runs full Newton iterations (both signs of `fd`) on the vertices of
/// once-referenced facets until every residual is below `tol`, capped at 10
/// rounds. Used once, as the final polish of the finished mesh.
pub(crate) fn improve_level_set<const D: usize, const C: usize, S: SignedDistance<D>>(
    points: &mut [Point<f64, D>],
    cells: &[[usize; C]],
    fd: &DistanceFn<'_, D, S>,
    deps: f64,
    tol: f64,
) {
    let boundary = boundary_vertices(cells);
    for _ in 0..10 {
        let residuals: Vec<f64> = boundary.iter().map(|&v| fd.eval(&points[v])).collect();
        let worst = residuals.iter().fold(0.0_f64, |w, d| w.max(d.abs()));
        if worst <= tol {
            break;
        }
        for (&v, &d) in boundary.iter().zip(&residuals) {
            newton_step(fd, &mut points[v], d, deps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Disk;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn unit_disk() -> Disk {
        Disk::new(Point2::new(0.0, 0.0), 1.0)
    }

    #[test]
    fn test_projection_pulls_outside_points_in() {
        let disk = unit_disk();
        let fd = DistanceFn::User(&disk);
        let deps = f64::EPSILON.sqrt() * 0.1;
        let mut points = vec![Point2::new(1.5, 0.0), Point2::new(0.5, 0.0)];
        project_points_back(&mut points, &fd, deps);
        // One Newton step lands an exterior point on the circle.
        assert_relative_eq!(points[0].coords.norm(), 1.0, epsilon = 1e-6);
        // Interior point untouched.
        assert_eq!(points[1], Point2::new(0.5, 0.0));
    }

    #[test]
    fn test_level_set_polish_converges_both_sides() {
        let disk = unit_disk();
        let fd = DistanceFn::User(&disk);
        let deps = f64::EPSILON.sqrt() * 0.1;
        // A single triangle: every facet is a boundary facet.
        let cells = vec![[0usize, 1, 2]];
        let mut points = vec![
            Point2::new(1.1, 0.0),
            Point2::new(0.0, 0.9),
            Point2::new(-1.05, 0.0),
        ];
        improve_level_set(&mut points, &cells, &fd, deps, 1000.0 * deps);
        for p in &points {
            assert_relative_eq!(p.coords.norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_level_set_polish_leaves_converged_vertices_alone() {
        let disk = unit_disk();
        let fd = DistanceFn::User(&disk);
        let deps = f64::EPSILON.sqrt() * 0.1;
        let cells = vec![[0usize, 1, 2]];
        // Residuals of 1e-4 are already inside a 1e-3 tolerance, so no
        // Newton step may be taken.
        let mut points = vec![
            Point2::new(1.0001, 0.0),
            Point2::new(0.0, 0.9999),
            Point2::new(-1.0001, 0.0),
        ];
        let before = points.clone();
        improve_level_set(&mut points, &cells, &fd, deps, 1e-3);
        assert_eq!(points, before);
    }
}
