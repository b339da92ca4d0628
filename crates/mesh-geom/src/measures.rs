//! Signed measures of simplices.

use nalgebra::{Point, SMatrix, SVector};

fn factorial(n: usize) -> f64 {
    (1..=n).product::<usize>() as f64
}

/// Determinant by Gaussian elimination with partial pivoting.
///
/// Works for any `D` without the typenum bounds nalgebra's own
/// `determinant` puts on const-generic matrices.
fn determinant<const D: usize>(mut m: SMatrix<f64, D, D>) -> f64 {
    let mut det = 1.0;
    for k in 0..D {
        let mut pivot = k;
        for r in (k + 1)..D {
            if m[(r, k)].abs() > m[(pivot, k)].abs() {
                pivot = r;
            }
        }
        if m[(pivot, k)] == 0.0 {
            return 0.0;
        }
        if pivot != k {
            m.swap_rows(k, pivot);
            det = -det;
        }
        det *= m[(k, k)];
        for r in (k + 1)..D {
            let factor = m[(r, k)] / m[(k, k)];
            for c in k..D {
                m[(r, c)] -= factor * m[(k, c)];
            }
        }
    }
    det
}

/// Signed volume of one cell (signed area in 2D).
///
/// Positive when the vertex order is positively oriented.
pub fn cell_volume<const D: usize, const C: usize>(
    points: &[Point<f64, D>],
    cell: &[usize; C],
) -> f64 {
    let p0 = &points[cell[0]];
    let m = SMatrix::<f64, D, D>::from_fn(|r, c| points[cell[c + 1]][r] - p0[r]);
    determinant(m) / factorial(D)
}

/// Centroid of one cell.
pub fn cell_centroid<const D: usize, const C: usize>(
    points: &[Point<f64, D>],
    cell: &[usize; C],
) -> Point<f64, D> {
    let mut acc = SVector::<f64, D>::zeros();
    for &i in cell {
        acc += points[i].coords;
    }
    Point::from(acc / C as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Point3};

    #[test]
    fn test_triangle_area() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert_relative_eq!(cell_volume(&points, &[0, 1, 2]), 0.5);
        // Reversed orientation flips the sign.
        assert_relative_eq!(cell_volume(&points, &[0, 2, 1]), -0.5);
    }

    #[test]
    fn test_tetrahedron_volume() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        assert_relative_eq!(cell_volume(&points, &[0, 1, 2, 3]), 1.0 / 6.0);
    }

    #[test]
    fn test_volume_needs_row_pivoting() {
        // The first edge has a zero x-component, so elimination must swap
        // rows before it can proceed.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        assert_relative_eq!(cell_volume(&points, &[0, 1, 2, 3]), -1.0 / 6.0);
    }

    #[test]
    fn test_degenerate_cell_has_zero_volume() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        assert_eq!(cell_volume(&points, &[0, 1, 2, 3]), 0.0);
    }

    #[test]
    fn test_centroid() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(0.0, 3.0),
        ];
        let c = cell_centroid(&points, &[0, 1, 2]);
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 1.0);
    }
}
