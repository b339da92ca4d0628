//! Circumsphere and dihedral-angle computations for tetrahedra.
//!
//! The circumcenter is found by solving the perpendicular-bisector system
//! `2 (p_i - p_0) · x = |p_i|^2 - |p_0|^2` for `i = 1..3`; a singular system
//! means the four vertices are (near-)coplanar and the circumsphere is
//! unbounded.

use nalgebra::{Matrix3, Point3, RowVector3, Vector3};

/// The six edges of a tetrahedron, each with its opposite vertex pair.
const TET_EDGES: [([usize; 2], [usize; 2]); 6] = [
    ([0, 1], [2, 3]),
    ([0, 2], [1, 3]),
    ([0, 3], [1, 2]),
    ([1, 2], [0, 3]),
    ([1, 3], [0, 2]),
    ([2, 3], [0, 1]),
];

/// Circumcenter of a tetrahedron, or `None` for a degenerate (coplanar) one.
pub fn circumcenter(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Option<Point3<f64>> {
    let rows: [RowVector3<f64>; 3] = [
        ((b - a) * 2.0).transpose(),
        ((c - a) * 2.0).transpose(),
        ((d - a) * 2.0).transpose(),
    ];
    let m = Matrix3::from_rows(&rows);
    let rhs = Vector3::new(
        b.coords.norm_squared() - a.coords.norm_squared(),
        c.coords.norm_squared() - a.coords.norm_squared(),
        d.coords.norm_squared() - a.coords.norm_squared(),
    );
    let x = m.lu().solve(&rhs)?;
    if x.iter().all(|v| v.is_finite()) {
        Some(Point3::from(x))
    } else {
        None
    }
}

/// Circumradius of a tetrahedron, or `None` for a degenerate one.
pub fn circumradius(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Option<f64> {
    circumcenter(a, b, c, d).map(|cc| (a - cc).norm())
}

/// Gradient of the circumradius with respect to the first vertex.
///
/// Forward finite differences with a step scaled to the longest edge.
/// Non-finite components (unbounded circumsphere) are replaced by `1.0`, so
/// a fully degenerate cell yields a usable diagonal direction; callers
/// normalize before applying.
pub fn circumsphere_grad(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> Vector3<f64> {
    let verts = [a, b, c, d];
    let mut longest: f64 = 0.0;
    for i in 0..4 {
        for j in (i + 1)..4 {
            longest = longest.max((verts[i] - verts[j]).norm());
        }
    }
    let h = f64::EPSILON.sqrt() * longest.max(1.0);

    let r0 = circumradius(a, b, c, d).unwrap_or(f64::INFINITY);
    let mut grad = Vector3::zeros();
    for i in 0..3 {
        let mut ap = *a;
        ap[i] += h;
        let r1 = circumradius(&ap, b, c, d).unwrap_or(f64::INFINITY);
        grad[i] = (r1 - r0) / h;
    }
    for i in 0..3 {
        if !grad[i].is_finite() {
            grad[i] = 1.0;
        }
    }
    grad
}

/// All six dihedral angles (radians) of every tetrahedron.
///
/// For the edge `(a, b)` with opposite vertices `(c, d)` the angle between
/// the faces `abc` and `abd` is measured from their edge-aligned normals.
/// Collapsed faces report an angle of zero, which the sliver pass treats as
/// out of bounds.
pub fn dihedral_angles(points: &[Point3<f64>], tets: &[[usize; 4]]) -> Vec<[f64; 6]> {
    tets.iter()
        .map(|tet| {
            let mut angles = [0.0; 6];
            for (k, ([ia, ib], [ic, id])) in TET_EDGES.iter().enumerate() {
                let a = &points[tet[*ia]];
                let e = points[tet[*ib]] - a;
                let n1 = e.cross(&(points[tet[*ic]] - a));
                let n2 = e.cross(&(points[tet[*id]] - a));
                let denom = n1.norm() * n2.norm();
                let cos = if denom > 0.0 {
                    (n1.dot(&n2) / denom).clamp(-1.0, 1.0)
                } else {
                    1.0
                };
                angles[k] = cos.acos();
            }
            angles
        })
        .collect()
}
