//! Test-support triangulation backends.

// Each test binary uses a different subset of the helpers.
#![allow(dead_code)]

use hashbrown::HashMap;
use nalgebra::{Point2, Point3};

use mesh_gen::Oracle;

/// Plain Bowyer-Watson incremental Delaunay triangulation in the plane.
///
/// Slow but dependency-free; good enough to drive the relaxation loop in
/// tests. A super-triangle far outside any test domain stands in for the
/// infinite cell, and its triangles are filtered from `finite_cells`.
pub struct BowyerWatson {
    /// Super-triangle vertices first, user vertices after, insertion order.
    all: Vec<Point2<f64>>,
    tris: Vec<[usize; 3]>,
}

const SUPER: usize = 3;

fn signed_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn ccw(all: &[Point2<f64>], mut tri: [usize; 3]) -> [usize; 3] {
    if signed_area(&all[tri[0]], &all[tri[1]], &all[tri[2]]) < 0.0 {
        tri.swap(1, 2);
    }
    tri
}

/// Strict in-circumcircle predicate for a CCW triangle.
fn in_circle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, p: &Point2<f64>) -> bool {
    let (ax, ay) = (a.x - p.x, a.y - p.y);
    let (bx, by) = (b.x - p.x, b.y - p.y);
    let (cx, cy) = (c.x - p.x, c.y - p.y);
    let det = (ax * ax + ay * ay) * (bx * cy - by * cx)
        - (bx * bx + by * by) * (ax * cy - ay * cx)
        + (cx * cx + cy * cy) * (ax * by - ay * bx);
    det > 0.0
}

impl BowyerWatson {
    pub fn new() -> Self {
        let all = vec![
            Point2::new(-1e6, -1e6),
            Point2::new(1e6, -1e6),
            Point2::new(0.0, 1e6),
        ];
        Self {
            all,
            tris: vec![[0, 1, 2]],
        }
    }

    fn insert_one(&mut self, p: Point2<f64>) {
        let n = self.all.len();
        self.all.push(p);

        let mut bad = Vec::new();
        for (i, tri) in self.tris.iter().enumerate() {
            if in_circle(
                &self.all[tri[0]],
                &self.all[tri[1]],
                &self.all[tri[2]],
                &p,
            ) {
                bad.push(i);
            }
        }

        let mut edge_counts: HashMap<[usize; 2], u32> = HashMap::new();
        for &i in &bad {
            let tri = self.tris[i];
            for k in 0..3 {
                let (u, v) = (tri[k], tri[(k + 1) % 3]);
                let key = if u < v { [u, v] } else { [v, u] };
                *edge_counts.entry(key).or_insert(0) += 1;
            }
        }

        for &i in bad.iter().rev() {
            self.tris.swap_remove(i);
        }
        // Hash-map iteration order would leak into the triangle list and
        // make runs with the same seed differ; fan out the hole edges in
        // sorted order instead.
        let mut hole: Vec<[usize; 2]> = edge_counts
            .into_iter()
            .filter_map(|(edge, count)| (count == 1).then_some(edge))
            .collect();
        hole.sort_unstable();
        for edge in hole {
            self.tris.push(ccw(&self.all, [edge[0], edge[1], n]));
        }
    }

    fn rebuild(&mut self) {
        let user: Vec<Point2<f64>> = self.all.split_off(SUPER);
        self.all.truncate(SUPER);
        self.tris = vec![[0, 1, 2]];
        for p in user {
            self.insert_one(p);
        }
    }
}

impl Default for BowyerWatson {
    fn default() -> Self {
        Self::new()
    }
}

impl Oracle<2, 3> for BowyerWatson {
    fn insert(&mut self, points: &[Point2<f64>]) {
        for &p in points {
            self.insert_one(p);
        }
    }

    fn relocate(&mut self, indices: &[usize], positions: &[Point2<f64>]) {
        for (&i, &p) in indices.iter().zip(positions) {
            self.all[SUPER + i] = p;
        }
        self.rebuild();
    }

    fn finite_vertices(&self) -> Vec<Point2<f64>> {
        self.all[SUPER..].to_vec()
    }

    fn finite_cells(&self) -> Vec<[usize; 3]> {
        self.tris
            .iter()
            .filter(|tri| tri.iter().all(|&v| v >= SUPER))
            .map(|tri| [tri[0] - SUPER, tri[1] - SUPER, tri[2] - SUPER])
            .collect()
    }
}

/// Scripted 3D oracle: connectivity is fixed, only positions change.
///
/// Stands in for an incremental tetrahedralization in sliver-pass tests,
/// where the interesting behavior is which vertices get relocated, not how
/// the triangulation reacts.
pub struct FixedTets {
    points: Vec<Point3<f64>>,
    cells: Vec<[usize; 4]>,
}

impl FixedTets {
    pub fn new(cells: Vec<[usize; 4]>) -> Self {
        Self {
            points: Vec::new(),
            cells,
        }
    }
}

impl Oracle<3, 4> for FixedTets {
    fn insert(&mut self, points: &[Point3<f64>]) {
        self.points.extend_from_slice(points);
    }

    fn relocate(&mut self, indices: &[usize], positions: &[Point3<f64>]) {
        for (&i, &p) in indices.iter().zip(positions) {
            self.points[i] = p;
        }
    }

    fn finite_vertices(&self) -> Vec<Point3<f64>> {
        self.points.clone()
    }

    fn finite_cells(&self) -> Vec<[usize; 4]> {
        self.cells.clone()
    }
}
