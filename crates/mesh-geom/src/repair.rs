//! Mesh repair operations: welding, degenerate removal, compaction.

use hashbrown::{HashMap, HashSet};
use nalgebra::Point;
use tracing::{debug, info, warn};

use crate::bbox::Bbox;
use crate::measures::cell_volume;

/// Report produced by [`linter`].
#[derive(Debug, Clone)]
pub struct LintReport {
    /// Cells reoriented to positive volume.
    pub cells_flipped: usize,
    /// Zero-volume cells dropped.
    pub cells_dropped: usize,
    /// Vertex count after cleanup.
    pub vertex_count: usize,
    /// Cell count after cleanup.
    pub cell_count: usize,
    /// Smallest cell volume after cleanup.
    pub min_volume: f64,
    /// Mean cell volume after cleanup.
    pub mean_volume: f64,
}

fn hash_key<const D: usize>(p: &Point<f64, D>, inv_cell: f64) -> [i64; D] {
    let mut key = [0i64; D];
    for i in 0..D {
        key[i] = (p[i] * inv_cell).floor() as i64;
    }
    key
}

/// Map every vertex to the smallest-index vertex within `eps` of it.
///
/// Spatial hash with cell size `2 * eps`; coincident seam vertices always
/// share a hash cell, which is the case aggregation cares about.
fn weld_map<const D: usize>(points: &[Point<f64, D>], eps: f64) -> Vec<usize> {
    let mut remap: Vec<usize> = (0..points.len()).collect();
    if points.is_empty() || eps <= 0.0 {
        return remap;
    }

    let inv_cell = 1.0 / (eps * 2.0);
    let mut buckets: HashMap<[i64; D], Vec<usize>> = HashMap::new();
    for (idx, p) in points.iter().enumerate() {
        buckets.entry(hash_key(p, inv_cell)).or_default().push(idx);
    }

    for bucket in buckets.values() {
        // Buckets hold ascending indices; earlier members win.
        for (k, &idx) in bucket.iter().enumerate() {
            for &other in &bucket[..k] {
                if (points[idx] - points[other]).norm() <= eps {
                    remap[idx] = remap[other];
                    break;
                }
            }
        }
    }
    remap
}

/// Drop unused vertices and renumber cells.
///
/// Kept vertices preserve their relative order. Returns the original index
/// of each kept vertex.
fn compact<const D: usize, const C: usize>(
    points: Vec<Point<f64, D>>,
    cells: &mut [[usize; C]],
    keep_extra: impl Fn(usize) -> bool,
) -> (Vec<Point<f64, D>>, Vec<usize>) {
    let mut used = vec![false; points.len()];
    for cell in cells.iter() {
        for &v in cell {
            used[v] = true;
        }
    }

    let mut old_to_new = vec![usize::MAX; points.len()];
    let mut kept_points = Vec::new();
    let mut kept_idx = Vec::new();
    for (old, p) in points.into_iter().enumerate() {
        if used[old] || keep_extra(old) {
            old_to_new[old] = kept_points.len();
            kept_points.push(p);
            kept_idx.push(old);
        }
    }
    for cell in cells.iter_mut() {
        for v in cell.iter_mut() {
            *v = old_to_new[*v];
        }
    }
    (kept_points, kept_idx)
}

/// Weld near-duplicate vertices, drop collapsed and duplicate cells, sweep
/// unused vertices, renumber.
///
/// This is the light cleanup run at termination when full linting was not
/// requested, and the seam-dedup step of parallel aggregation.
pub fn fix_mesh<const D: usize, const C: usize>(
    points: Vec<Point<f64, D>>,
    cells: Vec<[usize; C]>,
    weld_eps: f64,
) -> (Vec<Point<f64, D>>, Vec<[usize; C]>) {
    let before_vertices = points.len();
    let before_cells = cells.len();

    let remap = weld_map(&points, weld_eps);

    let mut seen: HashSet<[usize; C]> = HashSet::new();
    let mut out_cells: Vec<[usize; C]> = Vec::with_capacity(cells.len());
    'cells: for cell in &cells {
        let mut mapped = [0usize; C];
        for (slot, &v) in mapped.iter_mut().zip(cell.iter()) {
            *slot = remap[v];
        }
        // Collapsed cell: a repeated vertex after welding.
        for a in 0..C {
            for b in (a + 1)..C {
                if mapped[a] == mapped[b] {
                    continue 'cells;
                }
            }
        }
        let mut key = mapped;
        key.sort_unstable();
        if seen.insert(key) {
            out_cells.push(mapped);
        }
    }

    let (out_points, _) = compact(points, &mut out_cells, |_| false);

    if out_points.len() != before_vertices || out_cells.len() != before_cells {
        debug!(
            "fix_mesh: {} -> {} vertices, {} -> {} cells",
            before_vertices,
            out_points.len(),
            before_cells,
            out_cells.len()
        );
    }
    (out_points, out_cells)
}

/// Drop cells lying entirely outside `owned`, then drop vertices that are
/// outside `owned` and unused.
///
/// Vertices keep their relative order, so ghost vertices inserted last stay
/// at the tail. Returns the surviving cells' mesh plus the original index of
/// every kept vertex.
pub fn remove_external_entities<const D: usize, const C: usize>(
    points: Vec<Point<f64, D>>,
    cells: Vec<[usize; C]>,
    owned: &Bbox<D>,
) -> (Vec<Point<f64, D>>, Vec<[usize; C]>, Vec<usize>) {
    let inside: Vec<bool> = points.iter().map(|p| owned.contains(p)).collect();

    let mut kept_cells: Vec<[usize; C]> = cells
        .into_iter()
        .filter(|cell| cell.iter().any(|&v| inside[v]))
        .collect();

    let (kept_points, kept_idx) = compact(points, &mut kept_cells, |old| inside[old]);
    (kept_points, kept_cells, kept_idx)
}

/// Full quality lint: orientation repair, degenerate-cell removal, welding,
/// and a logged summary of the resulting cell volumes.
pub fn linter<const D: usize, const C: usize>(
    points: Vec<Point<f64, D>>,
    cells: Vec<[usize; C]>,
    weld_eps: f64,
) -> (Vec<Point<f64, D>>, Vec<[usize; C]>, LintReport) {
    let (points, mut cells) = fix_mesh(points, cells, weld_eps);

    let mut flipped = 0;
    let mut dropped = 0;
    let mut kept: Vec<[usize; C]> = Vec::with_capacity(cells.len());
    for cell in cells.drain(..) {
        let vol = cell_volume(&points, &cell);
        if vol.abs() <= f64::EPSILON {
            dropped += 1;
            continue;
        }
        let mut cell = cell;
        if vol < 0.0 {
            cell.swap(C - 2, C - 1);
            flipped += 1;
        }
        kept.push(cell);
    }

    let volumes: Vec<f64> = kept.iter().map(|c| cell_volume(&points, c)).collect();
    let min_volume = volumes.iter().cloned().fold(f64::INFINITY, f64::min);
    let mean_volume = if volumes.is_empty() {
        0.0
    } else {
        volumes.iter().sum::<f64>() / volumes.len() as f64
    };

    let report = LintReport {
        cells_flipped: flipped,
        cells_dropped: dropped,
        vertex_count: points.len(),
        cell_count: kept.len(),
        min_volume,
        mean_volume,
    };

    if dropped > 0 {
        warn!("linter dropped {} zero-volume cells", dropped);
    }
    if flipped > 0 {
        debug!("linter reoriented {} cells", flipped);
    }
    info!(
        "lint: {} vertices, {} cells, min/mean volume {:.3e}/{:.3e}",
        report.vertex_count, report.cell_count, report.min_volume, report.mean_volume
    );

    (points, kept, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    fn square_points() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_fix_mesh_welds_duplicates() {
        // Vertex 4 duplicates vertex 1 exactly (a seam duplicate).
        let mut points = square_points();
        points.push(Point2::new(1.0, 0.0));
        let cells = vec![[0, 1, 3], [4, 2, 3]];

        let (points, cells) = fix_mesh(points, cells, 1e-9);
        assert_eq!(points.len(), 4);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1], [1, 2, 3]);
    }

    #[test]
    fn test_fix_mesh_drops_collapsed_and_duplicate_cells() {
        let points = square_points();
        let cells = vec![[0, 1, 2], [0, 1, 1], [2, 0, 1]];
        let (_, cells) = fix_mesh(points, cells, 0.0);
        // Collapsed cell gone; [2,0,1] is the same cell as [0,1,2].
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn test_fix_mesh_sweeps_unused_vertices() {
        let mut points = square_points();
        points.push(Point2::new(5.0, 5.0)); // referenced by nothing
        let cells = vec![[0, 1, 2]];
        let (points, cells) = fix_mesh(points, cells, 0.0);
        assert_eq!(points.len(), 3);
        assert_eq!(cells, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_remove_external_entities_keeps_spanning_cells() {
        let points = vec![
            Point2::new(0.2, 0.5),
            Point2::new(0.4, 0.5),
            Point2::new(0.6, 0.5), // outside owned, but part of a spanning cell
            Point2::new(0.9, 0.9), // outside and unused
        ];
        let cells = vec![[0, 1, 2]];
        let owned = Bbox::new([0.0, 0.0], [0.5, 1.0]).unwrap();

        let (points, cells, kept) = remove_external_entities(points, cells, &owned);
        assert_eq!(points.len(), 3);
        assert_eq!(cells, vec![[0, 1, 2]]);
        assert_eq!(kept, vec![0, 1, 2]);
    }

    #[test]
    fn test_remove_external_entities_drops_outside_cells() {
        let points = vec![
            Point2::new(0.7, 0.5),
            Point2::new(0.8, 0.5),
            Point2::new(0.9, 0.5),
            Point2::new(0.2, 0.2),
        ];
        let cells = vec![[0, 1, 2]];
        let owned = Bbox::new([0.0, 0.0], [0.5, 1.0]).unwrap();

        let (points, cells, kept) = remove_external_entities(points, cells, &owned);
        assert!(cells.is_empty());
        // Only the interior vertex survives.
        assert_eq!(points.len(), 1);
        assert_eq!(kept, vec![3]);
    }

    #[test]
    fn test_linter_fixes_orientation() {
        let points = square_points();
        let cells = vec![[0, 2, 1]]; // negative area
        let (points, cells, report) = linter(points, cells, 0.0);
        assert_eq!(report.cells_flipped, 1);
        assert!(cell_volume(&points, &cells[0]) > 0.0);
    }

    #[test]
    fn test_linter_drops_degenerate() {
        let mut points = square_points();
        points.push(Point2::new(0.5, 0.0)); // collinear with 0 and 1
        let cells = vec![[0, 1, 2], [0, 1, 4]];
        let (_, cells, report) = linter(points, cells, 0.0);
        assert_eq!(report.cells_dropped, 1);
        assert_eq!(cells.len(), 1);
    }
}
