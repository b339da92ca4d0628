//! Domain decomposition of user-supplied point sets.

use nalgebra::Point;

use mesh_geom::Bbox;

/// Partition points into `num_blocks` contiguous blocks along `axis`.
///
/// Points are ordered by their coordinate on the axis and split into
/// near-equal-count blocks, so every rank gets comparable work regardless of
/// how the cloud is distributed spatially. Returns the blocks plus each
/// block's bounding extent (empty blocks inherit the overall extent so the
/// caller can still form a halo).
pub fn blocker<const D: usize>(
    points: &[Point<f64, D>],
    num_blocks: usize,
    axis: usize,
) -> (Vec<Vec<Point<f64, D>>>, Vec<Bbox<D>>) {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a][axis]
            .partial_cmp(&points[b][axis])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let overall = Bbox::from_points(points);

    let per_block = points.len().div_ceil(num_blocks.max(1));
    let mut blocks: Vec<Vec<Point<f64, D>>> = Vec::with_capacity(num_blocks);
    let mut extents: Vec<Bbox<D>> = Vec::with_capacity(num_blocks);
    for chunk in 0..num_blocks {
        let start = (chunk * per_block).min(points.len());
        let end = ((chunk + 1) * per_block).min(points.len());
        let block: Vec<Point<f64, D>> = order[start..end].iter().map(|&i| points[i]).collect();
        let extent = Bbox::from_points(&block)
            .or(overall)
            .unwrap_or(Bbox {
                lo: [0.0; D],
                hi: [1.0; D],
            });
        blocks.push(block);
        extents.push(extent);
    }
    (blocks, extents)
}
