//! Edge and facet extraction from cell connectivity.

use hashbrown::{HashMap, HashSet};

/// All unique undirected edges of a cell list.
///
/// Every pair of vertices inside a cell is an edge; edges shared between
/// cells appear once. Output is sorted so identical connectivity always
/// yields identical edge order.
pub fn unique_edges<const C: usize>(cells: &[[usize; C]]) -> Vec<[usize; 2]> {
    let mut seen: HashSet<[usize; 2]> = HashSet::new();
    for cell in cells {
        for a in 0..C {
            for b in (a + 1)..C {
                let (lo, hi) = if cell[a] < cell[b] {
                    (cell[a], cell[b])
                } else {
                    (cell[b], cell[a])
                };
                seen.insert([lo, hi]);
            }
        }
    }
    let mut edges: Vec<[usize; 2]> = seen.into_iter().collect();
    edges.sort_unstable();
    edges
}

/// Vertices lying on the mesh boundary.
///
/// A facet (cell minus one vertex) referenced by exactly one cell is a
/// boundary facet; the result is the sorted set of its vertices.
pub fn boundary_vertices<const C: usize>(cells: &[[usize; C]]) -> Vec<usize> {
    let mut counts: HashMap<Vec<usize>, u32> = HashMap::new();
    for cell in cells {
        for omit in 0..C {
            let mut facet: Vec<usize> = (0..C).filter(|&k| k != omit).map(|k| cell[k]).collect();
            facet.sort_unstable();
            *counts.entry(facet).or_insert(0) += 1;
        }
    }

    let mut verts: HashSet<usize> = HashSet::new();
    for (facet, n) in &counts {
        if *n == 1 {
            verts.extend(facet.iter().copied());
        }
    }
    let mut out: Vec<usize> = verts.into_iter().collect();
    out.sort_unstable();
    out
}
