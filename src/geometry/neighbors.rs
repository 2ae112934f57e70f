//! Tile topology: symmetric k-nearest-neighbor graph on the sphere.
//!
//! Neighbor lists are ordered by great-circle distance (ties broken by id) and
//! hold indices, which equal tile ids.

use glam::Vec3;
use rayon::prelude::*;

/// Default number of nearest neighbors each tile links to before symmetrizing.
pub const DEFAULT_NEIGHBOR_COUNT: usize = 6;

/// Builds a symmetric neighbor graph from unit-sphere positions.
///
/// Each tile first takes its `k` nearest tiles; links are then mirrored so that
/// `j ∈ nbrs(i)` implies `i ∈ nbrs(j)`.
pub fn build_neighbors(positions: &[Vec3], k: usize) -> Vec<Vec<usize>> {
    let n = positions.len();
    let k = k.min(n.saturating_sub(1));
    if k == 0 {
        return vec![Vec::new(); n];
    }

    let nearest: Vec<Vec<usize>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let p = positions[i];
            let mut best: Vec<(f32, usize)> = Vec::with_capacity(k + 1);
            for (j, &q) in positions.iter().enumerate() {
                if j == i {
                    continue;
                }
                // Larger dot product = closer on the sphere.
                let d = 1.0 - p.dot(q);
                if best.len() < k || d < best[best.len() - 1].0 {
                    let at = best
                        .iter()
                        .position(|&(bd, bj)| d < bd || (d == bd && j < bj))
                        .unwrap_or(best.len());
                    best.insert(at, (d, j));
                    best.truncate(k);
                }
            }
            best.into_iter().map(|(_, j)| j).collect()
        })
        .collect();

    let mut sym: Vec<Vec<usize>> = nearest.clone();
    for (i, list) in nearest.iter().enumerate() {
        for &j in list {
            if !sym[j].contains(&i) {
                sym[j].push(i);
            }
        }
    }

    for (i, list) in sym.iter_mut().enumerate() {
        let p = positions[i];
        list.sort_by(|&a, &b| {
            let da = 1.0 - p.dot(positions[a]);
            let db = 1.0 - p.dot(positions[b]);
            da.total_cmp(&db).then(a.cmp(&b))
        });
    }

    sym
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{lat_lon_to_unit, TileTemplate};

    fn positions(n: usize) -> Vec<Vec3> {
        TileTemplate::fibonacci(n)
            .rows()
            .iter()
            .map(|r| lat_lon_to_unit(r.latitude, r.longitude))
            .collect()
    }

    #[test]
    fn graph_is_symmetric_and_has_no_self_links() {
        let nbrs = build_neighbors(&positions(200), 6);
        for (i, list) in nbrs.iter().enumerate() {
            assert!(list.len() >= 6);
            assert!(!list.contains(&i));
            for &j in list {
                assert!(nbrs[j].contains(&i), "{i} -> {j} not mirrored");
            }
        }
    }

    #[test]
    fn lists_are_sorted_by_distance() {
        let pos = positions(120);
        let nbrs = build_neighbors(&pos, 5);
        for (i, list) in nbrs.iter().enumerate() {
            for w in list.windows(2) {
                assert!(pos[i].dot(pos[w[0]]) >= pos[i].dot(pos[w[1]]) - 1e-6);
            }
        }
    }

    #[test]
    fn tiny_inputs_do_not_panic() {
        assert!(build_neighbors(&[], 6).is_empty());
        assert_eq!(build_neighbors(&[Vec3::X], 6), vec![Vec::<usize>::new()]);
        assert_eq!(build_neighbors(&[Vec3::X, Vec3::Y], 6), vec![vec![1], vec![0]]);
    }
}
