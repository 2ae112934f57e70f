//! Coastline distance on the tile graph.

use std::collections::VecDeque;

use crate::geometry::angular_distance;
use crate::tile::Tile;

/// Distance (km) from every tile to the nearest water tile.
///
/// Water tiles are 0. Returns `None` everywhere when the planet has no water.
/// Distances accumulate great-circle edge lengths along a breadth-first tree,
/// which slightly overestimates true geodesic distance.
pub fn compute_coast_distance_km(tiles: &[Tile], radius_km: f32) -> Vec<Option<f32>> {
    let n = tiles.len();
    let mut dist: Vec<Option<f32>> = vec![None; n];
    let mut q: VecDeque<usize> = VecDeque::new();

    for (i, t) in tiles.iter().enumerate() {
        if t.surface.is_water() {
            dist[i] = Some(0.0);
            q.push_back(i);
        }
    }

    let positions: Vec<_> = tiles.iter().map(Tile::position).collect();

    while let Some(i) = q.pop_front() {
        let Some(d) = dist[i] else { continue };
        for &j in tiles[i].neighbors() {
            if dist[j].is_some() {
                continue;
            }
            let edge_km = angular_distance(positions[i], positions[j]) * radius_km;
            dist[j] = Some(d + edge_km);
            q.push_back(j);
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::SurfaceType;

    fn line(n: usize) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = (0..n).map(|i| Tile::new(i, 0.0, i as f32)).collect();
        for i in 0..n {
            let mut nb = Vec::new();
            if i > 0 {
                nb.push(i - 1);
            }
            if i + 1 < n {
                nb.push(i + 1);
            }
            tiles[i].set_neighbors(nb);
            tiles[i].surface = SurfaceType::Plains;
        }
        tiles
    }

    #[test]
    fn distance_grows_away_from_water() {
        let mut tiles = line(5);
        tiles[0].surface = SurfaceType::Ocean;
        let d = compute_coast_distance_km(&tiles, 6371.0);
        assert_eq!(d[0], Some(0.0));
        let one_deg = 6371.0 * 1f32.to_radians();
        assert!((d[1].unwrap() - one_deg).abs() < 0.5);
        assert!(d[4].unwrap() > d[3].unwrap());
    }

    #[test]
    fn no_water_means_no_distance() {
        let tiles = line(4);
        assert!(compute_coast_distance_km(&tiles, 6371.0).iter().all(Option::is_none));
    }
}
