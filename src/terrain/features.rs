//! Point features layered on relief: volcanism, impact craters, ice.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::tile::{resolve, ClimateQuantity, ClimateView, SurfaceType, Tile};
use crate::world::PlanetConfig;

/// Seed offsets, relative to the generation seed.
pub const HOTSPOT_SEED_OFFSET: u64 = 0x5eed_0003;
pub const IMPACT_SEED_OFFSET: u64 = 0x5eed_0004;

/// Convergent stress above which boundary volcanism starts.
const ARC_STRESS: f32 = 0.35;
const VOLCANIC_UPLIFT_M: f32 = 900.0;
pub const SEA_ICE_BELOW_C: f32 = -2.0;
pub const GLACIER_BELOW_C: f32 = 0.0;

/// Tiles within `rings` neighbor steps of `center`, with their ring index.
fn rings_around(tiles: &[Tile], center: usize, rings: usize) -> Vec<(usize, usize)> {
    let mut seen = vec![false; tiles.len()];
    let mut out = Vec::new();
    let mut queue = VecDeque::from([(center, 0usize)]);
    seen[center] = true;
    while let Some((i, ring)) = queue.pop_front() {
        out.push((i, ring));
        if ring == rings {
            continue;
        }
        for &j in tiles[i].neighbors() {
            if !seen[j] {
                seen[j] = true;
                queue.push_back((j, ring + 1));
            }
        }
    }
    out
}

/// Sets `volcanism` from convergent stress plus `hotspots` seeded plumes,
/// and lifts volcanic tiles. Returns the hotspot centers.
pub fn apply_volcanism(tiles: &mut [Tile], hotspots: usize, seed: u64) -> Vec<usize> {
    for t in tiles.iter_mut() {
        t.volcanism = ((t.stress - ARC_STRESS) / (1.0 - ARC_STRESS)).clamp(0.0, 1.0);
    }

    let mut centers = Vec::new();
    if !tiles.is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for _ in 0..hotspots {
            let center = rng.random_range(0..tiles.len());
            let strength: f32 = rng.random_range(0.7..1.0);
            for (i, ring) in rings_around(tiles, center, 1) {
                let v = strength / (1.0 + ring as f32);
                tiles[i].volcanism = tiles[i].volcanism.max(v);
            }
            centers.push(center);
        }
    }

    for t in tiles.iter_mut() {
        t.elevation_m += t.volcanism * t.volcanism * VOLCANIC_UPLIFT_M;
    }
    centers
}

/// Carves `count` seeded craters. Depth falls off linearly with ring
/// distance. Returns the crater centers.
pub fn apply_impacts(tiles: &mut [Tile], count: usize, seed: u64) -> Vec<usize> {
    if tiles.is_empty() {
        return Vec::new();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut centers = Vec::with_capacity(count);
    for _ in 0..count {
        let center = rng.random_range(0..tiles.len());
        let depth: f32 = rng.random_range(300.0..1500.0);
        let radius = rng.random_range(0..=2usize);
        for (i, ring) in rings_around(tiles, center, radius) {
            let d = depth * (1.0 - ring as f32 / (radius as f32 + 1.0));
            let t = &mut tiles[i];
            t.elevation_m -= d;
            t.impact_depth_m = Some(t.impact_depth_m.map_or(d, |prev| prev.max(d)));
        }
        centers.push(center);
    }
    centers
}

/// Freezes cold oceans into sea ice and cold land into glaciers, reading
/// local seasonal temperatures through the fallback chain. Returns the
/// number of tiles that iced over.
pub fn apply_ice(tiles: &mut [Tile], planet: &PlanetConfig) -> usize {
    let mut frozen = 0;
    for t in tiles.iter_mut() {
        let iced = if t.surface.is_ocean() {
            let cold = resolve(t, ClimateQuantity::Temperature, ClimateView::Cold, planet).value;
            (cold <= SEA_ICE_BELOW_C).then_some(SurfaceType::SeaIce)
        } else if t.surface.is_land() {
            let warm = resolve(t, ClimateQuantity::Temperature, ClimateView::Warm, planet).value;
            (warm <= GLACIER_BELOW_C).then_some(SurfaceType::Glacier)
        } else {
            None
        };
        t.ice = iced.is_some() || t.surface == SurfaceType::SeaIce || t.surface == SurfaceType::Glacier;
        if let Some(kind) = iced {
            t.surface = kind;
            frozen += 1;
        }
    }
    frozen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring_world(n: usize) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = (0..n).map(|i| Tile::new(i, 0.0, i as f32 * 3.0)).collect();
        for i in 0..n {
            tiles[i].set_neighbors(vec![(i + n - 1) % n, (i + 1) % n]);
        }
        tiles
    }

    #[test]
    fn stress_drives_arc_volcanism() {
        let mut tiles = ring_world(4);
        tiles[1].stress = 1.0;
        tiles[2].stress = -1.0;
        apply_volcanism(&mut tiles, 0, 9);
        assert_eq!(tiles[1].volcanism, 1.0);
        assert_eq!(tiles[2].volcanism, 0.0);
        assert!(tiles[1].elevation_m > 0.0);
    }

    #[test]
    fn hotspots_are_seeded() {
        let mut a = ring_world(30);
        let mut b = ring_world(30);
        assert_eq!(apply_volcanism(&mut a, 3, 5), apply_volcanism(&mut b, 3, 5));
        assert_eq!(a, b);
        assert!(a.iter().any(|t| t.volcanism >= 0.7));
    }

    #[test]
    fn impacts_lower_ground_and_record_depth() {
        let mut tiles = ring_world(20);
        let centers = apply_impacts(&mut tiles, 2, 77);
        assert_eq!(centers.len(), 2);
        for c in centers {
            assert!(tiles[c].impact_depth_m.is_some());
            assert!(tiles[c].elevation_m < 0.0);
        }
        for t in &tiles {
            assert_eq!(t.impact_depth_m.is_some(), t.elevation_m < 0.0);
        }
    }

    #[test]
    fn cold_tiles_ice_over() {
        let planet = PlanetConfig::earth_like();
        let mut tiles = ring_world(3);
        tiles[0].surface = SurfaceType::Ocean;
        tiles[0].local_cold.temperature_c = Some(-10.0);
        tiles[1].surface = SurfaceType::Plains;
        tiles[1].local_warm.temperature_c = Some(-4.0);
        tiles[2].surface = SurfaceType::Plains;
        tiles[2].local_warm.temperature_c = Some(18.0);
        assert_eq!(apply_ice(&mut tiles, &planet), 2);
        assert_eq!(tiles[0].surface, SurfaceType::SeaIce);
        assert_eq!(tiles[1].surface, SurfaceType::Glacier);
        assert_eq!(tiles[2].surface, SurfaceType::Plains);
        assert!(tiles[0].ice && tiles[1].ice && !tiles[2].ice);
    }
}
