//! Surface classification: base surface, water, relief, swamp dry-out.
//!
//! [`has_liquid_water`] is the single definition of "this planet has liquid
//! water". It is recomputed from current surface types on every call and is
//! shared by the relief and biome stages so their dry-out decisions agree.

use std::collections::VecDeque;

use crate::tectonics::CrustType;
use crate::tile::{SurfaceType, Tile};

/// Below this depth (m) connected ocean becomes deep ocean.
pub const DEEP_OCEAN_DEPTH_M: f32 = 3000.0;
pub const HILLS_ABOVE_M: f32 = 700.0;
pub const MOUNTAINS_ABOVE_M: f32 = 2000.0;
/// Land lower than this (m above sea) next to water turns to swamp; next to
/// a lake it becomes basin swamp.
pub const SWAMP_BELOW_M: f32 = 120.0;
pub const VOLCANIC_THRESHOLD: f32 = 0.6;
pub const CRATER_DEPTH_M: f32 = 250.0;

/// True if any tile is ocean, lake or sea ice.
pub fn has_liquid_water(tiles: &[Tile]) -> bool {
    tiles.iter().any(|t| t.surface.is_water())
}

/// Converts swamps to their dry-basin equivalents. Returns the ids changed.
pub fn dry_out_swamps(tiles: &mut [Tile]) -> Vec<usize> {
    let mut changed = Vec::new();
    for t in tiles.iter_mut().filter(|t| t.surface.is_swamp()) {
        t.surface = t.surface.dried();
        changed.push(t.id());
    }
    changed
}

/// Pre-classification surface: continental crust is land, the rest ocean.
pub fn base_surface(tiles: &[Tile]) -> Vec<SurfaceType> {
    tiles
        .iter()
        .map(|t| match t.crust {
            Some(CrustType::Continental) => SurfaceType::Plains,
            _ => SurfaceType::Ocean,
        })
        .collect()
}

/// Elevation at the `fraction` quantile.
fn elevation_quantile(tiles: &[Tile], fraction: f32) -> f32 {
    let mut heights: Vec<f32> = tiles.iter().map(|t| t.elevation_m).collect();
    heights.sort_by(f32::total_cmp);
    let idx = ((fraction * heights.len() as f32) as usize).min(heights.len().saturating_sub(1));
    heights.get(idx).copied().unwrap_or(0.0)
}

/// Splits tiles into land and water for a target `water_fraction`.
///
/// `base` is indexed by tile position. Below-sea tiles reachable from a
/// below-sea base-ocean tile are ocean; isolated ones are lakes. Returns the
/// sea level, or `None` when the planet has no water at all.
pub fn classify_water(tiles: &mut [Tile], base: &[SurfaceType], water_fraction: f32) -> Option<f32> {
    let fraction = if water_fraction.is_finite() {
        water_fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };

    if fraction <= 0.0 || tiles.is_empty() {
        for t in tiles.iter_mut() {
            if t.surface.is_water() {
                t.surface = SurfaceType::Plains;
            }
            t.underwater_elevation_m = None;
        }
        return None;
    }

    let sea_level = if fraction >= 1.0 {
        tiles.iter().map(|t| t.elevation_m).fold(f32::NEG_INFINITY, f32::max) + 1.0
    } else {
        elevation_quantile(tiles, fraction)
    };

    let below: Vec<bool> = tiles.iter().map(|t| t.elevation_m < sea_level).collect();
    let mut connected = vec![false; tiles.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for (i, b) in base.iter().enumerate() {
        if below[i] && b.is_ocean() {
            connected[i] = true;
            queue.push_back(i);
        }
    }
    while let Some(i) = queue.pop_front() {
        for &j in tiles[i].neighbors() {
            if below[j] && !connected[j] {
                connected[j] = true;
                queue.push_back(j);
            }
        }
    }

    for (i, t) in tiles.iter_mut().enumerate() {
        if below[i] {
            let depth = sea_level - t.elevation_m;
            t.surface = if !connected[i] {
                SurfaceType::Lake
            } else if depth > DEEP_OCEAN_DEPTH_M {
                SurfaceType::DeepOcean
            } else {
                SurfaceType::Ocean
            };
            t.underwater_elevation_m = Some(-depth);
        } else {
            if t.surface.is_water() {
                t.surface = SurfaceType::Plains;
            }
            t.underwater_elevation_m = None;
        }
    }
    Some(sea_level)
}

/// Land relief for one tile from its height and neighborhood.
fn land_kind(tiles: &[Tile], i: usize, sea_level: f32, wet: bool) -> SurfaceType {
    let t = &tiles[i];
    if t.volcanism >= VOLCANIC_THRESHOLD {
        return SurfaceType::Volcanic;
    }
    if t.impact_depth_m.is_some_and(|d| d >= CRATER_DEPTH_M) {
        return SurfaceType::Crater;
    }

    let h = t.height_above(sea_level);
    let touches_water = t.neighbors().iter().any(|&j| tiles[j].surface.is_water());
    let is_minimum = !t.neighbors().is_empty()
        && t.neighbors().iter().all(|&j| tiles[j].elevation_m > t.elevation_m);

    if wet && touches_water && h < SWAMP_BELOW_M {
        let inland = t.neighbors().iter().any(|&j| tiles[j].surface == SurfaceType::Lake);
        return if inland {
            SurfaceType::BasinSwamp
        } else {
            SurfaceType::Swamp
        };
    }
    if is_minimum && !touches_water && h < HILLS_ABOVE_M {
        return SurfaceType::Basin;
    }
    if h > MOUNTAINS_ABOVE_M {
        SurfaceType::Mountains
    } else if h > HILLS_ABOVE_M {
        SurfaceType::Hills
    } else {
        SurfaceType::Plains
    }
}

/// Assigns land relief kinds, then dries swamps if the planet has no liquid
/// water. Existing swamps are wetlands already identified upstream (or by an
/// editor) and keep their kind. Returns the ids dried out.
pub fn classify_relief(tiles: &mut [Tile], sea_level: f32) -> Vec<usize> {
    let wet = has_liquid_water(tiles);
    let kinds: Vec<Option<SurfaceType>> = (0..tiles.len())
        .map(|i| {
            let s = tiles[i].surface;
            if s.is_water() || s.is_swamp() || s == SurfaceType::Glacier {
                None
            } else {
                Some(land_kind(tiles, i, sea_level, wet))
            }
        })
        .collect();

    for (t, kind) in tiles.iter_mut().zip(kinds) {
        if let Some(kind) = kind {
            t.surface = kind;
        }
    }

    if wet {
        Vec::new()
    } else {
        dry_out_swamps(tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A chain of tiles, each linked to its immediate predecessor/successor.
    fn chain(heights: &[f32]) -> Vec<Tile> {
        let n = heights.len();
        let mut tiles: Vec<Tile> = heights
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                let mut t = Tile::new(i, 0.0, i as f32);
                t.elevation_m = h;
                t
            })
            .collect();
        for i in 0..n {
            let mut nb = Vec::new();
            if i > 0 {
                nb.push(i - 1);
            }
            if i + 1 < n {
                nb.push(i + 1);
            }
            tiles[i].set_neighbors(nb);
        }
        tiles
    }

    #[test]
    fn liquid_water_is_recomputed_from_surface() {
        let mut tiles = chain(&[0.0, 0.0]);
        tiles[0].surface = SurfaceType::Plains;
        tiles[1].surface = SurfaceType::Lake;
        assert!(has_liquid_water(&tiles));
        tiles[1].surface = SurfaceType::Hills;
        assert!(!has_liquid_water(&tiles));
    }

    #[test]
    fn dry_out_maps_each_swamp_kind() {
        let mut tiles = chain(&[0.0, 0.0, 0.0]);
        tiles[0].surface = SurfaceType::Swamp;
        tiles[1].surface = SurfaceType::BasinSwamp;
        tiles[2].surface = SurfaceType::Plains;
        assert_eq!(dry_out_swamps(&mut tiles), vec![0, 1]);
        assert_eq!(tiles[0].surface, SurfaceType::DryBasin);
        assert_eq!(tiles[1].surface, SurfaceType::DeepDryBasin);
        assert_eq!(tiles[2].surface, SurfaceType::Plains);
    }

    #[test]
    fn sea_connectivity_separates_ocean_from_lakes() {
        // 0..2 low and connected to base ocean, 3 high ridge, 4 low pocket.
        let mut tiles = chain(&[-5000.0, -1000.0, -900.0, 2000.0, -800.0]);
        let base = vec![
            SurfaceType::Ocean,
            SurfaceType::Ocean,
            SurfaceType::Plains,
            SurfaceType::Plains,
            SurfaceType::Plains,
        ];
        let sea = classify_water(&mut tiles, &base, 0.8).unwrap();
        assert_eq!(sea, 2000.0);
        assert_eq!(tiles[0].surface, SurfaceType::DeepOcean);
        assert_eq!(tiles[1].surface, SurfaceType::Ocean);
        assert_eq!(tiles[2].surface, SurfaceType::Ocean);
        assert_eq!(tiles[3].surface, SurfaceType::Plains);
        assert_eq!(tiles[4].surface, SurfaceType::Lake);
        assert_eq!(tiles[4].underwater_elevation_m, Some(-2800.0));
        assert_eq!(tiles[3].underwater_elevation_m, None);
    }

    #[test]
    fn zero_water_fraction_leaves_no_water() {
        let mut tiles = chain(&[-100.0, 50.0]);
        let base = vec![SurfaceType::Ocean, SurfaceType::Plains];
        assert_eq!(classify_water(&mut tiles, &base, 0.0), None);
        assert!(!has_liquid_water(&tiles));
    }

    #[test]
    fn relief_follows_height() {
        let mut tiles = chain(&[-500.0, 400.0, 1200.0, 3000.0, 2500.0]);
        tiles[0].surface = SurfaceType::Ocean;
        for t in &mut tiles[1..] {
            t.surface = SurfaceType::Plains;
        }
        classify_relief(&mut tiles, 0.0);
        assert_eq!(tiles[0].surface, SurfaceType::Ocean);
        assert_eq!(tiles[2].surface, SurfaceType::Hills);
        assert_eq!(tiles[3].surface, SurfaceType::Mountains);
    }

    #[test]
    fn low_coast_becomes_swamp() {
        let mut tiles = chain(&[-100.0, 50.0, 500.0]);
        tiles[0].surface = SurfaceType::Ocean;
        tiles[1].surface = SurfaceType::Plains;
        tiles[2].surface = SurfaceType::Plains;
        classify_relief(&mut tiles, 0.0);
        assert_eq!(tiles[1].surface, SurfaceType::Swamp);
    }

    #[test]
    fn lakeshore_becomes_basin_swamp() {
        let mut tiles = chain(&[-100.0, 50.0, 500.0]);
        tiles[0].surface = SurfaceType::Lake;
        tiles[1].surface = SurfaceType::Plains;
        tiles[2].surface = SurfaceType::Plains;
        classify_relief(&mut tiles, 0.0);
        assert_eq!(tiles[1].surface, SurfaceType::BasinSwamp);
    }

    #[test]
    fn isolated_minimum_is_basin() {
        let mut tiles = chain(&[800.0, 100.0, 900.0]);
        for t in &mut tiles {
            t.surface = SurfaceType::Plains;
        }
        classify_relief(&mut tiles, 0.0);
        assert_eq!(tiles[1].surface, SurfaceType::Basin);
    }

    #[test]
    fn relief_dries_swamps_without_water() {
        let mut tiles = chain(&[10.0, 20.0, 900.0]);
        tiles[0].surface = SurfaceType::Swamp;
        tiles[1].surface = SurfaceType::BasinSwamp;
        tiles[2].surface = SurfaceType::Plains;
        assert_eq!(classify_relief(&mut tiles, 0.0), vec![0, 1]);
        assert_eq!(tiles[0].surface, SurfaceType::DryBasin);
        assert_eq!(tiles[1].surface, SurfaceType::DeepDryBasin);
    }

    #[test]
    fn volcanism_and_craters_override_height() {
        let mut tiles = chain(&[100.0, 200.0, 300.0]);
        for t in &mut tiles {
            t.surface = SurfaceType::Plains;
        }
        tiles[0].volcanism = 0.9;
        tiles[2].impact_depth_m = Some(600.0);
        classify_relief(&mut tiles, -1000.0);
        assert_eq!(tiles[0].surface, SurfaceType::Volcanic);
        assert_eq!(tiles[2].surface, SurfaceType::Crater);
    }
}
