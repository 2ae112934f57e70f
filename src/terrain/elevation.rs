//! Elevation synthesis from crust, boundary stress and fractal detail.

use rayon::prelude::*;

use crate::noise::FractalNoise;
use crate::tectonics::CrustType;
use crate::tile::Tile;

/// Uplift per unit of convergent stress (m).
const UPLIFT_PER_STRESS_M: f32 = 2600.0;
/// Subsidence per unit of divergent stress (m).
const RIFT_PER_STRESS_M: f32 = 1100.0;
const MAX_UPLIFT_M: f32 = 7000.0;
const DETAIL_AMPLITUDE_M: f32 = 700.0;
const BROAD_AMPLITUDE_M: f32 = 900.0;

/// Elevation (m) for a single tile.
///
/// Continental collisions lift harder than oceanic ones; rifts sink.
pub fn tile_elevation_m(tile: &Tile, detail: &FractalNoise, broad: &FractalNoise) -> f32 {
    let crust = tile.crust.unwrap_or(CrustType::Oceanic);
    let base = crust.base_elevation_m();

    let tectonic = if tile.stress >= 0.0 {
        let factor = match crust {
            CrustType::Continental => 1.0,
            CrustType::Oceanic => 0.55,
        };
        (tile.stress * UPLIFT_PER_STRESS_M * factor).min(MAX_UPLIFT_M)
    } else {
        tile.stress * RIFT_PER_STRESS_M
    };

    let pos = tile.position();
    base + tectonic + detail.sample(pos) * DETAIL_AMPLITUDE_M + broad.sample(pos) * BROAD_AMPLITUDE_M
}

/// Overwrites `elevation_m` on every tile.
pub fn synthesize_elevation(tiles: &mut [Tile], seed: u64) {
    let detail = FractalNoise::seeded(seed, 11);
    let broad = FractalNoise::broad(seed, 12);
    tiles
        .par_iter_mut()
        .for_each(|t| t.elevation_m = tile_elevation_m(t, &detail, &broad));
}
