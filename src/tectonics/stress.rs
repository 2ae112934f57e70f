//! Boundary stress from relative plate motion.

use rayon::prelude::*;

use crate::geometry::direction_toward;
use crate::tile::Tile;

use super::Plate;

/// Stress per tile: mean, over neighbors on other plates, of relative plate
/// velocity projected onto the separation direction. Positive where plates
/// converge, negative where they diverge, zero in plate interiors.
pub fn compute_stress(tiles: &[Tile], plates: &[Plate]) -> Vec<f32> {
    let positions: Vec<_> = tiles.iter().map(Tile::position).collect();

    (0..tiles.len())
        .into_par_iter()
        .map(|i| {
            let Some(pi) = tiles[i].plate_id.and_then(|id| plates.get(id)) else {
                return 0.0;
            };
            let p = positions[i];
            let mut sum = 0.0;
            let mut count = 0u32;
            for &j in tiles[i].neighbors() {
                let Some(pj) = tiles[j].plate_id.and_then(|id| plates.get(id)) else {
                    continue;
                };
                if pj.id == pi.id {
                    continue;
                }
                let toward = direction_toward(p, positions[j]);
                let closing = (pi.velocity_at(p) - pj.velocity_at(positions[j])).dot(toward);
                sum += closing;
                count += 1;
            }
            if count == 0 {
                0.0
            } else {
                sum / count as f32
            }
        })
        .collect()
}
