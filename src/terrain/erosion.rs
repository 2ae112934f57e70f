//! Mass-conserving thermal erosion on the tile graph.

use crate::tile::Tile;
use crate::world::ErosionSettings;

/// Runs `settings.iterations` passes of talus-limited erosion.
///
/// Each pass moves `rate * excess` off every tile whose drop to a neighbor
/// exceeds `talus_m`, split equally among the steep neighbors. Returns the
/// total height moved (m). Total elevation is conserved.
pub fn thermal_erosion(tiles: &mut [Tile], settings: &ErosionSettings) -> f32 {
    let rate = settings.rate.clamp(0.0, 0.5);
    let talus = settings.talus_m.max(0.0);
    let mut delta = vec![0.0f32; tiles.len()];
    let mut moved = 0.0f32;

    for _ in 0..settings.iterations {
        delta.fill(0.0);

        for (i, tile) in tiles.iter().enumerate() {
            let h0 = tile.elevation_m;
            let steep: Vec<(usize, f32)> = tile
                .neighbors()
                .iter()
                .filter_map(|&j| {
                    let diff = h0 - tiles[j].elevation_m;
                    (diff > talus).then_some((j, diff - talus))
                })
                .collect();
            if steep.is_empty() {
                continue;
            }

            let excess: f32 = steep.iter().map(|&(_, ex)| ex).sum();
            let steepest = steep.iter().fold(0.0f32, |m, &(_, ex)| m.max(ex));
            // Never flip the slope in one pass.
            let amount = (rate * excess).min(0.5 * steepest);
            if amount <= 0.0 {
                continue;
            }
            let share = amount / steep.len() as f32;
            delta[i] -= amount;
            for &(j, _) in &steep {
                delta[j] += share;
            }
            moved += amount;
        }

        for (tile, d) in tiles.iter_mut().zip(&delta) {
            tile.elevation_m += d;
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ridge() -> Vec<Tile> {
        let mut tiles: Vec<Tile> = (0..5).map(|i| Tile::new(i, 0.0, i as f32)).collect();
        for i in 0..5 {
            let mut n = Vec::new();
            if i > 0 {
                n.push(i - 1);
            }
            if i < 4 {
                n.push(i + 1);
            }
            tiles[i].set_neighbors(n);
        }
        tiles[2].elevation_m = 3000.0;
        tiles
    }

    #[test]
    fn erosion_conserves_mass() {
        let mut tiles = ridge();
        let before: f32 = tiles.iter().map(|t| t.elevation_m).sum();
        let moved = thermal_erosion(&mut tiles, &ErosionSettings::default());
        let after: f32 = tiles.iter().map(|t| t.elevation_m).sum();
        assert!(moved > 0.0);
        assert!((before - after).abs() < 1e-2);
        assert!(tiles[2].elevation_m < 3000.0);
        assert!(tiles[1].elevation_m > 0.0);
    }

    #[test]
    fn gentle_slopes_are_stable() {
        let mut tiles = ridge();
        tiles[2].elevation_m = 100.0;
        let settings = ErosionSettings::default();
        assert!(settings.talus_m > 100.0);
        assert_eq!(thermal_erosion(&mut tiles, &settings), 0.0);
        assert_eq!(tiles[2].elevation_m, 100.0);
    }

    #[test]
    fn zero_iterations_is_a_no_op() {
        let mut tiles = ridge();
        let settings = ErosionSettings {
            iterations: 0,
            ..ErosionSettings::default()
        };
        assert_eq!(thermal_erosion(&mut tiles, &settings), 0.0);
        assert_eq!(tiles, ridge());
    }
}
