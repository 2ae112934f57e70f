//! Corrective swap between dry ocean and wet land.
//!
//! On arid planets the surface split and the moisture model disagree
//! independently: some ocean ends up drier than land far inland. This stage
//! swaps a bounded number of the driest ocean tiles with the wettest land
//! tiles, drawing pairs from a seeded generator so reruns repeat exactly.

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::climate::update_coast_distance;
use crate::terrain::has_liquid_water;
use crate::tile::{resolve, ClimateQuantity, ClimateView, Tile};
use crate::world::{PlanetConfig, RebalanceSettings, WaterRegime, WorldContext};

use super::{GenerationStage, PipelineError, StageId};

/// Seed offset, relative to the generation seed.
pub const REBALANCE_SEED_OFFSET: u64 = 7919;

/// What a rebalance pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebalanceReport {
    /// Whether the planet's water regime allowed the pass to run at all.
    pub eligible: bool,
    pub dry_ocean: usize,
    pub wet_land: usize,
    pub swaps: usize,
}

fn annual_precip(tile: &Tile, planet: &PlanetConfig) -> f32 {
    resolve(tile, ClimateQuantity::Precipitation, ClimateView::Inter, planet).value
}

/// Exchanges surface and the relief that goes with it (elevation, depth, ice,
/// volcanism, impact) between two tiles. Climate stays with the location.
/// Returns `false`, touching nothing, when `a == b`.
pub(crate) fn swap_surface(tiles: &mut [Tile], a: usize, b: usize) -> bool {
    if a == b {
        return false;
    }
    let (lo, hi) = (a.min(b), a.max(b));
    let (head, tail) = tiles.split_at_mut(hi);
    let (x, y) = (&mut head[lo], &mut tail[0]);
    std::mem::swap(&mut x.surface, &mut y.surface);
    std::mem::swap(&mut x.elevation_m, &mut y.elevation_m);
    std::mem::swap(&mut x.underwater_elevation_m, &mut y.underwater_elevation_m);
    std::mem::swap(&mut x.ice, &mut y.ice);
    std::mem::swap(&mut x.volcanism, &mut y.volcanism);
    std::mem::swap(&mut x.impact_depth_m, &mut y.impact_depth_m);
    true
}

/// Candidate pools: ocean drier than the threshold (driest first) and land
/// wetter than the threshold (wettest first). Ties break by id.
fn candidates(tiles: &[Tile], planet: &PlanetConfig, settings: &RebalanceSettings) -> (Vec<usize>, Vec<usize>) {
    let precip: Vec<f32> = tiles.iter().map(|t| annual_precip(t, planet)).collect();

    let mut dry: Vec<usize> = (0..tiles.len())
        .filter(|&i| tiles[i].surface.is_ocean() && precip[i] < settings.dry_ocean_precip_mm)
        .collect();
    dry.sort_by(|&a, &b| precip[a].total_cmp(&precip[b]).then(a.cmp(&b)));

    let mut wet: Vec<usize> = (0..tiles.len())
        .filter(|&i| tiles[i].surface.is_land() && precip[i] > settings.wet_land_precip_mm)
        .collect();
    wet.sort_by(|&a, &b| precip[b].total_cmp(&precip[a]).then(a.cmp(&b)));

    (dry, wet)
}

/// Runs the corrective pass. Does nothing outside [`WaterRegime::Arid`],
/// on a planet without liquid water, or when either pool is empty.
pub fn rebalance_water(
    tiles: &mut [Tile],
    planet: &PlanetConfig,
    settings: &RebalanceSettings,
    seed: u64,
) -> RebalanceReport {
    let mut report = RebalanceReport::default();
    if planet.water_regime() != WaterRegime::Arid || !has_liquid_water(tiles) {
        return report;
    }
    report.eligible = true;

    let (mut dry, mut wet) = candidates(tiles, planet, settings);
    report.dry_ocean = dry.len();
    report.wet_land = wet.len();
    if dry.is_empty() || wet.is_empty() {
        return report;
    }

    let budget = (tiles.len() as f32 * settings.max_swap_fraction.max(0.0)).ceil() as usize;
    let budget = budget.min(dry.len()).min(wet.len());
    // Draw from the extreme end of each pool, twice as deep as the budget.
    dry.truncate(budget * 2);
    wet.truncate(budget * 2);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for _ in 0..budget {
        if dry.is_empty() || wet.is_empty() {
            break;
        }
        let src = dry.swap_remove(rng.random_range(0..dry.len()));
        let dst = wet.swap_remove(rng.random_range(0..wet.len()));
        // The pools are disjoint (ocean vs land), so every draw swaps.
        if swap_surface(tiles, src, dst) {
            report.swaps += 1;
        }
    }
    report
}

pub struct WaterRebalanceStage;

impl GenerationStage for WaterRebalanceStage {
    fn id(&self) -> StageId {
        StageId::WaterRebalance
    }

    fn name(&self) -> &str {
        "Water Rebalance"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::WaterClassification, StageId::SeasonalClimate]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        let seed = ctx.settings.stage_seed(REBALANCE_SEED_OFFSET);
        let settings = ctx.settings.rebalance().clone();
        let report = rebalance_water(&mut ctx.tiles, &ctx.planet, &settings, seed);
        if report.swaps > 0 {
            let radius = ctx.planet.radius_km;
            update_coast_distance(&mut ctx.tiles, radius);
        }
        debug!("water rebalance: {report:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::SurfaceType;

    /// Alternating ocean/land with precipitation rising with id.
    fn strip(n: usize) -> Vec<Tile> {
        (0..n)
            .map(|i| {
                let mut t = Tile::new(i, 0.0, i as f32);
                let ocean = i % 2 == 0;
                t.surface = if ocean {
                    SurfaceType::Ocean
                } else {
                    SurfaceType::Plains
                };
                t.elevation_m = if ocean { -1000.0 } else { 200.0 };
                t.underwater_elevation_m = ocean.then_some(-1000.0);
                t.climate.precipitation_mm = Some(i as f32 * 20.0);
                t
            })
            .collect()
    }

    #[test]
    fn only_arid_planets_rebalance() {
        let mut tiles = strip(100);
        let before = tiles.clone();
        let report = rebalance_water(&mut tiles, &PlanetConfig::earth_like(), &RebalanceSettings::default(), 1);
        assert!(!report.eligible);
        assert_eq!(tiles, before);
    }

    #[test]
    fn swaps_are_bounded_and_seeded() {
        let planet = PlanetConfig::arid();
        let settings = RebalanceSettings {
            max_swap_fraction: 0.05,
            ..RebalanceSettings::default()
        };
        let mut a = strip(100);
        let mut b = strip(100);
        let ra = rebalance_water(&mut a, &planet, &settings, 7919);
        let rb = rebalance_water(&mut b, &planet, &settings, 7919);
        assert_eq!(ra, rb);
        assert_eq!(a, b);
        assert_eq!(ra.swaps, 5);

        let oceans = |ts: &[Tile]| ts.iter().filter(|t| t.surface.is_ocean()).count();
        assert_eq!(oceans(&a), oceans(&strip(100)));
        // Swapped land sits where it rains least.
        assert!(a[..26].iter().any(|t| t.surface.is_land() && t.id() % 2 == 0));
    }

    #[test]
    fn empty_pool_means_no_swaps() {
        let planet = PlanetConfig::arid();
        let mut tiles = strip(40);
        // Nothing on land is wet enough.
        for t in tiles.iter_mut().filter(|t| t.surface.is_land()) {
            t.climate.precipitation_mm = Some(10.0);
        }
        let before = tiles.clone();
        let report = rebalance_water(&mut tiles, &planet, &RebalanceSettings::default(), 3);
        assert!(report.eligible);
        assert_eq!(report.wet_land, 0);
        assert_eq!(report.swaps, 0);
        assert_eq!(tiles, before);
    }

    #[test]
    fn self_swap_is_a_no_op() {
        let mut tiles = strip(4);
        let before = tiles.clone();
        assert!(!swap_surface(&mut tiles, 2, 2));
        assert_eq!(tiles, before);
        assert!(swap_surface(&mut tiles, 0, 1));
        assert_eq!(tiles[0].surface, SurfaceType::Plains);
        assert_eq!(tiles[1].surface, SurfaceType::Ocean);
        assert_eq!(tiles[1].underwater_elevation_m, Some(-1000.0));
    }

    #[test]
    fn relief_flags_travel_with_the_surface() {
        let mut tiles = strip(4);
        tiles[1].surface = SurfaceType::Glacier;
        tiles[1].ice = true;
        tiles[3].surface = SurfaceType::Volcanic;
        tiles[3].volcanism = 0.9;
        tiles[3].impact_depth_m = Some(320.0);

        assert!(swap_surface(&mut tiles, 1, 0));
        assert_eq!(tiles[0].surface, SurfaceType::Glacier);
        assert!(tiles[0].ice);
        assert_eq!(tiles[1].surface, SurfaceType::Ocean);
        assert!(!tiles[1].ice);

        assert!(swap_surface(&mut tiles, 2, 3));
        assert_eq!(tiles[2].surface, SurfaceType::Volcanic);
        assert_eq!(tiles[2].volcanism, 0.9);
        assert_eq!(tiles[2].impact_depth_m, Some(320.0));
        assert_eq!(tiles[3].surface, SurfaceType::Ocean);
        assert_eq!(tiles[3].volcanism, 0.0);
        assert_eq!(tiles[3].impact_depth_m, None);
    }
}
