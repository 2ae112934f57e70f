//! Wind-driven moisture transport and precipitation on the tile graph.

use glam::Vec3;
use rayon::prelude::*;

use crate::geometry::direction_toward;
use crate::tile::Tile;
use crate::world::{ClimateModel, PlanetConfig};

/// Fraction of carried moisture that rains out per step.
const RAINOUT_RATE: f32 = 0.3;
/// Extra rainout per km of uphill lift (enhanced model).
const OROGRAPHIC_SCALE: f32 = 0.6;
/// Extra rainout on land within this distance of the coast (enhanced model).
const COASTAL_BOOST_KM: f32 = 300.0;
/// Converts saturation vapour pressure (hPa) to a carried-moisture cap (mm/year).
const SATURATION_TO_MM: f32 = 60.0;

/// For each tile, the neighbor the wind arrives from.
pub fn upwind_neighbors(tiles: &[Tile], positions: &[Vec3], wind: &[Vec3]) -> Vec<Option<usize>> {
    (0..tiles.len())
        .into_par_iter()
        .map(|i| {
            let p = positions[i];
            let back = -wind[i];
            let mut best: Option<(f32, usize)> = None;
            for &j in tiles[i].neighbors() {
                let score = direction_toward(p, positions[j]).dot(back);
                if best.map_or(true, |(s, _)| score > s) {
                    best = Some((score, j));
                }
            }
            best.filter(|&(s, _)| s > 0.0).map(|(_, j)| j)
        })
        .collect()
}

/// Saturation vapour pressure (hPa), Magnus formula.
fn saturation_hpa(temp_c: f32) -> f32 {
    let t = temp_c.clamp(-60.0, 60.0);
    6.112 * (17.67 * t / (t + 243.5)).exp()
}

/// Per-tile result of moisture transport.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoistureOutput {
    pub precipitation_mm: f32,
    pub humidity: f32,
    pub carried_mm: f32,
}

/// Inputs needed per tile.
#[derive(Debug, Clone, Copy)]
pub struct MoistureSite {
    pub temperature_c: f32,
    pub evaporation_mm: f32,
    pub elevation_m: f32,
    pub is_water: bool,
    pub coast_distance_km: Option<f32>,
}

/// Jacobi iteration of moisture advection: each step a tile receives what its
/// upwind neighbor carried, gains evaporation over water and loses rainout.
/// After enough steps the rainout field is the steady-state precipitation.
pub fn transport_moisture(
    sites: &[MoistureSite],
    upwind: &[Option<usize>],
    iterations: u32,
    planet: &PlanetConfig,
    model: ClimateModel,
) -> Vec<MoistureOutput> {
    let n = sites.len();
    let density = planet.atmosphere_density.max(0.0);
    let mut carried = vec![0.0f32; n];
    let mut next = vec![MoistureOutput::default(); n];

    for _ in 0..iterations.max(1) {
        next = (0..n)
            .into_par_iter()
            .map(|i| {
                let s = sites[i];
                let mut m = upwind[i].map_or(0.0, |u| carried[u]);
                if s.is_water {
                    m += s.evaporation_mm;
                }

                let capacity = saturation_hpa(s.temperature_c) * SATURATION_TO_MM * density;
                let lift_km = upwind[i]
                    .map_or(0.0, |u| (s.elevation_m - sites[u].elevation_m).max(0.0) / 1000.0);

                let mut rate = RAINOUT_RATE;
                match model {
                    ClimateModel::EnhancedHeuristic => {
                        rate *= 1.0 + OROGRAPHIC_SCALE * lift_km;
                        if !s.is_water {
                            if let Some(c) = s.coast_distance_km {
                                rate *= 1.0 + 0.3 * (1.0 - (c / COASTAL_BOOST_KM).min(1.0));
                            }
                        }
                    }
                    ClimateModel::ReducedHeuristicsPhysical => {}
                }

                let mut precip = (m * rate.clamp(0.0, 1.0)).min(m);
                // Anything above saturation rains out regardless of model.
                precip = precip.max(m - capacity).clamp(0.0, m.max(0.0));
                let remaining = (m - precip).max(0.0);

                MoistureOutput {
                    precipitation_mm: precip,
                    humidity: if capacity > 0.0 {
                        (remaining / capacity).clamp(0.0, 1.0)
                    } else {
                        0.0
                    },
                    carried_mm: remaining,
                }
            })
            .collect();

        for (c, o) in carried.iter_mut().zip(&next) {
            *c = o.carried_mm;
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(is_water: bool) -> MoistureSite {
        MoistureSite {
            temperature_c: 20.0,
            evaporation_mm: if is_water { 1200.0 } else { 0.0 },
            elevation_m: 0.0,
            is_water,
            coast_distance_km: None,
        }
    }

    #[test]
    fn precipitation_decays_downwind_of_the_ocean() {
        // 0 (ocean) -> 1 -> 2 -> 3, wind blowing from low to high index.
        let sites = vec![site(true), site(false), site(false), site(false)];
        let upwind = vec![None, Some(0), Some(1), Some(2)];
        let out = transport_moisture(
            &sites,
            &upwind,
            16,
            &PlanetConfig::default(),
            ClimateModel::ReducedHeuristicsPhysical,
        );
        assert!(out.iter().all(|o| o.precipitation_mm >= 0.0));
        assert!(out[1].precipitation_mm > out[2].precipitation_mm);
        assert!(out[2].precipitation_mm > out[3].precipitation_mm);
    }

    #[test]
    fn no_water_means_no_rain() {
        let sites = vec![site(false); 3];
        let upwind = vec![Some(2), Some(0), Some(1)];
        let out = transport_moisture(&sites, &upwind, 8, &PlanetConfig::default(), ClimateModel::EnhancedHeuristic);
        assert!(out.iter().all(|o| o.precipitation_mm == 0.0));
    }

    #[test]
    fn saturation_grows_with_temperature() {
        assert!(saturation_hpa(30.0) > saturation_hpa(0.0));
        assert!(saturation_hpa(0.0) > saturation_hpa(-30.0));
    }
}
