//! Climate and wind/transport models.
//!
//! Two collaborators used by the seasonal climate stage:
//! - [`simulate_temperature`] writes temperature, the low/high accumulators and
//!   potential evaporation.
//! - [`simulate_transport`] writes wind, humidity, precipitation and actual
//!   evaporation on land.
//!
//! Both read surface type, elevation and topology and write only the tile's
//! annual [`ClimateState`](crate::tile::ClimateState).

mod coast;
mod moisture;
pub mod temperature;
mod wind;

pub use coast::compute_coast_distance_km;
pub use moisture::{transport_moisture, upwind_neighbors, MoistureOutput, MoistureSite};
pub use temperature::{seasonal_swing_c, temperature_c, zonal_baseline_c, TemperatureSite};
pub use wind::prevailing_wind;

use rayon::prelude::*;

use crate::geometry::heading_deg;
use crate::tile::Tile;
use crate::world::{ClimateModel, GenerationSettings, PlanetConfig};

/// Sub-steps sampled on the way to a solstice, as fractions of full forcing.
const SOLSTICE_RAMP: [f32; 3] = [0.5, 0.866, 1.0];

/// How a climate run is driven.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Forcing {
    /// Annual mean. The low/high accumulators span both solstices.
    Annual { tilt_deg: f32 },
    /// Solstice of the hemisphere the signed tilt points at.
    Solstice { tilt_deg: f32 },
}

impl Forcing {
    pub fn tilt_deg(self) -> f32 {
        match self {
            Forcing::Annual { tilt_deg } | Forcing::Solstice { tilt_deg } => tilt_deg,
        }
    }

    /// Share of the seasonal swing present in the reported temperature.
    fn peak(self) -> f32 {
        match self {
            Forcing::Annual { .. } => 0.0,
            Forcing::Solstice { .. } => 1.0,
        }
    }
}

/// Recomputes coast distance from current surface types.
pub fn update_coast_distance(tiles: &mut [Tile], radius_km: f32) {
    let dist = compute_coast_distance_km(tiles, radius_km);
    for (t, d) in tiles.iter_mut().zip(dist) {
        t.coast_distance_km = d;
    }
}

fn site(t: &Tile, sea_level_m: f32) -> TemperatureSite {
    let is_water = t.surface.is_water();
    TemperatureSite {
        latitude_rad: t.latitude().to_radians(),
        height_above_sea_m: if is_water { 0.0 } else { t.height_above(sea_level_m) },
        is_water,
        coast_distance_km: t.coast_distance_km,
    }
}

/// Temperature pass. The low/high accumulators are folded into, not reset;
/// callers clear them when a run must start fresh.
pub fn simulate_temperature(
    tiles: &mut [Tile],
    planet: &PlanetConfig,
    model: ClimateModel,
    forcing: Forcing,
    sea_level_m: f32,
) {
    let tilt = forcing.tilt_deg();
    let samples: &[f32] = match forcing {
        Forcing::Annual { .. } => &[1.0, -1.0],
        Forcing::Solstice { .. } => &SOLSTICE_RAMP,
    };

    tiles.par_iter_mut().for_each(|t| {
        let s = site(t, sea_level_m);
        let temp = temperature_c(s, tilt, forcing.peak(), planet, model);
        for &f in samples {
            t.climate.accumulate_range(temperature_c(s, tilt, f, planet, model));
        }
        t.climate.temperature_c = Some(temp);
        t.climate.evaporation_mm = Some(temperature::potential_evaporation_mm(temp, s.is_water, planet));
    });
}

/// Wind and moisture pass. Requires temperature from [`simulate_temperature`];
/// tiles without one are treated as 0 °C.
pub fn simulate_transport(
    tiles: &mut [Tile],
    planet: &PlanetConfig,
    settings: &GenerationSettings,
    forcing: Forcing,
) {
    let positions: Vec<_> = tiles.iter().map(Tile::position).collect();

    let winds: Vec<_> = tiles
        .par_iter()
        .zip(positions.par_iter())
        .map(|(t, &p)| {
            prevailing_wind(
                p,
                t.latitude().to_radians(),
                forcing.tilt_deg(),
                forcing.peak(),
                planet.atmosphere_density,
            )
        })
        .collect();
    let dirs: Vec<_> = winds.iter().map(|&(d, _)| d).collect();
    let upwind = upwind_neighbors(tiles, &positions, &dirs);

    let sites: Vec<MoistureSite> = tiles
        .iter()
        .map(|t| MoistureSite {
            temperature_c: t.climate.temperature_c.unwrap_or(0.0),
            evaporation_mm: t.climate.evaporation_mm.unwrap_or(0.0),
            elevation_m: t.elevation_m,
            is_water: t.surface.is_water(),
            coast_distance_km: t.coast_distance_km,
        })
        .collect();

    let out = transport_moisture(
        &sites,
        &upwind,
        settings.wind_iterations(),
        planet,
        settings.climate_model(),
    );

    for (i, t) in tiles.iter_mut().enumerate() {
        let (dir, speed) = winds[i];
        t.climate.wind_speed_ms = Some(speed);
        t.climate.wind_heading_deg = Some(heading_deg(positions[i], dir));
        t.climate.humidity = Some(out[i].humidity);
        t.climate.precipitation_mm = Some(out[i].precipitation_mm);
        if !sites[i].is_water {
            // Land cannot evaporate more than it receives.
            let potential = sites[i].evaporation_mm;
            t.climate.evaporation_mm = Some(potential.min(out[i].precipitation_mm * 0.6));
        }
    }
}

/// Runs temperature then transport with the same forcing.
pub fn simulate(
    tiles: &mut [Tile],
    planet: &PlanetConfig,
    settings: &GenerationSettings,
    forcing: Forcing,
    sea_level_m: f32,
) {
    simulate_temperature(tiles, planet, settings.climate_model(), forcing, sea_level_m);
    simulate_transport(tiles, planet, settings, forcing);
}
