//! Surface temperature model.

use crate::world::{ClimateModel, PlanetConfig};

/// Equator-to-pole temperature span (°C) under an Earth-density atmosphere.
const EQUATOR_POLE_SPAN_C: f32 = 50.0;
/// Seasonal swing at the pole for a 23.44° tilt (°C).
const POLAR_SEASONALITY_C: f32 = 25.0;
const REFERENCE_TILT_DEG: f32 = 23.44;
/// Oceans see only this share of the land seasonal swing.
const OCEAN_SEASONAL_DAMPING: f32 = 0.35;
const LAPSE_RATE_C_PER_KM: f32 = 6.5;
const MARITIME_BUFFER_KM: f32 = 450.0;

/// Annual-mean temperature (°C) at sea level for a latitude, before any
/// local correction.
pub fn zonal_baseline_c(latitude_rad: f32, planet: &PlanetConfig) -> f32 {
    let span = EQUATOR_POLE_SPAN_C / planet.atmosphere_density.max(0.05).sqrt();
    let equator = planet.mean_temperature_c + span * 0.35;
    let pole = planet.mean_temperature_c - span * 0.65;

    // Nonlinear curve gives a flatter tropics and stronger polar contrast.
    let t = (latitude_rad.abs() / std::f32::consts::FRAC_PI_2).clamp(0.0, 1.0);
    let w = t.powf(1.15);
    equator * (1.0 - w) + pole * w
}

/// Signed seasonal temperature offset (°C) at full solstice forcing.
///
/// Positive tilt warms the northern hemisphere.
pub fn seasonal_swing_c(latitude_rad: f32, tilt_deg: f32, is_water: bool) -> f32 {
    let tilt_scale = (tilt_deg / REFERENCE_TILT_DEG).clamp(-2.0, 2.0);
    let swing = POLAR_SEASONALITY_C * tilt_scale * latitude_rad.sin();
    if is_water {
        swing * OCEAN_SEASONAL_DAMPING
    } else {
        swing
    }
}

/// Inputs describing one tile for the temperature model.
#[derive(Debug, Clone, Copy)]
pub struct TemperatureSite {
    pub latitude_rad: f32,
    pub height_above_sea_m: f32,
    pub is_water: bool,
    pub coast_distance_km: Option<f32>,
}

/// Temperature (°C) at `site` with the seasonal swing scaled by `forcing`
/// (0 = annual mean, 1 = full solstice for the signed `tilt_deg`).
pub fn temperature_c(
    site: TemperatureSite,
    tilt_deg: f32,
    forcing: f32,
    planet: &PlanetConfig,
    model: ClimateModel,
) -> f32 {
    let baseline = zonal_baseline_c(site.latitude_rad, planet);
    let seasonal = seasonal_swing_c(site.latitude_rad, tilt_deg, site.is_water) * forcing;
    let lapse = LAPSE_RATE_C_PER_KM * site.height_above_sea_m.max(0.0) / 1000.0;

    let mut temp = baseline + seasonal - lapse;

    if model == ClimateModel::EnhancedHeuristic && !site.is_water {
        if let Some(coast_km) = site.coast_distance_km {
            // Blend toward the moderated ocean value near coasts.
            let w = (-coast_km / MARITIME_BUFFER_KM).exp().clamp(0.0, 1.0);
            let maritime = baseline + seasonal * OCEAN_SEASONAL_DAMPING - lapse;
            temp = temp * (1.0 - w) + maritime * w;
        }
    }

    temp
}

/// Potential evaporation (mm/year) for a surface at `temp_c`.
pub fn potential_evaporation_mm(temp_c: f32, is_water: bool, planet: &PlanetConfig) -> f32 {
    let warmth = ((temp_c + 5.0) / 35.0).clamp(0.0, 1.3);
    let base = if is_water { 1400.0 } else { 900.0 };
    base * warmth * planet.atmosphere_density.max(0.0).sqrt()
}
