//! "Best available value" resolution for climate quantities.
//!
//! Tiers, most specific first:
//! 1. local seasonal view (`local_warm` / `local_cold`)
//! 2. global seasonal view (`global_warm` / `global_cold`)
//! 3. interseason snapshot
//! 4. annual value
//! 5. analytic model estimate from latitude, atmosphere and mean temperature
//! 6. zero
//!
//! Seasonal tiers are skipped for [`ClimateView::Inter`]. Every consumer that
//! needs a climate value for output goes through [`resolve`].

use serde::{Deserialize, Serialize};

use crate::climate::{seasonal_swing_c, zonal_baseline_c};
use crate::world::PlanetConfig;

use super::{ClimateQuantity, ClimateState, Tile};

/// Which seasonal slice a consumer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateView {
    Warm,
    Inter,
    Cold,
}

/// Tier that produced a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FallbackTier {
    LocalSeasonal,
    GlobalSeasonal,
    Interseason,
    Annual,
    Estimate,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub value: f32,
    pub tier: FallbackTier,
}

fn present(v: Option<f32>) -> Option<f32> {
    v.filter(|x| x.is_finite())
}

/// Resolves `quantity` for `tile` under `view`.
pub fn resolve(
    tile: &Tile,
    quantity: ClimateQuantity,
    view: ClimateView,
    planet: &PlanetConfig,
) -> Resolved {
    let states: [(FallbackTier, Option<&ClimateState>); 4] = match view {
        ClimateView::Warm => [
            (FallbackTier::LocalSeasonal, Some(&tile.local_warm)),
            (FallbackTier::GlobalSeasonal, Some(&tile.global_warm)),
            (FallbackTier::Interseason, Some(&tile.interseason)),
            (FallbackTier::Annual, Some(&tile.climate)),
        ],
        ClimateView::Cold => [
            (FallbackTier::LocalSeasonal, Some(&tile.local_cold)),
            (FallbackTier::GlobalSeasonal, Some(&tile.global_cold)),
            (FallbackTier::Interseason, Some(&tile.interseason)),
            (FallbackTier::Annual, Some(&tile.climate)),
        ],
        ClimateView::Inter => [
            (FallbackTier::LocalSeasonal, None),
            (FallbackTier::GlobalSeasonal, None),
            (FallbackTier::Interseason, Some(&tile.interseason)),
            (FallbackTier::Annual, Some(&tile.climate)),
        ],
    };

    for (tier, state) in states {
        if let Some(value) = state.and_then(|s| present(s.get(quantity))) {
            return Resolved { value, tier };
        }
    }

    if let Some(value) = present(estimate(quantity, tile.latitude(), view, planet)) {
        return Resolved {
            value,
            tier: FallbackTier::Estimate,
        };
    }

    Resolved {
        value: 0.0,
        tier: FallbackTier::Default,
    }
}

/// Analytic estimate used when no simulation ever populated a field.
///
/// Returns `None` for quantities without a closed-form estimate (wind heading).
pub fn estimate(
    quantity: ClimateQuantity,
    latitude_deg: f32,
    view: ClimateView,
    planet: &PlanetConfig,
) -> Option<f32> {
    let lat = latitude_deg.to_radians();
    let swing = seasonal_swing_c(lat, planet.effective_tilt_deg(), false).abs();
    let mean = zonal_baseline_c(lat, planet);
    let temp = match view {
        ClimateView::Warm => mean + swing,
        ClimateView::Inter => mean,
        ClimateView::Cold => mean - swing,
    };

    let water = planet.water_fraction.clamp(0.0, 1.0);
    let density = planet.atmosphere_density.max(0.0);
    let warmth = ((temp + 10.0) / 40.0).clamp(0.0, 1.0);

    match quantity {
        ClimateQuantity::Temperature => Some(temp),
        ClimateQuantity::TemperatureLow => Some(temp - swing * 0.5),
        ClimateQuantity::TemperatureHigh => Some(temp + swing * 0.5),
        ClimateQuantity::Precipitation => {
            // Wet tropics, dry subtropics, moderate mid-latitudes.
            let band = 0.6 + 0.4 * (lat * 6.0).cos();
            Some(2200.0 * warmth * water * density.sqrt() * band.max(0.1))
        }
        ClimateQuantity::Evaporation => Some(1400.0 * warmth * water * density.sqrt()),
        ClimateQuantity::Humidity => Some((0.2 + 0.6 * warmth * water).clamp(0.0, 1.0)),
        ClimateQuantity::WindSpeed => {
            let abs = latitude_deg.abs();
            let base = if abs < 30.0 {
                6.0
            } else if abs < 60.0 {
                9.0
            } else {
                5.0
            };
            Some(base * density.sqrt())
        }
        ClimateQuantity::WindHeading => None,
    }
}
