//! Per-tile bundle of mutable climate fields.

use serde::{Deserialize, Serialize};

/// Physical quantities carried by a [`ClimateState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClimateQuantity {
    Temperature,
    TemperatureLow,
    TemperatureHigh,
    Precipitation,
    Evaporation,
    Humidity,
    WindSpeed,
    WindHeading,
}

impl ClimateQuantity {
    pub const ALL: [ClimateQuantity; 8] = [
        ClimateQuantity::Temperature,
        ClimateQuantity::TemperatureLow,
        ClimateQuantity::TemperatureHigh,
        ClimateQuantity::Precipitation,
        ClimateQuantity::Evaporation,
        ClimateQuantity::Humidity,
        ClimateQuantity::WindSpeed,
        ClimateQuantity::WindHeading,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClimateQuantity::Temperature => "temperature",
            ClimateQuantity::TemperatureLow => "temperature low",
            ClimateQuantity::TemperatureHigh => "temperature high",
            ClimateQuantity::Precipitation => "precipitation",
            ClimateQuantity::Evaporation => "evaporation",
            ClimateQuantity::Humidity => "humidity",
            ClimateQuantity::WindSpeed => "wind speed",
            ClimateQuantity::WindHeading => "wind heading",
        }
    }
}

/// Every climate field a climate/wind run may write for one tile.
///
/// `None` means "absent": never computed, as opposed to computed as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateState {
    /// Surface air temperature (°C).
    pub temperature_c: Option<f32>,
    /// Lowest temperature seen during the run (°C).
    pub temperature_low_c: Option<f32>,
    /// Highest temperature seen during the run (°C).
    pub temperature_high_c: Option<f32>,
    /// Precipitation (mm/year).
    pub precipitation_mm: Option<f32>,
    /// Evaporation (mm/year).
    pub evaporation_mm: Option<f32>,
    /// Relative humidity, 0..1.
    pub humidity: Option<f32>,
    /// Prevailing wind speed (m/s).
    pub wind_speed_ms: Option<f32>,
    /// Prevailing wind heading (degrees clockwise from north).
    pub wind_heading_deg: Option<f32>,
}

impl ClimateState {
    pub fn get(&self, q: ClimateQuantity) -> Option<f32> {
        match q {
            ClimateQuantity::Temperature => self.temperature_c,
            ClimateQuantity::TemperatureLow => self.temperature_low_c,
            ClimateQuantity::TemperatureHigh => self.temperature_high_c,
            ClimateQuantity::Precipitation => self.precipitation_mm,
            ClimateQuantity::Evaporation => self.evaporation_mm,
            ClimateQuantity::Humidity => self.humidity,
            ClimateQuantity::WindSpeed => self.wind_speed_ms,
            ClimateQuantity::WindHeading => self.wind_heading_deg,
        }
    }

    pub fn set(&mut self, q: ClimateQuantity, value: Option<f32>) {
        let slot = match q {
            ClimateQuantity::Temperature => &mut self.temperature_c,
            ClimateQuantity::TemperatureLow => &mut self.temperature_low_c,
            ClimateQuantity::TemperatureHigh => &mut self.temperature_high_c,
            ClimateQuantity::Precipitation => &mut self.precipitation_mm,
            ClimateQuantity::Evaporation => &mut self.evaporation_mm,
            ClimateQuantity::Humidity => &mut self.humidity,
            ClimateQuantity::WindSpeed => &mut self.wind_speed_ms,
            ClimateQuantity::WindHeading => &mut self.wind_heading_deg,
        };
        *slot = value;
    }

    /// Resets the low/high accumulators so a new run starts from nothing.
    pub fn clear_range(&mut self) {
        self.temperature_low_c = None;
        self.temperature_high_c = None;
    }

    /// Folds a temperature sample into the low/high accumulators.
    pub fn accumulate_range(&mut self, t: f32) {
        self.temperature_low_c = Some(self.temperature_low_c.map_or(t, |lo| lo.min(t)));
        self.temperature_high_c = Some(self.temperature_high_c.map_or(t, |hi| hi.max(t)));
    }

    pub fn is_empty(&self) -> bool {
        ClimateQuantity::ALL.iter().all(|&q| self.get(q).is_none())
    }
}

/// Which seasonal run supplied a tile's local-warm view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarmSource {
    /// Season A (positive axial tilt).
    PositiveTilt,
    /// Season B (negative axial tilt).
    NegativeTilt,
    #[default]
    Undetermined,
}

impl WarmSource {
    /// `Some(true)` when the warm view came from the positive-tilt run.
    pub fn from_positive_tilt(self) -> Option<bool> {
        match self {
            WarmSource::PositiveTilt => Some(true),
            WarmSource::NegativeTilt => Some(false),
            WarmSource::Undetermined => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            WarmSource::PositiveTilt => "a",
            WarmSource::NegativeTilt => "b",
            WarmSource::Undetermined => "u",
        }
    }
}
