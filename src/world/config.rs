//! Planet configuration and generation settings.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable consulted when the climate model preference is `Auto`.
pub const CLIMATE_MODEL_ENV: &str = "TILEGEN_CLIMATE_MODEL";

/// Errors raised while reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to open config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse classification of a planet's surface water budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterRegime {
    /// No surface water at all.
    Dry,
    /// Some water, under 30% of the surface.
    Arid,
    /// 30% to 85%.
    Temperate,
    /// Over 85%.
    Oceanic,
}

/// Planet-level physical configuration. Read-mostly during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    pub name: String,
    pub radius_km: f32,
    /// Axial tilt (degrees). Clamped to [-90, 90]; NaN is treated as 0.
    pub axial_tilt_deg: f32,
    /// Surface atmospheric density relative to Earth (1.0).
    pub atmosphere_density: f32,
    /// Global mean surface temperature (°C).
    pub mean_temperature_c: f32,
    /// Fraction of the surface below sea level (0..1).
    pub water_fraction: f32,
    /// Fraction of tiles on continental crust (0..1).
    pub continental_fraction: f32,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            name: "earthlike".to_string(),
            radius_km: 6371.0,
            axial_tilt_deg: 23.44,
            atmosphere_density: 1.0,
            mean_temperature_c: 14.5,
            water_fraction: 0.7,
            continental_fraction: 0.35,
        }
    }
}

impl PlanetConfig {
    pub fn earth_like() -> Self {
        Self::default()
    }

    /// Mostly dry planet with scattered seas; the regime where water rebalancing runs.
    pub fn arid() -> Self {
        Self {
            name: "arid".to_string(),
            atmosphere_density: 0.8,
            mean_temperature_c: 22.0,
            water_fraction: 0.2,
            continental_fraction: 0.6,
            ..Default::default()
        }
    }

    /// No surface water at all.
    pub fn desert_world() -> Self {
        Self {
            name: "desert".to_string(),
            atmosphere_density: 0.6,
            mean_temperature_c: 28.0,
            water_fraction: 0.0,
            continental_fraction: 0.5,
            ..Default::default()
        }
    }

    /// Tilt actually used by the climate model.
    pub fn effective_tilt_deg(&self) -> f32 {
        if self.axial_tilt_deg.is_nan() {
            0.0
        } else {
            self.axial_tilt_deg.clamp(-90.0, 90.0)
        }
    }

    pub fn water_regime(&self) -> WaterRegime {
        let f = self.water_fraction;
        if f.is_nan() || f <= 0.0 {
            WaterRegime::Dry
        } else if f < 0.3 {
            WaterRegime::Arid
        } else if f <= 0.85 {
            WaterRegime::Temperate
        } else {
            WaterRegime::Oceanic
        }
    }
}

/// Concrete climate/wind model variant used for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimateModel {
    /// Heuristic terms for coastal moderation and orographic rainfall.
    EnhancedHeuristic,
    /// Energy-balance temperature and saturation-limited rainout only.
    ReducedHeuristicsPhysical,
}

/// What the caller asked for; resolved into a [`ClimateModel`] by
/// [`GenerationSettingsBuilder::build`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimateModelPreference {
    #[default]
    Auto,
    EnhancedHeuristic,
    ReducedHeuristicsPhysical,
}

impl ClimateModelPreference {
    /// Parses the value of [`CLIMATE_MODEL_ENV`].
    pub fn from_env_value(value: &str) -> Option<ClimateModel> {
        match value.trim().to_ascii_lowercase().as_str() {
            "physical" | "reduced" | "reduced-heuristics-physical" => {
                Some(ClimateModel::ReducedHeuristicsPhysical)
            }
            "enhanced" | "heuristic" | "enhanced-heuristic" => Some(ClimateModel::EnhancedHeuristic),
            _ => None,
        }
    }

    fn resolve(self) -> ClimateModel {
        match self {
            ClimateModelPreference::EnhancedHeuristic => ClimateModel::EnhancedHeuristic,
            ClimateModelPreference::ReducedHeuristicsPhysical => {
                ClimateModel::ReducedHeuristicsPhysical
            }
            ClimateModelPreference::Auto => std::env::var(CLIMATE_MODEL_ENV)
                .ok()
                .and_then(|v| Self::from_env_value(&v))
                .unwrap_or(ClimateModel::EnhancedHeuristic),
        }
    }
}

/// Thermal erosion tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionSettings {
    pub iterations: u32,
    /// Fraction of excess height moved per iteration (0..1).
    pub rate: f32,
    /// Height difference (m) between neighbors below which nothing moves.
    pub talus_m: f32,
}

impl Default for ErosionSettings {
    fn default() -> Self {
        Self {
            iterations: 12,
            rate: 0.2,
            talus_m: 150.0,
        }
    }
}

/// Water-rebalance tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceSettings {
    /// Swap budget as a fraction of the tile count.
    pub max_swap_fraction: f32,
    /// Ocean tiles drier than this (mm/year) are swap candidates.
    pub dry_ocean_precip_mm: f32,
    /// Land tiles wetter than this (mm/year) are swap candidates.
    pub wet_land_precip_mm: f32,
}

impl Default for RebalanceSettings {
    fn default() -> Self {
        Self {
            max_swap_fraction: 0.01,
            dry_ocean_precip_mm: 250.0,
            wet_land_precip_mm: 900.0,
        }
    }
}

/// Seeded, immutable settings for one generation run.
///
/// Built through [`GenerationSettings::builder`]; there are no setters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSettings {
    seed: u64,
    climate_model: ClimateModel,
    erosion: ErosionSettings,
    rebalance: RebalanceSettings,
    wind_iterations: u32,
    neighbor_count: usize,
    impact_count: usize,
    hotspot_count: usize,
    river_flow_threshold_mm: f32,
}

impl GenerationSettings {
    pub fn builder(seed: u64) -> GenerationSettingsBuilder {
        GenerationSettingsBuilder {
            seed,
            ..Default::default()
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn climate_model(&self) -> ClimateModel {
        self.climate_model
    }

    pub fn erosion(&self) -> &ErosionSettings {
        &self.erosion
    }

    pub fn rebalance(&self) -> &RebalanceSettings {
        &self.rebalance
    }

    pub fn wind_iterations(&self) -> u32 {
        self.wind_iterations
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbor_count
    }

    pub fn impact_count(&self) -> usize {
        self.impact_count
    }

    pub fn hotspot_count(&self) -> usize {
        self.hotspot_count
    }

    pub fn river_flow_threshold_mm(&self) -> f32 {
        self.river_flow_threshold_mm
    }

    /// Derived seed for a stochastic stage: `seed + offset`.
    pub fn stage_seed(&self, offset: u64) -> u64 {
        self.seed.wrapping_add(offset)
    }
}

/// Mutable description of settings; also the on-disk form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettingsBuilder {
    pub seed: u64,
    pub climate_model: ClimateModelPreference,
    pub erosion: ErosionSettings,
    pub rebalance: RebalanceSettings,
    pub wind_iterations: u32,
    pub neighbor_count: usize,
    pub impact_count: usize,
    pub hotspot_count: usize,
    pub river_flow_threshold_mm: f32,
}

impl Default for GenerationSettingsBuilder {
    fn default() -> Self {
        Self {
            seed: 42,
            climate_model: ClimateModelPreference::Auto,
            erosion: ErosionSettings::default(),
            rebalance: RebalanceSettings::default(),
            wind_iterations: 24,
            neighbor_count: crate::geometry::DEFAULT_NEIGHBOR_COUNT,
            impact_count: 6,
            hotspot_count: 4,
            river_flow_threshold_mm: 6000.0,
        }
    }
}

impl GenerationSettingsBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn climate_model(mut self, preference: ClimateModelPreference) -> Self {
        self.climate_model = preference;
        self
    }

    pub fn erosion(mut self, erosion: ErosionSettings) -> Self {
        self.erosion = erosion;
        self
    }

    pub fn rebalance(mut self, rebalance: RebalanceSettings) -> Self {
        self.rebalance = rebalance;
        self
    }

    pub fn wind_iterations(mut self, iterations: u32) -> Self {
        self.wind_iterations = iterations;
        self
    }

    pub fn neighbor_count(mut self, count: usize) -> Self {
        self.neighbor_count = count;
        self
    }

    pub fn impact_count(mut self, count: usize) -> Self {
        self.impact_count = count;
        self
    }

    pub fn hotspot_count(mut self, count: usize) -> Self {
        self.hotspot_count = count;
        self
    }

    pub fn river_flow_threshold_mm(mut self, threshold: f32) -> Self {
        self.river_flow_threshold_mm = threshold;
        self
    }

    /// Freezes the settings. The climate model variant is resolved here and
    /// nowhere else.
    pub fn build(self) -> GenerationSettings {
        let climate_model = self.climate_model.resolve();
        log::debug!("climate model resolved to {:?}", climate_model);
        GenerationSettings {
            seed: self.seed,
            climate_model,
            erosion: self.erosion,
            rebalance: self.rebalance,
            wind_iterations: self.wind_iterations.max(1),
            neighbor_count: self.neighbor_count.max(1),
            impact_count: self.impact_count,
            hotspot_count: self.hotspot_count,
            river_flow_threshold_mm: self.river_flow_threshold_mm.max(0.0),
        }
    }
}

/// On-disk run configuration: `{ "planet": {..}, "settings": {..} }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub planet: PlanetConfig,
    pub settings: GenerationSettingsBuilder,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn tilt_is_clamped_and_nan_is_zero() {
        let mut p = PlanetConfig::default();
        p.axial_tilt_deg = f32::NAN;
        assert_eq!(p.effective_tilt_deg(), 0.0);
        p.axial_tilt_deg = 135.0;
        assert_eq!(p.effective_tilt_deg(), 90.0);
        p.axial_tilt_deg = -100.0;
        assert_eq!(p.effective_tilt_deg(), -90.0);
        p.axial_tilt_deg = 23.5;
        assert_eq!(p.effective_tilt_deg(), 23.5);
    }

    #[test]
    fn water_regimes() {
        assert_eq!(PlanetConfig::desert_world().water_regime(), WaterRegime::Dry);
        assert_eq!(PlanetConfig::arid().water_regime(), WaterRegime::Arid);
        assert_eq!(PlanetConfig::earth_like().water_regime(), WaterRegime::Temperate);
        let wet = PlanetConfig {
            water_fraction: 0.95,
            ..Default::default()
        };
        assert_eq!(wet.water_regime(), WaterRegime::Oceanic);
    }

    #[test]
    fn explicit_model_preference_wins() {
        let s = GenerationSettings::builder(1)
            .climate_model(ClimateModelPreference::ReducedHeuristicsPhysical)
            .build();
        assert_eq!(s.climate_model(), ClimateModel::ReducedHeuristicsPhysical);
        let s = GenerationSettings::builder(1)
            .climate_model(ClimateModelPreference::EnhancedHeuristic)
            .build();
        assert_eq!(s.climate_model(), ClimateModel::EnhancedHeuristic);
    }

    #[test]
    fn env_values_parse() {
        assert_eq!(
            ClimateModelPreference::from_env_value(" Physical "),
            Some(ClimateModel::ReducedHeuristicsPhysical)
        );
        assert_eq!(
            ClimateModelPreference::from_env_value("enhanced"),
            Some(ClimateModel::EnhancedHeuristic)
        );
        assert_eq!(ClimateModelPreference::from_env_value("quantum"), None);
    }

    #[test]
    fn stage_seed_adds_offset() {
        let s = GenerationSettings::builder(u64::MAX).build();
        assert_eq!(s.stage_seed(1), 0);
        assert_eq!(GenerationSettings::builder(10).build().stage_seed(7), 17);
    }

    #[test]
    fn run_config_loads_partial_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{ "planet": { "axial_tilt_deg": 10.0 }, "settings": { "seed": 9, "climate_model": "ReducedHeuristicsPhysical" } }"#,
        )
        .unwrap();
        let cfg = RunConfig::load(&path).unwrap();
        assert_eq!(cfg.planet.axial_tilt_deg, 10.0);
        assert_eq!(cfg.planet.radius_km, 6371.0);
        let settings = cfg.settings.build();
        assert_eq!(settings.seed(), 9);
        assert_eq!(settings.climate_model(), ClimateModel::ReducedHeuristicsPhysical);
    }

    #[test]
    fn bad_json_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, "{ planet: ").unwrap();
        assert!(matches!(RunConfig::load(&path), Err(ConfigError::Parse { .. })));
    }
}
