//! World context and run configuration.

mod config;
mod context;

pub use config::{
    ClimateModel, ClimateModelPreference, ConfigError, ErosionSettings, GenerationSettings,
    GenerationSettingsBuilder, PlanetConfig, RebalanceSettings, RunConfig, WaterRegime,
    CLIMATE_MODEL_ENV,
};
pub use context::WorldContext;
