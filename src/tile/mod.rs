//! Tile data model.
//!
//! A [`Tile`] is one cell of the planet mesh. Identity, position and topology
//! are fixed once set; everything else is mutated in place by pipeline stages.

mod climate_state;
mod fallback;
mod surface;

pub use climate_state::{ClimateQuantity, ClimateState, WarmSource};
pub use fallback::{estimate, resolve, ClimateView, FallbackTier, Resolved};
pub use surface::SurfaceType;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::biomes::Biome;
use crate::geometry::lat_lon_to_unit;
use crate::resources::Resource;
use crate::tectonics::CrustType;

/// River routing output for a tile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiverState {
    /// Next tile downstream, `None` for outlets and sinks.
    pub downstream: Option<usize>,
    /// Precipitation-weighted upstream flow (mm/year summed over contributing tiles).
    pub flow: f32,
    pub is_river: bool,
}

/// One cell of the planet surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    id: usize,
    latitude: f32,
    longitude: f32,
    neighbors: Vec<usize>,

    pub surface: SurfaceType,

    // Tectonics
    pub plate_id: Option<usize>,
    pub crust: Option<CrustType>,
    /// Boundary stress; positive is convergent, negative divergent.
    pub stress: f32,

    // Relief
    pub elevation_m: f32,
    /// Depth below sea level (negative), water tiles only.
    pub underwater_elevation_m: Option<f32>,
    /// Volcanic activity, 0..1.
    pub volcanism: f32,
    pub impact_depth_m: Option<f32>,
    pub ice: bool,

    // Climate
    pub coast_distance_km: Option<f32>,
    /// Annual state. Authoritative baseline for every non-seasonal reader.
    pub climate: ClimateState,
    /// Copy of the annual state taken right before seasonal perturbation.
    pub interseason: ClimateState,
    /// Positive-tilt run, regardless of which run is warmer here.
    pub global_warm: ClimateState,
    /// Negative-tilt run.
    pub global_cold: ClimateState,
    /// Warmer of the two seasonal runs for this tile.
    pub local_warm: ClimateState,
    /// Colder of the two seasonal runs for this tile.
    pub local_cold: ClimateState,
    pub warm_source: WarmSource,

    pub river: RiverState,
    pub biome: Option<Biome>,
    pub resources: Vec<Resource>,
}

impl Tile {
    pub fn new(id: usize, latitude: f32, longitude: f32) -> Self {
        Self {
            id,
            latitude,
            longitude,
            neighbors: Vec::new(),
            surface: SurfaceType::default(),
            plate_id: None,
            crust: None,
            stress: 0.0,
            elevation_m: 0.0,
            underwater_elevation_m: None,
            volcanism: 0.0,
            impact_depth_m: None,
            ice: false,
            coast_distance_km: None,
            climate: ClimateState::default(),
            interseason: ClimateState::default(),
            global_warm: ClimateState::default(),
            global_cold: ClimateState::default(),
            local_warm: ClimateState::default(),
            local_cold: ClimateState::default(),
            warm_source: WarmSource::default(),
            river: RiverState::default(),
            biome: None,
            resources: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f32 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f32 {
        self.longitude
    }

    pub fn position(&self) -> Vec3 {
        lat_lon_to_unit(self.latitude, self.longitude)
    }

    /// Neighbor ids (equal to indices), nearest first.
    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    pub(crate) fn set_neighbors(&mut self, neighbors: Vec<usize>) {
        self.neighbors = neighbors;
    }

    /// Elevation relative to `sea_level_m`.
    pub fn height_above(&self, sea_level_m: f32) -> f32 {
        self.elevation_m - sea_level_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_tile_has_everything_absent() {
        let t = Tile::new(4, 12.5, -40.0);
        assert_eq!(t.id(), 4);
        assert!(t.neighbors().is_empty());
        assert!(t.climate.is_empty());
        assert!(t.local_warm.is_empty());
        assert_eq!(t.warm_source, WarmSource::Undetermined);
        assert!(t.plate_id.is_none());
        assert!(t.biome.is_none());
    }

    #[test]
    fn position_is_unit_length() {
        let t = Tile::new(0, -33.0, 151.0);
        assert!((t.position().length() - 1.0).abs() < 1e-5);
    }
}
