//! Biome classification.
//!
//! Land biomes follow a Whittaker-like scheme driven by the tile's *local*
//! warm and cold seasons (whichever seasonal run was hotter or colder at
//! that tile) plus annual precipitation. Water tiles get aquatic biomes.

use serde::{Deserialize, Serialize};

use crate::terrain::{dry_out_swamps, has_liquid_water};
use crate::tile::{resolve, ClimateQuantity, ClimateView, SurfaceType, Tile, WarmSource};
use crate::world::PlanetConfig;

/// Biome of a tile. `tag()` is stable and used by the compact encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Marine,
    Freshwater,
    PackIce,
    IceSheet,
    Tundra,
    BorealForest,
    TemperateGrassland,
    TemperateDeciduousForest,
    TemperateRainforest,
    SubtropicalDesert,
    Savanna,
    TropicalSeasonalForest,
    TropicalRainforest,
    Wetland,
    Alpine,
    Barren,
}

impl Biome {
    pub fn tag(self) -> &'static str {
        match self {
            Biome::Marine => "mar",
            Biome::Freshwater => "fre",
            Biome::PackIce => "pki",
            Biome::IceSheet => "ice",
            Biome::Tundra => "tun",
            Biome::BorealForest => "bor",
            Biome::TemperateGrassland => "tgr",
            Biome::TemperateDeciduousForest => "tdf",
            Biome::TemperateRainforest => "trf",
            Biome::SubtropicalDesert => "des",
            Biome::Savanna => "sav",
            Biome::TropicalSeasonalForest => "tsf",
            Biome::TropicalRainforest => "rfo",
            Biome::Wetland => "wet",
            Biome::Alpine => "alp",
            Biome::Barren => "bar",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Biome::Marine => "marine",
            Biome::Freshwater => "freshwater",
            Biome::PackIce => "pack ice",
            Biome::IceSheet => "ice sheet",
            Biome::Tundra => "tundra",
            Biome::BorealForest => "boreal forest",
            Biome::TemperateGrassland => "temperate grassland",
            Biome::TemperateDeciduousForest => "temperate deciduous forest",
            Biome::TemperateRainforest => "temperate rainforest",
            Biome::SubtropicalDesert => "subtropical desert",
            Biome::Savanna => "savanna",
            Biome::TropicalSeasonalForest => "tropical seasonal forest",
            Biome::TropicalRainforest => "tropical rainforest",
            Biome::Wetland => "wetland",
            Biome::Alpine => "alpine",
            Biome::Barren => "barren",
        }
    }

    /// Base vegetation density (0..1).
    pub fn base_veg(self) -> f32 {
        match self {
            Biome::Marine | Biome::Freshwater => 0.3,
            Biome::PackIce | Biome::IceSheet | Biome::Barren => 0.0,
            Biome::Tundra => 0.15,
            Biome::BorealForest => 0.65,
            Biome::TemperateGrassland => 0.45,
            Biome::TemperateDeciduousForest => 0.70,
            Biome::TemperateRainforest => 0.85,
            Biome::SubtropicalDesert => 0.05,
            Biome::Savanna => 0.35,
            Biome::TropicalSeasonalForest => 0.75,
            Biome::TropicalRainforest => 0.95,
            Biome::Wetland => 0.8,
            Biome::Alpine => 0.2,
        }
    }

    pub fn is_forest(self) -> bool {
        matches!(
            self,
            Biome::BorealForest
                | Biome::TemperateDeciduousForest
                | Biome::TemperateRainforest
                | Biome::TropicalSeasonalForest
                | Biome::TropicalRainforest
        )
    }
}

/// Climate inputs to [`classify_land`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeInputs {
    /// Local warm-season temperature (°C).
    pub warm_c: f32,
    /// Local cold-season temperature (°C).
    pub cold_c: f32,
    /// Annual precipitation (mm/year).
    pub precip_mm: f32,
    /// Height above sea level (m).
    pub height_m: f32,
}

/// Whittaker-like land classification.
pub fn classify_land(inputs: BiomeInputs) -> Biome {
    let BiomeInputs {
        warm_c,
        cold_c,
        precip_mm,
        height_m,
    } = inputs;
    let mean = 0.5 * (warm_c + cold_c);

    if warm_c <= 0.0 {
        return Biome::IceSheet;
    }
    if height_m >= 3500.0 {
        return Biome::Alpine;
    }
    if warm_c < 10.0 {
        return if precip_mm < 50.0 {
            Biome::Barren
        } else {
            Biome::Tundra
        };
    }
    if mean < 3.0 || cold_c <= -15.0 {
        return if precip_mm < 300.0 {
            Biome::Tundra
        } else {
            Biome::BorealForest
        };
    }

    if mean >= 20.0 && cold_c >= 15.0 {
        return if precip_mm >= 2500.0 {
            Biome::TropicalRainforest
        } else if precip_mm >= 1200.0 {
            Biome::TropicalSeasonalForest
        } else if precip_mm >= 450.0 {
            Biome::Savanna
        } else {
            Biome::SubtropicalDesert
        };
    }

    if precip_mm >= 1600.0 {
        Biome::TemperateRainforest
    } else if precip_mm >= 800.0 {
        Biome::TemperateDeciduousForest
    } else if precip_mm >= 300.0 {
        Biome::TemperateGrassland
    } else {
        Biome::SubtropicalDesert
    }
}

fn inputs_for(tile: &Tile, sea_level_m: f32, planet: &PlanetConfig) -> BiomeInputs {
    BiomeInputs {
        warm_c: resolve(tile, ClimateQuantity::Temperature, ClimateView::Warm, planet).value,
        cold_c: resolve(tile, ClimateQuantity::Temperature, ClimateView::Cold, planet).value,
        precip_mm: resolve(tile, ClimateQuantity::Precipitation, ClimateView::Inter, planet).value,
        height_m: tile.height_above(sea_level_m),
    }
}

/// Biome for one tile given its current surface.
pub fn classify_tile(tile: &Tile, sea_level_m: f32, planet: &PlanetConfig) -> Biome {
    match tile.surface {
        SurfaceType::Ocean | SurfaceType::DeepOcean => Biome::Marine,
        SurfaceType::Lake => Biome::Freshwater,
        SurfaceType::SeaIce => Biome::PackIce,
        SurfaceType::Glacier => Biome::IceSheet,
        SurfaceType::Swamp | SurfaceType::BasinSwamp => Biome::Wetland,
        _ => classify_land(inputs_for(tile, sea_level_m, planet)),
    }
}

/// Summary of a [`classify_biomes`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiomeReport {
    /// Ids of swamps dried out because the planet had no liquid water.
    pub dried: Vec<usize>,
    pub land_tiles: usize,
}

/// Dries swamps on a waterless planet, then writes `biome` on every tile.
pub fn classify_biomes(tiles: &mut [Tile], sea_level_m: f32, planet: &PlanetConfig) -> BiomeReport {
    let dried = if has_liquid_water(tiles) {
        Vec::new()
    } else {
        dry_out_swamps(tiles)
    };

    let mut land_tiles = 0;
    for t in tiles.iter_mut() {
        land_tiles += usize::from(t.surface.is_land());
        t.biome = Some(classify_tile(t, sea_level_m, planet));
    }
    BiomeReport { dried, land_tiles }
}

/// Human-readable account of why a tile got its biome, naming the seasonal
/// run that supplied its warm season.
pub fn explain(tile: &Tile, planet: &PlanetConfig) -> String {
    let Some(biome) = tile.biome else {
        return "unclassified".to_string();
    };
    let warm = resolve(tile, ClimateQuantity::Temperature, ClimateView::Warm, planet);
    let cold = resolve(tile, ClimateQuantity::Temperature, ClimateView::Cold, planet);
    let source = match tile.warm_source {
        WarmSource::PositiveTilt => "the positive-tilt season",
        WarmSource::NegativeTilt => "the negative-tilt season",
        WarmSource::Undetermined => "an undetermined season",
    };
    format!(
        "{}: warm season {:.1} °C from {}, cold season {:.1} °C",
        biome.name(),
        warm.value,
        source,
        cold.value
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(warm_c: f32, cold_c: f32, precip_mm: f32) -> BiomeInputs {
        BiomeInputs {
            warm_c,
            cold_c,
            precip_mm,
            height_m: 200.0,
        }
    }

    #[test]
    fn whittaker_corners() {
        assert_eq!(classify_land(inputs(-5.0, -30.0, 200.0)), Biome::IceSheet);
        assert_eq!(classify_land(inputs(6.0, -30.0, 200.0)), Biome::Tundra);
        assert_eq!(classify_land(inputs(18.0, -25.0, 600.0)), Biome::BorealForest);
        assert_eq!(classify_land(inputs(29.0, 24.0, 3000.0)), Biome::TropicalRainforest);
        assert_eq!(classify_land(inputs(30.0, 20.0, 700.0)), Biome::Savanna);
        assert_eq!(classify_land(inputs(32.0, 18.0, 100.0)), Biome::SubtropicalDesert);
        assert_eq!(classify_land(inputs(22.0, 2.0, 1000.0)), Biome::TemperateDeciduousForest);
        assert_eq!(classify_land(inputs(22.0, 2.0, 400.0)), Biome::TemperateGrassland);
    }

    #[test]
    fn high_ground_is_alpine() {
        let i = BiomeInputs {
            height_m: 4200.0,
            ..inputs(14.0, -2.0, 900.0)
        };
        assert_eq!(classify_land(i), Biome::Alpine);
    }

    #[test]
    fn water_surfaces_get_aquatic_biomes() {
        let planet = PlanetConfig::earth_like();
        let mut t = Tile::new(0, 0.0, 0.0);
        t.surface = SurfaceType::DeepOcean;
        assert_eq!(classify_tile(&t, 0.0, &planet), Biome::Marine);
        t.surface = SurfaceType::Lake;
        assert_eq!(classify_tile(&t, 0.0, &planet), Biome::Freshwater);
        t.surface = SurfaceType::SeaIce;
        assert_eq!(classify_tile(&t, 0.0, &planet), Biome::PackIce);
    }

    #[test]
    fn local_seasons_drive_classification() {
        let planet = PlanetConfig::earth_like();
        let mut t = Tile::new(0, 45.0, 0.0);
        t.surface = SurfaceType::Plains;
        t.elevation_m = 100.0;
        t.climate.temperature_c = Some(12.0);
        t.climate.precipitation_mm = Some(1000.0);
        t.local_warm.temperature_c = Some(22.0);
        t.local_cold.temperature_c = Some(2.0);
        assert_eq!(classify_tile(&t, 0.0, &planet), Biome::TemperateDeciduousForest);
        t.local_cold.temperature_c = Some(-20.0);
        assert_eq!(classify_tile(&t, 0.0, &planet), Biome::BorealForest);
    }

    #[test]
    fn waterless_planet_dries_swamps_first() {
        let planet = PlanetConfig::desert_world();
        let mut tiles: Vec<Tile> = (0..3).map(|i| Tile::new(i, 0.0, i as f32)).collect();
        tiles[0].surface = SurfaceType::Swamp;
        tiles[1].surface = SurfaceType::BasinSwamp;
        tiles[2].surface = SurfaceType::Plains;
        let report = classify_biomes(&mut tiles, 0.0, &planet);
        assert_eq!(report.dried, vec![0, 1]);
        assert_eq!(report.land_tiles, 3);
        assert_eq!(tiles[0].surface, SurfaceType::DryBasin);
        assert_eq!(tiles[1].surface, SurfaceType::DeepDryBasin);
        assert!(tiles.iter().all(|t| t.biome.is_some()));
        assert_ne!(tiles[0].biome, Some(Biome::Wetland));
    }

    #[test]
    fn explain_names_the_warm_source() {
        let planet = PlanetConfig::earth_like();
        let mut t = Tile::new(0, -30.0, 0.0);
        t.surface = SurfaceType::Plains;
        t.local_warm.temperature_c = Some(25.0);
        t.local_cold.temperature_c = Some(10.0);
        t.warm_source = WarmSource::NegativeTilt;
        assert_eq!(explain(&t, &planet), "unclassified");
        t.biome = Some(Biome::Savanna);
        let text = explain(&t, &planet);
        assert!(text.starts_with("savanna"));
        assert!(text.contains("negative-tilt"));
        assert!(text.contains("25.0"));
    }
}
