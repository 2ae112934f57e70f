//! Compact JSON encoding of a finished tile array.
//!
//! Keys are short tags. Every climate quantity is resolved through the
//! fallback chain in [`crate::tile::resolve`] and written as a
//! `"warm|inter|cold"` string with fixed decimals.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tile::{resolve, ClimateQuantity, ClimateView, Tile};
use crate::world::{PlanetConfig, WorldContext};

/// Bumped whenever a tag changes meaning.
pub const FORMAT_VERSION: u32 = 1;

/// Errors that can occur during encoding. Nothing is written on error.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("tile {id}: {field} is not finite")]
    NonFinite { id: usize, field: &'static str },
    #[error("position {position} holds tile {id}")]
    IdMismatch { position: usize, id: usize },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Planet metadata block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetRecord {
    #[serde(rename = "n")]
    pub name: String,
    #[serde(rename = "r")]
    pub radius_km: f64,
    #[serde(rename = "tl")]
    pub axial_tilt_deg: f64,
    #[serde(rename = "wf")]
    pub water_fraction: f64,
    #[serde(rename = "sl", skip_serializing_if = "Option::is_none", default)]
    pub sea_level_m: Option<f64>,
}

/// One tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub i: usize,
    pub la: f64,
    pub lo: f64,
    /// Surface tag.
    pub s: String,
    /// Elevation (m).
    pub e: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pl: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cr: Option<String>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub ic: bool,
    pub nb: Vec<usize>,
    /// Temperature (°C).
    pub t: String,
    /// Precipitation (mm/year).
    pub p: String,
    /// Evaporation (mm/year).
    pub ev: String,
    /// Humidity.
    pub hu: String,
    /// Wind speed (m/s).
    pub wv: String,
    /// Wind heading (° from north).
    pub wd: String,
    /// Which seasonal run supplied the local warm view.
    pub ws: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rd: Option<usize>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub rv: bool,
    pub rf: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub b: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub rs: Vec<String>,
}

/// Top-level document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub v: u32,
    pub pl: PlanetRecord,
    pub tiles: Vec<TileRecord>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn round(x: f32, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (f64::from(x) * scale).round() / scale
}

fn finite(id: usize, field: &'static str, x: f32) -> Result<f32, ExportError> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(ExportError::NonFinite { id, field })
    }
}

/// `"warm|inter|cold"` for one quantity, with `decimals` places.
pub fn seasonal_triple(
    tile: &Tile,
    quantity: ClimateQuantity,
    planet: &PlanetConfig,
    decimals: usize,
) -> Result<String, ExportError> {
    let mut parts = Vec::with_capacity(3);
    for view in [ClimateView::Warm, ClimateView::Inter, ClimateView::Cold] {
        let v = finite(tile.id(), quantity.name(), resolve(tile, quantity, view, planet).value)?;
        parts.push(format!("{v:.decimals$}"));
    }
    Ok(parts.join("|"))
}

fn encode_tile(tile: &Tile, planet: &PlanetConfig) -> Result<TileRecord, ExportError> {
    let id = tile.id();
    Ok(TileRecord {
        i: id,
        la: round(finite(id, "latitude", tile.latitude())?, 4),
        lo: round(finite(id, "longitude", tile.longitude())?, 4),
        s: tile.surface.tag().to_string(),
        e: round(finite(id, "elevation", tile.elevation_m)?, 0),
        ue: tile
            .underwater_elevation_m
            .map(|u| finite(id, "underwater elevation", u).map(|u| round(u, 0)))
            .transpose()?,
        pl: tile.plate_id,
        cr: tile.crust.map(|c| c.tag().to_string()),
        ic: tile.ice,
        nb: tile.neighbors().to_vec(),
        t: seasonal_triple(tile, ClimateQuantity::Temperature, planet, 1)?,
        p: seasonal_triple(tile, ClimateQuantity::Precipitation, planet, 0)?,
        ev: seasonal_triple(tile, ClimateQuantity::Evaporation, planet, 0)?,
        hu: seasonal_triple(tile, ClimateQuantity::Humidity, planet, 2)?,
        wv: seasonal_triple(tile, ClimateQuantity::WindSpeed, planet, 1)?,
        wd: seasonal_triple(tile, ClimateQuantity::WindHeading, planet, 0)?,
        ws: tile.warm_source.tag().to_string(),
        rd: tile.river.downstream,
        rv: tile.river.is_river,
        rf: round(finite(id, "river flow", tile.river.flow)?, 0),
        b: tile.biome.map(|b| b.tag().to_string()),
        rs: tile
            .resources
            .iter()
            .map(|r| format!("{}:{:.2}", r.kind.tag(), r.abundance))
            .collect(),
    })
}

/// Encodes `tiles`. Fails on the first tile that cannot be represented.
pub fn encode(
    tiles: &[Tile],
    planet: &PlanetConfig,
    sea_level_m: Option<f32>,
) -> Result<WorldRecord, ExportError> {
    let mut records = Vec::with_capacity(tiles.len());
    for (position, tile) in tiles.iter().enumerate() {
        if tile.id() != position {
            return Err(ExportError::IdMismatch {
                position,
                id: tile.id(),
            });
        }
        records.push(encode_tile(tile, planet)?);
    }
    Ok(WorldRecord {
        v: FORMAT_VERSION,
        pl: PlanetRecord {
            name: planet.name.clone(),
            radius_km: round(planet.radius_km, 1),
            axial_tilt_deg: round(planet.effective_tilt_deg(), 2),
            water_fraction: round(planet.water_fraction, 3),
            sea_level_m: sea_level_m.filter(|s| s.is_finite()).map(|s| round(s, 0)),
        },
        tiles: records,
    })
}

pub fn encode_context(ctx: &WorldContext) -> Result<WorldRecord, ExportError> {
    encode(&ctx.tiles, ctx.planet(), ctx.sea_level_m)
}

pub fn to_json_string(record: &WorldRecord) -> Result<String, ExportError> {
    Ok(serde_json::to_string(record)?)
}

/// Writes `record` to `path`. The record is fully encoded before the file is
/// created.
pub fn write_json(path: &Path, record: &WorldRecord) -> Result<(), ExportError> {
    let bytes = serde_json::to_vec(record)?;
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json(path: &Path) -> Result<WorldRecord, ExportError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{SurfaceType, WarmSource};
    use tempfile::tempdir;

    fn tile() -> Tile {
        let mut t = Tile::new(0, 12.3456789, -45.0);
        t.surface = SurfaceType::Plains;
        t.elevation_m = 812.6;
        t.climate.temperature_c = Some(14.44);
        t.interseason.temperature_c = Some(14.44);
        t.local_warm.temperature_c = Some(22.06);
        t.local_cold.temperature_c = Some(3.95);
        t.climate.precipitation_mm = Some(640.4);
        t.warm_source = WarmSource::PositiveTilt;
        t
    }

    #[test]
    fn triples_resolve_and_round() {
        let planet = PlanetConfig::earth_like();
        let t = tile();
        assert_eq!(
            seasonal_triple(&t, ClimateQuantity::Temperature, &planet, 1).unwrap(),
            "22.1|14.4|4.0"
        );
        assert_eq!(
            seasonal_triple(&t, ClimateQuantity::Precipitation, &planet, 0).unwrap(),
            "640|640|640"
        );
    }

    #[test]
    fn encoding_uses_short_tags() {
        let planet = PlanetConfig::earth_like();
        let record = encode(&[tile()], &planet, Some(0.0)).unwrap();
        let json = to_json_string(&record).unwrap();
        assert!(json.contains("\"s\":\"pl\""));
        assert!(json.contains("\"t\":\"22.1|14.4|4.0\""));
        assert!(json.contains("\"ws\":\"a\""));
        assert!(json.contains("\"e\":813.0"));
        assert!(!json.contains("\"rv\""));
    }

    #[test]
    fn non_finite_values_fail_the_whole_encoding() {
        let planet = PlanetConfig::earth_like();
        let mut t = tile();
        t.elevation_m = f32::NAN;
        let err = encode(&[t], &planet, None).unwrap_err();
        assert!(matches!(err, ExportError::NonFinite { id: 0, field: "elevation" }));
    }

    #[test]
    fn out_of_place_tiles_are_rejected() {
        let planet = PlanetConfig::earth_like();
        let tiles = vec![Tile::new(1, 0.0, 0.0)];
        assert!(matches!(
            encode(&tiles, &planet, None),
            Err(ExportError::IdMismatch { position: 0, id: 1 })
        ));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("world.json");
        let planet = PlanetConfig::earth_like();
        let record = encode(&[tile()], &planet, Some(-12.0)).unwrap();
        write_json(&path, &record).unwrap();
        assert_eq!(read_json(&path).unwrap(), record);
    }
}
