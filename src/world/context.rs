//! The shared, mutable state threaded through every pipeline stage.

use crate::pipeline::{PipelineError, StageId};
use crate::tectonics::Plate;
use crate::tile::{SurfaceType, Tile};

use super::{GenerationSettings, PlanetConfig};

/// Everything a generation run mutates.
///
/// Stages receive `&mut WorldContext` in turn; there are no private copies.
/// `planet` and `settings` are fixed at construction.
#[derive(Debug, Clone)]
pub struct WorldContext {
    /// Tile collection. Size and id/index mapping never change.
    pub tiles: Vec<Tile>,
    pub(crate) planet: PlanetConfig,
    pub(crate) settings: GenerationSettings,
    plate_count: usize,
    /// Absent until the plates stage has run.
    pub plates: Option<Vec<Plate>>,
    /// Surface types captured by the base-surface stage, indexed by tile
    /// position. Read later by water classification.
    pub base_surface: Option<Vec<SurfaceType>>,
    /// Sea level (m) chosen by water classification; `None` before that,
    /// and on planets without water.
    pub sea_level_m: Option<f32>,
}

impl WorldContext {
    pub fn new(
        tiles: Vec<Tile>,
        planet: PlanetConfig,
        settings: GenerationSettings,
        plate_count: usize,
    ) -> Self {
        Self {
            tiles,
            planet,
            settings,
            plate_count,
            plates: None,
            base_surface: None,
            sea_level_m: None,
        }
    }

    pub fn planet(&self) -> &PlanetConfig {
        &self.planet
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn plate_count(&self) -> usize {
        self.plate_count
    }

    /// Sea level, or 0 m when water classification has not set one.
    pub fn sea_level_or_default(&self) -> f32 {
        self.sea_level_m.unwrap_or(0.0)
    }

    /// Plate list, or a precondition failure attributed to `stage`.
    pub fn require_plates(&self, stage: StageId) -> Result<&[Plate], PipelineError> {
        self.plates
            .as_deref()
            .ok_or(PipelineError::PreconditionNotMet {
                stage,
                requirement: "plate list",
            })
    }

    /// Base-surface snapshot, or a precondition failure attributed to `stage`.
    pub fn require_base_surface(&self, stage: StageId) -> Result<&[SurfaceType], PipelineError> {
        match self.base_surface.as_deref() {
            Some(s) if s.len() == self.tiles.len() => Ok(s),
            _ => Err(PipelineError::PreconditionNotMet {
                stage,
                requirement: "base surface snapshot",
            }),
        }
    }

    /// Fails unless the neighbor stage has populated topology.
    pub fn require_topology(&self, stage: StageId) -> Result<(), PipelineError> {
        if self.tiles.len() > 1 && self.tiles.iter().all(|t| t.neighbors().is_empty()) {
            return Err(PipelineError::PreconditionNotMet {
                stage,
                requirement: "tile neighbors",
            });
        }
        Ok(())
    }

    /// First `(position, id)` pair where a tile's id differs from its index.
    pub fn id_index_mismatch(&self) -> Option<(usize, usize)> {
        self.tiles
            .iter()
            .enumerate()
            .find(|(i, t)| t.id() != *i)
            .map(|(i, t)| (i, t.id()))
    }

    pub fn into_tiles(self) -> Vec<Tile> {
        self.tiles
    }
}
