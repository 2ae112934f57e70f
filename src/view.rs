//! Read access for renderers and editors over a finished tile array, plus
//! the one external write an editor may make: changing a surface type.

use thiserror::Error;

use crate::resources::{Resource, ResourceKind};
use crate::tile::{resolve, ClimateQuantity, ClimateView, Resolved, SurfaceType, Tile};
use crate::world::PlanetConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("no tile with id {0}")]
    UnknownTile(usize),
}

/// Borrowed view of a generated world.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    tiles: &'a [Tile],
    planet: &'a PlanetConfig,
}

impl<'a> WorldView<'a> {
    pub fn new(tiles: &'a [Tile], planet: &'a PlanetConfig) -> Self {
        Self { tiles, planet }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile ids equal indices.
    pub fn tile(&self, id: usize) -> Result<&'a Tile, ViewError> {
        self.tiles.get(id).ok_or(ViewError::UnknownTile(id))
    }

    pub fn surface(&self, id: usize) -> Result<SurfaceType, ViewError> {
        Ok(self.tile(id)?.surface)
    }

    pub fn elevation_m(&self, id: usize) -> Result<f32, ViewError> {
        Ok(self.tile(id)?.elevation_m)
    }

    /// Climate value through the same fallback chain the encoder uses.
    pub fn climate(
        &self,
        id: usize,
        quantity: ClimateQuantity,
        view: ClimateView,
    ) -> Result<Resolved, ViewError> {
        Ok(resolve(self.tile(id)?, quantity, view, self.planet))
    }

    pub fn downstream(&self, id: usize) -> Result<Option<usize>, ViewError> {
        Ok(self.tile(id)?.river.downstream)
    }

    pub fn is_river(&self, id: usize) -> Result<bool, ViewError> {
        Ok(self.tile(id)?.river.is_river)
    }

    /// Tiles visited following the river downstream from `id`, inclusive,
    /// until an outlet.
    pub fn river_path(&self, id: usize) -> Result<Vec<usize>, ViewError> {
        let mut path = vec![id];
        let mut current = self.downstream(id)?;
        while let Some(next) = current {
            // Routing is acyclic; the bound only guards hand-edited data.
            if path.len() > self.tiles.len() {
                break;
            }
            path.push(next);
            current = self.downstream(next)?;
        }
        Ok(path)
    }

    pub fn resources(&self, id: usize) -> Result<&'a [Resource], ViewError> {
        Ok(&self.tile(id)?.resources)
    }

    pub fn has_resource(&self, id: usize, kind: ResourceKind) -> Result<bool, ViewError> {
        Ok(self.resources(id)?.iter().any(|r| r.kind == kind))
    }
}

/// Editor write: replaces the surface type of tile `id` and returns the old
/// one. Bypasses the pipeline; nothing downstream is recomputed.
pub fn set_surface(tiles: &mut [Tile], id: usize, surface: SurfaceType) -> Result<SurfaceType, ViewError> {
    let tile = tiles.get_mut(id).ok_or(ViewError::UnknownTile(id))?;
    Ok(std::mem::replace(&mut tile.surface, surface))
}
