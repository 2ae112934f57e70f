//! Procedural planet surface synthesis on a tile mesh.
//!
//! A run takes an immutable [`TileTemplate`](geometry::TileTemplate), turns it
//! into a fresh tile array and threads that array through an ordered list of
//! [`GenerationStage`]s: plates, relief, water, a seasonal dual-pass climate
//! model, ice, rivers, biomes and resource deposits. The finished array is
//! read through [`WorldView`] or encoded with [`export::encode`].

pub mod biomes;
pub mod climate;
pub mod export;
pub mod geometry;
pub mod hydrology;
pub mod noise;
pub mod pipeline;
pub mod resources;
pub mod tectonics;
pub mod terrain;
pub mod tile;
pub mod util;
pub mod view;
pub mod world;

pub use biomes::Biome;
pub use geometry::{TemplateError, TileTemplate};
pub use pipeline::{GenerationStage, Pipeline, PipelineError, SeasonalClimateStage, StageId};
pub use resources::{Resource, ResourceKind};
pub use tile::{ClimateQuantity, ClimateView, SurfaceType, Tile, WarmSource};
pub use view::{set_surface, ViewError, WorldView};
pub use world::{GenerationSettings, PlanetConfig, RunConfig, WorldContext};
