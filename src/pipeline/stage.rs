//! Generation stage trait and pipeline orchestration.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tile::Tile;
use crate::util::Timed;
use crate::world::{GenerationSettings, PlanetConfig, WorldContext};

/// Stable identifier of a generation stage.
///
/// Names returned by [`StageId::name`] are part of the diagnostic surface and
/// must not change between versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Plates,
    BaseSurface,
    Neighbors,
    Stress,
    Elevation,
    Erosion,
    Volcanism,
    Impacts,
    WaterClassification,
    Relief,
    SeasonalClimate,
    Ice,
    WaterRebalance,
    Rivers,
    Biomes,
    Resources,
}

impl StageId {
    /// Order used by [`Pipeline::standard`].
    pub const STANDARD_ORDER: [StageId; 16] = [
        StageId::Plates,
        StageId::BaseSurface,
        StageId::Neighbors,
        StageId::Stress,
        StageId::Elevation,
        StageId::Erosion,
        StageId::Volcanism,
        StageId::Impacts,
        StageId::WaterClassification,
        StageId::Relief,
        StageId::SeasonalClimate,
        StageId::Ice,
        StageId::WaterRebalance,
        StageId::Rivers,
        StageId::Biomes,
        StageId::Resources,
    ];

    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Plates => "plates",
            StageId::BaseSurface => "base_surface",
            StageId::Neighbors => "neighbors",
            StageId::Stress => "stress",
            StageId::Elevation => "elevation",
            StageId::Erosion => "erosion",
            StageId::Volcanism => "volcanism",
            StageId::Impacts => "impacts",
            StageId::WaterClassification => "water_classification",
            StageId::Relief => "relief",
            StageId::SeasonalClimate => "seasonal_climate",
            StageId::Ice => "ice",
            StageId::WaterRebalance => "water_rebalance",
            StageId::Rivers => "rivers",
            StageId::Biomes => "biomes",
            StageId::Resources => "resources",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can occur during pipeline execution. Every variant names the
/// stage it originated in.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Upstream data the stage needs is absent: an ordering bug, not a data error.
    #[error("stage '{stage}': precondition not met, {requirement} is absent")]
    PreconditionNotMet {
        stage: StageId,
        requirement: &'static str,
    },
    #[error("stage '{stage}' failed: {reason}")]
    StageFailed { stage: StageId, reason: String },
    #[error("missing dependency: stage '{stage}' requires '{dependency}'")]
    MissingDependency { stage: StageId, dependency: StageId },
    #[error("stage '{stage}' broke the id/index invariant: position {position} holds tile {id}")]
    IdIndexMismatch {
        stage: StageId,
        position: usize,
        id: usize,
    },
}

impl PipelineError {
    /// Stage the failure originated in.
    pub fn stage(&self) -> StageId {
        match self {
            PipelineError::PreconditionNotMet { stage, .. }
            | PipelineError::StageFailed { stage, .. }
            | PipelineError::MissingDependency { stage, .. }
            | PipelineError::IdIndexMismatch { stage, .. } => *stage,
        }
    }
}

/// A unit of mutation over the shared [`WorldContext`].
///
/// `apply` reads fields earlier stages produced and writes its own. A stage
/// whose upstream data is missing returns
/// [`PipelineError::PreconditionNotMet`] instead of doing nothing.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Mutates `ctx` in place.
    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError>;
}

/// Runs an ordered list of stages against one context.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
}

impl Pipeline {
    /// Creates a new empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stage in [`StageId::STANDARD_ORDER`].
    pub fn standard() -> Self {
        use super::{
            BaseSurfaceStage, BiomeStage, ElevationStage, ErosionStage, IceStage, ImpactStage,
            NeighborStage, PlateStage, ReliefStage, ResourceStage, RiverStage,
            SeasonalClimateStage, StressStage, VolcanismStage, WaterClassificationStage,
            WaterRebalanceStage,
        };

        let mut pipeline = Self::new();
        pipeline
            .add_stage(PlateStage)
            .add_stage(BaseSurfaceStage)
            .add_stage(NeighborStage)
            .add_stage(StressStage)
            .add_stage(ElevationStage)
            .add_stage(ErosionStage)
            .add_stage(VolcanismStage)
            .add_stage(ImpactStage)
            .add_stage(WaterClassificationStage)
            .add_stage(ReliefStage)
            .add_stage(SeasonalClimateStage)
            .add_stage(IceStage)
            .add_stage(WaterRebalanceStage)
            .add_stage(RiverStage)
            .add_stage(BiomeStage)
            .add_stage(ResourceStage);
        pipeline
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|s| s.id()).collect()
    }

    /// Builds a context from `tiles` and runs every stage on it.
    ///
    /// `tiles` is owned by the run; pass a fresh copy of a template for each
    /// concurrent run.
    pub fn run(
        &self,
        tiles: Vec<Tile>,
        planet: PlanetConfig,
        settings: GenerationSettings,
        plate_count: usize,
    ) -> Result<WorldContext, PipelineError> {
        let mut ctx = WorldContext::new(tiles, planet, settings, plate_count);
        self.run_context(&mut ctx)?;
        Ok(ctx)
    }

    /// Runs every stage against a caller-built context, aborting on the first
    /// failure.
    pub fn run_context(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        self.run_with_callbacks(ctx, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `ctx` - The context to mutate
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        ctx: &mut WorldContext,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency {
                        stage: stage.id(),
                        dependency: *dep,
                    });
                }
            }

            {
                let _t = Timed::info(stage.id().name());
                stage.apply(ctx).inspect_err(|e| log::error!("{e}"))?;
            }

            if let Some((position, id)) = ctx.id_index_mismatch() {
                return Err(PipelineError::IdIndexMismatch {
                    stage: stage.id(),
                    position,
                    id,
                });
            }
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TileTemplate;
    use crate::pipeline::{NeighborStage, PlateStage, StressStage};

    fn context(n: usize) -> WorldContext {
        WorldContext::new(
            TileTemplate::fibonacci(n).instantiate(),
            PlanetConfig::earth_like(),
            GenerationSettings::builder(42).build(),
            5,
        )
    }

    /// Reorders tiles, which no real stage may do.
    struct Shuffler;

    impl GenerationStage for Shuffler {
        fn id(&self) -> StageId {
            StageId::Relief
        }

        fn name(&self) -> &str {
            "Shuffler"
        }

        fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
            ctx.tiles.swap(0, 1);
            Ok(())
        }
    }

    #[test]
    fn test_stage_id_name() {
        assert_eq!(StageId::Plates.name(), "plates");
        assert_eq!(StageId::SeasonalClimate.to_string(), "seasonal_climate");
        let json = serde_json::to_string(&StageId::WaterRebalance).unwrap();
        assert_eq!(json, "\"water_rebalance\"");
    }

    #[test]
    fn test_standard_order() {
        let pipeline = Pipeline::standard();
        assert_eq!(pipeline.stage_count(), 16);
        assert_eq!(pipeline.stage_ids(), StageId::STANDARD_ORDER.to_vec());
    }

    #[test]
    fn test_pipeline_execution() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(PlateStage).add_stage(NeighborStage).add_stage(StressStage);

        let mut ctx = context(120);
        pipeline.run_context(&mut ctx).unwrap();
        assert!(ctx.plates.is_some());
        assert!(ctx.tiles.iter().all(|t| t.plate_id.is_some()));
        assert!(ctx.tiles.iter().any(|t| t.stress != 0.0));
    }

    #[test]
    fn test_missing_dependency_stops_the_run() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(PlateStage).add_stage(StressStage);

        let mut ctx = context(30);
        let err = pipeline.run_context(&mut ctx).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingDependency {
                stage: StageId::Stress,
                dependency: StageId::Neighbors,
            }
        );
        assert_eq!(err.stage(), StageId::Stress);
    }

    #[test]
    fn test_id_index_invariant_is_checked_after_each_stage() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(Shuffler).add_stage(PlateStage);

        let mut ctx = context(10);
        let err = pipeline.run_context(&mut ctx).unwrap_err();
        assert_eq!(
            err,
            PipelineError::IdIndexMismatch {
                stage: StageId::Relief,
                position: 0,
                id: 1,
            }
        );
        assert!(ctx.plates.is_none(), "later stages must not run");
    }

    #[test]
    fn test_pipeline_with_callbacks() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(PlateStage);

        let mut ctx = context(16);
        let mut started = Vec::new();
        let mut completed = Vec::new();

        pipeline
            .run_with_callbacks(
                &mut ctx,
                |name, i, total| started.push((name.to_string(), i, total)),
                |name, i, total| completed.push((name.to_string(), i, total)),
            )
            .unwrap();

        assert_eq!(started, vec![("Plate Generation".to_string(), 0, 1)]);
        assert_eq!(started, completed);
    }
}
