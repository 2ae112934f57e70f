//! Generation pipeline: the stage contract, the standard stage set and the
//! runner that applies them in order to one [`WorldContext`](crate::world::WorldContext).

mod rebalance;
mod seasonal;
mod stage;
mod stages;

pub use rebalance::{rebalance_water, RebalanceReport, WaterRebalanceStage, REBALANCE_SEED_OFFSET};
pub use seasonal::{
    merge_views, run_annual, run_dual_pass, SeasonalClimateStage, SeasonalOutcome, SeasonalPhase,
};
pub use stage::{GenerationStage, Pipeline, PipelineError, StageId};
pub use stages::{
    BaseSurfaceStage, BiomeStage, ElevationStage, ErosionStage, IceStage, ImpactStage,
    NeighborStage, PlateStage, ReliefStage, ResourceStage, RiverStage, StressStage,
    VolcanismStage, WaterClassificationStage,
};
