//! Concrete generation stages. The seasonal climate and water rebalance
//! stages live in their own modules.

use log::{debug, info, warn};

use crate::biomes::classify_biomes;
use crate::geometry::build_neighbors;
use crate::hydrology::route_rivers;
use crate::resources::{place_resources, RESOURCE_SEED_OFFSET};
use crate::tectonics::{compute_stress, generate_plates, PLATE_SEED_OFFSET};
use crate::terrain::{
    apply_ice, apply_impacts, apply_volcanism, base_surface, classify_relief, classify_water,
    synthesize_elevation, thermal_erosion, HOTSPOT_SEED_OFFSET, IMPACT_SEED_OFFSET,
};
use crate::tile::Tile;
use crate::world::WorldContext;

use super::{GenerationStage, PipelineError, StageId};

/// Plate angular speed scale (rad per model time unit).
const PLATE_VELOCITY_SCALE: f32 = 1.0;

/// Generates plates and assigns every tile to one.
pub struct PlateStage;

impl GenerationStage for PlateStage {
    fn id(&self) -> StageId {
        StageId::Plates
    }

    fn name(&self) -> &str {
        "Plate Generation"
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        if ctx.plate_count() == 0 {
            return Err(PipelineError::StageFailed {
                stage: self.id(),
                reason: "plate count must be at least 1".into(),
            });
        }

        let positions: Vec<_> = ctx.tiles.iter().map(Tile::position).collect();
        let (plates, assignment) = generate_plates(
            &positions,
            ctx.plate_count(),
            ctx.planet.continental_fraction,
            PLATE_VELOCITY_SCALE,
            ctx.settings.stage_seed(PLATE_SEED_OFFSET),
        );

        for (t, &plate) in ctx.tiles.iter_mut().zip(&assignment) {
            t.plate_id = Some(plate);
            t.crust = Some(plates[plate].crust);
        }
        debug!(
            "{} plates, {} continental",
            plates.len(),
            plates.iter().filter(|p| p.crust == crate::tectonics::CrustType::Continental).count()
        );
        ctx.plates = Some(plates);
        Ok(())
    }
}

/// Classifies land/ocean from crust and snapshots the result for water
/// classification.
pub struct BaseSurfaceStage;

impl GenerationStage for BaseSurfaceStage {
    fn id(&self) -> StageId {
        StageId::BaseSurface
    }

    fn name(&self) -> &str {
        "Base Surface"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Plates]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        ctx.require_plates(self.id())?;
        let base = base_surface(&ctx.tiles);
        for (t, &s) in ctx.tiles.iter_mut().zip(&base) {
            t.surface = s;
        }
        ctx.base_surface = Some(base);
        Ok(())
    }
}

/// Builds tile topology. Runs once per context.
pub struct NeighborStage;

impl GenerationStage for NeighborStage {
    fn id(&self) -> StageId {
        StageId::Neighbors
    }

    fn name(&self) -> &str {
        "Neighbor Topology"
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        if ctx.tiles.iter().any(|t| !t.neighbors().is_empty()) {
            return Err(PipelineError::StageFailed {
                stage: self.id(),
                reason: "topology is already built".into(),
            });
        }
        let positions: Vec<_> = ctx.tiles.iter().map(Tile::position).collect();
        let neighbors = build_neighbors(&positions, ctx.settings.neighbor_count());
        for (t, n) in ctx.tiles.iter_mut().zip(neighbors) {
            t.set_neighbors(n);
        }
        Ok(())
    }
}

/// Boundary stress from relative plate motion.
pub struct StressStage;

impl GenerationStage for StressStage {
    fn id(&self) -> StageId {
        StageId::Stress
    }

    fn name(&self) -> &str {
        "Boundary Stress"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Plates, StageId::Neighbors]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        ctx.require_topology(self.id())?;
        let stress = compute_stress(&ctx.tiles, ctx.require_plates(self.id())?);
        for (t, s) in ctx.tiles.iter_mut().zip(stress) {
            t.stress = s;
        }
        Ok(())
    }
}

pub struct ElevationStage;

impl GenerationStage for ElevationStage {
    fn id(&self) -> StageId {
        StageId::Elevation
    }

    fn name(&self) -> &str {
        "Elevation Synthesis"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Stress]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        let seed = ctx.settings.seed();
        synthesize_elevation(&mut ctx.tiles, seed);
        Ok(())
    }
}

pub struct ErosionStage;

impl GenerationStage for ErosionStage {
    fn id(&self) -> StageId {
        StageId::Erosion
    }

    fn name(&self) -> &str {
        "Thermal Erosion"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Elevation]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        ctx.require_topology(self.id())?;
        let settings = ctx.settings.erosion().clone();
        let moved = thermal_erosion(&mut ctx.tiles, &settings);
        debug!("erosion moved {moved:.0} m of material");
        Ok(())
    }
}

pub struct VolcanismStage;

impl GenerationStage for VolcanismStage {
    fn id(&self) -> StageId {
        StageId::Volcanism
    }

    fn name(&self) -> &str {
        "Volcanism"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Stress]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        let hotspots = ctx.settings.hotspot_count();
        let seed = ctx.settings.stage_seed(HOTSPOT_SEED_OFFSET);
        let centers = apply_volcanism(&mut ctx.tiles, hotspots, seed);
        debug!("hotspots at {centers:?}");
        Ok(())
    }
}

pub struct ImpactStage;

impl GenerationStage for ImpactStage {
    fn id(&self) -> StageId {
        StageId::Impacts
    }

    fn name(&self) -> &str {
        "Impact Craters"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Neighbors]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        let count = ctx.settings.impact_count();
        let seed = ctx.settings.stage_seed(IMPACT_SEED_OFFSET);
        let centers = apply_impacts(&mut ctx.tiles, count, seed);
        debug!("impacts at {centers:?}");
        Ok(())
    }
}

/// Splits land and water at the planet's water fraction.
pub struct WaterClassificationStage;

impl GenerationStage for WaterClassificationStage {
    fn id(&self) -> StageId {
        StageId::WaterClassification
    }

    fn name(&self) -> &str {
        "Water Classification"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::BaseSurface, StageId::Elevation]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        ctx.require_topology(self.id())?;
        let base = ctx.require_base_surface(self.id())?.to_vec();
        let water_fraction = ctx.planet.water_fraction;
        ctx.sea_level_m = classify_water(&mut ctx.tiles, &base, water_fraction);
        match ctx.sea_level_m {
            Some(sea) => debug!("sea level {sea:.0} m"),
            None => warn!("planet '{}' has no liquid water", ctx.planet.name),
        }
        Ok(())
    }
}

/// Land relief kinds and swamp dry-out.
pub struct ReliefStage;

impl GenerationStage for ReliefStage {
    fn id(&self) -> StageId {
        StageId::Relief
    }

    fn name(&self) -> &str {
        "Relief Classification"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::WaterClassification]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        let sea = ctx.sea_level_or_default();
        let dried = classify_relief(&mut ctx.tiles, sea);
        if !dried.is_empty() {
            debug!("relief dried {} swamps", dried.len());
        }
        Ok(())
    }
}

pub struct IceStage;

impl GenerationStage for IceStage {
    fn id(&self) -> StageId {
        StageId::Ice
    }

    fn name(&self) -> &str {
        "Ice"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::SeasonalClimate]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        let frozen = apply_ice(&mut ctx.tiles, &ctx.planet);
        debug!("{frozen} tiles iced over");
        Ok(())
    }
}

pub struct RiverStage;

impl GenerationStage for RiverStage {
    fn id(&self) -> StageId {
        StageId::Rivers
    }

    fn name(&self) -> &str {
        "River Routing"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::SeasonalClimate, StageId::Neighbors]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        ctx.require_topology(self.id())?;
        let threshold = ctx.settings.river_flow_threshold_mm();
        let rivers = route_rivers(&mut ctx.tiles, &ctx.planet, threshold);
        info!("{rivers} river tiles");
        Ok(())
    }
}

/// Biome classification from local seasons.
pub struct BiomeStage;

impl GenerationStage for BiomeStage {
    fn id(&self) -> StageId {
        StageId::Biomes
    }

    fn name(&self) -> &str {
        "Biome Classification"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::SeasonalClimate]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        let sea = ctx.sea_level_or_default();
        let report = classify_biomes(&mut ctx.tiles, sea, &ctx.planet);
        if !report.dried.is_empty() {
            debug!("biomes dried {} swamps", report.dried.len());
        }
        Ok(())
    }
}

pub struct ResourceStage;

impl GenerationStage for ResourceStage {
    fn id(&self) -> StageId {
        StageId::Resources
    }

    fn name(&self) -> &str {
        "Resource Placement"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Plates]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        ctx.require_plates(self.id())?;
        let seed = ctx.settings.stage_seed(RESOURCE_SEED_OFFSET);
        let placed = place_resources(&mut ctx.tiles, seed);
        info!("{placed} resource deposits");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TileTemplate;
    use crate::tile::SurfaceType;
    use crate::world::{GenerationSettings, PlanetConfig};

    fn context(n: usize, planet: PlanetConfig) -> WorldContext {
        WorldContext::new(
            TileTemplate::fibonacci(n).instantiate(),
            planet,
            GenerationSettings::builder(42).build(),
            6,
        )
    }

    #[test]
    fn stages_downstream_of_plates_fail_fast() {
        let mut ctx = context(20, PlanetConfig::earth_like());
        for stage in [&BaseSurfaceStage as &dyn GenerationStage, &ResourceStage] {
            let err = stage.apply(&mut ctx).unwrap_err();
            assert_eq!(
                err,
                PipelineError::PreconditionNotMet {
                    stage: stage.id(),
                    requirement: "plate list",
                }
            );
        }
    }

    #[test]
    fn water_classification_needs_base_surface() {
        let mut ctx = context(20, PlanetConfig::earth_like());
        NeighborStage.apply(&mut ctx).unwrap();
        let err = WaterClassificationStage.apply(&mut ctx).unwrap_err();
        assert!(matches!(err, PipelineError::PreconditionNotMet { .. }));
    }

    #[test]
    fn neighbors_are_built_once() {
        let mut ctx = context(20, PlanetConfig::earth_like());
        NeighborStage.apply(&mut ctx).unwrap();
        assert!(ctx.tiles.iter().all(|t| !t.neighbors().is_empty()));
        let err = NeighborStage.apply(&mut ctx).unwrap_err();
        assert_eq!(err.stage(), StageId::Neighbors);
    }

    #[test]
    fn zero_plates_is_rejected() {
        let mut ctx = WorldContext::new(
            TileTemplate::fibonacci(10).instantiate(),
            PlanetConfig::earth_like(),
            GenerationSettings::builder(1).build(),
            0,
        );
        assert!(matches!(
            PlateStage.apply(&mut ctx),
            Err(PipelineError::StageFailed { stage: StageId::Plates, .. })
        ));
    }

    #[test]
    fn base_surface_snapshot_matches_tiles() {
        let mut ctx = context(200, PlanetConfig::earth_like());
        PlateStage.apply(&mut ctx).unwrap();
        BaseSurfaceStage.apply(&mut ctx).unwrap();
        let base = ctx.base_surface.clone().unwrap();
        assert_eq!(base.len(), 200);
        for (t, s) in ctx.tiles.iter().zip(&base) {
            assert_eq!(t.surface, *s);
        }
        assert!(base.contains(&SurfaceType::Ocean));
        assert!(base.contains(&SurfaceType::Plains));
    }

    #[test]
    fn desert_world_classifies_without_water() {
        let mut ctx = context(150, PlanetConfig::desert_world());
        for stage in [
            &PlateStage as &dyn GenerationStage,
            &BaseSurfaceStage,
            &NeighborStage,
            &StressStage,
            &ElevationStage,
            &WaterClassificationStage,
            &ReliefStage,
        ] {
            stage.apply(&mut ctx).unwrap();
        }
        assert_eq!(ctx.sea_level_m, None);
        assert!(ctx.tiles.iter().all(|t| t.surface.is_land()));
        assert!(ctx.tiles.iter().all(|t| !t.surface.is_swamp()));
    }
}
