//! Seasonal climate: one annual run plus two opposite-tilt solstice runs.
//!
//! The annual state is captured before either solstice run and restored
//! between and after them, so both seasons start from the same baseline and
//! the stage leaves every annual field exactly as the annual run wrote it.
//!
//! Two seasonal views come out of the merge:
//! - global: the `+tilt` run is always `global_warm`, the `-tilt` run always
//!   `global_cold`, whatever the local temperatures;
//! - local: per tile, the hotter run is `local_warm` and the other
//!   `local_cold`. Ties and missing temperatures go to the `+tilt` run.

use log::{debug, info};

use crate::climate::{simulate, update_coast_distance, Forcing};
use crate::tile::{ClimateState, Tile, WarmSource};
use crate::util::Timed;
use crate::world::{GenerationSettings, PlanetConfig, WorldContext};

use super::{GenerationStage, PipelineError, StageId};

/// States of the dual-pass run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonalPhase {
    AnnualBaseline,
    SeasonAComputed,
    SeasonASnapshottedAndBaselineRestored,
    SeasonBComputed,
    SeasonBSnapshotted,
    ViewsMerged,
    BaselineRestored,
}

impl SeasonalPhase {
    pub const ORDER: [SeasonalPhase; 7] = [
        SeasonalPhase::AnnualBaseline,
        SeasonalPhase::SeasonAComputed,
        SeasonalPhase::SeasonASnapshottedAndBaselineRestored,
        SeasonalPhase::SeasonBComputed,
        SeasonalPhase::SeasonBSnapshotted,
        SeasonalPhase::ViewsMerged,
        SeasonalPhase::BaselineRestored,
    ];

    /// The phase that must follow this one; `None` once terminal.
    pub fn next(self) -> Option<SeasonalPhase> {
        let i = Self::ORDER.iter().position(|&p| p == self)?;
        Self::ORDER.get(i + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

/// Records phase transitions and rejects any that skip a step.
#[derive(Debug)]
struct PhaseLog {
    visited: Vec<SeasonalPhase>,
}

impl PhaseLog {
    fn start() -> Self {
        debug!("seasonal phase {:?}", SeasonalPhase::AnnualBaseline);
        Self {
            visited: vec![SeasonalPhase::AnnualBaseline],
        }
    }

    fn current(&self) -> SeasonalPhase {
        self.visited
            .last()
            .copied()
            .unwrap_or(SeasonalPhase::AnnualBaseline)
    }

    fn advance(&mut self, to: SeasonalPhase) -> Result<(), PipelineError> {
        let from = self.current();
        if from.next() != Some(to) {
            return Err(PipelineError::StageFailed {
                stage: StageId::SeasonalClimate,
                reason: format!("invalid seasonal transition {from:?} -> {to:?}"),
            });
        }
        debug!("seasonal phase {from:?} -> {to:?}");
        self.visited.push(to);
        Ok(())
    }
}

/// What a dual-pass run did.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalOutcome {
    /// Effective tilt (°) used for season A; season B used its negation.
    pub tilt_deg: f32,
    /// Phases visited, in order.
    pub phases: Vec<SeasonalPhase>,
    pub positive_warmer: usize,
    pub negative_warmer: usize,
    pub undetermined: usize,
}

fn snapshot(tiles: &[Tile]) -> Vec<ClimateState> {
    tiles.iter().map(|t| t.climate).collect()
}

fn restore(tiles: &mut [Tile], states: &[ClimateState]) {
    for (t, s) in tiles.iter_mut().zip(states) {
        t.climate = *s;
    }
}

fn clear_ranges(tiles: &mut [Tile]) {
    for t in tiles.iter_mut() {
        t.climate.clear_range();
    }
}

/// Writes both seasonal views for one tile and returns where its local-warm
/// view came from.
pub fn merge_views(tile: &mut Tile, season_a: ClimateState, season_b: ClimateState) -> WarmSource {
    tile.global_warm = season_a;
    tile.global_cold = season_b;

    let finite = |v: Option<f32>| v.filter(|x| x.is_finite());
    let source = match (finite(season_a.temperature_c), finite(season_b.temperature_c)) {
        (Some(a), Some(b)) if b > a => WarmSource::NegativeTilt,
        (Some(_), Some(_)) => WarmSource::PositiveTilt,
        _ => WarmSource::Undetermined,
    };

    let (warm, cold) = match source {
        WarmSource::NegativeTilt => (season_b, season_a),
        WarmSource::PositiveTilt | WarmSource::Undetermined => (season_a, season_b),
    };
    tile.local_warm = warm;
    tile.local_cold = cold;
    tile.warm_source = source;
    source
}

/// Runs the annual model from fresh accumulators.
pub fn run_annual(
    tiles: &mut [Tile],
    planet: &PlanetConfig,
    settings: &GenerationSettings,
    sea_level_m: f32,
) {
    clear_ranges(tiles);
    simulate(
        tiles,
        planet,
        settings,
        Forcing::Annual {
            tilt_deg: planet.effective_tilt_deg(),
        },
        sea_level_m,
    );
}

/// Derives the seasonal views from the annual state currently on `tiles`.
///
/// On return every tile's `climate` equals its value on entry and
/// `interseason` holds a copy of it.
pub fn run_dual_pass(
    tiles: &mut [Tile],
    planet: &PlanetConfig,
    settings: &GenerationSettings,
    sea_level_m: f32,
) -> Result<SeasonalOutcome, PipelineError> {
    let _t = Timed::debug("seasonal dual pass");
    let tilt = planet.effective_tilt_deg();
    let mut phases = PhaseLog::start();

    let baseline = snapshot(tiles);
    for t in tiles.iter_mut() {
        t.interseason = t.climate;
    }

    clear_ranges(tiles);
    simulate(tiles, planet, settings, Forcing::Solstice { tilt_deg: tilt }, sea_level_m);
    phases.advance(SeasonalPhase::SeasonAComputed)?;

    let season_a = snapshot(tiles);
    restore(tiles, &baseline);
    phases.advance(SeasonalPhase::SeasonASnapshottedAndBaselineRestored)?;

    clear_ranges(tiles);
    simulate(tiles, planet, settings, Forcing::Solstice { tilt_deg: -tilt }, sea_level_m);
    phases.advance(SeasonalPhase::SeasonBComputed)?;

    let season_b = snapshot(tiles);
    phases.advance(SeasonalPhase::SeasonBSnapshotted)?;

    let (mut positive_warmer, mut negative_warmer, mut undetermined) = (0, 0, 0);
    for (i, t) in tiles.iter_mut().enumerate() {
        match merge_views(t, season_a[i], season_b[i]) {
            WarmSource::PositiveTilt => positive_warmer += 1,
            WarmSource::NegativeTilt => negative_warmer += 1,
            WarmSource::Undetermined => undetermined += 1,
        }
    }
    phases.advance(SeasonalPhase::ViewsMerged)?;

    restore(tiles, &baseline);
    phases.advance(SeasonalPhase::BaselineRestored)?;

    Ok(SeasonalOutcome {
        tilt_deg: tilt,
        phases: phases.visited,
        positive_warmer,
        negative_warmer,
        undetermined,
    })
}

/// Annual climate plus both seasonal views.
pub struct SeasonalClimateStage;

impl GenerationStage for SeasonalClimateStage {
    fn id(&self) -> StageId {
        StageId::SeasonalClimate
    }

    fn name(&self) -> &str {
        "Seasonal Climate"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Neighbors]
    }

    fn apply(&self, ctx: &mut WorldContext) -> Result<(), PipelineError> {
        ctx.require_topology(self.id())?;
        let sea = ctx.sea_level_or_default();
        let radius = ctx.planet.radius_km;
        update_coast_distance(&mut ctx.tiles, radius);

        run_annual(&mut ctx.tiles, &ctx.planet, &ctx.settings, sea);
        let outcome = run_dual_pass(&mut ctx.tiles, &ctx.planet, &ctx.settings, sea)?;
        info!(
            "seasons at tilt {:.1}°: {} tiles warmer under +tilt, {} under -tilt, {} undetermined",
            outcome.tilt_deg, outcome.positive_warmer, outcome.negative_warmer, outcome.undetermined
        );
        Ok(())
    }
}
