//! Deterministic mineral and organic deposit placement.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::biomes::Biome;
use crate::tectonics::CrustType;
use crate::tile::{SurfaceType, Tile};

/// Seed offset, relative to the generation seed.
pub const RESOURCE_SEED_OFFSET: u64 = 0x5eed_0005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Iron,
    Copper,
    Gold,
    Coal,
    Oil,
    Sulfur,
    Salt,
    Gems,
    Timber,
    Fish,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Iron,
        ResourceKind::Copper,
        ResourceKind::Gold,
        ResourceKind::Coal,
        ResourceKind::Oil,
        ResourceKind::Sulfur,
        ResourceKind::Salt,
        ResourceKind::Gems,
        ResourceKind::Timber,
        ResourceKind::Fish,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ResourceKind::Iron => "fe",
            ResourceKind::Copper => "cu",
            ResourceKind::Gold => "au",
            ResourceKind::Coal => "co",
            ResourceKind::Oil => "oi",
            ResourceKind::Sulfur => "su",
            ResourceKind::Salt => "sa",
            ResourceKind::Gems => "ge",
            ResourceKind::Timber => "ti",
            ResourceKind::Fish => "fi",
        }
    }
}

/// A deposit on one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    /// Relative richness, 0..1.
    pub abundance: f32,
}

/// Chance of `kind` occurring on `tile`.
pub fn deposit_probability(tile: &Tile, kind: ResourceKind) -> f32 {
    let continental = tile.crust == Some(CrustType::Continental);
    let land = tile.surface.is_land();
    let convergent = tile.stress.max(0.0).min(1.0);
    let volcanic = tile.volcanism;
    let biome = tile.biome;

    let p = match kind {
        ResourceKind::Iron => {
            if land && continental {
                0.06 + 0.1 * convergent
            } else {
                0.0
            }
        }
        ResourceKind::Copper => {
            if land {
                0.02 + 0.2 * convergent + 0.1 * volcanic
            } else {
                0.0
            }
        }
        ResourceKind::Gold => {
            if land {
                0.005 + 0.08 * convergent * volcanic.max(0.2)
            } else {
                0.0
            }
        }
        ResourceKind::Coal => match biome {
            Some(b) if land && continental && (b.is_forest() || b == Biome::Wetland) => 0.08,
            _ if matches!(tile.surface, SurfaceType::DryBasin | SurfaceType::DeepDryBasin) => 0.05,
            _ => 0.0,
        },
        ResourceKind::Oil => {
            if matches!(
                tile.surface,
                SurfaceType::Basin
                    | SurfaceType::DryBasin
                    | SurfaceType::DeepDryBasin
                    | SurfaceType::Ocean
            ) {
                0.06
            } else {
                0.005
            }
        }
        ResourceKind::Sulfur => 0.3 * volcanic,
        ResourceKind::Salt => match tile.surface {
            SurfaceType::DryBasin | SurfaceType::DeepDryBasin => 0.25,
            _ if biome == Some(Biome::SubtropicalDesert) => 0.05,
            _ => 0.0,
        },
        ResourceKind::Gems => {
            if land && continental {
                0.01 + 0.04 * convergent
            } else {
                0.0
            }
        }
        ResourceKind::Timber => biome.filter(|b| b.is_forest()).map_or(0.0, |b| 0.4 * b.base_veg()),
        ResourceKind::Fish => match tile.surface {
            SurfaceType::Ocean | SurfaceType::Lake => 0.2,
            SurfaceType::DeepOcean => 0.05,
            _ => 0.0,
        },
    };
    p.clamp(0.0, 1.0)
}

/// Replaces `resources` on every tile. Returns the number of deposits placed.
pub fn place_resources(tiles: &mut [Tile], seed: u64) -> usize {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut placed = 0;
    for tile in tiles.iter_mut() {
        let mut found = Vec::new();
        for kind in ResourceKind::ALL {
            // Draw for every kind so the stream stays aligned across tiles.
            let roll: f32 = rng.random();
            let abundance: f32 = rng.random_range(0.1..1.0);
            if roll < deposit_probability(tile, kind) {
                found.push(Resource { kind, abundance });
            }
        }
        placed += found.len();
        tile.resources = found;
    }
    placed
}
