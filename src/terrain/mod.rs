//! Relief and surface classification.
//!
//! Elevation is built from plate crust and boundary stress, smoothed by
//! thermal erosion, then split into land and water at a sea level chosen
//! from the planet's water fraction.

mod elevation;
mod erosion;
mod features;
pub mod surface;

pub use elevation::{synthesize_elevation, tile_elevation_m};
pub use erosion::thermal_erosion;
pub use features::{
    apply_ice, apply_impacts, apply_volcanism, HOTSPOT_SEED_OFFSET, IMPACT_SEED_OFFSET,
};
pub use surface::{
    base_surface, classify_relief, classify_water, dry_out_swamps, has_liquid_water,
};
