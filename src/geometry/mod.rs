//! Sphere geometry, the tile-template source and tile topology.

mod sphere;
mod template;
pub mod neighbors;

pub use sphere::{
    angular_distance, direction_toward, heading_deg, lat_lon_to_unit, local_tangent_basis,
    unit_to_lat_lon,
};
pub use template::{TemplateError, TemplateRow, TileTemplate};
pub use neighbors::{build_neighbors, DEFAULT_NEIGHBOR_COUNT};
