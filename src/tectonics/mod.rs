//! Plate tectonics on the tile mesh.
//!
//! Plates are spherical Voronoi cells around seeded centers. Each plate
//! rotates rigidly, and the relative motion across plate boundaries gives
//! the stress that later drives uplift and volcanism.

mod plate;
mod stress;

pub use plate::{generate_plates, nearest_center, CrustType, Plate, PLATE_SEED_OFFSET};
pub use stress::compute_stress;
