//! Tectonic plates: generation, tile assignment and rigid motion.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Seed offset, relative to the generation seed.
pub const PLATE_SEED_OFFSET: u64 = 0x5eed_0001;

/// Type of crustal material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrustType {
    /// Thick, light, old.
    Continental,
    /// Thin, dense, young.
    Oceanic,
}

impl CrustType {
    /// Isostatic base elevation relative to a nominal datum (m).
    pub fn base_elevation_m(self) -> f32 {
        match self {
            CrustType::Continental => 400.0,
            CrustType::Oceanic => -3800.0,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            CrustType::Continental => "c",
            CrustType::Oceanic => "o",
        }
    }
}

/// A rigid plate rotating about an axis through the planet center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub id: usize,
    /// Seed point on the unit sphere.
    pub center: Vec3,
    pub crust: CrustType,
    /// Rotation axis scaled by angular speed.
    pub angular_velocity: Vec3,
    /// Share of tiles owned by this plate.
    pub area: f32,
    /// Mean age (Ma).
    pub age: f32,
}

impl Plate {
    /// Surface velocity at `pos`: v = ω × r.
    pub fn velocity_at(&self, pos: Vec3) -> Vec3 {
        self.angular_velocity.cross(pos)
    }
}

/// Uniform random point on the unit sphere.
fn random_unit(rng: &mut ChaCha8Rng) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..1.0);
    let phi: f32 = rng.random_range(0.0..std::f32::consts::TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), z, r * phi.sin())
}

/// Index of the center nearest to `p`.
pub fn nearest_center(p: Vec3, centers: &[Vec3]) -> usize {
    let mut best = 0;
    let mut best_dot = f32::NEG_INFINITY;
    for (i, c) in centers.iter().enumerate() {
        let d = p.dot(*c);
        if d > best_dot {
            best_dot = d;
            best = i;
        }
    }
    best
}

/// Generates `count` plates and assigns every position to one of them.
///
/// Plates are ranked by area; the largest become continental until
/// `continental_fraction` of the tiles is covered.
pub fn generate_plates(
    positions: &[Vec3],
    count: usize,
    continental_fraction: f32,
    velocity_scale: f32,
    seed: u64,
) -> (Vec<Plate>, Vec<usize>) {
    let count = count.max(1);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let centers: Vec<Vec3> = (0..count).map(|_| random_unit(&mut rng)).collect();

    let assignment: Vec<usize> = positions
        .par_iter()
        .map(|&p| nearest_center(p, &centers))
        .collect();

    let total = positions.len().max(1) as f32;
    let mut areas = vec![0.0f32; count];
    for &a in &assignment {
        areas[a] += 1.0 / total;
    }

    let mut ranked: Vec<usize> = (0..count).collect();
    ranked.sort_by(|&a, &b| areas[b].total_cmp(&areas[a]).then(a.cmp(&b)));
    let mut continental = vec![false; count];
    let mut covered = 0.0;
    for &idx in &ranked {
        if covered >= continental_fraction {
            break;
        }
        continental[idx] = true;
        covered += areas[idx];
    }

    let plates = centers
        .iter()
        .enumerate()
        .map(|(id, &center)| {
            let axis = random_unit(&mut rng);
            let speed = velocity_scale * rng.random_range(0.5..1.0);
            let crust = if continental[id] {
                CrustType::Continental
            } else {
                CrustType::Oceanic
            };
            let age = match crust {
                CrustType::Continental => rng.random_range(500.0..3500.0),
                CrustType::Oceanic => rng.random_range(10.0..200.0),
            };
            Plate {
                id,
                center,
                crust,
                angular_velocity: axis * speed,
                area: areas[id],
                age,
            }
        })
        .collect();

    (plates, assignment)
}
