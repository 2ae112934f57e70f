//! Multi-octave fractal noise sampled on the unit sphere.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

/// Octave stack for sphere-sampled fBm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractalNoise {
    pub octaves: u8,
    pub frequency: f32,
    pub lacunarity: f32,
    pub persistence: f32,
    pub seed: i32,
}

impl Default for FractalNoise {
    fn default() -> Self {
        Self {
            octaves: 5,
            frequency: 1.5,
            lacunarity: 2.0,
            persistence: 0.5,
            seed: 42,
        }
    }
}

impl FractalNoise {
    /// Folds a 64-bit generation seed plus a per-use salt into a noise seed.
    pub fn seeded(seed: u64, salt: u32) -> Self {
        let mixed = seed ^ (seed >> 32) ^ u64::from(salt).wrapping_mul(0x9e37_79b9);
        Self {
            seed: mixed as i32,
            ..Default::default()
        }
    }

    /// Broad, low-frequency variant used for continental-scale relief.
    pub fn broad(seed: u64, salt: u32) -> Self {
        Self {
            octaves: 3,
            frequency: 0.8,
            persistence: 0.6,
            ..Self::seeded(seed, salt)
        }
    }

    /// Samples the stack at `pos`; result is roughly in `[-1, 1]`.
    ///
    /// Uses 4D simplex noise with `w = 0` so sampling on the sphere has no seams.
    pub fn sample(&self, pos: Vec3) -> f32 {
        let mut total = 0.0f32;
        let mut amplitude = 1.0f32;
        let mut frequency = self.frequency;
        let mut max_amplitude = 0.0f32;

        for octave in 0..self.octaves {
            let octave_seed = self.seed.wrapping_add(octave as i32 * 31337);
            let p = pos * frequency;

            let value = NoiseBuilder::fbm_4d_offset(p.x, 1, p.y, 1, p.z, 1, 0.0, 1)
                .with_seed(octave_seed)
                .with_freq(1.0)
                .with_octaves(1)
                .generate()
                .0[0];

            total += value * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }
}
