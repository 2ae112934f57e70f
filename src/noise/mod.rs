//! Noise used for relief detail, backed by simdnoise.

mod fractal;

pub use fractal::FractalNoise;
