//! Light directions and the light-matrix pseudoinverse.
//!
//! A run consumes an ordered set of [`LightSample`]s, each pairing a light
//! direction with the grayscale image captured under it. Stacking the
//! directions row-wise gives the `n × 3` light matrix `S`; its `3 × n`
//! pseudoinverse `S⁺` turns the intensity vector observed at a pixel into the
//! albedo-scaled normal `b = S⁺ · I`.
//!
//! - [`validate_samples`] enforces the run-level invariants (at least three
//!   samples, identical non-empty image sizes, usable directions).
//! - [`LightMatrix`] holds `S`, `S⁺`, and the SVD spectrum used to build it.
//! - [`descriptor`] parses the `picN: (x,y,z)` light descriptor file.

pub mod descriptor;
mod matrix;

pub use matrix::LightMatrix;

use crate::error::{Error, Result};
use crate::image::{ImageF32, ImageView};
use nalgebra::Vector3;

/// Minimum number of light samples for a determined per-pixel solve.
pub const MIN_LIGHTS: usize = 3;

/// One light direction paired with the image captured under it.
#[derive(Clone, Debug)]
pub struct LightSample {
    pub direction: Vector3<f32>,
    pub image: ImageF32,
}

impl LightSample {
    pub fn new(direction: Vector3<f32>, image: ImageF32) -> Self {
        Self { direction, image }
    }
}

/// Check the run-level invariants and return the shared `(width, height)`.
///
/// Fails on fewer than [`MIN_LIGHTS`] samples, on an empty image, on an image
/// whose size differs from the first sample, or on a direction that is zero
/// or not finite.
pub fn validate_samples(samples: &[LightSample]) -> Result<(usize, usize)> {
    if samples.len() < MIN_LIGHTS {
        return Err(Error::TooFewLights {
            count: samples.len(),
            required: MIN_LIGHTS,
        });
    }
    let expected = samples[0].image.dims();
    for (index, sample) in samples.iter().enumerate() {
        let found = sample.image.dims();
        if found.0 == 0 || found.1 == 0 {
            return Err(Error::EmptyImage { index });
        }
        if found != expected {
            return Err(Error::DimensionMismatch {
                index,
                expected,
                found,
            });
        }
        let d = sample.direction;
        if !d.iter().all(|c| c.is_finite()) || d.norm_squared() == 0.0 {
            return Err(Error::InvalidDirection { index });
        }
    }
    Ok(expected)
}
