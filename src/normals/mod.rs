//! Per-pixel normal and albedo estimation.
//!
//! For every pixel the intensities observed under each light are gathered
//! into `I`, solved as `b = S⁺ · I`, and split into albedo `|b|` and normal
//! `b / |b|`. Pixels with `|b| <= eps` (background, deep shadow) keep the
//! zero normal and zero albedo sentinel.
//!
//! Pixels are independent; with the `parallel` feature rows are processed
//! with rayon, each task owning a disjoint slice of both outputs.

use crate::error::{Error, Result};
use crate::image::{ImageF32, ImageView, NormalMap};
use crate::lights::{LightMatrix, MIN_LIGHTS};
use log::debug;
use nalgebra::Vector3;

/// Normal and albedo maps produced by [`estimate_normals`].
#[derive(Clone, Debug)]
pub struct NormalEstimate {
    pub normals: NormalMap,
    pub albedo: ImageF32,
}

impl NormalEstimate {
    /// Number of pixels carrying the degenerate sentinel.
    pub fn degenerate_count(&self) -> usize {
        self.normals.degenerate_count()
    }
}

/// Estimate normals and albedo for all pixels.
///
/// `images` must be ordered like the directions used to build `lights`, one
/// per direction, all of one non-empty size.
pub fn estimate_normals(
    lights: &LightMatrix,
    images: &[&ImageF32],
    eps: f32,
) -> Result<NormalEstimate> {
    let (w, h) = check_images(lights, images)?;
    let mut normals = NormalMap::new(w, h);
    let mut albedo = ImageF32::new(w, h);

    let row_job = |y: usize, n_row: &mut [Vector3<f32>], a_row: &mut [f32]| {
        let sources: Vec<&[f32]> = images.iter().map(|img| img.row(y)).collect();
        let mut intensities = vec![0.0f32; sources.len()];
        for x in 0..n_row.len() {
            for (slot, src) in intensities.iter_mut().zip(&sources) {
                *slot = src[x];
            }
            let (n, a) = solve_pixel(lights, &intensities, eps);
            n_row[x] = n;
            a_row[x] = a;
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        normals
            .data
            .par_chunks_mut(w)
            .zip(albedo.data.par_chunks_mut(w))
            .enumerate()
            .for_each(|(y, (n_row, a_row))| row_job(y, n_row, a_row));
    }
    #[cfg(not(feature = "parallel"))]
    {
        normals
            .data
            .chunks_mut(w)
            .zip(albedo.data.chunks_mut(w))
            .enumerate()
            .for_each(|(y, (n_row, a_row))| row_job(y, n_row, a_row));
    }

    let estimate = NormalEstimate { normals, albedo };
    debug!(
        "estimate_normals: {}x{} n={} degenerate={}",
        w,
        h,
        lights.light_count(),
        estimate.degenerate_count()
    );
    Ok(estimate)
}

/// One image per light, all of a single non-empty size. Mirrors
/// [`crate::lights::validate_samples`] for callers that bypass it.
/// Returns `(width, height)`.
fn check_images(lights: &LightMatrix, images: &[&ImageF32]) -> Result<(usize, usize)> {
    if images.len() < MIN_LIGHTS {
        return Err(Error::TooFewLights {
            count: images.len(),
            required: MIN_LIGHTS,
        });
    }
    if images.len() != lights.light_count() {
        return Err(Error::SampleCountMismatch {
            lights: lights.light_count(),
            images: images.len(),
        });
    }
    let expected = images[0].dims();
    for (index, img) in images.iter().enumerate() {
        let found = img.dims();
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
    }
    Ok(expected)
}

/// Solve one pixel: returns `(normal, albedo)`, or the zero sentinel when the
/// albedo does not exceed `eps`.
#[inline]
pub fn solve_pixel(lights: &LightMatrix, intensities: &[f32], eps: f32) -> (Vector3<f32>, f32) {
    let b = lights.solve(intensities);
    let albedo = b.norm();
    if albedo > eps && albedo.is_finite() {
        (b / albedo, albedo)
    } else {
        (Vector3::zeros(), 0.0)
    }
}
