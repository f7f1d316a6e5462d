//! Reconstruction pipeline: light matrix → normals/albedo → depth.
//!
//! [`Reconstructor::run`] validates the samples and parameters up front, so
//! every configuration error surfaces before any per-pixel work. Pixel-level
//! degeneracies are absorbed into the output rasters and counted in the
//! [`ReconstructionReport`].
use crate::depth::{integrate_normals, CurlResidual, DepthMap, SlopeField};
use crate::diagnostics::{
    InputDescriptor, LightStage, NormalStage, ReconstructionReport, TimingBreakdown,
};
use crate::error::{Error, Result};
use crate::image::{ImageF32, NormalMap};
use crate::lights::{validate_samples, LightMatrix, LightSample};
use crate::normals::estimate_normals;
use crate::params::ReconstructionParams;
use log::info;
use nalgebra::Vector3;

/// Everything produced by one run.
#[derive(Clone, Debug)]
pub struct Reconstruction {
    pub normals: NormalMap,
    /// Diagnostic only; depth does not depend on it.
    pub albedo: ImageF32,
    pub depth: DepthMap,
    pub slopes: SlopeField,
    pub curl: Option<CurlResidual>,
    pub report: ReconstructionReport,
}

#[derive(Clone, Debug, Default)]
pub struct Reconstructor {
    params: ReconstructionParams,
}

impl Reconstructor {
    pub fn new(params: ReconstructionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ReconstructionParams {
        &self.params
    }

    /// Reject parameter values that would make the thresholds meaningless.
    pub fn validate_params(&self) -> Result<()> {
        let p = &self.params;
        if !(p.albedo_eps.is_finite() && p.albedo_eps >= 0.0) {
            return Err(Error::Config(format!(
                "albedo_eps must be finite and >= 0, got {}",
                p.albedo_eps
            )));
        }
        if !(p.depth.min_normal_z > 0.0 && p.depth.min_normal_z <= 1.0) {
            return Err(Error::Config(format!(
                "min_normal_z must lie in (0, 1], got {}",
                p.depth.min_normal_z
            )));
        }
        if let Some(tol) = p.svd_tolerance {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(Error::Config(format!(
                    "svd_tolerance must be finite and >= 0, got {tol}"
                )));
            }
        }
        if !(p.intensity_scale.is_finite() && p.intensity_scale > 0.0) {
            return Err(Error::Config(format!(
                "intensity_scale must be finite and > 0, got {}",
                p.intensity_scale
            )));
        }
        Ok(())
    }

    /// Build the light matrix and its pseudoinverse for `samples`.
    pub fn solve_lights(&self, samples: &[LightSample]) -> Result<LightMatrix> {
        validate_samples(samples)?;
        self.build_light_matrix(samples)
    }

    /// Light matrix for samples that already passed [`validate_samples`].
    fn build_light_matrix(&self, samples: &[LightSample]) -> Result<LightMatrix> {
        let directions: Vec<Vector3<f32>> = samples
            .iter()
            .map(|s| {
                if self.params.normalize_directions {
                    s.direction.normalize()
                } else {
                    s.direction
                }
            })
            .collect();
        LightMatrix::from_directions(&directions, self.params.svd_tolerance)
    }

    pub fn run(&self, samples: &[LightSample]) -> Result<Reconstruction> {
        self.validate_params()?;
        let (width, height) = validate_samples(samples)?;
        let mut timings = TimingBreakdown::default();

        let lights = timings.measure("lights", || self.build_light_matrix(samples))?;

        let images: Vec<&ImageF32> = samples.iter().map(|s| &s.image).collect();
        let estimate = timings.measure("normals", || {
            estimate_normals(&lights, &images, self.params.albedo_eps)
        })?;

        let depth = timings.measure("depth", || {
            integrate_normals(&estimate.normals, &self.params.depth)
        });

        let degenerate = estimate.degenerate_count();
        let (albedo_min, albedo_max) = valid_albedo_range(&estimate.albedo, &estimate.normals);
        let report = ReconstructionReport {
            input: InputDescriptor {
                width,
                height,
                light_count: samples.len(),
            },
            lights: LightStage {
                singular_values: lights.singular_values().to_vec(),
                tolerance: lights.tolerance(),
                rank: lights.rank(),
                condition_number: lights.condition_number(),
            },
            normals: NormalStage {
                valid_pixels: width * height - degenerate,
                degenerate_pixels: degenerate,
                albedo_eps: self.params.albedo_eps,
                albedo_min,
                albedo_max,
            },
            slopes: depth.slopes.stats(),
            grazing_policy: self.params.depth.grazing_policy,
            integration: self.params.depth.integration,
            curl: depth.curl.as_ref().map(|c| c.stats.clone()),
            timings,
        };
        info!(
            "reconstructed {}x{} from {} lights: {} degenerate pixels, {:.2} ms",
            width,
            height,
            samples.len(),
            degenerate,
            report.timings.total_ms
        );

        Ok(Reconstruction {
            normals: estimate.normals,
            albedo: estimate.albedo,
            depth: depth.depth,
            slopes: depth.slopes,
            curl: depth.curl,
            report,
        })
    }
}

fn valid_albedo_range(albedo: &ImageF32, normals: &NormalMap) -> (f32, f32) {
    albedo
        .data
        .iter()
        .zip(&normals.data)
        .filter(|(_, n)| **n != Vector3::zeros())
        .map(|(a, _)| *a)
        .fold(None, |acc: Option<(f32, f32)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or((0.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DepthParams;

    fn flat_samples() -> Vec<LightSample> {
        let dirs = [
            Vector3::new(0.0f32, 0.0, 1.0),
            Vector3::new(0.5, 0.0, 1.0),
            Vector3::new(0.0, 0.5, 1.0),
        ];
        dirs.iter()
            .map(|d| {
                let v = 0.8 * d.normalize().z;
                LightSample::new(d.normalize(), ImageF32::from_fn(4, 4, |_, _| v))
            })
            .collect()
    }

    #[test]
    fn flat_scene_reports_all_pixels_valid() {
        let rec = Reconstructor::default().run(&flat_samples()).unwrap();
        assert_eq!(rec.report.normals.valid_pixels, 16);
        assert_eq!(rec.report.lights.rank, 3);
        assert!((rec.report.normals.albedo_max - 0.8).abs() < 1e-4);
        assert!(rec.depth.data.iter().all(|d| d.abs() < 1e-4));
        assert_eq!(rec.report.timings.stages.len(), 3);
    }

    #[test]
    fn invalid_params_abort_before_work() {
        let params = ReconstructionParams {
            depth: DepthParams {
                min_normal_z: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = Reconstructor::new(params).run(&flat_samples()).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
    }

    #[test]
    fn mismatched_sample_is_rejected_by_run_and_solve_lights() {
        let mut samples = flat_samples();
        samples[1].image = ImageF32::new(3, 4);
        let err = Reconstructor::default().run(&samples).unwrap_err();
        assert!(
            matches!(err, Error::DimensionMismatch { index: 1, .. }),
            "{err}"
        );

        let mut samples = flat_samples();
        samples[2].direction = Vector3::zeros();
        let err = Reconstructor::default().solve_lights(&samples).unwrap_err();
        assert!(matches!(err, Error::InvalidDirection { index: 2 }), "{err}");
    }

    #[test]
    fn report_serializes_to_camel_case_json() {
        let rec = Reconstructor::default().run(&flat_samples()).unwrap();
        let json = serde_json::to_value(&rec.report).unwrap();
        assert_eq!(json["input"]["lightCount"], 3);
        assert_eq!(json["normals"]["degeneratePixels"], 0);
        assert_eq!(json["integration"], "axis_sum");
        assert!(json["curl"]["cells"].is_number());
        assert!(rec.report.summary().contains("rank 3"));
    }
}
