use super::TimingBreakdown;
use crate::depth::{CurlStats, SlopeStats};
use crate::params::{GrazingPolicy, IntegrationScheme};
use serde::Serialize;

/// Result summary produced by [`Reconstructor::run`](crate::Reconstructor::run).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructionReport {
    pub input: InputDescriptor,
    pub lights: LightStage,
    pub normals: NormalStage,
    pub slopes: SlopeStats,
    pub grazing_policy: GrazingPolicy,
    pub integration: IntegrationScheme,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curl: Option<CurlStats>,
    pub timings: TimingBreakdown,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub light_count: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightStage {
    pub singular_values: Vec<f64>,
    pub tolerance: f64,
    pub rank: usize,
    /// Absent when the light matrix is rank-deficient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_number: Option<f64>,
}

/// Albedo is in the arbitrary units of the input intensities.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalStage {
    pub valid_pixels: usize,
    pub degenerate_pixels: usize,
    pub albedo_eps: f32,
    pub albedo_min: f32,
    pub albedo_max: f32,
}

fn format_optional(val: Option<f64>) -> String {
    val.map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "-".to_string())
}

impl ReconstructionReport {
    /// Multi-line human-readable summary for terminal output.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!(
                "input {}x{} with {} lights",
                self.input.width, self.input.height, self.input.light_count
            ),
            format!(
                "light matrix rank {} cond {} sv {:?}",
                self.lights.rank,
                format_optional(self.lights.condition_number),
                self.lights.singular_values
            ),
            format!(
                "normals valid {} degenerate {} albedo [{:.3}, {:.3}]",
                self.normals.valid_pixels,
                self.normals.degenerate_pixels,
                self.normals.albedo_min,
                self.normals.albedo_max
            ),
            format!(
                "slopes clamped {} holes {} filled {} ({:?}, {:?})",
                self.slopes.clamped,
                self.slopes.holes,
                self.slopes.filled,
                self.grazing_policy,
                self.integration
            ),
        ];
        if let Some(c) = &self.curl {
            lines.push(format!(
                "curl mean {:.4e} max {:.4e} over {} cells",
                c.mean_abs, c.max_abs, c.cells
            ));
        }
        lines.push(format!("total {:.2} ms", self.timings.total_ms));
        lines.join("\n")
    }
}
