//! Parameter types configuring the reconstruction stages.
//!
//! Both per-pixel threshold policies (the albedo sentinel and the grazing
//! normal guard) are exposed as named constants so that callers can reason
//! about their effect on shadows and image borders.

use serde::{Deserialize, Serialize};

/// Albedo at or below this value marks a pixel as degenerate.
pub const DEFAULT_ALBEDO_EPS: f32 = f32::EPSILON;

/// Normals with `|nz|` below this value are treated as grazing.
pub const DEFAULT_MIN_NORMAL_Z: f32 = 1e-3;

/// How slopes are derived for pixels whose normal is nearly parallel to the
/// image plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrazingPolicy {
    /// Raise `|nz|` to the threshold, keeping its sign.
    #[default]
    Clamp,
    /// Mark the pixel as a hole with zero slope.
    Hole,
    /// Mark as a hole, then fill with the mean slope of valid 4-neighbours.
    FillFromNeighbors,
}

/// Path used to turn slope fields into depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationScheme {
    /// `depth = Σ q` down each column `+ Σ p` across each row.
    #[default]
    AxisSum,
    /// Integrate `p` along the first row, then `q` down every column.
    RowThenColumn,
}

/// Slope derivation and integration settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthParams {
    pub min_normal_z: f32,
    pub grazing_policy: GrazingPolicy,
    pub integration: IntegrationScheme,
    /// Compute the discrete curl of the slope field as a diagnostic.
    pub check_integrability: bool,
}

impl Default for DepthParams {
    fn default() -> Self {
        Self {
            min_normal_z: DEFAULT_MIN_NORMAL_Z,
            grazing_policy: GrazingPolicy::default(),
            integration: IntegrationScheme::default(),
            check_integrability: true,
        }
    }
}

/// Pipeline-wide parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionParams {
    /// Degenerate-albedo threshold.
    pub albedo_eps: f32,
    /// Singular-value cutoff for the pseudoinverse. `None` scales with the
    /// largest singular value and the sample count.
    pub svd_tolerance: Option<f64>,
    /// Rescale every light direction to unit length before solving.
    pub normalize_directions: bool,
    /// Multiplier applied to 8-bit samples when loading images.
    pub intensity_scale: f32,
    pub depth: DepthParams,
}

impl Default for ReconstructionParams {
    fn default() -> Self {
        Self {
            albedo_eps: DEFAULT_ALBEDO_EPS,
            svd_tolerance: None,
            normalize_directions: false,
            intensity_scale: 1.0,
            depth: DepthParams::default(),
        }
    }
}
