//! Normal-field integration into a relative depth map.
//!
//! Two steps:
//! - [`slopes`] turns normals into horizontal/vertical slope fields under an
//!   explicit policy for grazing normals and zero-normal sentinels.
//! - [`integrate`] sums slopes from a zero seed at the top-left corner.
//!
//! The result is defined only up to an additive constant. The integrator is
//! path based rather than a global least-squares solve, so noisy (non
//! curl-free) normals produce seams and drift; [`curl`] measures how far a
//! slope field is from integrable without altering the output.

pub mod curl;
pub mod integrate;
pub mod slopes;

pub use curl::{curl_residual, CurlResidual, CurlStats};
pub use integrate::{axis_integrals, integrate_axis_sum, integrate_row_then_column, AxisIntegrals};
pub use slopes::{compute_slopes, SlopeClass, SlopeField, SlopeStats};

use crate::image::{ImageF32, NormalMap};
use crate::params::{DepthParams, IntegrationScheme};
use log::{debug, warn};

/// Relative height per pixel, top-left corner at zero.
pub type DepthMap = ImageF32;

#[derive(Clone, Debug)]
pub struct DepthResult {
    pub depth: DepthMap,
    pub slopes: SlopeField,
    pub curl: Option<CurlResidual>,
}

/// Run slope derivation, integration and (optionally) the curl check.
pub fn integrate_normals(normals: &NormalMap, params: &DepthParams) -> DepthResult {
    let slopes = compute_slopes(normals, params.min_normal_z, params.grazing_policy);
    let stats = slopes.stats();
    let total = slopes.class.len().max(1);
    let grazing = stats.clamped + stats.holes + stats.filled;
    if grazing * 100 >= total {
        warn!(
            "integrate_normals: {} of {} pixels have grazing normals (policy {:?})",
            grazing, total, params.grazing_policy
        );
    }

    let depth = match params.integration {
        IntegrationScheme::AxisSum => integrate_axis_sum(&slopes),
        IntegrationScheme::RowThenColumn => integrate_row_then_column(&slopes),
    };

    let curl = params.check_integrability.then(|| curl_residual(&slopes));
    if let Some(c) = &curl {
        debug!(
            "integrate_normals: curl mean={:.4e} max={:.4e} over {} cells",
            c.stats.mean_abs, c.stats.max_abs, c.stats.cells
        );
    }

    DepthResult {
        depth,
        slopes,
        curl,
    }
}
