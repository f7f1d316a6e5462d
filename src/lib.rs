#![doc = include_str!("../README.md")]

pub mod config;
pub mod depth;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod image;
pub mod lights;
pub mod normals;
pub mod params;
pub mod pipeline;

// --- High-level re-exports -------------------------------------------------

pub use crate::depth::{integrate_normals, DepthMap, DepthResult};
pub use crate::diagnostics::ReconstructionReport;
pub use crate::error::{Error, Result};
pub use crate::lights::{LightMatrix, LightSample};
pub use crate::normals::{estimate_normals, NormalEstimate};
pub use crate::params::{DepthParams, GrazingPolicy, IntegrationScheme, ReconstructionParams};
pub use crate::pipeline::{Reconstruction, Reconstructor};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use photometric_stereo::prelude::*;
/// use nalgebra::Vector3;
///
/// # fn main() -> photometric_stereo::Result<()> {
/// let (w, h) = (64usize, 48usize);
/// let samples: Vec<LightSample> = [[0.0, 0.0, 1.0], [0.5, 0.0, 1.0], [0.0, 0.5, 1.0]]
///     .iter()
///     .map(|d| LightSample::new(Vector3::new(d[0], d[1], d[2]), ImageF32::new(w, h)))
///     .collect();
///
/// let rec = Reconstructor::new(ReconstructionParams::default()).run(&samples)?;
/// println!("{}", rec.report.summary());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageF32, NormalMap};
    pub use crate::{LightSample, Reconstruction, ReconstructionParams, Reconstructor};
}
