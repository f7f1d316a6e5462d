//! Serializable diagnostics returned alongside a reconstruction.
//!
//! [`ReconstructionReport`] summarises every stage the pipeline ran: the light
//! matrix spectrum, how many pixels fell back to the degenerate sentinel, how
//! grazing normals were handled, the integrability residual, and timings.

pub mod report;
pub mod timing;

pub use report::{InputDescriptor, LightStage, NormalStage, ReconstructionReport};
pub use timing::{StageTiming, TimingBreakdown};
