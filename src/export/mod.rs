//! Point-cloud export of a reconstruction.

pub mod ply;

pub use ply::{write_ply, write_ply_to, PlyOptions};
