//! ASCII PLY writer.
//!
//! One vertex per pixel at `(x, y, z) = (column, row, depth · z_scale)` with
//! the pixel normal and a gray colour from albedo normalized by the largest
//! albedo in the map.
use crate::depth::DepthMap;
use crate::error::{Error, Result};
use crate::image::io::ensure_parent_dir;
use crate::image::{ImageF32, ImageView, NormalMap};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PlyOptions {
    /// Drop pixels carrying the zero-normal sentinel.
    pub skip_degenerate: bool,
    /// Multiplier applied to depth values.
    pub z_scale: f32,
}

impl Default for PlyOptions {
    fn default() -> Self {
        Self {
            skip_degenerate: false,
            z_scale: 1.0,
        }
    }
}

pub fn write_ply(
    path: &Path,
    depth: &DepthMap,
    normals: &NormalMap,
    albedo: &ImageF32,
    options: &PlyOptions,
) -> Result<usize> {
    ensure_parent_dir(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    let count = write_ply_to(&mut out, depth, normals, albedo, options)?;
    out.flush()?;
    Ok(count)
}

/// Write the point cloud to `out` and return the number of vertices.
pub fn write_ply_to<W: Write>(
    out: &mut W,
    depth: &DepthMap,
    normals: &NormalMap,
    albedo: &ImageF32,
    options: &PlyOptions,
) -> Result<usize> {
    if depth.dims() != normals.dims() || depth.dims() != albedo.dims() {
        return Err(Error::Config(format!(
            "PLY export needs co-indexed maps, got depth {:?} normals {:?} albedo {:?}",
            depth.dims(),
            normals.dims(),
            albedo.dims()
        )));
    }
    let (w, h) = depth.dims();
    let keep = |x: usize, y: usize| !(options.skip_degenerate && normals.is_degenerate(x, y));
    let count = (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .filter(|&(x, y)| keep(x, y))
        .count();
    let max_albedo = albedo.min_max().map(|(_, hi)| hi).unwrap_or(0.0);

    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "element vertex {count}")?;
    for prop in ["x", "y", "z", "nx", "ny", "nz"] {
        writeln!(out, "property float {prop}")?;
    }
    for prop in ["red", "green", "blue"] {
        writeln!(out, "property uchar {prop}")?;
    }
    writeln!(out, "end_header")?;

    for y in 0..h {
        for x in 0..w {
            if !keep(x, y) {
                continue;
            }
            let n = normals.get(x, y);
            let gray = if max_albedo > 0.0 {
                (albedo.get(x, y) / max_albedo * 255.0).clamp(0.0, 255.0).round() as u8
            } else {
                0
            };
            writeln!(
                out,
                "{} {} {} {} {} {} {gray} {gray} {gray}",
                x,
                y,
                depth.get(x, y) * options.z_scale,
                n.x,
                n.y,
                n.z
            )?;
        }
    }
    Ok(count)
}
