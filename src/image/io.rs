//! I/O helpers for datasets, diagnostic images and JSON.
//!
//! - `load_grayscale_image`: read a BMP/PNG/JPEG into an owned 8-bit buffer.
//! - `load_intensity_image`: same, converted to `ImageF32` with a scale.
//! - `load_dataset`: read `LightSource.txt` and every image it names.
//! - `save_normalized_f32`: min-max normalize a raster into a gray PNG.
//! - `save_normal_map_rgb`: encode normals as RGB `(n + 1) / 2`.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageF32, ImageU8, ImageView, NormalMap};
use crate::error::{Error, Result};
use crate::lights::descriptor::{self, DESCRIPTOR_FILE_NAME};
use crate::lights::LightSample;
use image::{GrayImage, Luma, Rgb, RgbImage};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned 8-bit grayscale buffer with borrowed view conversion.
#[derive(Clone, Debug)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.width,
            data: &self.data,
        }
    }
}

fn unavailable(path: &Path, reason: impl ToString) -> Error {
    Error::DataUnavailable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8> {
    let img = image::open(path)
        .map_err(|e| unavailable(path, e))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok(GrayImageU8::new(width, height, img.into_raw()))
}

/// Load an image as float intensities `pixel · scale`.
pub fn load_intensity_image(path: &Path, scale: f32) -> Result<ImageF32> {
    let gray = load_grayscale_image(path)?;
    Ok(ImageF32::from_u8(&gray.as_view(), scale))
}

/// Load every light sample described by `dir/LightSource.txt`, in file order.
pub fn load_dataset(dir: &Path, scale: f32) -> Result<Vec<LightSample>> {
    let descriptor_path = dir.join(DESCRIPTOR_FILE_NAME);
    let text = fs::read_to_string(&descriptor_path).map_err(|e| unavailable(&descriptor_path, e))?;
    let entries = descriptor::parse(&text)?;
    let mut samples = Vec::with_capacity(entries.len());
    for entry in &entries {
        let path = dir.join(entry.image_file_name());
        let image = load_intensity_image(&path, scale)?;
        debug!(
            "load_dataset: {} {}x{} dir={:?}",
            path.display(),
            image.w,
            image.h,
            entry.direction
        );
        samples.push(LightSample::new(entry.direction, image));
    }
    Ok(samples)
}

/// Save a float raster as gray PNG after min-max normalization to [0, 255].
///
/// Constant rasters map to black; non-finite samples map to black.
pub fn save_normalized_f32(image: &ImageF32, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let (lo, hi) = image.min_max().unwrap_or((0.0, 0.0));
    let range = hi - lo;
    let mut out = GrayImage::new(image.w as u32, image.h as u32);
    for (y, row) in image.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            let v = if range > 0.0 && px.is_finite() {
                ((px - lo) / range * 255.0).clamp(0.0, 255.0)
            } else {
                0.0
            };
            out.put_pixel(x as u32, y as u32, Luma([v.round() as u8]));
        }
    }
    out.save(path).map_err(|e| unavailable(path, e))
}

/// Save normals as an RGB PNG, mapping each component from [-1, 1] to [0, 255].
pub fn save_normal_map_rgb(normals: &NormalMap, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut out = RgbImage::new(normals.w as u32, normals.h as u32);
    for (y, row) in normals.rows().enumerate() {
        for (x, n) in row.iter().enumerate() {
            let enc = |c: f32| ((c + 1.0) * 0.5 * 255.0).clamp(0.0, 255.0).round() as u8;
            out.put_pixel(x as u32, y as u32, Rgb([enc(n.x), enc(n.y), enc(n.z)]));
        }
    }
    out.save(path).map_err(|e| unavailable(path, e))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Config(format!("failed to serialize JSON for {}: {e}", path.display())))?;
    fs::write(path, json)?;
    Ok(())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
