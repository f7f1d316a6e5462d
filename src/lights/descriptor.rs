//! Light descriptor parsing.
//!
//! The descriptor lives next to the images as `LightSource.txt`. Every
//! non-blank line reads `picN: (x,y,z)` and names the image `picN.bmp`
//! captured under direction `(x, y, z)`. Components may be integers or
//! floats; whitespace around tokens is ignored. Entries keep file order.
use crate::error::{Error, Result};
use nalgebra::Vector3;

/// Descriptor file name expected inside a dataset directory.
pub const DESCRIPTOR_FILE_NAME: &str = "LightSource.txt";

#[derive(Clone, Debug, PartialEq)]
pub struct LightEntry {
    /// `N` in `picN`.
    pub index: u32,
    pub direction: Vector3<f32>,
    /// 1-based line number in the descriptor.
    pub line: usize,
}

impl LightEntry {
    /// Image file name referenced by this entry.
    pub fn image_file_name(&self) -> String {
        format!("pic{}.bmp", self.index)
    }
}

/// Parse descriptor text into entries.
pub fn parse(text: &str) -> Result<Vec<LightEntry>> {
    let mut entries = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        entries.push(parse_line(trimmed, line)?);
    }
    Ok(entries)
}

fn parse_line(text: &str, line: usize) -> Result<LightEntry> {
    let err = |reason: &str| Error::Descriptor {
        line,
        reason: reason.to_string(),
    };

    let (name, coords) = text
        .split_once(':')
        .ok_or_else(|| err("missing ':' separator"))?;
    let index = name
        .trim()
        .strip_prefix("pic")
        .ok_or_else(|| err("entry name must start with 'pic'"))?
        .trim()
        .parse::<u32>()
        .map_err(|e| err(&format!("bad picture index: {e}")))?;

    let inner = coords
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| err("direction must be written as (x,y,z)"))?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(err(&format!(
            "expected 3 direction components, got {}",
            parts.len()
        )));
    }
    let mut d = [0.0f32; 3];
    for (slot, part) in d.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f32>()
            .map_err(|e| err(&format!("bad component '{part}': {e}")))?;
    }

    Ok(LightEntry {
        index,
        direction: Vector3::new(d[0], d[1], d[2]),
        line,
    })
}
