//! Slope fields `p = −nx/nz` (∂depth/∂x) and `q = −ny/nz` (∂depth/∂y).
//!
//! Every pixel is classified so that nothing downstream sees an unchecked
//! division by a vanishing `nz`:
//! - zero-normal sentinels get zero slope ([`SlopeClass::Degenerate`]);
//! - grazing normals (`|nz| < min_normal_z`) follow the [`GrazingPolicy`];
//! - everything else is [`SlopeClass::Valid`].
use crate::image::{ImageF32, ImageView, NormalMap};
use crate::params::GrazingPolicy;
use nalgebra::Vector3;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlopeClass {
    Valid,
    /// Grazing normal whose `nz` was raised to the threshold.
    Clamped,
    /// Zero-normal sentinel from the estimator.
    Degenerate,
    /// Grazing normal left at zero slope.
    Hole,
    /// Grazing normal filled from its neighbours.
    Filled,
}

impl SlopeClass {
    /// True for pixels whose slope carries surface information.
    #[inline]
    pub fn is_measured(self) -> bool {
        matches!(self, Self::Valid | Self::Clamped | Self::Filled)
    }
}

/// Horizontal (`p`) and vertical (`q`) slopes with per-pixel class.
#[derive(Clone, Debug)]
pub struct SlopeField {
    pub p: ImageF32,
    pub q: ImageF32,
    pub class: Vec<SlopeClass>,
}

impl SlopeField {
    pub fn width(&self) -> usize {
        self.p.w
    }

    pub fn height(&self) -> usize {
        self.p.h
    }

    #[inline]
    pub fn class_at(&self, x: usize, y: usize) -> SlopeClass {
        self.class[y * self.p.w + x]
    }

    pub fn stats(&self) -> SlopeStats {
        let mut stats = SlopeStats::default();
        for c in &self.class {
            match c {
                SlopeClass::Valid => stats.valid += 1,
                SlopeClass::Clamped => stats.clamped += 1,
                SlopeClass::Degenerate => stats.degenerate += 1,
                SlopeClass::Hole => stats.holes += 1,
                SlopeClass::Filled => stats.filled += 1,
            }
        }
        stats
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlopeStats {
    pub valid: usize,
    pub clamped: usize,
    pub degenerate: usize,
    pub holes: usize,
    pub filled: usize,
}

/// Slopes of one normal under the grazing guard.
#[inline]
fn pixel_slope(n: Vector3<f32>, min_normal_z: f32, policy: GrazingPolicy) -> (f32, f32, SlopeClass) {
    if n == Vector3::zeros() || !n.iter().all(|c| c.is_finite()) {
        return (0.0, 0.0, SlopeClass::Degenerate);
    }
    let mut nz = n.z;
    let mut class = SlopeClass::Valid;
    if nz.abs() < min_normal_z {
        match policy {
            GrazingPolicy::Clamp => {
                nz = min_normal_z.copysign(nz);
                class = SlopeClass::Clamped;
            }
            GrazingPolicy::Hole | GrazingPolicy::FillFromNeighbors => {
                return (0.0, 0.0, SlopeClass::Hole);
            }
        }
    }
    (-n.x / nz, -n.y / nz, class)
}

/// Derive the slope field of `normals`.
pub fn compute_slopes(normals: &NormalMap, min_normal_z: f32, policy: GrazingPolicy) -> SlopeField {
    let (w, h) = normals.dims();
    let mut p = ImageF32::new(w, h);
    let mut q = ImageF32::new(w, h);
    let mut class = vec![SlopeClass::Valid; w * h];
    if w == 0 || h == 0 {
        return SlopeField { p, q, class };
    }

    let row_job = |y: usize, p_row: &mut [f32], q_row: &mut [f32], c_row: &mut [SlopeClass]| {
        for (x, n) in normals.row(y).iter().enumerate() {
            let (px, qx, c) = pixel_slope(*n, min_normal_z, policy);
            p_row[x] = px;
            q_row[x] = qx;
            c_row[x] = c;
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        p.data
            .par_chunks_mut(w)
            .zip(q.data.par_chunks_mut(w))
            .zip(class.par_chunks_mut(w))
            .enumerate()
            .for_each(|(y, ((p_row, q_row), c_row))| row_job(y, p_row, q_row, c_row));
    }
    #[cfg(not(feature = "parallel"))]
    {
        p.data
            .chunks_mut(w)
            .zip(q.data.chunks_mut(w))
            .zip(class.chunks_mut(w))
            .enumerate()
            .for_each(|(y, ((p_row, q_row), c_row))| row_job(y, p_row, q_row, c_row));
    }

    let mut field = SlopeField { p, q, class };
    if policy == GrazingPolicy::FillFromNeighbors {
        fill_holes(&mut field);
    }
    field
}

/// Replace each hole by the mean slope of its measured 4-neighbours.
///
/// Reads only pixels measured before the pass, so the result does not depend
/// on scan order. Holes without a measured neighbour stay at zero.
fn fill_holes(field: &mut SlopeField) {
    let (w, h) = (field.width(), field.height());
    let mut fills = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if field.class_at(x, y) != SlopeClass::Hole {
                continue;
            }
            let mut sum_p = 0.0f32;
            let mut sum_q = 0.0f32;
            let mut count = 0usize;
            let neighbours = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbours {
                if nx >= w || ny >= h {
                    continue;
                }
                let c = field.class_at(nx, ny);
                if c == SlopeClass::Valid || c == SlopeClass::Clamped {
                    sum_p += field.p.get(nx, ny);
                    sum_q += field.q.get(nx, ny);
                    count += 1;
                }
            }
            if count > 0 {
                fills.push((x, y, sum_p / count as f32, sum_q / count as f32));
            }
        }
    }
    for (x, y, pv, qv) in fills {
        field.p.set(x, y, pv);
        field.q.set(x, y, qv);
        field.class[y * w + x] = SlopeClass::Filled;
    }
}
