//! Prefix-sum integration of slope fields.
//!
//! Slopes are read as backward differences: `p(i,j) ≈ D(i,j) − D(i,j−1)` and
//! `q(i,j) ≈ D(i,j) − D(i−1,j)`. Both accumulators start from a zero seed:
//!
//! ```text
//! rowIntegral(0,j) = 0    rowIntegral(i,j) = rowIntegral(i−1,j) + q(i,j)
//! colIntegral(i,0) = 0    colIntegral(i,j) = colIntegral(i,j−1) + p(i,j)
//! ```
//!
//! so the first row of `rowIntegral`, the first column of `colIntegral`, and
//! `depth(0,0)` are exactly zero. The slopes stored in row 0 of `q` and
//! column 0 of `p` never enter the sums.
//!
//! The seed lives in the accumulators, not in the depth map. Under
//! [`IntegrationScheme::AxisSum`] `depth = rowIntegral + colIntegral`, so
//! `depth(0,j)` is the running sum of `p` along row 0 and `depth(i,0)` is the
//! running sum of `q` down column 0. Only `depth(0,0)` is guaranteed zero;
//! the first row and column of the depth map are zero only when the slopes
//! there are.
//!
//! [`IntegrationScheme::AxisSum`]: crate::params::IntegrationScheme::AxisSum
//!
//! Horizontal sums are independent per row and run in parallel with the
//! `parallel` feature; vertical sums accumulate row by row across all columns
//! at once.
use super::slopes::SlopeField;
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// The two independent axis integrals of a slope field.
#[derive(Clone, Debug)]
pub struct AxisIntegrals {
    /// Cumulative `q` down each column.
    pub rows: ImageF32,
    /// Cumulative `p` across each row.
    pub cols: ImageF32,
}

/// Compute both axis integrals of `slopes`.
pub fn axis_integrals(slopes: &SlopeField) -> AxisIntegrals {
    AxisIntegrals {
        rows: column_prefix_sums(&slopes.q),
        cols: row_prefix_sums(&slopes.p),
    }
}

/// `depth = rowIntegral + colIntegral`.
///
/// Reproduces a height field up to a constant when it separates as
/// `f(x) + g(y)`; otherwise the two paths disagree and the result drifts.
pub fn integrate_axis_sum(slopes: &SlopeField) -> ImageF32 {
    let AxisIntegrals { rows, mut cols } = axis_integrals(slopes);
    for (d, r) in cols.data.iter_mut().zip(&rows.data) {
        *d += r;
    }
    cols
}

/// Integrate `p` along row 0 from the corner, then `q` down every column.
///
/// A single path per pixel, so any curl-free field is reproduced up to a
/// constant.
pub fn integrate_row_then_column(slopes: &SlopeField) -> ImageF32 {
    let AxisIntegrals { mut rows, cols } = axis_integrals(slopes);
    if rows.h == 0 {
        return rows;
    }
    let top = cols.row(0).to_vec();
    for y in 0..rows.h {
        for (d, t) in rows.row_mut(y).iter_mut().zip(&top) {
            *d += t;
        }
    }
    rows
}

fn row_prefix_sums(p: &ImageF32) -> ImageF32 {
    let mut out = p.clone();
    if out.w == 0 {
        return out;
    }
    let sweep = |row: &mut [f32]| {
        row[0] = 0.0;
        for x in 1..row.len() {
            row[x] += row[x - 1];
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        let w = out.w;
        out.data.par_chunks_mut(w).for_each(sweep);
    }
    #[cfg(not(feature = "parallel"))]
    {
        let w = out.w;
        out.data.chunks_mut(w).for_each(sweep);
    }
    out
}

fn column_prefix_sums(q: &ImageF32) -> ImageF32 {
    let mut out = q.clone();
    if out.h == 0 {
        return out;
    }
    out.row_mut(0).fill(0.0);
    let w = out.w;
    for y in 1..out.h {
        let (above, below) = out.data.split_at_mut(y * w);
        let prev = &above[(y - 1) * w..];
        for (cur, acc) in below[..w].iter_mut().zip(prev) {
            *cur += acc;
        }
    }
    out
}
