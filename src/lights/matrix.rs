//! Light matrix `S` and its SVD-based pseudoinverse.
//!
//! `S = U·Σ·Vᵗ`; singular values above the tolerance are inverted, the rest
//! are replaced by zero, and `S⁺ = V·Σ⁺·Uᵗ`. For three independent
//! directions this is the exact inverse; for more it is the least-squares
//! solution; for rank-deficient sets it is the minimum-norm solution, which
//! leaves the missing directions degenerate without failing.
//!
//! The decomposition runs in f64 and the result is stored in f32 to match
//! the image rasters it multiplies.
use super::MIN_LIGHTS;
use crate::error::{Error, Result};
use log::{debug, warn};
use nalgebra::{DMatrix, Matrix3xX, Vector3};

#[derive(Clone, Debug)]
pub struct LightMatrix {
    /// `n × 3`, row `k` = direction of sample `k`.
    s: DMatrix<f64>,
    /// `3 × n` pseudoinverse.
    pinv: Matrix3xX<f32>,
    singular_values: Vec<f64>,
    tolerance: f64,
    rank: usize,
}

impl LightMatrix {
    /// Build `S` from `directions` and pseudo-invert it.
    ///
    /// `tolerance` is the singular-value cutoff; `None` selects
    /// `max(n, 3) · σ_max · f64::EPSILON`.
    pub fn from_directions(directions: &[Vector3<f32>], tolerance: Option<f64>) -> Result<Self> {
        let n = directions.len();
        if n < MIN_LIGHTS {
            return Err(Error::TooFewLights {
                count: n,
                required: MIN_LIGHTS,
            });
        }

        if let Some(index) = directions
            .iter()
            .position(|d| !d.iter().all(|c| c.is_finite()))
        {
            return Err(Error::InvalidDirection { index });
        }

        let s = DMatrix::from_fn(n, 3, |r, c| directions[r][c] as f64);
        let svd = s.clone().svd(true, true);
        let u = svd
            .u
            .ok_or_else(|| Error::Decomposition("U not computed".to_string()))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| Error::Decomposition("Vᵗ not computed".to_string()))?;
        let singular_values: Vec<f64> = svd.singular_values.iter().copied().collect();

        let sigma_max = singular_values.iter().copied().fold(0.0f64, f64::max);
        let tolerance =
            tolerance.unwrap_or_else(|| n.max(3) as f64 * sigma_max * f64::EPSILON);

        // V·Σ⁺·Uᵗ with Σ⁺ applied as a column scaling of V.
        let mut v_sigma = v_t.transpose();
        let mut rank = 0usize;
        for (k, &sigma) in singular_values.iter().enumerate() {
            let inv = if sigma > tolerance {
                rank += 1;
                1.0 / sigma
            } else {
                0.0
            };
            v_sigma.column_mut(k).scale_mut(inv);
        }
        let pinv64 = v_sigma * u.transpose();
        let pinv = Matrix3xX::from_fn(n, |r, c| pinv64[(r, c)] as f32);

        if rank < 3 {
            warn!(
                "LightMatrix: rank {} < 3 for {} directions (singular values {:?}), normals degenerate along missing axes",
                rank, n, singular_values
            );
        } else {
            debug!(
                "LightMatrix: n={} singular values {:?} tol={:.3e}",
                n, singular_values, tolerance
            );
        }

        Ok(Self {
            s,
            pinv,
            singular_values,
            tolerance,
            rank,
        })
    }

    /// Number of light samples `n`.
    /// Number of light directions (rows of `S`); never below three.
    pub fn light_count(&self) -> usize {
        self.s.nrows()
    }

    /// The `n × 3` light matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.s
    }

    /// The `3 × n` pseudoinverse.
    pub fn pseudo_inverse(&self) -> &Matrix3xX<f32> {
        &self.pinv
    }

    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Number of singular values kept above the tolerance.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// `σ_max / σ_min`, or `None` when `S` is rank-deficient.
    pub fn condition_number(&self) -> Option<f64> {
        if self.rank < 3 {
            return None;
        }
        let max = self.singular_values.iter().copied().fold(0.0f64, f64::max);
        let min = self
            .singular_values
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        Some(max / min)
    }

    /// `b = S⁺ · I` for one pixel's intensity vector (length `n`).
    #[inline]
    pub fn solve(&self, intensities: &[f32]) -> Vector3<f32> {
        debug_assert_eq!(intensities.len(), self.pinv.ncols());
        let mut b = Vector3::zeros();
        for (col, &i) in self.pinv.column_iter().zip(intensities) {
            b += col * i;
        }
        b
    }
}
