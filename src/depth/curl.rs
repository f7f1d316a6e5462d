//! Integrability check on a slope field.
//!
//! For each interior cell the discrete curl is
//! `(p(i,j) − p(i−1,j)) − (q(i,j) − q(i,j−1))`, zero for slopes taken from a
//! real height field. Cells touching a pixel without a measured slope are
//! skipped. The check only reports; it never changes the depth map.
use super::slopes::SlopeField;
use crate::image::ImageF32;
use serde::Serialize;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurlStats {
    /// Cells that entered the statistics.
    pub cells: usize,
    pub mean_abs: f32,
    pub max_abs: f32,
}

#[derive(Clone, Debug)]
pub struct CurlResidual {
    /// Per-pixel curl, zero on row 0, column 0 and skipped cells.
    pub map: ImageF32,
    pub stats: CurlStats,
}

pub fn curl_residual(slopes: &SlopeField) -> CurlResidual {
    let (w, h) = (slopes.width(), slopes.height());
    let mut map = ImageF32::new(w, h);
    let mut sum = 0.0f64;
    let mut max_abs = 0.0f32;
    let mut cells = 0usize;

    for y in 1..h {
        for x in 1..w {
            let measured = slopes.class_at(x, y).is_measured()
                && slopes.class_at(x, y - 1).is_measured()
                && slopes.class_at(x - 1, y).is_measured();
            if !measured {
                continue;
            }
            let dp_dy = slopes.p.get(x, y) - slopes.p.get(x, y - 1);
            let dq_dx = slopes.q.get(x, y) - slopes.q.get(x - 1, y);
            let c = dp_dy - dq_dx;
            map.set(x, y, c);
            sum += c.abs() as f64;
            max_abs = max_abs.max(c.abs());
            cells += 1;
        }
    }

    let mean_abs = if cells > 0 {
        (sum / cells as f64) as f32
    } else {
        0.0
    };
    CurlResidual {
        map,
        stats: CurlStats {
            cells,
            mean_abs,
            max_abs,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::slopes::SlopeClass;

    fn field(p: ImageF32, q: ImageF32) -> SlopeField {
        let n = p.w * p.h;
        SlopeField {
            p,
            q,
            class: vec![SlopeClass::Valid; n],
        }
    }

    #[test]
    fn gradient_of_height_field_is_curl_free() {
        let d = |x: usize, y: usize| (x * x) as f32 * 0.1 + (x * y) as f32 * 0.3;
        let p = ImageF32::from_fn(6, 5, |x, y| if x == 0 { 0.0 } else { d(x, y) - d(x - 1, y) });
        let q = ImageF32::from_fn(6, 5, |x, y| if y == 0 { 0.0 } else { d(x, y) - d(x, y - 1) });
        let curl = curl_residual(&field(p, q));
        assert_eq!(curl.stats.cells, 20);
        assert!(curl.stats.max_abs < 1e-5, "max={}", curl.stats.max_abs);
    }

    #[test]
    fn rotational_field_is_flagged() {
        // p = −y, q = x circulates around the origin.
        let p = ImageF32::from_fn(4, 4, |_, y| -(y as f32));
        let q = ImageF32::from_fn(4, 4, |x, _| x as f32);
        let curl = curl_residual(&field(p, q));
        assert!((curl.stats.mean_abs - 2.0).abs() < 1e-6);
        assert_eq!(curl.map.get(2, 2), -2.0);
    }

    #[test]
    fn skips_cells_without_measured_slopes() {
        let mut f = field(ImageF32::new(3, 3), ImageF32::new(3, 3));
        f.class[4] = SlopeClass::Degenerate;
        let curl = curl_residual(&f);
        // Interior cells (1,1), (2,1), (1,2), (2,2) all touch (1,1) except (2,2).
        assert_eq!(curl.stats.cells, 1);
    }
}
