//! Synthetic Lambertian scenes and analytic height fields.
use nalgebra::Vector3;
use photometric_stereo::image::{ImageF32, NormalMap};
use photometric_stereo::LightSample;

/// Five unit directions around the viewing axis, all within 35° of it.
pub fn ring_lights() -> Vec<Vector3<f32>> {
    [
        [0.0, 0.0, 1.0],
        [0.5, 0.1, 1.0],
        [-0.4, 0.3, 1.0],
        [0.1, -0.5, 1.0],
        [-0.3, -0.4, 1.0],
    ]
    .iter()
    .map(|d| Vector3::new(d[0], d[1], d[2]).normalize())
    .collect()
}

/// Render `I_k = albedo · max(0, N · L_k)` for every light.
pub fn render(normals: &NormalMap, albedo: &ImageF32, lights: &[Vector3<f32>]) -> Vec<LightSample> {
    lights
        .iter()
        .map(|l| {
            let img = ImageF32::from_fn(normals.w, normals.h, |x, y| {
                albedo.get(x, y) * normals.get(x, y).dot(l).max(0.0)
            });
            LightSample::new(*l, img)
        })
        .collect()
}

/// Height field sampled on the pixel grid plus the normals of its
/// backward-difference slopes.
pub fn height_field(
    w: usize,
    h: usize,
    d: impl Fn(usize, usize) -> f32,
) -> (ImageF32, NormalMap) {
    let heights = ImageF32::from_fn(w, h, &d);
    let mut normals = NormalMap::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let p = if x == 0 { 0.0 } else { d(x, y) - d(x - 1, y) };
            let q = if y == 0 { 0.0 } else { d(x, y) - d(x, y - 1) };
            normals.set(x, y, Vector3::new(-p, -q, 1.0).normalize());
        }
    }
    (heights, normals)
}

/// Largest `|a − b − (a₀ − b₀)|`, i.e. the error after removing the offset at
/// the top-left corner.
pub fn max_offset_error(a: &ImageF32, b: &ImageF32) -> f32 {
    let offset = a.get(0, 0) - b.get(0, 0);
    a.data
        .iter()
        .zip(&b.data)
        .map(|(x, y)| (x - y - offset).abs())
        .fold(0.0, f32::max)
}
