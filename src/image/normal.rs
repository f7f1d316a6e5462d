//! Owned raster of surface normals co-indexed with the input images.
//!
//! Each entry is either a unit vector or the zero vector, the sentinel for a
//! pixel without measurable reflectance.
use nalgebra::Vector3;

#[derive(Clone, Debug, PartialEq)]
pub struct NormalMap {
    pub w: usize,
    pub h: usize,
    pub stride: usize,
    pub data: Vec<Vector3<f32>>,
}

impl NormalMap {
    /// Zero-filled map, i.e. every pixel starts as the degenerate sentinel.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![Vector3::zeros(); w * h],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Vector3<f32> {
        self.data[self.idx(x, y)]
    }
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, n: Vector3<f32>) {
        let i = self.idx(x, y);
        self.data[i] = n;
    }

    /// True when the pixel carries the zero-normal sentinel.
    #[inline]
    pub fn is_degenerate(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Vector3::zeros()
    }

    pub fn degenerate_count(&self) -> usize {
        self.data.iter().filter(|n| **n == Vector3::zeros()).count()
    }
}

impl crate::image::traits::ImageView for NormalMap {
    type Pixel = Vector3<f32>;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[Vector3<f32>] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
    #[inline]
    fn as_slice(&self) -> Option<&[Vector3<f32>]> {
        (self.stride == self.w).then_some(&self.data[..self.w * self.h])
    }
}

impl crate::image::traits::ImageViewMut for NormalMap {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [Vector3<f32>] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }

    #[inline]
    fn as_mut_slice(&mut self) -> Option<&mut [Vector3<f32>]> {
        if self.stride == self.w {
            Some(&mut self.data[..self.w * self.h])
        } else {
            None
        }
    }
}
