use crate::render_config::VolumeProperty;

use image::RgbaImage;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::s;
use rayon::prelude::*;

/// A scalar field in modality units, indexed (depth, height, width).
#[derive(Clone, Debug, Default)]
pub struct Volume {
    data: Array3<f32>,
    spacing: (f32, f32, f32),
}

impl Volume {
    pub fn new(data: Array3<f32>, spacing: (f32, f32, f32)) -> Self {
        Self { data, spacing }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Pixel spacing (row, column) and slice thickness, in millimetres
    pub fn spacing(&self) -> (f32, f32, f32) {
        self.spacing
    }

    /// Smallest and largest scalar value, or `None` for an empty volume.
    pub fn scalar_range(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })
    }

    #[inline]
    fn unit_to_u8(value: f32) -> u8 {
        (value * 255.0).round().clamp(0.0, 255.0) as u8
    }

    /// Classify the axial slice at `index` through the colour and scalar opacity
    /// transfer functions.
    ///
    /// Each voxel becomes one RGBA pixel; no compositing along the view direction
    /// is done.
    pub fn axial_preview(&self, index: usize, property: &VolumeProperty) -> Option<RgbaImage> {
        if index >= self.dim().0 {
            return None;
        }
        let slice = self.data.slice(s![index, .., ..]);
        Self::classify_slice(&slice, property)
    }

    fn classify_slice(slice: &ArrayView2<'_, f32>, property: &VolumeProperty) -> Option<RgbaImage> {
        let (height, width) = slice.dim();
        let pixels: Vec<[u8; 4]> = slice
            .into_par_iter()
            .map(|&v| {
                let [r, g, b] = property.color.sample(v);
                let a = property.scalar_opacity.value_at(v);
                [r, g, b, a].map(Self::unit_to_u8)
            })
            .collect();

        RgbaImage::from_raw(
            width as u32,
            height as u32,
            pixels.into_iter().flatten().collect(),
        )
    }
}
