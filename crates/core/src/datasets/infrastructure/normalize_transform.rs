use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array3;

use crate::datasets::domain::transform::Transform;

/// Evaluation-protocol transform: resize, RGB channels-first, and map each
/// channel through `(x / 255 - 0.5) / 0.5` into `[-1, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeTransform {
    width: u32,
    height: u32,
}

impl NormalizeTransform {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for NormalizeTransform {
    /// The 112x112 input size shared by the verification protocols.
    fn default() -> Self {
        Self::new(112, 112)
    }
}

impl Transform for NormalizeTransform {
    fn apply(&self, image: &DynamicImage) -> Array3<f32> {
        let resized = image.resize_exact(self.width, self.height, FilterType::Triangle);
        let rgb = resized.to_rgb8();
        let mut tensor = Array3::zeros((3, self.height as usize, self.width as usize));
        for (x, y, pixel) in rgb.enumerate_pixels() {
            for channel in 0..3 {
                tensor[[channel, y as usize, x as usize]] =
                    (pixel[channel] as f32 / 255.0 - 0.5) / 0.5;
            }
        }
        tensor
    }
}
