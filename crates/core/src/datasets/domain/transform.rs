use image::DynamicImage;
use ndarray::Array3;

/// Domain interface for converting a decoded image into a fixed-shape
/// numeric tensor, invoked once per image by the caller's batching layer.
pub trait Transform {
    /// Produces a `(channels, height, width)` tensor.
    fn apply(&self, image: &DynamicImage) -> Array3<f32>;
}
