use std::path::Path;

use image::DynamicImage;

use crate::shared::error::DatasetError;

/// Domain interface for reading one image file.
///
/// Supplied by the training/evaluation harness; the core never decodes
/// pixels itself. Implementations decide their own tolerance policy for
/// damaged files.
pub trait ImageLoader {
    fn load(&self, path: &Path) -> Result<DynamicImage, DatasetError>;
}
