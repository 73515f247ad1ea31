use std::path::Path;

use image::{DynamicImage, ImageReader};

use crate::datasets::domain::image_loader::ImageLoader;
use crate::shared::error::DatasetError;

/// Default [`ImageLoader`] backed by the `image` crate.
///
/// The format is sniffed from content rather than trusted from the
/// extension; benchmark archives mix mislabeled JPEG/PNG files.
#[derive(Debug, Default)]
pub struct ImageFileLoader;

impl ImageLoader for ImageFileLoader {
    fn load(&self, path: &Path) -> Result<DynamicImage, DatasetError> {
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|error| DatasetError::ImageDecode {
                path: path.to_path_buf(),
                details: error.to_string(),
            })
    }
}
