pub mod ar_face_dataset;
pub mod cropped_faces_dataset;
pub mod flat_folder_dataset;
pub mod identity_csv_dataset;
pub mod identity_list_dataset;
pub mod ijb_pair_label_dataset;
pub mod ijba_verification_dataset;
pub mod ijbc_verification_dataset;
pub mod image_file_loader;
pub mod mask_matrix_dataset;
pub mod normalize_transform;

use std::path::Path;

use crate::shared::constants::IMAGE_EXTENSIONS;

pub(crate) fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Directory entries with a matching extension, sorted by file name for
/// platform-independent ordering.
pub(crate) fn sorted_files_with_extension(
    dir: &Path,
    extension: &str,
) -> std::io::Result<Vec<std::path::PathBuf>> {
    let mut files: Vec<std::path::PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(extension))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
