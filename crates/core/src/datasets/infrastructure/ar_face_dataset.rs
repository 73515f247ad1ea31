use std::path::Path;

use crate::datasets::domain::face_dataset::{record_at, FaceDataset};
use crate::shared::error::DatasetError;
use crate::shared::record::{FaceRecord, Label};

use super::sorted_files_with_extension;

/// AR-Face directory: `<session>-<person>-<take>.bmp` files, person id in
/// the second dash-separated field.
///
/// Raw person ids become labels directly — no vocabulary remapping — so
/// label values line up with the dataset's published numbering.
#[derive(Debug)]
pub struct ArFaceDataset {
    records: Vec<FaceRecord>,
}

impl ArFaceDataset {
    pub fn load(root: &Path) -> Result<Self, DatasetError> {
        let files = sorted_files_with_extension(root, "bmp")?;
        let mut records = Vec::with_capacity(files.len());
        for path in files {
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("");
            let label = person_id(name).ok_or_else(|| DatasetError::MalformedRecord {
                origin: root.display().to_string(),
                line: records.len() + 1,
                details: format!("file name '{name}' lacks a numeric <session>-<person>-<take> id"),
            })?;
            records.push(FaceRecord { path, label });
        }
        if records.is_empty() {
            return Err(DatasetError::EmptyPopulation);
        }
        Ok(Self { records })
    }
}

impl FaceDataset for ArFaceDataset {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn record(&self, index: usize) -> Result<&FaceRecord, DatasetError> {
        record_at(&self.records, index)
    }
}

fn person_id(file_name: &str) -> Option<Label> {
    file_name.split('-').nth(1)?.parse().ok()
}
