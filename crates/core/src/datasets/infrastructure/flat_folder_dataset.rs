use std::fs;
use std::path::{Path, PathBuf};

use crate::datasets::domain::face_dataset::{record_at, FaceDataset};
use crate::datasets::domain::label_vocabulary::LabelVocabulary;
use crate::shared::error::DatasetError;
use crate::shared::record::FaceRecord;

use super::is_image_file;

/// Directory-per-identity dataset: `root/<person>/<images>`.
///
/// Directory and file listings are sorted before labels are assigned, so the
/// first-seen label order is stable across platforms.
#[derive(Debug)]
pub struct FlatFolderDataset {
    records: Vec<FaceRecord>,
    vocabulary: LabelVocabulary,
}

impl FlatFolderDataset {
    pub fn load(root: &Path) -> Result<Self, DatasetError> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        let mut vocabulary = LabelVocabulary::new();
        let mut records = Vec::new();
        for dir in dirs {
            let Some(name) = dir.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| is_image_file(path))
                .collect();
            files.sort();
            if files.is_empty() {
                continue;
            }
            let label = vocabulary.label_for(name);
            records.extend(files.into_iter().map(|path| FaceRecord { path, label }));
        }
        if records.is_empty() {
            return Err(DatasetError::EmptyPopulation);
        }
        log::info!(
            "scanned {}: {} records across {} identities",
            root.display(),
            records.len(),
            vocabulary.len()
        );
        Ok(Self {
            records,
            vocabulary,
        })
    }

    /// Number of distinct identities.
    pub fn class_count(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }
}

impl FaceDataset for FlatFolderDataset {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn record(&self, index: usize) -> Result<&FaceRecord, DatasetError> {
        record_at(&self.records, index)
    }
}
