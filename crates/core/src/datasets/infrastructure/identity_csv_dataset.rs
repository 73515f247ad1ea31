use std::fs;
use std::path::Path;

use crate::datasets::domain::face_dataset::{record_at, FaceDataset};
use crate::shared::error::DatasetError;
use crate::shared::record::FaceRecord;

/// Generic identity list: one `<relative path> <person id>` pair per line,
/// space-delimited, no header.
///
/// Every referenced file must exist under `root` at load time; a dangling
/// reference fails the whole load rather than the first access.
#[derive(Debug)]
pub struct IdentityCsvDataset {
    records: Vec<FaceRecord>,
}

impl IdentityCsvDataset {
    pub fn load(root: &Path, identity_file: &Path) -> Result<Self, DatasetError> {
        let text = fs::read_to_string(identity_file)?;
        let origin = identity_file
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("identity file")
            .to_string();

        let mut records = Vec::new();
        for (line_idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(rel_path), Some(raw_id), None) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(DatasetError::MalformedRecord {
                    origin: origin.clone(),
                    line: line_idx + 1,
                    details: "expected exactly '<path> <person id>'".to_string(),
                });
            };
            let label = raw_id.parse().map_err(|_| DatasetError::MalformedRecord {
                origin: origin.clone(),
                line: line_idx + 1,
                details: format!("person id '{raw_id}' is not an integer"),
            })?;
            let path = root.join(rel_path);
            if !path.exists() {
                return Err(DatasetError::MissingFile(path));
            }
            records.push(FaceRecord { path, label });
        }
        if records.is_empty() {
            return Err(DatasetError::EmptyPopulation);
        }
        Ok(Self { records })
    }
}

impl FaceDataset for IdentityCsvDataset {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn record(&self, index: usize) -> Result<&FaceRecord, DatasetError> {
        record_at(&self.records, index)
    }
}
