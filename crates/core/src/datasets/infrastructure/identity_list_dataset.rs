use std::fs;
use std::path::Path;

use crate::datasets::domain::face_dataset::{record_at, FaceDataset};
use crate::datasets::domain::label_vocabulary::LabelVocabulary;
use crate::shared::constants::{IMPERSONATOR_MARKER, IMPERSONATOR_SUFFIX_LEN};
use crate::shared::error::DatasetError;
use crate::shared::record::FaceRecord;

/// DFW-style dataset listed in a companion text file, one relative path per
/// line (`<split dir>/<identity>/<file>`).
///
/// Impersonator captures are the exception to directory labeling: a file
/// whose path carries the `_I_` marker is identity-keyed by the person being
/// imitated, encoded in the file name, so its identity is the file name with
/// the trailing `_NNN.ext` segment stripped.
#[derive(Debug)]
pub struct IdentityListDataset {
    records: Vec<FaceRecord>,
    vocabulary: LabelVocabulary,
}

impl IdentityListDataset {
    pub fn load(root: &Path, list_path: &Path) -> Result<Self, DatasetError> {
        let text = fs::read_to_string(list_path)?;
        let origin = list_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("identity list")
            .to_string();

        let mut vocabulary = LabelVocabulary::new();
        let mut records = Vec::new();
        for (line_idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let name = identity_name(line).map_err(|details| DatasetError::MalformedRecord {
                origin: origin.clone(),
                line: line_idx + 1,
                details,
            })?;
            let label = vocabulary.label_for(&name);
            records.push(FaceRecord {
                path: root.join(line),
                label,
            });
        }
        if records.is_empty() {
            return Err(DatasetError::EmptyPopulation);
        }
        Ok(Self {
            records,
            vocabulary,
        })
    }

    pub fn class_count(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }
}

impl FaceDataset for IdentityListDataset {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn record(&self, index: usize) -> Result<&FaceRecord, DatasetError> {
        record_at(&self.records, index)
    }
}

/// Identity name for one listed path.
///
/// Regular captures take the second path segment (the identity directory).
/// Paths carrying the impersonator marker take the file name minus its
/// trailing `_NNN.ext` segment instead.
pub(crate) fn identity_name(rel_path: &str) -> Result<String, String> {
    if rel_path.contains(IMPERSONATOR_MARKER) {
        let file_name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        let cut = file_name
            .char_indices()
            .rev()
            .nth(IMPERSONATOR_SUFFIX_LEN - 1)
            .map(|(index, _)| index)
            .filter(|&index| index > 0)
            .ok_or_else(|| {
                format!("impersonator file name '{file_name}' shorter than its suffix")
            })?;
        Ok(file_name[..cut].to_string())
    } else {
        rel_path
            .split('/')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                format!("path '{rel_path}' lacks the <split>/<identity>/<file> layout")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn list(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_identity_from_directory_segment() {
        assert_eq!(
            identity_name("Training_data/Matthew_M/Matthew_M_h_002.jpg").unwrap(),
            "Matthew_M"
        );
    }

    #[test]
    fn test_impersonator_identity_from_file_name() {
        // `_I_` capture: strip the 8-character `_002.jpg` suffix.
        assert_eq!(
            identity_name("Training_data/Impersonators/Matthew_M_I_002.jpg").unwrap(),
            "Matthew_M_I"
        );
    }

    #[test]
    fn test_impersonator_suffix_too_short_fails() {
        assert!(identity_name("a/b/_I_.jpg").is_err());
    }

    #[test]
    fn test_flat_path_without_identity_segment_fails() {
        assert!(identity_name("lonely.jpg").is_err());
    }

    #[test]
    fn test_load_assigns_first_seen_labels() {
        let file = list(&[
            "Training_data/Amy_A/Amy_A_h_001.jpg",
            "Training_data/Bob_B/Bob_B_h_001.jpg",
            "Training_data/Amy_A/Amy_A_h_002.jpg",
            "Training_data/Impersonators/Amy_A_I_001.jpg",
        ]);
        let dataset = IdentityListDataset::load(Path::new("/data/dfw"), file.path()).unwrap();
        assert_eq!(dataset.len(), 4);
        // Amy_A=0, Bob_B=1, and the impersonator identity Amy_A_I=2.
        assert_eq!(dataset.labels(), vec![0, 1, 0, 2]);
        assert_eq!(dataset.class_count(), 3);
        assert_eq!(
            dataset.record(0).unwrap().path,
            Path::new("/data/dfw/Training_data/Amy_A/Amy_A_h_001.jpg")
        );
    }

    #[test]
    fn test_blank_lines_skipped() {
        let file = list(&["Training_data/Amy_A/a_001.jpg", "", "  "]);
        let dataset = IdentityListDataset::load(Path::new("/d"), file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_malformed_line_fails_at_load() {
        let file = list(&["Training_data/Amy_A/a_001.jpg", "orphan.jpg"]);
        let err = IdentityListDataset::load(Path::new("/d"), file.path()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MalformedRecord { line: 2, .. }
        ));
    }

    #[test]
    fn test_empty_list_fails() {
        let file = list(&[]);
        assert!(matches!(
            IdentityListDataset::load(Path::new("/d"), file.path()),
            Err(DatasetError::EmptyPopulation)
        ));
    }
}
