use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::datasets::domain::face_box::FaceBox;
use crate::protocol::infrastructure::table_reader::{Delimiter, Table};
use crate::shared::error::DatasetError;

/// One capture of an IJB-A template: the source image plus its annotated
/// face crop box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IjbaEntry {
    pub template_id: String,
    pub subject_id: String,
    /// Path below `images/`, with the annotation's `frame/` prefix already
    /// corrected to `frames/`.
    pub file: PathBuf,
    pub face_box: FaceBox,
}

/// One IJB-A comparison resolved to both templates' captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IjbaComparison {
    pub comparison_index: usize,
    pub first: Vec<IjbaEntry>,
    pub second: Vec<IjbaEntry>,
    pub is_same: bool,
}

/// IJB-A verification split: `verify_metadata_<n>.csv` joined against the
/// headerless `verify_comparisons_<n>.csv`.
///
/// With `only_first_image` set, each side is truncated to its first capture,
/// which is how single-image probes are evaluated.
#[derive(Debug)]
pub struct IjbaVerificationDataset {
    entries: Vec<IjbaEntry>,
    by_template: HashMap<String, Vec<usize>>,
    comparisons: Vec<(String, String)>,
    only_first_image: bool,
}

impl IjbaVerificationDataset {
    /// Loads one split (e.g. `split1`) from `<root>/IJB-A_11_sets/<split>/`.
    pub fn from_dir(
        root: &Path,
        split_name: &str,
        only_first_image: bool,
    ) -> Result<Self, DatasetError> {
        let split_root = root.join("IJB-A_11_sets").join(split_name);
        let split_number = split_name.strip_prefix("split").unwrap_or(split_name);
        let metadata = Table::from_path(
            &split_root.join(format!("verify_metadata_{split_number}.csv")),
            Delimiter::Comma,
        )?;
        let comparisons = Table::from_path_with_columns(
            &split_root.join(format!("verify_comparisons_{split_number}.csv")),
            Delimiter::Comma,
            &["TEMPLATE_ID1", "TEMPLATE_ID2"],
        )?;
        Self::from_tables(&metadata, &comparisons, only_first_image)
    }

    pub fn from_tables(
        metadata: &Table,
        comparisons: &Table,
        only_first_image: bool,
    ) -> Result<Self, DatasetError> {
        metadata.require_columns(&[
            "TEMPLATE_ID",
            "SUBJECT_ID",
            "FILE",
            "FACE_X",
            "FACE_Y",
            "FACE_WIDTH",
            "FACE_HEIGHT",
        ])?;

        let mut entries = Vec::with_capacity(metadata.len());
        let mut by_template: HashMap<String, Vec<usize>> = HashMap::new();
        for row in 0..metadata.len() {
            let template_id = metadata.cell(row, "TEMPLATE_ID")?.to_string();
            let face_box = FaceBox::from_origin_size(
                numeric_cell(metadata, row, "FACE_X")?,
                numeric_cell(metadata, row, "FACE_Y")?,
                numeric_cell(metadata, row, "FACE_WIDTH")?,
                numeric_cell(metadata, row, "FACE_HEIGHT")?,
            );
            by_template
                .entry(template_id.clone())
                .or_default()
                .push(entries.len());
            entries.push(IjbaEntry {
                template_id,
                subject_id: metadata.cell(row, "SUBJECT_ID")?.to_string(),
                file: fixed_file_name(metadata.cell(row, "FILE")?),
                face_box,
            });
        }

        let mut pairs = Vec::with_capacity(comparisons.len());
        for row in 0..comparisons.len() {
            pairs.push((
                comparisons.cell(row, "TEMPLATE_ID1")?.to_string(),
                comparisons.cell(row, "TEMPLATE_ID2")?.to_string(),
            ));
        }

        Ok(Self {
            entries,
            by_template,
            comparisons: pairs,
            only_first_image,
        })
    }

    /// Number of comparisons in the split.
    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    pub fn comparison(&self, index: usize) -> Result<IjbaComparison, DatasetError> {
        let (template_1, template_2) =
            self.comparisons
                .get(index)
                .ok_or(DatasetError::IndexOutOfBounds {
                    index,
                    len: self.comparisons.len(),
                })?;
        let first = self.template_entries(template_1)?;
        let second = self.template_entries(template_2)?;
        let is_same = match (first.first(), second.first()) {
            (Some(a), Some(b)) => a.subject_id == b.subject_id,
            _ => false,
        };
        Ok(IjbaComparison {
            comparison_index: index,
            first,
            second,
            is_same,
        })
    }

    fn template_entries(&self, template_id: &str) -> Result<Vec<IjbaEntry>, DatasetError> {
        let rows = self
            .by_template
            .get(template_id)
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| DatasetError::MissingTemplate {
                template_id: template_id.to_string(),
            })?;
        let take = if self.only_first_image { 1 } else { rows.len() };
        Ok(rows
            .iter()
            .take(take)
            .map(|&row| self.entries[row].clone())
            .collect())
    }
}

/// Some annotation rows say `frame/...` where the archive directory is
/// `frames/...`.
fn fixed_file_name(raw: &str) -> PathBuf {
    match raw.strip_prefix("frame/") {
        Some(rest) => PathBuf::from("frames").join(rest),
        None => PathBuf::from(raw),
    }
}

fn numeric_cell(table: &Table, row: usize, column: &str) -> Result<i64, DatasetError> {
    let cell = table.cell(row, column)?;
    cell.parse::<f64>()
        .map(|value| value.round() as i64)
        .map_err(|_| DatasetError::MalformedRecord {
            origin: table.name().to_string(),
            line: row + 2,
            details: format!("{column} '{cell}' is not numeric"),
        })
}
