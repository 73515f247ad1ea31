use std::path::{Path, PathBuf};

use crate::protocol::domain::verification::downsample_indices;
use crate::protocol::infrastructure::table_reader::{Delimiter, Table};
use crate::shared::error::DatasetError;

use super::ijbc_verification_dataset::VerificationItem;

/// Which IJB release a `meta/` directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IjbVariant {
    IjbB,
    IjbC,
}

impl IjbVariant {
    fn pair_label_file(self) -> &'static str {
        match self {
            IjbVariant::IjbB => "ijbb_template_pair_label.txt",
            IjbVariant::IjbC => "ijbc_template_pair_label.txt",
        }
    }

    pub(crate) fn landmark_file(self) -> &'static str {
        match self {
            IjbVariant::IjbB => "ijbb_name_5pts_score.txt",
            IjbVariant::IjbC => "ijbc_name_5pts_score.txt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PairLabelRow {
    template_id_1: String,
    template_id_2: String,
    is_same: bool,
}

/// IJB-B/C verification matches from the whitespace-delimited
/// `meta/<variant>_template_pair_label.txt` file.
///
/// Here templates are pre-pooled: each side of a match is a single
/// `<template_id>.jpg` crop, so no table join is needed. Downsampling uses
/// the same seed-0 shuffled-prefix discipline as the full protocol reader.
#[derive(Debug)]
pub struct IjbPairLabelDataset {
    matches: Vec<PairLabelRow>,
}

impl IjbPairLabelDataset {
    pub fn from_dir(
        root: &Path,
        variant: IjbVariant,
        leave_ratio: f64,
    ) -> Result<Self, DatasetError> {
        let path = root.join("meta").join(variant.pair_label_file());
        let table = Table::from_path_with_columns(
            &path,
            Delimiter::Whitespace,
            &["TEMPLATE_ID1", "TEMPLATE_ID2", "IS_SAME"],
        )?;
        Self::from_table(&table, leave_ratio)
    }

    pub fn from_table(table: &Table, leave_ratio: f64) -> Result<Self, DatasetError> {
        let keep = downsample_indices(table.len(), leave_ratio);
        let mut matches = Vec::with_capacity(keep.len());
        for row in keep {
            let raw = table.cell(row, "IS_SAME")?;
            let is_same = match raw {
                "1" => true,
                "0" => false,
                other => {
                    return Err(DatasetError::MalformedRecord {
                        origin: table.name().to_string(),
                        line: row + 1,
                        details: format!("IS_SAME must be 0 or 1, found '{other}'"),
                    })
                }
            };
            matches.push(PairLabelRow {
                template_id_1: table.cell(row, "TEMPLATE_ID1")?.to_string(),
                template_id_2: table.cell(row, "TEMPLATE_ID2")?.to_string(),
                is_same,
            });
        }
        Ok(Self { matches })
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn item(&self, index: usize) -> Result<VerificationItem, DatasetError> {
        let row = self.matches.get(index).ok_or(DatasetError::IndexOutOfBounds {
            index,
            len: self.matches.len(),
        })?;
        Ok(VerificationItem {
            enroll_template_id: row.template_id_1.clone(),
            verif_template_id: row.template_id_2.clone(),
            enroll_paths: vec![PathBuf::from(format!("{}.jpg", row.template_id_1))],
            verif_paths: vec![PathBuf::from(format!("{}.jpg", row.template_id_2))],
            is_same: row.is_same,
        })
    }
}
