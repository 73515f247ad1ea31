use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::protocol::domain::verification::{cropped_path_suffix, VerificationProtocol};
use crate::protocol::infrastructure::table_reader::{Delimiter, Table};
use crate::shared::error::DatasetError;

const METADATA_FILE: &str = "ijbc_metadata_with_age.csv";
const ENROLL_FILE: &str = "enroll_templates.csv";
const VERIF_FILE: &str = "verif_templates.csv";
const MATCH_FILE: &str = "match.csv";

/// One verification comparison resolved to concrete cropped-face paths.
///
/// Downstream scorers look their stored features up by these path suffixes
/// (relative to the dataset's `cropped_faces` directory) and compare the two
/// template groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationItem {
    pub enroll_template_id: String,
    pub verif_template_id: String,
    pub enroll_paths: Vec<PathBuf>,
    pub verif_paths: Vec<PathBuf>,
    pub is_same: bool,
}

/// IJB-C `test1` verification adapter.
///
/// Resolves each match row into the cropped-face paths of both templates,
/// optionally dropping captures below the occlusion bound. The ground-truth
/// label and template ids are taken before filtering, so a fully filtered
/// side yields an item with an empty path list rather than a different
/// label.
#[derive(Debug)]
pub struct IjbcVerificationDataset {
    protocol: VerificationProtocol,
    occlusion_lower_bound: u32,
}

impl IjbcVerificationDataset {
    /// Loads the protocol tables from the standard IJB-C directory layout:
    /// `protocols/ijbc_metadata_with_age.csv` and
    /// `protocols/test1/{enroll_templates,verif_templates,match}.csv`.
    pub fn from_dir(
        root: &Path,
        occlusion_lower_bound: u32,
        leave_ratio: f64,
    ) -> Result<Self, DatasetError> {
        let protocols_dir = root.join("protocols");
        let test1_dir = protocols_dir.join("test1");
        let metadata = Table::from_path(&protocols_dir.join(METADATA_FILE), Delimiter::Comma)?;
        let enroll = Table::from_path(&test1_dir.join(ENROLL_FILE), Delimiter::Comma)?;
        let verif = Table::from_path(&test1_dir.join(VERIF_FILE), Delimiter::Comma)?;
        let match_table = Table::from_path(&test1_dir.join(MATCH_FILE), Delimiter::Comma)?;
        let protocol =
            VerificationProtocol::load(&metadata, enroll, verif, &match_table, leave_ratio)?;
        Ok(Self::new(protocol, occlusion_lower_bound))
    }

    pub fn new(protocol: VerificationProtocol, occlusion_lower_bound: u32) -> Self {
        Self {
            protocol,
            occlusion_lower_bound,
        }
    }

    /// Number of comparisons.
    pub fn len(&self) -> usize {
        self.protocol.match_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn item(&self, match_index: usize) -> Result<VerificationItem, DatasetError> {
        let (enroll_entries, verif_entries) = self.protocol.resolve(match_index)?;
        let is_same = VerificationProtocol::is_same(&enroll_entries, &verif_entries);
        let row = self.protocol.match_row(match_index)?;
        let enroll_template_id = row.enroll_template_id.clone();
        let verif_template_id = row.verif_template_id.clone();

        let enroll_entries = self
            .protocol
            .filter_by_occlusion(&enroll_entries, self.occlusion_lower_bound)?;
        let verif_entries = self
            .protocol
            .filter_by_occlusion(&verif_entries, self.occlusion_lower_bound)?;

        Ok(VerificationItem {
            enroll_template_id,
            verif_template_id,
            enroll_paths: enroll_entries.iter().map(cropped_path_suffix).collect(),
            verif_paths: verif_entries.iter().map(cropped_path_suffix).collect(),
            is_same,
        })
    }
}
