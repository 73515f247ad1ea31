use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::protocol::infrastructure::table_reader::Table;
use crate::shared::constants::PROTOCOL_SHUFFLE_SEED;
use crate::shared::error::DatasetError;

use super::occlusion::OcclusionIndex;
use super::template_table::{TemplateEntry, TemplateTable};

/// One verification comparison: an enroll template against a verif template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRow {
    pub enroll_template_id: String,
    pub verif_template_id: String,
}

/// IJB-style verification protocol: four relational tables joined into
/// concrete per-match capture sets.
///
/// The metadata table feeds the occlusion quality index, the two template
/// tables resolve template ids to captures, and the match table enumerates
/// the comparisons to score.
#[derive(Debug, Clone)]
pub struct VerificationProtocol {
    enroll: TemplateTable,
    verif: TemplateTable,
    occlusion: OcclusionIndex,
    matches: Vec<MatchRow>,
}

impl VerificationProtocol {
    /// Joins the four tables, validating columns up front. A `leave_ratio`
    /// below 1.0 downsamples the match table deterministically (seed-0
    /// shuffle, rounded prefix) so repeated loads score the same subset.
    pub fn load(
        metadata: &Table,
        enroll: Table,
        verif: Table,
        match_table: &Table,
        leave_ratio: f64,
    ) -> Result<Self, DatasetError> {
        match_table.require_columns(&["ENROLL_TEMPLATE_ID", "VERIF_TEMPLATE_ID"])?;
        let occlusion = OcclusionIndex::from_metadata(metadata)?;
        let enroll = TemplateTable::new(enroll)?;
        let verif = TemplateTable::new(verif)?;

        let keep = downsample_indices(match_table.len(), leave_ratio);
        let mut matches = Vec::with_capacity(keep.len());
        for row in keep {
            matches.push(MatchRow {
                enroll_template_id: match_table.cell(row, "ENROLL_TEMPLATE_ID")?.to_string(),
                verif_template_id: match_table.cell(row, "VERIF_TEMPLATE_ID")?.to_string(),
            });
        }
        log::info!(
            "verification protocol: {} match rows ({} enroll, {} verif templates)",
            matches.len(),
            enroll.template_count(),
            verif.template_count()
        );

        Ok(Self {
            enroll,
            verif,
            occlusion,
            matches,
        })
    }

    /// Number of comparisons after any downsampling.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn match_row(&self, match_index: usize) -> Result<&MatchRow, DatasetError> {
        self.matches
            .get(match_index)
            .ok_or(DatasetError::IndexOutOfBounds {
                index: match_index,
                len: self.matches.len(),
            })
    }

    /// Resolves a match row into the captures of both referenced templates.
    pub fn resolve(
        &self,
        match_index: usize,
    ) -> Result<(Vec<TemplateEntry>, Vec<TemplateEntry>), DatasetError> {
        let row = self.match_row(match_index)?;
        let enroll_entries = self.enroll.entries(&row.enroll_template_id)?;
        let verif_entries = self.verif.entries(&row.verif_template_id)?;
        Ok((enroll_entries, verif_entries))
    }

    /// Ground truth for a resolved match: both templates belong to the same
    /// subject. Templates are single-subject, so the first capture decides.
    pub fn is_same(enroll_entries: &[TemplateEntry], verif_entries: &[TemplateEntry]) -> bool {
        match (enroll_entries.first(), verif_entries.first()) {
            (Some(enroll), Some(verif)) => enroll.subject_id == verif.subject_id,
            _ => false,
        }
    }

    /// Keeps captures whose occlusion sum meets `lower_bound`.
    ///
    /// A bound of zero short-circuits without consulting the metadata join at
    /// all — captures missing from the metadata must not fail a run that
    /// never asked for filtering. With a positive bound the join is strict:
    /// an absent capture is an error, because silently treating it as
    /// unoccluded would bias the benchmark.
    pub fn filter_by_occlusion(
        &self,
        entries: &[TemplateEntry],
        lower_bound: u32,
    ) -> Result<Vec<TemplateEntry>, DatasetError> {
        if lower_bound == 0 {
            return Ok(entries.to_vec());
        }
        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            let sum = self
                .occlusion
                .sum_for(&entry.subject_id, &entry.filename)
                .ok_or_else(|| DatasetError::MissingOcclusionMetadata {
                    subject_id: entry.subject_id.clone(),
                    filename: entry.filename.clone(),
                })?;
            if sum >= lower_bound {
                kept.push(entry.clone());
            }
        }
        Ok(kept)
    }
}

/// Canonical cropped-face location for a capture:
/// `<img|frames>/<subject_id>_<file_stem>.jpg`, preserving the capture's
/// original sub-directory segment.
pub fn cropped_path_suffix(entry: &TemplateEntry) -> PathBuf {
    let filepath = Path::new(&entry.filename);
    let dir = filepath.parent().unwrap_or_else(|| Path::new(""));
    let stem = filepath
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("");
    dir.join(format!("{}_{}.jpg", entry.subject_id, stem))
}

/// Match-table rows to keep for `leave_ratio`, in kept order.
///
/// Row indices are shuffled with the fixed protocol seed and truncated to
/// `round(len * leave_ratio)`; the shuffled prefix (not a re-sorted one) is
/// the kept order, reproduced identically on every load.
pub fn downsample_indices(len: usize, leave_ratio: f64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    if leave_ratio >= 1.0 {
        return indices;
    }
    let mut rng = StdRng::seed_from_u64(PROTOCOL_SHUFFLE_SEED);
    indices.shuffle(&mut rng);
    let keep = ((len as f64) * leave_ratio).round() as usize;
    indices.truncate(keep);
    indices
}
