use std::fs;
use std::path::Path;

use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::datasets::domain::face_dataset::FaceDataset;
use crate::shared::error::DatasetError;
use crate::shared::record::FaceRecord;

use super::identity_list_dataset::IdentityListDataset;

/// Relationship categories encoded in the mask matrix. The mapping is
/// dataset-defined and reproduced verbatim: 1 and 2 are same-identity
/// variants, 3 is the impersonator relation, 4 the cross-identity pool.
pub const CATEGORY_SAME_PRIMARY: u8 = 1;
pub const CATEGORY_SAME_VARIANT: u8 = 2;
pub const CATEGORY_IMPERSONATOR: u8 = 3;
pub const CATEGORY_CROSS_IDENTITY: u8 = 4;

/// Disguised-face dataset whose partner relationships come from a
/// precomputed integer matrix instead of label equality.
///
/// Cell `(row, column)` categorizes the pair of listed records `row` and
/// `column`. Same-identity requests take categories 1 then 2, falling back
/// to 3 when neither exists (impersonator rows have no true mate).
/// Different-identity requests draw at most `max(|cat3|, 1)` category-4
/// positions — keeping cross-identity pairs from swamping the impersonator
/// relation — and append every category-3 position.
#[derive(Debug)]
pub struct MaskMatrixDataset {
    inner: IdentityListDataset,
    matrix: Array2<u8>,
}

impl MaskMatrixDataset {
    pub fn load(root: &Path, list_path: &Path, matrix_path: &Path) -> Result<Self, DatasetError> {
        let inner = IdentityListDataset::load(root, list_path)?;
        let matrix = read_matrix(matrix_path)?;
        if matrix.nrows() != inner.len() || matrix.ncols() != inner.len() {
            return Err(DatasetError::MalformedRecord {
                origin: matrix_name(matrix_path),
                line: 1,
                details: format!(
                    "matrix is {}x{}, expected {}x{} to match the path list",
                    matrix.nrows(),
                    matrix.ncols(),
                    inner.len(),
                    inner.len()
                ),
            });
        }
        Ok(Self { inner, matrix })
    }

    pub fn class_count(&self) -> usize {
        self.inner.class_count()
    }

    /// Candidate partner positions for `row` under the requested relation.
    /// The category-4 subset is drawn without replacement through `rng`;
    /// everything else is deterministic.
    pub fn partner_candidates<R: Rng>(
        &self,
        row: usize,
        same_identity: bool,
        rng: &mut R,
    ) -> Result<Vec<usize>, DatasetError> {
        if row >= self.inner.len() {
            return Err(DatasetError::IndexOutOfBounds {
                index: row,
                len: self.inner.len(),
            });
        }
        let candidates = if same_identity {
            let mut positions = self.positions_in_category(row, CATEGORY_SAME_PRIMARY);
            positions.extend(self.positions_in_category(row, CATEGORY_SAME_VARIANT));
            if positions.is_empty() {
                positions = self.positions_in_category(row, CATEGORY_IMPERSONATOR);
            }
            positions
        } else {
            let impersonators = self.positions_in_category(row, CATEGORY_IMPERSONATOR);
            let cross = self.positions_in_category(row, CATEGORY_CROSS_IDENTITY);
            let mut positions = Vec::new();
            if !cross.is_empty() {
                let draw = impersonators.len().max(1).min(cross.len());
                positions.extend(cross.choose_multiple(rng, draw).copied());
            }
            positions.extend(impersonators);
            positions
        };
        if candidates.is_empty() {
            let label = self.inner.record(row)?.label;
            return Err(DatasetError::InsufficientPopulation {
                label,
                bucket_size: 0,
                needed: 1,
            });
        }
        Ok(candidates)
    }

    /// Draws one partner position for `row` under the requested relation.
    pub fn sample_partner<R: Rng>(
        &self,
        row: usize,
        same_identity: bool,
        rng: &mut R,
    ) -> Result<usize, DatasetError> {
        let candidates = self.partner_candidates(row, same_identity, rng)?;
        Ok(candidates[rng.gen_range(0..candidates.len())])
    }

    fn positions_in_category(&self, row: usize, category: u8) -> Vec<usize> {
        self.matrix
            .row(row)
            .iter()
            .enumerate()
            .filter(|(_, &value)| value == category)
            .map(|(column, _)| column)
            .collect()
    }
}

impl FaceDataset for MaskMatrixDataset {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn record(&self, index: usize) -> Result<&FaceRecord, DatasetError> {
        self.inner.record(index)
    }
}

/// Reads a whitespace-delimited numeric matrix. Cells are written as floats
/// by the upstream tooling, so they are parsed as such and narrowed.
fn read_matrix(path: &Path) -> Result<Array2<u8>, DatasetError> {
    let text = fs::read_to_string(path)?;
    let origin = matrix_name(path);
    let mut rows: Vec<Vec<u8>> = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for field in line.split_whitespace() {
            let value: f64 = field.parse().map_err(|_| DatasetError::MalformedRecord {
                origin: origin.clone(),
                line: line_idx + 1,
                details: format!("not a number: '{field}'"),
            })?;
            row.push(value as u8);
        }
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(DatasetError::MalformedRecord {
                    origin: origin.clone(),
                    line: line_idx + 1,
                    details: format!("expected {} column(s), found {}", first.len(), row.len()),
                });
            }
        }
        rows.push(row);
    }
    let ncols = rows.first().map(Vec::len).unwrap_or(0);
    let nrows = rows.len();
    Array2::from_shape_vec((nrows, ncols), rows.into_iter().flatten().collect()).map_err(|_| {
        DatasetError::MalformedRecord {
            origin,
            line: 1,
            details: "matrix rows are ragged".to_string(),
        }
    })
}

fn matrix_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("mask matrix")
        .to_string()
}
