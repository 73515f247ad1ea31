use std::collections::HashMap;

use crate::protocol::infrastructure::table_reader::Table;
use crate::shared::constants::OCCLUSION_COLUMNS;
use crate::shared::error::DatasetError;

/// Precomputed occlusion-flag sums keyed by `(SUBJECT_ID, FILENAME)`.
///
/// The metadata table carries one binary indicator per occlusion region
/// (`OCC1`..`OCC18`); their per-capture sum serves as a quality score for
/// filtering verification entries. Empty flag cells count as zero, matching
/// the published metadata files; the first row wins on duplicate keys.
#[derive(Debug, Clone)]
pub struct OcclusionIndex {
    sums: HashMap<(String, String), u32>,
}

impl OcclusionIndex {
    pub fn from_metadata(metadata: &Table) -> Result<Self, DatasetError> {
        metadata.require_columns(&["SUBJECT_ID", "FILENAME"])?;
        let occ_columns: Vec<String> = (1..=OCCLUSION_COLUMNS)
            .map(|column| format!("OCC{column}"))
            .collect();
        for column in &occ_columns {
            if !metadata.has_column(column) {
                return Err(DatasetError::MissingColumn {
                    table: metadata.name().to_string(),
                    column: column.clone(),
                });
            }
        }

        let mut sums = HashMap::with_capacity(metadata.len());
        for row in 0..metadata.len() {
            let mut sum = 0f32;
            for column in &occ_columns {
                let cell = metadata.cell(row, column)?;
                if cell.is_empty() {
                    continue;
                }
                sum += cell
                    .parse::<f32>()
                    .map_err(|_| DatasetError::MalformedRecord {
                        origin: metadata.name().to_string(),
                        line: row + 2,
                        details: format!("occlusion flag '{cell}' is not numeric"),
                    })?;
            }
            let key = (
                metadata.cell(row, "SUBJECT_ID")?.to_string(),
                metadata.cell(row, "FILENAME")?.to_string(),
            );
            sums.entry(key).or_insert(sum as u32);
        }
        Ok(Self { sums })
    }

    /// Occlusion sum for one capture, `None` when the capture is absent from
    /// the metadata join.
    pub fn sum_for(&self, subject_id: &str, filename: &str) -> Option<u32> {
        self.sums
            .get(&(subject_id.to_string(), filename.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.sums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::infrastructure::table_reader::Delimiter;

    fn metadata(rows: &str) -> Table {
        let occ_header: Vec<String> = (1..=OCCLUSION_COLUMNS).map(|i| format!("OCC{i}")).collect();
        let header = format!("SUBJECT_ID,FILENAME,{}", occ_header.join(","));
        Table::parse(
            "ijbc_metadata_with_age.csv",
            &format!("{header}\n{rows}"),
            Delimiter::Comma,
            None,
        )
        .unwrap()
    }

    fn flags(ones: usize) -> String {
        (0..OCCLUSION_COLUMNS)
            .map(|i| if i < ones { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_sums_flags_per_capture() {
        let rows = format!("s1,img/a.png,{}\ns2,img/b.png,{}", flags(3), flags(0));
        let index = OcclusionIndex::from_metadata(&metadata(&rows)).unwrap();
        assert_eq!(index.sum_for("s1", "img/a.png"), Some(3));
        assert_eq!(index.sum_for("s2", "img/b.png"), Some(0));
        assert_eq!(index.sum_for("s3", "img/a.png"), None);
    }

    #[test]
    fn test_empty_flags_count_as_zero() {
        let empty = vec![""; OCCLUSION_COLUMNS].join(",");
        let rows = format!("s1,img/a.png,{empty}");
        let index = OcclusionIndex::from_metadata(&metadata(&rows)).unwrap();
        assert_eq!(index.sum_for("s1", "img/a.png"), Some(0));
    }

    #[test]
    fn test_first_row_wins_on_duplicate_key() {
        let rows = format!("s1,img/a.png,{}\ns1,img/a.png,{}", flags(5), flags(1));
        let index = OcclusionIndex::from_metadata(&metadata(&rows)).unwrap();
        assert_eq!(index.sum_for("s1", "img/a.png"), Some(5));
    }

    #[test]
    fn test_missing_occ_column_fails() {
        let text = "SUBJECT_ID,FILENAME,OCC1\ns1,img/a.png,1\n";
        let table = Table::parse("meta.csv", text, Delimiter::Comma, None).unwrap();
        let err = OcclusionIndex::from_metadata(&table).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn { column, .. } if column == "OCC2"
        ));
    }

    #[test]
    fn test_non_numeric_flag_fails() {
        let mut cells = vec!["1"; OCCLUSION_COLUMNS];
        cells[4] = "yes";
        let rows = format!("s1,img/a.png,{}", cells.join(","));
        let err = OcclusionIndex::from_metadata(&metadata(&rows)).unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRecord { .. }));
    }
}
