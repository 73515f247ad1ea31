use std::collections::BTreeMap;

use crate::shared::error::DatasetError;
use crate::shared::record::Label;

/// Label → record-position lookup built once per dataset load.
///
/// Buckets partition `[0, N)`: every record position appears in exactly one
/// bucket, in first-seen order. Distinct labels are kept sorted so that
/// uniform draws over the label set are reproducible under a fixed seed.
/// The index is immutable after construction and safe to share across
/// concurrent readers.
#[derive(Debug, Clone)]
pub struct IdentityIndex {
    labels: Vec<Label>,
    buckets: BTreeMap<Label, Vec<usize>>,
    distinct: Vec<Label>,
}

impl IdentityIndex {
    /// Builds the index from one label per record, in record order.
    pub fn build(labels: &[Label]) -> Result<Self, DatasetError> {
        if labels.is_empty() {
            return Err(DatasetError::EmptyPopulation);
        }
        let mut buckets: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
        for (position, &label) in labels.iter().enumerate() {
            buckets.entry(label).or_default().push(position);
        }
        let distinct = buckets.keys().copied().collect();
        Ok(Self {
            labels: labels.to_vec(),
            buckets,
            distinct,
        })
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Identity label of the record at `position`.
    pub fn label_of(&self, position: usize) -> Result<Label, DatasetError> {
        self.labels
            .get(position)
            .copied()
            .ok_or(DatasetError::IndexOutOfBounds {
                index: position,
                len: self.labels.len(),
            })
    }

    /// Record positions sharing `label`, in first-seen order. Empty for an
    /// unknown label.
    pub fn bucket(&self, label: Label) -> &[usize] {
        self.buckets.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct labels in ascending order.
    pub fn labels(&self) -> &[Label] {
        &self.distinct
    }

    pub fn contains_label(&self, label: Label) -> bool {
        self.buckets.contains_key(&label)
    }

    /// Distinct labels other than `anchor_label`, ascending.
    pub fn negative_labels(&self, anchor_label: Label) -> Vec<Label> {
        self.distinct
            .iter()
            .copied()
            .filter(|&label| label != anchor_label)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_empty_fails() {
        assert!(matches!(
            IdentityIndex::build(&[]),
            Err(DatasetError::EmptyPopulation)
        ));
    }

    #[test]
    fn test_buckets_partition_positions() {
        let index = IdentityIndex::build(&[0, 0, 0, 1, 1, 2]).unwrap();
        assert_eq!(index.len(), 6);
        assert_eq!(index.bucket(0), &[0, 1, 2]);
        assert_eq!(index.bucket(1), &[3, 4]);
        assert_eq!(index.bucket(2), &[5]);

        let mut all: Vec<usize> = index
            .labels()
            .iter()
            .flat_map(|&label| index.bucket(label).to_vec())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..6).collect::<Vec<_>>());
    }

    #[test]
    fn test_labels_sorted_regardless_of_first_seen_order() {
        let index = IdentityIndex::build(&[7, 2, 7, 5, 2]).unwrap();
        assert_eq!(index.labels(), &[2, 5, 7]);
    }

    #[test]
    fn test_label_of() {
        let index = IdentityIndex::build(&[0, 0, 0, 1, 1, 2]).unwrap();
        assert_eq!(index.label_of(5).unwrap(), 2);
        assert!(matches!(
            index.label_of(6),
            Err(DatasetError::IndexOutOfBounds { index: 6, len: 6 })
        ));
    }

    #[test]
    fn test_negative_labels_excludes_anchor() {
        let index = IdentityIndex::build(&[0, 0, 0, 1, 1, 2]).unwrap();
        assert_eq!(index.negative_labels(2), vec![0, 1]);
        assert_eq!(index.negative_labels(0), vec![1, 2]);
    }

    #[test]
    fn test_negative_labels_empty_for_single_identity() {
        let index = IdentityIndex::build(&[4, 4, 4]).unwrap();
        assert!(index.negative_labels(4).is_empty());
    }

    #[test]
    fn test_bucket_unknown_label_is_empty() {
        let index = IdentityIndex::build(&[1, 1]).unwrap();
        assert!(index.bucket(9).is_empty());
        assert!(index.contains_label(1));
        assert!(!index.contains_label(9));
    }

    #[test]
    fn test_non_contiguous_labels() {
        let index = IdentityIndex::build(&[100, -3, 100]).unwrap();
        assert_eq!(index.labels(), &[-3, 100]);
        assert_eq!(index.bucket(100), &[0, 2]);
        assert_eq!(index.bucket(-3), &[1]);
    }
}
