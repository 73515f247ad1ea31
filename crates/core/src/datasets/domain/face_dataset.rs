use crate::shared::error::DatasetError;
use crate::shared::record::{FaceRecord, Label};

/// Uniform indexable view over one raw image source.
///
/// Adapters resolve heterogeneous layouts (folder trees, list files,
/// protocol tables) into positioned records; samplers consume only positions
/// and labels. Decoding and tensor conversion stay behind the `ImageLoader`
/// and `Transform` seams.
pub trait FaceDataset {
    /// Number of records in the source.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The record at `index`.
    fn record(&self, index: usize) -> Result<&FaceRecord, DatasetError>;

    /// Identity labels for the whole population, in record order. Feeds
    /// `IdentityIndex::build`.
    fn labels(&self) -> Vec<Label> {
        (0..self.len())
            .filter_map(|index| self.record(index).ok().map(|record| record.label))
            .collect()
    }
}

/// Indexing helper shared by the adapters, which all hold `Vec<FaceRecord>`.
pub(crate) fn record_at(records: &[FaceRecord], index: usize) -> Result<&FaceRecord, DatasetError> {
    records.get(index).ok_or(DatasetError::IndexOutOfBounds {
        index,
        len: records.len(),
    })
}
