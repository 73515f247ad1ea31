use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Integer identity label. Labels are not assumed contiguous: adapters that
/// parse raw person ids (AR-Face, identity CSVs) pass them through unchanged,
/// while list/folder adapters assign them in first-seen order.
pub type Label = i64;

/// One raw sample: an opaque path reference plus its identity label.
///
/// The path is never opened by the core; decoding happens behind the
/// `ImageLoader` seam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub path: PathBuf,
    pub label: Label,
}

/// A verification pair of record positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub anchor: usize,
    pub partner: usize,
    /// True when both positions carry the same identity.
    pub is_same: bool,
}

/// An (anchor, positive, negative) triplet of record positions.
///
/// Invariant: `label(anchor) == label(positive) != label(negative)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    pub anchor: usize,
    pub positive: usize,
    pub negative: usize,
}
