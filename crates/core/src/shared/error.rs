use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::shared::record::Label;

/// Error type for dataset loading, protocol joining, and sampling.
///
/// Every error is raised synchronously at the call that detects it and is
/// never retried internally; sampling never substitutes a different policy to
/// route around a failure. Load-time structural errors (missing files,
/// malformed tables) surface immediately, not on first access.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("population is empty")]
    EmptyPopulation,
    #[error("identity {label} has {bucket_size} record(s), need at least {needed} for this relation")]
    InsufficientPopulation {
        label: Label,
        bucket_size: usize,
        needed: usize,
    },
    #[error("cannot draw a negative: population holds a single identity")]
    EmptyLabelSet,
    #[error("balanced batch plan infeasible: {details}")]
    LabelPoolTooSmall { details: String },
    #[error("template id '{template_id}' referenced by a match row has no entries")]
    MissingTemplate { template_id: String },
    #[error("no occlusion metadata for subject '{subject_id}' file '{filename}'")]
    MissingOcclusionMetadata {
        subject_id: String,
        filename: String,
    },
    #[error("referenced file does not exist: {0}")]
    MissingFile(PathBuf),
    #[error("required column '{column}' missing from table '{table}'")]
    MissingColumn { table: String, column: String },
    #[error("malformed record in '{origin}' line {line}: {details}")]
    MalformedRecord {
        origin: String,
        line: usize,
        details: String,
    },
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("failed to decode image {path}: {details}")]
    ImageDecode { path: PathBuf, details: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}
