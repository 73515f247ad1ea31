//! facebench-core — dataset adapters and sampling for face verification.
//!
//! Turns raw image collections (flat folders, identity-labeled lists, and
//! benchmark protocol files such as IJB-A/B/C and AR-Face) into indexable
//! (pair-or-triplet, label) samples for pairwise/triplet training and
//! verification scoring:
//!
//! - [`sampling`] — identity index, siamese pair / triplet samplers, and
//!   balanced batch planning
//! - [`protocol`] — relational protocol tables and the verification joiner
//! - [`datasets`] — one adapter per raw source format behind [`FaceDataset`]
//!
//! Image decoding and tensor conversion live behind the [`ImageLoader`] and
//! [`Transform`] seams; the core only enumerates and indexes samples.

pub mod datasets;
pub mod protocol;
pub mod sampling;
pub mod shared;

pub use datasets::domain::face_dataset::FaceDataset;
pub use datasets::domain::image_loader::ImageLoader;
pub use datasets::domain::transform::Transform;
pub use sampling::domain::identity_index::IdentityIndex;
pub use shared::error::DatasetError;
pub use shared::record::{FaceRecord, Label, Pair, Triplet};
