use std::path::{Path, PathBuf};

use crate::protocol::infrastructure::landmark_reader::{read_landmarks, LandmarkEntry};
use crate::shared::error::DatasetError;

use super::ijb_pair_label_dataset::IjbVariant;
use super::sorted_files_with_extension;

/// Loose-crop IJB-B/C faces enumerated by the landmark meta file.
///
/// Each record is an image under `loose_crop/` plus the five facial points a
/// caller-side aligner needs. Feature extractors walk this dataset once and
/// store per-path embeddings; the verification adapters then reference the
/// same paths.
#[derive(Debug)]
pub struct CroppedFacesDataset {
    img_dir: PathBuf,
    entries: Vec<LandmarkEntry>,
}

impl CroppedFacesDataset {
    pub fn from_dir(root: &Path, variant: IjbVariant) -> Result<Self, DatasetError> {
        let landmark_path = root.join("meta").join(variant.landmark_file());
        let entries = read_landmarks(&landmark_path)?;
        log::info!(
            "loaded {} landmark entries from {}",
            entries.len(),
            landmark_path.display()
        );
        Ok(Self {
            img_dir: root.join("loose_crop"),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: usize) -> Result<&LandmarkEntry, DatasetError> {
        self.entries.get(index).ok_or(DatasetError::IndexOutOfBounds {
            index,
            len: self.entries.len(),
        })
    }

    /// Absolute image path for the entry at `index`.
    pub fn image_path(&self, index: usize) -> Result<PathBuf, DatasetError> {
        Ok(self.img_dir.join(&self.entry(index)?.name))
    }
}

/// Every cropped face in an IJB-C layout: still images (`cropped_faces/img`)
/// in sorted order, then video frames (`cropped_faces/frames`).
///
/// The still/frame boundary is preserved so callers can map a flat index
/// back to its source kind.
#[derive(Debug)]
pub struct AllCroppedFacesDataset {
    paths: Vec<PathBuf>,
    still_count: usize,
}

impl AllCroppedFacesDataset {
    pub fn from_dir(root: &Path) -> Result<Self, DatasetError> {
        let cropped = root.join("cropped_faces");
        let stills = sorted_files_with_extension(&cropped.join("img"), "jpg")?;
        let frames = sorted_files_with_extension(&cropped.join("frames"), "jpg")?;
        let still_count = stills.len();
        let mut paths = stills;
        paths.extend(frames);
        Ok(Self { paths, still_count })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn path(&self, index: usize) -> Result<&Path, DatasetError> {
        self.paths
            .get(index)
            .map(PathBuf::as_path)
            .ok_or(DatasetError::IndexOutOfBounds {
                index,
                len: self.paths.len(),
            })
    }

    /// True when `index` refers to a still image rather than a video frame.
    pub fn is_still(&self, index: usize) -> bool {
        index < self.still_count
    }
}

/// Aligned AR-Face verification probes: every `.png` under the root, sorted
/// by file name, addressed by file stem.
#[derive(Debug)]
pub struct ArVerificationPathDataset {
    paths: Vec<PathBuf>,
}

impl ArVerificationPathDataset {
    pub fn from_dir(root: &Path) -> Result<Self, DatasetError> {
        let paths = sorted_files_with_extension(root, "png")?;
        Ok(Self { paths })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn path(&self, index: usize) -> Result<&Path, DatasetError> {
        self.paths
            .get(index)
            .map(PathBuf::as_path)
            .ok_or(DatasetError::IndexOutOfBounds {
                index,
                len: self.paths.len(),
            })
    }

    /// File stem used as the probe's feature key.
    pub fn stem(&self, index: usize) -> Result<&str, DatasetError> {
        self.path(index)?
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or(DatasetError::IndexOutOfBounds {
                index,
                len: self.paths.len(),
            })
    }
}
