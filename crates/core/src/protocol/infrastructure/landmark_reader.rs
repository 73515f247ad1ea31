use std::fs;
use std::path::Path;

use ndarray::Array2;

use crate::shared::error::DatasetError;

/// One line of an IJB landmark file: image name, five (x, y) facial points,
/// and a detection score.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkEntry {
    pub name: String,
    /// Five rows of (x, y), in the file's point order.
    pub points: Array2<f32>,
    pub score: f32,
}

/// Reads a whitespace-delimited landmark file:
/// `<image_name> <10 floats: 5 (x,y) pairs> <score>` per line.
///
/// Alignment itself happens outside the core; this reader only hands the
/// points to whoever performs it.
pub fn read_landmarks(path: &Path) -> Result<Vec<LandmarkEntry>, DatasetError> {
    let text = fs::read_to_string(path)?;
    let origin = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("landmarks")
        .to_string();
    parse_landmarks(&origin, &text)
}

pub fn parse_landmarks(origin: &str, text: &str) -> Result<Vec<LandmarkEntry>, DatasetError> {
    let mut entries = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 12 {
            return Err(DatasetError::MalformedRecord {
                origin: origin.to_string(),
                line: line_idx + 1,
                details: format!("expected 12 field(s), found {}", fields.len()),
            });
        }
        let mut values = [0f32; 11];
        for (slot, field) in values.iter_mut().zip(&fields[1..]) {
            *slot = field.parse().map_err(|_| DatasetError::MalformedRecord {
                origin: origin.to_string(),
                line: line_idx + 1,
                details: format!("not a float: '{field}'"),
            })?;
        }
        let points = Array2::from_shape_vec((5, 2), values[..10].to_vec())
            .expect("ten floats always form a 5x2 array");
        entries.push(LandmarkEntry {
            name: fields[0].to_string(),
            points,
            score: values[10],
        });
    }
    Ok(entries)
}
