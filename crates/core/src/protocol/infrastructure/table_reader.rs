use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::shared::error::DatasetError;

/// Field separator for one protocol file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Whitespace,
}

impl Delimiter {
    fn split(self, line: &str) -> Vec<String> {
        match self {
            Delimiter::Comma => line.split(',').map(|cell| cell.trim().to_string()).collect(),
            Delimiter::Whitespace => line.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// An in-memory relational table of string cells keyed by column name.
///
/// Protocol files are small (at most a few hundred thousand rows), so the
/// whole table is materialized up front and every structural problem —
/// missing column, ragged row — fails the load rather than the first access.
/// None of the benchmark files use quoting, so none is supported.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    column_positions: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Reads a table whose first non-empty line is the header row.
    pub fn from_path(path: &Path, delimiter: Delimiter) -> Result<Self, DatasetError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&table_name(path), &text, delimiter, None)
    }

    /// Reads a headerless table with caller-supplied column names.
    pub fn from_path_with_columns(
        path: &Path,
        delimiter: Delimiter,
        columns: &[&str],
    ) -> Result<Self, DatasetError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&table_name(path), &text, delimiter, Some(columns))
    }

    /// Parses table text. `columns` of `None` treats the first non-empty
    /// line as the header.
    pub fn parse(
        name: &str,
        text: &str,
        delimiter: Delimiter,
        columns: Option<&[&str]>,
    ) -> Result<Self, DatasetError> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let columns: Vec<String> = match columns {
            Some(names) => names.iter().map(|name| name.to_string()).collect(),
            None => {
                let (_, header) = lines.next().ok_or_else(|| DatasetError::MalformedRecord {
                    origin: name.to_string(),
                    line: 1,
                    details: "missing header row".to_string(),
                })?;
                delimiter.split(header)
            }
        };

        let mut rows = Vec::new();
        for (line_idx, line) in lines {
            let cells = delimiter.split(line);
            if cells.len() != columns.len() {
                return Err(DatasetError::MalformedRecord {
                    origin: name.to_string(),
                    line: line_idx + 1,
                    details: format!(
                        "expected {} field(s), found {}",
                        columns.len(),
                        cells.len()
                    ),
                });
            }
            rows.push(cells);
        }

        let column_positions = columns
            .iter()
            .enumerate()
            .map(|(position, column)| (column.clone(), position))
            .collect();

        Ok(Self {
            name: name.to_string(),
            columns,
            column_positions,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_positions.contains_key(column)
    }

    /// Fails with the first missing column, if any.
    pub fn require_columns(&self, columns: &[&str]) -> Result<(), DatasetError> {
        for &column in columns {
            if !self.has_column(column) {
                return Err(DatasetError::MissingColumn {
                    table: self.name.clone(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn cell(&self, row: usize, column: &str) -> Result<&str, DatasetError> {
        let position =
            self.column_positions
                .get(column)
                .ok_or_else(|| DatasetError::MissingColumn {
                    table: self.name.clone(),
                    column: column.to_string(),
                })?;
        let cells = self.rows.get(row).ok_or(DatasetError::IndexOutOfBounds {
            index: row,
            len: self.rows.len(),
        })?;
        Ok(&cells[*position])
    }

    /// Row indices whose `column` cell equals `value`, ascending.
    pub fn rows_where(&self, column: &str, value: &str) -> Result<Vec<usize>, DatasetError> {
        let position =
            self.column_positions
                .get(column)
                .ok_or_else(|| DatasetError::MissingColumn {
                    table: self.name.clone(),
                    column: column.to_string(),
                })?;
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells[*position] == value)
            .map(|(row, _)| row)
            .collect())
    }
}

fn table_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("table")
        .to_string()
}
