use std::collections::HashMap;

use serde::Serialize;

use crate::protocol::infrastructure::table_reader::Table;
use crate::shared::error::DatasetError;

/// One capture belonging to a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    pub template_id: String,
    pub subject_id: String,
    pub filename: String,
}

/// An enroll or verification template table, bucketed by `TEMPLATE_ID`.
///
/// A template groups one-or-more captures representing a single enrollment
/// or verification attempt; a match row references a template on each side.
#[derive(Debug, Clone)]
pub struct TemplateTable {
    table: Table,
    by_template: HashMap<String, Vec<usize>>,
}

impl TemplateTable {
    /// Validates the join columns and indexes rows by template id.
    pub fn new(table: Table) -> Result<Self, DatasetError> {
        table.require_columns(&["TEMPLATE_ID", "SUBJECT_ID", "FILENAME"])?;
        let mut by_template: HashMap<String, Vec<usize>> = HashMap::new();
        for row in 0..table.len() {
            let template_id = table.cell(row, "TEMPLATE_ID")?.to_string();
            by_template.entry(template_id).or_default().push(row);
        }
        Ok(Self { table, by_template })
    }

    /// All captures of `template_id`, in table order.
    ///
    /// A referenced template with zero rows is a protocol integrity failure.
    pub fn entries(&self, template_id: &str) -> Result<Vec<TemplateEntry>, DatasetError> {
        let rows = self
            .by_template
            .get(template_id)
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| DatasetError::MissingTemplate {
                template_id: template_id.to_string(),
            })?;
        rows.iter()
            .map(|&row| {
                Ok(TemplateEntry {
                    template_id: self.table.cell(row, "TEMPLATE_ID")?.to_string(),
                    subject_id: self.table.cell(row, "SUBJECT_ID")?.to_string(),
                    filename: self.table.cell(row, "FILENAME")?.to_string(),
                })
            })
            .collect()
    }

    pub fn template_count(&self) -> usize {
        self.by_template.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::infrastructure::table_reader::Delimiter;

    fn table() -> Table {
        let text = "\
TEMPLATE_ID,SUBJECT_ID,FILENAME
t1,s1,img/a.png
t1,s1,frames/b.png
t2,s2,img/c.png
";
        Table::parse("enroll_templates.csv", text, Delimiter::Comma, None).unwrap()
    }

    #[test]
    fn test_entries_grouped_by_template() {
        let templates = TemplateTable::new(table()).unwrap();
        let entries = templates.entries("t1").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename, "img/a.png");
        assert_eq!(entries[1].filename, "frames/b.png");
        assert!(entries.iter().all(|entry| entry.subject_id == "s1"));
        assert_eq!(templates.template_count(), 2);
    }

    #[test]
    fn test_unknown_template_fails() {
        let templates = TemplateTable::new(table()).unwrap();
        let err = templates.entries("t9").unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingTemplate { template_id } if template_id == "t9"
        ));
    }

    #[test]
    fn test_missing_column_fails_at_construction() {
        let text = "TEMPLATE_ID,SUBJECT_ID\nt1,s1\n";
        let table = Table::parse("bad.csv", text, Delimiter::Comma, None).unwrap();
        let err = TemplateTable::new(table).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn { column, .. } if column == "FILENAME"
        ));
    }
}
