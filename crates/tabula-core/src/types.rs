//! Core types for record tables

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{CoreError, Result};

/// Column metadata declared once when the table is set up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, unique within a schema
    pub name: String,
    /// Whether the column is filtered by numeric range instead of substring
    #[serde(default)]
    pub numeric: bool,
}

impl ColumnDescriptor {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            numeric: false,
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            numeric: true,
        }
    }
}

/// Ordered column layout of a record table.
///
/// The record id lives in `id_column`. With the default of 0 this is the first
/// data column, which sits in the second display position once the selection
/// checkbox column is counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<ColumnDescriptor>,
    id_column: usize,
}

impl TableSchema {
    /// Build a schema from the header list and the subset of numeric headers.
    pub fn new<S: AsRef<str>>(headers: &[S], numeric_columns: &[S]) -> Result<Self> {
        let numeric: HashSet<&str> = numeric_columns.iter().map(AsRef::as_ref).collect();
        let columns = headers
            .iter()
            .map(|h| ColumnDescriptor {
                name: h.as_ref().to_string(),
                numeric: numeric.contains(h.as_ref()),
            })
            .collect();
        Self::from_columns(columns)
    }

    pub fn from_columns(columns: Vec<ColumnDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(CoreError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            columns,
            id_column: 0,
        })
    }

    /// Use a different column as the record identifier.
    pub fn with_id_column(mut self, index: usize) -> Result<Self> {
        if index >= self.columns.len() {
            return Err(CoreError::UnknownColumn(format!("#{}", index)));
        }
        self.id_column = index;
        Ok(self)
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn id_column(&self) -> usize {
        self.id_column
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// One record as displayed: cell texts plus the checkbox and visibility flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
    checked: bool,
    visible: bool,
}

impl Row {
    /// Create a row from raw cell texts. Cells are trimmed the same way the
    /// rendered table text would be read back.
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            cells: cells
                .into_iter()
                .map(|c| c.as_ref().trim().to_string())
                .collect(),
            checked: false,
            visible: true,
        }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell text at `index`, empty when the row is shorter than the schema
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_selected(&self) -> bool {
        self.checked && self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_marks_numeric_columns() {
        let schema = TableSchema::new(&["id", "nombre", "precio"], &["id", "precio"]).unwrap();
        let numeric: Vec<bool> = schema.columns().iter().map(|c| c.numeric).collect();
        assert_eq!(numeric, vec![true, false, true]);
        assert_eq!(schema.id_column(), 0);
    }

    #[test]
    fn schema_rejects_duplicate_names() {
        let err = TableSchema::new(&["id", "id"], &[]).unwrap_err();
        assert_eq!(err, CoreError::DuplicateColumn("id".into()));
    }

    #[test]
    fn id_column_must_exist() {
        let schema = TableSchema::new(&["id", "name"], &[]).unwrap();
        assert!(schema.clone().with_id_column(1).is_ok());
        assert!(schema.with_id_column(2).is_err());
    }

    #[test]
    fn row_trims_cells_and_starts_visible() {
        let row = Row::new(["  7 ", "Widget\n"]);
        assert_eq!(row.cells(), &["7".to_string(), "Widget".to_string()]);
        assert!(row.is_visible());
        assert!(!row.is_checked());
        assert_eq!(row.cell(5), "");
    }
}
