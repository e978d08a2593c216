//! Row selection
//!
//! A row is selected when it is both checked and visible. Hiding a row keeps
//! its checkbox state but drops it out of the selection until it is shown
//! again.

use crate::error::{CoreError, Result, SelectionArity};
use crate::types::{Row, TableSchema};

/// Shown in the delete confirmation for a row without any cells
pub const EMPTY_ROW_SUMMARY: &str = "(record)";

/// Separator between the two summary cells of a row
pub const SUMMARY_SEPARATOR: &str = " — ";

/// The visible, checked rows of a table at one point in time
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    rows: Vec<&'a Row>,
    id_column: usize,
}

impl<'a> Selection<'a> {
    /// Compute the selection from the current checkbox and visibility state.
    pub fn of(rows: &'a [Row], schema: &TableSchema) -> Self {
        Self {
            rows: rows.iter().filter(|r| r.is_selected()).collect(),
            id_column: schema.id_column(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[&'a Row] {
        &self.rows
    }

    /// The single selected row, for actions that edit one record.
    pub fn exactly_one(&self) -> Result<&'a Row> {
        match self.rows.as_slice() {
            [row] => Ok(*row),
            rows => Err(CoreError::SelectionRequired {
                expected: SelectionArity::ExactlyOne,
                actual: rows.len(),
            }),
        }
    }

    /// All selected rows, for actions that need at least one.
    pub fn at_least_one(&self) -> Result<&[&'a Row]> {
        if self.rows.is_empty() {
            return Err(CoreError::SelectionRequired {
                expected: SelectionArity::AtLeastOne,
                actual: 0,
            });
        }
        Ok(&self.rows)
    }

    pub fn id_of(&self, row: &Row) -> String {
        row.cell(self.id_column).to_string()
    }

    /// Identifiers of the selected rows, in table order.
    pub fn ids(&self) -> Vec<String> {
        self.rows.iter().map(|r| self.id_of(r)).collect()
    }

    /// Human readable line per selected row for the delete confirmation.
    pub fn summaries(&self) -> Vec<String> {
        self.rows.iter().map(|r| summarize(r)).collect()
    }
}

/// First two cells joined with an em dash, or a placeholder when that is empty.
pub fn summarize(row: &Row) -> String {
    let cells = row.cells();
    let summary = cells[..cells.len().min(2)].join(SUMMARY_SEPARATOR);
    if summary.is_empty() {
        return EMPTY_ROW_SUMMARY.to_string();
    }
    summary
}

/// Set the checkbox of every visible row. Hidden rows keep their state.
pub fn select_all(rows: &mut [Row], checked: bool) -> usize {
    let mut changed = 0;
    for row in rows.iter_mut().filter(|r| r.is_visible()) {
        row.set_checked(checked);
        changed += 1;
    }
    changed
}
