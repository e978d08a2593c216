//! In-memory record table
//!
//! Owns the schema, the rows and the filter inputs. Every filter edit
//! re-evaluates every row against every column; there is no incremental
//! bookkeeping.

use crate::error::{CoreError, Result};
use crate::filter::{self, FilterInputs, FilterSet, RangeBound};
use crate::selection::{self, Selection};
use crate::types::{Row, TableSchema};

#[derive(Debug, Clone)]
pub struct RecordTable {
    schema: TableSchema,
    rows: Vec<Row>,
    inputs: FilterInputs,
}

impl RecordTable {
    pub fn new(schema: TableSchema, rows: Vec<Row>) -> Self {
        let inputs = FilterInputs::new(&schema);
        Self {
            schema,
            rows,
            inputs,
        }
    }

    /// Build a table from raw cell texts.
    pub fn from_cells<R, C, S>(schema: TableSchema, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(schema, rows.into_iter().map(Row::new).collect())
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn filter_inputs(&self) -> &FilterInputs {
        &self.inputs
    }

    pub fn visible_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_visible()).count()
    }

    /// Edit a text filter field and re-run filtering.
    pub fn set_text_filter(&mut self, column: &str, value: impl Into<String>) -> Result<usize> {
        if !self.inputs.set_text(column, value) {
            return Err(CoreError::UnknownColumn(column.to_string()));
        }
        Ok(self.apply_filters())
    }

    /// Edit one bound of a numeric filter and re-run filtering.
    pub fn set_range_filter(
        &mut self,
        column: &str,
        bound: RangeBound,
        value: impl Into<String>,
    ) -> Result<usize> {
        if !self.inputs.set_bound(column, bound, value) {
            return Err(CoreError::UnknownColumn(column.to_string()));
        }
        Ok(self.apply_filters())
    }

    /// Rebuild the filter set from the current inputs and apply it.
    /// Returns the number of visible rows.
    pub fn apply_filters(&mut self) -> usize {
        let filters = self.inputs.to_filter_set();
        self.apply_filter_set(&filters)
    }

    /// Apply an explicit filter set to every row.
    pub fn apply_filter_set(&mut self, filters: &FilterSet) -> usize {
        let mut visible = 0;
        for row in &mut self.rows {
            let passes = filter::evaluate(row, &self.schema, filters);
            row.set_visible(passes);
            if passes {
                visible += 1;
            }
        }
        tracing::debug!(
            total = self.rows.len(),
            visible,
            active_filters = filters.active_count(),
            "Filters applied"
        );
        visible
    }

    /// Empty every filter field and show all rows again.
    pub fn clear_filters(&mut self) -> usize {
        self.inputs.clear();
        self.apply_filters()
    }

    pub fn set_checked(&mut self, index: usize, checked: bool) -> Result<()> {
        let row = self
            .rows
            .get_mut(index)
            .ok_or(CoreError::RowOutOfRange(index))?;
        row.set_checked(checked);
        Ok(())
    }

    /// Check the rows whose identifier is in `ids`. Returns how many matched.
    pub fn check_ids<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let id_column = self.schema.id_column();
        let mut matched = 0;
        for row in &mut self.rows {
            if ids.iter().any(|id| id.as_ref() == row.cell(id_column)) {
                row.set_checked(true);
                matched += 1;
            }
        }
        matched
    }

    /// The "select all" checkbox: only visible rows follow it.
    pub fn select_all(&mut self, checked: bool) -> usize {
        selection::select_all(&mut self.rows, checked)
    }

    pub fn selection(&self) -> Selection<'_> {
        Selection::of(&self.rows, &self.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table() -> RecordTable {
        let schema = TableSchema::new(&["id", "status", "stock"], &["id", "stock"]).unwrap();
        RecordTable::from_cells(
            schema,
            vec![
                vec!["1", "Act", "10"],
                vec!["2", "Ina", "0"],
                vec!["3", "Active", "n/a"],
            ],
        )
    }

    fn visible_ids(table: &RecordTable) -> Vec<&str> {
        table
            .rows()
            .iter()
            .filter(|r| r.is_visible())
            .map(|r| r.cell(0))
            .collect()
    }

    #[test]
    fn text_filter_hides_non_matching_rows() {
        let mut table = table();
        assert_eq!(table.set_text_filter("status", "act").unwrap(), 2);
        assert_eq!(visible_ids(&table), vec!["1", "3"]);
    }

    #[test]
    fn range_filter_hides_unparseable_cells() {
        let mut table = table();
        table.set_range_filter("stock", RangeBound::Min, "1").unwrap();
        assert_eq!(visible_ids(&table), vec!["1"]);

        table.set_range_filter("stock", RangeBound::Min, "").unwrap();
        assert_eq!(visible_ids(&table), vec!["1", "2", "3"]);
    }

    #[test]
    fn unknown_filter_column_is_an_error() {
        let mut table = table();
        assert_eq!(
            table.set_text_filter("stock", "x").unwrap_err(),
            CoreError::UnknownColumn("stock".into())
        );
        assert!(table.set_text_filter("missing", "x").is_err());
    }

    #[test]
    fn clearing_filters_restores_every_row() {
        let mut table = table();
        table.set_text_filter("status", "zzz").unwrap();
        table.set_range_filter("stock", RangeBound::Max, "5").unwrap();
        assert_eq!(table.visible_count(), 0);

        assert_eq!(table.clear_filters(), 3);
        assert!(table.rows().iter().all(Row::is_visible));
        assert_eq!(table.filter_inputs().to_filter_set().active_count(), 0);
    }

    #[test]
    fn filtering_drops_hidden_rows_from_selection() {
        let mut table = table();
        table.select_all(true);
        assert_eq!(table.selection().len(), 3);

        table.set_text_filter("status", "ina").unwrap();
        assert_eq!(table.selection().ids(), vec!["2".to_string()]);
        assert!(table.row(0).unwrap().is_checked());

        table.select_all(false);
        table.clear_filters();
        assert_eq!(table.selection().ids(), vec!["1".to_string(), "3".to_string()]);
    }

    #[test]
    fn check_ids_marks_matching_rows() {
        let mut table = table();
        assert_eq!(table.check_ids(&["2", "9"]), 1);
        assert_eq!(table.selection().ids(), vec!["2".to_string()]);
        assert_eq!(table.set_checked(7, true), Err(CoreError::RowOutOfRange(7)));
    }
}
