//! Table snapshot files
//!
//! A snapshot is what a server-rendered page would have carried: the column
//! headers, which of them are numeric, how the edit form looks and the rows
//! themselves.
//!
//! ```json
//! {
//!   "headers": ["id", "nombre", "precio"],
//!   "numeric_columns": ["id", "precio"],
//!   "columns": [{ "name": "nombre", "type": "TEXT", "notnull": true }],
//!   "rows": [[1, "Mesa", "100,50"]]
//! }
//! ```
//!
//! The form comes either from explicit `fields` or from SQL column metadata
//! in `columns`. When `numeric_columns` is absent the numeric columns are
//! derived from `columns` as well.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tabula_core::{FieldKind, FieldSpec, FormState, RecordTable, Row, TableSchema};

/// Column metadata as reported by the database catalogue
#[derive(Debug, Clone, Deserialize)]
pub struct SqlColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub sql_type: String,
    #[serde(default)]
    pub notnull: bool,
    #[serde(default, alias = "dflt_value")]
    pub default: Option<String>,
    #[serde(default)]
    pub pk: u32,
}

impl SqlColumn {
    fn field_spec(&self) -> Option<FieldSpec> {
        FieldSpec::from_sql_column(
            &self.name,
            &self.sql_type,
            self.notnull,
            self.pk > 0,
            self.default.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub headers: Vec<String>,
    #[serde(default)]
    pub numeric_columns: Option<Vec<String>>,
    /// Position of the identifier among `headers`
    #[serde(default)]
    pub id_column: usize,
    #[serde(default)]
    pub fields: Option<Vec<FieldSpec>>,
    #[serde(default)]
    pub columns: Vec<SqlColumn>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid snapshot {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn schema(&self) -> Result<TableSchema> {
        let numeric: Vec<String> = match &self.numeric_columns {
            Some(names) => names.clone(),
            None => self
                .columns
                .iter()
                .filter(|c| FieldKind::from_sql_type(&c.sql_type).is_numeric())
                .map(|c| c.name.clone())
                .collect(),
        };
        let schema = TableSchema::new(&self.headers, &numeric)?.with_id_column(self.id_column)?;
        Ok(schema)
    }

    pub fn table(&self) -> Result<RecordTable> {
        let rows = self
            .rows
            .iter()
            .map(|cells| Row::new(cells.iter().map(cell_text)))
            .collect();
        Ok(RecordTable::new(self.schema()?, rows))
    }

    pub fn form(&self) -> Result<FormState> {
        let specs = match &self.fields {
            Some(fields) => fields.clone(),
            None => self.columns.iter().filter_map(SqlColumn::field_spec).collect(),
        };
        Ok(FormState::new(specs)?)
    }
}

/// Text a JSON cell would be displayed as. `null` shows as an empty cell.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
