//! Edit form binding
//!
//! Fills the record form from a selected row, validates what the user typed
//! and turns the form back into a request payload.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldIssue, FieldProblem, Result};
use crate::selection::Selection;
use crate::types::TableSchema;

/// Columns that are maintained by the server and never edited in the form
pub const HIDDEN_COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "fecha_creacion",
    "fecha_actualizacion",
    "fecha_hora_creacion",
    "fecha_hora_ultima_modificacion",
    "ultimo_usuario_en_modificar",
];

/// Input kind of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Integer,
    Float,
    Date,
    DateTime,
}

impl FieldKind {
    /// Map a declared SQL column type to the input used to edit it.
    pub fn from_sql_type(sql_type: &str) -> Self {
        let t = sql_type.to_uppercase();
        if t.contains("INT") {
            Self::Integer
        } else if ["REAL", "FLOA", "DOUB", "DEC", "NUM"]
            .iter()
            .any(|x| t.contains(x))
        {
            Self::Float
        } else if t == "DATE" {
            Self::Date
        } else if ["DATETIME", "TIMESTAMP", "DATE"].iter().any(|x| t.contains(x)) {
            Self::DateTime
        } else {
            Self::Text
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Convert displayed cell text into the value this input expects.
    pub fn coerce(&self, cell: &str) -> String {
        match self {
            Self::DateTime => cell.replacen(' ', "T", 1).chars().take(16).collect(),
            Self::Integer | Self::Float => cell.replacen(',', ".", 1),
            Self::Text | Self::Date => cell.to_string(),
        }
    }

    fn check(&self, value: &str) -> Option<FieldProblem> {
        let ok = match self {
            Self::Text => true,
            Self::Integer => value.parse::<i64>().is_ok(),
            Self::Float => value.parse::<f64>().is_ok_and(f64::is_finite),
            Self::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            Self::DateTime => {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
                    || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
            }
        };
        if ok {
            return None;
        }
        Some(match self {
            Self::Text => FieldProblem::PatternMismatch,
            Self::Integer => FieldProblem::NotAnInteger,
            Self::Float => FieldProblem::NotADecimal,
            Self::Date => FieldProblem::NotADate,
            Self::DateTime => FieldProblem::NotADateTime,
        })
    }
}

/// Declaration of one named input in the edit form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Regular expression the whole value must match when non-empty
    #[serde(default)]
    pub pattern: Option<String>,
    /// Value restored when the form is reset
    #[serde(default)]
    pub default_value: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            pattern: None,
            default_value: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Derive the form field for a table column.
    ///
    /// Returns `None` for primary keys and bookkeeping columns, which the form
    /// never shows.
    pub fn from_sql_column(
        name: &str,
        sql_type: &str,
        not_null: bool,
        primary_key: bool,
        default_value: Option<&str>,
    ) -> Option<Self> {
        if primary_key || HIDDEN_COLUMNS.contains(&name.to_lowercase().as_str()) {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            kind: FieldKind::from_sql_type(sql_type),
            required: not_null,
            pattern: None,
            default_value: default_value.map(str::to_string),
        })
    }
}

/// Whether the open dialog creates or modifies a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionMode {
    Insert,
    Update,
}

impl SubmissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
        }
    }
}

impl std::fmt::Display for SubmissionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One edit-dialog interaction: its mode and, for updates, the record id
/// captured when the dialog was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    mode: SubmissionMode,
    target_id: Option<String>,
}

impl EditSession {
    pub fn insert() -> Self {
        Self {
            mode: SubmissionMode::Insert,
            target_id: None,
        }
    }

    pub fn update(id: impl Into<String>) -> Self {
        Self {
            mode: SubmissionMode::Update,
            target_id: Some(id.into()),
        }
    }

    pub fn mode(&self) -> SubmissionMode {
        self.mode
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }
}

/// Field name to string value, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(IndexMap<String, String>);

impl Payload {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }
}

#[derive(Debug, Clone)]
struct FormField {
    spec: FieldSpec,
    pattern: Option<Regex>,
    value: String,
    invalid: bool,
}

impl FormField {
    fn reset(&mut self) {
        self.value = self.spec.default_value.clone().unwrap_or_default();
        self.invalid = false;
    }

    /// Same rules as browser constraint validation: a text value made only of
    /// spaces satisfies `required`, while number and date inputs drop
    /// surrounding whitespace before checking.
    fn issue(&self) -> Option<FieldProblem> {
        let value = match self.spec.kind {
            FieldKind::Text => self.value.as_str(),
            _ => self.value.trim(),
        };
        if value.is_empty() {
            return self.spec.required.then_some(FieldProblem::Missing);
        }
        if let Some(problem) = self.spec.kind.check(value) {
            return Some(problem);
        }
        match &self.pattern {
            Some(re) if !re.is_match(&self.value) => Some(FieldProblem::PatternMismatch),
            _ => None,
        }
    }
}

/// Current contents of the edit form
#[derive(Debug, Clone)]
pub struct FormState {
    fields: IndexMap<String, FormField>,
}

impl FormState {
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self> {
        let mut fields = IndexMap::with_capacity(specs.len());
        for spec in specs {
            let pattern = spec
                .pattern
                .as_deref()
                .map(|p| {
                    Regex::new(&format!("^(?:{})$", p)).map_err(|e| CoreError::InvalidPattern {
                        field: spec.name.clone(),
                        reason: e.to_string(),
                    })
                })
                .transpose()?;
            let mut field = FormField {
                spec,
                pattern,
                value: String::new(),
                invalid: false,
            };
            field.reset();
            fields.insert(field.spec.name.clone(), field);
        }
        Ok(Self { fields })
    }

    pub fn specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values().map(|f| &f.spec)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|f| f.value.as_str())
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = self
            .fields
            .get_mut(name)
            .ok_or_else(|| CoreError::UnknownField(name.to_string()))?;
        field.value = value.into();
        Ok(())
    }

    /// Restore defaults and clear any invalid marks.
    pub fn reset(&mut self) {
        self.fields.values_mut().for_each(FormField::reset);
    }

    /// Prepare the form for a new record.
    pub fn begin_insert(&mut self) -> EditSession {
        self.reset();
        EditSession::insert()
    }

    /// Prepare the form to edit the single selected row.
    ///
    /// With zero or several rows selected the form is left untouched and a
    /// selection error is returned.
    pub fn begin_update(
        &mut self,
        schema: &TableSchema,
        selection: &Selection<'_>,
    ) -> Result<EditSession> {
        let row = selection.exactly_one()?;
        self.reset();

        for (idx, column) in schema.columns().iter().enumerate() {
            let Some(field) = self.fields.get_mut(&column.name) else {
                continue;
            };
            field.value = field.spec.kind.coerce(row.cell(idx));
        }

        Ok(EditSession::update(selection.id_of(row)))
    }

    /// Validate a single field when it loses focus.
    /// Returns whether the field is now marked invalid.
    pub fn blur(&mut self, name: &str) -> Result<bool> {
        let field = self
            .fields
            .get_mut(name)
            .ok_or_else(|| CoreError::UnknownField(name.to_string()))?;
        field.invalid = field.spec.required && field.value.trim().is_empty();
        Ok(field.invalid)
    }

    pub fn is_marked_invalid(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|f| f.invalid)
    }

    /// Check every field constraint, reporting all problems at once.
    pub fn check_validity(&self) -> Result<()> {
        let issues: Vec<FieldIssue> = self
            .fields
            .values()
            .filter_map(|f| f.issue().map(|p| FieldIssue::new(&f.spec.name, p)))
            .collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(issues))
        }
    }

    /// Collect every field verbatim, adding `id` for updates.
    pub fn build_payload(&self, session: &EditSession) -> Payload {
        let mut payload = Payload(
            self.fields
                .iter()
                .map(|(name, f)| (name.clone(), f.value.clone()))
                .collect(),
        );
        if let (SubmissionMode::Update, Some(id)) = (session.mode(), session.target_id()) {
            payload.insert("id", id);
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RecordTable;
    use pretty_assertions::assert_eq;

    fn schema() -> TableSchema {
        TableSchema::new(
            &["id", "nombre", "precio", "fecha_alta", "fecha_hora_creacion"],
            &["id", "precio"],
        )
        .unwrap()
    }

    fn form() -> FormState {
        FormState::new(vec![
            FieldSpec::new("nombre", FieldKind::Text).required(),
            FieldSpec::new("precio", FieldKind::Float).required(),
            FieldSpec::new("fecha_alta", FieldKind::DateTime),
        ])
        .unwrap()
    }

    fn table() -> RecordTable {
        RecordTable::from_cells(
            schema(),
            vec![
                vec!["1", "Tornillo", "1,50", "2024-01-05 10:30:00", "2024-01-01"],
                vec!["2", "Tuerca", "0,25", "2024-02-01 08:00:00", "2024-01-01"],
            ],
        )
    }

    #[test]
    fn sql_types_map_to_input_kinds() {
        assert_eq!(FieldKind::from_sql_type("INTEGER"), FieldKind::Integer);
        assert_eq!(FieldKind::from_sql_type("real"), FieldKind::Float);
        assert_eq!(FieldKind::from_sql_type("DECIMAL(10,2)"), FieldKind::Float);
        assert_eq!(FieldKind::from_sql_type("DATE"), FieldKind::Date);
        assert_eq!(FieldKind::from_sql_type("DATETIME"), FieldKind::DateTime);
        assert_eq!(FieldKind::from_sql_type("TIMESTAMP"), FieldKind::DateTime);
        assert_eq!(FieldKind::from_sql_type("TEXT"), FieldKind::Text);
        assert_eq!(FieldKind::from_sql_type(""), FieldKind::Text);
    }

    #[test]
    fn bookkeeping_columns_have_no_field() {
        assert!(FieldSpec::from_sql_column("id", "INTEGER", true, true, None).is_none());
        assert!(FieldSpec::from_sql_column("codigo", "TEXT", true, true, None).is_none());
        assert!(
            FieldSpec::from_sql_column("fecha_hora_creacion", "TEXT", false, false, None)
                .is_none()
        );
        let spec = FieldSpec::from_sql_column("stock", "INT", true, false, Some("0")).unwrap();
        assert_eq!(spec.kind, FieldKind::Integer);
        assert!(spec.required);
        assert_eq!(spec.default_value.as_deref(), Some("0"));
    }

    #[test]
    fn coercion_per_kind() {
        assert_eq!(
            FieldKind::DateTime.coerce("2024-01-05 10:30:00"),
            "2024-01-05T10:30"
        );
        assert_eq!(FieldKind::Float.coerce("1,50"), "1.50");
        assert_eq!(FieldKind::Integer.coerce("12"), "12");
        assert_eq!(FieldKind::Date.coerce("2024-01-05"), "2024-01-05");
        assert_eq!(FieldKind::Text.coerce("a b, c"), "a b, c");
    }

    #[test]
    fn begin_update_requires_exactly_one_row() {
        let mut table = table();
        let mut form = form();
        form.set_value("nombre", "draft").unwrap();

        let err = form
            .begin_update(table.schema(), &table.selection())
            .unwrap_err();
        assert!(err.is_selection_required());
        assert_eq!(form.value("nombre"), Some("draft"));

        table.select_all(true);
        assert!(form.begin_update(table.schema(), &table.selection()).is_err());
        assert_eq!(form.value("nombre"), Some("draft"));
    }

    #[test]
    fn begin_update_fills_fields_with_coercion() {
        let mut table = table();
        table.set_checked(0, true).unwrap();
        let mut form = form();

        let session = form
            .begin_update(table.schema(), &table.selection())
            .unwrap();
        assert_eq!(session, EditSession::update("1"));
        assert_eq!(form.value("nombre"), Some("Tornillo"));
        assert_eq!(form.value("precio"), Some("1.50"));
        assert_eq!(form.value("fecha_alta"), Some("2024-01-05T10:30"));
    }

    #[test]
    fn begin_insert_resets_to_defaults() {
        let mut form = FormState::new(vec![
            FieldSpec::new("nombre", FieldKind::Text).required(),
            FieldSpec::new("stock", FieldKind::Integer).with_default("0"),
        ])
        .unwrap();
        form.set_value("nombre", "x").unwrap();
        form.set_value("stock", "9").unwrap();
        form.set_value("nombre", "").unwrap();
        assert!(form.blur("nombre").unwrap());

        assert_eq!(form.begin_insert(), EditSession::insert());
        assert_eq!(form.value("nombre"), Some(""));
        assert_eq!(form.value("stock"), Some("0"));
        assert!(!form.is_marked_invalid("nombre"));
    }

    #[test]
    fn blur_marks_only_required_blank_fields() {
        let mut form = form();
        assert!(form.blur("nombre").unwrap());
        assert!(!form.blur("fecha_alta").unwrap());
        form.set_value("nombre", "  ok ").unwrap();
        assert!(!form.blur("nombre").unwrap());
        assert!(form.blur("nope").is_err());
    }

    #[test]
    fn validity_reports_every_problem() {
        let mut form = form();
        form.set_value("precio", "abc").unwrap();
        form.set_value("fecha_alta", "2024-13-01T10:00").unwrap();

        let Err(CoreError::Validation(issues)) = form.check_validity() else {
            panic!("expected validation failure");
        };
        assert_eq!(
            issues,
            vec![
                FieldIssue::new("nombre", FieldProblem::Missing),
                FieldIssue::new("precio", FieldProblem::NotADecimal),
                FieldIssue::new("fecha_alta", FieldProblem::NotADateTime),
            ]
        );

        form.set_value("nombre", "Tornillo").unwrap();
        form.set_value("precio", "1.5").unwrap();
        form.set_value("fecha_alta", "2024-01-05T10:30").unwrap();
        assert!(form.check_validity().is_ok());
    }

    #[test]
    fn whitespace_satisfies_required_only_for_text() {
        let mut form = form();
        form.set_value("nombre", "   ").unwrap();
        form.set_value("precio", "  ").unwrap();

        let Err(CoreError::Validation(issues)) = form.check_validity() else {
            panic!("expected validation failure");
        };
        assert_eq!(
            issues,
            vec![FieldIssue::new("precio", FieldProblem::Missing)]
        );
        // The blur highlight still treats a blank text value as missing.
        assert!(form.blur("nombre").unwrap());

        form.set_value("precio", " 2.5 ").unwrap();
        assert!(form.check_validity().is_ok());
    }

    #[test]
    fn pattern_must_match_whole_value() {
        let mut form = FormState::new(vec![
            FieldSpec::new("codigo", FieldKind::Text).with_pattern("[A-Z]{3}-[0-9]+"),
        ])
        .unwrap();
        form.set_value("codigo", "ABC-12x").unwrap();
        assert!(form.check_validity().is_err());
        form.set_value("codigo", "ABC-12").unwrap();
        assert!(form.check_validity().is_ok());
        form.set_value("codigo", "").unwrap();
        assert!(form.check_validity().is_ok());

        let err = FormState::new(vec![
            FieldSpec::new("bad", FieldKind::Text).with_pattern("(")
        ])
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidPattern { .. }));
    }

    #[test]
    fn payload_is_verbatim_and_adds_id_only_for_updates() {
        let mut form = form();
        form.set_value("nombre", " Tornillo ").unwrap();
        form.set_value("precio", "1.50").unwrap();

        let insert = form.build_payload(&EditSession::insert());
        assert_eq!(insert.get("nombre"), Some(" Tornillo "));
        assert_eq!(insert.get("id"), None);
        assert_eq!(insert.len(), 3);

        let update = form.build_payload(&EditSession::update("7"));
        assert_eq!(update.get("id"), Some("7"));
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({
                "nombre": " Tornillo ",
                "precio": "1.50",
                "fecha_alta": "",
                "id": "7"
            })
        );
    }
}
