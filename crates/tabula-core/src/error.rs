//! Error types for tabula-core

use thiserror::Error;

/// A single field that failed form validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub problem: FieldProblem,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, problem: FieldProblem) -> Self {
        Self {
            field: field.into(),
            problem,
        }
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

/// Why a field value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    NotAnInteger,
    NotADecimal,
    NotADate,
    NotADateTime,
    PatternMismatch,
}

impl std::fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Missing => "value is required",
            Self::NotAnInteger => "expected a whole number",
            Self::NotADecimal => "expected a number",
            Self::NotADate => "expected a date (YYYY-MM-DD)",
            Self::NotADateTime => "expected a date and time (YYYY-MM-DDTHH:MM)",
            Self::PatternMismatch => "value does not match the expected format",
        };
        f.write_str(text)
    }
}

/// Core error type for table, selection and form operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The action needs a different number of selected rows
    #[error("Selection required: expected {expected}, found {actual} selected row(s)")]
    SelectionRequired {
        expected: SelectionArity,
        actual: usize,
    },

    #[error("Validation failed: {}", format_issues(.0))]
    Validation(Vec<FieldIssue>),

    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Invalid pattern for field {field}: {reason}")]
    InvalidPattern { field: String, reason: String },

    #[error("Row index {0} is out of range")]
    RowOutOfRange(usize),
}

impl CoreError {
    pub fn is_selection_required(&self) -> bool {
        matches!(self, Self::SelectionRequired { .. })
    }
}

/// Required selection cardinality for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionArity {
    ExactlyOne,
    AtLeastOne,
}

impl std::fmt::Display for SelectionArity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactlyOne => f.write_str("exactly one"),
            Self::AtLeastOne => f.write_str("at least one"),
        }
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
