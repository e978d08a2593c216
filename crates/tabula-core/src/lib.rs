//! Tabula Core - table state for record management screens
//!
//! This crate holds everything that can be decided without talking to the
//! server:
//!
//! - `filter` - per-column text and numeric-range predicates
//! - `selection` - which rows are checked and visible
//! - `form` - edit form population, validation and payload extraction
//! - `RecordTable` - rows plus the filter inputs that drive their visibility

pub mod filter;
pub mod form;
pub mod selection;

mod error;
mod table;
mod types;

pub use error::*;
pub use filter::{FilterCriterion, FilterInput, FilterInputs, FilterSet, RangeBound};
pub use form::{
    EditSession, FieldKind, FieldSpec, FormState, HIDDEN_COLUMNS, Payload, SubmissionMode,
};
pub use selection::Selection;
pub use table::RecordTable;
pub use types::*;
