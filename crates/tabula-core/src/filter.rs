//! Per-column filter predicates
//!
//! Text columns match by case-insensitive substring, numeric columns by an
//! inclusive `[min, max]` range. A row is visible only when every column's
//! criterion passes.

use indexmap::IndexMap;

use crate::types::{Row, TableSchema};

/// Match criterion for a single column
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCriterion {
    /// Case-insensitive substring. The needle is stored already folded.
    Text { needle: String },
    /// Inclusive numeric range, either bound optional
    Numeric { min: Option<f64>, max: Option<f64> },
}

impl FilterCriterion {
    pub fn text(needle: &str) -> Self {
        Self::Text {
            needle: needle.trim().to_lowercase(),
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::Numeric { min, max }
    }

    /// Whether this criterion can hide anything
    pub fn is_active(&self) -> bool {
        match self {
            Self::Text { needle } => !needle.is_empty(),
            Self::Numeric { min, max } => min.is_some() || max.is_some(),
        }
    }

    /// Evaluate the criterion against one cell's text.
    pub fn matches(&self, cell: &str) -> bool {
        match self {
            Self::Text { needle } => {
                needle.is_empty() || cell.trim().to_lowercase().contains(needle.as_str())
            }
            Self::Numeric { min, max } => match parse_decimal(cell) {
                Some(value) => {
                    if min.is_some_and(|min| value < min) {
                        return false;
                    }
                    if max.is_some_and(|max| value > max) {
                        return false;
                    }
                    true
                }
                // Unparseable cells count as out of range once any bound is set
                None => min.is_none() && max.is_none(),
            },
        }
    }
}

/// Criteria for every column, keyed by column name in schema order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    criteria: IndexMap<String, FilterCriterion>,
}

impl FilterSet {
    /// A filter set that matches everything for the given schema.
    pub fn pass_all(schema: &TableSchema) -> Self {
        let criteria = schema
            .columns()
            .iter()
            .map(|c| {
                let criterion = if c.numeric {
                    FilterCriterion::range(None, None)
                } else {
                    FilterCriterion::text("")
                };
                (c.name.clone(), criterion)
            })
            .collect();
        Self { criteria }
    }

    pub fn with(mut self, column: impl Into<String>, criterion: FilterCriterion) -> Self {
        self.criteria.insert(column.into(), criterion);
        self
    }

    pub fn get(&self, column: &str) -> Option<&FilterCriterion> {
        self.criteria.get(column)
    }

    pub fn active_count(&self) -> usize {
        self.criteria.values().filter(|c| c.is_active()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterCriterion)> {
        self.criteria.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Decide whether `row` passes every criterion in `filters`.
///
/// Columns without a criterion, and criteria naming columns the schema does
/// not know, impose no constraint.
pub fn evaluate(row: &Row, schema: &TableSchema, filters: &FilterSet) -> bool {
    schema.columns().iter().enumerate().all(|(idx, column)| {
        filters
            .get(&column.name)
            .is_none_or(|criterion| criterion.matches(row.cell(idx)))
    })
}

/// Raw contents of one filter input group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterInput {
    Text(String),
    Range { min: String, max: String },
}

impl FilterInput {
    fn criterion(&self) -> FilterCriterion {
        match self {
            Self::Text(value) => FilterCriterion::text(value),
            Self::Range { min, max } => FilterCriterion::range(parse_bound(min), parse_bound(max)),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Text(value) => value.clear(),
            Self::Range { min, max } => {
                min.clear();
                max.clear();
            }
        }
    }
}

/// Which half of a numeric range input is being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Min,
    Max,
}

/// What the user has typed into the filter fields.
///
/// There is one text field per text column and a min/max pair per numeric
/// column. The [`FilterSet`] is rebuilt from scratch on every edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInputs {
    inputs: IndexMap<String, FilterInput>,
}

impl FilterInputs {
    pub fn new(schema: &TableSchema) -> Self {
        let inputs = schema
            .columns()
            .iter()
            .map(|c| {
                let input = if c.numeric {
                    FilterInput::Range {
                        min: String::new(),
                        max: String::new(),
                    }
                } else {
                    FilterInput::Text(String::new())
                };
                (c.name.clone(), input)
            })
            .collect();
        Self { inputs }
    }

    /// Set the text field of a text column. Returns false when the column has
    /// no text field.
    pub fn set_text(&mut self, column: &str, value: impl Into<String>) -> bool {
        match self.inputs.get_mut(column) {
            Some(FilterInput::Text(current)) => {
                *current = value.into();
                true
            }
            _ => false,
        }
    }

    /// Set one bound field of a numeric column. Returns false when the column
    /// has no range fields.
    pub fn set_bound(&mut self, column: &str, bound: RangeBound, value: impl Into<String>) -> bool {
        match self.inputs.get_mut(column) {
            Some(FilterInput::Range { min, max }) => {
                match bound {
                    RangeBound::Min => *min = value.into(),
                    RangeBound::Max => *max = value.into(),
                }
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, column: &str) -> Option<&FilterInput> {
        self.inputs.get(column)
    }

    /// Empty every text field and every bound.
    pub fn clear(&mut self) {
        self.inputs.values_mut().for_each(FilterInput::clear);
    }

    pub fn to_filter_set(&self) -> FilterSet {
        FilterSet {
            criteria: self
                .inputs
                .iter()
                .map(|(name, input)| (name.clone(), input.criterion()))
                .collect(),
        }
    }
}

fn parse_bound(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    parse_leading_number(text)
}

/// Parse a displayed number, accepting a comma as the decimal separator.
pub fn parse_decimal(text: &str) -> Option<f64> {
    parse_leading_number(&text.trim().replacen(',', ".", 1))
}

/// Parse the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// `"12 kg"` parses as 12 and `"3.5e2x"` as 350, while `"kg 12"` has no numeric
/// prefix and yields `None`.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
