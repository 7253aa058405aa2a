//! # Validation Errors
//! The single error taxonomy the engine surfaces. Everything is raised at the
//! boundary (CSV cleaning, filter-argument validation); the aggregation
//! functions themselves assume already-validated input and never fail.

use chrono::NaiveDate;

/// Boundary-level validation failure. Carries enough context to point the
/// operator at the offending row or argument.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Filter period with `start > end`.
    #[error("invalid period: start {start} is after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// A required CSV field is empty or missing.
    #[error("row {line}: missing required field '{field}'")]
    MissingField { line: usize, field: &'static str },

    /// A date cell that could not be parsed with any accepted format.
    #[error("row {line} (customer '{customer_id}'): malformed date '{value}' in '{field}'")]
    MalformedDate {
        line: usize,
        customer_id: String,
        field: &'static str,
        value: String,
    },

    /// Revenue below zero.
    #[error("row {line} (customer '{customer_id}'): negative revenue {revenue}")]
    NegativeRevenue {
        line: usize,
        customer_id: String,
        revenue: f64,
    },

    /// `start_date` after `end_date` within one record.
    #[error("row {line} (customer '{customer_id}'): start date {start} is after end date {end}")]
    InvertedDates {
        line: usize,
        customer_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// The CSV itself was unreadable (I/O, broken quoting, wrong arity).
    #[error("row {line}: unreadable record: {message}")]
    UnreadableRow { line: usize, message: String },
}
