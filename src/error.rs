//! Error types shared by every calculator engine

use thiserror::Error;

/// Errors raised by the calculator engines and their loaders
#[derive(Debug, Error)]
pub enum CalcError {
    /// An input value is missing, negative, non-finite or otherwise unusable
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A formula would divide by zero (e.g. a zero-month amortization term)
    #[error("division by zero in {context}")]
    DivideByZero { context: &'static str },

    #[error("unknown payoff strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown compounding frequency: {0}")]
    UnknownFrequency(String),

    /// Bracket table is unordered, overlapping, gapped or not closed at the top
    #[error("invalid bracket table: {0}")]
    InvalidBracketTable(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CalcError>;

impl CalcError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject negative and non-finite amounts
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(CalcError::validation(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(CalcError::validation(
            field,
            format!("must not be negative (got {})", value),
        ));
    }
    Ok(value)
}

/// Reject non-finite rates; negative rates are allowed (e.g. deflation)
pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::validation(field, "must be a finite number"))
    }
}
