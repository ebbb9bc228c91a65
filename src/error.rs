//! Plan error types

use thiserror::Error;

use crate::tools::checkout::CheckoutError;

/// Errors surfaced by plan controller transitions
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid {field}: '{value}' is not a positive number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid {field}: '{value}' is above the maximum of {max}")]
    OutOfRange {
        field: &'static str,
        value: String,
        max: f64,
    },

    #[error("Computed {field} is not a finite number")]
    NonFiniteResult { field: &'static str },

    #[error("Invalid {field}: '{value}'. Valid values: {expected}")]
    InvalidEnum {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Please enter your email before unlocking.")]
    MissingEmail,

    #[error("Checkout failed: {0}")]
    Checkout(#[from] CheckoutError),
}

impl PlanError {
    /// True for errors caused by what the caller typed, as opposed to the provider
    pub fn is_input_error(&self) -> bool {
        !matches!(self, PlanError::Checkout(_))
    }
}

/// Result type for plan operations
pub type PlanResult<T> = Result<T, PlanError>;
