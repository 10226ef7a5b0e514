//! Client-side validation run before a request is sent.
//!
//! Ids are Mongo-style 24 character strings. Form rules mirror the
//! back-office create/edit screens; the trace rule `tax <= value` is only
//! checked here and is not verified by the server.

use chrono::{Datelike, Utc};
use thiserror::Error;

use crate::models::{OwnerInput, PropertyInput, PropertyTraceInput};

/// Exact length of every entity id.
pub const ID_LENGTH: usize = 24;

pub const MIN_PROPERTY_PRICE: f64 = 1_000_000.0;
pub const MAX_PROPERTY_PRICE: f64 = 1_000_000_000.0;
pub const MIN_PROPERTY_YEAR: i32 = 1900;

/// How far into the future a construction year may be.
pub const MAX_YEARS_AHEAD: i32 = 5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("id must be exactly 24 characters, got {0:?}")]
    InvalidId(String),

    #[error("{field}: {message}")]
    Field { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_id(id: &str) -> Result<(), ValidationError> {
    if id.chars().count() == ID_LENGTH {
        Ok(())
    } else {
        Err(ValidationError::InvalidId(id.to_string()))
    }
}

fn check_len(field: &str, value: Option<&str>, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.map(|v| v.trim().chars().count()).unwrap_or(0);
    if len < min {
        return Err(ValidationError::field(field, format!("must be at least {} characters", min)));
    }
    if len > max {
        return Err(ValidationError::field(field, format!("cannot exceed {} characters", max)));
    }
    Ok(())
}

/// Validate one trace row. `field` prefixes error paths, e.g. `traces[0]`.
pub fn validate_trace_at(field: &str, trace: &PropertyTraceInput) -> Result<(), ValidationError> {
    if trace.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
        return Err(ValidationError::field(format!("{}.name", field), "is required"));
    }
    if trace.value < 1.0 {
        return Err(ValidationError::field(format!("{}.value", field), "must be greater than 0"));
    }
    if trace.tax < 0.0 {
        return Err(ValidationError::field(format!("{}.tax", field), "cannot be negative"));
    }
    if trace.date_sale.trim().is_empty() {
        return Err(ValidationError::field(format!("{}.dateSale", field), "is required"));
    }
    if trace.tax > trace.value {
        return Err(ValidationError::field(format!("{}.tax", field), "tax cannot exceed value"));
    }
    Ok(())
}

pub fn validate_trace(trace: &PropertyTraceInput) -> Result<(), ValidationError> {
    validate_trace_at("trace", trace)
}

pub fn validate_traces(traces: &[PropertyTraceInput]) -> Result<(), ValidationError> {
    traces
        .iter()
        .enumerate()
        .try_for_each(|(i, t)| validate_trace_at(&format!("traces[{}]", i), t))
}

pub fn validate_property(input: &PropertyInput, current_year: i32) -> Result<(), ValidationError> {
    check_len("name", input.name.as_deref(), 3, 100)?;
    check_len("address", input.address.as_deref(), 5, 200)?;
    if input.price < MIN_PROPERTY_PRICE {
        return Err(ValidationError::field("price", "must be at least $1.000.000"));
    }
    if input.price > MAX_PROPERTY_PRICE {
        return Err(ValidationError::field("price", "cannot exceed $1.000.000.000"));
    }
    check_len("codeInternal", input.code_internal.as_deref(), 3, 20)?;
    if input.year < MIN_PROPERTY_YEAR {
        return Err(ValidationError::field("year", format!("must be {} or later", MIN_PROPERTY_YEAR)));
    }
    if input.year > current_year + MAX_YEARS_AHEAD {
        return Err(ValidationError::field("year", "is too far in the future"));
    }
    match input.id_owner.as_deref() {
        None | Some("") => Err(ValidationError::field("idOwner", "an owner must be selected")),
        Some(id) => validate_id(id),
    }
}

/// Validate a property form against the current calendar year.
pub fn validate_property_now(input: &PropertyInput) -> Result<(), ValidationError> {
    validate_property(input, Utc::now().year())
}

pub fn validate_owner(input: &OwnerInput) -> Result<(), ValidationError> {
    check_len("name", input.name.as_deref(), 2, 100)?;
    check_len("address", input.address.as_deref(), 5, 200)?;
    if input.birthday.trim().is_empty() {
        return Err(ValidationError::field("birthday", "is required"));
    }
    Ok(())
}
