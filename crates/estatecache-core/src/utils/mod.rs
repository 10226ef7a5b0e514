//! Utility functions for string formatting and date handling.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_date, format_optional, format_price, parse_date, to_iso_timestamp, truncate_string};
