use chrono::{DateTime, NaiveDate};

/// Format a price in whole pesos with dot thousands separators: `$1.250.000`
pub fn format_price(price: f64) -> String {
    let rounded = price.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

/// Parse the date part of `YYYY-MM-DD` or an ISO timestamp
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.date_naive());
    }
    date.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    match parse_date(date) {
        Some(d) => d.format("%b %d, %Y").to_string(),
        None => date.to_string(),
    }
}

/// Normalize a form date (`YYYY-MM-DD`) to the UTC midnight timestamp the API stores.
/// Values that already carry a time, or cannot be parsed, pass through unchanged.
pub fn to_iso_timestamp(date: &str) -> String {
    if DateTime::parse_from_rfc3339(date).is_ok() {
        return date.to_string();
    }
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => format!("{}T00:00:00.000Z", d.format("%Y-%m-%d")),
        Err(_) => date.to_string(),
    }
}
