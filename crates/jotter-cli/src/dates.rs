//! Due-date arguments.

use chrono::{DateTime, NaiveDate};

/// Parse a due date into epoch milliseconds.
///
/// Accepts RFC 3339 (`2026-11-02T09:00:00Z`), a plain date (midnight UTC),
/// raw epoch milliseconds, or `none` to clear the due date (`0`).
pub fn parse_due(input: &str) -> Result<i64, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("none") {
        return Ok(0);
    }
    if let Ok(ms) = input.parse::<i64>() {
        if ms < 0 {
            return Err("epoch milliseconds must not be negative".to_string());
        }
        return Ok(ms);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp_millis());
        }
    }
    Err(format!(
        "'{}' is not a date (use RFC 3339, YYYY-MM-DD, epoch milliseconds or 'none')",
        input
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_due_formats() {
        assert_eq!(parse_due("none"), Ok(0));
        assert_eq!(parse_due("1700000000000"), Ok(1_700_000_000_000));
        assert_eq!(parse_due("2023-11-14T22:13:20Z"), Ok(1_700_000_000_000));
        assert_eq!(parse_due("1970-01-02"), Ok(86_400_000));
    }

    #[test]
    fn test_parse_due_rejects_garbage() {
        assert!(parse_due("next tuesday").is_err());
        assert!(parse_due("-5").is_err());
    }
}
