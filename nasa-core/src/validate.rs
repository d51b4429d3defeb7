//! Request parameter checks shared by every endpoint.
//!
//! Sols follow the strict contract: ASCII digits only, so `"1.5"`, `"+3"`
//! and `"-1"` are all rejected.

use chrono::NaiveDate;

use crate::error::ValidationError;

/// `true` iff `s` is `YYYY-MM-DD` and names a real calendar day.
pub fn is_valid_date(s: &str) -> bool {
    parse_date(s).is_ok()
}

/// `true` iff `s` is a non-empty run of ASCII digits.
pub fn is_valid_sol(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `true` iff a value is present and has non-whitespace content.
pub fn is_non_empty(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let invalid = || ValidationError::new("date", "date must be a valid calendar date in YYYY-MM-DD format");

    let bytes = s.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(invalid());
    }

    let year: i32 = s[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = s[5..7].parse().map_err(|_| invalid())?;
    let day: u32 = s[8..10].parse().map_err(|_| invalid())?;

    // from_ymd_opt refuses to roll 2023-02-30 over into March.
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

pub fn parse_sol(s: &str) -> Result<u32, ValidationError> {
    if !is_valid_sol(s) {
        return Err(ValidationError::new("sol", "sol must be a non-negative integer"));
    }
    s.parse()
        .map_err(|_| ValidationError::new("sol", "sol must be a non-negative integer within range"))
}

pub fn require_non_empty<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if is_non_empty(Some(v)) => Ok(v.trim()),
        _ => Err(ValidationError::new(field, format!("{field} must be a non-empty string"))),
    }
}
