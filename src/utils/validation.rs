use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use validator::Validate;

use crate::errors::AppError;

lazy_static! {
    static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid");
}

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate()
        .map_err(|err| AppError::Validation(err.to_string()))
}

/// Parses a `YYYY-MM-DD` calendar date, rejecting impossible dates.
pub fn parse_activity_date(raw: &str) -> Result<NaiveDate, AppError> {
    if !DATE_RE.is_match(raw) {
        return Err(AppError::Validation("Date must be in YYYY-MM-DD format".to_string()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid calendar date: {}", raw)))
}

/// The `date` query parameter is mandatory for day-scoped reads.
pub fn require_date(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw {
        Some(raw) if !raw.is_empty() => parse_activity_date(raw),
        _ => Err(AppError::Validation("Date parameter is required".to_string())),
    }
}
