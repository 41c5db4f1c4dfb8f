use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::errors::ApiError;

/// Longest range the checklist listing accepts
pub const MAX_RANGE_DAYS: i64 = 366;

/// Calendar years accepted from clients for plan and checklist dates
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Emails are stored trimmed and lowercased so uniqueness is case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Reject blank strings that serde happily accepts
pub fn require_non_blank(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{} is required", field)));
    }
    Ok(())
}

/// Upper bound on free-text fields, counted in characters
pub fn check_max_chars(value: Option<&str>, max: usize, field: &str) -> Result<(), ApiError> {
    match value {
        Some(value) if value.chars().count() > max => Err(ApiError::bad_request(format!(
            "{} must be at most {} characters",
            field, max
        ))),
        _ => Ok(()),
    }
}

/// For partial updates: an omitted key stays `None`, an explicit `null`
/// becomes `Some(None)`. Use together with `#[serde(default)]`.
pub fn deserialize_clearable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn phone_pattern() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    // Optional leading +, digits with spaces or dashes, 8 to 20 characters
    PHONE.get_or_init(|| Regex::new(r"^\+?[0-9][0-9 \-]{6,18}[0-9]$").unwrap())
}

pub fn validate_phone(phone: Option<&str>) -> Result<(), ApiError> {
    match phone {
        Some(phone) if !phone_pattern().is_match(phone.trim()) => {
            Err(ApiError::bad_request("Invalid phone number"))
        }
        _ => Ok(()),
    }
}

/// Monday on or before `date`, clamped to the first representable day
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
        .unwrap_or(NaiveDate::MIN)
}

/// 400 for dates outside the years the API stores
pub fn ensure_supported_date(date: NaiveDate, field: &str) -> Result<NaiveDate, ApiError> {
    if !SUPPORTED_YEARS.contains(&date.year()) {
        return Err(ApiError::bad_request(format!(
            "{} must be between years {} and {}",
            field,
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )));
    }
    Ok(date)
}

fn shift(date: NaiveDate, days: u64, forward: bool) -> Result<NaiveDate, ApiError> {
    let shifted = if forward {
        date.checked_add_days(Days::new(days))
    } else {
        date.checked_sub_days(Days::new(days))
    };
    shifted.ok_or_else(|| ApiError::bad_request("Date out of range"))
}

/// Inclusive date range, defaulting to the week containing `today`
pub fn resolve_date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let from = from.map(|date| ensure_supported_date(date, "from")).transpose()?;
    let to = to.map(|date| ensure_supported_date(date, "to")).transpose()?;

    let (from, to) = match (from, to) {
        (Some(from), Some(to)) => (from, to),
        (Some(from), None) => (from, shift(from, 6, true)?),
        (None, Some(to)) => (shift(to, 6, false)?, to),
        (None, None) => {
            let start = week_start(today);
            (start, shift(start, 6, true)?)
        }
    };

    if from > to {
        return Err(ApiError::bad_request("'from' must not be after 'to'"));
    }

    if (to - from).num_days() >= MAX_RANGE_DAYS {
        return Err(ApiError::bad_request(format!(
            "Date range cannot exceed {} days",
            MAX_RANGE_DAYS
        )));
    }

    Ok((from, to))
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    /// Maximum number of items to return (default: 50, max: 100)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
}

impl PaginationQuery {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(limit) = self.limit {
            if !(1..=100).contains(&limit) {
                return Err(ApiError::bad_request("Limit must be between 1 and 100"));
            }
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err(ApiError::bad_request("Offset must be non-negative"));
            }
        }
        Ok(())
    }

    pub fn get_limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    pub fn get_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Coach@Example.COM "), "coach@example.com");
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("Leg day", "title").is_ok());
        assert!(require_non_blank("   ", "title").is_err());
    }

    #[derive(Debug, Default, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_clearable")]
        note: Option<Option<String>>,
    }

    #[test]
    fn test_deserialize_clearable_distinguishes_null_from_missing() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"note": "hi"}"#).unwrap();

        assert_eq!(missing.note, None);
        assert_eq!(cleared.note, Some(None));
        assert_eq!(set.note, Some(Some("hi".to_string())));
    }

    #[test]
    fn test_check_max_chars() {
        assert!(check_max_chars(None, 3, "note").is_ok());
        assert!(check_max_chars(Some("abc"), 3, "note").is_ok());
        assert!(check_max_chars(Some("abcd"), 3, "note").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone(None).is_ok());
        assert!(validate_phone(Some("+91 98765 43210")).is_ok());
        assert!(validate_phone(Some("555-123-4567")).is_ok());
        assert!(validate_phone(Some("call me")).is_err());
        assert!(validate_phone(Some("12")).is_err());
    }

    #[test]
    fn test_week_start() {
        // 2024-01-17 is a Wednesday
        assert_eq!(week_start(date(2024, 1, 17)), date(2024, 1, 15));
        assert_eq!(week_start(date(2024, 1, 15)), date(2024, 1, 15));
        assert_eq!(week_start(date(2024, 1, 21)), date(2024, 1, 15));
        // Across a month boundary
        assert_eq!(week_start(date(2024, 3, 2)), date(2024, 2, 26));
    }

    #[test]
    fn test_resolve_date_range_defaults_to_current_week() {
        let (from, to) = resolve_date_range(None, None, date(2024, 1, 17)).unwrap();
        assert_eq!(from, date(2024, 1, 15));
        assert_eq!(to, date(2024, 1, 21));
    }

    #[test]
    fn test_resolve_date_range_rejects_bad_ranges() {
        let today = date(2024, 1, 17);
        assert!(resolve_date_range(Some(date(2024, 2, 1)), Some(date(2024, 1, 1)), today).is_err());
        assert!(resolve_date_range(Some(date(2023, 1, 1)), Some(date(2024, 1, 2)), today).is_err());
        assert!(resolve_date_range(Some(date(2024, 1, 1)), Some(date(2024, 1, 1)), today).is_ok());
    }

    #[test]
    fn test_resolve_date_range_rejects_extreme_dates() {
        let today = date(2024, 1, 17);
        let far_future = NaiveDate::from_ymd_opt(262142, 12, 30).unwrap();

        assert!(resolve_date_range(Some(far_future), None, today).is_err());
        assert!(resolve_date_range(None, Some(NaiveDate::MIN), today).is_err());
        assert!(resolve_date_range(Some(NaiveDate::MAX), Some(NaiveDate::MAX), today).is_err());
        // Last supported day still expands forward without overflowing
        assert!(resolve_date_range(None, Some(date(9999, 12, 31)), today).is_ok());
    }

    #[test]
    fn test_ensure_supported_date() {
        assert!(ensure_supported_date(date(2024, 1, 17), "date").is_ok());
        assert!(ensure_supported_date(date(10000, 1, 1), "date").is_err());
        assert!(ensure_supported_date(NaiveDate::MIN, "date").is_err());
    }

    #[test]
    fn test_week_start_at_lower_bound_does_not_panic() {
        assert_eq!(week_start(NaiveDate::MIN), NaiveDate::MIN);
    }

    #[test]
    fn test_pagination() {
        let query = PaginationQuery::default();
        assert!(query.validate().is_ok());
        assert_eq!(query.get_limit(), 50);
        assert_eq!(query.get_offset(), 0);

        let query = PaginationQuery {
            limit: Some(500),
            offset: Some(-1),
        };
        assert!(query.validate().is_err());
        assert_eq!(query.get_limit(), 100);
        assert_eq!(query.get_offset(), 0);
    }
}
