//! Input helpers shared by the request DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// A list field that clients send either as a JSON array or as one string
/// separated by commas or newlines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FlexibleList {
    Items(Vec<String>),
    Text(String),
}

impl FlexibleList {
    pub fn into_vec(self) -> Vec<String> {
        let items = match self {
            FlexibleList::Items(items) => items,
            FlexibleList::Text(text) => text.split([',', '\n']).map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

pub fn flexible_list(value: Option<FlexibleList>) -> Vec<String> {
    value.map(FlexibleList::into_vec).unwrap_or_default()
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::bad_request(format!("Invalid date: {value}")))
}

/// Optional date input; blank strings count as absent.
pub fn parse_optional_date(value: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(v).map(Some),
        None => Ok(None),
    }
}

/// Treats blank strings and the literals `null`/`undefined` as absent.
pub fn meaningful(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "null" && *v != "undefined")
}

/// Clamps `page` to `1..` such that `page * limit` still fits in an `i64`.
pub fn page_number(page: Option<u64>, limit: u64) -> u64 {
    let last = i64::MAX as u64 / limit.max(1);
    page.unwrap_or(1).clamp(1, last)
}

pub fn page_window(page: Option<u64>, limit: Option<u64>, default_limit: u64) -> (u64, u64) {
    let limit = limit.unwrap_or(default_limit).clamp(1, 100);
    (page_number(page, limit), limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Body {
        image_urls: Option<FlexibleList>,
        #[serde(default, deserialize_with = "double_option")]
        parent_category: Option<Option<String>>,
    }

    #[test]
    fn list_accepts_array_or_separated_text() {
        let body: Body = serde_json::from_str(r#"{"imageUrls": ["a.jpg", " b.jpg ", ""]}"#).unwrap();
        assert_eq!(flexible_list(body.image_urls), vec!["a.jpg", "b.jpg"]);

        let body: Body = serde_json::from_str(r#"{"imageUrls": "a.jpg, b.jpg\nc.jpg,,"}"#).unwrap();
        assert_eq!(flexible_list(body.image_urls), vec!["a.jpg", "b.jpg", "c.jpg"]);

        let body: Body = serde_json::from_str("{}").unwrap();
        assert!(flexible_list(body.image_urls).is_empty());
    }

    #[test]
    fn explicit_null_differs_from_absent() {
        let body: Body = serde_json::from_str(r#"{"parentCategory": null}"#).unwrap();
        assert_eq!(body.parent_category, Some(None));
        let body: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(body.parent_category, None);
    }

    #[test]
    fn huge_pages_stay_within_offset_range() {
        let (page, limit) = page_window(Some(u64::MAX), Some(u64::MAX), 20);
        assert_eq!(limit, 100);
        assert!((page - 1).checked_mul(limit).is_some());
        assert!(i64::try_from(page * limit).is_ok());

        assert_eq!(page_window(Some(0), None, 20), (1, 20));
        assert_eq!(page_window(None, Some(0), 20), (1, 1));

        let page = page_number(Some(u64::MAX), 12);
        assert!(i64::try_from(page * 12).is_ok());
        assert_eq!(page_number(Some(3), 12), 3);
    }

    #[test]
    fn dates_accept_plain_days_and_timestamps() {
        let day = parse_date("2024-03-09").unwrap();
        assert_eq!((day.year(), day.month(), day.day(), day.hour()), (2024, 3, 9, 0));

        let ts = parse_date("2024-03-09T10:30:00+05:30").unwrap();
        assert_eq!(ts.hour(), 5);

        assert!(parse_date("yesterday").is_err());
        assert_eq!(parse_optional_date(Some("  ")).unwrap(), None);
    }

    #[test]
    fn placeholder_values_are_ignored() {
        assert_eq!(meaningful(Some("undefined")), None);
        assert_eq!(meaningful(Some("null")), None);
        assert_eq!(meaningful(Some(" Sarees ")), Some("Sarees"));
    }

    #[test]
    fn page_window_is_clamped() {
        assert_eq!(page_window(None, None, 20), (1, 20));
        assert_eq!(page_window(Some(0), Some(500), 20), (1, 100));
    }
}
