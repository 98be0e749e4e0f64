//! MediaWiki timestamps.
//!
//! The API always reports times as `YYYY-MM-DDTHH:MM:SSZ`. The trailing `Z`
//! is taken on trust: the value is whatever the wiki believes is UTC, so no
//! timezone conversion is applied and a naive date-time is returned.

use chrono::NaiveDateTime;

use crate::error::{MwError, MwResult};

const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const API_TIMESTAMP_LEN: usize = "YYYY-MM-DDTHH:MM:SSZ".len();

/// Parse an API timestamp such as `2013-05-17T10:00:00Z`.
pub fn parse_date(text: &str) -> MwResult<NaiveDateTime> {
    let invalid = |reason: String| MwError::DateParse {
        input: text.to_string(),
        reason,
    };

    // chrono accepts single-digit fields; the API never emits them
    if text.len() != API_TIMESTAMP_LEN || !text.is_ascii() {
        return Err(invalid(format!(
            "expected {} characters in YYYY-MM-DDTHH:MM:SSZ form",
            API_TIMESTAMP_LEN
        )));
    }

    let parsed = NaiveDateTime::parse_from_str(text, API_TIMESTAMP_FORMAT)
        .map_err(|e| invalid(e.to_string()))?;

    // chrono also skips padding spaces and accepts signed fields
    if format_date(&parsed) != text {
        return Err(invalid("fields must be zero-padded digits".to_string()));
    }

    Ok(parsed)
}

/// Render a timestamp in the API's `YYYY-MM-DDTHH:MM:SSZ` form.
pub fn format_date(timestamp: &NaiveDateTime) -> String {
    timestamp.format(API_TIMESTAMP_FORMAT).to_string()
}
