// SPDX-License-Identifier: Apache-2.0

//! Display helpers shared by aggregation and rendering.
//!
//! Blank strings are treated as missing everywhere; a missing scalar renders
//! as [`PLACEHOLDER`].

use chrono::NaiveDate;

pub const PLACEHOLDER: &str = "-";
pub const DATE_DISPLAY_FORMAT: &str = "%d/%m/%Y";

#[must_use]
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_blank(v))
}

#[must_use]
pub fn non_blank_owned(value: Option<String>) -> Option<String> {
    value.filter(|v| !is_blank(v))
}

#[must_use]
pub fn or_placeholder(value: Option<&str>) -> String {
    non_blank(value)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[must_use]
pub fn or_empty(value: Option<&str>) -> String {
    non_blank(value)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_DISPLAY_FORMAT).to_string()
}

#[must_use]
pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Shortest decimal form; `None` for NaN and infinities.
#[must_use]
pub fn format_number(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    if value == 0.0 {
        return Some("0".to_string());
    }
    Some(format!("{value}"))
}

/// Accepts `yyyy-MM-dd` with an optional time suffix, or `dd/MM/yyyy`.
#[must_use]
pub fn parse_lenient_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = trimmed
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, DATE_DISPLAY_FORMAT))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_missing() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" x ")), Some(" x "));
        assert_eq!(or_placeholder(Some("\t")), "-");
        assert_eq!(or_placeholder(None), "-");
        assert_eq!(or_placeholder(Some(" 0.21 ")), "0.21");
        assert_eq!(or_empty(None), "");
    }

    #[test]
    fn dates_render_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).expect("date");
        assert_eq!(format_date(date), "15/07/2024");
        assert_eq!(format_optional_date(None), "-");
    }

    #[test]
    fn lenient_date_parsing_accepts_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 15);
        assert_eq!(parse_lenient_date("2024-07-15"), expected);
        assert_eq!(parse_lenient_date("2024-07-15T00:00:00Z"), expected);
        assert_eq!(parse_lenient_date("2024-07-15 10:30:00"), expected);
        assert_eq!(parse_lenient_date("15/07/2024"), expected);
        assert_eq!(parse_lenient_date("July 15"), None);
        assert_eq!(parse_lenient_date(""), None);
    }

    #[test]
    fn numbers_use_shortest_form() {
        assert_eq!(format_number(0.21).as_deref(), Some("0.21"));
        assert_eq!(format_number(235.0).as_deref(), Some("235"));
        assert_eq!(format_number(-20.0).as_deref(), Some("-20"));
        assert_eq!(format_number(-0.0).as_deref(), Some("0"));
        assert_eq!(format_number(f64::NAN), None);
    }
}
