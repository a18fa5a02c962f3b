// ⏰ Temporal Helpers
// Conversions between the compact close-approach timestamp ("2020-Jan-01 00:00")
// and chrono values, plus the plain output format ("2020-01-01 00:00").

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Compact calendar-date format used by the close-approach data source
pub const CD_FORMAT: &str = "%Y-%b-%d %H:%M";

/// Output format for exported and displayed times
pub const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Input format for date criteria
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a compact timestamp such as "2020-Jan-01 00:00"
pub fn cd_to_datetime(calendar_date: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(calendar_date.trim(), CD_FORMAT)
        .with_context(|| format!("Invalid close-approach timestamp: {:?}", calendar_date))
}

/// Inverse of [`cd_to_datetime`]
pub fn datetime_to_cd(dt: &NaiveDateTime) -> String {
    dt.format(CD_FORMAT).to_string()
}

/// Format a datetime for output ("2020-01-01 00:00")
pub fn datetime_to_str(dt: &NaiveDateTime) -> String {
    dt.format(OUTPUT_FORMAT).to_string()
}

/// Inverse of [`datetime_to_str`]
pub fn str_to_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), OUTPUT_FORMAT)
        .with_context(|| format!("Invalid datetime: {:?}", s))
}

/// Parse a plain "YYYY-MM-DD" date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {:?}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cd_round_trip() {
        let dt = cd_to_datetime("1900-Jan-01 00:11").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "1900-01-01 00:11");
        assert_eq!(datetime_to_cd(&dt), "1900-Jan-01 00:11");

        let dt = cd_to_datetime("2089-Dec-31 23:59").unwrap();
        assert_eq!(datetime_to_cd(&dt), "2089-Dec-31 23:59");
    }

    #[test]
    fn test_output_round_trip() {
        let dt = cd_to_datetime("2020-Jan-01 12:30").unwrap();
        let s = datetime_to_str(&dt);
        assert_eq!(s, "2020-01-01 12:30");
        assert_eq!(str_to_datetime(&s).unwrap(), dt);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(cd_to_datetime("2020-01-01 00:00").is_err());
        assert!(cd_to_datetime("").is_err());
        assert!(str_to_datetime("yesterday").is_err());
        assert!(parse_date("2020-13-01").is_err());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2020-01-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }
}
