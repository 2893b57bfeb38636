//! Date helpers
//!
//! Every date to timestamp conversion happens in the API layer; repositories
//! only see `i64` Unix millis. Calendar dates use the server's local time zone.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::{AppError, AppResult};

const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Parse `YYYY-MM-DD`
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Local midnight → Unix millis
///
/// Falls back to UTC when local midnight does not exist (DST gap).
pub fn day_start_millis(date: NaiveDate) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of the following day → Unix millis
///
/// Callers compare with `< end` so the whole `date` is included.
pub fn day_end_millis(date: NaiveDate) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day)
}

/// Inclusive `[from, to]` date range to a `[start, end)` millis range
pub fn date_range_millis(
    from: Option<&str>,
    to: Option<&str>,
) -> AppResult<(Option<i64>, Option<i64>)> {
    let start = from.map(parse_date).transpose()?.map(day_start_millis);
    let end = to.map(parse_date).transpose()?.map(day_end_millis);
    if let (Some(s), Some(e)) = (start, end)
        && s >= e
    {
        return Err(AppError::validation("date_from must not be after date_to"));
    }
    Ok((start, end))
}

/// Start of the current month → Unix millis
pub fn month_start_millis(now: DateTime<Local>) -> i64 {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap_or(now.date_naive());
    day_start_millis(first)
}

/// Same day `months` months earlier, clamped to the month's last day
pub fn months_ago_millis(now: DateTime<Local>, months: u32) -> i64 {
    let date = now
        .date_naive()
        .checked_sub_months(chrono::Months::new(months))
        .unwrap_or(now.date_naive());
    day_start_millis(date)
}

/// Spanish long date: `14 de marzo de 2025`
pub fn spanish_long_date(millis: i64) -> String {
    let date = DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).date_naive())
        .unwrap_or_else(|| Local::now().date_naive());
    format!(
        "{} de {} de {}",
        date.day(),
        SPANISH_MONTHS[date.month0() as usize],
        date.year()
    )
}

/// Date accepted in request bodies: Unix millis or a `YYYY-MM-DD` / RFC 3339 string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Millis(i64),
    Text(String),
}

impl DateInput {
    pub fn to_millis(&self) -> AppResult<i64> {
        match self {
            DateInput::Millis(ms) => Ok(*ms),
            DateInput::Text(text) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(text.trim()) {
                    return Ok(dt.timestamp_millis());
                }
                parse_date(text).map(day_start_millis)
            }
        }
    }
}

/// Optional date → optional millis
pub fn opt_millis(input: Option<&DateInput>) -> AppResult<Option<i64>> {
    input.map(DateInput::to_millis).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-03-14").is_ok());
        assert!(parse_date("14/03/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn test_day_range_covers_whole_day() {
        let date = parse_date("2025-03-14").unwrap();
        let start = day_start_millis(date);
        let end = day_end_millis(date);
        assert!(end > start);
        // 23h, 24h or 25h depending on DST
        let hours = (end - start) / 3_600_000;
        assert!((23..=25).contains(&hours));
    }

    #[test]
    fn test_date_range_rejects_inverted_range() {
        assert!(date_range_millis(Some("2025-03-15"), Some("2025-03-14")).is_err());
        let (s, e) = date_range_millis(Some("2025-03-14"), Some("2025-03-14")).unwrap();
        assert!(s.unwrap() < e.unwrap());
        assert_eq!(date_range_millis(None, None).unwrap(), (None, None));
    }

    #[test]
    fn test_spanish_long_date() {
        let ms = day_start_millis(parse_date("2025-03-14").unwrap()) + 3_600_000;
        assert_eq!(spanish_long_date(ms), "14 de marzo de 2025");
    }

    #[test]
    fn test_date_input() {
        let ms: DateInput = serde_json::from_str("1710374400000").unwrap();
        assert_eq!(ms.to_millis().unwrap(), 1_710_374_400_000);

        let text: DateInput = serde_json::from_str("\"2024-03-14T00:00:00Z\"").unwrap();
        assert_eq!(text.to_millis().unwrap(), 1_710_374_400_000);

        let day: DateInput = serde_json::from_str("\"2024-03-14\"").unwrap();
        assert!(day.to_millis().is_ok());

        let bad: DateInput = serde_json::from_str("\"mañana\"").unwrap();
        assert!(bad.to_millis().is_err());
    }
}
