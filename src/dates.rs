//! `DD/MM/YY` dates at the chat edge, and inclusive day ranges.

use chrono::{Days, NaiveDate};

use crate::error::{GuildError, GuildResult};

pub const DATE_FORMAT: &str = "%d/%m/%y";

/// Separator of a `from..to` range written as a single token.
pub const RANGE_SEPARATOR: &str = "..";

/// Longest accepted range, both ends included.
pub const MAX_RANGE_DAYS: i64 = 62;

/// Parse exactly `DD/MM/YY`. Single-digit days or months and four-digit
/// years are rejected.
pub fn parse_date(token: &str) -> GuildResult<NaiveDate> {
    let bytes = token.as_bytes();
    let shaped = bytes.len() == 8
        && bytes[2] == b'/'
        && bytes[5] == b'/'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());
    if !shaped {
        return Err(GuildError::validation(
            "date",
            format!("`{token}` is not in DD/MM/YY format"),
        ));
    }
    NaiveDate::parse_from_str(token, DATE_FORMAT)
        .map_err(|e| GuildError::validation("date", format!("`{token}`: {e}")))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Every calendar day from `from` to `to`, both included. `to` defaults to
/// `from`.
pub fn expand_dates(from: &str, to: Option<&str>) -> GuildResult<Vec<NaiveDate>> {
    let start = parse_date(from)?;
    let end = match to {
        Some(to) => parse_date(to)?,
        None => start,
    };
    days_between(start, end)
}

/// Accept either `DD/MM/YY` or `DD/MM/YY..DD/MM/YY`.
pub fn expand_range(token: &str) -> GuildResult<Vec<NaiveDate>> {
    match token.split_once(RANGE_SEPARATOR) {
        Some((from, to)) => expand_dates(from, Some(to)),
        None => expand_dates(token, None),
    }
}

pub fn days_between(start: NaiveDate, end: NaiveDate) -> GuildResult<Vec<NaiveDate>> {
    if end < start {
        return Err(GuildError::validation(
            "date range",
            format!(
                "end {} is before start {}",
                format_date(end),
                format_date(start)
            ),
        ));
    }
    let span = (end - start).num_days() + 1;
    if span > MAX_RANGE_DAYS {
        return Err(GuildError::validation(
            "date range",
            format!("{span} days requested, at most {MAX_RANGE_DAYS} allowed"),
        ));
    }
    let mut days = Vec::with_capacity(span as usize);
    let mut day = start;
    while day <= end {
        days.push(day);
        day = match day.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_date_is_one_day() {
        let days = expand_dates("24/12/24", None).unwrap();
        assert_eq!(days, vec![NaiveDate::from_ymd_opt(2024, 12, 24).unwrap()]);
    }

    #[test]
    fn range_crosses_month_boundary() {
        let days = expand_range("30/04/25..02/05/25").unwrap();
        let rendered: Vec<String> = days.into_iter().map(format_date).collect();
        assert_eq!(rendered, ["30/04/25", "01/05/25", "02/05/25"]);
    }

    #[test]
    fn loose_shapes_are_rejected() {
        for token in ["1/09/30", "01/9/30", "01/09/2030", "01-09-30", "aa/bb/cc", ""] {
            assert!(parse_date(token).is_err(), "{token} should not parse");
        }
    }

    #[test]
    fn range_length_is_capped() {
        let start = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        let last_ok = start + Days::new(MAX_RANGE_DAYS as u64 - 1);
        assert_eq!(days_between(start, last_ok).unwrap().len(), MAX_RANGE_DAYS as usize);
        assert!(days_between(start, last_ok + Days::new(1)).is_err());
    }

    #[test]
    fn impossible_calendar_day_is_rejected() {
        assert!(parse_date("31/02/25").is_err());
    }
}
