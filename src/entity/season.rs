//! Season labels for strikes.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::GuildError;

pub const OFF_SEASON: &str = "off-season";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub label: String,
    pub starts: NaiveDate,
    /// Last day of the season; open-ended when `None`.
    pub ends: Option<NaiveDate>,
}

impl Season {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.starts && self.ends.map_or(true, |end| date <= end)
    }
}

/// Ordered season windows. A date outside every window is [`OFF_SEASON`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonCalendar {
    seasons: Vec<Season>,
}

impl Default for SeasonCalendar {
    fn default() -> Self {
        Self {
            seasons: vec![Season {
                label: "S1".to_string(),
                starts: NaiveDate::from_ymd_opt(2024, 9, 10).unwrap_or_default(),
                ends: None,
            }],
        }
    }
}

impl SeasonCalendar {
    pub fn new(mut seasons: Vec<Season>) -> Self {
        seasons.sort_by_key(|s| s.starts);
        Self { seasons }
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    /// The latest-starting window containing `date` wins when windows overlap.
    pub fn season_for(&self, date: NaiveDate) -> String {
        self.seasons
            .iter()
            .rev()
            .find(|s| s.contains(date))
            .map(|s| s.label.clone())
            .unwrap_or_else(|| OFF_SEASON.to_string())
    }
}

/// `LABEL:YYYY-MM-DD[:YYYY-MM-DD],...`
impl FromStr for SeasonCalendar {
    type Err = GuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_day = |raw: &str| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|e| GuildError::validation("season", format!("`{raw}`: {e}")))
        };

        let mut seasons = Vec::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.split(':');
            let label = parts.next().unwrap_or_default().trim();
            if label.is_empty() {
                return Err(GuildError::validation("season", format!("`{entry}` has no label")));
            }
            let starts = match parts.next() {
                Some(raw) => parse_day(raw)?,
                None => {
                    return Err(GuildError::validation(
                        "season",
                        format!("`{entry}` has no start date"),
                    ))
                }
            };
            let ends = parts.next().map(parse_day).transpose()?;
            if ends.is_some_and(|end| end < starts) {
                return Err(GuildError::validation("season", format!("`{entry}` ends before it starts")));
            }
            seasons.push(Season {
                label: label.to_string(),
                starts,
                ends,
            });
        }
        Ok(Self::new(seasons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_calendar_is_open_ended() {
        let calendar = SeasonCalendar::default();
        assert_eq!(calendar.season_for(day(2024, 9, 9)), OFF_SEASON);
        assert_eq!(calendar.season_for(day(2024, 9, 10)), "S1");
        assert_eq!(calendar.season_for(day(2031, 1, 1)), "S1");
    }

    #[test]
    fn parses_bounded_windows() {
        let calendar: SeasonCalendar = "S2:2025-02-25, S1:2024-09-10:2025-02-24".parse().unwrap();
        assert_eq!(calendar.seasons()[0].label, "S1");
        assert_eq!(calendar.season_for(day(2025, 2, 24)), "S1");
        assert_eq!(calendar.season_for(day(2025, 2, 25)), "S2");
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!("S1".parse::<SeasonCalendar>().is_err());
        assert!(":2024-01-01".parse::<SeasonCalendar>().is_err());
        assert!("S1:2024-13-01".parse::<SeasonCalendar>().is_err());
        assert!("S1:2024-05-01:2024-04-01".parse::<SeasonCalendar>().is_err());
    }
}
