use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PlayerRef, SeasonCalendar};
use crate::error::GuildResult;

/// A disciplinary record against one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub season: String,
    pub reason: String,
    pub player: PlayerRef,
}

impl Strike {
    /// A strike stamped now.
    pub fn new(reason: &str, player: PlayerRef, calendar: &SeasonCalendar) -> GuildResult<Self> {
        Self::at(reason, player, Utc::now(), calendar)
    }

    /// A strike stamped at `date`; the season follows from the calendar.
    pub fn at(
        reason: &str,
        player: PlayerRef,
        date: DateTime<Utc>,
        calendar: &SeasonCalendar,
    ) -> GuildResult<Self> {
        let strike = Self {
            id: 0,
            date,
            season: calendar.season_for(date.date_naive()),
            reason: reason.to_string(),
            player,
        };
        strike.validate()?;
        Ok(strike)
    }

    pub fn validate(&self) -> GuildResult<()> {
        super::check_text("strike reason", &self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn someone() -> PlayerRef {
        PlayerRef {
            id: 7,
            name: "someone".into(),
        }
    }

    #[test]
    fn reason_length_bounds() {
        let calendar = SeasonCalendar::default();
        assert!(Strike::new(&"x".repeat(255), someone(), &calendar).is_ok());
        assert!(Strike::new(&"x".repeat(256), someone(), &calendar).is_err());
        assert!(Strike::new("", someone(), &calendar).is_err());
    }

    #[test]
    fn season_is_derived_from_the_stamp() {
        let calendar: SeasonCalendar = "S1:2024-09-10:2025-02-24,S2:2025-02-25".parse().unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap();
        let strike = Strike::at("late for pull", someone(), at, &calendar).unwrap();
        assert_eq!(strike.season, "S2");
        assert_eq!(strike.date, at);
    }
}
