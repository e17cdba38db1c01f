use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Absence, Loot};
use crate::dates::format_date;
use crate::error::{GuildError, GuildResult};

/// Raid difficulty, stored lowercase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Lfr,
    #[default]
    Normal,
    Heroic,
    Mythic,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Lfr,
        Difficulty::Normal,
        Difficulty::Heroic,
        Difficulty::Mythic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Lfr => "lfr",
            Difficulty::Normal => "normal",
            Difficulty::Heroic => "heroic",
            Difficulty::Mythic => "mythic",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == lowered)
            .ok_or_else(|| {
                GuildError::validation(
                    "difficulty",
                    format!("`{s}` is not one of lfr, normal, heroic, mythic"),
                )
            })
    }
}

/// One scheduled raid night, unique on (name, date, difficulty).
///
/// `absences` and `loots` are projections filled when the raid is read by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raid {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub difficulty: Difficulty,
    pub absences: Vec<Absence>,
    pub loots: Vec<Loot>,
}

impl Raid {
    pub fn new(name: &str, date: NaiveDate, difficulty: Difficulty) -> GuildResult<Self> {
        let raid = Self {
            id: 0,
            name: name.trim().to_string(),
            date,
            difficulty,
            absences: Vec::new(),
            loots: Vec::new(),
        };
        raid.validate()?;
        Ok(raid)
    }

    /// Only the name is checked; raids are not held to player-style naming.
    pub fn validate(&self) -> GuildResult<()> {
        super::check_text("raid name", &self.name)
    }

    /// `name dd/mm/yy difficulty`, used in replies and error keys.
    pub fn label(&self) -> String {
        format!("{} {} {}", self.name, format_date(self.date), self.difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Mythic".parse::<Difficulty>().unwrap(), Difficulty::Mythic);
        assert_eq!(" lfr ".parse::<Difficulty>().unwrap(), Difficulty::Lfr);
        assert!("legendary".parse::<Difficulty>().is_err());
    }

    #[test]
    fn label_uses_chat_date_format() {
        let date = NaiveDate::from_ymd_opt(2030, 9, 1).unwrap();
        let raid = Raid::new("Nerub-ar Palace", date, Difficulty::Heroic).unwrap();
        assert_eq!(raid.label(), "Nerub-ar Palace 01/09/30 heroic");
    }

    #[test]
    fn blank_name_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2030, 9, 1).unwrap();
        assert!(Raid::new("  ", date, Difficulty::Normal).is_err());
    }
}
