//! Row shapes returned by the backend's SELECTs and their conversion into
//! entities.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::entity::{Absence, Difficulty, Fail, Loot, Player, PlayerRef, Raid, Strike};
use crate::error::GuildResult;

pub(crate) const PLAYER_COLUMNS: &str = "SELECT p.id, p.name, p.discord_id FROM players p";

pub(crate) const RAID_COLUMNS: &str = "SELECT r.id, r.name, r.date, r.difficulty FROM raids r";

pub(crate) const STRIKE_COLUMNS: &str = "SELECT s.id, s.created_at, s.season, s.reason, \
     s.player_id, COALESCE(p.name, '') AS player_name \
     FROM strikes s LEFT JOIN players p ON p.id = s.player_id";

/// Raid columns shared by every row that joins `raids r`.
macro_rules! raid_join {
    ($head:literal, $from:literal) => {
        concat!(
            $head,
            ", r.id AS raid_id, r.name AS raid_name, r.date AS raid_date, r.difficulty AS raid_difficulty",
            ", COALESCE(p.name, '') AS player_name ",
            $from,
        )
    };
}

pub(crate) const LOOT_COLUMNS: &str = raid_join!(
    "SELECT l.id, l.name, l.player_id",
    "FROM loots l JOIN raids r ON r.id = l.raid_id LEFT JOIN players p ON p.id = l.player_id"
);

pub(crate) const ABSENCE_COLUMNS: &str = raid_join!(
    "SELECT a.id, a.player_id",
    "FROM absences a JOIN raids r ON r.id = a.raid_id LEFT JOIN players p ON p.id = a.player_id"
);

pub(crate) const FAIL_COLUMNS: &str = raid_join!(
    "SELECT f.id, f.reason, f.player_id",
    "FROM fails f JOIN raids r ON r.id = f.raid_id LEFT JOIN players p ON p.id = f.player_id"
);

#[derive(Debug, FromRow)]
pub(crate) struct PlayerRow {
    pub id: i64,
    pub name: String,
    pub discord_id: Option<String>,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            id: row.id,
            name: row.name,
            discord_id: row.discord_id,
            ..Player::default()
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RaidRow {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub difficulty: String,
}

impl RaidRow {
    pub fn into_raid(self) -> GuildResult<Raid> {
        raid(self.id, self.name, self.date, &self.difficulty)
    }
}

fn raid(id: i64, name: String, date: NaiveDate, difficulty: &str) -> GuildResult<Raid> {
    Ok(Raid {
        id,
        name,
        date,
        difficulty: difficulty.parse::<Difficulty>()?,
        absences: Vec::new(),
        loots: Vec::new(),
    })
}

#[derive(Debug, FromRow)]
pub(crate) struct StrikeRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub season: String,
    pub reason: String,
    pub player_id: i64,
    pub player_name: String,
}

impl From<StrikeRow> for Strike {
    fn from(row: StrikeRow) -> Self {
        Strike {
            id: row.id,
            date: row.created_at,
            season: row.season,
            reason: row.reason,
            player: PlayerRef {
                id: row.player_id,
                name: row.player_name,
            },
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct LootRow {
    pub id: i64,
    pub name: String,
    pub player_id: i64,
    pub player_name: String,
    pub raid_id: i64,
    pub raid_name: String,
    pub raid_date: NaiveDate,
    pub raid_difficulty: String,
}

impl LootRow {
    pub fn into_loot(self) -> GuildResult<Loot> {
        Ok(Loot {
            id: self.id,
            name: self.name,
            raid: raid(self.raid_id, self.raid_name, self.raid_date, &self.raid_difficulty)?,
            player: PlayerRef {
                id: self.player_id,
                name: self.player_name,
            },
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct AbsenceRow {
    pub id: i64,
    pub player_id: i64,
    pub player_name: String,
    pub raid_id: i64,
    pub raid_name: String,
    pub raid_date: NaiveDate,
    pub raid_difficulty: String,
}

impl AbsenceRow {
    pub fn into_absence(self) -> GuildResult<Absence> {
        Ok(Absence {
            id: self.id,
            player: PlayerRef {
                id: self.player_id,
                name: self.player_name,
            },
            raid: raid(self.raid_id, self.raid_name, self.raid_date, &self.raid_difficulty)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct FailRow {
    pub id: i64,
    pub reason: String,
    pub player_id: i64,
    pub player_name: String,
    pub raid_id: i64,
    pub raid_name: String,
    pub raid_date: NaiveDate,
    pub raid_difficulty: String,
}

impl FailRow {
    pub fn into_fail(self) -> GuildResult<Fail> {
        Ok(Fail {
            id: self.id,
            reason: self.reason,
            player: PlayerRef {
                id: self.player_id,
                name: self.player_name,
            },
            raid: raid(self.raid_id, self.raid_name, self.raid_date, &self.raid_difficulty)?,
        })
    }
}
