//! Persistence contract consumed by the use cases.
//!
//! One narrow trait per entity so each use case (and its tests) depends on
//! only the tables it touches. Every method takes the caller's [`Ctx`] and
//! must refuse to start I/O once it is done.
//!
//! Search criteria are plain structs of optional fields: `None` means "do not
//! filter on this column".

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::ctx::Ctx;
use crate::entity::{Absence, Difficulty, Fail, Loot, Player, Raid, Strike};
use crate::error::GuildResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub discord_id: Option<String>,
}

impl PlayerFilter {
    pub fn by_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaidFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub difficulty: Option<Difficulty>,
}

impl RaidFilter {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn exact(raid: &Raid) -> Self {
        Self {
            id: None,
            name: Some(raid.name.clone()),
            date: Some(raid.date),
            difficulty: Some(raid.difficulty),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrikeFilter {
    pub id: Option<i64>,
    pub player_id: Option<i64>,
    pub season: Option<String>,
}

impl StrikeFilter {
    pub fn of_player(player_id: i64) -> Self {
        Self {
            player_id: Some(player_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LootFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub raid_id: Option<i64>,
    pub player_id: Option<i64>,
    /// Matches on the awarding raid's difficulty.
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbsenceFilter {
    pub id: Option<i64>,
    pub player_id: Option<i64>,
    pub raid_id: Option<i64>,
    /// Matches on the missed raid's date.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailFilter {
    pub id: Option<i64>,
    pub player_id: Option<i64>,
    pub raid_id: Option<i64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    async fn search_players(&self, ctx: &Ctx, filter: &PlayerFilter) -> GuildResult<Vec<Player>>;
    async fn create_player(&self, ctx: &Ctx, player: &Player) -> GuildResult<Player>;
    /// Reads the row and hydrates its strikes, loots, missed raids and fails.
    async fn read_player(&self, ctx: &Ctx, id: i64) -> GuildResult<Player>;
    async fn update_player(&self, ctx: &Ctx, player: &Player) -> GuildResult<Player>;
    async fn delete_player(&self, ctx: &Ctx, id: i64) -> GuildResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RaidBackend: Send + Sync {
    async fn search_raids(&self, ctx: &Ctx, filter: &RaidFilter) -> GuildResult<Vec<Raid>>;
    async fn create_raid(&self, ctx: &Ctx, raid: &Raid) -> GuildResult<Raid>;
    /// Reads the row and hydrates its absences and loots.
    async fn read_raid(&self, ctx: &Ctx, id: i64) -> GuildResult<Raid>;
    async fn update_raid(&self, ctx: &Ctx, raid: &Raid) -> GuildResult<Raid>;
    async fn delete_raid(&self, ctx: &Ctx, id: i64) -> GuildResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StrikeBackend: Send + Sync {
    async fn search_strikes(&self, ctx: &Ctx, filter: &StrikeFilter) -> GuildResult<Vec<Strike>>;
    async fn create_strike(&self, ctx: &Ctx, strike: &Strike) -> GuildResult<Strike>;
    async fn read_strike(&self, ctx: &Ctx, id: i64) -> GuildResult<Strike>;
    async fn update_strike(&self, ctx: &Ctx, strike: &Strike) -> GuildResult<Strike>;
    async fn delete_strike(&self, ctx: &Ctx, id: i64) -> GuildResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LootBackend: Send + Sync {
    async fn search_loots(&self, ctx: &Ctx, filter: &LootFilter) -> GuildResult<Vec<Loot>>;
    async fn create_loot(&self, ctx: &Ctx, loot: &Loot) -> GuildResult<Loot>;
    async fn read_loot(&self, ctx: &Ctx, id: i64) -> GuildResult<Loot>;
    async fn update_loot(&self, ctx: &Ctx, loot: &Loot) -> GuildResult<Loot>;
    async fn delete_loot(&self, ctx: &Ctx, id: i64) -> GuildResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AbsenceBackend: Send + Sync {
    async fn search_absences(&self, ctx: &Ctx, filter: &AbsenceFilter) -> GuildResult<Vec<Absence>>;
    async fn create_absence(&self, ctx: &Ctx, absence: &Absence) -> GuildResult<Absence>;
    async fn read_absence(&self, ctx: &Ctx, id: i64) -> GuildResult<Absence>;
    async fn update_absence(&self, ctx: &Ctx, absence: &Absence) -> GuildResult<Absence>;
    async fn delete_absence(&self, ctx: &Ctx, id: i64) -> GuildResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FailBackend: Send + Sync {
    async fn search_fails(&self, ctx: &Ctx, filter: &FailFilter) -> GuildResult<Vec<Fail>>;
    async fn create_fail(&self, ctx: &Ctx, fail: &Fail) -> GuildResult<Fail>;
    async fn read_fail(&self, ctx: &Ctx, id: i64) -> GuildResult<Fail>;
    async fn update_fail(&self, ctx: &Ctx, fail: &Fail) -> GuildResult<Fail>;
    async fn delete_fail(&self, ctx: &Ctx, id: i64) -> GuildResult<()>;
}
