//! Use cases: one orchestrator per entity family.
//!
//! Each holds the narrow backend traits it needs behind `Arc<dyn _>`, checks
//! the caller's [`Ctx`] before doing anything, and hands back [`GuildError`]s
//! with their kind intact.

use std::sync::Arc;

use crate::backend::{
    AbsenceBackend, FailBackend, LootBackend, PlayerBackend, PlayerFilter, RaidBackend, RaidFilter,
    StrikeBackend,
};
use crate::ctx::Ctx;
use crate::entity::{Player, Raid, SeasonCalendar};
use crate::error::{GuildError, GuildResult};

pub mod absence;
pub mod fail;
pub mod loot;
pub mod player;
pub mod raid;
pub mod strike;

pub use absence::{AbsenceReport, AbsenceUseCase, DateOutcome, RaidOutcome};
pub use fail::FailUseCase;
pub use loot::{pick_fairest, LootUseCase};
pub use player::PlayerUseCase;
pub use raid::RaidUseCase;
pub use strike::StrikeUseCase;

/// Every use case wired to one backend.
pub struct Guild {
    pub players: PlayerUseCase,
    pub raids: RaidUseCase,
    pub strikes: StrikeUseCase,
    pub loots: LootUseCase,
    pub absences: AbsenceUseCase,
    pub fails: FailUseCase,
}

impl Guild {
    pub fn new<B>(backend: Arc<B>, seasons: SeasonCalendar) -> Self
    where
        B: PlayerBackend
            + RaidBackend
            + StrikeBackend
            + LootBackend
            + AbsenceBackend
            + FailBackend
            + 'static,
    {
        let players: Arc<dyn PlayerBackend> = backend.clone();
        let raids: Arc<dyn RaidBackend> = backend.clone();
        let strikes: Arc<dyn StrikeBackend> = backend.clone();
        let loots: Arc<dyn LootBackend> = backend.clone();
        let absences: Arc<dyn AbsenceBackend> = backend.clone();
        let fails: Arc<dyn FailBackend> = backend;

        Self {
            players: PlayerUseCase::new(players.clone(), strikes.clone()),
            raids: RaidUseCase::new(raids.clone()),
            strikes: StrikeUseCase::new(players.clone(), strikes, seasons),
            loots: LootUseCase::new(players.clone(), raids.clone(), loots),
            absences: AbsenceUseCase::new(players.clone(), raids.clone(), absences),
            fails: FailUseCase::new(players, raids, fails),
        }
    }
}

/// Look a player up by name. The name is validated first so a malformed one
/// never reaches the store.
pub(crate) async fn resolve_player(
    players: &dyn PlayerBackend,
    ctx: &Ctx,
    name: &str,
) -> GuildResult<Player> {
    crate::entity::player::validate_name(name)?;
    players
        .search_players(ctx, &PlayerFilter::by_name(name))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| GuildError::not_found("player", name))
}

/// Raid row by id, without its projections.
pub(crate) async fn find_raid(raids: &dyn RaidBackend, ctx: &Ctx, id: i64) -> GuildResult<Raid> {
    raids
        .search_raids(
            ctx,
            &RaidFilter {
                id: Some(id),
                ..RaidFilter::default()
            },
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| GuildError::not_found("raid", id))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::entity::{Difficulty, Player, PlayerRef, Raid};

    pub fn player(id: i64, name: &str) -> Player {
        Player {
            id,
            name: name.to_string(),
            ..Player::default()
        }
    }

    pub fn player_ref(id: i64, name: &str) -> PlayerRef {
        PlayerRef {
            id,
            name: name.to_string(),
        }
    }

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn raid(id: i64, date: NaiveDate, difficulty: Difficulty) -> Raid {
        Raid {
            id,
            name: "Nerub-ar Palace".to_string(),
            date,
            difficulty,
            ..Raid::default()
        }
    }
}
