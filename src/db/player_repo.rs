use async_trait::async_trait;

use super::models::{PlayerRow, PLAYER_COLUMNS};
use super::sql::{self, Assignments, Filtered};
use super::{single, PgBackend};
use crate::backend::{
    AbsenceBackend, AbsenceFilter, FailBackend, FailFilter, LootBackend, LootFilter,
    PlayerBackend, PlayerFilter, StrikeBackend, StrikeFilter,
};
use crate::ctx::Ctx;
use crate::entity::Player;
use crate::error::{GuildError, GuildResult};

/// Postgres' default name for the `discord_id UNIQUE` index.
const DISCORD_ID_INDEX: &str = "players_discord_id_key";

/// Name the unique index an update collided with: the discord account or
/// the player name.
fn update_conflict(player: &Player, err: sqlx::Error) -> GuildError {
    let on_discord = matches!(
        &err,
        sqlx::Error::Database(db) if db.constraint() == Some(DISCORD_ID_INDEX)
    );
    match (&player.discord_id, on_discord) {
        (Some(discord_id), true) => {
            GuildError::from_sqlx("update_player", "discord account", discord_id, err)
        }
        _ => GuildError::from_sqlx("update_player", "player", &player.name, err),
    }
}

#[async_trait]
impl PlayerBackend for PgBackend {
    async fn search_players(&self, ctx: &Ctx, filter: &PlayerFilter) -> GuildResult<Vec<Player>> {
        ctx.check("search_players")?;
        let mut select = Filtered::new(PLAYER_COLUMNS);
        select
            .eq("p.id", filter.id)
            .eq("p.name", filter.name.clone())
            .eq("p.discord_id", filter.discord_id.clone());
        let rows: Vec<PlayerRow> = self
            .fetch_all(ctx, "search_players", select.order_by("p.name"))
            .await?;
        Ok(rows.into_iter().map(Player::from).collect())
    }

    async fn create_player(&self, ctx: &Ctx, player: &Player) -> GuildResult<Player> {
        ctx.check("create_player")?;
        player.validate()?;

        // Best-effort pre-check for a readable error; the unique index still
        // decides when two creates race.
        let taken = self
            .search_players(ctx, &PlayerFilter::by_name(&player.name))
            .await?;
        if !taken.is_empty() {
            return Err(GuildError::already_exists("player", &player.name));
        }
        if let Some(discord_id) = &player.discord_id {
            let linked = self
                .search_players(
                    ctx,
                    &PlayerFilter {
                        discord_id: Some(discord_id.clone()),
                        ..PlayerFilter::default()
                    },
                )
                .await?;
            if !linked.is_empty() {
                return Err(GuildError::already_exists("discord account", discord_id));
            }
        }

        let name = player.name.clone();
        let discord_id = player.discord_id.clone();
        let qb = sql::insert("players", &["name", "discord_id"], |values| {
            values.push_bind(name).push_bind(discord_id);
        });
        let id = self
            .insert_returning_id(ctx, "create_player", "player", &player.name, qb)
            .await?;

        Ok(Player {
            id,
            name: player.name.clone(),
            discord_id: player.discord_id.clone(),
            ..Player::default()
        })
    }

    async fn read_player(&self, ctx: &Ctx, id: i64) -> GuildResult<Player> {
        ctx.check("read_player")?;
        let rows = self
            .search_players(
                ctx,
                &PlayerFilter {
                    id: Some(id),
                    ..PlayerFilter::default()
                },
            )
            .await?;
        let mut player = single(rows, "player", id)?;

        // One query per association.
        player.loots = self
            .search_loots(
                ctx,
                &LootFilter {
                    player_id: Some(id),
                    ..LootFilter::default()
                },
            )
            .await?;
        player.missed_raids = self
            .search_absences(
                ctx,
                &AbsenceFilter {
                    player_id: Some(id),
                    ..AbsenceFilter::default()
                },
            )
            .await?
            .into_iter()
            .map(|absence| absence.raid)
            .collect();
        player.strikes = self
            .search_strikes(ctx, &StrikeFilter::of_player(id))
            .await?;
        player.fails = self
            .search_fails(
                ctx,
                &FailFilter {
                    player_id: Some(id),
                    ..FailFilter::default()
                },
            )
            .await?;

        Ok(player)
    }

    async fn update_player(&self, ctx: &Ctx, player: &Player) -> GuildResult<Player> {
        ctx.check("update_player")?;
        player.validate()?;

        let mut update = Assignments::update("players");
        update
            .set("name", player.name.clone())
            .set("discord_id", player.discord_id.clone());
        let mut qb = update.where_id(player.id);
        log::debug!("update_player: {}", qb.sql());
        let done = ctx
            .run("update_player", qb.build().execute(&self.pool))
            .await?
            .map_err(|e| update_conflict(player, e))?;
        if done.rows_affected() == 0 {
            return Err(GuildError::not_found("player", player.id));
        }

        Ok(Player {
            id: player.id,
            name: player.name.clone(),
            discord_id: player.discord_id.clone(),
            ..Player::default()
        })
    }

    async fn delete_player(&self, ctx: &Ctx, id: i64) -> GuildResult<()> {
        ctx.check("delete_player")?;
        self.execute_by_id(
            ctx,
            "delete_player",
            "player",
            id,
            &id.to_string(),
            sql::delete_by_id("players", id),
        )
        .await
    }
}
