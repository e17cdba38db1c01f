use async_trait::async_trait;

use super::models::{StrikeRow, STRIKE_COLUMNS};
use super::sql::{self, Assignments, Filtered};
use super::{single, PgBackend};
use crate::backend::{StrikeBackend, StrikeFilter};
use crate::ctx::Ctx;
use crate::entity::Strike;
use crate::error::{GuildError, GuildResult};

#[async_trait]
impl StrikeBackend for PgBackend {
    async fn search_strikes(&self, ctx: &Ctx, filter: &StrikeFilter) -> GuildResult<Vec<Strike>> {
        ctx.check("search_strikes")?;
        let mut select = Filtered::new(STRIKE_COLUMNS);
        select
            .eq("s.id", filter.id)
            .eq("s.player_id", filter.player_id)
            .eq("s.season", filter.season.clone());
        let rows: Vec<StrikeRow> = self
            .fetch_all(ctx, "search_strikes", select.order_by("s.created_at, s.id"))
            .await?;
        Ok(rows.into_iter().map(Strike::from).collect())
    }

    async fn create_strike(&self, ctx: &Ctx, strike: &Strike) -> GuildResult<Strike> {
        ctx.check("create_strike")?;
        strike.validate()?;
        if strike.player.id <= 0 {
            return Err(GuildError::validation("strike player", "is required"));
        }

        let (player_id, season, reason, created_at) = (
            strike.player.id,
            strike.season.clone(),
            strike.reason.clone(),
            strike.date,
        );
        let qb = sql::insert(
            "strikes",
            &["player_id", "season", "reason", "created_at"],
            |values| {
                values
                    .push_bind(player_id)
                    .push_bind(season)
                    .push_bind(reason)
                    .push_bind(created_at);
            },
        );
        let id = self
            .insert_returning_id(ctx, "create_strike", "strike", &strike.player.name, qb)
            .await?;

        Ok(Strike {
            id,
            ..strike.clone()
        })
    }

    async fn read_strike(&self, ctx: &Ctx, id: i64) -> GuildResult<Strike> {
        ctx.check("read_strike")?;
        let rows = self
            .search_strikes(
                ctx,
                &StrikeFilter {
                    id: Some(id),
                    ..StrikeFilter::default()
                },
            )
            .await?;
        single(rows, "strike", id)
    }

    async fn update_strike(&self, ctx: &Ctx, strike: &Strike) -> GuildResult<Strike> {
        ctx.check("update_strike")?;
        strike.validate()?;

        let mut update = Assignments::update("strikes");
        update
            .set("player_id", strike.player.id)
            .set("season", strike.season.clone())
            .set("reason", strike.reason.clone())
            .set("created_at", strike.date);
        self.execute_by_id(
            ctx,
            "update_strike",
            "strike",
            strike.id,
            &strike.id.to_string(),
            update.where_id(strike.id),
        )
        .await?;
        Ok(strike.clone())
    }

    async fn delete_strike(&self, ctx: &Ctx, id: i64) -> GuildResult<()> {
        ctx.check("delete_strike")?;
        self.execute_by_id(
            ctx,
            "delete_strike",
            "strike",
            id,
            &id.to_string(),
            sql::delete_by_id("strikes", id),
        )
        .await
    }
}
