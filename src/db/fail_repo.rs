use async_trait::async_trait;

use super::models::{FailRow, FAIL_COLUMNS};
use super::sql::{self, Assignments, Filtered};
use super::{single, PgBackend};
use crate::backend::{FailBackend, FailFilter};
use crate::ctx::Ctx;
use crate::entity::Fail;
use crate::error::GuildResult;

#[async_trait]
impl FailBackend for PgBackend {
    async fn search_fails(&self, ctx: &Ctx, filter: &FailFilter) -> GuildResult<Vec<Fail>> {
        ctx.check("search_fails")?;
        let mut select = Filtered::new(FAIL_COLUMNS);
        select
            .eq("f.id", filter.id)
            .eq("f.player_id", filter.player_id)
            .eq("f.raid_id", filter.raid_id);
        let rows: Vec<FailRow> = self
            .fetch_all(ctx, "search_fails", select.order_by("r.date, f.id"))
            .await?;
        rows.into_iter().map(FailRow::into_fail).collect()
    }

    async fn create_fail(&self, ctx: &Ctx, fail: &Fail) -> GuildResult<Fail> {
        ctx.check("create_fail")?;
        fail.validate()?;

        let (player_id, raid_id, reason) = (fail.player.id, fail.raid.id, fail.reason.clone());
        let qb = sql::insert("fails", &["player_id", "raid_id", "reason"], |values| {
            values.push_bind(player_id).push_bind(raid_id).push_bind(reason);
        });
        let id = self
            .insert_returning_id(ctx, "create_fail", "fail", &fail.player.name, qb)
            .await?;

        Ok(Fail {
            id,
            ..fail.clone()
        })
    }

    async fn read_fail(&self, ctx: &Ctx, id: i64) -> GuildResult<Fail> {
        ctx.check("read_fail")?;
        let rows = self
            .search_fails(
                ctx,
                &FailFilter {
                    id: Some(id),
                    ..FailFilter::default()
                },
            )
            .await?;
        single(rows, "fail", id)
    }

    async fn update_fail(&self, ctx: &Ctx, fail: &Fail) -> GuildResult<Fail> {
        ctx.check("update_fail")?;
        fail.validate()?;

        let mut update = Assignments::update("fails");
        update
            .set("reason", fail.reason.clone())
            .set("player_id", fail.player.id)
            .set("raid_id", fail.raid.id);
        self.execute_by_id(
            ctx,
            "update_fail",
            "fail",
            fail.id,
            &fail.id.to_string(),
            update.where_id(fail.id),
        )
        .await?;
        Ok(fail.clone())
    }

    async fn delete_fail(&self, ctx: &Ctx, id: i64) -> GuildResult<()> {
        ctx.check("delete_fail")?;
        self.execute_by_id(
            ctx,
            "delete_fail",
            "fail",
            id,
            &id.to_string(),
            sql::delete_by_id("fails", id),
        )
        .await
    }
}
