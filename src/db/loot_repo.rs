use async_trait::async_trait;

use super::models::{LootRow, LOOT_COLUMNS};
use super::sql::{self, Assignments, Filtered};
use super::{single, PgBackend};
use crate::backend::{LootBackend, LootFilter};
use crate::ctx::Ctx;
use crate::entity::Loot;
use crate::error::{GuildError, GuildResult};

fn loot_key(loot: &Loot) -> String {
    format!("{} for {} on {}", loot.name, loot.player.name, loot.raid.label())
}

#[async_trait]
impl LootBackend for PgBackend {
    async fn search_loots(&self, ctx: &Ctx, filter: &LootFilter) -> GuildResult<Vec<Loot>> {
        ctx.check("search_loots")?;
        let mut select = Filtered::new(LOOT_COLUMNS);
        select
            .eq("l.id", filter.id)
            .eq("l.name", filter.name.clone())
            .eq("l.raid_id", filter.raid_id)
            .eq("l.player_id", filter.player_id)
            .eq("r.difficulty", filter.difficulty.map(|d| d.as_str()));
        let rows: Vec<LootRow> = self
            .fetch_all(ctx, "search_loots", select.order_by("r.date, l.id"))
            .await?;
        rows.into_iter().map(LootRow::into_loot).collect()
    }

    async fn create_loot(&self, ctx: &Ctx, loot: &Loot) -> GuildResult<Loot> {
        ctx.check("create_loot")?;
        loot.validate()?;

        let existing = self
            .search_loots(
                ctx,
                &LootFilter {
                    name: Some(loot.name.clone()),
                    raid_id: Some(loot.raid.id),
                    player_id: Some(loot.player.id),
                    ..LootFilter::default()
                },
            )
            .await?;
        if !existing.is_empty() {
            return Err(GuildError::already_exists("loot", loot_key(loot)));
        }

        let (name, raid_id, player_id) = (loot.name.clone(), loot.raid.id, loot.player.id);
        let qb = sql::insert("loots", &["name", "raid_id", "player_id"], |values| {
            values.push_bind(name).push_bind(raid_id).push_bind(player_id);
        });
        let id = self
            .insert_returning_id(ctx, "create_loot", "loot", &loot_key(loot), qb)
            .await?;

        Ok(Loot {
            id,
            ..loot.clone()
        })
    }

    async fn read_loot(&self, ctx: &Ctx, id: i64) -> GuildResult<Loot> {
        ctx.check("read_loot")?;
        let rows = self
            .search_loots(
                ctx,
                &LootFilter {
                    id: Some(id),
                    ..LootFilter::default()
                },
            )
            .await?;
        single(rows, "loot", id)
    }

    async fn update_loot(&self, ctx: &Ctx, loot: &Loot) -> GuildResult<Loot> {
        ctx.check("update_loot")?;
        loot.validate()?;

        let mut update = Assignments::update("loots");
        update
            .set("name", loot.name.clone())
            .set("raid_id", loot.raid.id)
            .set("player_id", loot.player.id);
        self.execute_by_id(
            ctx,
            "update_loot",
            "loot",
            loot.id,
            &loot_key(loot),
            update.where_id(loot.id),
        )
        .await?;
        Ok(loot.clone())
    }

    async fn delete_loot(&self, ctx: &Ctx, id: i64) -> GuildResult<()> {
        ctx.check("delete_loot")?;
        self.execute_by_id(
            ctx,
            "delete_loot",
            "loot",
            id,
            &id.to_string(),
            sql::delete_by_id("loots", id),
        )
        .await
    }
}
