use async_trait::async_trait;

use super::models::{RaidRow, RAID_COLUMNS};
use super::sql::{self, Assignments, Filtered};
use super::{single, PgBackend};
use crate::backend::{AbsenceBackend, AbsenceFilter, LootBackend, LootFilter, RaidBackend, RaidFilter};
use crate::ctx::Ctx;
use crate::entity::Raid;
use crate::error::{GuildError, GuildResult};

#[async_trait]
impl RaidBackend for PgBackend {
    async fn search_raids(&self, ctx: &Ctx, filter: &RaidFilter) -> GuildResult<Vec<Raid>> {
        ctx.check("search_raids")?;
        let mut select = Filtered::new(RAID_COLUMNS);
        select
            .eq("r.id", filter.id)
            .eq("r.name", filter.name.clone())
            .eq("r.date", filter.date)
            .eq("r.difficulty", filter.difficulty.map(|d| d.as_str()));
        let rows: Vec<RaidRow> = self
            .fetch_all(ctx, "search_raids", select.order_by("r.date, r.name, r.id"))
            .await?;
        rows.into_iter().map(RaidRow::into_raid).collect()
    }

    async fn create_raid(&self, ctx: &Ctx, raid: &Raid) -> GuildResult<Raid> {
        ctx.check("create_raid")?;
        raid.validate()?;

        let existing = self.search_raids(ctx, &RaidFilter::exact(raid)).await?;
        if !existing.is_empty() {
            return Err(GuildError::already_exists("raid", raid.label()));
        }

        let (name, date, difficulty) = (raid.name.clone(), raid.date, raid.difficulty.as_str());
        let qb = sql::insert("raids", &["name", "date", "difficulty"], |values| {
            values.push_bind(name).push_bind(date).push_bind(difficulty);
        });
        let id = self
            .insert_returning_id(ctx, "create_raid", "raid", &raid.label(), qb)
            .await?;

        Ok(Raid {
            id,
            name: raid.name.clone(),
            date: raid.date,
            difficulty: raid.difficulty,
            absences: Vec::new(),
            loots: Vec::new(),
        })
    }

    async fn read_raid(&self, ctx: &Ctx, id: i64) -> GuildResult<Raid> {
        ctx.check("read_raid")?;
        let rows = self
            .search_raids(
                ctx,
                &RaidFilter {
                    id: Some(id),
                    ..RaidFilter::default()
                },
            )
            .await?;
        let mut raid = single(rows, "raid", id)?;

        raid.absences = self
            .search_absences(
                ctx,
                &AbsenceFilter {
                    raid_id: Some(id),
                    ..AbsenceFilter::default()
                },
            )
            .await?;
        raid.loots = self
            .search_loots(
                ctx,
                &LootFilter {
                    raid_id: Some(id),
                    ..LootFilter::default()
                },
            )
            .await?;

        Ok(raid)
    }

    async fn update_raid(&self, ctx: &Ctx, raid: &Raid) -> GuildResult<Raid> {
        ctx.check("update_raid")?;
        raid.validate()?;

        let mut update = Assignments::update("raids");
        update
            .set("name", raid.name.clone())
            .set("date", raid.date)
            .set("difficulty", raid.difficulty.as_str());
        self.execute_by_id(
            ctx,
            "update_raid",
            "raid",
            raid.id,
            &raid.label(),
            update.where_id(raid.id),
        )
        .await?;

        Ok(Raid {
            absences: Vec::new(),
            loots: Vec::new(),
            ..raid.clone()
        })
    }

    /// Absences, loots and fails of the raid go with it (ON DELETE CASCADE).
    async fn delete_raid(&self, ctx: &Ctx, id: i64) -> GuildResult<()> {
        ctx.check("delete_raid")?;
        self.execute_by_id(
            ctx,
            "delete_raid",
            "raid",
            id,
            &id.to_string(),
            sql::delete_by_id("raids", id),
        )
        .await
    }
}
