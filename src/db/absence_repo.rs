use async_trait::async_trait;

use super::models::{AbsenceRow, ABSENCE_COLUMNS};
use super::sql::{self, Assignments, Filtered};
use super::{single, PgBackend};
use crate::backend::{AbsenceBackend, AbsenceFilter};
use crate::ctx::Ctx;
use crate::entity::Absence;
use crate::error::{GuildError, GuildResult};

fn absence_key(absence: &Absence) -> String {
    format!("{} on {}", absence.player.name, absence.raid.label())
}

#[async_trait]
impl AbsenceBackend for PgBackend {
    async fn search_absences(&self, ctx: &Ctx, filter: &AbsenceFilter) -> GuildResult<Vec<Absence>> {
        ctx.check("search_absences")?;
        let mut select = Filtered::new(ABSENCE_COLUMNS);
        select
            .eq("a.id", filter.id)
            .eq("a.player_id", filter.player_id)
            .eq("a.raid_id", filter.raid_id)
            .eq("r.date", filter.date);
        let rows: Vec<AbsenceRow> = self
            .fetch_all(ctx, "search_absences", select.order_by("r.date, a.id"))
            .await?;
        rows.into_iter().map(AbsenceRow::into_absence).collect()
    }

    async fn create_absence(&self, ctx: &Ctx, absence: &Absence) -> GuildResult<Absence> {
        ctx.check("create_absence")?;
        absence.validate()?;

        let existing = self
            .search_absences(
                ctx,
                &AbsenceFilter {
                    player_id: Some(absence.player.id),
                    raid_id: Some(absence.raid.id),
                    ..AbsenceFilter::default()
                },
            )
            .await?;
        if !existing.is_empty() {
            return Err(GuildError::already_exists("absence", absence_key(absence)));
        }

        let (player_id, raid_id) = (absence.player.id, absence.raid.id);
        let qb = sql::insert("absences", &["player_id", "raid_id"], |values| {
            values.push_bind(player_id).push_bind(raid_id);
        });
        let id = self
            .insert_returning_id(ctx, "create_absence", "absence", &absence_key(absence), qb)
            .await?;

        Ok(Absence {
            id,
            ..absence.clone()
        })
    }

    async fn read_absence(&self, ctx: &Ctx, id: i64) -> GuildResult<Absence> {
        ctx.check("read_absence")?;
        let rows = self
            .search_absences(
                ctx,
                &AbsenceFilter {
                    id: Some(id),
                    ..AbsenceFilter::default()
                },
            )
            .await?;
        single(rows, "absence", id)
    }

    async fn update_absence(&self, ctx: &Ctx, absence: &Absence) -> GuildResult<Absence> {
        ctx.check("update_absence")?;
        absence.validate()?;

        let mut update = Assignments::update("absences");
        update
            .set("player_id", absence.player.id)
            .set("raid_id", absence.raid.id);
        self.execute_by_id(
            ctx,
            "update_absence",
            "absence",
            absence.id,
            &absence_key(absence),
            update.where_id(absence.id),
        )
        .await?;
        Ok(absence.clone())
    }

    async fn delete_absence(&self, ctx: &Ctx, id: i64) -> GuildResult<()> {
        ctx.check("delete_absence")?;
        self.execute_by_id(
            ctx,
            "delete_absence",
            "absence",
            id,
            &id.to_string(),
            sql::delete_by_id("absences", id),
        )
        .await
    }
}
