use std::sync::Arc;

use crate::backend::{RaidBackend, RaidFilter};
use crate::ctx::Ctx;
use crate::dates::parse_date;
use crate::entity::{Difficulty, Raid};
use crate::error::GuildResult;

pub struct RaidUseCase {
    raids: Arc<dyn RaidBackend>,
}

impl RaidUseCase {
    pub fn new(raids: Arc<dyn RaidBackend>) -> Self {
        Self { raids }
    }

    /// `date` is `DD/MM/YY`; `difficulty` is one of lfr, normal, heroic,
    /// mythic in any case.
    pub async fn create_raid(
        &self,
        ctx: &Ctx,
        name: &str,
        difficulty: &str,
        date: &str,
    ) -> GuildResult<Raid> {
        ctx.check("create_raid")?;
        let difficulty: Difficulty = difficulty.parse()?;
        let raid = Raid::new(name, parse_date(date)?, difficulty)?;
        let created = self.raids.create_raid(ctx, &raid).await?;
        log::info!("raid {} created: {}", created.id, created.label());
        Ok(created)
    }

    pub async fn delete_raid(&self, ctx: &Ctx, id: i64) -> GuildResult<()> {
        ctx.check("delete_raid")?;
        self.raids.delete_raid(ctx, id).await?;
        log::info!("raid {id} deleted");
        Ok(())
    }

    /// The raid with its absences and loots.
    pub async fn read_raid(&self, ctx: &Ctx, id: i64) -> GuildResult<Raid> {
        ctx.check("read_raid")?;
        self.raids.read_raid(ctx, id).await
    }

    /// Every raid, or only those on `date` (`DD/MM/YY`).
    pub async fn list_raids(&self, ctx: &Ctx, date: Option<&str>) -> GuildResult<Vec<Raid>> {
        ctx.check("list_raids")?;
        let filter = match date {
            Some(date) => RaidFilter::on(parse_date(date)?),
            None => RaidFilter::default(),
        };
        self.raids.search_raids(ctx, &filter).await
    }
}
