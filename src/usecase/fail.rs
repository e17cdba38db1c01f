use std::sync::Arc;

use super::{find_raid, resolve_player};
use crate::backend::{FailBackend, FailFilter, PlayerBackend, RaidBackend};
use crate::ctx::Ctx;
use crate::entity::Fail;
use crate::error::GuildResult;

pub struct FailUseCase {
    players: Arc<dyn PlayerBackend>,
    raids: Arc<dyn RaidBackend>,
    fails: Arc<dyn FailBackend>,
}

impl FailUseCase {
    pub fn new(
        players: Arc<dyn PlayerBackend>,
        raids: Arc<dyn RaidBackend>,
        fails: Arc<dyn FailBackend>,
    ) -> Self {
        Self {
            players,
            raids,
            fails,
        }
    }

    pub async fn create_fail(
        &self,
        ctx: &Ctx,
        reason: &str,
        player: &str,
        raid_id: i64,
    ) -> GuildResult<Fail> {
        ctx.check("create_fail")?;
        let player = resolve_player(self.players.as_ref(), ctx, player).await?;
        let raid = find_raid(self.raids.as_ref(), ctx, raid_id).await?;
        let fail = Fail::new(reason, player.reference(), raid)?;

        let created = self.fails.create_fail(ctx, &fail).await?;
        log::info!(
            "fail {} recorded for {} on {}",
            created.id,
            created.player.name,
            created.raid.label()
        );
        Ok(created)
    }

    pub async fn read_fail(&self, ctx: &Ctx, id: i64) -> GuildResult<Fail> {
        ctx.check("read_fail")?;
        self.fails.read_fail(ctx, id).await
    }

    /// Replace the reason of fail `id`.
    pub async fn update_fail(&self, ctx: &Ctx, id: i64, reason: &str) -> GuildResult<Fail> {
        ctx.check("update_fail")?;
        let mut fail = self.fails.read_fail(ctx, id).await?;
        fail.reason = reason.trim().to_string();
        fail.validate()?;

        let updated = self.fails.update_fail(ctx, &fail).await?;
        log::info!("fail {id} updated");
        Ok(updated)
    }

    pub async fn delete_fail(&self, ctx: &Ctx, id: i64) -> GuildResult<()> {
        ctx.check("delete_fail")?;
        self.fails.delete_fail(ctx, id).await?;
        log::info!("fail {id} deleted");
        Ok(())
    }

    pub async fn list_fail_on_player(&self, ctx: &Ctx, player: &str) -> GuildResult<Vec<Fail>> {
        ctx.check("list_fail_on_player")?;
        let player = resolve_player(self.players.as_ref(), ctx, player).await?;
        self.fails
            .search_fails(
                ctx,
                &FailFilter {
                    player_id: Some(player.id),
                    ..FailFilter::default()
                },
            )
            .await
    }

    pub async fn list_fail_on_raid(&self, ctx: &Ctx, raid_id: i64) -> GuildResult<Vec<Fail>> {
        ctx.check("list_fail_on_raid")?;
        let raid = find_raid(self.raids.as_ref(), ctx, raid_id).await?;
        self.fails
            .search_fails(
                ctx,
                &FailFilter {
                    raid_id: Some(raid.id),
                    ..FailFilter::default()
                },
            )
            .await
    }
}
