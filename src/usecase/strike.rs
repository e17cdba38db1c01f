use std::sync::Arc;

use super::resolve_player;
use crate::backend::{PlayerBackend, StrikeBackend, StrikeFilter};
use crate::ctx::Ctx;
use crate::entity::{PlayerRef, SeasonCalendar, Strike};
use crate::error::GuildResult;

pub struct StrikeUseCase {
    players: Arc<dyn PlayerBackend>,
    strikes: Arc<dyn StrikeBackend>,
    seasons: SeasonCalendar,
}

impl StrikeUseCase {
    pub fn new(
        players: Arc<dyn PlayerBackend>,
        strikes: Arc<dyn StrikeBackend>,
        seasons: SeasonCalendar,
    ) -> Self {
        Self {
            players,
            strikes,
            seasons,
        }
    }

    /// Strike `player` now. The season comes from the calendar.
    pub async fn create_strike(&self, ctx: &Ctx, reason: &str, player: &str) -> GuildResult<Strike> {
        ctx.check("create_strike")?;
        // Reason is checked before any lookup.
        let mut strike = Strike::new(reason, PlayerRef::default(), &self.seasons)?;
        strike.player = resolve_player(self.players.as_ref(), ctx, player)
            .await?
            .reference();

        let created = self.strikes.create_strike(ctx, &strike).await?;
        log::info!(
            "strike {} on {} ({}): {}",
            created.id,
            created.player.name,
            created.season,
            created.reason
        );
        Ok(created)
    }

    pub async fn delete_strike(&self, ctx: &Ctx, id: i64) -> GuildResult<()> {
        ctx.check("delete_strike")?;
        self.strikes.delete_strike(ctx, id).await?;
        log::info!("strike {id} deleted");
        Ok(())
    }

    pub async fn read_strikes(&self, ctx: &Ctx, player: &str) -> GuildResult<Vec<Strike>> {
        ctx.check("read_strikes")?;
        let player = resolve_player(self.players.as_ref(), ctx, player).await?;
        self.strikes
            .search_strikes(ctx, &StrikeFilter::of_player(player.id))
            .await
    }
}
