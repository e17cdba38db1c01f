use std::sync::Arc;

use super::resolve_player;
use crate::backend::{PlayerBackend, PlayerFilter, StrikeBackend, StrikeFilter};
use crate::ctx::Ctx;
use crate::entity::Player;
use crate::error::{GuildError, GuildResult};

pub struct PlayerUseCase {
    players: Arc<dyn PlayerBackend>,
    strikes: Arc<dyn StrikeBackend>,
}

impl PlayerUseCase {
    pub fn new(players: Arc<dyn PlayerBackend>, strikes: Arc<dyn StrikeBackend>) -> Self {
        Self { players, strikes }
    }

    pub async fn create_player(&self, ctx: &Ctx, name: &str) -> GuildResult<Player> {
        ctx.check("create_player")?;
        let player = Player::new(name)?;
        let created = self.players.create_player(ctx, &player).await?;
        log::info!("player {} created (id {})", created.name, created.id);
        Ok(created)
    }

    /// The player with strikes, loots, missed raids and fails filled in.
    pub async fn read_player(&self, ctx: &Ctx, name: &str) -> GuildResult<Player> {
        ctx.check("read_player")?;
        let found = resolve_player(self.players.as_ref(), ctx, name).await?;
        self.players.read_player(ctx, found.id).await
    }

    /// Deletes the player's strikes one by one, then the player. Loots,
    /// absences and fails recorded against the player are kept.
    pub async fn delete_player(&self, ctx: &Ctx, name: &str) -> GuildResult<()> {
        ctx.check("delete_player")?;
        let player = resolve_player(self.players.as_ref(), ctx, name).await?;

        let strikes = self
            .strikes
            .search_strikes(ctx, &StrikeFilter::of_player(player.id))
            .await?;
        for strike in &strikes {
            self.strikes.delete_strike(ctx, strike.id).await?;
        }

        self.players.delete_player(ctx, player.id).await?;
        log::info!(
            "player {} deleted along with {} strike(s)",
            player.name,
            strikes.len()
        );
        Ok(())
    }

    pub async fn list_players(&self, ctx: &Ctx) -> GuildResult<Vec<Player>> {
        ctx.check("list_players")?;
        self.players.search_players(ctx, &PlayerFilter::default()).await
    }

    /// Attach a chat account id to the player. An id already linked to
    /// someone else is refused.
    pub async fn link_discord(&self, ctx: &Ctx, name: &str, discord_id: &str) -> GuildResult<Player> {
        ctx.check("link_discord")?;
        let discord_id = discord_id.trim();
        if discord_id.is_empty() {
            return Err(GuildError::validation("discord account", "must not be empty"));
        }
        let mut player = resolve_player(self.players.as_ref(), ctx, name).await?;

        let holders = self
            .players
            .search_players(
                ctx,
                &PlayerFilter {
                    discord_id: Some(discord_id.to_string()),
                    ..PlayerFilter::default()
                },
            )
            .await?;
        if let Some(other) = holders.iter().find(|p| p.id != player.id) {
            log::warn!("discord account {discord_id} already linked to {}", other.name);
            return Err(GuildError::already_exists("discord account", discord_id));
        }

        player.discord_id = Some(discord_id.to_string());
        let updated = self.players.update_player(ctx, &player).await?;
        log::info!("player {} linked to discord account {discord_id}", updated.name);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockPlayerBackend, MockStrikeBackend};
    use crate::entity::{SeasonCalendar, Strike};
    use crate::error::ErrorKind;
    use crate::usecase::fixtures::{player, player_ref};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::*;

    fn strike(id: i64) -> Strike {
        let at = Utc.with_ymd_and_hms(2025, 1, 8, 20, 0, 0).unwrap();
        let mut strike = Strike::at("late", player_ref(4, "abcde"), at, &SeasonCalendar::default())
            .unwrap();
        strike.id = id;
        strike
    }

    #[tokio::test]
    async fn create_then_read_by_name() {
        let mut players = MockPlayerBackend::new();
        players
            .expect_create_player()
            .withf(|_, p| p.name == "abcde" && p.id == 0)
            .times(1)
            .returning(|_, p| Ok(Player { id: 4, ..p.clone() }));
        players
            .expect_search_players()
            .withf(|_, f| f.name.as_deref() == Some("abcde"))
            .returning(|_, _| Ok(vec![player(4, "abcde")]));
        players
            .expect_read_player()
            .with(always(), eq(4))
            .returning(|_, id| Ok(player(id, "abcde")));

        let uc = PlayerUseCase::new(Arc::new(players), Arc::new(MockStrikeBackend::new()));
        let ctx = Ctx::background();
        let created = uc.create_player(&ctx, "abcde").await.unwrap();
        assert_eq!(created.id, 4);
        let read = uc.read_player(&ctx, "abcde").await.unwrap();
        assert_eq!(read.name, "abcde");
    }

    #[tokio::test]
    async fn invalid_name_never_reaches_the_backend() {
        let uc = PlayerUseCase::new(
            Arc::new(MockPlayerBackend::new()),
            Arc::new(MockStrikeBackend::new()),
        );
        let err = uc.create_player(&Ctx::background(), "Abc1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn duplicate_name_surfaces_already_exists() {
        let mut players = MockPlayerBackend::new();
        players
            .expect_create_player()
            .returning(|_, p| Err(GuildError::already_exists("player", &p.name)));
        let uc = PlayerUseCase::new(Arc::new(players), Arc::new(MockStrikeBackend::new()));
        let err = uc.create_player(&Ctx::background(), "abcde").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn delete_removes_each_strike_then_the_player() {
        let mut players = MockPlayerBackend::new();
        let mut strikes = MockStrikeBackend::new();

        players
            .expect_search_players()
            .returning(|_, _| Ok(vec![player(4, "abcde")]));
        strikes
            .expect_search_strikes()
            .withf(|_, f| f.player_id == Some(4))
            .times(1)
            .returning(|_, _| Ok(vec![strike(10), strike(11), strike(12)]));
        strikes
            .expect_delete_strike()
            .with(always(), in_iter(vec![10_i64, 11, 12]))
            .times(3)
            .returning(|_, _| Ok(()));
        players
            .expect_delete_player()
            .with(always(), eq(4))
            .times(1)
            .returning(|_, _| Ok(()));

        let uc = PlayerUseCase::new(Arc::new(players), Arc::new(strikes));
        uc.delete_player(&Ctx::background(), "abcde").await.unwrap();
    }

    #[tokio::test]
    async fn unknown_player_is_not_found() {
        let mut players = MockPlayerBackend::new();
        players.expect_search_players().returning(|_, _| Ok(vec![]));
        let uc = PlayerUseCase::new(Arc::new(players), Arc::new(MockStrikeBackend::new()));
        let err = uc.delete_player(&Ctx::background(), "ghost").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn cancelled_context_touches_nothing() {
        let uc = PlayerUseCase::new(
            Arc::new(MockPlayerBackend::new()),
            Arc::new(MockStrikeBackend::new()),
        );
        let ctx = Ctx::background();
        ctx.cancel();
        for err in [
            uc.create_player(&ctx, "abcde").await.unwrap_err(),
            uc.read_player(&ctx, "abcde").await.unwrap_err(),
            uc.delete_player(&ctx, "abcde").await.unwrap_err(),
            uc.list_players(&ctx).await.unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::Cancelled);
        }
    }

    #[tokio::test]
    async fn discord_account_held_by_someone_else_is_refused() {
        let mut players = MockPlayerBackend::new();
        players
            .expect_search_players()
            .withf(|_, f| f.name.is_some())
            .returning(|_, _| Ok(vec![player(4, "abcde")]));
        players
            .expect_search_players()
            .withf(|_, f| f.discord_id.is_some())
            .returning(|_, _| {
                Ok(vec![Player {
                    discord_id: Some("42".into()),
                    ..player(9, "other")
                }])
            });
        let uc = PlayerUseCase::new(Arc::new(players), Arc::new(MockStrikeBackend::new()));
        let err = uc
            .link_discord(&Ctx::background(), "abcde", "42")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }
}
