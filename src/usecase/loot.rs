//! Loot awards and the fair pick of who gets the next item.
//!
//! Fairness is "fewest items already received at this difficulty". Ties are
//! broken uniformly at random.

use std::sync::Arc;

use rand::seq::IndexedRandom;
use rand::Rng;

use super::{find_raid, resolve_player};
use crate::backend::{LootBackend, LootFilter, PlayerBackend, RaidBackend};
use crate::ctx::Ctx;
use crate::entity::{Difficulty, Loot, Player};
use crate::error::{GuildError, GuildResult};

pub struct LootUseCase {
    players: Arc<dyn PlayerBackend>,
    raids: Arc<dyn RaidBackend>,
    loots: Arc<dyn LootBackend>,
}

/// Among `(candidate, count)` pairs, pick one of those with the lowest count.
/// `None` only when `candidates` is empty.
pub fn pick_fairest<'a, T, R>(candidates: &'a [(T, usize)], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    let fewest = candidates.iter().map(|(_, count)| *count).min()?;
    let tied: Vec<&T> = candidates
        .iter()
        .filter(|(_, count)| *count == fewest)
        .map(|(candidate, _)| candidate)
        .collect();
    tied.choose(rng).copied()
}

impl LootUseCase {
    pub fn new(
        players: Arc<dyn PlayerBackend>,
        raids: Arc<dyn RaidBackend>,
        loots: Arc<dyn LootBackend>,
    ) -> Self {
        Self {
            players,
            raids,
            loots,
        }
    }

    /// Award item `name` from raid `raid_id` to `player`.
    pub async fn create_loot(
        &self,
        ctx: &Ctx,
        name: &str,
        raid_id: i64,
        player: &str,
    ) -> GuildResult<Loot> {
        ctx.check("create_loot")?;
        let raid = find_raid(self.raids.as_ref(), ctx, raid_id).await?;
        let player = resolve_player(self.players.as_ref(), ctx, player).await?;
        let loot = Loot::new(name, raid, player.reference())?;

        let created = self.loots.create_loot(ctx, &loot).await?;
        log::info!(
            "loot {} `{}` awarded to {} on {}",
            created.id,
            created.name,
            created.player.name,
            created.raid.label()
        );
        Ok(created)
    }

    pub async fn list_loot_on_player(&self, ctx: &Ctx, player: &str) -> GuildResult<Vec<Loot>> {
        ctx.check("list_loot_on_player")?;
        let player = resolve_player(self.players.as_ref(), ctx, player).await?;
        self.loots
            .search_loots(
                ctx,
                &LootFilter {
                    player_id: Some(player.id),
                    ..LootFilter::default()
                },
            )
            .await
    }

    pub async fn list_loot_on_raid(&self, ctx: &Ctx, raid_id: i64) -> GuildResult<Vec<Loot>> {
        ctx.check("list_loot_on_raid")?;
        let raid = find_raid(self.raids.as_ref(), ctx, raid_id).await?;
        self.loots
            .search_loots(
                ctx,
                &LootFilter {
                    raid_id: Some(raid.id),
                    ..LootFilter::default()
                },
            )
            .await
    }

    pub async fn delete_loot(&self, ctx: &Ctx, id: i64) -> GuildResult<()> {
        ctx.check("delete_loot")?;
        self.loots.delete_loot(ctx, id).await?;
        log::info!("loot {id} deleted");
        Ok(())
    }

    /// Of `names`, the player who received the fewest items at `difficulty`.
    /// Every name must resolve.
    pub async fn select_player_to_assign(
        &self,
        ctx: &Ctx,
        names: &[String],
        difficulty: &str,
    ) -> GuildResult<Player> {
        ctx.check("select_player_to_assign")?;
        if names.is_empty() {
            return Err(GuildError::validation("candidates", "at least one player is required"));
        }
        let difficulty: Difficulty = difficulty.parse()?;

        let mut tallies = Vec::with_capacity(names.len());
        for name in names {
            let player = resolve_player(self.players.as_ref(), ctx, name).await?;
            let received = self
                .loots
                .search_loots(
                    ctx,
                    &LootFilter {
                        player_id: Some(player.id),
                        difficulty: Some(difficulty),
                        ..LootFilter::default()
                    },
                )
                .await?
                .len();
            log::debug!("{} has {received} {difficulty} item(s)", player.name);
            tallies.push((player, received));
        }

        let chosen = pick_fairest(&tallies, &mut rand::rng())
            .cloned()
            .ok_or_else(|| GuildError::validation("candidates", "at least one player is required"))?;
        log::info!("{} selected for the next {difficulty} item", chosen.name);
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockLootBackend, MockPlayerBackend, MockRaidBackend};
    use crate::error::ErrorKind;
    use crate::usecase::fixtures::{day, player, raid};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mythic_loot(id: i64, owner: i64) -> Loot {
        Loot {
            id,
            name: format!("item {id}"),
            raid: raid(1, day(2030, 9, 1), Difficulty::Mythic),
            player: player(owner, "x").reference(),
        }
    }

    fn candidates(players: &mut MockPlayerBackend) {
        players.expect_search_players().returning(|_, f| {
            Ok(match f.name.as_deref() {
                Some("pone") => vec![player(1, "pone")],
                Some("ptwo") => vec![player(2, "ptwo")],
                _ => vec![],
            })
        });
    }

    #[test]
    fn strict_minimum_always_wins() {
        let tallies = [("pone", 2), ("ptwo", 1), ("pthree", 4)];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(pick_fairest(&tallies, &mut rng), Some(&"ptwo"));
        }
    }

    #[test]
    fn empty_candidates_pick_nothing() {
        let tallies: [(&str, usize); 0] = [];
        assert_eq!(pick_fairest(&tallies, &mut StdRng::seed_from_u64(1)), None);
    }

    #[tokio::test]
    async fn selects_the_player_with_fewer_items_at_that_difficulty() {
        let mut players = MockPlayerBackend::new();
        let mut loots = MockLootBackend::new();
        candidates(&mut players);
        loots
            .expect_search_loots()
            .withf(|_, f| f.difficulty == Some(Difficulty::Mythic))
            .returning(|_, f| {
                Ok(match f.player_id {
                    Some(1) => vec![mythic_loot(1, 1), mythic_loot(2, 1)],
                    Some(2) => vec![mythic_loot(3, 2)],
                    _ => vec![],
                })
            });

        let uc = LootUseCase::new(
            Arc::new(players),
            Arc::new(MockRaidBackend::new()),
            Arc::new(loots),
        );
        let names = vec!["pone".to_string(), "ptwo".to_string()];
        for _ in 0..20 {
            let chosen = uc
                .select_player_to_assign(&Ctx::background(), &names, "mythic")
                .await
                .unwrap();
            assert_eq!(chosen.name, "ptwo");
        }
    }

    #[tokio::test]
    async fn unknown_candidate_fails_the_selection() {
        let mut players = MockPlayerBackend::new();
        let mut loots = MockLootBackend::new();
        candidates(&mut players);
        loots.expect_search_loots().returning(|_, _| Ok(vec![]));

        let uc = LootUseCase::new(
            Arc::new(players),
            Arc::new(MockRaidBackend::new()),
            Arc::new(loots),
        );
        let names = vec!["pone".to_string(), "ghost".to_string()];
        let err = uc
            .select_player_to_assign(&Ctx::background(), &names, "heroic")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn empty_candidate_list_is_rejected() {
        let uc = LootUseCase::new(
            Arc::new(MockPlayerBackend::new()),
            Arc::new(MockRaidBackend::new()),
            Arc::new(MockLootBackend::new()),
        );
        let err = uc
            .select_player_to_assign(&Ctx::background(), &[], "heroic")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn loot_on_a_missing_raid_is_not_found() {
        let mut raids = MockRaidBackend::new();
        raids.expect_search_raids().returning(|_, _| Ok(vec![]));
        let uc = LootUseCase::new(
            Arc::new(MockPlayerBackend::new()),
            Arc::new(raids),
            Arc::new(MockLootBackend::new()),
        );
        let err = uc
            .create_loot(&Ctx::background(), "Void Blade", 77, "pone")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
