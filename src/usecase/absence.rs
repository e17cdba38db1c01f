//! Absences over a range of days.
//!
//! Each date is handled on its own: the dates run concurrently, one date
//! failing does not stop the others, and the report lists every date in
//! calendar order. Within a date every raid is attempted, so one bad raid
//! never hides the rest.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};

use super::resolve_player;
use crate::backend::{AbsenceBackend, AbsenceFilter, PlayerBackend, RaidBackend, RaidFilter};
use crate::ctx::Ctx;
use crate::dates::{expand_dates, format_date};
use crate::entity::{Absence, Player, Raid};
use crate::error::{ErrorKind, GuildError, GuildResult};

/// Dates worked on at once; the pool is small and shared with every other
/// command.
const DATES_IN_FLIGHT: usize = 4;

/// One raid on a date and whether it was written.
#[derive(Debug)]
pub struct RaidOutcome {
    pub raid: Raid,
    pub result: GuildResult<()>,
}

/// What happened on one date: every raid touched, or why none could be.
#[derive(Debug)]
pub struct DateOutcome {
    pub date: NaiveDate,
    pub result: GuildResult<Vec<RaidOutcome>>,
}

impl DateOutcome {
    fn is_complete(&self) -> bool {
        match &self.result {
            Ok(raids) => raids.iter().all(|r| r.result.is_ok()),
            Err(_) => false,
        }
    }
}

#[derive(Debug)]
pub struct AbsenceReport {
    pub player: String,
    pub outcomes: Vec<DateOutcome>,
}

impl AbsenceReport {
    fn new(player: String, mut outcomes: Vec<DateOutcome>) -> Self {
        outcomes.sort_by_key(|o| o.date);
        Self { player, outcomes }
    }

    /// Dates where every raid was written.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_complete()).count()
    }

    /// Every error, date-level or per raid, tagged with its date.
    pub fn failures(&self) -> impl Iterator<Item = (NaiveDate, &GuildError)> {
        self.outcomes.iter().flat_map(|o| {
            let errors: Vec<&GuildError> = match &o.result {
                Ok(raids) => raids.iter().filter_map(|r| r.result.as_ref().err()).collect(),
                Err(err) => vec![err],
            };
            errors.into_iter().map(move |e| (o.date, e))
        })
    }

    /// One line per date, e.g. `01/09/30: Palace 01/09/30 heroic`. A raid
    /// that failed carries its reason in parentheses.
    pub fn render(&self, verb: &str) -> String {
        let mut out = format!("{verb} {}:", self.player);
        for outcome in &self.outcomes {
            let _ = write!(out, "\n{}: ", format_date(outcome.date));
            match &outcome.result {
                Ok(raids) => {
                    let labels: Vec<String> = raids
                        .iter()
                        .map(|r| match &r.result {
                            Ok(()) => r.raid.label(),
                            Err(err) => format!("{} ({})", r.raid.label(), err.user_message()),
                        })
                        .collect();
                    out.push_str(&labels.join(", "));
                }
                Err(err) => out.push_str(&err.user_message()),
            }
        }
        out
    }
}

pub struct AbsenceUseCase {
    players: Arc<dyn PlayerBackend>,
    raids: Arc<dyn RaidBackend>,
    absences: Arc<dyn AbsenceBackend>,
}

impl AbsenceUseCase {
    pub fn new(
        players: Arc<dyn PlayerBackend>,
        raids: Arc<dyn RaidBackend>,
        absences: Arc<dyn AbsenceBackend>,
    ) -> Self {
        Self {
            players,
            raids,
            absences,
        }
    }

    /// Mark `player` absent from every raid on each day of `from..=to`.
    /// A malformed range or unknown player fails the whole call; anything
    /// else is reported per date.
    pub async fn create_absence(
        &self,
        ctx: &Ctx,
        player: &str,
        from: &str,
        to: Option<&str>,
    ) -> GuildResult<AbsenceReport> {
        ctx.check("create_absence")?;
        let dates = expand_dates(from, to)?;
        let player = resolve_player(self.players.as_ref(), ctx, player).await?;

        let outcomes: Vec<DateOutcome> = stream::iter(dates)
            .map(|date| {
                let player = &player;
                async move {
                    DateOutcome {
                        date,
                        result: self.absent_on(ctx, player, date).await,
                    }
                }
            })
            .buffer_unordered(DATES_IN_FLIGHT)
            .collect()
            .await;
        let report = AbsenceReport::new(player.name.clone(), outcomes);
        log::info!(
            "absence for {}: {}/{} date(s) recorded",
            report.player,
            report.succeeded(),
            report.outcomes.len()
        );
        Ok(report)
    }

    /// Undo [`AbsenceUseCase::create_absence`] for each day of `from..=to`.
    pub async fn delete_absence(
        &self,
        ctx: &Ctx,
        player: &str,
        from: &str,
        to: Option<&str>,
    ) -> GuildResult<AbsenceReport> {
        ctx.check("delete_absence")?;
        let dates = expand_dates(from, to)?;
        let player = resolve_player(self.players.as_ref(), ctx, player).await?;

        let outcomes: Vec<DateOutcome> = stream::iter(dates)
            .map(|date| {
                let player = &player;
                async move {
                    DateOutcome {
                        date,
                        result: self.present_on(ctx, player, date).await,
                    }
                }
            })
            .buffer_unordered(DATES_IN_FLIGHT)
            .collect()
            .await;
        let report = AbsenceReport::new(player.name.clone(), outcomes);
        log::info!(
            "absence for {} removed on {}/{} date(s)",
            report.player,
            report.succeeded(),
            report.outcomes.len()
        );
        Ok(report)
    }

    pub async fn list_absences(&self, ctx: &Ctx, player: &str) -> GuildResult<Vec<Absence>> {
        ctx.check("list_absences")?;
        let player = resolve_player(self.players.as_ref(), ctx, player).await?;
        self.absences
            .search_absences(
                ctx,
                &AbsenceFilter {
                    player_id: Some(player.id),
                    ..AbsenceFilter::default()
                },
            )
            .await
    }

    async fn absent_on(
        &self,
        ctx: &Ctx,
        player: &Player,
        date: NaiveDate,
    ) -> GuildResult<Vec<RaidOutcome>> {
        let raids = self.raids.search_raids(ctx, &RaidFilter::on(date)).await?;
        if raids.is_empty() {
            return Err(GuildError::not_found("raid", format_date(date)));
        }
        let mut outcomes = Vec::with_capacity(raids.len());
        for raid in raids {
            let result = match Absence::new(player.reference(), raid.clone()) {
                Ok(absence) => match self.absences.create_absence(ctx, &absence).await {
                    // Already marked for this raid: nothing left to do.
                    Ok(_) => Ok(()),
                    Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
                    Err(err) => Err(err),
                },
                Err(err) => Err(err),
            };
            outcomes.push(RaidOutcome { raid, result });
        }
        Ok(outcomes)
    }

    async fn present_on(
        &self,
        ctx: &Ctx,
        player: &Player,
        date: NaiveDate,
    ) -> GuildResult<Vec<RaidOutcome>> {
        let absences = self
            .absences
            .search_absences(
                ctx,
                &AbsenceFilter {
                    player_id: Some(player.id),
                    date: Some(date),
                    ..AbsenceFilter::default()
                },
            )
            .await?;
        if absences.is_empty() {
            return Err(GuildError::not_found(
                "absence",
                format!("{} on {}", player.name, format_date(date)),
            ));
        }
        let mut outcomes = Vec::with_capacity(absences.len());
        for absence in absences {
            let result = self.absences.delete_absence(ctx, absence.id).await;
            outcomes.push(RaidOutcome {
                raid: absence.raid,
                result,
            });
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockAbsenceBackend, MockPlayerBackend, MockRaidBackend};
    use crate::entity::Difficulty;
    use crate::usecase::fixtures::{day, player, raid};
    use chrono::Datelike;

    fn known_player() -> MockPlayerBackend {
        let mut players = MockPlayerBackend::new();
        players
            .expect_search_players()
            .returning(|_, _| Ok(vec![player(4, "abcde")]));
        players
    }

    #[tokio::test]
    async fn one_bad_date_does_not_abort_the_others() {
        let mut raids = MockRaidBackend::new();
        let mut absences = MockAbsenceBackend::new();

        // A raid on the 1st and 3rd, nothing on the 2nd.
        raids.expect_search_raids().returning(|_, f| {
            let date = f.date.unwrap();
            Ok(if date == day(2030, 9, 2) {
                vec![]
            } else {
                vec![raid(date.day0() as i64 + 1, date, Difficulty::Heroic)]
            })
        });
        absences
            .expect_create_absence()
            .times(2)
            .returning(|_, a| Ok(Absence { id: 50, ..a.clone() }));

        let uc = AbsenceUseCase::new(Arc::new(known_player()), Arc::new(raids), Arc::new(absences));
        let report = uc
            .create_absence(&Ctx::background(), "abcde", "01/09/30", Some("03/09/30"))
            .await
            .unwrap();

        let dates: Vec<NaiveDate> = report.outcomes.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![day(2030, 9, 1), day(2030, 9, 2), day(2030, 9, 3)]);
        assert_eq!(report.succeeded(), 2);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, day(2030, 9, 2));
        assert_eq!(failures[0].1.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn already_marked_raid_does_not_block_the_next_one() {
        let mut raids = MockRaidBackend::new();
        let mut absences = MockAbsenceBackend::new();
        raids.expect_search_raids().returning(|_, f| {
            let date = f.date.unwrap();
            Ok(vec![
                raid(1, date, Difficulty::Heroic),
                raid(2, date, Difficulty::Mythic),
            ])
        });
        absences.expect_create_absence().times(2).returning(|_, a| {
            if a.raid.id == 1 {
                Err(GuildError::already_exists("absence", "abcde"))
            } else {
                Ok(Absence { id: 11, ..a.clone() })
            }
        });

        let uc = AbsenceUseCase::new(Arc::new(known_player()), Arc::new(raids), Arc::new(absences));
        let report = uc
            .create_absence(&Ctx::background(), "abcde", "01/09/30", None)
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failures().count(), 0);
        let marked = report.outcomes[0].result.as_ref().unwrap();
        let ids: Vec<i64> = marked.iter().map(|r| r.raid.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn failing_raid_is_reported_and_the_rest_still_written() {
        let mut raids = MockRaidBackend::new();
        let mut absences = MockAbsenceBackend::new();
        raids.expect_search_raids().returning(|_, f| {
            let date = f.date.unwrap();
            Ok(vec![
                raid(1, date, Difficulty::Heroic),
                raid(2, date, Difficulty::Mythic),
            ])
        });
        absences.expect_create_absence().times(2).returning(|_, a| {
            if a.raid.id == 1 {
                Err(GuildError::transport("create_absence", sqlx::Error::PoolTimedOut))
            } else {
                Ok(Absence { id: 12, ..a.clone() })
            }
        });

        let uc = AbsenceUseCase::new(Arc::new(known_player()), Arc::new(raids), Arc::new(absences));
        let report = uc
            .create_absence(&Ctx::background(), "abcde", "01/09/30", None)
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 0);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].1.kind(), ErrorKind::Transport);
        let written = report.outcomes[0].result.as_ref().unwrap();
        assert!(written[1].result.is_ok());

        let text = report.render("absent");
        assert!(text.starts_with("absent abcde:\n01/09/30: "));
        assert!(text.contains("(the database is unavailable"));
    }

    #[tokio::test]
    async fn long_range_is_rejected_before_any_lookup() {
        let uc = AbsenceUseCase::new(
            Arc::new(MockPlayerBackend::new()),
            Arc::new(MockRaidBackend::new()),
            Arc::new(MockAbsenceBackend::new()),
        );
        let err = uc
            .create_absence(&Ctx::background(), "abcde", "01/01/30", Some("31/12/31"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn reversed_range_fails_before_any_lookup() {
        let uc = AbsenceUseCase::new(
            Arc::new(MockPlayerBackend::new()),
            Arc::new(MockRaidBackend::new()),
            Arc::new(MockAbsenceBackend::new()),
        );
        let err = uc
            .create_absence(&Ctx::background(), "abcde", "03/09/30", Some("01/09/30"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn delete_attempts_every_absence_on_the_date() {
        let mut absences = MockAbsenceBackend::new();
        absences
            .expect_search_absences()
            .withf(|_, f| f.player_id == Some(4) && f.date == Some(day(2030, 9, 1)))
            .returning(|_, _| {
                Ok(vec![
                    Absence {
                        id: 7,
                        player: player(4, "abcde").reference(),
                        raid: raid(1, day(2030, 9, 1), Difficulty::Normal),
                    },
                    Absence {
                        id: 8,
                        player: player(4, "abcde").reference(),
                        raid: raid(2, day(2030, 9, 1), Difficulty::Heroic),
                    },
                ])
            });
        absences
            .expect_delete_absence()
            .times(2)
            .returning(|_, id| {
                if id == 7 {
                    Err(GuildError::not_found("absence", id))
                } else {
                    Ok(())
                }
            });

        let uc = AbsenceUseCase::new(
            Arc::new(known_player()),
            Arc::new(MockRaidBackend::new()),
            Arc::new(absences),
        );
        let report = uc
            .delete_absence(&Ctx::background(), "abcde", "01/09/30", None)
            .await
            .unwrap();
        assert_eq!(report.outcomes.len(), 1);
        let cleared = report.outcomes[0].result.as_ref().unwrap();
        assert_eq!(cleared.len(), 2);
        assert!(cleared[0].result.is_err());
        assert!(cleared[1].result.is_ok());
        assert_eq!(report.failures().count(), 1);
    }
}
