//! PostgreSQL backend: pool start-up and the [`PgBackend`] that implements
//! every trait in [`crate::backend`].

use anyhow::Context as _;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;

use crate::config::DatabaseSettings;
use crate::ctx::Ctx;
use crate::error::{GuildError, GuildResult};

pub mod absence_repo;
pub mod fail_repo;
pub mod loot_repo;
pub(crate) mod models;
pub mod player_repo;
pub mod raid_repo;
pub(crate) mod sql;
pub mod strike_repo;

/// Open the shared pool, retrying with a fixed backoff. Only used at
/// start-up; queries never retry.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    let retries = FixedInterval::new(settings.connect_backoff)
        .take(settings.connect_attempts.saturating_sub(1));

    let mut attempt = 0_usize;
    let pool = Retry::start(retries, || {
        attempt += 1;
        let current = attempt;
        async move {
            PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .acquire_timeout(settings.acquire_timeout)
                .connect(&settings.url)
                .await
                .inspect_err(|e| {
                    log::warn!(
                        "postgres connect attempt {current}/{} failed: {e}",
                        settings.connect_attempts
                    )
                })
        }
    })
    .await
    .context("connecting to postgres")?;

    log::info!(
        "connected to postgres (max_connections = {})",
        settings.max_connections
    );
    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("running migrations")?;
    log::info!("database migrations applied");
    Ok(())
}

/// Relational implementation of the backend traits.
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_all<R>(
        &self,
        ctx: &Ctx,
        operation: &'static str,
        mut qb: QueryBuilder<'_, Postgres>,
    ) -> GuildResult<Vec<R>>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        log::debug!("{operation}: {}", qb.sql());
        ctx.run(operation, qb.build_query_as::<R>().fetch_all(&self.pool))
            .await?
            .map_err(|e| GuildError::transport(operation, e))
    }

    /// INSERT ... RETURNING id. A unique violation becomes AlreadyExists.
    async fn insert_returning_id(
        &self,
        ctx: &Ctx,
        operation: &'static str,
        entity: &'static str,
        key: &str,
        mut qb: QueryBuilder<'_, Postgres>,
    ) -> GuildResult<i64> {
        log::debug!("{operation}: {}", qb.sql());
        ctx.run(operation, qb.build_query_scalar::<i64>().fetch_one(&self.pool))
            .await?
            .map_err(|e| GuildError::from_sqlx(operation, entity, key, e))
    }

    /// Execute an UPDATE or DELETE addressed by id; zero affected rows is
    /// NotFound. `key` names the row in an AlreadyExists error when an
    /// update collides with a unique index.
    async fn execute_by_id(
        &self,
        ctx: &Ctx,
        operation: &'static str,
        entity: &'static str,
        id: i64,
        key: &str,
        mut qb: QueryBuilder<'_, Postgres>,
    ) -> GuildResult<()> {
        log::debug!("{operation}: {}", qb.sql());
        let done = ctx
            .run(operation, qb.build().execute(&self.pool))
            .await?
            .map_err(|e| GuildError::from_sqlx(operation, entity, key, e))?;
        if done.rows_affected() == 0 {
            return Err(GuildError::not_found(entity, id));
        }
        Ok(())
    }
}

/// First row or NotFound.
pub(crate) fn single<T>(rows: Vec<T>, entity: &'static str, key: impl ToString) -> GuildResult<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| GuildError::not_found(entity, key))
}
