//! Runtime configuration for the guild keeper, read from the environment.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context as _};

use crate::entity::SeasonCalendar;

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    /// How long a query waits for a free pooled connection.
    pub acquire_timeout: Duration,
    /// Total start-up connection attempts, including the first.
    pub connect_attempts: usize,
    pub connect_backoff: Duration,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    /// Deadline applied to every incoming command.
    pub command_timeout: Duration,
    pub seasons: SeasonCalendar,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;

        let max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let connect_attempts = lookup("DB_CONNECT_ATTEMPTS")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);

        let connect_backoff = lookup("DB_CONNECT_BACKOFF_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(2));

        let command_timeout = lookup("COMMAND_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(3));

        let seasons = match lookup("SEASONS") {
            Some(raw) if !raw.trim().is_empty() => raw
                .parse::<SeasonCalendar>()
                .context("parsing SEASONS")?,
            _ => SeasonCalendar::default(),
        };

        Ok(Settings {
            database: DatabaseSettings {
                url,
                max_connections,
                acquire_timeout: command_timeout,
                connect_attempts,
                connect_backoff,
            },
            command_timeout,
            seasons,
        })
    }
}
