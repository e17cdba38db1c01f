use std::sync::Arc;

use anyhow::Context as _;
use guildkeeper::command::{self, Command};
use guildkeeper::config::Settings;
use guildkeeper::db::{self, PgBackend};
use guildkeeper::usecase::Guild;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Configuration
    let settings = Settings::from_env().context("loading configuration")?;

    // Postgres pool + schema
    let pool = db::connect(&settings.database).await?;
    db::migrate(&pool).await?;

    let guild = Arc::new(Guild::new(
        Arc::new(PgBackend::new(pool)),
        settings.seasons.clone(),
    ));
    let timeout = settings.command_timeout;
    log::info!("guildkeeper ready, reading commands from stdin");

    // One task per command line
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = tokio::task::JoinSet::new();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        while tasks.try_join_next().is_some() {}

        let guild = guild.clone();
        tasks.spawn(async move {
            let reply = match line.parse::<Command>() {
                Ok(cmd) => command::dispatch(&guild, cmd, timeout).await,
                Err(err) => {
                    log::warn!("rejected `{line}`: {err}");
                    err.user_message()
                }
            };
            println!("{reply}");
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            log::error!("command task failed: {e}");
        }
    }
    Ok(())
}
