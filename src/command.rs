//! Text command surface: one line in, one reply out. The grammar is
//! [`HELP`].

use std::fmt::Write as _;
use std::str::FromStr;
use std::time::Duration;

use crate::ctx::Ctx;
use crate::dates::{DATE_FORMAT, RANGE_SEPARATOR};
use crate::entity::{Absence, Fail, Loot, Player, Raid, Strike};
use crate::error::{GuildError, GuildResult};
use crate::usecase::Guild;

pub const HELP: &str = "\
player add|show|remove <name> | player list | player link <name> <discord id>
raid add <difficulty> <DD/MM/YY> <name> | raid show|remove <id> | raid list [DD/MM/YY]
strike add <player> <reason> | strike remove <id> | strike list <player>
loot add <player> <raid id> <item> | loot remove <id> | loot player <player> | loot raid <id>
loot assign <difficulty> <player...>
absence add|remove <player> <from>[..<to>] [<to>] | absence list <player>
fail add <player> <raid id> <reason> | fail show|remove <id> | fail edit <id> <reason>
fail player <player> | fail raid <id>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    PlayerAdd { name: String },
    PlayerShow { name: String },
    PlayerRemove { name: String },
    PlayerList,
    PlayerLink { name: String, discord_id: String },
    RaidAdd { difficulty: String, date: String, name: String },
    RaidShow { id: i64 },
    RaidRemove { id: i64 },
    RaidList { date: Option<String> },
    StrikeAdd { player: String, reason: String },
    StrikeRemove { id: i64 },
    StrikeList { player: String },
    LootAdd { player: String, raid_id: i64, item: String },
    LootRemove { id: i64 },
    LootOnPlayer { player: String },
    LootOnRaid { raid_id: i64 },
    LootAssign { difficulty: String, candidates: Vec<String> },
    AbsenceAdd { player: String, from: String, to: Option<String> },
    AbsenceRemove { player: String, from: String, to: Option<String> },
    AbsenceList { player: String },
    FailAdd { player: String, raid_id: i64, reason: String },
    FailShow { id: i64 },
    FailEdit { id: i64, reason: String },
    FailRemove { id: i64 },
    FailOnPlayer { player: String },
    FailOnRaid { raid_id: i64 },
}

fn parse_id(field: &'static str, raw: &str) -> GuildResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| GuildError::validation(field, format!("`{raw}` is not a positive number")))
}

fn rest(words: &[&str]) -> String {
    words.join(" ")
}

/// `<from>`, `<from>..<to>` or `<from> <to>`.
fn parse_span(words: &[&str]) -> GuildResult<(String, Option<String>)> {
    match words {
        [range] => match range.split_once(RANGE_SEPARATOR) {
            Some((from, to)) => Ok((from.to_string(), Some(to.to_string()))),
            None => Ok((range.to_string(), None)),
        },
        [from, to] => Ok((from.to_string(), Some(to.to_string()))),
        _ => Err(GuildError::validation(
            "dates",
            "expected <from>[..<to>] or <from> <to>",
        )),
    }
}

impl FromStr for Command {
    type Err = GuildError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["help"] | [] => Command::Help,

            ["player", "add", name] => Command::PlayerAdd { name: name.to_string() },
            ["player", "show", name] => Command::PlayerShow { name: name.to_string() },
            ["player", "remove", name] => Command::PlayerRemove { name: name.to_string() },
            ["player", "list"] => Command::PlayerList,
            ["player", "link", name, discord_id] => Command::PlayerLink {
                name: name.to_string(),
                discord_id: discord_id.to_string(),
            },

            ["raid", "add", difficulty, date, name @ ..] if !name.is_empty() => Command::RaidAdd {
                difficulty: difficulty.to_string(),
                date: date.to_string(),
                name: rest(name),
            },
            ["raid", "show", id] => Command::RaidShow { id: parse_id("raid id", id)? },
            ["raid", "remove", id] => Command::RaidRemove { id: parse_id("raid id", id)? },
            ["raid", "list"] => Command::RaidList { date: None },
            ["raid", "list", date] => Command::RaidList { date: Some(date.to_string()) },

            ["strike", "add", player, reason @ ..] if !reason.is_empty() => Command::StrikeAdd {
                player: player.to_string(),
                reason: rest(reason),
            },
            ["strike", "remove", id] => Command::StrikeRemove { id: parse_id("strike id", id)? },
            ["strike", "list", player] => Command::StrikeList { player: player.to_string() },

            ["loot", "add", player, raid_id, item @ ..] if !item.is_empty() => Command::LootAdd {
                player: player.to_string(),
                raid_id: parse_id("raid id", raid_id)?,
                item: rest(item),
            },
            ["loot", "remove", id] => Command::LootRemove { id: parse_id("loot id", id)? },
            ["loot", "player", player] => Command::LootOnPlayer { player: player.to_string() },
            ["loot", "raid", raid_id] => Command::LootOnRaid {
                raid_id: parse_id("raid id", raid_id)?,
            },
            ["loot", "assign", difficulty, candidates @ ..] if !candidates.is_empty() => {
                Command::LootAssign {
                    difficulty: difficulty.to_string(),
                    candidates: candidates.iter().map(|c| c.to_string()).collect(),
                }
            }

            ["absence", "add", player, span @ ..] => {
                let (from, to) = parse_span(span)?;
                Command::AbsenceAdd { player: player.to_string(), from, to }
            }
            ["absence", "remove", player, span @ ..] => {
                let (from, to) = parse_span(span)?;
                Command::AbsenceRemove { player: player.to_string(), from, to }
            }
            ["absence", "list", player] => Command::AbsenceList { player: player.to_string() },

            ["fail", "add", player, raid_id, reason @ ..] if !reason.is_empty() => Command::FailAdd {
                player: player.to_string(),
                raid_id: parse_id("raid id", raid_id)?,
                reason: rest(reason),
            },
            ["fail", "show", id] => Command::FailShow { id: parse_id("fail id", id)? },
            ["fail", "edit", id, reason @ ..] if !reason.is_empty() => Command::FailEdit {
                id: parse_id("fail id", id)?,
                reason: rest(reason),
            },
            ["fail", "remove", id] => Command::FailRemove { id: parse_id("fail id", id)? },
            ["fail", "player", player] => Command::FailOnPlayer { player: player.to_string() },
            ["fail", "raid", raid_id] => Command::FailOnRaid {
                raid_id: parse_id("raid id", raid_id)?,
            },

            _ => {
                return Err(GuildError::validation(
                    "command",
                    format!("`{}` not understood, try `help`", line.trim()),
                ))
            }
        };
        Ok(command)
    }
}

/// Run `command` under a fresh deadline and render the reply. Errors become
/// their user-facing message; nothing here is fatal.
pub async fn dispatch(guild: &Guild, command: Command, timeout: Duration) -> String {
    let ctx = Ctx::with_timeout(timeout);
    match execute(guild, &ctx, &command).await {
        Ok(reply) => reply,
        Err(err) => {
            log::warn!("{command:?} failed: {err}");
            err.user_message()
        }
    }
}

pub async fn execute(guild: &Guild, ctx: &Ctx, command: &Command) -> GuildResult<String> {
    let reply = match command {
        Command::Help => HELP.to_string(),

        Command::PlayerAdd { name } => {
            let player = guild.players.create_player(ctx, name).await?;
            format!("player {} added", player.name)
        }
        Command::PlayerShow { name } => render_player(&guild.players.read_player(ctx, name).await?),
        Command::PlayerRemove { name } => {
            guild.players.delete_player(ctx, name).await?;
            format!("player {name} removed")
        }
        Command::PlayerList => {
            let players = guild.players.list_players(ctx).await?;
            list("players", players.iter().map(|p| p.name.clone()))
        }
        Command::PlayerLink { name, discord_id } => {
            guild.players.link_discord(ctx, name, discord_id).await?;
            format!("player {name} linked")
        }

        Command::RaidAdd { difficulty, date, name } => {
            let raid = guild.raids.create_raid(ctx, name, difficulty, date).await?;
            format!("raid #{} {} added", raid.id, raid.label())
        }
        Command::RaidShow { id } => render_raid(&guild.raids.read_raid(ctx, *id).await?),
        Command::RaidRemove { id } => {
            guild.raids.delete_raid(ctx, *id).await?;
            format!("raid #{id} removed")
        }
        Command::RaidList { date } => {
            let raids = guild.raids.list_raids(ctx, date.as_deref()).await?;
            list("raids", raids.iter().map(raid_line))
        }

        Command::StrikeAdd { player, reason } => {
            let strike = guild.strikes.create_strike(ctx, reason, player).await?;
            format!("strike #{} given to {}", strike.id, strike.player.name)
        }
        Command::StrikeRemove { id } => {
            guild.strikes.delete_strike(ctx, *id).await?;
            format!("strike #{id} removed")
        }
        Command::StrikeList { player } => {
            let strikes = guild.strikes.read_strikes(ctx, player).await?;
            list(&format!("strikes of {player}"), strikes.iter().map(strike_line))
        }

        Command::LootAdd { player, raid_id, item } => {
            let loot = guild.loots.create_loot(ctx, item, *raid_id, player).await?;
            format!("loot #{} {} given to {}", loot.id, loot.name, loot.player.name)
        }
        Command::LootRemove { id } => {
            guild.loots.delete_loot(ctx, *id).await?;
            format!("loot #{id} removed")
        }
        Command::LootOnPlayer { player } => {
            let loots = guild.loots.list_loot_on_player(ctx, player).await?;
            list(&format!("loot of {player}"), loots.iter().map(loot_line))
        }
        Command::LootOnRaid { raid_id } => {
            let loots = guild.loots.list_loot_on_raid(ctx, *raid_id).await?;
            list(&format!("loot of raid #{raid_id}"), loots.iter().map(loot_line))
        }
        Command::LootAssign { difficulty, candidates } => {
            let player = guild
                .loots
                .select_player_to_assign(ctx, candidates, difficulty)
                .await?;
            format!("next {} item goes to {}", difficulty.to_ascii_lowercase(), player.name)
        }

        Command::AbsenceAdd { player, from, to } => guild
            .absences
            .create_absence(ctx, player, from, to.as_deref())
            .await?
            .render("absent"),
        Command::AbsenceRemove { player, from, to } => guild
            .absences
            .delete_absence(ctx, player, from, to.as_deref())
            .await?
            .render("present"),
        Command::AbsenceList { player } => {
            let absences = guild.absences.list_absences(ctx, player).await?;
            list(&format!("absences of {player}"), absences.iter().map(absence_line))
        }

        Command::FailAdd { player, raid_id, reason } => {
            let fail = guild.fails.create_fail(ctx, reason, player, *raid_id).await?;
            format!("fail #{} recorded for {}", fail.id, fail.player.name)
        }
        Command::FailShow { id } => fail_line(&guild.fails.read_fail(ctx, *id).await?),
        Command::FailEdit { id, reason } => {
            let fail = guild.fails.update_fail(ctx, *id, reason).await?;
            format!("fail #{} updated: {}", fail.id, fail.reason)
        }
        Command::FailRemove { id } => {
            guild.fails.delete_fail(ctx, *id).await?;
            format!("fail #{id} removed")
        }
        Command::FailOnPlayer { player } => {
            let fails = guild.fails.list_fail_on_player(ctx, player).await?;
            list(&format!("fails of {player}"), fails.iter().map(fail_line))
        }
        Command::FailOnRaid { raid_id } => {
            let fails = guild.fails.list_fail_on_raid(ctx, *raid_id).await?;
            list(&format!("fails of raid #{raid_id}"), fails.iter().map(fail_line))
        }
    };
    Ok(reply)
}

fn list(title: &str, lines: impl Iterator<Item = String>) -> String {
    let mut out = format!("{title}:");
    let mut empty = true;
    for line in lines {
        empty = false;
        out.push_str("\n- ");
        out.push_str(&line);
    }
    if empty {
        out.push_str(" none");
    }
    out
}

pub fn raid_line(raid: &Raid) -> String {
    format!("#{} {}", raid.id, raid.label())
}

pub fn strike_line(strike: &Strike) -> String {
    format!(
        "#{} {} [{}] {}",
        strike.id,
        strike.date.format(DATE_FORMAT),
        strike.season,
        strike.reason
    )
}

pub fn loot_line(loot: &Loot) -> String {
    format!("#{} {} to {} on {}", loot.id, loot.name, loot.player.name, loot.raid.label())
}

pub fn absence_line(absence: &Absence) -> String {
    format!("#{} {}", absence.id, absence.raid.label())
}

pub fn fail_line(fail: &Fail) -> String {
    format!(
        "#{} {} on {}: {}",
        fail.id,
        fail.player.name,
        fail.raid.label(),
        fail.reason
    )
}

pub fn render_player(player: &Player) -> String {
    let mut out = player.name.clone();
    if let Some(discord_id) = &player.discord_id {
        let _ = write!(out, " (discord {discord_id})");
    }
    let _ = write!(
        out,
        "\nstrikes: {} | loot: {} | missed raids: {} | fails: {}",
        player.strikes.len(),
        player.loots.len(),
        player.missed_raids.len(),
        player.fails.len()
    );
    for strike in &player.strikes {
        let _ = write!(out, "\nstrike {}", strike_line(strike));
    }
    for loot in &player.loots {
        let _ = write!(out, "\nloot {}", loot_line(loot));
    }
    for raid in &player.missed_raids {
        let _ = write!(out, "\nmissed {}", raid_line(raid));
    }
    for fail in &player.fails {
        let _ = write!(out, "\nfail {}", fail_line(fail));
    }
    out
}

pub fn render_raid(raid: &Raid) -> String {
    let mut out = raid_line(raid);
    let absent: Vec<&str> = raid.absences.iter().map(|a| a.player.name.as_str()).collect();
    let _ = write!(
        out,
        "\nabsent: {}",
        if absent.is_empty() { "none".to_string() } else { absent.join(", ") }
    );
    for loot in &raid.loots {
        let _ = write!(out, "\nloot #{} {} to {}", loot.id, loot.name, loot.player.name);
    }
    out
}
