use serde::{Deserialize, Serialize};

use super::{Fail, Loot, Raid, Strike};
use crate::error::{GuildError, GuildResult};

pub const MAX_NAME_LEN: usize = 12;

/// A guild member.
///
/// `strikes`, `loots`, `missed_raids` and `fails` are projections filled by
/// the backend when the player is read; the authoritative rows live in their
/// own tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub discord_id: Option<String>,
    pub strikes: Vec<Strike>,
    pub loots: Vec<Loot>,
    pub missed_raids: Vec<Raid>,
    pub fails: Vec<Fail>,
}

/// Lightweight pointer to a player, embedded in the rows that reference one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: i64,
    pub name: String,
}

impl Player {
    /// A not-yet-stored player.
    pub fn new(name: &str) -> GuildResult<Self> {
        let player = Self {
            name: name.to_string(),
            ..Self::default()
        };
        player.validate()?;
        Ok(player)
    }

    pub fn validate(&self) -> GuildResult<()> {
        validate_name(&self.name)
    }

    pub fn reference(&self) -> PlayerRef {
        PlayerRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// 1 to 12 characters, lowercase `a`-`z` only.
pub fn validate_name(name: &str) -> GuildResult<()> {
    if name.is_empty() {
        return Err(GuildError::validation("player name", "must not be empty"));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(GuildError::validation(
            "player name",
            format!("`{name}` has {len} characters, at most {MAX_NAME_LEN} allowed"),
        ));
    }
    if name != name.to_lowercase() || !name.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(GuildError::validation(
            "player name",
            format!("`{name}` must only contain lowercase letters a-z"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn accepts_plain_lowercase() {
        assert!(Player::new("abcde").is_ok());
        assert!(Player::new("abcdefghijkl").is_ok());
    }

    #[test]
    fn rejects_uppercase_digits_and_length() {
        for bad in ["Abc1", "ABC", "abc1", "abc de", "", "abcdefghijklm", "élan"] {
            let err = Player::new(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{bad:?}");
        }
    }
}
