use serde::{Deserialize, Serialize};

use super::{PlayerRef, Raid};
use crate::error::GuildResult;

/// An item awarded to a player on a raid, unique on (name, raid, player).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loot {
    pub id: i64,
    pub name: String,
    pub raid: Raid,
    pub player: PlayerRef,
}

impl Loot {
    pub fn new(name: &str, raid: Raid, player: PlayerRef) -> GuildResult<Self> {
        let loot = Self {
            id: 0,
            name: name.trim().to_string(),
            raid,
            player,
        };
        loot.validate()?;
        Ok(loot)
    }

    pub fn validate(&self) -> GuildResult<()> {
        super::check_text("item name", &self.name)?;
        super::check_stored("loot raid", self.raid.id)?;
        super::check_stored("loot player", self.player.id)
    }
}
