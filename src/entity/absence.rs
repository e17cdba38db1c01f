use serde::{Deserialize, Serialize};

use super::{PlayerRef, Raid};
use crate::error::GuildResult;

/// A player missing one raid, unique on (player, raid).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    pub id: i64,
    pub player: PlayerRef,
    pub raid: Raid,
}

impl Absence {
    pub fn new(player: PlayerRef, raid: Raid) -> GuildResult<Self> {
        let absence = Self { id: 0, player, raid };
        absence.validate()?;
        Ok(absence)
    }

    pub fn validate(&self) -> GuildResult<()> {
        super::check_stored("absence player", self.player.id)?;
        super::check_stored("absence raid", self.raid.id)
    }
}
