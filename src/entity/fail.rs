use serde::{Deserialize, Serialize};

use super::{PlayerRef, Raid};
use crate::error::GuildResult;

/// A mistake a player made during a raid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fail {
    pub id: i64,
    pub reason: String,
    pub player: PlayerRef,
    pub raid: Raid,
}

impl Fail {
    pub fn new(reason: &str, player: PlayerRef, raid: Raid) -> GuildResult<Self> {
        let fail = Self {
            id: 0,
            reason: reason.trim().to_string(),
            player,
            raid,
        };
        fail.validate()?;
        Ok(fail)
    }

    pub fn validate(&self) -> GuildResult<()> {
        super::check_text("fail reason", &self.reason)?;
        super::check_stored("fail player", self.player.id)?;
        super::check_stored("fail raid", self.raid.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_raid() -> Raid {
        Raid {
            id: 3,
            name: "Liberation of Undermine".into(),
            ..Raid::default()
        }
    }

    #[test]
    fn needs_reason_player_and_raid() {
        let player = PlayerRef {
            id: 1,
            name: "tank".into(),
        };
        assert!(Fail::new("stood in fire", player.clone(), stored_raid()).is_ok());
        assert!(Fail::new("   ", player.clone(), stored_raid()).is_err());
        assert!(Fail::new("stood in fire", PlayerRef::default(), stored_raid()).is_err());
        assert!(Fail::new("stood in fire", player, Raid::default()).is_err());
    }
}
