//! Guild records as plain values.
//!
//! Constructors and `validate()` enforce each entity's own invariants before
//! any I/O happens. Cross-row rules (uniqueness, references) belong to the
//! backend.

pub mod absence;
pub mod fail;
pub mod loot;
pub mod player;
pub mod raid;
pub mod season;
pub mod strike;

pub use absence::Absence;
pub use fail::Fail;
pub use loot::Loot;
pub use player::{Player, PlayerRef};
pub use raid::{Difficulty, Raid};
pub use season::{Season, SeasonCalendar};
pub use strike::Strike;

use crate::error::{GuildError, GuildResult};

/// Longest free-text field the schema stores.
pub const MAX_TEXT_LEN: usize = 255;

/// Non-empty and at most [`MAX_TEXT_LEN`] characters.
pub(crate) fn check_text(field: &'static str, value: &str) -> GuildResult<()> {
    let len = value.chars().count();
    if value.trim().is_empty() {
        return Err(GuildError::validation(field, "must not be empty"));
    }
    if len > MAX_TEXT_LEN {
        return Err(GuildError::validation(
            field,
            format!("{len} characters, at most {MAX_TEXT_LEN} allowed"),
        ));
    }
    Ok(())
}

/// Stored rows always carry a positive id.
pub(crate) fn check_stored(field: &'static str, id: i64) -> GuildResult<()> {
    if id <= 0 {
        return Err(GuildError::validation(field, "is required"));
    }
    Ok(())
}
