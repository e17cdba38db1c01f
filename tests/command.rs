use guildkeeper::command::{render_raid, Command};
use guildkeeper::entity::{Absence, Difficulty, PlayerRef, Raid};
use guildkeeper::error::{ErrorKind, GuildError};

#[test]
fn absence_accepts_every_range_spelling() {
    let expected = Command::AbsenceAdd {
        player: "abcde".into(),
        from: "01/09/30".into(),
        to: Some("03/09/30".into()),
    };
    assert_eq!("absence add abcde 01/09/30..03/09/30".parse::<Command>().unwrap(), expected);
    assert_eq!("absence add abcde 01/09/30 03/09/30".parse::<Command>().unwrap(), expected);
    assert_eq!(
        "absence remove abcde 01/09/30".parse::<Command>().unwrap(),
        Command::AbsenceRemove {
            player: "abcde".into(),
            from: "01/09/30".into(),
            to: None,
        }
    );
}

#[test]
fn free_text_tails_are_kept_whole() {
    assert_eq!(
        "raid add heroic 01/09/30 Nerub-ar Palace".parse::<Command>().unwrap(),
        Command::RaidAdd {
            difficulty: "heroic".into(),
            date: "01/09/30".into(),
            name: "Nerub-ar Palace".into(),
        }
    );
    assert_eq!(
        "loot assign mythic pone ptwo".parse::<Command>().unwrap(),
        Command::LootAssign {
            difficulty: "mythic".into(),
            candidates: vec!["pone".into(), "ptwo".into()],
        }
    );
}

#[test]
fn malformed_lines_are_validation_errors() {
    for bad in ["raid show zero", "raid show -1", "loot assign mythic", "strike add abcde", "dance"] {
        let err = bad.parse::<Command>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{bad:?}");
    }
}

#[test]
fn error_replies_name_the_missing_thing() {
    assert_eq!(
        GuildError::not_found("player", "ghost").user_message(),
        "player `ghost` does not exist"
    );
    assert_eq!(
        GuildError::already_exists("raid", "Palace 01/09/30 heroic").user_message(),
        "raid `Palace 01/09/30 heroic` already exists"
    );
}

#[test]
fn raid_reply_lists_absentees() {
    let date = chrono::NaiveDate::from_ymd_opt(2030, 9, 1).unwrap();
    let mut raid = Raid::new("Palace", date, Difficulty::Heroic).unwrap();
    raid.id = 3;
    raid.absences.push(Absence {
        id: 1,
        player: PlayerRef {
            id: 4,
            name: "abcde".into(),
        },
        raid: raid.clone(),
    });
    assert_eq!(render_raid(&raid), "#3 Palace 01/09/30 heroic\nabsent: abcde");
}
