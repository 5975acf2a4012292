use std::fs;
use std::path::PathBuf;

use nfl_awards::normalize::{StatField, normalize_table};
use nfl_awards::snapshot::{RawTable, StatCategory, parse_snapshot_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("season_2024");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_table(name: &str) -> RawTable {
    parse_snapshot_json(&read_fixture(name)).expect("fixture should parse")
}

#[test]
fn passing_fixture_flattens_multi_level_headers() {
    let raw = fixture_table("passing.json");
    let table = normalize_table(StatCategory::Passing, &raw);

    assert_eq!(
        table.columns,
        vec![
            "Player", "Team", "Age", "Pos", "G", "W", "L", "Cmp%", "Yds", "TD", "Int", "Y/A", "Rate",
            "Awards"
        ]
    );
    let names: Vec<&str> = table.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Joe Burrow", "Lamar Jackson", "Bo Nix", "Josh Allen", "Jayden Daniels"]
    );
}

#[test]
fn first_duplicate_column_wins() {
    let raw = fixture_table("passing.json");
    let table = normalize_table(StatCategory::Passing, &raw);
    let burrow = &table.records[0];
    // passing yards, not sack yards
    assert_eq!(burrow.yards, Some(4918.0));
    assert_eq!(burrow.touchdowns, Some(43.0));
    assert_eq!(burrow.interceptions, Some(9.0));
}

#[test]
fn qb_record_fills_wins_and_losses() {
    let raw = fixture_table("passing.json");
    let table = normalize_table(StatCategory::Passing, &raw);
    let allen = table
        .records
        .iter()
        .find(|r| r.name == "Josh Allen")
        .expect("allen present");
    assert_eq!(allen.wins, Some(13.0));
    assert_eq!(allen.losses, Some(4.0));
    assert_eq!(allen.rating, Some(101.4));
    assert_eq!(allen.completion_pct, Some(63.6));
}

#[test]
fn explicit_win_column_is_not_overwritten_by_qb_record() {
    let mut raw = RawTable::new(&["Player", "W", "L", "QBrec"]);
    raw.push_row(&["Solo QB", "11", "6", "2-1-0"]);
    let table = normalize_table(StatCategory::Passing, &raw);
    assert_eq!(table.records[0].wins, Some(11.0));
    assert_eq!(table.records[0].losses, Some(6.0));
}

#[test]
fn traded_players_keep_first_row() {
    let raw = fixture_table("rushing.json");
    let table = normalize_table(StatCategory::Rushing, &raw);
    assert_eq!(table.len(), 9);
    let akers: Vec<_> = table.records.iter().filter(|r| r.name == "Cam Akers").collect();
    assert_eq!(akers.len(), 1);
    assert_eq!(akers[0].team.as_deref(), Some("2TM"));
    assert_eq!(akers[0].yards, Some(444.0));
}

#[test]
fn object_rows_follow_column_labels() {
    let raw = fixture_table("receiving.json");
    let table = normalize_table(StatCategory::Receiving, &raw);
    assert_eq!(table.len(), 4);
    let bowers = &table.records[3];
    assert_eq!(bowers.name, "Brock Bowers");
    assert_eq!(bowers.position.as_deref(), Some("TE"));
    assert_eq!(bowers.receptions, Some(112.0));
    assert_eq!(bowers.age, Some(22.0));
}

#[test]
fn defense_blank_cells_become_zero() {
    let raw = fixture_table("defense.json");
    let table = normalize_table(StatCategory::Defense, &raw);
    assert_eq!(table.len(), 7);
    let reserve = table
        .records
        .iter()
        .find(|r| r.name == "Reserve Rookie")
        .expect("reserve present");
    assert_eq!(reserve.sacks, Some(0.0));
    assert_eq!(reserve.combined_tackles, Some(0.0));
    // no Tkl column in this table
    assert_eq!(reserve.tackles, None);
}

#[test]
fn team_falls_back_to_tm_column() {
    let mut raw = RawTable::new(&["Player", "Tm", "Yds"]);
    raw.push_row(&["A Back", "KAN", "812"]);
    let table = normalize_table(StatCategory::Rushing, &raw);
    assert_eq!(table.records[0].team.as_deref(), Some("KAN"));
    assert!(table.columns.iter().any(|c| c == "Tm"));
}

#[test]
fn unparseable_cells_are_zero_and_age_is_unknown() {
    let mut raw = RawTable::new(&["Player", "Age", "Yds", "TD", "Notes"]);
    raw.push_row(&["Odd Row", "n/a", "N/A", "", "free text"]);
    let table = normalize_table(StatCategory::Rushing, &raw);
    let rec = &table.records[0];
    assert_eq!(rec.age, None);
    assert_eq!(rec.yards, Some(0.0));
    assert_eq!(rec.touchdowns, Some(0.0));
    // absent from the table entirely
    assert_eq!(rec.attempts, None);
    assert_eq!(rec.stat(StatField::Attempts), 0.0);
    assert!(!table.columns.iter().any(|c| c == "Notes"));
}

#[test]
fn header_and_blank_rows_are_dropped() {
    let mut raw = RawTable::new(&["Player", "Yds"]);
    raw.push_row(&["Player", "Yds"]);
    raw.push_row(&["", "100"]);
    raw.push_row(&["   ", "100"]);
    raw.push_row(&["Real Player", "100"]);
    let table = normalize_table(StatCategory::Rushing, &raw);
    assert_eq!(table.len(), 1);
    assert_eq!(table.records[0].name, "Real Player");
}

#[test]
fn normalizing_twice_is_stable() {
    for (category, file) in [
        (StatCategory::Passing, "passing.json"),
        (StatCategory::Rushing, "rushing.json"),
        (StatCategory::Receiving, "receiving.json"),
        (StatCategory::Defense, "defense.json"),
    ] {
        let once = normalize_table(category, &fixture_table(file));
        let twice = normalize_table(category, &once.to_raw());
        assert_eq!(once, twice, "{file} changed on second pass");
    }
}

#[test]
fn missing_player_column_gives_empty_table() {
    let mut raw = RawTable::new(&["Name", "Yds"]);
    raw.push_row(&["Someone", "12"]);
    assert!(normalize_table(StatCategory::Receiving, &raw).is_empty());
    assert!(normalize_table(StatCategory::Defense, &RawTable::default()).is_empty());
}

#[test]
fn empty_and_null_snapshots_parse_to_empty_tables() {
    assert!(parse_snapshot_json("").expect("empty should parse").is_empty());
    assert!(parse_snapshot_json("null").expect("null should parse").is_empty());
    assert!(parse_snapshot_json("{not json").is_err());
}

#[test]
fn source_suffixed_label_does_not_shadow_repeat() {
    let mut raw = RawTable::new(&["Player", "Yds", "Yds_1", "Yds", "TD"]);
    raw.push_row(&["Receiver", "1100", "12", "-4", "9"]);
    let table = normalize_table(StatCategory::Receiving, &raw);
    assert_eq!(table.records[0].yards, Some(1100.0));
    assert_eq!(table.records[0].touchdowns, Some(9.0));
    assert_eq!(table.columns, vec!["Player", "Yds", "TD"]);
}
