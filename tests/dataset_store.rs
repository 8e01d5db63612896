use std::fs;
use std::path::PathBuf;

use scoreline_tipper::dataset::{self, MatchRecord};
use scoreline_tipper::persist;
use scoreline_tipper::synthetic::SyntheticLeague;

fn scratch(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tipper_it_{tag}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn league() -> Vec<MatchRecord> {
    SyntheticLeague::generate(3, 6, 2, 2022, "2. Bundesliga").matches
}

#[test]
fn json_and_sqlite_load_the_same_matches() {
    let dir = scratch("roundtrip");
    let json = dir.join("matches.json");
    let db = dir.join("matches.sqlite");

    let mut matches = league();
    matches.reverse();
    persist::save_json(&json, &matches).unwrap();

    let from_json = dataset::load_any(&json).unwrap();
    assert!(dataset::first_out_of_order(&from_json).is_none());

    let mut conn = dataset::open_db(&db).unwrap();
    let written = dataset::upsert_matches(&mut conn, "test", &from_json).unwrap();
    assert_eq!(written, from_json.len());
    drop(conn);

    let from_db = dataset::load_any(&db).unwrap();
    assert_eq!(from_db, from_json);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn reingesting_updates_instead_of_duplicating() {
    let dir = scratch("reingest");
    let db = dir.join("store.sqlite");
    let mut matches = league();
    dataset::sort_chronologically(&mut matches);

    let mut conn = dataset::open_db(&db).unwrap();
    dataset::upsert_matches(&mut conn, "first", &matches).unwrap();

    matches[0].home_goals = 9;
    dataset::upsert_matches(&mut conn, "second", &matches[..1]).unwrap();

    let stored = dataset::load_matches(&conn).unwrap();
    assert_eq!(stored.len(), matches.len());
    assert_eq!(stored[0].home_goals, 9);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn split_respects_the_cutoff_day() {
    let mut matches = league();
    dataset::sort_chronologically(&mut matches);
    let cutoff = chrono::NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
    let (train, test) = dataset::split_at_date(&matches, cutoff);
    assert_eq!(train.len() + test.len(), matches.len());
    assert!(train.iter().all(|m| m.date < cutoff));
    assert!(test.iter().all(|m| m.date >= cutoff));
    assert_eq!(test.first().and_then(|m| m.season.as_deref()), Some("2023/24"));
}
