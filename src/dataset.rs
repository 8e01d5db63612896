use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::points::Scoreline;

/// One finished match, already parsed by the data-preparation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub competition: String,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub matchday: Option<u32>,
    pub date: NaiveDate,
    #[serde(default)]
    pub kickoff: Option<NaiveTime>,
    pub home: String,
    pub away: String,
    pub home_goals: u8,
    pub away_goals: u8,
}

impl MatchRecord {
    pub fn result(&self) -> Scoreline {
        Scoreline::new(self.home_goals, self.away_goals)
    }

    /// Ordering key: date first, then kickoff. Matches without a kickoff time
    /// sort ahead of timed ones on the same day.
    pub fn kickoff_key(&self) -> (NaiveDate, Option<NaiveTime>) {
        (self.date, self.kickoff)
    }

    /// `None` targets every competition.
    pub fn in_competition(&self, target: Option<&str>) -> bool {
        target.is_none_or(|t| self.competition == t)
    }
}

/// Stable sort by kickoff; matches with equal keys keep their input order.
pub fn sort_chronologically(matches: &mut [MatchRecord]) {
    matches.sort_by_key(|m| m.kickoff_key());
}

/// Index of the first match dated before its predecessor, if any.
pub fn first_out_of_order(matches: &[MatchRecord]) -> Option<usize> {
    matches
        .windows(2)
        .position(|w| w[1].kickoff_key() < w[0].kickoff_key())
        .map(|idx| idx + 1)
}

/// Splits sorted matches into those played before `cutoff` and the rest.
pub fn split_at_date(matches: &[MatchRecord], cutoff: NaiveDate) -> (&[MatchRecord], &[MatchRecord]) {
    let idx = matches.partition_point(|m| m.date < cutoff);
    matches.split_at(idx)
}

/// Mean home and away goals, or `(1.0, 1.0)` for an empty slice.
pub fn historic_scale(matches: &[MatchRecord]) -> (f64, f64) {
    if matches.is_empty() {
        return (1.0, 1.0);
    }
    let n = matches.len() as f64;
    let home: f64 = matches.iter().map(|m| f64::from(m.home_goals)).sum();
    let away: f64 = matches.iter().map(|m| f64::from(m.away_goals)).sum();
    (home / n, away / n)
}

pub fn load_json(path: &Path) -> Result<Vec<MatchRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read match list {}", path.display()))?;
    let matches: Vec<MatchRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parse match list {}", path.display()))?;
    Ok(matches)
}

/// Loads `.json` record lists directly and anything else as a SQLite store.
/// The result is sorted chronologically.
pub fn load_any(path: &Path) -> Result<Vec<MatchRecord>> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let mut matches = if is_json {
        load_json(path)?
    } else {
        let conn = open_db(path)?;
        load_matches(&conn)?
    };
    sort_chronologically(&mut matches);
    Ok(matches)
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            competition TEXT NOT NULL,
            season TEXT NULL,
            matchday INTEGER NULL,
            match_date TEXT NOT NULL,
            kickoff TEXT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_goals INTEGER NOT NULL,
            away_goals INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (competition, match_date, home_team, away_team)
        );
        CREATE INDEX IF NOT EXISTS idx_matches_date ON matches(match_date, kickoff);
        CREATE INDEX IF NOT EXISTS idx_matches_competition ON matches(competition);

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            finished_at TEXT NOT NULL,
            source TEXT NOT NULL,
            matches_upserted INTEGER NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Inserts or refreshes matches in one transaction and logs the run.
pub fn upsert_matches(conn: &mut Connection, source: &str, matches: &[MatchRecord]) -> Result<usize> {
    let updated_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin ingest transaction")?;
    for m in matches {
        tx.execute(
            r#"
            INSERT INTO matches (
                competition, season, matchday, match_date, kickoff,
                home_team, away_team, home_goals, away_goals, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(competition, match_date, home_team, away_team) DO UPDATE SET
                season = excluded.season,
                matchday = excluded.matchday,
                kickoff = excluded.kickoff,
                home_goals = excluded.home_goals,
                away_goals = excluded.away_goals,
                updated_at = excluded.updated_at
            "#,
            params![
                m.competition,
                m.season,
                m.matchday,
                m.date,
                m.kickoff,
                m.home,
                m.away,
                m.home_goals,
                m.away_goals,
                updated_at,
            ],
        )
        .with_context(|| format!("upsert {} vs {} on {}", m.home, m.away, m.date))?;
    }
    tx.execute(
        "INSERT INTO ingest_runs(finished_at, source, matches_upserted) VALUES (?1, ?2, ?3)",
        params![Utc::now().to_rfc3339(), source, matches.len() as i64],
    )
    .context("insert ingest run")?;
    tx.commit().context("commit ingest transaction")?;
    Ok(matches.len())
}

pub fn load_matches(conn: &Connection) -> Result<Vec<MatchRecord>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                competition, season, matchday, match_date, kickoff,
                home_team, away_team, home_goals, away_goals
            FROM matches
            ORDER BY match_date ASC, kickoff ASC, rowid ASC
            "#,
        )
        .context("prepare load matches query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(MatchRecord {
                competition: row.get(0)?,
                season: row.get(1)?,
                matchday: row.get(2)?,
                date: row.get(3)?,
                kickoff: row.get(4)?,
                home: row.get(5)?,
                away: row.get(6)?,
                home_goals: row.get(7)?,
                away_goals: row.get(8)?,
            })
        })
        .context("query load matches")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode match row")?);
    }
    Ok(out)
}
