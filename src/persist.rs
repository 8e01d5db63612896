use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::ratings::TeamRating;

const RATINGS_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RatingsFile {
    version: u32,
    ratings: Vec<TeamRating>,
}

/// One line of the flat ratings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RatingRow {
    team: String,
    attack: f64,
    defense: f64,
    score: f64,
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

// Writes next to `path` and renames into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize {}", path.display()))?;
    write_atomic(path, json.as_bytes())
}

/// Saves ratings in the given order: a `team,attack,defense,score` table for
/// `.csv` paths, a versioned JSON document otherwise.
pub fn save_ratings(path: &Path, ratings: &[TeamRating]) -> Result<()> {
    if is_csv(path) {
        return write_atomic(path, &ratings_csv(ratings)?);
    }
    let file = RatingsFile {
        version: RATINGS_VERSION,
        ratings: ratings.to_vec(),
    };
    save_json(path, &file)
}

fn ratings_csv(ratings: &[TeamRating]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for r in ratings {
        writer
            .serialize(RatingRow {
                team: r.name.clone(),
                attack: r.attack,
                defense: r.defense,
                score: r.score(),
            })
            .with_context(|| format!("encode rating of {}", r.name))?;
    }
    writer.into_inner().context("finish ratings table")
}

pub fn load_ratings(path: &Path) -> Result<Vec<TeamRating>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read ratings {}", path.display()))?;
    if is_csv(path) {
        return parse_ratings_csv(&raw).with_context(|| format!("parse ratings {}", path.display()));
    }
    let file: RatingsFile = serde_json::from_str(&raw)
        .with_context(|| format!("parse ratings {}", path.display()))?;
    if file.version != RATINGS_VERSION {
        bail!(
            "ratings file {} has version {}, expected {}",
            path.display(),
            file.version,
            RATINGS_VERSION
        );
    }
    Ok(file.ratings)
}

// The score column is derived and ignored on load.
fn parse_ratings_csv(raw: &str) -> Result<Vec<TeamRating>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());
    let mut out = Vec::new();
    for row in reader.deserialize() {
        let row: RatingRow = row?;
        out.push(TeamRating {
            name: row.team,
            attack: row.attack,
            defense: row.defense,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("scoreline_tipper_{tag}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn ratings_survive_save_and_load() {
        let dir = scratch_dir("ratings");
        let path = dir.join("ratings.json");
        let ratings = vec![
            TeamRating {
                name: "Leverkusen".to_string(),
                attack: 12.5,
                defense: 8.25,
            },
            TeamRating::new("Darmstadt"),
        ];

        save_ratings(&path, &ratings).unwrap();
        assert!(!dir.join("ratings.json.tmp").exists());
        assert_eq!(load_ratings(&path).unwrap(), ratings);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let dir = scratch_dir("version");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ratings.json");
        fs::write(&path, r#"{"version":99,"ratings":[]}"#).unwrap();

        let err = load_ratings(&path).unwrap_err();
        assert!(err.to_string().contains("version 99"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn csv_ratings_are_a_flat_table() {
        let dir = scratch_dir("csv");
        let path = dir.join("ratings.csv");
        let ratings = vec![
            TeamRating {
                name: "Stuttgart".to_string(),
                attack: 3.5,
                defense: 1.0,
            },
            TeamRating {
                name: "Union Berlin".to_string(),
                attack: -2.0,
                defense: 0.5,
            },
        ];

        save_ratings(&path, &ratings).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "team,attack,defense,score");
        assert_eq!(lines[1], "Stuttgart,3.5,1.0,4.5");
        assert_eq!(lines.len(), 3);
        assert_eq!(load_ratings(&path).unwrap(), ratings);

        let _ = fs::remove_dir_all(&dir);
    }
}
