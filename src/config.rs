use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::{Args, Parser};

use crate::dataset::{self, MatchRecord};
use crate::error::{ModelError, ModelResult};
use crate::synthetic::SyntheticLeague;

pub const DEFAULT_TARGET_COMPETITION: &str = "1. Bundesliga";
/// Final season of a generated league when no split date anchors it.
pub const DEFAULT_LAST_SEASON: i32 = 2023;

/// Tunables of the expectation model and the rating updater.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelConfig {
    /// Sensitivity of the expected goal rate to the attack/defense gap.
    pub beta: f64,
    /// Rating step per goal of residual.
    pub step_size: f64,
    /// Goal rate of the home side at a zero rating gap.
    pub home_scale: f64,
    /// Goal rate of the away side at a zero rating gap.
    pub away_scale: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            beta: 0.1,
            step_size: 10.0,
            home_scale: 1.0,
            away_scale: 1.0,
        }
    }
}

impl ModelConfig {
    pub fn with_scale(self, home_scale: f64, away_scale: f64) -> Self {
        Self {
            home_scale,
            away_scale,
            ..self
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if !(self.beta.is_finite() && self.beta > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "beta must be positive, got {}",
                self.beta
            )));
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(ModelError::InvalidConfig(format!(
                "step_size must be positive, got {}",
                self.step_size
            )));
        }
        for (label, scale) in [("home_scale", self.home_scale), ("away_scale", self.away_scale)] {
            if !(scale.is_finite() && scale >= 0.0) {
                return Err(ModelError::InvalidConfig(format!(
                    "{label} must be non-negative, got {scale}"
                )));
            }
        }
        Ok(())
    }
}

/// Bounds of the tip search.
///
/// Candidate tips cover `0..tip_range` goals per side; probabilities and
/// points are evaluated over `0..=calc_range` so tail mass beyond the tips is
/// still counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipConfig {
    pub tip_range: u8,
    pub calc_range: u8,
}

impl Default for TipConfig {
    fn default() -> Self {
        Self {
            tip_range: 5,
            calc_range: 7,
        }
    }
}

impl TipConfig {
    pub fn validate(&self) -> ModelResult<()> {
        if self.tip_range == 0 {
            return Err(ModelError::EmptyTipGrid);
        }
        if self.tip_range > self.calc_range.saturating_add(1) {
            return Err(ModelError::InvalidConfig(format!(
                "tip_range {} exceeds calc_range {} + 1",
                self.tip_range, self.calc_range
            )));
        }
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Match dataset: a `.json` record list or a SQLite store
    #[arg(long, env = "TIPPER_DATA", conflicts_with = "synthetic")]
    pub data: Option<PathBuf>,

    /// Use a generated league instead of a dataset
    #[arg(long)]
    pub synthetic: bool,

    /// Seed for the generated league
    #[arg(long, env = "TIPPER_SEED", default_value = "7")]
    pub seed: u64,

    /// Number of teams in the generated league
    #[arg(long, default_value = "18")]
    pub synthetic_teams: usize,

    /// Number of seasons in the generated league
    #[arg(long, default_value = "4")]
    pub synthetic_seasons: usize,
}

impl DataArgs {
    /// Sorted matches from `--data`, or a generated league whose final season
    /// starts in `last_season`.
    pub fn load_matches(&self, competition: &str, last_season: i32) -> Result<Vec<MatchRecord>> {
        if self.synthetic {
            let first_season = last_season - self.synthetic_seasons as i32 + 1;
            let league = SyntheticLeague::generate(
                self.seed,
                self.synthetic_teams,
                self.synthetic_seasons,
                first_season,
                competition,
            );
            let mut matches = league.matches;
            dataset::sort_chronologically(&mut matches);
            return Ok(matches);
        }
        let Some(path) = self.data.as_deref() else {
            bail!("no dataset given: pass --data <file> or --synthetic");
        };
        dataset::load_any(path)
    }
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Sensitivity of expected goals to the rating gap
    #[arg(long, env = "TIPPER_BETA", default_value = "0.1")]
    pub beta: f64,

    /// Rating step per goal of residual
    #[arg(long, env = "TIPPER_STEP_SIZE", default_value = "10.0")]
    pub step_size: f64,

    /// Scale expected goals by the mean home/away goals of the training data
    #[arg(long)]
    pub historic_scale: bool,
}

impl ModelArgs {
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            beta: self.beta,
            step_size: self.step_size,
            ..ModelConfig::default()
        }
    }
}

/// Search the draw factor that maximises tipping points on a test split
#[derive(Parser, Debug, Clone)]
#[command(name = "tipper", version, about)]
pub struct DrawFactorArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// First day of the test split; earlier matches only train ratings
    #[arg(long, env = "TIPPER_TRAIN_UNTIL", default_value = "2023-07-01")]
    pub train_until: NaiveDate,

    /// Only matches of this competition are scored
    #[arg(long, env = "TIPPER_TARGET", default_value = DEFAULT_TARGET_COMPETITION)]
    pub target_competition: String,

    /// Score matches of every competition
    #[arg(long)]
    pub all_competitions: bool,

    /// Smallest draw factor of the grid
    #[arg(long, default_value = "1.0")]
    pub bias_start: f64,

    /// Largest draw factor of the grid
    #[arg(long, default_value = "1.5")]
    pub bias_stop: f64,

    /// Number of evenly spaced draw factors
    #[arg(long, default_value = "101")]
    pub bias_steps: usize,

    /// Tips cover 0..tip_range goals per side
    #[arg(long, default_value = "5")]
    pub tip_range: u8,

    /// Probabilities are evaluated over 0..=calc_range goals per side
    #[arg(long, default_value = "7")]
    pub calc_range: u8,

    /// Write the full report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl DrawFactorArgs {
    pub fn tip_config(&self) -> TipConfig {
        TipConfig {
            tip_range: self.tip_range,
            calc_range: self.calc_range,
        }
    }

    pub fn target(&self) -> Option<String> {
        if self.all_competitions {
            None
        } else {
            Some(self.target_competition.clone())
        }
    }
}

/// Train team ratings on a full dataset
#[derive(Parser, Debug, Clone)]
#[command(name = "train_ratings", version, about)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Start from previously saved ratings (`.csv` or JSON) instead of zero
    #[arg(long)]
    pub init: Option<PathBuf>,

    /// Write the ranked ratings: a flat table for `.csv` paths, JSON otherwise
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Fixture to forecast after training, as HOME:AWAY (repeatable)
    #[arg(long = "fixture", value_name = "HOME:AWAY")]
    pub fixtures: Vec<String>,

    /// Draw factor applied when picking forecast tips
    #[arg(long, default_value = "1.0")]
    pub draw_factor: f64,

    /// Rows to print (0 prints all)
    #[arg(long, default_value = "0")]
    pub top: usize,
}

/// Load a JSON match list into the SQLite match store
#[derive(Parser, Debug, Clone)]
#[command(name = "ingest", version, about)]
pub struct IngestArgs {
    /// JSON file with an array of match records
    #[arg(long)]
    pub input: PathBuf,

    /// SQLite store to upsert into
    #[arg(long, env = "TIPPER_DB", default_value = "matches.sqlite")]
    pub db: PathBuf,
}
