use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ModelConfig, TipConfig};
use crate::dataset::{self, MatchRecord};
use crate::error::{ModelError, ModelResult};
use crate::forecast;
use crate::optimizer::{BiasGrid, BiasTotal, DrawFactorOptimizer};
use crate::points::{PointsCache, ScoringRule};
use crate::ratings::{RatingStore, TeamRating};

#[derive(Debug, Clone)]
pub struct BacktestOptions {
    pub model: ModelConfig,
    pub tips: TipConfig,
    pub rule: ScoringRule,
    /// First day of the test split.
    pub train_until: NaiveDate,
    /// Competition whose matches are scored; `None` scores all of them.
    pub target_competition: Option<String>,
    pub bias_grid: BiasGrid,
    /// Replace the model's goal scales with the training split's mean goals.
    pub historic_scale: bool,
}

/// Mean predicted draw probability of the scored matches next to the share
/// that actually ended level. Both are zero when nothing was scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawBalance {
    pub predicted: f64,
    pub observed: f64,
}

impl DrawBalance {
    fn from_sums(draw_prob_sum: f64, draws: usize, matches: usize) -> Self {
        if matches == 0 {
            return Self {
                predicted: 0.0,
                observed: 0.0,
            };
        }
        let n = matches as f64;
        Self {
            predicted: draw_prob_sum / n,
            observed: draws as f64 / n,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub train_matches: usize,
    pub test_matches: usize,
    pub counted_matches: usize,
    pub home_scale: f64,
    pub away_scale: f64,
    pub totals: Vec<BiasTotal>,
    pub best: BiasTotal,
    pub draw_balance: DrawBalance,
    pub ratings: Vec<TeamRating>,
}

fn ensure_chronological(matches: &[MatchRecord]) -> ModelResult<()> {
    match dataset::first_out_of_order(matches) {
        Some(index) => Err(ModelError::OutOfOrder { index }),
        None => Ok(()),
    }
}

/// Feeds `matches` through the updater in order, on top of `store`.
pub fn train_into(
    store: &mut RatingStore,
    matches: &[MatchRecord],
    model: &ModelConfig,
) -> ModelResult<()> {
    model.validate()?;
    ensure_chronological(matches)?;
    for m in matches {
        store.apply_result(&m.home, &m.away, m.result(), model);
    }
    Ok(())
}

pub fn train_ratings(matches: &[MatchRecord], model: &ModelConfig) -> ModelResult<RatingStore> {
    let mut store = RatingStore::new();
    train_into(&mut store, matches, model)?;
    info!(matches = matches.len(), teams = store.len(), "trained ratings");
    Ok(store)
}

/// Trains on matches before `train_until`, then walks the test split in
/// order: target-competition matches are tipped for every draw factor and
/// scored, and every match (target or not) updates the ratings afterwards.
pub fn run_draw_factor_backtest(
    matches: &[MatchRecord],
    opts: &BacktestOptions,
) -> ModelResult<BacktestReport> {
    opts.model.validate()?;
    opts.tips.validate()?;
    ensure_chronological(matches)?;

    let (train, test) = dataset::split_at_date(matches, opts.train_until);
    let model = if opts.historic_scale {
        let (home, away) = dataset::historic_scale(train);
        opts.model.with_scale(home, away)
    } else {
        opts.model
    };
    info!(
        train = train.len(),
        test = test.len(),
        home_scale = model.home_scale,
        away_scale = model.away_scale,
        "split dataset at {}",
        opts.train_until
    );

    let mut store = RatingStore::new();
    train_into(&mut store, train, &model)?;

    let cache = PointsCache::new(opts.tips.tip_range, opts.tips.calc_range, &opts.rule)?;
    let mut optimizer = DrawFactorOptimizer::new(&opts.bias_grid, opts.rule);
    let target = opts.target_competition.as_deref();

    let mut draw_prob_sum = 0.0;
    let mut draws = 0usize;

    for m in test {
        if m.in_competition(target) {
            let home = store.rating_or_default(&m.home);
            let away = store.rating_or_default(&m.away);
            let eval = forecast::evaluate_fixture(&home, &away, &model, &cache)?;
            optimizer.observe(&eval.expected, m.result())?;

            draw_prob_sum += eval.grid.outcome_probs().draw;
            if m.result().is_draw() {
                draws += 1;
            }
            debug!(
                home = %m.home,
                away = %m.away,
                exp_home = eval.expectation.home,
                exp_away = eval.expectation.away,
                result = %m.result(),
                "scored test match"
            );
        }
        store.apply_result(&m.home, &m.away, m.result(), &model);
    }

    if optimizer.matches_counted() == 0 {
        warn!(
            target = target.unwrap_or("*"),
            "no test match belongs to the target competition"
        );
    }

    let best = optimizer.best();
    info!(
        counted = optimizer.matches_counted(),
        best_bias = best.bias,
        best_points = best.points,
        "draw factor search finished"
    );

    Ok(BacktestReport {
        train_matches: train.len(),
        test_matches: test.len(),
        counted_matches: optimizer.matches_counted(),
        home_scale: model.home_scale,
        away_scale: model.away_scale,
        totals: optimizer.totals().to_vec(),
        best,
        draw_balance: DrawBalance::from_sums(draw_prob_sum, draws, optimizer.matches_counted()),
        ratings: store.ranked(),
    })
}
