use serde::Serialize;

use crate::config::ModelConfig;
use crate::error::{ModelError, ModelResult};
use crate::optimizer;
use crate::points::{PointsCache, Scoreline};
use crate::ratings::TeamRating;
use crate::scoreline::{OutcomeProbs, ScoreGrid};
use crate::strength::{self, Expectation};

/// Everything derived from two ratings for one fixture.
#[derive(Debug, Clone)]
pub struct FixtureEval {
    pub expectation: Expectation,
    pub grid: ScoreGrid,
    /// Unbiased expected points per candidate tip, in tip-grid order.
    pub expected: Vec<(Scoreline, f64)>,
}

pub fn evaluate_fixture(
    home: &TeamRating,
    away: &TeamRating,
    model: &ModelConfig,
    cache: &PointsCache,
) -> ModelResult<FixtureEval> {
    let expectation = strength::match_expectation(home, away, model);
    let grid = ScoreGrid::poisson(expectation.home, expectation.away, cache.calc_range())?;
    let expected = cache.expected_points(&grid)?;
    Ok(FixtureEval {
        expectation,
        grid,
        expected,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub home: String,
    pub away: String,
    pub expectation: Expectation,
    pub outcome: OutcomeProbs,
    pub most_likely: Scoreline,
    pub tip: Scoreline,
    pub tip_expected_points: f64,
}

/// Predicted scoreline distribution and best tip under `draw_factor`.
pub fn forecast(
    home: &TeamRating,
    away: &TeamRating,
    model: &ModelConfig,
    cache: &PointsCache,
    draw_factor: f64,
) -> ModelResult<Forecast> {
    let eval = evaluate_fixture(home, away, model, cache)?;
    let tip = optimizer::select_tip(&eval.expected, draw_factor)?;
    let tip_expected_points = eval
        .expected
        .iter()
        .find(|(t, _)| *t == tip)
        .map(|(_, v)| *v)
        .unwrap_or(0.0);
    Ok(Forecast {
        home: home.name.clone(),
        away: away.name.clone(),
        expectation: eval.expectation,
        outcome: eval.grid.outcome_probs(),
        most_likely: eval.grid.most_likely(),
        tip,
        tip_expected_points,
    })
}

/// Splits a `HOME:AWAY` fixture argument into trimmed team names.
pub fn parse_fixture(raw: &str) -> ModelResult<(String, String)> {
    let (home, away) = raw
        .split_once(':')
        .map(|(h, a)| (h.trim(), a.trim()))
        .filter(|(h, a)| !h.is_empty() && !a.is_empty())
        .ok_or_else(|| ModelError::InvalidConfig(format!("fixture must be HOME:AWAY, got {raw:?}")))?;
    Ok((home.to_string(), away.to_string()))
}
