use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::points::Scoreline;
use crate::ratings::TeamRating;

/// Expected goal rates of both sides for one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Expectation {
    pub home: f64,
    pub away: f64,
}

/// Goal rate of an attacker against a defender.
///
/// `scale * log2(1 + 2^(beta * (attack - defense)))`: a base-2 softplus, so the
/// rate is never negative, grows with the gap and equals `scale` at a zero gap.
pub fn expected_goals(attack: f64, defense: f64, scale: f64, beta: f64) -> f64 {
    scale * softplus2(beta * (attack - defense))
}

pub fn match_expectation(home: &TeamRating, away: &TeamRating, cfg: &ModelConfig) -> Expectation {
    Expectation {
        home: expected_goals(home.attack, away.defense, cfg.home_scale, cfg.beta),
        away: expected_goals(away.attack, home.defense, cfg.away_scale, cfg.beta),
    }
}

/// Applies one observed result to both ratings and returns the new pair.
///
/// Each side's goal residual moves its own attack up and the opponent's
/// defense down by the same amount, so a match yields four coupled deltas.
pub fn update_pair(
    home: &TeamRating,
    away: &TeamRating,
    result: Scoreline,
    cfg: &ModelConfig,
) -> (TeamRating, TeamRating) {
    let expected = match_expectation(home, away, cfg);

    let home_delta = cfg.step_size * (f64::from(result.home) - expected.home);
    let away_delta = cfg.step_size * (f64::from(result.away) - expected.away);

    let mut h = home.clone();
    let mut a = away.clone();
    h.attack += home_delta;
    h.defense -= away_delta;
    a.attack += away_delta;
    a.defense -= home_delta;
    (h, a)
}

// log2(1 + 2^x), rewritten for large |x| so 2^x never overflows.
fn softplus2(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp2().ln_1p() / std::f64::consts::LN_2
    } else {
        x.exp2().ln_1p() / std::f64::consts::LN_2
    }
}
