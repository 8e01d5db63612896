use serde::Serialize;

use crate::error::{ModelError, ModelResult};
use crate::points::Scoreline;

/// Home win, draw and away win mass of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutcomeProbs {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// Joint scoreline probabilities under independent Poisson goals, truncated
/// to `0..=max_goals` per side. Row = home goals, column = away goals.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreGrid {
    max_goals: u8,
    cells: Vec<f64>,
}

impl ScoreGrid {
    pub fn poisson(home_rate: f64, away_rate: f64, max_goals: u8) -> ModelResult<Self> {
        let pmf_h = poisson_pmf(home_rate, max_goals)?;
        let pmf_a = poisson_pmf(away_rate, max_goals)?;

        let mut cells = Vec::with_capacity(pmf_h.len() * pmf_a.len());
        for p_h in &pmf_h {
            for p_a in &pmf_a {
                cells.push(p_h * p_a);
            }
        }
        Ok(Self { max_goals, cells })
    }

    pub fn max_goals(&self) -> u8 {
        self.max_goals
    }

    /// Row-major probabilities.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn get(&self, score: Scoreline) -> Option<f64> {
        if score.home > self.max_goals || score.away > self.max_goals {
            return None;
        }
        let side = usize::from(self.max_goals) + 1;
        self.cells
            .get(usize::from(score.home) * side + usize::from(score.away))
            .copied()
    }

    /// Mass inside the grid; the remainder is the truncated tail.
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// First most probable scoreline in row-major order.
    pub fn most_likely(&self) -> Scoreline {
        let side = usize::from(self.max_goals) + 1;
        let mut best = 0usize;
        for (idx, p) in self.cells.iter().enumerate() {
            if *p > self.cells[best] {
                best = idx;
            }
        }
        Scoreline::new((best / side) as u8, (best % side) as u8)
    }

    /// Home/draw/away probabilities, renormalised over the grid. A grid
    /// without mass reports an even split.
    pub fn outcome_probs(&self) -> OutcomeProbs {
        let side = usize::from(self.max_goals) + 1;
        let mut p_home = 0.0;
        let mut p_draw = 0.0;
        let mut p_away = 0.0;
        for (idx, p) in self.cells.iter().enumerate() {
            let (h, a) = (idx / side, idx % side);
            if h > a {
                p_home += p;
            } else if h < a {
                p_away += p;
            } else {
                p_draw += p;
            }
        }

        let sum = p_home + p_draw + p_away;
        if sum > 0.0 {
            OutcomeProbs {
                home: p_home / sum,
                draw: p_draw / sum,
                away: p_away / sum,
            }
        } else {
            let third = 1.0 / 3.0;
            OutcomeProbs {
                home: third,
                draw: third,
                away: third,
            }
        }
    }
}

/// Poisson probabilities for `0..=max_k` goals.
///
/// A zero rate puts all mass on 0 goals. Negative or non-finite rates are
/// rejected rather than clamped.
pub fn poisson_pmf(rate: f64, max_k: u8) -> ModelResult<Vec<f64>> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ModelError::InvalidRate(rate));
    }
    let decay = (-rate).exp();
    Ok((0..=max_k)
        .map(|k| rate.powi(i32::from(k)) * decay / factorial(k))
        .collect())
}

fn factorial(k: u8) -> f64 {
    // Exact in u64 up to 20!, which covers any realistic truncation bound.
    if k <= 20 {
        (1..=u64::from(k)).product::<u64>() as f64
    } else {
        (21..=u32::from(k)).fold(factorial(20), |acc, n| acc * f64::from(n))
    }
}
