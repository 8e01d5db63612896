use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::points::{Hit, Scoreline, ScoringRule};

/// Ordered draw factors to evaluate. Totals are tracked by position in the
/// grid, never by float value.
#[derive(Debug, Clone, PartialEq)]
pub struct BiasGrid {
    values: Vec<f64>,
}

impl BiasGrid {
    pub fn new(values: Vec<f64>) -> ModelResult<Self> {
        if values.is_empty() {
            return Err(ModelError::EmptyBiasGrid);
        }
        if let Some(bad) = values.iter().copied().find(|v| !v.is_finite()) {
            return Err(ModelError::InvalidBias(bad));
        }
        Ok(Self { values })
    }

    /// `n` evenly spaced values from `start` to `stop`, both inclusive.
    pub fn linspace(start: f64, stop: f64, n: usize) -> ModelResult<Self> {
        let values = match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (n - 1) as f64;
                (0..n).map(|i| start + step * i as f64).collect()
            }
        };
        Self::new(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasTotal {
    pub bias: f64,
    pub points: u64,
    /// Matches in which the selected tip was a draw.
    pub draw_tips: u64,
    pub exact_hits: u64,
    pub difference_hits: u64,
    pub tendency_hits: u64,
}

impl BiasTotal {
    fn empty(bias: f64) -> Self {
        Self {
            bias,
            points: 0,
            draw_tips: 0,
            exact_hits: 0,
            difference_hits: 0,
            tendency_hits: 0,
        }
    }

    fn record(&mut self, rule: &ScoringRule, tip: Scoreline, actual: Scoreline) {
        let hit = Hit::of(tip, actual);
        self.points += u64::from(rule.award(hit));
        match hit {
            Hit::Exact => self.exact_hits += 1,
            Hit::Difference => self.difference_hits += 1,
            Hit::Tendency => self.tendency_hits += 1,
            Hit::Miss => {}
        }
        if tip.is_draw() {
            self.draw_tips += 1;
        }
    }
}

/// Best tip once draw tips have their expected value scaled by `bias`.
/// The first tip in `expected` wins ties.
pub fn select_tip(expected: &[(Scoreline, f64)], bias: f64) -> ModelResult<Scoreline> {
    pick(expected, bias).ok_or(ModelError::EmptyTipGrid)
}

fn pick(expected: &[(Scoreline, f64)], bias: f64) -> Option<Scoreline> {
    let mut best: Option<(Scoreline, f64)> = None;
    for &(tip, value) in expected {
        let adjusted = if tip.is_draw() { value * bias } else { value };
        match best {
            Some((_, top)) if adjusted <= top => {}
            _ => best = Some((tip, adjusted)),
        }
    }
    best.map(|(tip, _)| tip)
}

/// Accumulates contest points per draw factor over a stream of matches.
#[derive(Debug, Clone)]
pub struct DrawFactorOptimizer {
    rule: ScoringRule,
    totals: Vec<BiasTotal>,
    matches_counted: usize,
}

impl DrawFactorOptimizer {
    pub fn new(grid: &BiasGrid, rule: ScoringRule) -> Self {
        let totals = grid
            .values()
            .iter()
            .map(|&bias| BiasTotal::empty(bias))
            .collect();
        Self {
            rule,
            totals,
            matches_counted: 0,
        }
    }

    /// Scores one match for every draw factor.
    ///
    /// `expected` holds the unbiased expected points of every candidate tip in
    /// tip-grid order; the chosen tip is scored against `actual` with the
    /// plain rule. Each bias folds independently, so the grid is walked in
    /// parallel.
    pub fn observe(&mut self, expected: &[(Scoreline, f64)], actual: Scoreline) -> ModelResult<()> {
        if expected.is_empty() {
            return Err(ModelError::EmptyTipGrid);
        }
        let rule = self.rule;
        self.totals.par_iter_mut().for_each(|total| {
            if let Some(tip) = pick(expected, total.bias) {
                total.record(&rule, tip, actual);
            }
        });
        self.matches_counted += 1;
        Ok(())
    }

    pub fn totals(&self) -> &[BiasTotal] {
        &self.totals
    }

    pub fn matches_counted(&self) -> usize {
        self.matches_counted
    }

    /// Highest total; the earliest grid position wins ties.
    pub fn best(&self) -> BiasTotal {
        // The grid is never empty (BiasGrid::new rejects it).
        let mut best = self.totals[0];
        for total in &self.totals[1..] {
            if total.points > best.points {
                best = *total;
            }
        }
        best
    }
}
