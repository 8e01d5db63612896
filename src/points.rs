use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::scoreline::ScoreGrid;

/// A (home goals, away goals) pair, used both for tips and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: u8,
    pub away: u8,
}

impl Scoreline {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn is_draw(&self) -> bool {
        self.home == self.away
    }

    pub fn goal_diff(&self) -> i16 {
        i16::from(self.home) - i16::from(self.away)
    }
}

impl std::fmt::Display for Scoreline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}

/// Points awarded by the tipping contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub exact: u32,
    pub difference: u32,
    pub tendency: u32,
}

impl Default for ScoringRule {
    fn default() -> Self {
        Self {
            exact: 4,
            difference: 3,
            tendency: 2,
        }
    }
}

/// Which tier of the rule a tip reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hit {
    Exact,
    Difference,
    Tendency,
    Miss,
}

impl Hit {
    /// A tipped draw has no tendency of its own: it hits only on the exact
    /// result or on another draw (same difference).
    pub fn of(tip: Scoreline, actual: Scoreline) -> Self {
        if tip == actual {
            Hit::Exact
        } else if tip.goal_diff() == actual.goal_diff() {
            Hit::Difference
        } else if (tip.home > tip.away && actual.home > actual.away)
            || (tip.home < tip.away && actual.home < actual.away)
        {
            Hit::Tendency
        } else {
            Hit::Miss
        }
    }
}

impl ScoringRule {
    pub fn award(&self, hit: Hit) -> u32 {
        match hit {
            Hit::Exact => self.exact,
            Hit::Difference => self.difference,
            Hit::Tendency => self.tendency,
            Hit::Miss => 0,
        }
    }

    pub fn points(&self, tip: Scoreline, actual: Scoreline) -> u32 {
        self.award(Hit::of(tip, actual))
    }
}

/// Contest points of the default 4/3/2 rule.
pub fn points(tip: Scoreline, actual: Scoreline) -> u32 {
    ScoringRule::default().points(tip, actual)
}

/// Points of one fixed tip against every result in `0..=calc_range` per side.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsMatrix {
    tip: Scoreline,
    calc_range: u8,
    cells: Vec<f64>,
}

impl PointsMatrix {
    pub fn new(tip: Scoreline, calc_range: u8, rule: &ScoringRule) -> Self {
        let side = usize::from(calc_range) + 1;
        let mut cells = Vec::with_capacity(side * side);
        for h in 0..=calc_range {
            for a in 0..=calc_range {
                cells.push(f64::from(rule.points(tip, Scoreline::new(h, a))));
            }
        }
        Self {
            tip,
            calc_range,
            cells,
        }
    }

    pub fn tip(&self) -> Scoreline {
        self.tip
    }

    pub fn get(&self, actual: Scoreline) -> Option<f64> {
        if actual.home > self.calc_range || actual.away > self.calc_range {
            return None;
        }
        let side = usize::from(self.calc_range) + 1;
        self.cells
            .get(usize::from(actual.home) * side + usize::from(actual.away))
            .copied()
    }

    /// Probability-weighted points of this tip under `grid`.
    pub fn expected(&self, grid: &ScoreGrid) -> ModelResult<f64> {
        if grid.max_goals() != self.calc_range {
            return Err(ModelError::GridMismatch {
                expected: self.calc_range,
                got: grid.max_goals(),
            });
        }
        Ok(self
            .cells
            .iter()
            .zip(grid.cells())
            .map(|(pts, p)| pts * p)
            .sum())
    }
}

/// One points matrix per candidate tip, built once and shared read-only.
///
/// Tips are held in row-major order (home goals, then away goals, both
/// ascending from 0); tip selection relies on this order for tie-breaks.
#[derive(Debug, Clone)]
pub struct PointsCache {
    tip_range: u8,
    calc_range: u8,
    matrices: Vec<PointsMatrix>,
}

impl PointsCache {
    pub fn new(tip_range: u8, calc_range: u8, rule: &ScoringRule) -> ModelResult<Self> {
        if tip_range == 0 {
            return Err(ModelError::EmptyTipGrid);
        }
        let mut matrices = Vec::with_capacity(usize::from(tip_range) * usize::from(tip_range));
        for h in 0..tip_range {
            for a in 0..tip_range {
                matrices.push(PointsMatrix::new(Scoreline::new(h, a), calc_range, rule));
            }
        }
        Ok(Self {
            tip_range,
            calc_range,
            matrices,
        })
    }

    pub fn tip_range(&self) -> u8 {
        self.tip_range
    }

    pub fn calc_range(&self) -> u8 {
        self.calc_range
    }

    pub fn matrices(&self) -> &[PointsMatrix] {
        &self.matrices
    }

    /// Expected points of every candidate tip, in cache order.
    pub fn expected_points(&self, grid: &ScoreGrid) -> ModelResult<Vec<(Scoreline, f64)>> {
        self.matrices
            .iter()
            .map(|m| Ok((m.tip(), m.expected(grid)?)))
            .collect()
    }
}
