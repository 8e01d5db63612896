use chrono::{NaiveDate, NaiveTime};

use scoreline_tipper::backtest::{BacktestOptions, run_draw_factor_backtest, train_ratings};
use scoreline_tipper::config::{ModelConfig, TipConfig};
use scoreline_tipper::dataset::{self, MatchRecord};
use scoreline_tipper::optimizer::BiasGrid;
use scoreline_tipper::points::ScoringRule;
use scoreline_tipper::synthetic::SyntheticLeague;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(day: NaiveDate, home: &str, away: &str, goals: (u8, u8)) -> MatchRecord {
    MatchRecord {
        competition: "1. Bundesliga".to_string(),
        season: None,
        matchday: None,
        date: day,
        kickoff: NaiveTime::from_hms_opt(15, 30, 0),
        home: home.to_string(),
        away: away.to_string(),
        home_goals: goals.0,
        away_goals: goals.1,
    }
}

fn options(train_until: NaiveDate, grid: BiasGrid) -> BacktestOptions {
    BacktestOptions {
        model: ModelConfig::default(),
        tips: TipConfig::default(),
        rule: ScoringRule::default(),
        train_until,
        target_competition: Some("1. Bundesliga".to_string()),
        bias_grid: grid,
        historic_scale: false,
    }
}

fn synthetic_matches() -> Vec<MatchRecord> {
    let mut matches = SyntheticLeague::generate(11, 10, 3, 2021, "1. Bundesliga").matches;
    dataset::sort_chronologically(&mut matches);
    matches
}

#[test]
fn home_win_moves_ratings_the_right_way() {
    let rows = vec![record(date(2023, 5, 1), "Home", "Away", (2, 0))];
    let store = train_ratings(&rows, &ModelConfig::default()).unwrap();
    let home = store.get("Home").unwrap();
    let away = store.get("Away").unwrap();
    assert!(home.attack > 0.0);
    assert!(away.defense < 0.0);
    assert!(home.score() > away.score());
}

#[test]
fn draw_tip_share_grows_with_the_draw_factor() {
    let matches = synthetic_matches();
    let grid = BiasGrid::linspace(0.8, 2.0, 25).unwrap();
    let report = run_draw_factor_backtest(&matches, &options(date(2023, 7, 1), grid)).unwrap();

    assert!(report.counted_matches > 0);
    for pair in report.totals.windows(2) {
        assert!(pair[0].bias < pair[1].bias);
        assert!(
            pair[0].draw_tips <= pair[1].draw_tips,
            "draw tips fell from {} to {}",
            pair[0].draw_tips,
            pair[1].draw_tips
        );
    }
    let first = report.totals[0].draw_tips;
    let last = report.totals[report.totals.len() - 1].draw_tips;
    assert!(last > first, "draw tips stayed at {first} across the grid");
    let max_points = 4 * report.counted_matches as u64;
    assert!(report.totals.iter().all(|t| t.points <= max_points));
    assert!(report.totals.iter().all(|t| t.points <= report.best.points));
}

#[test]
fn two_team_draw_tip_appears_once_the_factor_is_large_enough() {
    // After a 2:0 the next meeting expects about 2.32 to 0.32 goals, so the
    // best draw tip only overtakes 2:0 above a factor of roughly 4.38.
    let rows = vec![
        record(date(2023, 5, 1), "Home", "Away", (2, 0)),
        record(date(2023, 8, 5), "Home", "Away", (1, 1)),
    ];
    let grid = BiasGrid::linspace(1.0, 6.0, 11).unwrap();
    let report = run_draw_factor_backtest(&rows, &options(date(2023, 7, 1), grid)).unwrap();

    assert_eq!(report.counted_matches, 1);
    let draws: Vec<u64> = report.totals.iter().map(|t| t.draw_tips).collect();
    assert_eq!(draws, vec![0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1]);
    // The 2:0 tip misses a 1:1; the draw tip earns the difference points.
    assert_eq!(report.totals[0].points, 0);
    assert_eq!(report.totals[10].points, 3);
    assert_eq!(report.totals[10].difference_hits, 1);
    assert_eq!(report.best.bias, 4.5);
}

#[test]
fn reruns_are_identical() {
    let matches = synthetic_matches();
    let grid = BiasGrid::linspace(1.0, 1.5, 11).unwrap();
    let opts = options(date(2023, 7, 1), grid);
    let first = run_draw_factor_backtest(&matches, &opts).unwrap();
    let second = run_draw_factor_backtest(&matches, &opts).unwrap();
    assert_eq!(first.totals, second.totals);
    assert_eq!(first.best, second.best);
    assert_eq!(first.ratings, second.ratings);
}

#[test]
fn best_prefers_the_earliest_of_equal_totals() {
    // Identical draw factors produce identical totals.
    let rows = vec![record(date(2023, 8, 5), "A", "B", (1, 1))];
    let grid = BiasGrid::new(vec![1.0, 1.0, 1.0]).unwrap();
    let report = run_draw_factor_backtest(&rows, &options(date(2023, 7, 1), grid)).unwrap();
    assert_eq!(report.counted_matches, 1);
    assert_eq!(report.best, report.totals[0]);
}

#[test]
fn empty_test_split_counts_nothing() {
    let matches = synthetic_matches();
    let grid = BiasGrid::linspace(1.0, 1.2, 3).unwrap();
    let report = run_draw_factor_backtest(&matches, &options(date(2030, 1, 1), grid)).unwrap();
    assert_eq!(report.test_matches, 0);
    assert_eq!(report.counted_matches, 0);
    assert!(report.totals.iter().all(|t| t.points == 0 && t.draw_tips == 0));
    assert_eq!(report.draw_balance.predicted, 0.0);
    assert_eq!(report.draw_balance.observed, 0.0);
}
