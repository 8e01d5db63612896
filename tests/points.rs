use approx::assert_relative_eq;

use scoreline_tipper::ModelError;
use scoreline_tipper::points::{PointsCache, Scoreline, ScoringRule, points};
use scoreline_tipper::scoreline::ScoreGrid;

fn s(h: u8, a: u8) -> Scoreline {
    Scoreline::new(h, a)
}

#[test]
fn contest_rule_examples() {
    assert_eq!(points(s(2, 1), s(2, 1)), 4);
    assert_eq!(points(s(2, 1), s(1, 0)), 3);
    assert_eq!(points(s(3, 1), s(1, 0)), 2);
    assert_eq!(points(s(1, 0), s(0, 1)), 0);
    assert_eq!(points(s(1, 1), s(1, 1)), 4);
    // A wrong draw tip on a drawn match earns the difference points, never
    // the tendency points.
    assert_eq!(points(s(1, 1), s(2, 2)), 3);
    assert_eq!(points(s(0, 0), s(1, 0)), 0);
}

#[test]
fn exact_tips_dominate_on_every_scoreline() {
    for h in 0..6 {
        for a in 0..6 {
            let actual = s(h, a);
            for th in 0..6 {
                for ta in 0..6 {
                    assert!(points(actual, actual) >= points(s(th, ta), actual));
                }
            }
        }
    }
}

#[test]
fn points_are_symmetric_under_side_swap() {
    for (tip, actual) in [(s(2, 1), s(1, 0)), (s(3, 0), s(1, 0)), (s(0, 0), s(2, 2))] {
        let swapped_tip = s(tip.away, tip.home);
        let swapped_actual = s(actual.away, actual.home);
        assert_eq!(points(tip, actual), points(swapped_tip, swapped_actual));
    }
}

#[test]
fn custom_rule_feeds_the_cache() {
    let rule = ScoringRule {
        exact: 5,
        difference: 3,
        tendency: 1,
    };
    let cache = PointsCache::new(3, 5, &rule).unwrap();
    let grid = ScoreGrid::poisson(0.0, 0.0, 5).unwrap();
    let expected = cache.expected_points(&grid).unwrap();
    // All mass sits on 0:0, so only the 0:0 tip scores.
    assert_eq!(expected[0].0, s(0, 0));
    assert_relative_eq!(expected[0].1, 5.0, epsilon = 1e-12);
    assert!(expected[1..].iter().all(|(_, v)| *v < 3.0 + 1e-12));
}

#[test]
fn expected_points_reject_grid_of_other_size() {
    let cache = PointsCache::new(5, 7, &ScoringRule::default()).unwrap();
    let grid = ScoreGrid::poisson(1.4, 1.1, 6).unwrap();
    assert!(matches!(
        cache.expected_points(&grid),
        Err(ModelError::GridMismatch { expected: 7, got: 6 })
    ));
}

#[test]
fn expected_points_are_bounded_by_exact_points() {
    let cache = PointsCache::new(5, 7, &ScoringRule::default()).unwrap();
    let grid = ScoreGrid::poisson(1.6, 1.2, 7).unwrap();
    let expected = cache.expected_points(&grid).unwrap();
    assert_eq!(expected.len(), 25);
    for (tip, value) in expected {
        assert!((0.0..=4.0).contains(&value), "{tip} scored {value}");
    }
}
