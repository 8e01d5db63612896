use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use scoreline_tipper::backtest;
use scoreline_tipper::config::{DEFAULT_LAST_SEASON, DEFAULT_TARGET_COMPETITION, TipConfig, TrainArgs};
use scoreline_tipper::forecast;
use scoreline_tipper::points::{PointsCache, ScoringRule};
use scoreline_tipper::ratings::RatingStore;
use scoreline_tipper::{dataset, init_tracing, load_env_files, persist};

fn main() -> anyhow::Result<()> {
    load_env_files();
    let args = TrainArgs::parse();
    init_tracing();

    let matches = args
        .data
        .load_matches(DEFAULT_TARGET_COMPETITION, DEFAULT_LAST_SEASON)
        .context("loading matches")?;

    let mut model = args.model.model_config();
    if args.model.historic_scale {
        let (home, away) = dataset::historic_scale(&matches);
        model = model.with_scale(home, away);
    }

    let mut store = match args.init.as_deref() {
        Some(path) => {
            let saved = persist::load_ratings(path)?;
            info!(teams = saved.len(), path = %path.display(), "seeded ratings");
            RatingStore::from_ratings(saved)
        }
        None => RatingStore::new(),
    };
    backtest::train_into(&mut store, &matches, &model)?;
    info!(matches = matches.len(), teams = store.len(), "trained ratings");

    let ranked = store.ranked();
    let rows = if args.top == 0 {
        ranked.len()
    } else {
        args.top.min(ranked.len())
    };
    println!("{:>4} {:<28} {:>8} {:>8} {:>8}", "#", "team", "attack", "defense", "score");
    for (idx, team) in ranked.iter().take(rows).enumerate() {
        println!(
            "{:>4} {:<28} {:>8.2} {:>8.2} {:>8.2}",
            idx + 1,
            team.name,
            team.attack,
            team.defense,
            team.score()
        );
    }

    if !args.fixtures.is_empty() {
        let tips = TipConfig::default();
        let cache = PointsCache::new(tips.tip_range, tips.calc_range, &ScoringRule::default())?;
        for raw in &args.fixtures {
            let (home, away) = forecast::parse_fixture(raw)?;
            for name in [&home, &away] {
                if store.get(name).is_none() {
                    warn!(team = %name, "team has no rating; using the default");
                }
            }
            let f = forecast::forecast(
                &store.rating_or_default(&home),
                &store.rating_or_default(&away),
                &model,
                &cache,
                args.draw_factor,
            )?;
            println!(
                "{} vs {}: xG {:.2}-{:.2}  1X2 {:.1}% / {:.1}% / {:.1}%  likely {}  tip {} ({:.2} pts)",
                f.home,
                f.away,
                f.expectation.home,
                f.expectation.away,
                f.outcome.home * 100.0,
                f.outcome.draw * 100.0,
                f.outcome.away * 100.0,
                f.most_likely,
                f.tip,
                f.tip_expected_points
            );
        }
    }

    if let Some(path) = args.out.as_deref() {
        persist::save_ratings(path, &ranked)?;
        info!(path = %path.display(), "wrote ratings");
    }
    Ok(())
}
