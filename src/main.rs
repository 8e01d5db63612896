use anyhow::Context;
use chrono::Datelike;
use clap::Parser;
use tracing::info;

use scoreline_tipper::backtest::{self, BacktestOptions, BacktestReport};
use scoreline_tipper::config::DrawFactorArgs;
use scoreline_tipper::optimizer::BiasGrid;
use scoreline_tipper::points::ScoringRule;
use scoreline_tipper::{init_tracing, load_env_files, persist};

fn main() -> anyhow::Result<()> {
    load_env_files();
    let args = DrawFactorArgs::parse();
    init_tracing();

    let competition = args.target_competition.clone();
    let matches = args
        .data
        .load_matches(&competition, args.train_until.year())
        .context("loading matches")?;
    info!(matches = matches.len(), "dataset ready");

    let opts = BacktestOptions {
        model: args.model.model_config(),
        tips: args.tip_config(),
        rule: ScoringRule::default(),
        train_until: args.train_until,
        target_competition: args.target(),
        bias_grid: BiasGrid::linspace(args.bias_start, args.bias_stop, args.bias_steps)?,
        historic_scale: args.model.historic_scale,
    };
    let report = backtest::run_draw_factor_backtest(&matches, &opts)?;

    print_report(&report);

    if let Some(path) = args.report.as_deref() {
        persist::save_json(path, &report)?;
        info!(path = %path.display(), "wrote report");
    }
    Ok(())
}

fn print_report(report: &BacktestReport) {
    println!(
        "train={} test={} counted={} scale=({:.3}, {:.3})",
        report.train_matches,
        report.test_matches,
        report.counted_matches,
        report.home_scale,
        report.away_scale
    );
    println!("{:>8} {:>8} {:>8} {:>8}", "bias", "points", "ppm", "draws");
    let per_match = |points: u64| {
        if report.counted_matches == 0 {
            0.0
        } else {
            points as f64 / report.counted_matches as f64
        }
    };
    for total in &report.totals {
        println!(
            "{:>8.4} {:>8} {:>8.3} {:>8}",
            total.bias,
            total.points,
            per_match(total.points),
            total.draw_tips
        );
    }
    let best = &report.best;
    println!(
        "Best draw factor: {:.4} ({} points, {:.3} per match, {} draw tips)",
        best.bias,
        best.points,
        per_match(best.points),
        best.draw_tips
    );
    println!(
        "Hits at best: exact={} difference={} tendency={}",
        best.exact_hits, best.difference_hits, best.tendency_hits
    );
    println!(
        "Draws: predicted {:.1}%, observed {:.1}%",
        report.draw_balance.predicted * 100.0,
        report.draw_balance.observed * 100.0
    );
}
