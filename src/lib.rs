//! Attack/defense team ratings, Poisson scoreline forecasts and a draw-factor
//! search for score-tipping contests.
//!
//! Results stream through [`ratings::RatingStore`] in kickoff order. For a
//! fixture, [`strength`] turns two ratings into goal rates, [`scoreline`]
//! builds the scoreline grid, [`points`] prices every candidate tip and
//! [`optimizer`] picks the best tip per draw factor. [`backtest`] wires the
//! pieces into a train/test run.

pub mod backtest;
pub mod config;
pub mod dataset;
pub mod error;
pub mod forecast;
pub mod optimizer;
pub mod persist;
pub mod points;
pub mod ratings;
pub mod scoreline;
pub mod strength;
pub mod synthetic;

pub use error::{ModelError, ModelResult};

/// Installs the `tracing` subscriber used by the binaries. `RUST_LOG`
/// overrides the default `info` filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

/// Loads `.env.local` and `.env` if present.
pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}
