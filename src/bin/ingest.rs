use clap::Parser;
use tracing::info;

use scoreline_tipper::config::IngestArgs;
use scoreline_tipper::{dataset, init_tracing, load_env_files};

fn main() -> anyhow::Result<()> {
    load_env_files();
    let args = IngestArgs::parse();
    init_tracing();

    let matches = dataset::load_json(&args.input)?;
    let mut conn = dataset::open_db(&args.db)?;
    let source = args.input.display().to_string();
    let written = dataset::upsert_matches(&mut conn, &source, &matches)?;
    let stored = dataset::load_matches(&conn)?.len();

    info!(read = matches.len(), written, stored, db = %args.db.display(), "ingest finished");
    println!("Ingested {written} matches from {source} ({stored} stored)");
    Ok(())
}
