//! Run the aggregation pipeline once and print the best matches.

use anyhow::Context;
use job_scout::{build_pipeline, store::JobStore, AppConfig};
use tracing_subscriber::EnvFilter;

const TOP: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("job_scout=info,warn")),
        )
        .init();

    let cfg = AppConfig::load_default().context("Failed to load job scout config")?;
    let pipeline = build_pipeline(&cfg)?;
    let summary = pipeline.run_once().await?;
    println!(
        "Found {} matching jobs ({} new)\n",
        summary.jobs_found, summary.new_jobs
    );

    for (i, r) in pipeline.store().list(TOP)?.iter().enumerate() {
        let p = &r.posting;
        println!("{:>2}. {} @ {}", i + 1, p.title, p.company);
        println!("    location: {}", p.location);
        println!("    salary:   {}", if p.salary.is_empty() { "-" } else { p.salary.as_str() });
        println!("    score:    {}  source: {}", r.match_score, p.source);
        println!("    url:      {}", p.url);
    }
    Ok(())
}
