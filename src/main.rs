//! Job Scout service: binary entrypoint.
//! Boots the Axum HTTP server, wiring the pipeline, the daily scheduler and the dashboard API.

use anyhow::Context;
use job_scout::{
    api::{router, AppState},
    build_pipeline,
    ingest::scheduler::spawn_scheduler,
    metrics::Metrics,
    AppConfig,
};
use shuttle_axum::ShuttleAxum;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs filtered by `RUST_LOG`. `try_init` leaves an already
/// installed subscriber (e.g. the Shuttle runtime's) in place.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("job_scout=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load_default().context("Failed to load job scout config")?;
    let pipeline = build_pipeline(&cfg)?;

    if cfg.scheduler.enabled {
        let every = Duration::from_secs(cfg.scheduler.interval_secs);
        spawn_scheduler(pipeline.clone(), every);
        tracing::info!(interval_secs = cfg.scheduler.interval_secs, "scrape scheduler started");
    }

    let mut app = router(AppState::new(pipeline));
    match Metrics::init() {
        Ok(m) => app = app.merge(m.router()),
        Err(e) => tracing::warn!(error = %e, "metrics disabled"),
    }

    Ok(app.into())
}
