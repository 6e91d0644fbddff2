// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::pipeline::{Pipeline, PipelineError};

/// Run the pipeline every `period`, first tick one period after startup.
/// A tick that finds a run already in progress is skipped.
pub fn spawn_scheduler(pipeline: Arc<Pipeline>, period: Duration) -> JoinHandle<()> {
    let period = period.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match pipeline.run_once().await {
                Ok(summary) => tracing::info!(
                    target: "scheduler",
                    jobs_found = summary.jobs_found,
                    new_jobs = summary.new_jobs,
                    "scheduled scrape done"
                ),
                Err(PipelineError::Busy) => {
                    tracing::info!(target: "scheduler", "scheduled scrape skipped, run in progress")
                }
                Err(e) => tracing::error!(target: "scheduler", error = %e, "scheduled scrape failed"),
            }
        }
    })
}
