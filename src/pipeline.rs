// src/pipeline.rs
//! One aggregation run: scrape → filter → dedupe → rank → generate → insert.
//!
//! Scheduled and on-demand triggers share `Pipeline::run_once`. At most one
//! run executes at a time; a trigger that finds the run lock held is
//! rejected with `PipelineError::Busy` instead of queueing.

use chrono::Utc;
use metrics::{counter, gauge};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::aggregate::aggregate;
use crate::config::{AppConfig, RankingConfig, SearchConfig};
use crate::generate::DynGenerator;
use crate::ingest::scrape_all;
use crate::ingest::types::SourceAdapter;
use crate::store::{JobRecord, JobStore};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("a scrape is already running")]
    Busy,
    #[error("job store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Postings left after filter + dedupe.
    pub jobs_found: usize,
    /// Of those, how many were not yet stored.
    pub new_jobs: usize,
}

pub struct Pipeline {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    search: SearchConfig,
    ranking: RankingConfig,
    pacing: Duration,
    store: Arc<dyn JobStore>,
    generator: DynGenerator,
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        store: Arc<dyn JobStore>,
        generator: DynGenerator,
        cfg: &AppConfig,
    ) -> Self {
        Self {
            adapters,
            search: cfg.search.clone(),
            ranking: cfg.ranking.clone(),
            pacing: cfg.pipeline.pacing(),
            store,
            generator,
            run_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub async fn run_once(&self) -> Result<RunSummary, PipelineError> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            counter!("scout_runs_rejected_total").increment(1);
            tracing::warn!("scrape trigger rejected: a run is already in progress");
            return Err(PipelineError::Busy);
        };
        counter!("scout_runs_total").increment(1);
        tracing::info!(adapters = self.adapters.len(), "pipeline run started");

        let raw = scrape_all(&self.adapters, self.pacing).await;
        let ranked = aggregate(raw, &self.search, &self.ranking);
        let jobs_found = ranked.len();

        let mut new_jobs = 0usize;
        for posting in ranked {
            if self.store.exists(&posting.id)? {
                continue;
            }
            let materials = self.generator.customize(&posting.posting).await;
            let record = JobRecord::new(posting, Utc::now()).with_materials(materials);
            if self.store.insert(&record)? {
                new_jobs += 1;
            }
        }

        counter!("scout_inserted_total").increment(new_jobs as u64);
        gauge!("scout_pipeline_last_run_ts").set(Utc::now().timestamp() as f64);
        tracing::info!(jobs_found, new_jobs, "pipeline run finished");
        Ok(RunSummary {
            jobs_found,
            new_jobs,
        })
    }
}
