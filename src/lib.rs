// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod generate;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::AppConfig;
pub use crate::pipeline::{Pipeline, PipelineError, RunSummary};

use anyhow::Context;
use std::sync::Arc;

use crate::generate::build_generator;
use crate::ingest::providers::build_adapters;
use crate::store::{JobStore, SqliteStore};

/// Wire config → store, adapters and generator into a ready pipeline.
pub fn build_pipeline(cfg: &AppConfig) -> anyhow::Result<Arc<Pipeline>> {
    let store: Arc<dyn JobStore> = Arc::new(
        SqliteStore::open(&cfg.store.path).context("Failed to open job store")?,
    );
    let adapters = build_adapters(cfg).context("Failed to build source adapters")?;
    let generator = build_generator(&cfg.ai, &cfg.profile);
    tracing::info!(
        adapters = ?adapters.iter().map(|a| a.name()).collect::<Vec<_>>(),
        generator = generator.name(),
        store = %cfg.store.path.display(),
        "pipeline assembled"
    );
    Ok(Arc::new(Pipeline::new(adapters, store, generator, cfg)))
}
