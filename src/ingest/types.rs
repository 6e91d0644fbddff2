// src/ingest/types.rs
use metrics::counter;
use serde::{Deserialize, Serialize};

/// One job listing as a source returned it, before dedup or scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String, // free-form, e.g. "Remote - Europe"
    pub salary: String,   // free-form, never parsed
    pub description: String,
    pub url: String,
    pub source: String, // adapter tag, e.g. "RemoteOK"
}

/// Internal failure of an adapter. Never escapes `SourceAdapter::fetch`.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("adapter task panicked: {0}")]
    Panicked(String),
}

#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch and normalize; errors stay typed here.
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError>;

    /// Stable tag written into `JobPosting::source`.
    fn name(&self) -> &'static str;

    /// Failure-isolated fetch: any error is logged and becomes an empty list.
    async fn fetch(&self) -> Vec<JobPosting> {
        match self.try_fetch().await {
            Ok(v) => {
                counter!("scout_adapter_postings_total", "adapter" => self.name())
                    .increment(v.len() as u64);
                v
            }
            Err(e) => {
                tracing::warn!(error = %e, adapter = self.name(), "adapter fetch failed");
                counter!("scout_adapter_errors_total", "adapter" => self.name()).increment(1);
                Vec::new()
            }
        }
    }
}
