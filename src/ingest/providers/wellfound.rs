// src/ingest/providers/wellfound.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::providers::http::{contains_any, Feed};
use crate::ingest::types::{FetchError, JobPosting, SourceAdapter};
use crate::ingest::{normalize_description, normalize_text};

const URL: &str = "https://api.wellfound.com/jobs";
const MAX_ITEMS: usize = 20;

#[derive(Debug, Deserialize)]
struct Startup {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    startup: Option<Startup>,
    description: Option<String>,
    url: Option<String>,
}

/// Wellfound (formerly AngelList) jobs API: `{"jobs": [...]}`.
pub struct WellfoundAdapter {
    feed: Feed,
    keywords: Vec<String>,
}

impl WellfoundAdapter {
    pub const NAME: &'static str = "Wellfound";

    pub fn new(client: Client, keywords: Vec<String>) -> Self {
        Self {
            feed: Feed::http(client, URL)
                .with_query("tags", "fintech,saas")
                .with_query("remote", "true")
                .with_query("limit", "50"),
            keywords,
        }
    }

    pub fn from_fixture(body: &str, keywords: Vec<String>) -> Self {
        Self {
            feed: Feed::fixture(body),
            keywords,
        }
    }

    pub fn parse_postings(body: &str, keywords: &[String]) -> Result<Vec<JobPosting>, FetchError> {
        let root: Value = serde_json::from_str(body)?;
        let items = match root.get("jobs") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };

        let mut out = Vec::new();
        for raw in items.into_iter().take(MAX_ITEMS) {
            let it: Item = match serde_json::from_value(raw) {
                Ok(it) => it,
                Err(e) => {
                    tracing::debug!(error = %e, adapter = Self::NAME, "skipping malformed item");
                    continue;
                }
            };
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if !contains_any(&title, keywords) {
                continue;
            }
            let company = it.startup.and_then(|s| s.name).unwrap_or_default();
            out.push(JobPosting {
                title,
                company: normalize_text(&company),
                location: "Remote".to_string(),
                salary: String::new(),
                description: normalize_description(it.description.as_deref().unwrap_or_default()),
                url: it.url.unwrap_or_default(),
                source: Self::NAME.to_string(),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for WellfoundAdapter {
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError> {
        let body = self.feed.body().await?;
        Self::parse_postings(&body, &self.keywords)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
