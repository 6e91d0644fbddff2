// src/ingest/providers/remoteok.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::providers::http::{json_array, value_text, Feed};
use crate::ingest::types::{FetchError, JobPosting, SourceAdapter};
use crate::ingest::{normalize_description, normalize_text};

const URL: &str = "https://remoteok.com/api/jobs";
const TAGS: &str = "fintech,saas,operations,compliance";
const MAX_ITEMS: usize = 100;

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    #[serde(default)]
    salary: Value,
    description: Option<String>,
    url: Option<String>,
}

/// RemoteOK public JSON API. The first array entry is a legal notice, which
/// has no title/company and is skipped like any other incomplete item.
pub struct RemoteOkAdapter {
    feed: Feed,
}

impl RemoteOkAdapter {
    pub const NAME: &'static str = "RemoteOK";

    pub fn new(client: Client) -> Self {
        Self {
            feed: Feed::http(client, URL).with_query("tag", TAGS),
        }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            feed: Feed::fixture(body),
        }
    }

    pub fn parse_postings(body: &str) -> Result<Vec<JobPosting>, FetchError> {
        let items = json_array(body)?;
        let mut out = Vec::new();
        for raw in items.into_iter().take(MAX_ITEMS) {
            let it: Item = match serde_json::from_value(raw) {
                Ok(it) => it,
                Err(e) => {
                    tracing::debug!(error = %e, adapter = Self::NAME, "skipping malformed item");
                    continue;
                }
            };
            let (Some(title), Some(company)) = (it.title, it.company) else {
                continue;
            };
            out.push(JobPosting {
                title: normalize_text(&title),
                company: normalize_text(&company),
                location: it
                    .location
                    .map(|l| normalize_text(&l))
                    .unwrap_or_else(|| "Remote".to_string()),
                salary: value_text(Some(&it.salary)),
                description: normalize_description(it.description.as_deref().unwrap_or_default()),
                url: it.url.unwrap_or_default(),
                source: Self::NAME.to_string(),
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for RemoteOkAdapter {
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError> {
        let body = self.feed.body().await?;
        Self::parse_postings(&body)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
