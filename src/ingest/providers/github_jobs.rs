// src/ingest/providers/github_jobs.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::ingest::providers::http::{contains_any, json_array, Feed};
use crate::ingest::types::{FetchError, JobPosting, SourceAdapter};
use crate::ingest::{normalize_description, normalize_text};

const URL: &str = "https://jobs.github.com/positions.json";
const MAX_ITEMS: usize = 50;

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    description: Option<String>,
    url: Option<String>,
}

/// GitHub Jobs positions API (no salary field).
pub struct GithubJobsAdapter {
    feed: Feed,
    keywords: Vec<String>,
}

impl GithubJobsAdapter {
    pub const NAME: &'static str = "GitHub Jobs";

    pub fn new(client: Client, keywords: Vec<String>) -> Self {
        Self {
            feed: Feed::http(client, URL)
                .with_query("description", "operations")
                .with_query("location", "remote"),
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
        let mut out = Vec::new();
        for raw in json_array(body)?.into_iter().take(MAX_ITEMS) {
            let it: Item = match serde_json::from_value(raw) {
                Ok(it) => it,
                Err(e) => {
                    tracing::debug!(error = %e, adapter = Self::NAME, "skipping malformed item");
                    continue;
                }
            };
            let Some(title) = it.title.map(|t| normalize_text(&t)) else { continue };
            if !contains_any(&title, keywords) {
                tracing::debug!(adapter = Self::NAME, title = %title, "title off-target");
                continue;
            }
            out.push(JobPosting {
                title,
                company: normalize_text(it.company.as_deref().unwrap_or_default()),
                location: it
                    .location
                    .map(|l| normalize_text(&l))
                    .unwrap_or_else(|| "Remote".to_string()),
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
impl SourceAdapter for GithubJobsAdapter {
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError> {
        let body = self.feed.body().await?;
        Self::parse_postings(&body, &self.keywords)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
