// src/ingest/providers/remote100.rs
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::ingest::providers::http::{contains_any, json_array, value_text, Feed};
use crate::ingest::types::{FetchError, JobPosting, SourceAdapter};
use crate::ingest::{normalize_description, normalize_text};

const URL: &str = "https://remote100.co/api/jobs";
const MAX_ITEMS: usize = 100;

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    company_name: Option<String>,
    #[serde(default)]
    salary: Value,
    description: Option<String>,
    url: Option<String>,
}

/// Remote100 JSON feed. Every listing is remote, so location is fixed.
pub struct Remote100Adapter {
    feed: Feed,
    keywords: Vec<String>,
}

impl Remote100Adapter {
    pub const NAME: &'static str = "Remote100";

    pub fn new(client: Client, keywords: Vec<String>) -> Self {
        Self {
            feed: Feed::http(client, URL),
            keywords,
        }
    }

    pub fn from_fixture(body: &str, keywords: Vec<String>) -> Self {
        Self {
            feed: Feed::fixture(body),
            keywords,
        }
    }

    /// Titles matching none of `keywords` are dropped here.
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
                continue;
            }
            out.push(JobPosting {
                title,
                company: it
                    .company_name
                    .map(|c| normalize_text(&c))
                    .unwrap_or_else(|| "Unknown".to_string()),
                location: "Remote".to_string(),
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
impl SourceAdapter for Remote100Adapter {
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError> {
        let body = self.feed.body().await?;
        Self::parse_postings(&body, &self.keywords)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_defaults_to_unknown() {
        let body = r#"[{"title": "SaaS Ops Lead"}, {"no_title": true}]"#;
        let out = Remote100Adapter::parse_postings(body, &["saas".to_string()]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].company, "Unknown");
        assert_eq!(out[0].location, "Remote");
    }

    #[test]
    fn titles_without_a_keyword_are_dropped() {
        let body = r#"[{"title": "Barista"}, {"title": "Risk Analyst"}]"#;
        let out = Remote100Adapter::parse_postings(body, &["risk".to_string()]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Risk Analyst");
    }
}
