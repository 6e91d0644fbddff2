// src/ingest/providers/gitlab.rs
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::ingest::providers::hacker_news::element_text;
use crate::ingest::providers::http::{contains_any, Feed};
use crate::ingest::types::{FetchError, JobPosting, SourceAdapter};

const URL: &str = "https://about.gitlab.com/jobs/";
const MAX_LINKS: usize = 10;

/// GitLab careers page (Lever-style `a.posting-title` links). All-remote
/// company, so location is fixed.
pub struct GitLabAdapter {
    feed: Feed,
    keywords: Vec<String>,
}

impl GitLabAdapter {
    pub const NAME: &'static str = "GitLab";

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

    pub fn parse_postings(html: &str, keywords: &[String]) -> Vec<JobPosting> {
        let doc = Html::parse_document(html);
        let link_sel = Selector::parse("a.posting-title").expect("posting selector");

        doc.select(&link_sel)
            .take(MAX_LINKS)
            .filter_map(|a| {
                let title = element_text(a);
                if !contains_any(&title, keywords) {
                    return None;
                }
                Some(JobPosting {
                    title,
                    company: "GitLab".to_string(),
                    location: "Remote".to_string(),
                    salary: String::new(),
                    description: String::new(),
                    url: a.value().attr("href").unwrap_or_default().to_string(),
                    source: Self::NAME.to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for GitLabAdapter {
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError> {
        let body = self.feed.body().await?;
        Ok(Self::parse_postings(&body, &self.keywords))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}
