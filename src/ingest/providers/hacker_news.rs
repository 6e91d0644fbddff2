// src/ingest/providers/hacker_news.rs
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::ingest::normalize_text;
use crate::ingest::providers::http::{contains_any, Feed};
use crate::ingest::types::{FetchError, JobPosting, SourceAdapter};

const URL: &str = "https://news.ycombinator.com/jobs";
const MAX_ROWS: usize = 50;
/// Cheap title pre-filter; the aggregator filters again with the real list.
const TITLE_HINTS: [&str; 4] = ["remote", "operations", "compliance", "fintech"];

/// Hacker News "jobs" page. Listings carry no company/location fields.
pub struct HackerNewsAdapter {
    feed: Feed,
}

impl HackerNewsAdapter {
    pub const NAME: &'static str = "Hacker News";

    pub fn new(client: Client) -> Self {
        Self {
            feed: Feed::http(client, URL),
        }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            feed: Feed::fixture(body),
        }
    }

    pub fn parse_postings(html: &str) -> Vec<JobPosting> {
        let doc = Html::parse_document(html);
        let row_sel = Selector::parse("tr.athing").expect("row selector");
        let title_sel = Selector::parse("span.titleline").expect("title selector");
        let link_sel = Selector::parse("a").expect("link selector");

        let mut out = Vec::new();
        for row in doc.select(&row_sel).take(MAX_ROWS) {
            let Some(title_el) = row.select(&title_sel).next() else {
                tracing::debug!(adapter = Self::NAME, "row without titleline");
                continue;
            };
            let title = element_text(title_el);
            if title.is_empty() || !contains_any(&title, &TITLE_HINTS) {
                continue;
            }
            let url = title_el
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .unwrap_or_default()
                .to_string();
            out.push(JobPosting {
                title,
                company: "HN Job".to_string(),
                location: "Remote".to_string(),
                salary: String::new(),
                description: String::new(),
                url,
                source: Self::NAME.to_string(),
            });
        }
        out
    }
}

pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    normalize_text(&el.text().collect::<Vec<_>>().join(" "))
}

#[async_trait]
impl SourceAdapter for HackerNewsAdapter {
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError> {
        let body = self.feed.body().await?;
        Ok(Self::parse_postings(&body))
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_hinted_titles() {
        let html = r#"<table>
          <tr class="athing"><td><span class="titleline"><a href="https://a.test/ops">Acme is hiring a Remote Operations Lead</a></span></td></tr>
          <tr class="athing"><td><span class="titleline"><a href="https://b.test/">Founding Designer</a></span></td></tr>
          <tr class="athing"><td>no title here</td></tr>
        </table>"#;
        let out = HackerNewsAdapter::parse_postings(html);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Acme is hiring a Remote Operations Lead");
        assert_eq!(out[0].url, "https://a.test/ops");
        assert_eq!(out[0].company, "HN Job");
    }
}
