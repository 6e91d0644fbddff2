// src/ingest/providers/indeed.rs
use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::ingest::providers::hacker_news::element_text;
use crate::ingest::providers::http::Feed;
use crate::ingest::types::{FetchError, JobPosting, SourceAdapter};

const URL: &str = "https://www.indeed.com/jobs";
const BASE: &str = "https://www.indeed.com";
/// Only the first few roles are queried to stay under rate limits.
const MAX_ROLES: usize = 3;
const MAX_CARDS: usize = 5;

/// Indeed search result pages, one request per role query.
pub struct IndeedAdapter {
    /// (role, feed) pairs.
    feeds: Vec<(String, Feed)>,
}

impl IndeedAdapter {
    pub const NAME: &'static str = "Indeed";

    pub fn new(client: Client, roles: &[String]) -> Self {
        let feeds = roles
            .iter()
            .take(MAX_ROLES)
            .map(|role| {
                let feed = Feed::http(client.clone(), URL)
                    .with_query("q", role)
                    .with_query("l", "Remote")
                    .with_query("jt", "fulltime");
                (role.clone(), feed)
            })
            .collect();
        Self { feeds }
    }

    pub fn from_fixture(body: &str) -> Self {
        Self {
            feeds: vec![("fixture".to_string(), Feed::fixture(body))],
        }
    }

    pub fn parse_postings(html: &str) -> Vec<JobPosting> {
        let doc = Html::parse_document(html);
        let card_sel = Selector::parse("div.job_seen_beacon").expect("card selector");
        let title_sel = Selector::parse("h2.jobTitle").expect("title selector");
        let company_sel = Selector::parse("span.companyName").expect("company selector");
        let location_sel = Selector::parse("div.companyLocation").expect("location selector");
        let salary_sel = Selector::parse("span.salary-snippet").expect("salary selector");
        let link_sel = Selector::parse("a.jcs-JobTitle").expect("link selector");

        let first_text = |card: ElementRef<'_>, sel: &Selector| card.select(sel).next().map(element_text);

        let mut out = Vec::new();
        for card in doc.select(&card_sel).take(MAX_CARDS) {
            let (Some(title), Some(company)) =
                (first_text(card, &title_sel), first_text(card, &company_sel))
            else {
                tracing::debug!(adapter = Self::NAME, "card without title/company");
                continue;
            };
            let url = card
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| format!("{BASE}{href}"))
                .unwrap_or_default();
            out.push(JobPosting {
                title,
                company,
                location: first_text(card, &location_sel).unwrap_or_else(|| "Remote".to_string()),
                salary: first_text(card, &salary_sel)
                    .unwrap_or_else(|| "Not specified".to_string()),
                description: String::new(),
                url,
                source: Self::NAME.to_string(),
            });
        }
        out
    }
}

#[async_trait]
impl SourceAdapter for IndeedAdapter {
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError> {
        let mut out = Vec::new();
        let mut last_err = None;
        let mut any_ok = false;
        for (role, feed) in &self.feeds {
            match feed.body().await {
                Ok(body) => {
                    any_ok = true;
                    out.extend(Self::parse_postings(&body));
                }
                Err(e) => {
                    tracing::warn!(
                        adapter = Self::NAME,
                        role = %role,
                        error = %e,
                        "role query failed"
                    );
                    counter!("scout_adapter_errors_total", "adapter" => Self::NAME).increment(1);
                    last_err = Some(e);
                }
            }
        }
        // Only a total outage is an adapter failure.
        match last_err {
            Some(e) if !any_ok => Err(e),
            _ => Ok(out),
        }
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_three_role_queries_are_built() {
        let roles: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let adapter = IndeedAdapter::new(Client::new(), &roles);
        assert_eq!(adapter.feeds.len(), 3);
    }

    const ONE_CARD: &str = r#"<html><body>
<div class="job_seen_beacon">
  <h2 class="jobTitle"><a class="jcs-JobTitle" href="/viewjob?jk=1">Risk Analyst</a></h2>
  <span class="companyName">Nordea</span>
  <div class="companyLocation">Remote</div>
</div>
</body></html>"#;

    #[tokio::test]
    async fn failed_role_query_keeps_earlier_results() {
        let adapter = IndeedAdapter {
            feeds: vec![
                ("risk analyst".to_string(), Feed::fixture(ONE_CARD)),
                (
                    "fintech".to_string(),
                    Feed::http(Client::new(), "http://127.0.0.1:1/jobs"),
                ),
            ],
        };
        let got = adapter.fetch().await;
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].title, "Risk Analyst");
        assert_eq!(got[0].url, "https://www.indeed.com/viewjob?jk=1");
    }

    #[tokio::test]
    async fn every_role_query_failing_is_an_error() {
        let adapter = IndeedAdapter {
            feeds: vec![(
                "fintech".to_string(),
                Feed::http(Client::new(), "http://127.0.0.1:1/jobs"),
            )],
        };
        assert!(adapter.try_fetch().await.is_err());
    }
}
