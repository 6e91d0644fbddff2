// tests/scrape_isolation.rs
//
// scrape_all must survive adapters that fail or panic.

use async_trait::async_trait;
use job_scout::ingest::scrape_all;
use job_scout::ingest::types::{FetchError, JobPosting, SourceAdapter};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Fixed(&'static str, Vec<&'static str>);

#[async_trait]
impl SourceAdapter for Fixed {
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError> {
        Ok(self
            .1
            .iter()
            .map(|t| JobPosting {
                title: t.to_string(),
                company: "Co".into(),
                location: "Remote".into(),
                source: self.0.into(),
                ..JobPosting::default()
            })
            .collect())
    }
    fn name(&self) -> &'static str {
        self.0
    }
}

struct Failing;

#[async_trait]
impl SourceAdapter for Failing {
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError> {
        Err(FetchError::Status {
            status: 503,
            url: "https://jobs.invalid".into(),
        })
    }
    fn name(&self) -> &'static str {
        "Failing"
    }
}

struct Panicking;

#[async_trait]
impl SourceAdapter for Panicking {
    async fn try_fetch(&self) -> Result<Vec<JobPosting>, FetchError> {
        panic!("selector blew up");
    }
    fn name(&self) -> &'static str {
        "Panicking"
    }
}

#[tokio::test]
async fn failing_and_panicking_adapters_do_not_stop_the_rest() {
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(Fixed("First", vec!["Risk Manager", "Ops Lead"])),
        Arc::new(Panicking),
        Arc::new(Failing),
        Arc::new(Fixed("Last", vec!["Compliance Analyst"])),
    ];
    let out = scrape_all(&adapters, Duration::ZERO).await;
    let got: Vec<(&str, &str)> = out
        .iter()
        .map(|p| (p.source.as_str(), p.title.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            ("First", "Risk Manager"),
            ("First", "Ops Lead"),
            ("Last", "Compliance Analyst"),
        ]
    );
}

#[tokio::test]
async fn pacing_applies_between_adapters_only() {
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(Fixed("A", vec![])),
        Arc::new(Fixed("B", vec![])),
        Arc::new(Fixed("C", vec![])),
    ];
    let t0 = Instant::now();
    scrape_all(&adapters, Duration::from_millis(50)).await;
    let elapsed = t0.elapsed();
    assert!(elapsed >= Duration::from_millis(100), "two gaps expected, got {elapsed:?}");
}

#[tokio::test]
async fn no_adapters_no_postings() {
    assert!(scrape_all(&[], Duration::from_secs(5)).await.is_empty());
}
