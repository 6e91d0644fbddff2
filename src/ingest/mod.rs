// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::ingest::types::{FetchError, JobPosting, SourceAdapter};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Descriptions longer than this are cut (chars, not bytes).
pub const MAX_DESCRIPTION_CHARS: usize = 5000;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "scout_adapter_postings_total",
            "Postings returned by each adapter."
        );
        describe_counter!(
            "scout_adapter_errors_total",
            "Adapter fetch failures, counted per failed request or adapter."
        );
        describe_histogram!("scout_fetch_ms", "Adapter wall-clock time in milliseconds.");
        describe_counter!(
            "scout_filtered_out_total",
            "Postings dropped by the keyword/location filter."
        );
        describe_counter!("scout_dedup_total", "Postings dropped as duplicates.");
        describe_counter!("scout_inserted_total", "New job records persisted.");
        describe_counter!(
            "scout_generation_failures_total",
            "Material generation calls that fell back to empty text."
        );
        describe_counter!("scout_runs_total", "Completed pipeline runs.");
        describe_counter!(
            "scout_runs_rejected_total",
            "Pipeline triggers rejected because a run was in progress."
        );
        describe_gauge!(
            "scout_pipeline_last_run_ts",
            "Unix ts when the pipeline last completed."
        );
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// `normalize_text` plus the description length cap.
pub fn normalize_description(s: &str) -> String {
    truncate_chars(&normalize_text(s), MAX_DESCRIPTION_CHARS)
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        s.chars().take(max).collect()
    } else {
        s.to_string()
    }
}

/// Run every adapter once, in registration order, with a pacing delay
/// between them. Each adapter runs in its own task so a panic inside one
/// cannot take the others down.
pub async fn scrape_all(adapters: &[Arc<dyn SourceAdapter>], pacing: Duration) -> Vec<JobPosting> {
    ensure_metrics_described();

    let mut all = Vec::new();
    for (i, adapter) in adapters.iter().enumerate() {
        if i > 0 && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }

        let name = adapter.name();
        let t0 = Instant::now();
        let task = Arc::clone(adapter);
        match tokio::spawn(async move { task.fetch().await }).await {
            Ok(mut v) => {
                tracing::info!(adapter = name, found = v.len(), "adapter finished");
                all.append(&mut v);
            }
            Err(join_err) => {
                let e = FetchError::Panicked(join_err.to_string());
                tracing::error!(error = %e, adapter = name, "adapter aborted");
                counter!("scout_adapter_errors_total", "adapter" => name).increment(1);
            }
        }
        histogram!("scout_fetch_ms", "adapter" => name).record(t0.elapsed().as_secs_f64() * 1_000.0);
    }

    tracing::info!(total = all.len(), adapters = adapters.len(), "scrape finished");
    all
}
