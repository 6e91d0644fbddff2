// src/ingest/providers/http.rs
//! Transport shared by all job-source adapters.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::ingest::normalize_text;
use crate::ingest::types::FetchError;

/// One client for every adapter: fixed User-Agent, bounded per-request wait.
pub fn build_client(cfg: &HttpConfig) -> Result<Client> {
    let (connect, total) = timeouts(cfg.timeout_secs);
    Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .connect_timeout(connect)
        .timeout(total)
        .build()
        .context("building HTTP client")
}

/// (connect, total). A zero from config would fail every request, so both are at least 1s.
fn timeouts(timeout_secs: u64) -> (Duration, Duration) {
    let secs = timeout_secs.max(1);
    (Duration::from_secs(secs.min(5)), Duration::from_secs(secs))
}

/// Where an adapter reads its body from.
pub enum Feed {
    /// Canned body, used by tests and local runs.
    Fixture(String),
    Http {
        client: Client,
        url: String,
        query: Vec<(String, String)>,
    },
}

impl Feed {
    pub fn fixture(body: &str) -> Self {
        Feed::Fixture(body.to_string())
    }

    pub fn http(client: Client, url: impl Into<String>) -> Self {
        Feed::Http {
            client,
            url: url.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        if let Feed::Http { query, .. } = &mut self {
            query.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub async fn body(&self) -> Result<String, FetchError> {
        match self {
            Feed::Fixture(s) => Ok(s.clone()),
            Feed::Http { client, url, query } => get_text(client, url, query).await,
        }
    }
}

/// GET with query params; anything but 2xx is a failure.
pub async fn get_text(
    client: &Client,
    url: &str,
    query: &[(String, String)],
) -> Result<String, FetchError> {
    let resp = client.get(url).query(query).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp.text().await?)
}

/// Parse a top-level JSON array. Items stay untyped so one bad item cannot
/// sink the whole response.
pub fn json_array(body: &str) -> Result<Vec<Value>, FetchError> {
    let v: Value = serde_json::from_str(body)?;
    match v {
        Value::Array(items) => Ok(items),
        other => Err(FetchError::Json(serde::de::Error::custom(format!(
            "expected a JSON array, got {}",
            kind_of(&other)
        )))),
    }
}

/// Render a loosely-typed JSON field (strings, numbers) as normalized text.
pub fn value_text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => normalize_text(s),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Case-insensitive substring test against any of `terms`.
pub fn contains_any<S: AsRef<str>>(text: &str, terms: &[S]) -> bool {
    let lower = text.to_lowercase();
    terms
        .iter()
        .any(|t| lower.contains(t.as_ref().to_lowercase().as_str()))
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_timeout_is_clamped() {
        assert_eq!(timeouts(0), (Duration::from_secs(1), Duration::from_secs(1)));
        assert_eq!(timeouts(30), (Duration::from_secs(5), Duration::from_secs(30)));
        let cfg = HttpConfig {
            timeout_secs: 0,
            ..HttpConfig::default()
        };
        assert!(build_client(&cfg).is_ok());
    }

    #[test]
    fn json_array_rejects_objects() {
        assert!(json_array(r#"[{"a":1}]"#).is_ok());
        assert!(matches!(json_array(r#"{"a":1}"#), Err(FetchError::Json(_))));
        assert!(json_array("not json").is_err());
    }

    #[test]
    fn value_text_handles_numbers_and_nulls() {
        assert_eq!(value_text(Some(&json!("  €4k&nbsp;/mo "))), "€4k /mo");
        assert_eq!(value_text(Some(&json!(120000))), "120000");
        assert_eq!(value_text(Some(&Value::Null)), "");
        assert_eq!(value_text(None), "");
    }

    #[test]
    fn contains_any_is_case_insensitive() {
        assert!(contains_any("Senior FinTech Analyst", &["fintech"]));
        assert!(!contains_any("Barista", &["fintech", "risk"]));
    }

    #[tokio::test]
    async fn fixture_feed_returns_body_verbatim() {
        let f = Feed::fixture("[]").with_query("ignored", "yes");
        assert_eq!(f.body().await.unwrap(), "[]");
    }
}
