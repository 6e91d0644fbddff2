// src/ingest/providers/mod.rs
pub mod github_jobs;
pub mod gitlab;
pub mod hacker_news;
pub mod http;
pub mod indeed;
pub mod remote100;
pub mod remoteok;
pub mod wellfound;

use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::ingest::types::SourceAdapter;

/// Names accepted in `[sources].enabled`.
pub const ADAPTER_NAMES: [&str; 7] = [
    "remoteok",
    "remote100",
    "hacker_news",
    "github_jobs",
    "wellfound",
    "gitlab",
    "indeed",
];

/// Build one adapter by config name. `None` for unknown names.
pub fn adapter_for(name: &str, client: &Client, cfg: &AppConfig) -> Option<Arc<dyn SourceAdapter>> {
    let c = client.clone();
    let kws = cfg.search.keywords.clone();
    let adapter: Arc<dyn SourceAdapter> = match name.to_ascii_lowercase().as_str() {
        "remoteok" => Arc::new(remoteok::RemoteOkAdapter::new(c)),
        "remote100" => Arc::new(remote100::Remote100Adapter::new(c, kws)),
        "hacker_news" | "hackernews" => Arc::new(hacker_news::HackerNewsAdapter::new(c)),
        "github_jobs" => Arc::new(github_jobs::GithubJobsAdapter::new(c, kws)),
        "wellfound" => Arc::new(wellfound::WellfoundAdapter::new(c, kws)),
        "gitlab" => Arc::new(gitlab::GitLabAdapter::new(c, kws)),
        "indeed" => Arc::new(indeed::IndeedAdapter::new(c, &cfg.sources.indeed_roles)),
        _ => return None,
    };
    Some(adapter)
}

/// Build the enabled adapters in registration order, sharing one client.
pub fn build_adapters(cfg: &AppConfig) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let client = http::build_client(&cfg.http)?;
    let mut out = Vec::with_capacity(cfg.sources.enabled.len());
    for name in &cfg.sources.enabled {
        match adapter_for(name, &client, cfg) {
            Some(a) => out.push(a),
            None => tracing::warn!(
                adapter = %name,
                known = ?ADAPTER_NAMES,
                "unknown adapter name in config, skipping"
            ),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_follows_config_and_unknowns_are_skipped() {
        let mut cfg = AppConfig::default();
        cfg.sources.enabled = vec!["gitlab".into(), "nope".into(), "RemoteOK".into()];
        let adapters = build_adapters(&cfg).unwrap();
        let names: Vec<&str> = adapters.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["GitLab", "RemoteOK"]);
    }

    #[test]
    fn every_advertised_name_builds() {
        let cfg = AppConfig::default();
        let client = Client::new();
        for n in ADAPTER_NAMES {
            assert!(adapter_for(n, &client, &cfg).is_some(), "{n}");
        }
    }
}
