// src/config/mod.rs
//! Typed application configuration loaded from TOML.
//!
//! Every section falls back to built-in defaults, so a missing file or a
//! partial one still yields a runnable configuration. The keyword lists and
//! bonus weights are plain data here; nothing downstream reads globals.

pub mod ai;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use ai::AiConfig;

pub const ENV_CONFIG_PATH: &str = "JOB_SCOUT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/job_scout.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub ranking: RankingConfig,
    pub pipeline: PipelineConfig,
    pub http: HttpConfig,
    pub sources: SourcesConfig,
    pub profile: CandidateProfile,
    pub ai: AiConfig,
    pub scheduler: SchedulerConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load config from an explicit TOML path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load config using env var + fallbacks:
    /// 1) $JOB_SCOUT_CONFIG
    /// 2) config/job_scout.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default())
    }

    pub fn parse(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s)?;
        cfg.search.keywords = clean_list(cfg.search.keywords);
        cfg.search.locations = clean_list(cfg.search.locations);
        cfg.sources.enabled = clean_list(cfg.sources.enabled);
        cfg.sources.indeed_roles = clean_list(cfg.sources.indeed_roles);
        Ok(cfg)
    }
}

/// Title keywords and location allowlist for the filter stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub keywords: Vec<String>,
    pub locations: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: strings(&[
                "operations",
                "compliance",
                "risk",
                "fintech",
                "saas",
                "manager",
                "revenue",
                "customer success",
            ]),
            locations: strings(&["remote", "finland", "europe", "uae", "anywhere"]),
        }
    }
}

/// A group of terms worth `points` when any of them occurs (substring,
/// case-insensitive). A rule contributes at most once.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BonusRule {
    pub terms: Vec<String>,
    pub points: u32,
}

impl BonusRule {
    pub fn new(terms: &[&str], points: u32) -> Self {
        Self {
            terms: strings(terms),
            points,
        }
    }

    /// `haystack` must already be lowercase.
    pub fn matches(&self, haystack: &str) -> bool {
        self.terms
            .iter()
            .any(|t| haystack.contains(t.to_lowercase().as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub base: u32,
    pub cap: u32,
    /// Independent rules; several can stack.
    pub title_bonus: Vec<BonusRule>,
    /// Ordered rules; only the first match counts.
    pub location_bonus: Vec<BonusRule>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            base: 50,
            cap: 100,
            title_bonus: vec![
                BonusRule::new(&["revenue", "operations"], 20),
                BonusRule::new(&["compliance", "risk"], 15),
                BonusRule::new(&["manager"], 10),
            ],
            location_bonus: vec![
                BonusRule::new(&["finland"], 15),
                BonusRule::new(&["remote", "anywhere"], 10),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Politeness delay between adapters.
    pub pacing_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { pacing_ms: 2000 }
    }
}

impl PipelineConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Adapter names in registration order.
    pub enabled: Vec<String>,
    /// Role queries for the Indeed adapter (only the first three are sent).
    pub indeed_roles: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: strings(&["remoteok", "remote100", "hacker_news", "github_jobs"]),
            indeed_roles: strings(&[
                "Customer Success Manager",
                "Sales Operations",
                "Revenue Operations",
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience_years: u32,
}

impl Default for CandidateProfile {
    fn default() -> Self {
        Self {
            name: "The candidate".to_string(),
            summary: "Operations professional with a background in FinTech and SaaS.".to_string(),
            skills: strings(&[
                "Salesforce",
                "HubSpot",
                "SQL",
                "Power BI",
                "GDPR",
                "Compliance",
                "Revenue Operations",
                "Customer Success",
                "Risk Management",
            ]),
            experience_years: 9,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 24 * 3600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/jobs.db"),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Trim, drop empties and duplicates; keep first-seen order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
