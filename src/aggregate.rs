// src/aggregate.rs
//! Filter → deduplicate → rank over the concatenated adapter output.
//!
//! All three stages are pure functions of their input plus the passed-in
//! config. Matching is plain case-insensitive substring search, so a title
//! containing "riskless" matches the keyword "risk".

use metrics::counter;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::config::{RankingConfig, SearchConfig};
use crate::ingest::types::JobPosting;

/// Highest score a posting can get, whatever the config says.
pub const MAX_SCORE: u32 = 100;

/// A deduplicated posting with its identity and score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedPosting {
    pub id: String,
    pub match_score: u8,
    pub posting: JobPosting,
}

/// Content identity: depends on title and company only.
pub fn job_id(title: &str, company: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update([0x1f]); // unit separator, so ("ab","c") != ("a","bc")
    hasher.update(company.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(32);
    for b in digest.iter().take(16) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

pub fn posting_id(p: &JobPosting) -> String {
    job_id(&p.title, &p.company)
}

/// Title hits a keyword AND location hits the allowlist.
pub fn matches_search(p: &JobPosting, search: &SearchConfig) -> bool {
    let title = p.title.to_lowercase();
    let location = p.location.to_lowercase();
    let title_match = search
        .keywords
        .iter()
        .any(|kw| title.contains(kw.to_lowercase().as_str()));
    let location_match = search
        .locations
        .iter()
        .any(|loc| location.contains(loc.to_lowercase().as_str()));
    title_match && location_match
}

pub fn filter_postings(postings: Vec<JobPosting>, search: &SearchConfig) -> Vec<JobPosting> {
    postings
        .into_iter()
        .filter(|p| matches_search(p, search))
        .collect()
}

/// Keep the first posting for each id, in arrival order.
pub fn deduplicate(postings: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen: HashSet<String> = HashSet::with_capacity(postings.len());
    postings
        .into_iter()
        .filter(|p| seen.insert(posting_id(p)))
        .collect()
}

pub fn match_score(p: &JobPosting, ranking: &RankingConfig) -> u8 {
    let title = p.title.to_lowercase();
    let location = p.location.to_lowercase();

    let mut score = ranking.base;
    for rule in &ranking.title_bonus {
        if rule.matches(&title) {
            score = score.saturating_add(rule.points);
        }
    }
    if let Some(rule) = ranking.location_bonus.iter().find(|r| r.matches(&location)) {
        score = score.saturating_add(rule.points);
    }

    // bounded by MAX_SCORE, so the cast cannot truncate
    score.min(ranking.cap).min(MAX_SCORE) as u8
}

/// Score every posting and sort by score, highest first. Ties keep input order.
pub fn rank(postings: Vec<JobPosting>, ranking: &RankingConfig) -> Vec<RankedPosting> {
    let mut ranked: Vec<RankedPosting> = postings
        .into_iter()
        .map(|posting| RankedPosting {
            id: posting_id(&posting),
            match_score: match_score(&posting, ranking),
            posting,
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    ranked
}

/// The three stages in their fixed order, with counts logged and recorded.
pub fn aggregate(
    raw: Vec<JobPosting>,
    search: &SearchConfig,
    ranking: &RankingConfig,
) -> Vec<RankedPosting> {
    let total = raw.len();
    let filtered = filter_postings(raw, search);
    let kept = filtered.len();
    tracing::info!(total, kept, "filtered postings");

    let unique = deduplicate(filtered);
    tracing::info!(unique = unique.len(), "deduplicated postings");

    counter!("scout_filtered_out_total").increment((total - kept) as u64);
    counter!("scout_dedup_total").increment((kept - unique.len()) as u64);

    rank(unique, ranking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BonusRule;

    fn p(title: &str, company: &str, location: &str) -> JobPosting {
        JobPosting {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            source: "Test".into(),
            ..JobPosting::default()
        }
    }

    #[test]
    fn id_is_stable_hex_and_field_separated() {
        let a = job_id("Risk Manager", "Acme");
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, job_id("Risk Manager", "Acme"));
        assert_ne!(job_id("ab", "c"), job_id("a", "bc"));
    }

    #[test]
    fn huge_configured_points_saturate_at_the_cap() {
        let ranking = RankingConfig {
            base: u32::MAX,
            title_bonus: vec![BonusRule::new(&["risk"], 10)],
            location_bonus: vec![BonusRule::new(&["remote"], u32::MAX)],
            ..RankingConfig::default()
        };
        assert_eq!(match_score(&p("Risk Manager", "Acme", "Remote"), &ranking), 100);
    }

    #[test]
    fn id_ignores_source_and_location() {
        let mut x = p("Ops Lead", "Acme", "Remote");
        let mut y = p("Ops Lead", "Acme", "Helsinki, Finland");
        x.source = "RemoteOK".into();
        y.source = "Indeed".into();
        assert_eq!(posting_id(&x), posting_id(&y));
    }

    #[test]
    fn substring_match_is_not_word_bounded() {
        let search = SearchConfig::default();
        assert!(matches_search(&p("Riskless Arbitrage Desk", "X", "Remote"), &search));
    }

    #[test]
    fn empty_keywords_keep_nothing() {
        let search = SearchConfig {
            keywords: vec![],
            ..SearchConfig::default()
        };
        assert!(filter_postings(vec![p("Risk Manager", "A", "Remote")], &search).is_empty());
    }

    #[test]
    fn title_bonuses_stack_but_each_rule_counts_once() {
        let r = RankingConfig::default();
        // revenue + operations are one rule: +20, not +40
        assert_eq!(match_score(&p("Revenue Operations", "A", "Mars"), &r), 70);
        assert_eq!(match_score(&p("Risk Operations Manager", "A", "Mars"), &r), 95);
    }

    #[test]
    fn location_bonus_is_first_match_only() {
        let r = RankingConfig::default();
        assert_eq!(match_score(&p("Barista", "A", "Remote, Finland"), &r), 65);
        assert_eq!(match_score(&p("Barista", "A", "Anywhere"), &r), 60);
    }

    #[test]
    fn score_is_clamped_to_cap() {
        let r = RankingConfig::default();
        let s = match_score(&p("Revenue Compliance Manager", "A", "Finland"), &r);
        assert_eq!(s, 100); // 50+20+15+10+15 = 110
        let low_cap = RankingConfig {
            cap: 60,
            ..RankingConfig::default()
        };
        assert_eq!(match_score(&p("Risk Manager", "A", "Remote"), &low_cap), 60);
    }

    #[test]
    fn aggregate_runs_stages_in_order() {
        let raw = vec![
            p("Barista", "Cafe", "Remote"),
            p("Compliance Analyst", "Bank", "Remote"),
            p("Revenue Operations Manager", "Acme", "Finland"),
            p("Compliance Analyst", "Bank", "Dubai, UAE"),
        ];
        let out = aggregate(raw, &SearchConfig::default(), &RankingConfig::default());
        let titles: Vec<&str> = out.iter().map(|r| r.posting.title.as_str()).collect();
        assert_eq!(titles, vec!["Revenue Operations Manager", "Compliance Analyst"]);
        assert_eq!(out[1].posting.location, "Remote");
    }
}
