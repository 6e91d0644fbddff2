// tests/config_load.rs
use job_scout::config::{AppConfig, BonusRule};
use job_scout::ingest::providers::build_adapters;
use std::fs;
use std::path::Path;

#[test]
fn shipped_config_matches_builtin_defaults() {
    let shipped = AppConfig::load_from(Path::new("config/job_scout.toml"))
        .expect("config/job_scout.toml parses");
    let builtin = AppConfig::default();

    assert_eq!(shipped.search.keywords, builtin.search.keywords);
    assert_eq!(shipped.search.locations, builtin.search.locations);
    assert_eq!(shipped.ranking.title_bonus, builtin.ranking.title_bonus);
    assert_eq!(shipped.ranking.location_bonus, builtin.ranking.location_bonus);
    assert_eq!(shipped.sources.enabled, builtin.sources.enabled);
    assert_eq!(shipped.sources.indeed_roles, builtin.sources.indeed_roles);
    assert_eq!(shipped.profile.name, builtin.profile.name);
    assert_eq!(shipped.profile.summary, builtin.profile.summary);
    assert_eq!(shipped.profile.skills, builtin.profile.skills);
    assert_eq!(shipped.profile.experience_years, builtin.profile.experience_years);
    assert_eq!(shipped.http.timeout_secs, builtin.http.timeout_secs);
    assert_eq!(shipped.scheduler.interval_secs, 86_400);
    assert!(!shipped.ai.enabled);
}

#[test]
fn file_overrides_build_the_named_adapters() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("scout.toml");
    fs::write(
        &p,
        r#"
[sources]
enabled = ["indeed", "wellfound", "gitlab"]

[[ranking.title_bonus]]
terms = ["audit"]
points = 30
"#,
    )
    .unwrap();

    let cfg = AppConfig::load_from(&p).expect("load");
    assert_eq!(cfg.ranking.title_bonus, vec![BonusRule::new(&["audit"], 30)]);

    let names: Vec<&str> = build_adapters(&cfg)
        .expect("adapters")
        .iter()
        .map(|a| a.name())
        .collect();
    assert_eq!(names, vec!["Indeed", "Wellfound", "GitLab"]);
}

#[test]
fn invalid_toml_is_an_error_with_path_context() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("broken.toml");
    fs::write(&p, "[search\nkeywords = 3").unwrap();
    let err = AppConfig::load_from(&p).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}
