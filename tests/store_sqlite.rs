// tests/store_sqlite.rs
//
// On-disk SQLite store: idempotent insert, status lifecycle, stats.

use chrono::Utc;
use job_scout::aggregate::{job_id, RankedPosting};
use job_scout::generate::Materials;
use job_scout::ingest::types::JobPosting;
use job_scout::store::{status, JobRecord, JobStore, SqliteStore};

fn record(title: &str, company: &str, score: u8) -> JobRecord {
    JobRecord::new(
        RankedPosting {
            id: job_id(title, company),
            match_score: score,
            posting: JobPosting {
                title: title.into(),
                company: company.into(),
                location: "Remote".into(),
                source: "Test".into(),
                ..JobPosting::default()
            },
        },
        Utc::now(),
    )
}

#[test]
fn open_creates_parent_dirs_and_persists_across_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested/dir/jobs.db");
    let r = record("Risk Manager", "Acme", 85);
    {
        let s = SqliteStore::open(&path).expect("open new db");
        assert!(s.insert(&r).unwrap());
    }
    let s = SqliteStore::open(&path).expect("reopen db");
    assert!(s.exists(&r.id).unwrap());
    assert_eq!(s.get(&r.id).unwrap().unwrap().match_score, 85);
}

#[test]
fn second_insert_of_same_id_changes_nothing() {
    let s = SqliteStore::open_in_memory().unwrap();
    let first = record("Risk Manager", "Acme", 85).with_materials(Materials {
        customized_cv: "original cv".into(),
        cover_letter: "original letter".into(),
    });
    assert!(s.insert(&first).unwrap());
    assert!(s.update_status(&first.id, status::INTERVIEW_SCHEDULED).unwrap());
    let before = s.get(&first.id).unwrap().unwrap();

    // a later scrape of the same title+company with different content
    let mut again = record("Risk Manager", "Acme", 40);
    again.posting.location = "Finland".into();
    again.customized_cv = "new cv".into();
    assert!(!s.insert(&again).unwrap(), "duplicate id must be skipped");

    let after = s.get(&first.id).unwrap().unwrap();
    assert_eq!(after, before);
    assert_eq!(after.status, status::INTERVIEW_SCHEDULED);
    assert_eq!(after.customized_cv, "original cv");
    assert_eq!(after.match_score, 85);
}

#[test]
fn update_status_sets_applied_date() {
    let s = SqliteStore::open_in_memory().unwrap();
    let r = record("Ops Lead", "Acme", 70);
    s.insert(&r).unwrap();
    let before = Utc::now();
    assert!(s.update_status(&r.id, status::APPLIED).unwrap());
    let got = s.get(&r.id).unwrap().unwrap();
    assert_eq!(got.status, status::APPLIED);
    assert!(got.applied_date.expect("applied_date set") >= before - chrono::Duration::seconds(1));
    // custom statuses are accepted as-is
    assert!(s.update_status(&r.id, "Ghosted").unwrap());
    assert_eq!(s.get(&r.id).unwrap().unwrap().status, "Ghosted");
}

#[test]
fn stats_count_statuses_and_round() {
    let s = SqliteStore::open_in_memory().unwrap();
    let mut ids = Vec::new();
    for i in 0..10u8 {
        let r = record(&format!("Risk Manager {i}"), "Acme", 60 + i);
        s.insert(&r).unwrap();
        ids.push(r.id);
    }
    for id in &ids[..4] {
        s.update_status(id, status::APPLIED).unwrap();
    }
    s.update_status(&ids[4], status::INTERVIEW_SCHEDULED).unwrap();

    let st = s.stats().unwrap();
    assert_eq!(st.total_jobs, 10);
    assert_eq!(st.applied, 4);
    assert_eq!(st.interviews, 1);
    assert_eq!(st.conversion_rate, 25.0);
    assert_eq!(st.avg_match_score, 64.5); // 60..=69
}

#[test]
fn stats_without_applications_have_zero_conversion() {
    let s = SqliteStore::open_in_memory().unwrap();
    s.insert(&record("Risk Manager", "Acme", 85)).unwrap();
    s.insert(&record("Ops Lead", "Acme", 70)).unwrap();
    let st = s.stats().unwrap();
    assert_eq!(st.applied, 0);
    assert_eq!(st.conversion_rate, 0.0);
    assert_eq!(st.avg_match_score, 77.5);
}
