// src/store.rs
//! Job record persistence.
//!
//! Records are keyed by the content hash of title+company. Inserting an id
//! that already exists is a no-op, so rescraping never clobbers a user's
//! status, dates or generated materials. Every write is one SQL statement.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::aggregate::RankedPosting;
use crate::generate::Materials;
use crate::ingest::types::JobPosting;

/// Known status values. The column is free text; the dashboard may add more.
pub mod status {
    pub const NOT_APPLIED: &str = "Not Applied";
    pub const APPLIED: &str = "Applied";
    pub const INTERVIEW_SCHEDULED: &str = "Interview Scheduled";
    pub const REJECTED: &str = "Rejected";
    pub const OFFER: &str = "Offer";
}

pub const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    #[serde(flatten)]
    pub posting: JobPosting,
    pub match_score: u8,
    pub customized_cv: String,
    pub cover_letter: String,
    pub status: String,
    pub applied_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(ranked: RankedPosting, created_date: DateTime<Utc>) -> Self {
        Self {
            id: ranked.id,
            posting: ranked.posting,
            match_score: ranked.match_score,
            customized_cv: String::new(),
            cover_letter: String::new(),
            status: status::NOT_APPLIED.to_string(),
            applied_date: None,
            created_date,
        }
    }

    pub fn with_materials(mut self, m: Materials) -> Self {
        self.customized_cv = m.customized_cv;
        self.cover_letter = m.cover_letter;
        self
    }
}

/// Aggregate numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStats {
    pub total_jobs: u64,
    pub applied: u64,
    pub interviews: u64,
    pub avg_match_score: f64,
    pub conversion_rate: f64,
}

impl JobStats {
    pub fn new(total_jobs: u64, applied: u64, interviews: u64, avg_match_score: f64) -> Self {
        Self {
            total_jobs,
            applied,
            interviews,
            avg_match_score: round1(avg_match_score),
            conversion_rate: conversion_rate(applied, interviews),
        }
    }
}

/// interviews / applied * 100, one decimal; 0 when nothing was applied to.
pub fn conversion_rate(applied: u64, interviews: u64) -> f64 {
    if applied == 0 {
        return 0.0;
    }
    round1(interviews as f64 / applied as f64 * 100.0)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub trait JobStore: Send + Sync {
    fn exists(&self, id: &str) -> Result<bool>;
    /// Returns false (and writes nothing) when the id is already stored.
    fn insert(&self, record: &JobRecord) -> Result<bool>;
    /// Returns false when the id is unknown.
    fn update_status(&self, id: &str, status: &str) -> Result<bool>;
    /// Highest match_score first.
    fn list(&self, limit: usize) -> Result<Vec<JobRecord>>;
    fn get(&self, id: &str) -> Result<Option<JobRecord>>;
    fn stats(&self) -> Result<JobStats>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

const COLUMNS: &str = "id, title, company, location, salary, description, url, source, \
                       match_score, customized_cv, cover_letter, status, applied_date, created_date";

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening job store at {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                company TEXT NOT NULL,
                location TEXT NOT NULL DEFAULT '',
                salary TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL DEFAULT '',
                match_score INTEGER NOT NULL CHECK (match_score BETWEEN 0 AND 100),
                customized_cv TEXT NOT NULL DEFAULT '',
                cover_letter TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'Not Applied',
                applied_date TEXT,
                created_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_score ON jobs(match_score DESC);
            CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
            "#,
        )
        .context("creating job store schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("job store mutex poisoned"))
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<JobRecord> {
        Ok(JobRecord {
            id: row.get(0)?,
            posting: JobPosting {
                title: row.get(1)?,
                company: row.get(2)?,
                location: row.get(3)?,
                salary: row.get(4)?,
                description: row.get(5)?,
                url: row.get(6)?,
                source: row.get(7)?,
            },
            match_score: row.get(8)?,
            customized_cv: row.get(9)?,
            cover_letter: row.get(10)?,
            status: row.get(11)?,
            applied_date: row.get(12)?,
            created_date: row.get(13)?,
        })
    }
}

impl JobStore for SqliteStore {
    fn exists(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM jobs WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&self, r: &JobRecord) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO jobs ({COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
                ),
                params![
                    r.id,
                    r.posting.title,
                    r.posting.company,
                    r.posting.location,
                    r.posting.salary,
                    r.posting.description,
                    r.posting.url,
                    r.posting.source,
                    r.match_score,
                    r.customized_cv,
                    r.cover_letter,
                    r.status,
                    r.applied_date,
                    r.created_date,
                ],
            )
            .with_context(|| format!("inserting job {}", r.id))?;
        Ok(changed > 0)
    }

    fn update_status(&self, id: &str, new_status: &str) -> Result<bool> {
        // Resetting to the initial state clears the date.
        let applied_date = if new_status == status::NOT_APPLIED {
            None
        } else {
            Some(Utc::now())
        };
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE jobs SET status = ?1, applied_date = ?2 WHERE id = ?3",
                params![new_status, applied_date, id],
            )
            .with_context(|| format!("updating status of job {id}"))?;
        Ok(changed > 0)
    }

    fn list(&self, limit: usize) -> Result<Vec<JobRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM jobs
             ORDER BY match_score DESC, created_date ASC, id ASC
             LIMIT ?1"
        ))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map([limit], Self::row_to_record)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list jobs")
    }

    fn get(&self, id: &str) -> Result<Option<JobRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM jobs WHERE id = ?1"),
            [id],
            Self::row_to_record,
        )
        .optional()
        .with_context(|| format!("loading job {id}"))
    }

    fn stats(&self) -> Result<JobStats> {
        let conn = self.conn()?;
        let (total, applied, interviews, avg): (i64, i64, i64, Option<f64>) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN status = ?1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = ?2 THEN 1 ELSE 0 END), 0),
                    AVG(match_score)
             FROM jobs",
            params![status::APPLIED, status::INTERVIEW_SCHEDULED],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;
        Ok(JobStats::new(
            total.max(0) as u64,
            applied.max(0) as u64,
            interviews.max(0) as u64,
            avg.unwrap_or(0.0),
        ))
    }
}
