//! SQLite-backed job store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{Job, JobError, JobFilter, JobResult, JobStatus, JobStore};
use crate::submission::Submission;

const JOB_COLUMNS: &str =
    "id, status, submission, created_at, started_at, completed_at, error";

/// SQLite-backed job store.
///
/// The store owns its connection; each operation holds the lock for the
/// duration of its own statement or transaction only.
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Create a new SQLite job store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, JobError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite job store (useful for testing).
    pub fn in_memory() -> Result<Self, JobError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), JobError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                submission TEXT NOT NULL,
                created_at TEXT NOT NULL,
                started_at TEXT,
                completed_at TEXT,
                error TEXT
            );

            CREATE TABLE IF NOT EXISTS results (
                job_id TEXT PRIMARY KEY REFERENCES jobs(id),
                data TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
            CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, JobError> {
        self.conn
            .lock()
            .map_err(|_| JobError::Database("connection lock poisoned".to_string()))
    }

    fn build_where_clause(filter: &JobFilter) -> (String, Vec<String>) {
        match filter.status {
            Some(status) => (
                "WHERE status = ?".to_string(),
                vec![status.as_str().to_string()],
            ),
            None => (String::new(), Vec::new()),
        }
    }

    fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
        value
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
        let id: String = row.get(0)?;
        let status_str: String = row.get(1)?;
        let submission_json: String = row.get(2)?;
        let created_at: String = row.get(3)?;

        let status = status_str.parse::<JobStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?;

        let submission: Submission = serde_json::from_str(&submission_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Job {
            id,
            status,
            submission,
            created_at: Self::parse_timestamp(Some(created_at)).unwrap_or_else(Utc::now),
            started_at: Self::parse_timestamp(row.get(4)?),
            completed_at: Self::parse_timestamp(row.get(5)?),
            error: row.get(6)?,
        })
    }

    fn fetch(conn: &Connection, id: &str) -> Result<Option<Job>, JobError> {
        let job = conn
            .query_row(
                &format!("SELECT {} FROM jobs WHERE id = ?", JOB_COLUMNS),
                params![id],
                Self::row_to_job,
            )
            .optional()?;
        Ok(job)
    }

    /// Explain why a conditional update touched no row.
    fn rejected_transition(conn: &Connection, id: &str, to: JobStatus) -> JobError {
        match Self::fetch(conn, id) {
            Ok(Some(job)) => JobError::InvalidTransition {
                job_id: id.to_string(),
                from: job.status,
                to,
            },
            Ok(None) => JobError::NotFound(id.to_string()),
            Err(e) => e,
        }
    }
}

impl JobStore for SqliteJobStore {
    fn create(&self, submission: &Submission) -> Result<Job, JobError> {
        let conn = self.lock()?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let submission_json = serde_json::to_string(submission)?;

        conn.execute(
            "INSERT INTO jobs (id, status, submission, created_at) VALUES (?, ?, ?, ?)",
            params![id, JobStatus::Pending.as_str(), submission_json, now.to_rfc3339()],
        )?;

        Ok(Job {
            id,
            status: JobStatus::Pending,
            submission: submission.clone(),
            created_at: now,
            started_at: None,
            completed_at: None,
            error: None,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Job>, JobError> {
        let conn = self.lock()?;
        Self::fetch(&conn, id)
    }

    fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError> {
        let conn = self.lock()?;

        let (where_clause, mut params) = Self::build_where_clause(filter);
        let sql = format!(
            "SELECT {} FROM jobs {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            JOB_COLUMNS, where_clause
        );

        params.push(filter.limit.to_string());
        params.push(filter.offset.to_string());

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), Self::row_to_job)?;

        let mut jobs = Vec::new();
        for row in rows {
            jobs.push(row?);
        }
        Ok(jobs)
    }

    fn count(&self, filter: &JobFilter) -> Result<i64, JobError> {
        let conn = self.lock()?;

        let (where_clause, params) = Self::build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let count = conn.query_row(&sql, rusqlite::params_from_iter(params.iter()), |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    fn mark_running(&self, id: &str) -> Result<Job, JobError> {
        let conn = self.lock()?;

        let updated = conn.execute(
            "UPDATE jobs SET status = ?, started_at = ? WHERE id = ? AND status = ?",
            params![
                JobStatus::Running.as_str(),
                Utc::now().to_rfc3339(),
                id,
                JobStatus::Pending.as_str()
            ],
        )?;

        if updated == 0 {
            return Err(Self::rejected_transition(&conn, id, JobStatus::Running));
        }

        Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    fn complete(&self, id: &str, result: &JobResult) -> Result<Job, JobError> {
        let mut conn = self.lock()?;
        let data = serde_json::to_string(result)?;

        let tx = conn.transaction()?;
        let updated = tx.execute(
            "UPDATE jobs SET status = ?, completed_at = ? WHERE id = ? AND status = ?",
            params![
                JobStatus::Complete.as_str(),
                result.completed_at.to_rfc3339(),
                id,
                JobStatus::Running.as_str()
            ],
        )?;

        if updated == 0 {
            let err = Self::rejected_transition(&tx, id, JobStatus::Complete);
            tx.rollback()?;
            return Err(err);
        }

        tx.execute(
            "INSERT INTO results (job_id, data) VALUES (?, ?)",
            params![id, data],
        )?;
        tx.commit()?;

        Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    fn fail(&self, id: &str, error: &str) -> Result<Job, JobError> {
        let conn = self.lock()?;

        let updated = conn.execute(
            "UPDATE jobs SET status = ?, completed_at = ?, error = ? WHERE id = ? AND status = ?",
            params![
                JobStatus::Failed.as_str(),
                Utc::now().to_rfc3339(),
                error,
                id,
                JobStatus::Running.as_str()
            ],
        )?;

        if updated == 0 {
            return Err(Self::rejected_transition(&conn, id, JobStatus::Failed));
        }

        Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    fn get_result(&self, id: &str) -> Result<Option<JobResult>, JobError> {
        let conn = self.lock()?;

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM results WHERE job_id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        data.map(|json| serde_json::from_str(&json).map_err(JobError::from))
            .transpose()
    }
}
