//! Job storage trait and types.

use thiserror::Error;

use crate::job::{Job, JobResult, JobStatus};
use crate::submission::Submission;

/// Error type for job store operations.
#[derive(Debug, Error)]
pub enum JobError {
    /// Job not found.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// The job is not in a status the requested transition starts from.
    #[error("Cannot move job {job_id} from {from} to {to}")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored blob could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for JobError {
    fn from(e: rusqlite::Error) -> Self {
        JobError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for JobError {
    fn from(e: serde_json::Error) -> Self {
        JobError::Serialization(e.to_string())
    }
}

/// Filter for querying jobs.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Filter by status.
    pub status: Option<JobStatus>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl JobFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            status: None,
            limit: 100,
            offset: 0,
        }
    }

    /// Filter by status.
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set offset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for job storage backends.
///
/// Every method is one atomic unit; no transaction spans two calls.
/// Transition methods enforce the job state machine and fail with
/// [`JobError::InvalidTransition`] when the job is elsewhere.
pub trait JobStore: Send + Sync {
    /// Persist a new pending job.
    fn create(&self, submission: &Submission) -> Result<Job, JobError>;

    /// Get a job by ID.
    fn get(&self, id: &str) -> Result<Option<Job>, JobError>;

    /// List jobs matching the filter, newest first.
    fn list(&self, filter: &JobFilter) -> Result<Vec<Job>, JobError>;

    /// Count jobs matching the filter (pagination ignored).
    fn count(&self, filter: &JobFilter) -> Result<i64, JobError>;

    /// Pending -> Running.
    fn mark_running(&self, id: &str) -> Result<Job, JobError>;

    /// Running -> Complete, writing the result record in the same transaction.
    fn complete(&self, id: &str, result: &JobResult) -> Result<Job, JobError>;

    /// Running -> Failed with a human-readable description.
    fn fail(&self, id: &str, error: &str) -> Result<Job, JobError>;

    /// Result of a completed job, if any.
    fn get_result(&self, id: &str) -> Result<Option<JobResult>, JobError>;
}
