//! Core job data types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::DestinationResult;
use crate::submission::Submission;

/// Lifecycle status of a job.
///
/// ```text
/// Pending -> Running -> Complete
///               |
///               v
///             Failed
/// ```
///
/// Complete and Failed are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted and enqueued, not yet picked up by a worker.
    Pending,
    /// A worker is searching and aggregating.
    Running,
    /// Result persisted.
    Complete,
    /// Processing aborted; the job carries an error description.
    Failed,
}

impl JobStatus {
    /// Returns the status as stored and reported.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
        }
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }

    /// Returns true if `next` directly follows this status.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Complete)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "complete" => Ok(JobStatus::Complete),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status: {}", other)),
        }
    }
}

/// A submitted group search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    /// Unique identifier (UUID).
    pub id: String,

    /// Current status.
    pub status: JobStatus,

    /// Validated request, never modified after creation.
    pub submission: Submission,

    /// When the job was submitted.
    pub created_at: DateTime<Utc>,

    /// When a worker picked the job up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// Set once the job reaches Complete or Failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Failure description, only when Failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Final payload of a completed job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobResult {
    pub job_id: String,
    pub status: JobStatus,
    pub completed_at: DateTime<Utc>,
    pub error: Option<String>,
    /// Destinations every traveler can reach, in submission order.
    pub destinations: Vec<DestinationResult>,
}

impl JobResult {
    /// Wrap aggregated destinations as the result of `job_id`.
    pub fn complete(job_id: impl Into<String>, destinations: Vec<DestinationResult>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Complete,
            completed_at: Utc::now(),
            error: None,
            destinations,
        }
    }
}
