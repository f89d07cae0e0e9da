//! Job API handlers.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use flock_core::{
    metrics::JOBS_SUBMITTED, validate_submission, Job, JobFilter, JobResult, JobStatus,
};

use crate::state::AppState;

/// Maximum allowed limit for job queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for job queries
const DEFAULT_LIMIT: i64 = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing jobs
#[derive(Debug, Deserialize)]
pub struct ListJobsParams {
    /// Filter by status (pending, running, complete, failed)
    pub status: Option<String>,
    /// Maximum number of jobs to return
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
}

/// Response for a newly accepted job
#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: String,
}

/// Status view of a job
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
}

impl JobResponse {
    fn new(job: Job, result: Option<JobResult>) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            created_at: job.created_at.to_rfc3339(),
            started_at: job.started_at.map(|t| t.to_rfc3339()),
            completed_at: job.completed_at.map(|t| t.to_rfc3339()),
            error: job.error,
            result,
        }
    }
}

/// Response for listing jobs
#[derive(Debug, Serialize)]
pub struct ListJobsResponse {
    pub jobs: Vec<JobResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct JobErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<JobErrorResponse>) {
    (
        status,
        Json(JobErrorResponse {
            error: error.into(),
        }),
    )
}

/// Null, false, zero and empty strings, lists or objects carry no submission.
fn is_blank(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Validate, persist and enqueue a group search.
///
/// The body is taken raw so malformed JSON gets the same error shape as
/// every other rejection.
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateJobResponse>), impl IntoResponse> {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) if !is_blank(&payload) => payload,
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Request body must be JSON",
            ))
        }
    };

    let submission = match validate_submission(&payload) {
        Ok(submission) => submission,
        Err(e) => {
            info!(error = %e, "Rejected job submission");
            return Err(error_response(StatusCode::BAD_REQUEST, e.to_string()));
        }
    };

    let job = match state.store().create(&submission) {
        Ok(job) => job,
        Err(e) => {
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ))
        }
    };

    if let Err(e) = state.queue().enqueue(&job.id).await {
        warn!(job_id = %job.id, error = %e, "Failed to enqueue job, left pending");
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Job queue unavailable: {}", e),
        ));
    }

    JOBS_SUBMITTED.inc();
    info!(
        job_id = %job.id,
        travelers = submission.travelers.len(),
        destinations = submission.destinations.len(),
        "Job accepted"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateJobResponse { job_id: job.id }),
    ))
}

/// Get a job's status, with its result once complete
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, impl IntoResponse> {
    let job = match state.store().get(&id) {
        Ok(Some(job)) => job,
        Ok(None) => return Err(error_response(StatusCode::NOT_FOUND, "Job not found")),
        Err(e) => {
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ))
        }
    };

    let result = if job.status == JobStatus::Complete {
        match state.store().get_result(&id) {
            Ok(result) => result,
            Err(e) => {
                return Err(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    e.to_string(),
                ))
            }
        }
    } else {
        None
    };

    Ok(Json(JobResponse::new(job, result)))
}

/// List jobs, newest first
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListJobsParams>,
) -> Result<Json<ListJobsResponse>, impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut filter = JobFilter::new().with_limit(limit).with_offset(offset);

    if let Some(ref status) = params.status {
        match status.parse::<JobStatus>() {
            Ok(status) => filter = filter.with_status(status),
            Err(_) => {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid status: {}", status),
                ))
            }
        }
    }

    let jobs = match state.store().list(&filter) {
        Ok(jobs) => jobs,
        Err(e) => {
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ))
        }
    };

    // Get total count (without pagination)
    let mut count_filter = JobFilter::new().with_limit(i64::MAX);
    if let Some(status) = filter.status {
        count_filter = count_filter.with_status(status);
    }

    let total = match state.store().count(&count_filter) {
        Ok(total) => total,
        Err(e) => {
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ))
        }
    };

    Ok(Json(ListJobsResponse {
        jobs: jobs
            .into_iter()
            .map(|job| JobResponse::new(job, None))
            .collect(),
        total,
        limit,
        offset,
    }))
}
