//! Drives a single job from pending to a terminal state.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use super::LifecycleError;
use crate::aggregate::aggregate_destinations;
use crate::job::{Job, JobResult, JobStatus, JobStore};
use crate::metrics;
use crate::provider::{FlightSearchProvider, LocationResolver};
use crate::search::{FlightSearchOrchestrator, SearchSettings};

/// Everything a job needs to run.
#[derive(Clone)]
pub struct JobContext {
    pub store: Arc<dyn JobStore>,
    pub provider: Arc<dyn FlightSearchProvider>,
    pub resolver: Arc<dyn LocationResolver>,
    pub search: SearchSettings,
}

/// Runs jobs and records their outcome.
pub struct JobController {
    store: Arc<dyn JobStore>,
    orchestrator: FlightSearchOrchestrator,
}

impl JobController {
    pub fn new(ctx: JobContext) -> Self {
        let orchestrator = FlightSearchOrchestrator::new(ctx.provider, ctx.resolver, ctx.search);
        Self {
            store: ctx.store,
            orchestrator,
        }
    }

    /// Process a pending job to completion.
    ///
    /// Returns the terminal status. An error means the job could not be
    /// started (unknown id, or no longer pending) and was left untouched.
    pub async fn run_job(&self, job_id: &str) -> Result<JobStatus, LifecycleError> {
        info!(job_id = %job_id, "Worker picked up job");

        if self.store.get(job_id)?.is_none() {
            error!(job_id = %job_id, "Queued job has no record");
            return Err(LifecycleError::JobNotFound(job_id.to_string()));
        }

        let job = self.store.mark_running(job_id)?;
        info!(job_id = %job_id, "Job running");

        let start = Instant::now();
        let status = match self.process(&job).await {
            Ok(result) => {
                info!(
                    job_id = %job_id,
                    destinations = result.destinations.len(),
                    "Job complete"
                );
                JobStatus::Complete
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Job failed");
                self.record_failure(job_id, &e.to_string());
                JobStatus::Failed
            }
        };

        metrics::JOBS_FINISHED
            .with_label_values(&[status.as_str()])
            .inc();
        metrics::JOB_DURATION
            .with_label_values(&[status.as_str()])
            .observe(start.elapsed().as_secs_f64());

        Ok(status)
    }

    /// Search, aggregate and persist the result of a running job.
    async fn process(&self, job: &Job) -> Result<JobResult, LifecycleError> {
        let submission = &job.submission;

        let found = self.orchestrator.search(&job.id, submission).await?;
        let destinations = aggregate_destinations(&job.id, found, submission.travelers.len());

        let result = JobResult::complete(&job.id, destinations);
        self.store.complete(&job.id, &result)?;
        Ok(result)
    }

    /// Store the failure description; a store error here is only logged.
    fn record_failure(&self, job_id: &str, message: &str) {
        if let Err(e) = self.store.fail(job_id, message) {
            warn!(
                job_id = %job_id,
                error = %e,
                "Could not record job failure"
            );
        }
    }
}
