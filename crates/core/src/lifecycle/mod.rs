//! Job execution: queueing, worker pool and state transitions.
//!
//! A submitted job id travels through a [`JobQueue`] to the [`WorkerPool`],
//! which hands it to the [`JobController`]. The controller is the only code
//! that moves a job past `pending`.

mod controller;
mod queue;
mod worker;

pub use controller::{JobContext, JobController};
pub use queue::{ChannelJobQueue, JobQueue, QueueError};
pub use worker::WorkerPool;

use thiserror::Error;

/// Errors that prevent a job from being processed at all.
///
/// Failures after the job is running are recorded on the job instead.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The queued id has no job record.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Job store error.
    #[error("job store error: {0}")]
    Store(#[from] crate::job::JobError),

    /// Search phase aborted.
    #[error("search error: {0}")]
    Search(#[from] crate::search::SearchError),
}
