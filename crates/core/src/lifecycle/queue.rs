//! Hand-off of accepted job ids to the worker pool.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from enqueuing a job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue is at capacity.
    #[error("job queue is full")]
    Full,

    /// No worker pool is consuming the queue.
    #[error("job queue is closed")]
    Closed,
}

/// Accepts job ids for background processing.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Schedule `job_id` for processing. Called exactly once per job.
    async fn enqueue(&self, job_id: &str) -> Result<(), QueueError>;
}

/// In-process queue over a bounded channel.
///
/// Never waits for room: a full queue is reported so the caller can refuse
/// the submission.
#[derive(Debug, Clone)]
pub struct ChannelJobQueue {
    tx: mpsc::Sender<String>,
}

impl ChannelJobQueue {
    /// Create a queue and the receiver to hand to a [`super::WorkerPool`].
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl JobQueue for ChannelJobQueue {
    async fn enqueue(&self, job_id: &str) -> Result<(), QueueError> {
        self.tx.try_send(job_id.to_string()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}
