//! Background worker pool consuming the job queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Mutex, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::JobController;

/// Runs queued jobs with bounded concurrency.
pub struct WorkerPool {
    controller: Arc<JobController>,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    receiver: Mutex<Option<mpsc::Receiver<String>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    running: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
}

impl WorkerPool {
    /// Create a pool that will run at most `concurrency` jobs at once.
    pub fn new(
        controller: Arc<JobController>,
        receiver: mpsc::Receiver<String>,
        concurrency: usize,
    ) -> Self {
        let concurrency = concurrency.max(1);
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            controller,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            receiver: Mutex::new(Some(receiver)),
            dispatcher: Mutex::new(None),
            running: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    /// Start consuming the queue.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Worker pool already running");
            return;
        }

        let Some(mut receiver) = self.receiver.lock().await.take() else {
            warn!("Worker pool cannot be restarted");
            return;
        };

        info!(concurrency = self.concurrency, "Starting worker pool");

        let controller = Arc::clone(&self.controller);
        let semaphore = Arc::clone(&self.semaphore);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            loop {
                let job_id = tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Worker pool received shutdown signal");
                        break;
                    }
                    next = receiver.recv() => match next {
                        Some(job_id) => job_id,
                        None => {
                            info!("Job queue closed");
                            break;
                        }
                    },
                };

                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };

                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    match controller.run_job(&job_id).await {
                        Ok(status) => debug!(job_id = %job_id, status = %status, "Job finished"),
                        Err(e) => error!(job_id = %job_id, error = %e, "Job could not be run"),
                    }
                    drop(permit);
                });
            }
            info!("Worker pool dispatcher stopped");
        });

        *self.dispatcher.lock().await = Some(handle);
    }

    /// Stop taking jobs and wait for running ones to finish.
    ///
    /// Ids still queued stay pending.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Worker pool not running");
            return;
        }

        info!("Stopping worker pool");
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.dispatcher.lock().await.take() {
            if let Err(e) = handle.await {
                error!("Worker pool dispatcher panicked: {}", e);
            }
        }

        // Every permit back means no job is in flight.
        match self.semaphore.acquire_many(self.concurrency as u32).await {
            Ok(_permits) => info!("Worker pool stopped"),
            Err(e) => error!("Worker pool semaphore closed: {}", e),
        }
    }

    /// Returns true between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}
