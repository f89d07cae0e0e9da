//! Job records: lifecycle status, persisted results, and storage.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteJobStore;
pub use store::{JobError, JobFilter, JobStore};
pub use types::{Job, JobResult, JobStatus};
