pub mod aggregate;
pub mod config;
pub mod job;
pub mod lifecycle;
pub mod metrics;
pub mod provider;
pub mod search;
pub mod submission;
pub mod testing;

pub use aggregate::{aggregate_destinations, DestinationResult, GroupStats};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use job::{Job, JobError, JobFilter, JobResult, JobStatus, JobStore, SqliteJobStore};
pub use lifecycle::{
    ChannelJobQueue, JobContext, JobController, JobQueue, LifecycleError, QueueError, WorkerPool,
};
pub use provider::{
    AmadeusClient, FlightSearchProvider, FlightSearchQuery, LocationResolver, ProviderError,
    RawOffer,
};
pub use search::{
    DestinationFlights, FlightOption, FlightSearchOrchestrator, PairOutcome, SearchError,
    SearchSettings, TravelerFlight,
};
pub use submission::{validate_submission, Filters, Submission, TimeWindow, Traveler, ValidationError};
