//! Flight search: offer filtering, duration parsing and the per-job fan-out.

mod duration;
mod filter;
mod orchestrator;
mod types;

pub use duration::{parse_duration_minutes, DurationError};
pub use filter::{in_time_window, passes_filters};
pub use orchestrator::{FlightSearchOrchestrator, SearchSettings};
pub use types::{DestinationFlights, FlightOption, PairOutcome, TravelerFlight};

use thiserror::Error;

/// Errors that abort a job's search phase.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The offer chosen for a traveler carried an unreadable duration.
    #[error("Invalid offer for {traveler} to {destination}: {source}")]
    MalformedDuration {
        traveler: String,
        destination: String,
        source: DurationError,
    },
}
