//! External flight search and location lookup.
//!
//! The orchestrator only talks to the traits defined here, so jobs can run
//! against the real Amadeus API or an in-memory mock.

mod amadeus;
mod types;

pub use amadeus::AmadeusClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the flight provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Credentials rejected or token exchange failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The call did not finish within its deadline.
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Searches round-trip offers for one origin/destination pair.
#[async_trait]
pub trait FlightSearchProvider: Send + Sync {
    /// Return every offer the provider has for the query, unfiltered.
    async fn search_offers(&self, query: &FlightSearchQuery)
        -> Result<Vec<RawOffer>, ProviderError>;
}

/// Turns a location code into a human-readable name.
#[async_trait]
pub trait LocationResolver: Send + Sync {
    /// Resolve a display name (typically the city) for an airport code.
    async fn resolve_name(&self, code: &str) -> Result<String, ProviderError>;
}
