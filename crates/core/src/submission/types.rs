//! Typed submission model.

use serde::{Deserialize, Serialize};

/// A validated group search request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    /// Travelers in submission order (never empty).
    pub travelers: Vec<Traveler>,
    /// Destination codes, duplicates removed, first occurrence order kept (never empty).
    pub destinations: Vec<String>,
    /// Outbound date, as sent by the client (YYYY-MM-DD).
    pub outbound_date: String,
    /// Return date, as sent by the client (YYYY-MM-DD).
    pub return_date: String,
    /// Fallback filters. Travelers always carry their own, so this is
    /// validated and stored but not consulted during search.
    pub default_filters: Filters,
}

/// One member of the group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Traveler {
    pub name: String,
    /// Origin airport code.
    #[serde(rename = "origin_airport")]
    pub origin: String,
    pub filters: Filters,
}

/// Per-traveler constraints applied to provider offers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Filters {
    /// Ask the provider for non-stop itineraries only.
    pub non_stop_only: bool,
    /// Carrier codes the provider should leave out.
    #[serde(default)]
    pub excluded_airlines: Vec<String>,
    /// Maximum stops allowed on each leg.
    ///
    /// Required in every filters object; a submission without it is rejected
    /// rather than defaulted.
    pub max_stops: u32,
    #[serde(
        rename = "outbound_departure_window",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub outbound_departure: Option<TimeWindow>,
    #[serde(
        rename = "outbound_arrival_window",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub outbound_arrival: Option<TimeWindow>,
    #[serde(
        rename = "return_departure_window",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub return_departure: Option<TimeWindow>,
    #[serde(
        rename = "return_arrival_window",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub return_arrival: Option<TimeWindow>,
}

/// An inclusive same-day time range, bounds written as zero-padded `HH:MM`.
///
/// Zero-padded strings order the same way as the times they spell, so
/// bounds are compared as plain strings. Ranges crossing midnight are not
/// representable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub earliest: String,
    pub latest: String,
}

impl TimeWindow {
    pub fn new(earliest: impl Into<String>, latest: impl Into<String>) -> Self {
        Self {
            earliest: earliest.into(),
            latest: latest.into(),
        }
    }

    /// Returns true if `hhmm` lies within the window, bounds included.
    pub fn contains(&self, hhmm: &str) -> bool {
        self.earliest.as_str() <= hhmm && hhmm <= self.latest.as_str()
    }
}

impl Submission {
    /// Number of (traveler, destination) searches this submission fans out to.
    pub fn search_count(&self) -> usize {
        self.travelers.len() * self.destinations.len()
    }
}
