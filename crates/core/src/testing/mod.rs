//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external provider
//! traits, so jobs can run end to end without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use flock_core::testing::{MockFlightProvider, MockLocationResolver, fixtures};
//!
//! let provider = MockFlightProvider::new();
//! let resolver = MockLocationResolver::new();
//!
//! provider.set_offers("JFK", "CUN", vec![/* offers */]).await;
//! resolver.set_name("CUN", "Cancun").await;
//!
//! // Use in a JobContext...
//! ```

mod mock_provider;
mod mock_resolver;

pub use mock_provider::MockFlightProvider;
pub use mock_resolver::MockLocationResolver;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDateTime;

    use crate::provider::{Itinerary, RawOffer, Segment};
    use crate::submission::{Filters, Submission, Traveler};

    const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    /// Outbound date used by [`submission`].
    pub const OUTBOUND_DATE: &str = "2025-06-01";
    /// Return date used by [`submission`].
    pub const RETURN_DATE: &str = "2025-06-08";

    /// Move a `YYYY-MM-DDTHH:MM:SS` timestamp by whole hours.
    fn shift(timestamp: &str, hours: i64) -> String {
        NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .map(|t| (t + chrono::Duration::hours(hours)).format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|_| timestamp.to_string())
    }

    fn segment(carrier: &str, number: &str, departure: &str, arrival: String) -> Segment {
        Segment {
            carrier_code: carrier.to_string(),
            number: number.to_string(),
            departure_at: departure.to_string(),
            arrival_at: arrival,
        }
    }

    /// A traveler with default filters (direct flights only, no windows).
    pub fn traveler(name: &str, origin: &str) -> Traveler {
        Traveler {
            name: name.to_string(),
            origin: origin.to_string(),
            filters: Filters::default(),
        }
    }

    /// A submission for `(name, origin)` travelers and destination codes.
    pub fn submission(travelers: &[(&str, &str)], destinations: &[&str]) -> Submission {
        Submission {
            travelers: travelers
                .iter()
                .map(|(name, origin)| traveler(name, origin))
                .collect(),
            destinations: destinations.iter().map(|d| d.to_string()).collect(),
            outbound_date: OUTBOUND_DATE.to_string(),
            return_date: RETURN_DATE.to_string(),
            default_filters: Filters::default(),
        }
    }

    /// The wire form of [`submission`], as a client would post it.
    pub fn submission_json(travelers: &[(&str, &str)], destinations: &[&str]) -> serde_json::Value {
        serde_json::to_value(submission(travelers, destinations)).unwrap_or_default()
    }

    /// A non-stop round trip in USD; each leg takes three hours.
    pub fn direct_offer(
        carrier: &str,
        outbound_departure: &str,
        return_departure: &str,
        total_price: f64,
    ) -> RawOffer {
        RawOffer {
            outbound: Itinerary {
                duration: "PT3H".to_string(),
                segments: vec![segment(
                    carrier,
                    "100",
                    outbound_departure,
                    shift(outbound_departure, 3),
                )],
            },
            inbound: Itinerary {
                duration: "PT3H".to_string(),
                segments: vec![segment(
                    carrier,
                    "101",
                    return_departure,
                    shift(return_departure, 3),
                )],
            },
            total_price,
            currency: "USD".to_string(),
        }
    }

    /// A round trip in USD with one stop per leg; each leg takes three hours.
    pub fn one_stop_offer(
        carrier: &str,
        outbound_departure: &str,
        return_departure: &str,
        total_price: f64,
    ) -> RawOffer {
        let leg = |first: &str, second: &str, departure: &str| Itinerary {
            duration: "PT3H".to_string(),
            segments: vec![
                segment(carrier, first, departure, shift(departure, 1)),
                segment(carrier, second, &shift(departure, 2), shift(departure, 3)),
            ],
        };

        RawOffer {
            outbound: leg("200", "201", outbound_departure),
            inbound: leg("202", "203", return_departure),
            total_price,
            currency: "USD".to_string(),
        }
    }
}
