//! Reduction of per-traveler flights into group comparisons.

mod stats;

pub use stats::GroupStats;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::metrics;
use crate::search::{DestinationFlights, TravelerFlight};

/// A destination every traveler can reach, with what it costs the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationResult {
    pub destination: String,
    pub destination_name: String,
    /// One flight per traveler, in submission order.
    #[serde(rename = "traveler_flights")]
    pub flights: Vec<TravelerFlight>,
    pub group_stats: GroupStats,
}

/// Keep only destinations with a flight for every traveler and price them.
///
/// Input order is preserved. Dropped destinations are logged.
pub fn aggregate_destinations(
    job_id: &str,
    found: Vec<DestinationFlights>,
    traveler_count: usize,
) -> Vec<DestinationResult> {
    found
        .into_iter()
        .filter_map(|entry| {
            if entry.flights.len() != traveler_count {
                warn!(
                    job_id = %job_id,
                    destination = %entry.destination,
                    found = entry.flights.len(),
                    travelers = traveler_count,
                    "Excluding destination, not every traveler has a flight"
                );
                metrics::DESTINATIONS_EXCLUDED.inc();
                return None;
            }

            let currency = group_currency(job_id, &entry);
            let totals: Vec<f64> = entry.flights.iter().map(|f| f.total_price).collect();
            let group_stats = GroupStats::from_totals(&totals, currency)?;

            Some(DestinationResult {
                destination: entry.destination,
                destination_name: entry.destination_name,
                flights: entry.flights,
                group_stats,
            })
        })
        .collect()
}

/// Currency of the first flight; a mix is logged but not converted.
fn group_currency(job_id: &str, entry: &DestinationFlights) -> String {
    let currency = entry
        .flights
        .first()
        .map(|f| f.currency.clone())
        .unwrap_or_default();

    if entry.flights.iter().any(|f| f.currency != currency) {
        let seen: Vec<&str> = entry.flights.iter().map(|f| f.currency.as_str()).collect();
        warn!(
            job_id = %job_id,
            destination = %entry.destination,
            currencies = ?seen,
            using = %currency,
            "Mixed currencies in destination, totals are not converted"
        );
    }

    currency
}
