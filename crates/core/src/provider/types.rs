//! Provider query and offer types.

use serde::{Deserialize, Serialize};

use crate::submission::Traveler;

/// One round-trip search for a single adult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSearchQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: String,
    pub adults: u32,
    pub non_stop: bool,
    /// Carrier codes to leave out. `None` when the traveler excludes nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_airlines: Option<Vec<String>>,
}

impl FlightSearchQuery {
    /// Build the query for `traveler` flying to `destination` on the given dates.
    pub fn for_traveler(
        traveler: &Traveler,
        destination: &str,
        departure_date: &str,
        return_date: &str,
    ) -> Self {
        let excluded = &traveler.filters.excluded_airlines;
        Self {
            origin: traveler.origin.clone(),
            destination: destination.to_string(),
            departure_date: departure_date.to_string(),
            return_date: return_date.to_string(),
            adults: 1,
            non_stop: traveler.filters.non_stop_only,
            excluded_airlines: if excluded.is_empty() {
                None
            } else {
                Some(excluded.clone())
            },
        }
    }
}

/// A priced round trip as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOffer {
    pub outbound: Itinerary,
    pub inbound: Itinerary,
    /// Price for the whole round trip.
    pub total_price: f64,
    pub currency: String,
}

/// One direction of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    /// Compact duration token, e.g. `PT10H30M`.
    pub duration: String,
    /// Flown segments in order, never empty.
    pub segments: Vec<Segment>,
}

impl Itinerary {
    /// Number of stops (segments minus one).
    pub fn stops(&self) -> u32 {
        self.segments.len().saturating_sub(1) as u32
    }

    /// Departure timestamp of the first segment.
    pub fn departure_at(&self) -> &str {
        self.segments
            .first()
            .map(|s| s.departure_at.as_str())
            .unwrap_or_default()
    }

    /// Arrival timestamp of the last segment.
    pub fn arrival_at(&self) -> &str {
        self.segments
            .last()
            .map(|s| s.arrival_at.as_str())
            .unwrap_or_default()
    }

    /// Operating carrier of the first segment.
    pub fn airline(&self) -> &str {
        self.segments
            .first()
            .map(|s| s.carrier_code.as_str())
            .unwrap_or_default()
    }

    /// Carrier code plus number for each segment, e.g. `AA100`.
    pub fn flight_numbers(&self) -> Vec<String> {
        self.segments
            .iter()
            .map(|s| format!("{}{}", s.carrier_code, s.number))
            .collect()
    }
}

/// A single flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub carrier_code: String,
    pub number: String,
    /// Local timestamp, `YYYY-MM-DDTHH:MM:SS`.
    pub departure_at: String,
    pub arrival_at: String,
}
