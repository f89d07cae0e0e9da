//! Search result types.

use serde::{Deserialize, Serialize};

use super::duration::{parse_duration_minutes, DurationError};
use crate::provider::{Itinerary, RawOffer};

/// One direction of a chosen trip, as reported to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOption {
    pub departure_time: String,
    pub arrival_time: String,
    pub duration_minutes: u32,
    pub stops: u32,
    /// Carrier of the first segment.
    pub airline: String,
    pub flight_numbers: Vec<String>,
    /// Half of the round-trip total.
    pub price: f64,
}

impl FlightOption {
    /// Summarize `itinerary`, charging it `price`.
    pub fn from_itinerary(itinerary: &Itinerary, price: f64) -> Result<Self, DurationError> {
        Ok(Self {
            departure_time: itinerary.departure_at().to_string(),
            arrival_time: itinerary.arrival_at().to_string(),
            duration_minutes: parse_duration_minutes(&itinerary.duration)?,
            stops: itinerary.stops(),
            airline: itinerary.airline().to_string(),
            flight_numbers: itinerary.flight_numbers(),
            price,
        })
    }
}

/// The cheapest qualifying round trip for one traveler to one destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelerFlight {
    pub traveler_name: String,
    pub origin: String,
    pub outbound: FlightOption,
    #[serde(rename = "return")]
    pub inbound: FlightOption,
    pub total_price: f64,
    pub currency: String,
}

impl TravelerFlight {
    /// Build the report for `offer`; each leg is charged half the total.
    pub fn from_offer(
        traveler_name: &str,
        origin: &str,
        offer: &RawOffer,
    ) -> Result<Self, DurationError> {
        let leg_price = offer.total_price / 2.0;
        Ok(Self {
            traveler_name: traveler_name.to_string(),
            origin: origin.to_string(),
            outbound: FlightOption::from_itinerary(&offer.outbound, leg_price)?,
            inbound: FlightOption::from_itinerary(&offer.inbound, leg_price)?,
            total_price: offer.total_price,
            currency: offer.currency.clone(),
        })
    }
}

/// Flights found for one destination, travelers in submission order.
///
/// Travelers with no qualifying offer are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationFlights {
    pub destination: String,
    pub destination_name: String,
    pub flights: Vec<TravelerFlight>,
}

/// What a single traveler/destination search produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    /// At least one offer passed the traveler's filters; this is the cheapest.
    Found(TravelerFlight),
    /// The provider answered but nothing passed the filters.
    NoQualifyingOffers,
    /// The provider call failed or timed out.
    ProviderFailed(String),
}

impl PairOutcome {
    /// Metric label for this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            PairOutcome::Found(_) => "found",
            PairOutcome::NoQualifyingOffers => "no_qualifying_offers",
            PairOutcome::ProviderFailed(_) => "provider_failed",
        }
    }
}
