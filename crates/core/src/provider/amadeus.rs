//! Amadeus self-service API client.
//!
//! Authenticates with the OAuth2 client-credentials flow and keeps the
//! access token until shortly before it expires.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use super::{
    FlightSearchProvider, FlightSearchQuery, Itinerary, LocationResolver, ProviderError,
    RawOffer, Segment,
};
use crate::config::AmadeusConfig;

/// Tokens are refreshed this long before the provider says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Amadeus API client.
pub struct AmadeusClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    currency: Option<String>,
    max_results: Option<u32>,
    token: Mutex<Option<CachedToken>>,
}

impl AmadeusClient {
    /// Create a new Amadeus client.
    pub fn new(config: &AmadeusConfig) -> Result<Self, ProviderError> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(ProviderError::Auth(
                "Amadeus client id and secret are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            currency: config.currency.clone(),
            max_results: config.max_results,
            token: Mutex::new(None),
        })
    }

    /// Return a valid access token, exchanging credentials if needed.
    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let url = format!("{}/v1/security/oauth2/token", self.base_url);
        debug!("Requesting Amadeus access token");

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!(
                "token request returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            ProviderError::Parse(format!("Failed to parse token response: {}", e))
        })?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    /// Drop the cached token so the next call re-authenticates.
    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn check_status(&self, response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
            return Err(ProviderError::Auth("access token rejected".to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(body));
        }
        Err(ProviderError::Api {
            status: status.as_u16(),
            message: body,
        })
    }

    fn offer_params(&self, query: &FlightSearchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("originLocationCode", query.origin.clone()),
            ("destinationLocationCode", query.destination.clone()),
            ("departureDate", query.departure_date.clone()),
            ("returnDate", query.return_date.clone()),
            ("adults", query.adults.to_string()),
            ("nonStop", query.non_stop.to_string()),
        ];
        if let Some(excluded) = &query.excluded_airlines {
            params.push(("excludedAirlineCodes", excluded.join(",")));
        }
        if let Some(currency) = &self.currency {
            params.push(("currencyCode", currency.clone()));
        }
        if let Some(max) = self.max_results {
            params.push(("max", max.to_string()));
        }
        params
    }
}

#[async_trait]
impl FlightSearchProvider for AmadeusClient {
    async fn search_offers(
        &self,
        query: &FlightSearchQuery,
    ) -> Result<Vec<RawOffer>, ProviderError> {
        let token = self.access_token().await?;
        let url = format!("{}/v2/shopping/flight-offers", self.base_url);

        debug!(
            origin = %query.origin,
            destination = %query.destination,
            "Amadeus flight offer search"
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&self.offer_params(query))
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let body: OfferResponse = response.json().await.map_err(|e| {
            ProviderError::Parse(format!("Failed to parse flight offers response: {}", e))
        })?;

        body.data.into_iter().map(RawOffer::try_from).collect()
    }
}

#[async_trait]
impl LocationResolver for AmadeusClient {
    async fn resolve_name(&self, code: &str) -> Result<String, ProviderError> {
        let token = self.access_token().await?;
        let url = format!("{}/v1/reference-data/locations", self.base_url);

        debug!(code = %code, "Amadeus location lookup");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("keyword", code), ("subType", "AIRPORT")])
            .send()
            .await?;
        let response = self.check_status(response).await?;

        let body: LocationResponse = response.json().await.map_err(|e| {
            ProviderError::Parse(format!("Failed to parse locations response: {}", e))
        })?;

        Ok(body.city_name().unwrap_or(code).to_string())
    }
}

// Wire types

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct OfferResponse {
    #[serde(default)]
    data: Vec<WireOffer>,
}

#[derive(Debug, Deserialize)]
struct WireOffer {
    itineraries: Vec<WireItinerary>,
    price: WirePrice,
}

#[derive(Debug, Deserialize)]
struct WireItinerary {
    #[serde(default)]
    duration: String,
    segments: Vec<WireSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSegment {
    carrier_code: String,
    number: String,
    departure: WireEndpoint,
    arrival: WireEndpoint,
}

#[derive(Debug, Deserialize)]
struct WireEndpoint {
    at: String,
}

#[derive(Debug, Deserialize)]
struct WirePrice {
    total: String,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct LocationResponse {
    #[serde(default)]
    data: Vec<WireLocation>,
}

impl LocationResponse {
    fn city_name(&self) -> Option<&str> {
        self.data
            .first()
            .and_then(|l| l.address.as_ref())
            .and_then(|a| a.city_name.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    #[serde(default)]
    address: Option<WireAddress>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAddress {
    #[serde(default)]
    city_name: Option<String>,
}

impl From<WireSegment> for Segment {
    fn from(s: WireSegment) -> Self {
        Self {
            carrier_code: s.carrier_code,
            number: s.number,
            departure_at: s.departure.at,
            arrival_at: s.arrival.at,
        }
    }
}

impl TryFrom<WireItinerary> for Itinerary {
    type Error = ProviderError;

    fn try_from(i: WireItinerary) -> Result<Self, Self::Error> {
        if i.segments.is_empty() {
            return Err(ProviderError::Parse(
                "itinerary has no segments".to_string(),
            ));
        }
        Ok(Self {
            duration: i.duration,
            segments: i.segments.into_iter().map(Segment::from).collect(),
        })
    }
}

impl TryFrom<WireOffer> for RawOffer {
    type Error = ProviderError;

    fn try_from(offer: WireOffer) -> Result<Self, Self::Error> {
        let total_price = offer
            .price
            .total
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| {
                ProviderError::Parse(format!("invalid offer price: {}", offer.price.total))
            })?;

        let mut itineraries = offer.itineraries.into_iter();
        let (Some(outbound), Some(inbound)) = (itineraries.next(), itineraries.next()) else {
            return Err(ProviderError::Parse(
                "round-trip offer needs two itineraries".to_string(),
            ));
        };

        Ok(Self {
            outbound: outbound.try_into()?,
            inbound: inbound.try_into()?,
            total_price,
            currency: offer.price.currency,
        })
    }
}
