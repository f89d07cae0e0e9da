//! Mock flight search provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::provider::{FlightSearchProvider, FlightSearchQuery, ProviderError, RawOffer};

type Route = (String, String);

fn route(origin: &str, destination: &str) -> Route {
    (origin.to_string(), destination.to_string())
}

/// Mock implementation of the FlightSearchProvider trait.
///
/// Offers are configured per (origin, destination) route; unconfigured
/// routes answer with no offers. Every query is recorded.
///
/// # Example
///
/// ```rust,ignore
/// use flock_core::testing::{MockFlightProvider, fixtures};
///
/// let provider = MockFlightProvider::new();
/// provider.set_offers("JFK", "CUN", vec![
///     fixtures::direct_offer("AA", "2025-06-01T09:00:00", "2025-06-08T18:00:00", 300.0),
/// ]).await;
/// provider.set_route_error("LAX", "CUN", "upstream unavailable").await;
///
/// // ... run a job ...
///
/// assert_eq!(provider.search_count().await, 2);
/// ```
#[derive(Debug, Default)]
pub struct MockFlightProvider {
    /// Offers returned per route.
    offers: Arc<RwLock<HashMap<Route, Vec<RawOffer>>>>,
    /// Routes that fail with an API error.
    route_errors: Arc<RwLock<HashMap<Route, String>>>,
    /// Artificial latency per route.
    route_delays: Arc<RwLock<HashMap<Route, Duration>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<ProviderError>>>,
    /// Recorded queries, in call order.
    queries: Arc<RwLock<Vec<FlightSearchQuery>>>,
}

impl MockFlightProvider {
    /// Create a new mock provider with no offers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the offers returned for a route.
    pub async fn set_offers(&self, origin: &str, destination: &str, offers: Vec<RawOffer>) {
        self.offers
            .write()
            .await
            .insert(route(origin, destination), offers);
    }

    /// Make every search on a route fail.
    pub async fn set_route_error(&self, origin: &str, destination: &str, message: &str) {
        self.route_errors
            .write()
            .await
            .insert(route(origin, destination), message.to_string());
    }

    /// Delay every search on a route.
    pub async fn set_route_delay(&self, origin: &str, destination: &str, delay: Duration) {
        self.route_delays
            .write()
            .await
            .insert(route(origin, destination), delay);
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: ProviderError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get recorded queries.
    pub async fn recorded_queries(&self) -> Vec<FlightSearchQuery> {
        self.queries.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.queries.read().await.len()
    }
}

#[async_trait]
impl FlightSearchProvider for MockFlightProvider {
    async fn search_offers(
        &self,
        query: &FlightSearchQuery,
    ) -> Result<Vec<RawOffer>, ProviderError> {
        self.queries.write().await.push(query.clone());

        let key = route(&query.origin, &query.destination);

        let delay = self.route_delays.read().await.get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        if let Some(message) = self.route_errors.read().await.get(&key) {
            return Err(ProviderError::Api {
                status: 500,
                message: message.clone(),
            });
        }

        Ok(self
            .offers
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }
}
