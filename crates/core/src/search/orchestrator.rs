//! Fan-out of a submission into per-traveler, per-destination searches.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::filter::passes_filters;
use super::types::{DestinationFlights, PairOutcome, TravelerFlight};
use super::SearchError;
use crate::config::SearchConfig;
use crate::metrics;
use crate::provider::{
    FlightSearchProvider, FlightSearchQuery, LocationResolver, ProviderError, RawOffer,
};
use crate::submission::{Submission, Traveler};

/// How a single job spreads its provider calls.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Provider calls in flight at once (1 = sequential).
    pub max_parallel_searches: usize,
    /// Deadline for each provider call.
    pub provider_timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_parallel_searches: config.max_parallel_searches,
            provider_timeout: Duration::from_secs(config.provider_timeout_secs as u64),
        }
    }
}

/// Queries the provider for every (traveler, destination) pair of a job.
pub struct FlightSearchOrchestrator {
    provider: Arc<dyn FlightSearchProvider>,
    resolver: Arc<dyn LocationResolver>,
    settings: SearchSettings,
}

impl FlightSearchOrchestrator {
    pub fn new(
        provider: Arc<dyn FlightSearchProvider>,
        resolver: Arc<dyn LocationResolver>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            provider,
            resolver,
            settings,
        }
    }

    /// Search every pair and group the cheapest qualifying flights by destination.
    ///
    /// Destinations come back in submission order, each listing flights in
    /// traveler order. Provider failures only cost the affected pair; an
    /// unreadable duration on a chosen offer aborts the whole search.
    pub async fn search(
        &self,
        job_id: &str,
        submission: &Submission,
    ) -> Result<Vec<DestinationFlights>, SearchError> {
        let names = self.resolve_names(job_id, &submission.destinations).await;

        let mut results: Vec<DestinationFlights> = submission
            .destinations
            .iter()
            .zip(names)
            .map(|(destination, name)| DestinationFlights {
                destination: destination.clone(),
                destination_name: name,
                flights: Vec::new(),
            })
            .collect();

        info!(
            job_id = %job_id,
            travelers = submission.travelers.len(),
            destinations = submission.destinations.len(),
            parallelism = self.settings.max_parallel_searches,
            "Starting flight searches"
        );

        // Closure arguments must not borrow, or the search future is not Send.
        let destination_count = submission.destinations.len();
        let pairs: Vec<(usize, usize)> = (0..submission.travelers.len())
            .flat_map(|traveler| (0..destination_count).map(move |index| (traveler, index)))
            .collect();

        let mut outcomes = stream::iter(pairs.into_iter().map(move |(traveler, index)| async move {
            let outcome = self
                .search_pair(
                    job_id,
                    &submission.travelers[traveler],
                    &submission.destinations[index],
                    submission,
                )
                .await;
            (index, outcome)
        }))
        .buffered(self.settings.max_parallel_searches.max(1));

        while let Some((index, outcome)) = outcomes.next().await {
            metrics::PAIR_OUTCOMES
                .with_label_values(&[outcome.as_ref().map_or("fatal", |o| o.as_str())])
                .inc();

            if let PairOutcome::Found(flight) = outcome? {
                results[index].flights.push(flight);
            }
        }

        Ok(results)
    }

    /// Look up display names once per destination, falling back to the code.
    async fn resolve_names(&self, job_id: &str, destinations: &[String]) -> Vec<String> {
        let mut names = Vec::with_capacity(destinations.len());
        for code in destinations {
            let lookup = self.resolver.resolve_name(code);
            let name = match self.timed("resolve_name", lookup).await {
                Ok(name) => name,
                Err(e) => {
                    warn!(
                        job_id = %job_id,
                        destination = %code,
                        error = %e,
                        "Could not resolve destination name, using code"
                    );
                    code.clone()
                }
            };
            names.push(name);
        }
        names
    }

    async fn search_pair(
        &self,
        job_id: &str,
        traveler: &Traveler,
        destination: &str,
        submission: &Submission,
    ) -> Result<PairOutcome, SearchError> {
        let query = FlightSearchQuery::for_traveler(
            traveler,
            destination,
            &submission.outbound_date,
            &submission.return_date,
        );

        let offers = match self
            .timed("search_offers", self.provider.search_offers(&query))
            .await
        {
            Ok(offers) => offers,
            Err(e) => {
                warn!(
                    job_id = %job_id,
                    traveler = %traveler.name,
                    origin = %traveler.origin,
                    destination = %destination,
                    error = %e,
                    "Flight search failed, skipping pair"
                );
                return Ok(PairOutcome::ProviderFailed(e.to_string()));
            }
        };

        let offered = offers.len();
        let Some(best) = cheapest(
            offers
                .iter()
                .filter(|offer| passes_filters(offer, &traveler.filters)),
        ) else {
            debug!(
                job_id = %job_id,
                traveler = %traveler.name,
                destination = %destination,
                offered,
                "No offers passed filters"
            );
            return Ok(PairOutcome::NoQualifyingOffers);
        };

        let flight = TravelerFlight::from_offer(&traveler.name, &traveler.origin, best)
            .map_err(|source| SearchError::MalformedDuration {
                traveler: traveler.name.clone(),
                destination: destination.to_string(),
                source,
            })?;

        debug!(
            job_id = %job_id,
            traveler = %traveler.name,
            destination = %destination,
            total_price = flight.total_price,
            currency = %flight.currency,
            "Selected cheapest offer"
        );

        Ok(PairOutcome::Found(flight))
    }

    /// Run a provider call under the per-call deadline, recording metrics.
    async fn timed<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        let timeout = self.settings.provider_timeout;
        let start = Instant::now();

        let result = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(timeout.as_secs())),
        };

        let status = match &result {
            Ok(_) => "success",
            Err(ProviderError::Timeout(_)) => "timeout",
            Err(_) => "error",
        };
        metrics::PROVIDER_REQUESTS
            .with_label_values(&[operation, status])
            .inc();
        metrics::PROVIDER_DURATION
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());

        result
    }
}

/// Lowest-priced offer; the earliest one wins a tie.
fn cheapest<'a>(offers: impl Iterator<Item = &'a RawOffer>) -> Option<&'a RawOffer> {
    offers.fold(None, |best: Option<&RawOffer>, offer| match best {
        Some(current) if current.total_price <= offer.total_price => Some(current),
        _ => Some(offer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::TimeWindow;
    use crate::testing::{fixtures, MockFlightProvider, MockLocationResolver};

    fn orchestrator(
        provider: &Arc<MockFlightProvider>,
        resolver: &Arc<MockLocationResolver>,
        max_parallel_searches: usize,
    ) -> FlightSearchOrchestrator {
        FlightSearchOrchestrator::new(
            provider.clone(),
            resolver.clone(),
            SearchSettings {
                max_parallel_searches,
                provider_timeout: Duration::from_secs(1),
            },
        )
    }

    fn offer(departure: &str, price: f64) -> RawOffer {
        fixtures::direct_offer("AA", departure, "2025-06-08T18:00:00", price)
    }

    #[test]
    fn test_cheapest_first_minimum_wins() {
        let offers = vec![
            offer("2025-06-01T09:00:00", 300.0),
            offer("2025-06-01T10:00:00", 200.0),
            offer("2025-06-01T11:00:00", 200.0),
            offer("2025-06-01T12:00:00", 250.0),
        ];
        let best = cheapest(offers.iter()).unwrap();
        assert_eq!(best.outbound.departure_at(), "2025-06-01T10:00:00");
        assert!(cheapest(std::iter::empty()).is_none());
    }

    #[tokio::test]
    async fn test_full_cross_product_is_searched() {
        let provider = Arc::new(MockFlightProvider::new());
        let resolver = Arc::new(MockLocationResolver::new());
        let submission = fixtures::submission(&[("Ana", "JFK"), ("Ben", "LAX")], &["CUN", "MIA", "SJU"]);

        orchestrator(&provider, &resolver, 1)
            .search("job-1", &submission)
            .await
            .unwrap();

        let queries = provider.recorded_queries().await;
        assert_eq!(queries.len(), 6);
        let routes: Vec<(String, String)> = queries
            .iter()
            .map(|q| (q.origin.clone(), q.destination.clone()))
            .collect();
        for origin in ["JFK", "LAX"] {
            for destination in ["CUN", "MIA", "SJU"] {
                assert!(routes.contains(&(origin.to_string(), destination.to_string())));
            }
        }
        assert!(queries.iter().all(|q| q.adults == 1));
        assert!(queries.iter().all(|q| q.departure_date == "2025-06-01"));
        assert!(queries.iter().all(|q| q.return_date == "2025-06-08"));
    }

    #[tokio::test]
    async fn test_names_resolved_once_with_fallback() {
        let provider = Arc::new(MockFlightProvider::new());
        let resolver = Arc::new(MockLocationResolver::new());
        resolver.set_name("CUN", "Cancun").await;
        resolver.set_error("MIA").await;
        let submission = fixtures::submission(&[("Ana", "JFK"), ("Ben", "LAX")], &["CUN", "MIA"]);

        let results = orchestrator(&provider, &resolver, 1)
            .search("job-1", &submission)
            .await
            .unwrap();

        assert_eq!(results[0].destination, "CUN");
        assert_eq!(results[0].destination_name, "Cancun");
        assert_eq!(results[1].destination, "MIA");
        assert_eq!(results[1].destination_name, "MIA");
        assert_eq!(resolver.lookup_count().await, 2);
    }

    #[tokio::test]
    async fn test_cheapest_qualifying_offer_selected() {
        let provider = Arc::new(MockFlightProvider::new());
        let resolver = Arc::new(MockLocationResolver::new());
        provider
            .set_offers(
                "JFK",
                "CUN",
                vec![
                    offer("2025-06-01T06:00:00", 100.0),
                    offer("2025-06-01T09:00:00", 300.0),
                    offer("2025-06-01T10:00:00", 250.0),
                ],
            )
            .await;

        let mut submission = fixtures::submission(&[("Ana", "JFK")], &["CUN"]);
        submission.travelers[0].filters.outbound_departure =
            Some(TimeWindow::new("08:00", "12:00"));

        let results = orchestrator(&provider, &resolver, 1)
            .search("job-1", &submission)
            .await
            .unwrap();

        let flights = &results[0].flights;
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].total_price, 250.0);
        assert_eq!(flights[0].outbound.departure_time, "2025-06-01T10:00:00");
    }

    #[tokio::test]
    async fn test_provider_failure_skips_only_that_pair() {
        let provider = Arc::new(MockFlightProvider::new());
        let resolver = Arc::new(MockLocationResolver::new());
        provider
            .set_offers("JFK", "CUN", vec![offer("2025-06-01T09:00:00", 300.0)])
            .await;
        provider
            .set_offers("JFK", "MIA", vec![offer("2025-06-01T09:00:00", 150.0)])
            .await;
        provider
            .set_offers("LAX", "MIA", vec![offer("2025-06-01T09:00:00", 180.0)])
            .await;
        provider.set_route_error("LAX", "CUN", "upstream 500").await;

        let submission = fixtures::submission(&[("Ana", "JFK"), ("Ben", "LAX")], &["CUN", "MIA"]);
        let results = orchestrator(&provider, &resolver, 1)
            .search("job-1", &submission)
            .await
            .unwrap();

        assert_eq!(results[0].flights.len(), 1);
        assert_eq!(results[0].flights[0].traveler_name, "Ana");
        assert_eq!(results[1].flights.len(), 2);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out_pair() {
        let provider = Arc::new(MockFlightProvider::new());
        let resolver = Arc::new(MockLocationResolver::new());
        provider
            .set_offers("JFK", "CUN", vec![offer("2025-06-01T09:00:00", 300.0)])
            .await;
        provider
            .set_offers("LAX", "CUN", vec![offer("2025-06-01T09:00:00", 200.0)])
            .await;
        provider
            .set_route_delay("LAX", "CUN", Duration::from_secs(5))
            .await;

        let submission = fixtures::submission(&[("Ana", "JFK"), ("Ben", "LAX")], &["CUN"]);
        let results = orchestrator(&provider, &resolver, 1)
            .search("job-1", &submission)
            .await
            .unwrap();

        assert_eq!(results[0].flights.len(), 1);
        assert_eq!(results[0].flights[0].origin, "JFK");
    }

    #[tokio::test]
    async fn test_search_runs_on_spawned_task() {
        let provider = Arc::new(MockFlightProvider::new());
        let resolver = Arc::new(MockLocationResolver::new());
        for origin in ["JFK", "LAX"] {
            for destination in ["CUN", "MIA"] {
                provider
                    .set_offers(origin, destination, vec![offer("2025-06-01T09:00:00", 250.0)])
                    .await;
            }
        }

        let search = Arc::new(orchestrator(&provider, &resolver, 3));
        let submission = fixtures::submission(&[("Ana", "JFK"), ("Ben", "LAX")], &["CUN", "MIA"]);

        let handle = tokio::spawn({
            let search = Arc::clone(&search);
            async move { search.search("job-1", &submission).await }
        });
        let results = handle.await.unwrap().unwrap();

        assert_eq!(provider.search_count().await, 4);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|d| d.flights.len() == 2));
    }

    #[tokio::test]
    async fn test_parallel_search_keeps_traveler_order() {
        let provider = Arc::new(MockFlightProvider::new());
        let resolver = Arc::new(MockLocationResolver::new());
        let travelers = [("Ana", "JFK"), ("Ben", "LAX"), ("Cy", "ORD"), ("Di", "SEA")];
        for (i, (_, origin)) in travelers.iter().enumerate() {
            provider
                .set_offers(origin, "CUN", vec![offer("2025-06-01T09:00:00", 100.0 + i as f64)])
                .await;
            // Earlier travelers answer last.
            provider
                .set_route_delay(origin, "CUN", Duration::from_millis(40 * (4 - i as u64)))
                .await;
        }

        let submission = fixtures::submission(&travelers, &["CUN"]);
        let results = orchestrator(&provider, &resolver, 4)
            .search("job-1", &submission)
            .await
            .unwrap();

        let names: Vec<&str> = results[0]
            .flights
            .iter()
            .map(|f| f.traveler_name.as_str())
            .collect();
        assert_eq!(names, vec!["Ana", "Ben", "Cy", "Di"]);
    }

    #[tokio::test]
    async fn test_malformed_duration_is_fatal() {
        let provider = Arc::new(MockFlightProvider::new());
        let resolver = Arc::new(MockLocationResolver::new());
        let mut bad = offer("2025-06-01T09:00:00", 300.0);
        bad.outbound.duration = "PT".to_string();
        provider.set_offers("JFK", "CUN", vec![bad]).await;

        let submission = fixtures::submission(&[("Ana", "JFK")], &["CUN"]);
        let err = orchestrator(&provider, &resolver, 1)
            .search("job-1", &submission)
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::MalformedDuration { .. }));
    }

    #[tokio::test]
    async fn test_excluded_airlines_forwarded() {
        let provider = Arc::new(MockFlightProvider::new());
        let resolver = Arc::new(MockLocationResolver::new());
        let mut submission = fixtures::submission(&[("Ana", "JFK"), ("Ben", "LAX")], &["CUN"]);
        submission.travelers[0].filters.excluded_airlines = vec!["NK".to_string()];
        submission.travelers[0].filters.non_stop_only = true;

        orchestrator(&provider, &resolver, 1)
            .search("job-1", &submission)
            .await
            .unwrap();

        let queries = provider.recorded_queries().await;
        let ana = queries.iter().find(|q| q.origin == "JFK").unwrap();
        let ben = queries.iter().find(|q| q.origin == "LAX").unwrap();
        assert_eq!(ana.excluded_airlines, Some(vec!["NK".to_string()]));
        assert!(ana.non_stop);
        assert_eq!(ben.excluded_airlines, None);
        assert!(!ben.non_stop);
    }
}
