//! Per-traveler offer filtering.

use crate::provider::RawOffer;
use crate::submission::{Filters, TimeWindow};

/// Returns true if `offer` satisfies every constraint in `filters`.
///
/// Stops are checked per leg against `max_stops`. Each time window is
/// matched against the local time of the relevant segment endpoint; absent
/// windows always pass. The non-stop and airline exclusions are sent to the
/// provider and are not re-checked here.
pub fn passes_filters(offer: &RawOffer, filters: &Filters) -> bool {
    let outbound = &offer.outbound;
    let inbound = &offer.inbound;

    outbound.stops() <= filters.max_stops
        && inbound.stops() <= filters.max_stops
        && in_time_window(outbound.departure_at(), filters.outbound_departure.as_ref())
        && in_time_window(outbound.arrival_at(), filters.outbound_arrival.as_ref())
        && in_time_window(inbound.departure_at(), filters.return_departure.as_ref())
        && in_time_window(inbound.arrival_at(), filters.return_arrival.as_ref())
}

/// Returns true if the `HH:MM` part of `timestamp` lies inside `window`.
///
/// A timestamp with no `T` separator never matches a present window.
pub fn in_time_window(timestamp: &str, window: Option<&TimeWindow>) -> bool {
    let Some(window) = window else {
        return true;
    };

    match clock_time(timestamp) {
        Some(hhmm) => window.contains(hhmm),
        None => false,
    }
}

/// The five characters after `T`, e.g. `10:40` from `2024-11-01T10:40:00`.
fn clock_time(timestamp: &str) -> Option<&str> {
    let (_, time) = timestamp.split_once('T')?;
    time.get(..5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn window(earliest: &str, latest: &str) -> Option<TimeWindow> {
        Some(TimeWindow::new(earliest, latest))
    }

    #[test]
    fn test_window_is_inclusive() {
        let w = TimeWindow::new("08:00", "12:00");
        assert!(in_time_window("2025-06-01T08:00:00", Some(&w)));
        assert!(in_time_window("2025-06-01T12:00:00", Some(&w)));
        assert!(in_time_window("2025-06-01T10:40:00", Some(&w)));
        assert!(!in_time_window("2025-06-01T07:59:00", Some(&w)));
        assert!(!in_time_window("2025-06-01T12:01:00", Some(&w)));
    }

    #[test]
    fn test_absent_window_passes() {
        assert!(in_time_window("2025-06-01T03:00:00", None));
        assert!(in_time_window("garbage", None));
    }

    #[test]
    fn test_timestamp_without_time_fails_present_window() {
        let w = TimeWindow::new("00:00", "23:59");
        assert!(!in_time_window("2025-06-01", Some(&w)));
        assert!(!in_time_window("2025-06-01T9", Some(&w)));
    }

    #[test]
    fn test_default_filters_pass_direct_offer() {
        let offer = fixtures::direct_offer("AA", "2025-06-01T09:00:00", "2025-06-08T18:00:00", 300.0);
        assert!(passes_filters(&offer, &Filters::default()));
    }

    #[test]
    fn test_max_stops_applies_to_each_leg() {
        let mut offer =
            fixtures::direct_offer("AA", "2025-06-01T09:00:00", "2025-06-08T18:00:00", 300.0);
        offer.inbound.segments.push(offer.inbound.segments[0].clone());

        let mut filters = Filters::default();
        assert!(!passes_filters(&offer, &filters));

        filters.max_stops = 1;
        assert!(passes_filters(&offer, &filters));
    }

    #[test]
    fn test_each_window_checks_its_endpoint() {
        // Outbound 09:00 -> 12:00, return 18:00 -> 21:00.
        let offer = fixtures::direct_offer("AA", "2025-06-01T09:00:00", "2025-06-08T18:00:00", 300.0);

        let cases = [
            (Filters { outbound_departure: window("10:00", "11:00"), ..Filters::default() }, false),
            (Filters { outbound_departure: window("09:00", "09:00"), ..Filters::default() }, true),
            (Filters { outbound_arrival: window("06:00", "11:59"), ..Filters::default() }, false),
            (Filters { outbound_arrival: window("12:00", "13:00"), ..Filters::default() }, true),
            (Filters { return_departure: window("19:00", "23:00"), ..Filters::default() }, false),
            (Filters { return_departure: window("17:00", "18:00"), ..Filters::default() }, true),
            (Filters { return_arrival: window("00:00", "20:59"), ..Filters::default() }, false),
            (Filters { return_arrival: window("21:00", "23:59"), ..Filters::default() }, true),
        ];

        for (filters, expected) in cases {
            assert_eq!(passes_filters(&offer, &filters), expected, "{:?}", filters);
        }
    }

    #[test]
    fn test_adding_constraints_never_admits_more_offers() {
        let offers = vec![
            fixtures::direct_offer("AA", "2025-06-01T06:00:00", "2025-06-08T08:00:00", 100.0),
            fixtures::direct_offer("AA", "2025-06-01T09:00:00", "2025-06-08T13:00:00", 200.0),
            fixtures::direct_offer("AA", "2025-06-01T15:00:00", "2025-06-08T19:00:00", 300.0),
            fixtures::one_stop_offer("DL", "2025-06-01T10:00:00", "2025-06-08T14:00:00", 150.0),
        ];

        let loose = Filters {
            max_stops: 1,
            ..Filters::default()
        };
        let tighter = Filters {
            outbound_departure: window("08:00", "16:00"),
            ..loose.clone()
        };
        let tightest = Filters {
            max_stops: 0,
            return_arrival: window("12:00", "23:00"),
            ..tighter.clone()
        };

        let survivors = |f: &Filters| -> Vec<usize> {
            offers
                .iter()
                .enumerate()
                .filter(|(_, o)| passes_filters(o, f))
                .map(|(i, _)| i)
                .collect()
        };

        let a = survivors(&loose);
        let b = survivors(&tighter);
        let c = survivors(&tightest);
        assert!(b.iter().all(|i| a.contains(i)));
        assert!(c.iter().all(|i| b.contains(i)));
        assert_eq!(a.len(), 4);
        assert_eq!(b, vec![1, 2, 3]);
        assert_eq!(c, vec![1, 2]);
    }
}
