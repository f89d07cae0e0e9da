use serde::{Deserialize, Serialize};

/// Price summary over one destination's traveler totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub currency: String,
    /// Per-traveler totals, in traveler order.
    pub individual_totals: Vec<f64>,
    pub total: f64,
    pub average: f64,
    pub median: f64,
    pub cheapest: f64,
    pub most_expensive: f64,
}

impl GroupStats {
    /// Summarize `totals`. Returns `None` for an empty slice.
    pub fn from_totals(totals: &[f64], currency: impl Into<String>) -> Option<Self> {
        if totals.is_empty() {
            return None;
        }

        let total: f64 = totals.iter().sum();
        let mut sorted = totals.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            currency: currency.into(),
            individual_totals: totals.to_vec(),
            total,
            average: total / totals.len() as f64,
            median,
            cheapest: sorted[0],
            most_expensive: sorted[sorted.len() - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_count() {
        let stats = GroupStats::from_totals(&[300.0, 100.0, 200.0], "USD").unwrap();
        assert_eq!(stats.individual_totals, vec![300.0, 100.0, 200.0]);
        assert_eq!(stats.total, 600.0);
        assert_eq!(stats.average, 200.0);
        assert_eq!(stats.median, 200.0);
        assert_eq!(stats.cheapest, 100.0);
        assert_eq!(stats.most_expensive, 300.0);
    }

    #[test]
    fn test_even_count_median_is_midpoint() {
        let stats = GroupStats::from_totals(&[400.0, 100.0, 300.0, 200.0], "EUR").unwrap();
        assert_eq!(stats.median, 250.0);
        assert_eq!(stats.average, 250.0);
        assert_eq!(stats.currency, "EUR");
    }

    #[test]
    fn test_single_traveler() {
        let stats = GroupStats::from_totals(&[412.5], "USD").unwrap();
        assert_eq!(stats.total, 412.5);
        assert_eq!(stats.median, 412.5);
        assert_eq!(stats.cheapest, stats.most_expensive);
    }

    #[test]
    fn test_empty_is_none() {
        assert!(GroupStats::from_totals(&[], "USD").is_none());
    }

    #[test]
    fn test_ordering_invariants() {
        let totals = [812.4, 95.0, 433.3, 433.3, 1200.0];
        let stats = GroupStats::from_totals(&totals, "USD").unwrap();

        let sum: f64 = totals.iter().sum();
        assert_eq!(stats.total, sum);
        assert!((stats.average - sum / 5.0).abs() < 1e-9);
        assert!(stats.cheapest <= stats.median && stats.median <= stats.most_expensive);
        assert!(stats.cheapest <= stats.average && stats.average <= stats.most_expensive);
        assert_eq!(stats.median, 433.3);
    }
}
