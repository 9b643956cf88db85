//! Portfolio-level tariff metrics and competitiveness analysis

use crate::tariff::{OwnershipType, Tariff, TariffStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cumulative counts of tariffs expiring inside each lookahead window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryBuckets {
    /// Expiring within 30 days
    pub next_30_days: usize,
    /// Expiring within 60 days (includes the 30-day bucket)
    pub next_60_days: usize,
    /// Expiring within 90 days (includes the 60-day bucket)
    pub next_90_days: usize,
}

/// Tariff counts per ownership type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipCounts {
    pub customer_direct: usize,
    pub rocket_csp: usize,
    pub customer_csp: usize,
    pub rocket_blanket: usize,
    pub priority1_blanket: usize,
}

impl OwnershipCounts {
    fn record(&mut self, ownership: OwnershipType) {
        match ownership {
            OwnershipType::CustomerDirect => self.customer_direct += 1,
            OwnershipType::RocketCsp => self.rocket_csp += 1,
            OwnershipType::CustomerCsp => self.customer_csp += 1,
            OwnershipType::RocketBlanket => self.rocket_blanket += 1,
            OwnershipType::Priority1Blanket => self.priority1_blanket += 1,
        }
    }

    /// Count for one ownership type
    pub fn count(&self, ownership: OwnershipType) -> usize {
        match ownership {
            OwnershipType::CustomerDirect => self.customer_direct,
            OwnershipType::RocketCsp => self.rocket_csp,
            OwnershipType::CustomerCsp => self.customer_csp,
            OwnershipType::RocketBlanket => self.rocket_blanket,
            OwnershipType::Priority1Blanket => self.priority1_blanket,
        }
    }
}

/// Aggregate portfolio metrics over a tariff collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffMetrics {
    /// Total records seen
    pub total: usize,

    /// Active status with expiry (if any) still in the future
    pub active: usize,

    /// Expired status, or a reached expiry date
    pub expired: usize,

    /// Counts per ownership type
    pub by_ownership: OwnershipCounts,

    /// Cumulative expiry lookahead buckets
    pub expiring: ExpiryBuckets,
}

/// Reduce a tariff collection to portfolio metrics as of `today`
pub fn calculate_tariff_metrics(tariffs: &[Tariff], today: NaiveDate) -> TariffMetrics {
    tariffs.iter().fold(TariffMetrics::default(), |mut m, t| {
        m.total += 1;
        m.by_ownership.record(t.ownership_type);

        if t.is_currently_active(today) {
            m.active += 1;
        }
        if t.status == TariffStatus::Expired || t.is_date_expired(today) {
            m.expired += 1;
        }

        if let Some(days) = t.days_until_expiry(today) {
            if days > 0 {
                if days <= 30 {
                    m.expiring.next_30_days += 1;
                }
                if days <= 60 {
                    m.expiring.next_60_days += 1;
                }
                if days <= 90 {
                    m.expiring.next_90_days += 1;
                }
            }
        }

        m
    })
}

/// Coverage ratios of blanket and CSP tariffs against customer-direct ones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitivenessAnalysis {
    pub direct_count: usize,
    pub blanket_count: usize,
    pub csp_count: usize,

    /// blanket_count / direct_count (denominator clamped to 1)
    pub blanket_ratio: f64,

    /// csp_count / direct_count (denominator clamped to 1)
    pub csp_ratio: f64,

    /// Qualitative findings worth surfacing on a dashboard
    pub recommendations: Vec<String>,
}

/// Compare blanket/CSP coverage against the customer-direct book
///
/// A portfolio with no direct tariffs is treated as having a denominator of
/// one so the ratios stay finite.
pub fn analyze_tariff_competitiveness(
    direct: &[Tariff],
    blanket: &[Tariff],
    csp: &[Tariff],
) -> CompetitivenessAnalysis {
    let direct_count = direct.len();
    let blanket_count = blanket.len();
    let csp_count = csp.len();

    let denominator = direct_count.max(1) as f64;
    let blanket_ratio = blanket_count as f64 / denominator;
    let csp_ratio = csp_count as f64 / denominator;

    let mut recommendations = Vec::new();
    if blanket_ratio < 0.30 {
        recommendations.push(format!(
            "Blanket coverage is {:.0}% of the direct book; expanding blanket \
             pricing would reduce dependence on customer-negotiated rates",
            blanket_ratio * 100.0
        ));
    } else if blanket_ratio > 0.60 {
        recommendations.push(format!(
            "Blanket coverage at {:.0}% of the direct book gives strong \
             pricing leverage across the customer pool",
            blanket_ratio * 100.0
        ));
    }

    CompetitivenessAnalysis {
        direct_count,
        blanket_count,
        csp_count,
        blanket_ratio,
        csp_ratio,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn tariff(
        id: &str,
        status: TariffStatus,
        ownership: OwnershipType,
        expiry: Option<NaiveDate>,
    ) -> Tariff {
        let mut t = Tariff::new(id, "1", status, ownership);
        t.expiry_date = expiry;
        t
    }

    #[test]
    fn test_metrics_buckets_are_cumulative() {
        let tariffs = vec![
            tariff(
                "t-1",
                TariffStatus::Active,
                OwnershipType::CustomerDirect,
                Some(today() + Duration::days(45)),
            ),
            tariff("t-2", TariffStatus::Proposed, OwnershipType::RocketCsp, None),
            tariff(
                "t-3",
                TariffStatus::Expired,
                OwnershipType::CustomerDirect,
                Some(today() - Duration::days(10)),
            ),
        ];

        let metrics = calculate_tariff_metrics(&tariffs, today());
        assert_eq!(metrics.total, 3);
        assert_eq!(metrics.active, 1);
        assert_eq!(metrics.expired, 1);
        assert_eq!(metrics.expiring.next_30_days, 0);
        assert_eq!(metrics.expiring.next_60_days, 1);
        assert_eq!(metrics.expiring.next_90_days, 1);
        assert_eq!(metrics.by_ownership.customer_direct, 2);
        assert_eq!(metrics.by_ownership.rocket_csp, 1);
    }

    #[test]
    fn test_active_status_with_past_expiry_counts_expired() {
        let tariffs = vec![tariff(
            "t-1",
            TariffStatus::Active,
            OwnershipType::CustomerDirect,
            Some(today() - Duration::days(1)),
        )];

        let metrics = calculate_tariff_metrics(&tariffs, today());
        assert_eq!(metrics.active, 0);
        assert_eq!(metrics.expired, 1);
    }

    #[test]
    fn test_competitiveness_zero_direct_denominator() {
        let blanket = vec![tariff(
            "t-1",
            TariffStatus::Active,
            OwnershipType::RocketBlanket,
            None,
        )];
        let analysis = analyze_tariff_competitiveness(&[], &blanket, &[]);
        assert_eq!(analysis.direct_count, 0);
        assert_relative_eq!(analysis.blanket_ratio, 1.0);
    }

    #[test]
    fn test_competitiveness_recommendations() {
        let direct: Vec<Tariff> = (0..10)
            .map(|i| {
                tariff(
                    &format!("d-{}", i),
                    TariffStatus::Active,
                    OwnershipType::CustomerDirect,
                    None,
                )
            })
            .collect();

        let low_blanket: Vec<Tariff> = (0..2)
            .map(|i| {
                tariff(
                    &format!("b-{}", i),
                    TariffStatus::Active,
                    OwnershipType::RocketBlanket,
                    None,
                )
            })
            .collect();

        let analysis = analyze_tariff_competitiveness(&direct, &low_blanket, &[]);
        assert_relative_eq!(analysis.blanket_ratio, 0.2);
        assert_eq!(analysis.recommendations.len(), 1);
        assert!(analysis.recommendations[0].contains("expanding blanket"));

        let high_blanket: Vec<Tariff> = (0..7)
            .map(|i| {
                tariff(
                    &format!("b-{}", i),
                    TariffStatus::Active,
                    OwnershipType::RocketBlanket,
                    None,
                )
            })
            .collect();

        let analysis = analyze_tariff_competitiveness(&direct, &high_blanket, &[]);
        assert_relative_eq!(analysis.blanket_ratio, 0.7);
        assert!(analysis.recommendations[0].contains("pricing leverage"));

        let mid_blanket: Vec<Tariff> = (0..5)
            .map(|i| {
                tariff(
                    &format!("b-{}", i),
                    TariffStatus::Active,
                    OwnershipType::RocketBlanket,
                    None,
                )
            })
            .collect();

        let analysis = analyze_tariff_competitiveness(&direct, &mid_blanket, &[]);
        assert!(analysis.recommendations.is_empty());
    }
}
