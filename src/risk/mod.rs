//! Risk and metrics calculators
//!
//! Pure, total functions over in-memory tariff collections. The valuation
//! date is always an explicit argument; absent optional fields (missing
//! expiry dates, empty collections) take their own branch rather than
//! raising an error.

mod assessment;
mod blockers;
mod metrics;

pub use assessment::{assess_risk_level, RiskAssessment, RiskLevel};
pub use blockers::{
    find_expiration_opportunities, identify_carrier_blockers, CarrierBlocker,
    ExpirationOpportunity, OpportunityPriority, DEFAULT_OPPORTUNITY_WINDOW_DAYS,
};
pub use metrics::{
    analyze_tariff_competitiveness, calculate_tariff_metrics, CompetitivenessAnalysis,
    ExpiryBuckets, OwnershipCounts, TariffMetrics,
};
