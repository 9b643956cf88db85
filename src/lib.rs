//! Tariff System - Lifecycle and expiry-risk engine for freight brokerage pricing agreements
//!
//! This library provides:
//! - Tariff family grouping (customer/carrier groups, live vs. archived families)
//! - Expiry risk scoring and carrier blocker detection
//! - Portfolio metrics and competitiveness analysis
//! - Lifecycle mutations with advisory family invariants
//! - Fixed-column CSV export of tariff snapshots

pub mod export;
pub mod grouping;
pub mod lifecycle;
pub mod reference;
pub mod risk;
pub mod tariff;

// Re-export commonly used types
pub use grouping::{FamilyView, GroupView, GroupingConfig, GroupingEngine, StatusFilter};
pub use lifecycle::{LifecycleService, SaveOutcome, TariffDraft};
pub use reference::ReferenceData;
pub use risk::{assess_risk_level, RiskAssessment, RiskLevel};
pub use tariff::{OwnershipType, Tariff, TariffStatus};
