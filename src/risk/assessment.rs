//! Expiry risk scoring for individual tariff versions

use crate::tariff::Tariff;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Risk tier derived from days until expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// No expiry date on file, risk cannot be assessed
    Unknown,
    /// Already expired (or expires today)
    Critical,
    /// Expires within 30 days
    High,
    /// Expires within 60 days
    Medium,
    /// Expires within 90 days
    Low,
    /// Expiry more than 90 days out
    None,
}

impl RiskLevel {
    /// Get the string representation used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Unknown => "unknown",
            RiskLevel::Critical => "critical",
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
            RiskLevel::None => "none",
        }
    }
}

/// Risk tier plus a human-readable explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub message: String,
}

/// Score a tariff's expiry risk as of `today`
///
/// Thresholds: expired or expiring today is critical, then 30/60/90-day
/// tiers, and anything further out carries no expiry risk. A tariff with
/// no expiry date cannot be assessed and comes back as unknown.
pub fn assess_risk_level(tariff: &Tariff, today: NaiveDate) -> RiskAssessment {
    let days = match tariff.days_until_expiry(today) {
        Some(days) => days,
        None => {
            return RiskAssessment {
                level: RiskLevel::Unknown,
                message: "No expiry date on file".to_string(),
            }
        }
    };

    if days < 0 {
        RiskAssessment {
            level: RiskLevel::Critical,
            message: format!("Expired {} days ago", -days),
        }
    } else if days == 0 {
        RiskAssessment {
            level: RiskLevel::Critical,
            message: "Expires today".to_string(),
        }
    } else if days <= 30 {
        RiskAssessment {
            level: RiskLevel::High,
            message: format!("Expires in {} days", days),
        }
    } else if days <= 60 {
        RiskAssessment {
            level: RiskLevel::Medium,
            message: format!("Expires in {} days", days),
        }
    } else if days <= 90 {
        RiskAssessment {
            level: RiskLevel::Low,
            message: format!("Expires in {} days", days),
        }
    } else {
        RiskAssessment {
            level: RiskLevel::None,
            message: format!("Expires in {} days", days),
        }
    }
}
