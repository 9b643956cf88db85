//! Carrier blocker and expiration opportunity detection
//!
//! A carrier with a live customer-direct tariff cannot be targeted for
//! competitive bidding until that tariff lapses; a customer-direct tariff
//! inside the expiry window is a sourcing opportunity.

use crate::reference::Carrier;
use crate::tariff::{OwnershipType, Tariff};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default lookahead window for expiration opportunities, in days
pub const DEFAULT_OPPORTUNITY_WINDOW_DAYS: i64 = 90;

/// A carrier excluded from competitive bidding by a live direct tariff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierBlocker {
    pub carrier_id: String,
    pub carrier_name: String,

    /// The blocking tariff
    pub tariff_id: String,

    /// Days until the block lifts; None for evergreen tariffs
    pub days_until_expiry: Option<i64>,

    /// Human-readable explanation for the block
    pub reason: String,
}

/// Urgency tier for an expiring direct tariff
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityPriority {
    High,
    Medium,
    Low,
}

impl OpportunityPriority {
    fn from_days(days: i64) -> Self {
        if days <= 30 {
            OpportunityPriority::High
        } else if days <= 60 {
            OpportunityPriority::Medium
        } else {
            OpportunityPriority::Low
        }
    }
}

/// A customer-direct tariff expiring soon enough to source against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpirationOpportunity {
    pub tariff_id: String,
    pub carrier_id: String,
    pub carrier_name: String,

    /// Owning customer, when the record carries one
    pub customer_id: Option<String>,

    pub expiry_date: NaiveDate,
    pub days_until_expiry: i64,
    pub priority: OpportunityPriority,
}

fn find_carrier<'a>(carriers: &'a [Carrier], tariff: &Tariff) -> Option<&'a Carrier> {
    let ids = tariff.all_carrier_ids();
    carriers.iter().find(|c| ids.contains(&c.id.as_str()))
}

/// Identify carriers blocked by live customer-direct tariffs
///
/// Only tariffs whose carrier exists in the carrier list are considered. A
/// tariff blocks while it has no expiry date or its expiry is still in the
/// future; date-expired agreements never block.
pub fn identify_carrier_blockers(
    customer_direct_tariffs: &[Tariff],
    carriers: &[Carrier],
    today: NaiveDate,
) -> Vec<CarrierBlocker> {
    let mut blockers = Vec::new();

    for tariff in customer_direct_tariffs {
        if tariff.ownership_type != OwnershipType::CustomerDirect {
            continue;
        }
        let carrier = match find_carrier(carriers, tariff) {
            Some(c) => c,
            None => continue,
        };

        let days = tariff.days_until_expiry(today);
        let is_active = match days {
            None => true,
            Some(days) => days > 0,
        };
        if !is_active {
            continue;
        }

        let reason = match days {
            None => format!(
                "{} holds an open-ended customer-direct tariff",
                carrier.name
            ),
            Some(days) => format!(
                "{} holds a customer-direct tariff expiring in {} days",
                carrier.name, days
            ),
        };

        blockers.push(CarrierBlocker {
            carrier_id: carrier.id.clone(),
            carrier_name: carrier.name.clone(),
            tariff_id: tariff.id.clone(),
            days_until_expiry: days,
            reason,
        });
    }

    blockers
}

/// Find customer-direct tariffs expiring inside the window, most urgent first
pub fn find_expiration_opportunities(
    customer_direct_tariffs: &[Tariff],
    carriers: &[Carrier],
    today: NaiveDate,
    days_window: i64,
) -> Vec<ExpirationOpportunity> {
    let mut opportunities: Vec<ExpirationOpportunity> = customer_direct_tariffs
        .iter()
        .filter(|t| t.ownership_type == OwnershipType::CustomerDirect)
        .filter_map(|tariff| {
            let carrier = find_carrier(carriers, tariff)?;
            let expiry = tariff.expiry_date?;
            let days = tariff.days_until_expiry(today)?;
            if days <= 0 || days > days_window {
                return None;
            }
            Some(ExpirationOpportunity {
                tariff_id: tariff.id.clone(),
                carrier_id: carrier.id.clone(),
                carrier_name: carrier.name.clone(),
                customer_id: tariff.customer_id.clone(),
                expiry_date: expiry,
                days_until_expiry: days,
                priority: OpportunityPriority::from_days(days),
            })
        })
        .collect();

    opportunities.sort_by_key(|o| o.days_until_expiry);
    opportunities
}
