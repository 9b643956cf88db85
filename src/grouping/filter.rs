//! Status filters, search matching, and status ranking for the tariff tables

use crate::reference::ReferenceData;
use crate::tariff::{Tariff, TariffStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Visibility filter applied to tariff versions before grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Anything live: active, proposed, or expiring within the window
    All,
    /// Active and not past its expiry date
    Active,
    Proposed,
    /// Expiry inside the lookahead window
    Expiring,
    /// Expired status, or a reached expiry date
    Expired,
    Superseded,
}

impl StatusFilter {
    /// Whether a tariff is visible under this filter as of `today`
    pub fn matches(&self, tariff: &Tariff, today: NaiveDate, window_days: i64) -> bool {
        match self {
            StatusFilter::All => {
                matches!(
                    tariff.status,
                    TariffStatus::Active | TariffStatus::Proposed
                ) || tariff.is_expiring_within(today, window_days)
            }
            StatusFilter::Active => tariff.is_currently_active(today),
            StatusFilter::Proposed => tariff.status == TariffStatus::Proposed,
            StatusFilter::Expiring => tariff.is_expiring_within(today, window_days),
            StatusFilter::Expired => {
                tariff.status == TariffStatus::Expired || tariff.is_date_expired(today)
            }
            StatusFilter::Superseded => tariff.status == TariffStatus::Superseded,
        }
    }
}

/// Sort rank for the computed display status
///
/// Active(1) < Expiring(2) < Proposed(3) < Expired(4) < Superseded(5).
/// A reached expiry date outranks the stored status for everything except
/// superseded versions.
pub fn status_rank(tariff: &Tariff, today: NaiveDate, window_days: i64) -> u8 {
    if tariff.status == TariffStatus::Superseded {
        5
    } else if tariff.status == TariffStatus::Expired || tariff.is_date_expired(today) {
        4
    } else if tariff.status == TariffStatus::Proposed {
        3
    } else if tariff.is_expiring_within(today, window_days) {
        2
    } else {
        1
    }
}

/// Parsed free-text search over tariff rows
///
/// Matching is case-insensitive substring over customer names, carrier
/// names, version, reference id, family id, and linked CSP event titles.
/// A `customer:` prefix restricts matching to customer names only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
    customer_only: bool,
}

impl SearchQuery {
    /// Parse a raw search box value; empty input means no search
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(rest) = trimmed.strip_prefix("customer:") {
            let term = rest.trim().to_lowercase();
            if term.is_empty() {
                return None;
            }
            return Some(Self {
                term,
                customer_only: true,
            });
        }

        Some(Self {
            term: trimmed.to_lowercase(),
            customer_only: false,
        })
    }

    /// Whether a tariff row matches this query
    pub fn matches(&self, tariff: &Tariff, refs: &ReferenceData) -> bool {
        let customer_hit = tariff
            .all_customer_ids()
            .iter()
            .any(|id| self.contains(refs.customer_name(id)));

        if self.customer_only {
            return customer_hit;
        }
        if customer_hit {
            return true;
        }

        if tariff
            .all_carrier_ids()
            .iter()
            .any(|id| self.contains(refs.carrier_name(id)))
        {
            return true;
        }

        if self.contains(&tariff.version) {
            return true;
        }
        if let Some(ref reference) = tariff.tariff_reference_id {
            if self.contains(reference) {
                return true;
            }
        }
        if let Some(ref family) = tariff.tariff_family_id {
            if self.contains(family) {
                return true;
            }
        }

        let event_title = refs.event_title(tariff.csp_event_id.as_deref());
        if !event_title.is_empty() && self.contains(event_title) {
            return true;
        }
        let renewal_title = refs.event_title(tariff.renewal_csp_event_id.as_deref());
        !renewal_title.is_empty() && self.contains(renewal_title)
    }

    fn contains(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.term)
    }
}
