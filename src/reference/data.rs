//! Reference collections: customers, carriers, and CSP events
//!
//! These are small lookup tables loaded in full; the engine only ever
//! resolves ids to display names and event titles through them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A brokerage customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer identifier
    pub id: String,

    /// Display name
    pub name: String,
}

/// A freight carrier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carrier {
    /// Unique carrier identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Standard Carrier Alpha Code, when known
    #[serde(default)]
    pub scac: Option<String>,
}

/// A carrier-sourcing-program negotiation event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CspEvent {
    /// Unique event identifier
    pub id: String,

    /// Event title shown in search and exports
    pub title: String,

    /// Free-form event status (e.g. "open", "awarded")
    #[serde(default)]
    pub status: Option<String>,

    /// Family this event was opened to renew, if it is a renewal event
    #[serde(default)]
    pub renewal_for_family_id: Option<String>,
}

/// Container for all reference collections with id-keyed lookup
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    customers: HashMap<String, Customer>,
    carriers: HashMap<String, Carrier>,
    csp_events: HashMap<String, CspEvent>,
}

impl ReferenceData {
    pub fn new(
        customers: Vec<Customer>,
        carriers: Vec<Carrier>,
        csp_events: Vec<CspEvent>,
    ) -> Self {
        Self {
            customers: customers.into_iter().map(|c| (c.id.clone(), c)).collect(),
            carriers: carriers.into_iter().map(|c| (c.id.clone(), c)).collect(),
            csp_events: csp_events.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn carrier(&self, id: &str) -> Option<&Carrier> {
        self.carriers.get(id)
    }

    pub fn csp_event(&self, id: &str) -> Option<&CspEvent> {
        self.csp_events.get(id)
    }

    /// Customer display name, or a stable fallback for unknown ids
    pub fn customer_name(&self, id: &str) -> &str {
        self.customers
            .get(id)
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown Customer")
    }

    /// Carrier display name, or a stable fallback for unknown ids
    pub fn carrier_name(&self, id: &str) -> &str {
        self.carriers
            .get(id)
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown Carrier")
    }

    /// Joined display names for a carrier id list
    pub fn carrier_names(&self, ids: &[&str]) -> String {
        ids.iter()
            .map(|id| self.carrier_name(id))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// CSP event title, empty string when the id is unknown or absent
    pub fn event_title(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.csp_events.get(id))
            .map(|e| e.title.as_str())
            .unwrap_or("")
    }

    pub fn carriers(&self) -> impl Iterator<Item = &Carrier> {
        self.carriers.values()
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn carrier_count(&self) -> usize {
        self.carriers.len()
    }
}
