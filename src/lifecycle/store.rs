//! Store seams for the external data platform
//!
//! The engine never talks to the network itself; it goes through these
//! traits. Each call is one round trip with no transaction spanning calls,
//! matching the backing platform's CRUD contract.

use crate::grouping::PinRecord;
use crate::tariff::Tariff;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Failure from the backing data platform
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// One audit-trail entry; the backend stamps the timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Action slug, e.g. "tariff_created", "renewal_linked"
    pub action: String,

    /// Primary entity the action touched
    pub entity_id: String,

    /// Human-readable detail line
    pub detail: String,

    /// Acting user, when known
    pub user_id: Option<String>,
}

/// CRUD over tariff records
pub trait TariffStore {
    fn list(&self) -> Result<Vec<Tariff>, StoreError>;

    /// All versions sharing a family key
    fn list_family(&self, family_key: &str) -> Result<Vec<Tariff>, StoreError>;

    fn get(&self, id: &str) -> Result<Tariff, StoreError>;

    /// Persist a new record; an empty id asks the store to assign one
    fn create(&mut self, tariff: Tariff) -> Result<Tariff, StoreError>;

    fn update(&mut self, id: &str, tariff: Tariff) -> Result<Tariff, StoreError>;

    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

/// CSP-event side of renewal linkage
pub trait EventStore {
    /// Mark an event as the renewal event for a family
    fn mark_renewal(&mut self, event_id: &str, family_id: &str) -> Result<(), StoreError>;
}

/// Append-only audit trail
pub trait ActivityLog {
    fn record(&mut self, activity: ActivityRecord) -> Result<(), StoreError>;
}

/// Pin persistence, keyed (user, type, ref)
pub trait PinStore {
    fn insert_pin(&mut self, pin: PinRecord) -> Result<(), StoreError>;

    /// Remove the pin matching the record's full triple
    fn remove_pin(&mut self, pin: &PinRecord) -> Result<(), StoreError>;

    fn pins_for(&self, user_id: &str) -> Result<Vec<PinRecord>, StoreError>;
}

/// In-memory store for tests and the demo binary
///
/// Individual tariff updates can be poisoned to exercise the partial
/// failure paths of multi-row operations.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tariffs: HashMap<String, Tariff>,
    renewal_marks: HashMap<String, String>,
    activities: Vec<ActivityRecord>,
    pins: Vec<PinRecord>,
    // id -> number of successful updates allowed before failing
    failing_updates: HashMap<String, usize>,
    update_counts: HashMap<String, usize>,
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records
    pub fn with_tariffs(tariffs: Vec<Tariff>) -> Self {
        let mut store = Self::new();
        for tariff in tariffs {
            store.tariffs.insert(tariff.id.clone(), tariff);
        }
        store
    }

    /// Make every future update of `id` fail with a backend error
    pub fn poison_updates(&mut self, id: &str) {
        self.failing_updates.insert(id.to_string(), 0);
    }

    /// Let `successes` updates of `id` through, then fail the rest
    pub fn poison_updates_after(&mut self, id: &str, successes: usize) {
        self.failing_updates.insert(id.to_string(), successes);
    }

    pub fn activities(&self) -> &[ActivityRecord] {
        &self.activities
    }

    /// Family id an event was marked as renewing, if any
    pub fn renewal_mark(&self, event_id: &str) -> Option<&str> {
        self.renewal_marks.get(event_id).map(String::as_str)
    }
}

impl TariffStore for InMemoryStore {
    fn list(&self) -> Result<Vec<Tariff>, StoreError> {
        let mut tariffs: Vec<Tariff> = self.tariffs.values().cloned().collect();
        tariffs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tariffs)
    }

    fn list_family(&self, family_key: &str) -> Result<Vec<Tariff>, StoreError> {
        let mut tariffs: Vec<Tariff> = self
            .tariffs
            .values()
            .filter(|t| t.family_key() == family_key)
            .cloned()
            .collect();
        tariffs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tariffs)
    }

    fn get(&self, id: &str) -> Result<Tariff, StoreError> {
        self.tariffs
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn create(&mut self, mut tariff: Tariff) -> Result<Tariff, StoreError> {
        if tariff.id.is_empty() {
            self.next_id += 1;
            tariff.id = format!("t-{}", self.next_id);
        }
        self.tariffs.insert(tariff.id.clone(), tariff.clone());
        Ok(tariff)
    }

    fn update(&mut self, id: &str, tariff: Tariff) -> Result<Tariff, StoreError> {
        if let Some(&allowed) = self.failing_updates.get(id) {
            let seen = self.update_counts.entry(id.to_string()).or_insert(0);
            if *seen >= allowed {
                return Err(StoreError::Backend(format!("update rejected for {}", id)));
            }
            *seen += 1;
        }
        if !self.tariffs.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.tariffs.insert(id.to_string(), tariff.clone());
        Ok(tariff)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.tariffs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl EventStore for InMemoryStore {
    fn mark_renewal(&mut self, event_id: &str, family_id: &str) -> Result<(), StoreError> {
        self.renewal_marks
            .insert(event_id.to_string(), family_id.to_string());
        Ok(())
    }
}

impl ActivityLog for InMemoryStore {
    fn record(&mut self, activity: ActivityRecord) -> Result<(), StoreError> {
        self.activities.push(activity);
        Ok(())
    }
}

impl PinStore for InMemoryStore {
    fn insert_pin(&mut self, pin: PinRecord) -> Result<(), StoreError> {
        if !self.pins.contains(&pin) {
            self.pins.push(pin);
        }
        Ok(())
    }

    fn remove_pin(&mut self, pin: &PinRecord) -> Result<(), StoreError> {
        self.pins.retain(|p| p != pin);
        Ok(())
    }

    fn pins_for(&self, user_id: &str) -> Result<Vec<PinRecord>, StoreError> {
        Ok(self
            .pins
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}
