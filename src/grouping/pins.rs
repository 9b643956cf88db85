//! User pin records and the resolved pin set consulted during grouping

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a pin record points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinType {
    /// Pins a whole customer/carrier group to the top of the table
    Customer,
    /// Pins one tariff family within its group
    TariffFamily,
}

/// A persisted pin, keyed (user, type, ref) in the pin store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRecord {
    pub user_id: String,
    pub pin_type: PinType,
    pub ref_id: String,
}

/// One user's pins resolved into fast lookup sets
#[derive(Debug, Clone, Default)]
pub struct PinSet {
    groups: HashSet<String>,
    families: HashSet<String>,
}

impl PinSet {
    /// Build the pin set for one user from raw pin records
    pub fn from_records(user_id: &str, records: &[PinRecord]) -> Self {
        let mut set = Self::default();
        for record in records {
            if record.user_id != user_id {
                continue;
            }
            match record.pin_type {
                PinType::Customer => {
                    set.groups.insert(record.ref_id.clone());
                }
                PinType::TariffFamily => {
                    set.families.insert(record.ref_id.clone());
                }
            }
        }
        set
    }

    pub fn is_group_pinned(&self, key: &str) -> bool {
        self.groups.contains(key)
    }

    pub fn is_family_pinned(&self, family_id: &str) -> bool {
        self.families.contains(family_id)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.families.is_empty()
    }
}
