//! Derived per-family state
//!
//! A family is never persisted; it is recomputed from whatever versions
//! share a family key in the current snapshot.

use crate::tariff::{Tariff, TariffStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// All versions sharing one family key, with derived lifecycle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyView {
    /// Shared `tariff_family_id`, or the sole version's own id
    pub family_id: String,

    /// Versions in the configured sort order
    pub versions: Vec<Tariff>,

    /// Any version is active, proposed, or expiring within the window
    pub has_live_versions: bool,

    /// No live versions left; the family only exists as history
    pub is_archived: bool,

    /// User has pinned this family
    pub is_pinned: bool,
}

impl FamilyView {
    /// Build a family from already-sorted versions
    pub fn build(
        family_id: String,
        versions: Vec<Tariff>,
        today: NaiveDate,
        window_days: i64,
        is_pinned: bool,
    ) -> Self {
        let has_live_versions = versions.iter().any(|t| {
            matches!(t.status, TariffStatus::Active | TariffStatus::Proposed)
                || t.is_expiring_within(today, window_days)
        });

        Self {
            family_id,
            versions,
            has_live_versions,
            is_archived: !has_live_versions,
            is_pinned,
        }
    }

    /// First version with active status
    pub fn active_version(&self) -> Option<&Tariff> {
        self.versions
            .iter()
            .find(|t| t.status == TariffStatus::Active)
    }

    /// First version with proposed status
    pub fn proposed_version(&self) -> Option<&Tariff> {
        self.versions
            .iter()
            .find(|t| t.status == TariffStatus::Proposed)
    }

    /// First version whose expiry falls inside the window
    pub fn expiring_version(&self, today: NaiveDate, window_days: i64) -> Option<&Tariff> {
        self.versions
            .iter()
            .find(|t| t.is_expiring_within(today, window_days))
    }

    /// Earliest expiry date across all versions
    pub fn earliest_expiry(&self) -> Option<NaiveDate> {
        self.versions.iter().filter_map(|t| t.expiry_date).min()
    }

    /// Most recent update timestamp across all versions
    pub fn latest_update(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.versions.iter().filter_map(|t| t.updated_at).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::OwnershipType;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn version(id: &str, status: TariffStatus, expiry: Option<NaiveDate>) -> Tariff {
        let mut t = Tariff::new(id, id, status, OwnershipType::RocketCsp);
        t.tariff_family_id = Some("fam-1".to_string());
        t.expiry_date = expiry;
        t
    }

    #[test]
    fn test_family_with_active_expiring_and_expired_versions() {
        // Active expiring in 45 days, evergreen proposal, expired history row
        let versions = vec![
            version("v1", TariffStatus::Active, Some(today() + Duration::days(45))),
            version("v2", TariffStatus::Proposed, None),
            version("v3", TariffStatus::Expired, Some(today() - Duration::days(10))),
        ];

        let family = FamilyView::build("fam-1".to_string(), versions, today(), 90, false);

        assert!(family.has_live_versions);
        assert!(!family.is_archived);
        assert_eq!(family.active_version().unwrap().id, "v1");
        assert_eq!(family.proposed_version().unwrap().id, "v2");
        assert_eq!(family.expiring_version(today(), 90).unwrap().id, "v1");
        assert_eq!(
            family.earliest_expiry(),
            Some(today() - Duration::days(10))
        );
    }

    #[test]
    fn test_family_of_history_only_is_archived() {
        let versions = vec![
            version("v1", TariffStatus::Expired, Some(today() - Duration::days(300))),
            version("v2", TariffStatus::Superseded, Some(today() - Duration::days(100))),
        ];

        let family = FamilyView::build("fam-1".to_string(), versions, today(), 90, false);
        assert!(!family.has_live_versions);
        assert!(family.is_archived);
        assert!(family.active_version().is_none());
    }

    #[test]
    fn test_soon_expiring_history_keeps_family_live() {
        // Superseded status but expiry still inside the window
        let versions = vec![version(
            "v1",
            TariffStatus::Superseded,
            Some(today() + Duration::days(30)),
        )];

        let family = FamilyView::build("fam-1".to_string(), versions, today(), 90, false);
        assert!(family.has_live_versions);
    }
}
