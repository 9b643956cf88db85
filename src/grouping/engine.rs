//! Family grouping engine
//!
//! Takes a flat tariff snapshot already scoped to one ownership tab and
//! produces the nested group/family/versions structure the tables render,
//! with filtering, search, sorting, and pinning applied.

use super::family::FamilyView;
use super::filter::{status_rank, SearchQuery, StatusFilter};
use super::pins::PinSet;
use crate::reference::ReferenceData;
use crate::tariff::{OwnershipType, Tariff};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Group key used when a tariff carries no customer/carrier reference.
/// Records with missing references still surface rather than being dropped.
pub const UNKNOWN_GROUP_KEY: &str = "unknown";

/// Column driving the in-family version sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSortKey {
    ExpiryDate,
    EffectiveDate,
    Version,
    /// Computed display-status rank
    Status,
}

/// Sort direction for the version sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// In-family sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSort {
    pub key: VersionSortKey,
    pub direction: SortDirection,
}

impl Default for VersionSort {
    fn default() -> Self {
        Self {
            key: VersionSortKey::ExpiryDate,
            direction: SortDirection::Ascending,
        }
    }
}

/// Ordering of top-level groups, independent of the in-family sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSortKey {
    /// Customer/carrier name A–Z
    Name,
    /// Earliest expiry across all versions in the group
    EarliestExpiry,
    /// Most recent update across all versions in the group
    RecentlyUpdated,
}

/// Configuration for one grouping pass
#[derive(Debug, Clone)]
pub struct GroupingConfig {
    /// Valuation date for every date-window computation
    pub today: NaiveDate,

    /// Row visibility filter; None shows every version
    pub status_filter: Option<StatusFilter>,

    /// Free-text search; None matches everything
    pub search: Option<SearchQuery>,

    /// In-family version ordering
    pub version_sort: VersionSort,

    /// Top-level group ordering
    pub group_sort: GroupSortKey,

    /// Current user's pins
    pub pins: PinSet,

    /// Lookahead window for "expiring" semantics, in days
    pub expiring_window_days: i64,
}

impl GroupingConfig {
    /// Default configuration for a valuation date
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            status_filter: None,
            search: None,
            version_sort: VersionSort::default(),
            group_sort: GroupSortKey::EarliestExpiry,
            pins: PinSet::default(),
            expiring_window_days: 90,
        }
    }
}

/// One customer/carrier group with its families split live/archived
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupView {
    /// Customer id, carrier id, or [`UNKNOWN_GROUP_KEY`]
    pub key: String,

    /// Resolved display name
    pub label: String,

    /// User has pinned this group
    pub is_pinned: bool,

    /// Families with at least one live version
    pub live_families: Vec<FamilyView>,

    /// Families that only exist as history
    pub archived_families: Vec<FamilyView>,
}

impl GroupView {
    /// All families, live first
    pub fn families(&self) -> impl Iterator<Item = &FamilyView> {
        self.live_families.iter().chain(self.archived_families.iter())
    }

    /// Total version rows in the group
    pub fn version_count(&self) -> usize {
        self.families().map(|f| f.versions.len()).sum()
    }

    fn earliest_expiry(&self) -> Option<NaiveDate> {
        self.families().filter_map(|f| f.earliest_expiry()).min()
    }

    fn latest_update(&self) -> Option<DateTime<Utc>> {
        self.families().filter_map(|f| f.latest_update()).max()
    }
}

/// Groups a scoped tariff snapshot into customer/carrier families
pub struct GroupingEngine<'a> {
    refs: &'a ReferenceData,
    config: GroupingConfig,
}

impl<'a> GroupingEngine<'a> {
    /// Create an engine over the given reference data and config
    pub fn new(refs: &'a ReferenceData, config: GroupingConfig) -> Self {
        Self { refs, config }
    }

    /// Group tariffs for one ownership scope
    ///
    /// Blanket scopes group by carrier, everything else by customer. Every
    /// input version that passes the filter and search lands in exactly one
    /// family of exactly one group.
    pub fn group(&self, tariffs: &[Tariff], scope: OwnershipType) -> Vec<GroupView> {
        let cfg = &self.config;

        let visible = tariffs.iter().filter(|t| {
            if let Some(filter) = cfg.status_filter {
                if !filter.matches(t, cfg.today, cfg.expiring_window_days) {
                    return false;
                }
            }
            if let Some(ref search) = cfg.search {
                if !search.matches(t, self.refs) {
                    return false;
                }
            }
            true
        });

        // group key -> family key -> versions
        let mut grouped: HashMap<String, HashMap<String, Vec<Tariff>>> = HashMap::new();
        for tariff in visible {
            let group_key = self.group_key(tariff, scope);
            let family_key = tariff.family_key().to_string();
            grouped
                .entry(group_key)
                .or_default()
                .entry(family_key)
                .or_default()
                .push(tariff.clone());
        }

        let mut groups: Vec<GroupView> = grouped
            .into_iter()
            .map(|(key, families)| self.build_group(key, families, scope))
            .collect();

        groups.sort_by(|a, b| self.compare_groups(a, b));
        groups
    }

    fn group_key(&self, tariff: &Tariff, scope: OwnershipType) -> String {
        if scope.is_blanket() {
            tariff
                .all_carrier_ids()
                .first()
                .map(|id| id.to_string())
                .unwrap_or_else(|| UNKNOWN_GROUP_KEY.to_string())
        } else {
            tariff
                .customer_id
                .clone()
                .unwrap_or_else(|| UNKNOWN_GROUP_KEY.to_string())
        }
    }

    fn group_label(&self, key: &str, scope: OwnershipType) -> String {
        if key == UNKNOWN_GROUP_KEY {
            if scope.is_blanket() {
                "Unknown Carrier".to_string()
            } else {
                "Unknown Customer".to_string()
            }
        } else if scope.is_blanket() {
            self.refs.carrier_name(key).to_string()
        } else {
            self.refs.customer_name(key).to_string()
        }
    }

    fn build_group(
        &self,
        key: String,
        families: HashMap<String, Vec<Tariff>>,
        scope: OwnershipType,
    ) -> GroupView {
        let cfg = &self.config;
        let label = self.group_label(&key, scope);
        let is_pinned = cfg.pins.is_group_pinned(&key);

        let mut live_families = Vec::new();
        let mut archived_families = Vec::new();

        for (family_id, mut versions) in families {
            sort_versions(
                &mut versions,
                cfg.version_sort,
                cfg.today,
                cfg.expiring_window_days,
            );
            let family = FamilyView::build(
                family_id.clone(),
                versions,
                cfg.today,
                cfg.expiring_window_days,
                cfg.pins.is_family_pinned(&family_id),
            );
            if family.has_live_versions {
                live_families.push(family);
            } else {
                archived_families.push(family);
            }
        }

        for partition in [&mut live_families, &mut archived_families] {
            partition.sort_by(|a, b| {
                b.is_pinned
                    .cmp(&a.is_pinned)
                    .then_with(|| cmp_optional_dates(a.earliest_expiry(), b.earliest_expiry()))
                    .then_with(|| a.family_id.cmp(&b.family_id))
            });
        }

        GroupView {
            key,
            label,
            is_pinned,
            live_families,
            archived_families,
        }
    }

    fn compare_groups(&self, a: &GroupView, b: &GroupView) -> Ordering {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| match self.config.group_sort {
                GroupSortKey::Name => a.label.to_lowercase().cmp(&b.label.to_lowercase()),
                GroupSortKey::EarliestExpiry => {
                    cmp_optional_dates(a.earliest_expiry(), b.earliest_expiry())
                }
                GroupSortKey::RecentlyUpdated => match (a.latest_update(), b.latest_update()) {
                    (Some(a), Some(b)) => b.cmp(&a),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                },
            })
            .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
            .then_with(|| a.key.cmp(&b.key))
    }
}

/// Missing dates sort after any concrete date in ascending order
fn cmp_optional_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable in-family version sort by the configured column and direction
pub fn sort_versions(
    versions: &mut [Tariff],
    sort: VersionSort,
    today: NaiveDate,
    window_days: i64,
) {
    versions.sort_by(|a, b| {
        let ordering = match sort.key {
            VersionSortKey::ExpiryDate => cmp_optional_dates(a.expiry_date, b.expiry_date),
            VersionSortKey::EffectiveDate => {
                cmp_optional_dates(a.effective_date, b.effective_date)
            }
            VersionSortKey::Version => a.version.cmp(&b.version),
            VersionSortKey::Status => status_rank(a, today, window_days)
                .cmp(&status_rank(b, today, window_days)),
        };
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
