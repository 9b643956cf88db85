//! Lifecycle mutation service
//!
//! Validates drafts before any store call, applies the default-expiry rule,
//! and surfaces the advisory family invariants as warnings. Warnings never
//! block a save: the "one active per family" and "ownership change starts a
//! new family" rules are warn-but-allow, as the workflows depend on being
//! able to override them.

use super::store::{ActivityLog, ActivityRecord, EventStore, StoreError, TariffStore};
use crate::tariff::{default_expiry, OwnershipType, Tariff, TariffStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Draft fields submitted from an entry form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TariffDraft {
    #[serde(default)]
    pub tariff_family_id: Option<String>,
    #[serde(default)]
    pub tariff_reference_id: Option<String>,
    pub version: String,
    pub status: TariffStatus,
    pub ownership_type: OwnershipType,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_ids: Vec<String>,
    #[serde(default)]
    pub carrier_id: Option<String>,
    #[serde(default)]
    pub carrier_ids: Vec<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_blanket_tariff: bool,
    #[serde(default)]
    pub csp_event_id: Option<String>,
    #[serde(default)]
    pub portal_username: Option<String>,
    #[serde(default)]
    pub portal_password: Option<String>,
    #[serde(default)]
    pub portal_url: Option<String>,
    #[serde(default)]
    pub updated_reason: Option<String>,
}

/// Pre-save validation failures; nothing is written when one is raised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one carrier must be selected")]
    MissingCarrier,

    #[error("an effective date is required")]
    MissingEffectiveDate,

    #[error("an update reason is required when editing a tariff")]
    MissingUpdateReason,
}

/// Any failure from a lifecycle operation
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Renewal(#[from] RenewalRollback),
}

/// A renewal linkage write failed and the applied links were compensated
///
/// Reverts are themselves plain store writes; any revert that fails leaves
/// its row carrying the new link, listed in `unreverted`.
#[derive(Debug, Error)]
#[error("renewal event {event_id} could not be linked to family {family_id}: {source}")]
pub struct RenewalRollback {
    pub family_id: String,
    pub event_id: String,

    /// Write that failed and triggered compensation
    pub failed_id: String,

    /// Links reverted to their prior value
    pub reverted: Vec<String>,

    /// Reverts that failed, with the store's message
    pub unreverted: Vec<(String, String)>,

    #[source]
    pub source: StoreError,
}

/// Advisory finding surfaced alongside a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveWarning {
    /// Another version of the family is already active; the user has to
    /// supersede it manually
    ActiveConflict { existing_id: String },

    /// Ownership changed on an existing record, which conceptually starts
    /// a new family
    OwnershipChange {
        previous: OwnershipType,
        submitted: OwnershipType,
    },
}

impl SaveWarning {
    /// Message shown to the user
    pub fn message(&self) -> String {
        match self {
            SaveWarning::ActiveConflict { existing_id } => format!(
                "Tariff {} in this family is already active; saving another \
                 active version means the other one must be superseded manually",
                existing_id
            ),
            SaveWarning::OwnershipChange {
                previous,
                submitted,
            } => format!(
                "Changing ownership from {} to {} starts a new tariff family; \
                 the existing family history will not follow this record",
                previous.label(),
                submitted.label()
            ),
        }
    }
}

/// A persisted record plus any advisory warnings raised on the way in
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub tariff: Tariff,
    pub warnings: Vec<SaveWarning>,
}

/// Successful renewal linkage across a family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalLinkage {
    pub family_id: String,
    pub event_id: String,

    /// Tariffs now carrying the renewal link
    pub updated: Vec<String>,

    /// The audit insert is best-effort; false means it was missed
    pub activity_logged: bool,
}

impl RenewalLinkage {
    /// One-line status for the notification toast
    pub fn summary(&self) -> String {
        if self.activity_logged {
            format!(
                "Linked renewal event {} to {} tariff version(s)",
                self.event_id,
                self.updated.len()
            )
        } else {
            format!(
                "Linked renewal event {} to {} tariff version(s); audit record failed",
                self.event_id,
                self.updated.len()
            )
        }
    }
}

/// Mutation service over the store seams
pub struct LifecycleService<S> {
    store: S,
}

impl<S> LifecycleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: TariffStore + EventStore + ActivityLog> LifecycleService<S> {
    /// Create a tariff from a draft
    ///
    /// Validation failures abort before any write. A blank expiry defaults
    /// to twelve months after the effective date.
    pub fn create_tariff(
        &mut self,
        draft: TariffDraft,
        user: &str,
    ) -> Result<SaveOutcome, LifecycleError> {
        validate_draft(&draft)?;

        let mut warnings = Vec::new();
        if draft.status == TariffStatus::Active {
            if let Some(ref family_id) = draft.tariff_family_id {
                if let Some(existing) = self.find_active_in_family(family_id, None)? {
                    warnings.push(SaveWarning::ActiveConflict {
                        existing_id: existing,
                    });
                }
            }
        }

        let mut tariff = draft_to_tariff(String::new(), draft);
        tariff.created_by = Some(user.to_string());

        let created = self.store.create(tariff)?;
        self.store.record(ActivityRecord {
            action: "tariff_created".to_string(),
            entity_id: created.id.clone(),
            detail: format!("Created tariff version {}", created.version),
            user_id: Some(user.to_string()),
        })?;

        for warning in &warnings {
            log::warn!("tariff {}: {}", created.id, warning.message());
        }

        Ok(SaveOutcome {
            tariff: created,
            warnings,
        })
    }

    /// Update an existing tariff from a draft
    ///
    /// Requires an update reason. Raises advisory warnings for an active
    /// conflict within the family and for an ownership change, but persists
    /// regardless.
    pub fn update_tariff(
        &mut self,
        id: &str,
        draft: TariffDraft,
        user: &str,
    ) -> Result<SaveOutcome, LifecycleError> {
        validate_draft(&draft)?;
        if draft
            .updated_reason
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .is_empty()
        {
            return Err(ValidationError::MissingUpdateReason.into());
        }

        let existing = self.store.get(id)?;

        let mut warnings = Vec::new();
        if draft.status == TariffStatus::Active {
            if let Some(conflict) =
                self.find_active_in_family(existing.family_key(), Some(&existing.id))?
            {
                warnings.push(SaveWarning::ActiveConflict {
                    existing_id: conflict,
                });
            }
        }
        if draft.ownership_type != existing.ownership_type {
            warnings.push(SaveWarning::OwnershipChange {
                previous: existing.ownership_type,
                submitted: draft.ownership_type,
            });
        }

        let mut tariff = draft_to_tariff(existing.id.clone(), draft);
        // The family id never changes on edit, even on an ownership change
        tariff.tariff_family_id = existing.tariff_family_id.clone();
        tariff.renewal_csp_event_id = existing.renewal_csp_event_id.clone();
        tariff.created_by = existing.created_by.clone();
        tariff.created_at = existing.created_at;
        tariff.updated_by = Some(user.to_string());

        let updated = self.store.update(id, tariff)?;
        self.store.record(ActivityRecord {
            action: "tariff_updated".to_string(),
            entity_id: updated.id.clone(),
            detail: updated
                .updated_reason
                .clone()
                .unwrap_or_else(|| "Updated tariff".to_string()),
            user_id: Some(user.to_string()),
        })?;

        for warning in &warnings {
            log::warn!("tariff {}: {}", updated.id, warning.message());
        }

        Ok(SaveOutcome {
            tariff: updated,
            warnings,
        })
    }

    /// Link a renewal CSP event to every version in a family
    ///
    /// Runs as a compensating saga: each per-tariff link remembers the
    /// prior value, and a failure of any link (or of the event mark)
    /// reverts the links already applied before returning the error. The
    /// trailing audit insert is best-effort and never compensated.
    pub fn link_renewal(
        &mut self,
        family_id: &str,
        event_id: &str,
        user: &str,
    ) -> Result<RenewalLinkage, LifecycleError> {
        let members = self.store.list_family(family_id)?;
        if members.is_empty() {
            return Err(StoreError::NotFound(family_id.to_string()).into());
        }

        // (id, prior link) for everything written, in case of compensation
        let mut applied: Vec<(String, Option<String>)> = Vec::new();
        let mut failure: Option<(String, StoreError)> = None;

        for member in &members {
            let mut linked = member.clone();
            linked.renewal_csp_event_id = Some(event_id.to_string());
            match self.store.update(&member.id, linked) {
                Ok(_) => applied.push((member.id.clone(), member.renewal_csp_event_id.clone())),
                Err(err) => {
                    failure = Some((member.id.clone(), err));
                    break;
                }
            }
        }

        if failure.is_none() {
            if let Err(err) = self.store.mark_renewal(event_id, family_id) {
                failure = Some((event_id.to_string(), err));
            }
        }

        if let Some((failed_id, source)) = failure {
            let rollback =
                self.compensate_renewal(family_id, event_id, applied, failed_id, source);
            log::warn!("{}", rollback);
            return Err(rollback.into());
        }

        let activity_logged = match self.store.record(ActivityRecord {
            action: "renewal_linked".to_string(),
            entity_id: family_id.to_string(),
            detail: format!("Linked renewal CSP event {}", event_id),
            user_id: Some(user.to_string()),
        }) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("activity record failed for family {}: {}", family_id, err);
                false
            }
        };

        Ok(RenewalLinkage {
            family_id: family_id.to_string(),
            event_id: event_id.to_string(),
            updated: applied.into_iter().map(|(id, _)| id).collect(),
            activity_logged,
        })
    }

    /// Revert applied renewal links after a mid-saga failure
    fn compensate_renewal(
        &mut self,
        family_id: &str,
        event_id: &str,
        applied: Vec<(String, Option<String>)>,
        failed_id: String,
        source: StoreError,
    ) -> RenewalRollback {
        let mut reverted = Vec::new();
        let mut unreverted = Vec::new();

        for (id, prior) in applied {
            let restore = self.store.get(&id).and_then(|mut tariff| {
                tariff.renewal_csp_event_id = prior.clone();
                self.store.update(&id, tariff)
            });
            match restore {
                Ok(_) => reverted.push(id),
                Err(err) => {
                    log::warn!("renewal revert failed for tariff {}: {}", id, err);
                    unreverted.push((id, err.to_string()));
                }
            }
        }

        RenewalRollback {
            family_id: family_id.to_string(),
            event_id: event_id.to_string(),
            failed_id,
            reverted,
            unreverted,
            source,
        }
    }

    /// Delete a tariff after explicit user confirmation
    pub fn delete_tariff(&mut self, id: &str, user: &str) -> Result<(), LifecycleError> {
        self.store.delete(id)?;
        self.store.record(ActivityRecord {
            action: "tariff_deleted".to_string(),
            entity_id: id.to_string(),
            detail: "Deleted tariff version".to_string(),
            user_id: Some(user.to_string()),
        })?;
        Ok(())
    }

    /// Id of an active family member other than `exclude_id`, if any
    fn find_active_in_family(
        &self,
        family_key: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        let members = self.store.list_family(family_key)?;
        Ok(members
            .into_iter()
            .filter(|t| Some(t.id.as_str()) != exclude_id)
            .find(|t| t.status == TariffStatus::Active)
            .map(|t| t.id))
    }
}

fn validate_draft(draft: &TariffDraft) -> Result<(), ValidationError> {
    if draft.carrier_id.is_none() && draft.carrier_ids.is_empty() {
        return Err(ValidationError::MissingCarrier);
    }
    if draft.effective_date.is_none() {
        return Err(ValidationError::MissingEffectiveDate);
    }
    Ok(())
}

fn draft_to_tariff(id: String, draft: TariffDraft) -> Tariff {
    let effective = draft.effective_date;
    let expiry = draft
        .expiry_date
        .or_else(|| effective.map(default_expiry));

    Tariff {
        id,
        tariff_family_id: draft.tariff_family_id,
        tariff_reference_id: draft.tariff_reference_id,
        version: draft.version,
        status: draft.status,
        ownership_type: draft.ownership_type,
        customer_id: draft.customer_id,
        customer_ids: draft.customer_ids,
        carrier_id: draft.carrier_id,
        carrier_ids: draft.carrier_ids,
        service_type: draft.service_type,
        mode: draft.mode,
        effective_date: effective,
        expiry_date: expiry,
        is_blanket_tariff: draft.is_blanket_tariff,
        csp_event_id: draft.csp_event_id,
        renewal_csp_event_id: None,
        portal_username: draft.portal_username,
        portal_password: draft.portal_password,
        portal_url: draft.portal_url,
        created_by: None,
        updated_by: None,
        updated_reason: draft.updated_reason,
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::InMemoryStore;

    fn draft() -> TariffDraft {
        TariffDraft {
            version: "1".to_string(),
            status: TariffStatus::Proposed,
            ownership_type: OwnershipType::RocketCsp,
            customer_id: Some("cust-1".to_string()),
            carrier_id: Some("car-1".to_string()),
            effective_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            ..TariffDraft::default()
        }
    }

    fn service() -> LifecycleService<InMemoryStore> {
        LifecycleService::new(InMemoryStore::new())
    }

    #[test]
    fn test_create_defaults_expiry_to_one_year() {
        let mut service = service();
        let outcome = service.create_tariff(draft(), "u-1").unwrap();

        assert_eq!(
            outcome.tariff.expiry_date,
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
        assert!(outcome.warnings.is_empty());
        assert_eq!(service.store().activities().len(), 1);
        assert_eq!(service.store().activities()[0].action, "tariff_created");
    }

    #[test]
    fn test_create_keeps_submitted_expiry() {
        let mut service = service();
        let mut d = draft();
        d.expiry_date = NaiveDate::from_ymd_opt(2024, 6, 30);

        let outcome = service.create_tariff(d, "u-1").unwrap();
        assert_eq!(
            outcome.tariff.expiry_date,
            NaiveDate::from_ymd_opt(2024, 6, 30)
        );
    }

    #[test]
    fn test_validation_aborts_before_any_write() {
        let mut service = service();

        let mut missing_carrier = draft();
        missing_carrier.carrier_id = None;
        let result = service.create_tariff(missing_carrier, "u-1");
        assert!(matches!(
            result,
            Err(LifecycleError::Validation(ValidationError::MissingCarrier))
        ));

        let mut missing_effective = draft();
        missing_effective.effective_date = None;
        let result = service.create_tariff(missing_effective, "u-1");
        assert!(matches!(
            result,
            Err(LifecycleError::Validation(
                ValidationError::MissingEffectiveDate
            ))
        ));

        assert!(service.store().list().unwrap().is_empty());
        assert!(service.store().activities().is_empty());
    }

    #[test]
    fn test_update_requires_reason() {
        let mut service = service();
        let created = service.create_tariff(draft(), "u-1").unwrap().tariff;

        let result = service.update_tariff(&created.id, draft(), "u-1");
        assert!(matches!(
            result,
            Err(LifecycleError::Validation(
                ValidationError::MissingUpdateReason
            ))
        ));
    }

    #[test]
    fn test_active_conflict_warns_but_saves() {
        let mut service = service();

        let mut first = draft();
        first.tariff_family_id = Some("fam-1".to_string());
        first.status = TariffStatus::Active;
        service.create_tariff(first, "u-1").unwrap();

        let mut second = draft();
        second.tariff_family_id = Some("fam-1".to_string());
        second.status = TariffStatus::Active;
        second.version = "2".to_string();
        let outcome = service.create_tariff(second, "u-1").unwrap();

        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            outcome.warnings[0],
            SaveWarning::ActiveConflict { .. }
        ));
        // Both rows persisted: the invariant is advisory
        assert_eq!(service.store().list_family("fam-1").unwrap().len(), 2);
    }

    #[test]
    fn test_ownership_change_warns_and_keeps_family_id() {
        let mut service = service();
        let mut d = draft();
        d.tariff_family_id = Some("fam-1".to_string());
        let created = service.create_tariff(d, "u-1").unwrap().tariff;

        let mut edit = draft();
        edit.tariff_family_id = Some("fam-1".to_string());
        edit.ownership_type = OwnershipType::CustomerDirect;
        edit.updated_reason = Some("renegotiated directly".to_string());

        let outcome = service.update_tariff(&created.id, edit, "u-2").unwrap();
        assert!(matches!(
            outcome.warnings[0],
            SaveWarning::OwnershipChange { .. }
        ));
        // Family id is not regenerated by the ownership change
        assert_eq!(
            outcome.tariff.tariff_family_id.as_deref(),
            Some("fam-1")
        );
        assert_eq!(outcome.tariff.updated_by.as_deref(), Some("u-2"));
    }

    fn seed_family(service: &mut LifecycleService<InMemoryStore>) -> Vec<String> {
        let mut ids = Vec::new();
        for version in ["1", "2"] {
            let mut d = draft();
            d.tariff_family_id = Some("fam-1".to_string());
            d.version = version.to_string();
            ids.push(service.create_tariff(d, "u-1").unwrap().tariff.id);
        }
        ids
    }

    #[test]
    fn test_renewal_linkage_full_success() {
        let mut service = service();
        seed_family(&mut service);

        let linkage = service.link_renewal("fam-1", "csp-9", "u-1").unwrap();
        assert_eq!(linkage.updated.len(), 2);
        assert!(linkage.activity_logged);
        assert_eq!(service.store().renewal_mark("csp-9"), Some("fam-1"));

        for tariff in service.store().list_family("fam-1").unwrap() {
            assert_eq!(tariff.renewal_csp_event_id.as_deref(), Some("csp-9"));
        }
        assert_eq!(
            service.store().activities().last().unwrap().action,
            "renewal_linked"
        );
    }

    #[test]
    fn test_renewal_linkage_failure_reverts_applied_links() {
        let mut service = service();
        let ids = seed_family(&mut service);
        service.store_mut().poison_updates(&ids[1]);

        let result = service.link_renewal("fam-1", "csp-9", "u-1");
        let rollback = match result {
            Err(LifecycleError::Renewal(rollback)) => rollback,
            other => panic!("expected renewal rollback, got {:?}", other),
        };

        assert_eq!(rollback.failed_id, ids[1]);
        assert_eq!(rollback.reverted, vec![ids[0].clone()]);
        assert!(rollback.unreverted.is_empty());

        // The first link was compensated away, nothing is half-linked
        for id in &ids {
            let tariff = service.store().get(id).unwrap();
            assert!(tariff.renewal_csp_event_id.is_none());
        }
        assert!(service.store().renewal_mark("csp-9").is_none());
    }

    #[test]
    fn test_renewal_rollback_reports_revert_residue() {
        let mut service = service();
        let ids = seed_family(&mut service);
        // First row accepts the link but rejects the revert
        service.store_mut().poison_updates_after(&ids[0], 1);
        service.store_mut().poison_updates(&ids[1]);

        let result = service.link_renewal("fam-1", "csp-9", "u-1");
        let rollback = match result {
            Err(LifecycleError::Renewal(rollback)) => rollback,
            other => panic!("expected renewal rollback, got {:?}", other),
        };

        assert!(rollback.reverted.is_empty());
        assert_eq!(rollback.unreverted.len(), 1);
        assert_eq!(rollback.unreverted[0].0, ids[0]);

        // The residue row still carries the link it could not shed
        let stale = service.store().get(&ids[0]).unwrap();
        assert_eq!(stale.renewal_csp_event_id.as_deref(), Some("csp-9"));
    }

    #[test]
    fn test_renewal_linkage_unknown_family_errors() {
        let mut service = service();
        let result = service.link_renewal("fam-none", "csp-9", "u-1");
        assert!(matches!(
            result,
            Err(LifecycleError::Store(StoreError::NotFound(_)))
        ));
    }

    #[test]
    fn test_delete_records_activity() {
        let mut service = service();
        let created = service.create_tariff(draft(), "u-1").unwrap().tariff;

        service.delete_tariff(&created.id, "u-1").unwrap();
        assert!(service.store().get(&created.id).is_err());
        assert_eq!(
            service.store().activities().last().unwrap().action,
            "tariff_deleted"
        );
    }
}
