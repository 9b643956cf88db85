//! Lifecycle mutation service and store seams
//!
//! All writes go through [`LifecycleService`], which validates drafts,
//! applies the default-expiry rule, and raises the advisory family
//! invariants as warnings. The store traits model the backing platform's
//! per-call CRUD contract: no transaction spans calls, so the multi-row
//! renewal linkage runs as a compensating saga over individual writes.

mod service;
mod store;

pub use service::{
    LifecycleError, LifecycleService, RenewalLinkage, RenewalRollback, SaveOutcome, SaveWarning,
    TariffDraft, ValidationError,
};
pub use store::{
    ActivityLog, ActivityRecord, EventStore, InMemoryStore, PinStore, StoreError, TariffStore,
};
