//! Tariff record structures matching the brokerage pricing-agreement format

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of months added to the effective date when no expiry is supplied
pub const DEFAULT_TERM_MONTHS: u32 = 12;

/// Persisted status of a tariff version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffStatus {
    /// Drafted or under negotiation, not yet in force
    Proposed,
    /// Currently in force
    Active,
    /// Past its term and marked as such
    Expired,
    /// Replaced by a newer version in the same family
    Superseded,
}

impl TariffStatus {
    /// Get the string representation matching the stored format
    pub fn as_str(&self) -> &'static str {
        match self {
            TariffStatus::Proposed => "proposed",
            TariffStatus::Active => "active",
            TariffStatus::Expired => "expired",
            TariffStatus::Superseded => "superseded",
        }
    }
}

impl Default for TariffStatus {
    fn default() -> Self {
        TariffStatus::Proposed
    }
}

/// Who negotiated and owns a tariff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipType {
    /// Negotiated directly between one customer and a carrier
    CustomerDirect,
    /// Awarded through a Rocket-run carrier sourcing program
    RocketCsp,
    /// Awarded through a customer-run carrier sourcing program
    CustomerCsp,
    /// Rocket blanket pricing applied to a pool of customers
    RocketBlanket,
    /// Priority1 blanket pricing applied to a pool of customers
    Priority1Blanket,
}

impl OwnershipType {
    /// Blanket tariffs are keyed by carrier rather than customer
    pub fn is_blanket(&self) -> bool {
        matches!(
            self,
            OwnershipType::RocketBlanket | OwnershipType::Priority1Blanket
        )
    }

    /// Whether this ownership came out of a sourcing program
    pub fn is_csp(&self) -> bool {
        matches!(self, OwnershipType::RocketCsp | OwnershipType::CustomerCsp)
    }

    /// Get the string representation matching the stored format
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnershipType::CustomerDirect => "customer_direct",
            OwnershipType::RocketCsp => "rocket_csp",
            OwnershipType::CustomerCsp => "customer_csp",
            OwnershipType::RocketBlanket => "rocket_blanket",
            OwnershipType::Priority1Blanket => "priority1_blanket",
        }
    }

    /// Human-readable label for reports and exports
    pub fn label(&self) -> &'static str {
        match self {
            OwnershipType::CustomerDirect => "Customer Direct",
            OwnershipType::RocketCsp => "Rocket CSP",
            OwnershipType::CustomerCsp => "Customer CSP",
            OwnershipType::RocketBlanket => "Rocket Blanket",
            OwnershipType::Priority1Blanket => "Priority1 Blanket",
        }
    }

    /// All ownership types, in reporting order
    pub fn all() -> [OwnershipType; 5] {
        [
            OwnershipType::CustomerDirect,
            OwnershipType::RocketCsp,
            OwnershipType::CustomerCsp,
            OwnershipType::RocketBlanket,
            OwnershipType::Priority1Blanket,
        ]
    }
}

impl Default for OwnershipType {
    fn default() -> Self {
        OwnershipType::CustomerDirect
    }
}

/// A single tariff version record
///
/// Versions of the same commercial agreement share a `tariff_family_id`;
/// a record without one is the sole version of its own family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tariff {
    /// Unique record identifier
    pub id: String,

    /// Groups renewals of the same agreement; immutable once set
    #[serde(default)]
    pub tariff_family_id: Option<String>,

    /// Human-facing tariff label
    #[serde(default)]
    pub tariff_reference_id: Option<String>,

    /// Version label within the family (free-form, e.g. "1", "2024-R2")
    pub version: String,

    /// Current lifecycle status
    pub status: TariffStatus,

    /// Who negotiated/owns this tariff
    pub ownership_type: OwnershipType,

    /// Owning customer (absent for blanket tariffs)
    #[serde(default)]
    pub customer_id: Option<String>,

    /// Customer pool for blanket tariffs
    #[serde(default)]
    pub customer_ids: Vec<String>,

    /// Primary carrier
    #[serde(default)]
    pub carrier_id: Option<String>,

    /// Additional carriers on multi-carrier agreements
    #[serde(default)]
    pub carrier_ids: Vec<String>,

    /// Service type display string (e.g. "LTL", "FTL")
    #[serde(default)]
    pub service_type: Option<String>,

    /// Transport mode display string (e.g. "Road", "Intermodal")
    #[serde(default)]
    pub mode: Option<String>,

    /// Date the pricing takes effect
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,

    /// Date the pricing lapses (None = evergreen until superseded)
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,

    /// Whether this tariff applies to a customer pool
    #[serde(default)]
    pub is_blanket_tariff: bool,

    /// CSP event that produced this tariff
    #[serde(default)]
    pub csp_event_id: Option<String>,

    /// Follow-up CSP event opened to renew this family
    #[serde(default)]
    pub renewal_csp_event_id: Option<String>,

    /// Carrier portal login (opaque)
    #[serde(default)]
    pub portal_username: Option<String>,

    /// Carrier portal password (opaque)
    #[serde(default)]
    pub portal_password: Option<String>,

    /// Carrier portal URL (opaque)
    #[serde(default)]
    pub portal_url: Option<String>,

    /// User who created the record
    #[serde(default)]
    pub created_by: Option<String>,

    /// User who last updated the record
    #[serde(default)]
    pub updated_by: Option<String>,

    /// Reason supplied with the last update
    #[serde(default)]
    pub updated_reason: Option<String>,

    /// Record creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Last update timestamp
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tariff {
    /// Create a tariff with required fields; everything else starts empty
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        status: TariffStatus,
        ownership_type: OwnershipType,
    ) -> Self {
        Self {
            id: id.into(),
            tariff_family_id: None,
            tariff_reference_id: None,
            version: version.into(),
            status,
            ownership_type,
            customer_id: None,
            customer_ids: Vec::new(),
            carrier_id: None,
            carrier_ids: Vec::new(),
            service_type: None,
            mode: None,
            effective_date: None,
            expiry_date: None,
            is_blanket_tariff: ownership_type.is_blanket(),
            csp_event_id: None,
            renewal_csp_event_id: None,
            portal_username: None,
            portal_password: None,
            portal_url: None,
            created_by: None,
            updated_by: None,
            updated_reason: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Family key: the shared family id, or the record's own id for
    /// tariffs that have never been renewed
    pub fn family_key(&self) -> &str {
        self.tariff_family_id.as_deref().unwrap_or(&self.id)
    }

    /// Signed days until expiry; None when the tariff has no expiry date
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date
            .map(|expiry| expiry.signed_duration_since(today).num_days())
    }

    /// Whether the expiry date has been reached (expiring today counts)
    pub fn is_date_expired(&self, today: NaiveDate) -> bool {
        matches!(self.days_until_expiry(today), Some(days) if days <= 0)
    }

    /// Active status and the expiry date (if any) still in the future
    pub fn is_currently_active(&self, today: NaiveDate) -> bool {
        self.status == TariffStatus::Active && !self.is_date_expired(today)
    }

    /// Expiry falls inside the window (exclusive of today, inclusive of
    /// the window end)
    pub fn is_expiring_within(&self, today: NaiveDate, window_days: i64) -> bool {
        matches!(
            self.days_until_expiry(today),
            Some(days) if days > 0 && days <= window_days
        )
    }

    /// Single + multi carrier fields as one list, primary first
    pub fn all_carrier_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        if let Some(ref id) = self.carrier_id {
            ids.push(id);
        }
        for id in &self.carrier_ids {
            if !ids.contains(&id.as_str()) {
                ids.push(id);
            }
        }
        ids
    }

    /// Single + pool customer fields as one list
    pub fn all_customer_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        if let Some(ref id) = self.customer_id {
            ids.push(id);
        }
        for id in &self.customer_ids {
            if !ids.contains(&id.as_str()) {
                ids.push(id);
            }
        }
        ids
    }
}

/// Expiry applied when a tariff is saved without one
pub fn default_expiry(effective_date: NaiveDate) -> NaiveDate {
    effective_date
        .checked_add_months(Months::new(DEFAULT_TERM_MONTHS))
        .unwrap_or(effective_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_tariff() -> Tariff {
        let mut tariff = Tariff::new(
            "t-1",
            "1",
            TariffStatus::Active,
            OwnershipType::CustomerDirect,
        );
        tariff.tariff_family_id = Some("fam-1".to_string());
        tariff.tariff_reference_id = Some("TRF-001".to_string());
        tariff.customer_id = Some("cust-1".to_string());
        tariff.carrier_id = Some("car-1".to_string());
        tariff.service_type = Some("LTL".to_string());
        tariff.mode = Some("Road".to_string());
        tariff.effective_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        tariff.expiry_date = NaiveDate::from_ymd_opt(2024, 12, 31);
        tariff
    }

    #[test]
    fn test_family_key_falls_back_to_id() {
        let mut tariff = base_tariff();
        assert_eq!(tariff.family_key(), "fam-1");

        tariff.tariff_family_id = None;
        assert_eq!(tariff.family_key(), "t-1");
    }

    #[test]
    fn test_days_until_expiry() {
        let tariff = base_tariff();
        let today = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(tariff.days_until_expiry(today), Some(30));

        let mut evergreen = base_tariff();
        evergreen.expiry_date = None;
        assert_eq!(evergreen.days_until_expiry(today), None);
    }

    #[test]
    fn test_expiring_window_excludes_today() {
        let tariff = base_tariff();
        // Expiring exactly today: not "expiring", already expired
        let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert!(!tariff.is_expiring_within(today, 90));
        assert!(tariff.is_date_expired(today));

        let day_before = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert!(tariff.is_expiring_within(day_before, 90));
    }

    #[test]
    fn test_currently_active_requires_future_expiry() {
        let tariff = base_tariff();
        assert!(tariff.is_currently_active(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
        assert!(!tariff.is_currently_active(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));

        let mut evergreen = base_tariff();
        evergreen.expiry_date = None;
        assert!(evergreen.is_currently_active(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }

    #[test]
    fn test_all_carrier_ids_dedupes_primary() {
        let mut tariff = base_tariff();
        tariff.carrier_ids = vec!["car-1".to_string(), "car-2".to_string()];
        assert_eq!(tariff.all_carrier_ids(), vec!["car-1", "car-2"]);
    }

    #[test]
    fn test_serde_uses_snake_case_statuses() {
        let tariff = base_tariff();
        let json = serde_json::to_string(&tariff).unwrap();
        assert!(json.contains("\"status\":\"active\""));
        assert!(json.contains("\"ownership_type\":\"customer_direct\""));

        let back: Tariff = serde_json::from_str(&json).unwrap();
        assert_eq!(back.status, TariffStatus::Active);
        assert_eq!(back.expiry_date, tariff.expiry_date);
    }

    #[test]
    fn test_default_expiry_is_one_year_out() {
        let effective = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            default_expiry(effective),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
    }
}
