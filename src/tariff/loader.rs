//! Load tariff snapshots from tariffs.csv exports

use super::{OwnershipType, Tariff, TariffStatus};
use chrono::{DateTime, NaiveDate, Utc};
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// Raw CSV row matching the tariffs.csv snapshot columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "TariffID")]
    tariff_id: String,
    #[serde(rename = "FamilyID")]
    family_id: String,
    #[serde(rename = "ReferenceID")]
    reference_id: String,
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "OwnershipType")]
    ownership_type: String,
    #[serde(rename = "CustomerID")]
    customer_id: String,
    #[serde(rename = "CustomerIDs")]
    customer_ids: String,
    #[serde(rename = "CarrierID")]
    carrier_id: String,
    #[serde(rename = "CarrierIDs")]
    carrier_ids: String,
    #[serde(rename = "ServiceType")]
    service_type: String,
    #[serde(rename = "Mode")]
    mode: String,
    #[serde(rename = "EffectiveDate")]
    effective_date: String,
    #[serde(rename = "ExpiryDate")]
    expiry_date: String,
    #[serde(rename = "IsBlanket")]
    is_blanket: String,
    #[serde(rename = "CSPEventID")]
    csp_event_id: String,
    #[serde(rename = "RenewalCSPEventID")]
    renewal_csp_event_id: String,
    #[serde(rename = "CreatedAt")]
    created_at: String,
    #[serde(rename = "UpdatedAt")]
    updated_at: String,
}

fn opt_str(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn split_ids(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_date(value: &str) -> Result<Option<NaiveDate>, Box<dyn Error>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")?))
}

fn parse_timestamp(value: &str) -> Result<Option<DateTime<Utc>>, Box<dyn Error>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(
        DateTime::parse_from_rfc3339(value.trim())?.with_timezone(&Utc),
    ))
}

impl CsvRow {
    fn to_tariff(self) -> Result<Tariff, Box<dyn Error>> {
        let status = match self.status.as_str() {
            "proposed" => TariffStatus::Proposed,
            "active" => TariffStatus::Active,
            "expired" => TariffStatus::Expired,
            "superseded" => TariffStatus::Superseded,
            other => return Err(format!("Unknown Status: {}", other).into()),
        };

        let ownership_type = match self.ownership_type.as_str() {
            "customer_direct" => OwnershipType::CustomerDirect,
            "rocket_csp" => OwnershipType::RocketCsp,
            "customer_csp" => OwnershipType::CustomerCsp,
            "rocket_blanket" => OwnershipType::RocketBlanket,
            "priority1_blanket" => OwnershipType::Priority1Blanket,
            other => return Err(format!("Unknown OwnershipType: {}", other).into()),
        };

        let is_blanket_tariff = match self.is_blanket.trim() {
            "" | "0" | "false" => false,
            "1" | "true" => true,
            other => return Err(format!("Unknown IsBlanket: {}", other).into()),
        };

        Ok(Tariff {
            id: self.tariff_id,
            tariff_family_id: opt_str(self.family_id),
            tariff_reference_id: opt_str(self.reference_id),
            version: self.version,
            status,
            ownership_type,
            customer_id: opt_str(self.customer_id),
            customer_ids: split_ids(&self.customer_ids),
            carrier_id: opt_str(self.carrier_id),
            carrier_ids: split_ids(&self.carrier_ids),
            service_type: opt_str(self.service_type),
            mode: opt_str(self.mode),
            effective_date: parse_date(&self.effective_date)?,
            expiry_date: parse_date(&self.expiry_date)?,
            is_blanket_tariff,
            csp_event_id: opt_str(self.csp_event_id),
            renewal_csp_event_id: opt_str(self.renewal_csp_event_id),
            portal_username: None,
            portal_password: None,
            portal_url: None,
            created_by: None,
            updated_by: None,
            updated_reason: None,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Load all tariffs from a CSV snapshot file
pub fn load_tariffs<P: AsRef<Path>>(path: P) -> Result<Vec<Tariff>, Box<dyn Error>> {
    let mut reader = Reader::from_path(path)?;
    let mut tariffs = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let tariff = row.to_tariff()?;
        tariffs.push(tariff);
    }

    Ok(tariffs)
}

/// Load tariffs from any reader (e.g., string buffer, network stream)
pub fn load_tariffs_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Tariff>, Box<dyn Error>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut tariffs = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let tariff = row.to_tariff()?;
        tariffs.push(tariff);
    }

    Ok(tariffs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = "\
TariffID,FamilyID,ReferenceID,Version,Status,OwnershipType,CustomerID,CustomerIDs,CarrierID,CarrierIDs,ServiceType,Mode,EffectiveDate,ExpiryDate,IsBlanket,CSPEventID,RenewalCSPEventID,CreatedAt,UpdatedAt
t-1,fam-1,TRF-001,1,active,customer_direct,cust-1,,car-1,,LTL,Road,2024-01-01,2024-12-31,0,,,2024-01-01T08:00:00Z,2024-06-01T08:00:00Z
t-2,,TRF-002,1,proposed,rocket_blanket,,cust-1;cust-2,car-2,car-2;car-3,FTL,Road,2024-03-01,,1,csp-9,,,
";

    #[test]
    fn test_load_tariffs_from_reader() {
        let tariffs = load_tariffs_from_reader(SNAPSHOT.as_bytes()).expect("snapshot parses");
        assert_eq!(tariffs.len(), 2);

        let t1 = &tariffs[0];
        assert_eq!(t1.id, "t-1");
        assert_eq!(t1.status, TariffStatus::Active);
        assert_eq!(t1.ownership_type, OwnershipType::CustomerDirect);
        assert_eq!(t1.expiry_date, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert!(t1.updated_at.is_some());

        let t2 = &tariffs[1];
        assert!(t2.tariff_family_id.is_none());
        assert_eq!(t2.family_key(), "t-2");
        assert!(t2.is_blanket_tariff);
        assert_eq!(t2.customer_ids, vec!["cust-1", "cust-2"]);
        assert_eq!(t2.all_carrier_ids(), vec!["car-2", "car-3"]);
        assert!(t2.expiry_date.is_none());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let bad = SNAPSHOT.replace(",active,", ",live,");
        let result = load_tariffs_from_reader(bad.as_bytes());
        assert!(result.is_err());
    }
}
