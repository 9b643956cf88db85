//! CSV export of tariff snapshots
//!
//! One row per tariff version, fixed column order, every value quoted to
//! match the output of the system this replaces.

use crate::reference::ReferenceData;
use crate::tariff::Tariff;
use csv::{QuoteStyle, WriterBuilder};
use std::error::Error;
use std::io::Write;
use std::path::Path;

/// Export column order; consumers depend on this staying fixed
pub const EXPORT_COLUMNS: [&str; 12] = [
    "Tariff ID",
    "Customer",
    "Carrier(s)",
    "Status",
    "Ownership",
    "Service Type",
    "Mode",
    "Effective Date",
    "Expiry Date",
    "CSP Event",
    "Created Date",
    "Updated Date",
];

fn format_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_timestamp(ts: Option<chrono::DateTime<chrono::Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Write tariffs as CSV to any writer
pub fn export_tariffs_csv<W: Write>(
    tariffs: &[Tariff],
    refs: &ReferenceData,
    writer: W,
) -> Result<(), Box<dyn Error>> {
    let mut csv_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(EXPORT_COLUMNS)?;

    for tariff in tariffs {
        let customer = tariff
            .all_customer_ids()
            .iter()
            .map(|id| refs.customer_name(id))
            .collect::<Vec<_>>()
            .join("; ");
        let carriers = refs.carrier_names(&tariff.all_carrier_ids());

        csv_writer.write_record([
            tariff.id.as_str(),
            customer.as_str(),
            carriers.as_str(),
            tariff.status.as_str(),
            tariff.ownership_type.label(),
            tariff.service_type.as_deref().unwrap_or(""),
            tariff.mode.as_deref().unwrap_or(""),
            format_date(tariff.effective_date).as_str(),
            format_date(tariff.expiry_date).as_str(),
            refs.event_title(tariff.csp_event_id.as_deref()),
            format_timestamp(tariff.created_at).as_str(),
            format_timestamp(tariff.updated_at).as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write tariffs as CSV to a file path
pub fn export_tariffs_to_path<P: AsRef<Path>>(
    tariffs: &[Tariff],
    refs: &ReferenceData,
    path: P,
) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    export_tariffs_csv(tariffs, refs, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{Carrier, Customer};
    use crate::tariff::{OwnershipType, TariffStatus};
    use chrono::NaiveDate;

    fn refs() -> ReferenceData {
        ReferenceData::new(
            vec![Customer {
                id: "cust-1".to_string(),
                // Comma in the name exercises the quoting
                name: "Acme Foods, Inc.".to_string(),
            }],
            vec![
                Carrier {
                    id: "car-1".to_string(),
                    name: "Road Runner Freight".to_string(),
                    scac: None,
                },
                Carrier {
                    id: "car-2".to_string(),
                    name: "Bluegrass Lines".to_string(),
                    scac: None,
                },
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_export_fixed_columns_and_quoting() {
        let mut tariff = Tariff::new("t-1", "1", TariffStatus::Active, OwnershipType::CustomerDirect);
        tariff.customer_id = Some("cust-1".to_string());
        tariff.carrier_id = Some("car-1".to_string());
        tariff.carrier_ids = vec!["car-2".to_string()];
        tariff.service_type = Some("LTL".to_string());
        tariff.effective_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        tariff.expiry_date = NaiveDate::from_ymd_opt(2024, 12, 31);

        let mut out = Vec::new();
        export_tariffs_csv(&[tariff], &refs(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("\"Tariff ID\",\"Customer\",\"Carrier(s)\""));

        let row = lines.next().unwrap();
        assert!(row.contains("\"Acme Foods, Inc.\""));
        assert!(row.contains("\"Road Runner Freight; Bluegrass Lines\""));
        assert!(row.contains("\"Customer Direct\""));
        assert!(row.contains("\"2024-12-31\""));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_missing_fields_export_as_empty_strings() {
        let tariff = Tariff::new("t-1", "1", TariffStatus::Proposed, OwnershipType::RocketCsp);

        let mut out = Vec::new();
        export_tariffs_csv(&[tariff], &refs(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let row = text.lines().nth(1).unwrap();
        // No customer, carrier, dates, or event: empty quoted cells remain
        assert!(row.contains("\"\",\"\""));
        assert!(row.contains("\"proposed\""));
    }
}
