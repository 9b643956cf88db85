//! CSV-based reference data loader
//!
//! Loads customers, carriers, and CSP events from CSV files in data/reference/

use super::{Carrier, CspEvent, Customer, ReferenceData};
use std::error::Error;
use std::fs::File;
use std::path::Path;

/// Default path to the reference data directory
pub const DEFAULT_REFERENCE_PATH: &str = "data/reference";

fn opt_field(record: &csv::StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Load customers from customers.csv (columns: CustomerID, Name)
pub fn load_customers(path: &Path) -> Result<Vec<Customer>, Box<dyn Error>> {
    let file = File::open(path.join("customers.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut customers = Vec::new();

    for result in reader.records() {
        let record = result?;
        customers.push(Customer {
            id: record[0].to_string(),
            name: record[1].to_string(),
        });
    }

    Ok(customers)
}

/// Load carriers from carriers.csv (columns: CarrierID, Name, SCAC)
pub fn load_carriers(path: &Path) -> Result<Vec<Carrier>, Box<dyn Error>> {
    let file = File::open(path.join("carriers.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut carriers = Vec::new();

    for result in reader.records() {
        let record = result?;
        carriers.push(Carrier {
            id: record[0].to_string(),
            name: record[1].to_string(),
            scac: opt_field(&record, 2),
        });
    }

    Ok(carriers)
}

/// Load CSP events from csp_events.csv
/// (columns: EventID, Title, Status, RenewalForFamilyID)
pub fn load_csp_events(path: &Path) -> Result<Vec<CspEvent>, Box<dyn Error>> {
    let file = File::open(path.join("csp_events.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut events = Vec::new();

    for result in reader.records() {
        let record = result?;
        events.push(CspEvent {
            id: record[0].to_string(),
            title: record[1].to_string(),
            status: opt_field(&record, 2),
            renewal_for_family_id: opt_field(&record, 3),
        });
    }

    Ok(events)
}

impl ReferenceData {
    /// Load all reference collections from the default directory
    pub fn from_csv() -> Result<Self, Box<dyn Error>> {
        Self::from_csv_path(Path::new(DEFAULT_REFERENCE_PATH))
    }

    /// Load all reference collections from a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        Ok(Self::new(
            load_customers(path)?,
            load_carriers(path)?,
            load_csp_events(path)?,
        ))
    }
}
