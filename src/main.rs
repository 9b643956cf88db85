//! Tariff System CLI
//!
//! Walks a sample portfolio through the lifecycle service, the grouping
//! engine, and the risk calculators, then writes the CSV export.

use chrono::{Duration, Utc};
use tariff_system::export::export_tariffs_to_path;
use tariff_system::grouping::{GroupingConfig, GroupingEngine};
use tariff_system::lifecycle::{InMemoryStore, LifecycleService, TariffDraft, TariffStore};
use tariff_system::reference::{Carrier, CspEvent, Customer, ReferenceData};
use tariff_system::risk::{
    assess_risk_level, calculate_tariff_metrics, identify_carrier_blockers,
};
use tariff_system::tariff::{OwnershipType, TariffStatus};

fn main() {
    env_logger::init();

    println!("Tariff System v0.1.0");
    println!("====================\n");

    let today = Utc::now().date_naive();

    let refs = ReferenceData::new(
        vec![
            Customer {
                id: "cust-1".to_string(),
                name: "Acme Foods".to_string(),
            },
            Customer {
                id: "cust-2".to_string(),
                name: "Zenith Chemicals".to_string(),
            },
        ],
        vec![
            Carrier {
                id: "car-1".to_string(),
                name: "Road Runner Freight".to_string(),
                scac: Some("RRFR".to_string()),
            },
            Carrier {
                id: "car-2".to_string(),
                name: "Bluegrass Lines".to_string(),
                scac: Some("BGLN".to_string()),
            },
        ],
        vec![CspEvent {
            id: "csp-1".to_string(),
            title: "2025 Midwest LTL Sourcing".to_string(),
            status: Some("awarded".to_string()),
            renewal_for_family_id: None,
        }],
    );

    // Seed a portfolio through the lifecycle service
    let mut service = LifecycleService::new(InMemoryStore::new());

    let mut expiring = TariffDraft {
        tariff_family_id: Some("fam-acme-rr".to_string()),
        tariff_reference_id: Some("TRF-1001".to_string()),
        version: "1".to_string(),
        status: TariffStatus::Active,
        ownership_type: OwnershipType::RocketCsp,
        customer_id: Some("cust-1".to_string()),
        carrier_id: Some("car-1".to_string()),
        service_type: Some("LTL".to_string()),
        mode: Some("Road".to_string()),
        effective_date: Some(today - Duration::days(320)),
        expiry_date: Some(today + Duration::days(45)),
        csp_event_id: Some("csp-1".to_string()),
        ..TariffDraft::default()
    };
    service
        .create_tariff(expiring.clone(), "demo")
        .expect("seed tariff");

    // Proposed renewal in the same family, expiry left blank on purpose
    expiring.version = "2".to_string();
    expiring.status = TariffStatus::Proposed;
    expiring.effective_date = Some(today + Duration::days(45));
    expiring.expiry_date = None;
    let renewal = service
        .create_tariff(expiring, "demo")
        .expect("seed renewal");
    println!(
        "Proposed renewal {} defaulted expiry to {}",
        renewal.tariff.id,
        renewal
            .tariff
            .expiry_date
            .map(|d| d.to_string())
            .unwrap_or_default()
    );

    let direct = TariffDraft {
        tariff_reference_id: Some("TRF-2001".to_string()),
        version: "1".to_string(),
        status: TariffStatus::Active,
        ownership_type: OwnershipType::CustomerDirect,
        customer_id: Some("cust-2".to_string()),
        carrier_id: Some("car-2".to_string()),
        service_type: Some("FTL".to_string()),
        mode: Some("Road".to_string()),
        effective_date: Some(today - Duration::days(100)),
        expiry_date: Some(today + Duration::days(200)),
        ..TariffDraft::default()
    };
    service.create_tariff(direct, "demo").expect("seed direct");

    let linkage = service
        .link_renewal("fam-acme-rr", "csp-1", "demo")
        .expect("link renewal");
    println!("{}\n", linkage.summary());

    let tariffs = service.store().list().expect("list tariffs");

    // Group the CSP scope
    let engine = GroupingEngine::new(&refs, GroupingConfig::new(today));
    let groups = engine.group(&tariffs, OwnershipType::RocketCsp);

    println!("CSP scope ({} groups):", groups.len());
    for group in &groups {
        println!(
            "  {}: {} live / {} archived families",
            group.label,
            group.live_families.len(),
            group.archived_families.len()
        );
        for family in group.families() {
            for version in &family.versions {
                let risk = assess_risk_level(version, today);
                println!(
                    "    v{:<10} {:<11} risk={:<8} {}",
                    version.version,
                    version.status.as_str(),
                    risk.level.as_str(),
                    risk.message
                );
            }
        }
    }

    // Portfolio metrics
    let metrics = calculate_tariff_metrics(&tariffs, today);
    println!("\nPortfolio Metrics:");
    println!("  Total: {}", metrics.total);
    println!("  Active: {}", metrics.active);
    println!("  Expired: {}", metrics.expired);
    println!(
        "  Expiring (30/60/90d): {}/{}/{}",
        metrics.expiring.next_30_days,
        metrics.expiring.next_60_days,
        metrics.expiring.next_90_days
    );

    println!(
        "\nDashboard payload:\n{}",
        serde_json::to_string_pretty(&metrics).expect("serialize metrics")
    );

    // Carrier blockers from the customer-direct book
    let carriers: Vec<Carrier> = refs.carriers().cloned().collect();
    let direct_book: Vec<_> = tariffs
        .iter()
        .filter(|t| t.ownership_type == OwnershipType::CustomerDirect)
        .cloned()
        .collect();
    let blockers = identify_carrier_blockers(&direct_book, &carriers, today);
    println!("\nCarrier Blockers:");
    for blocker in &blockers {
        println!("  {}", blocker.reason);
    }

    // Full export
    let csv_path = "tariff_export.csv";
    export_tariffs_to_path(&tariffs, &refs, csv_path).expect("Unable to write CSV export");
    println!("\nFull export written to: {}", csv_path);
}
