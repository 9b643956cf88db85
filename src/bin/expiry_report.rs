//! Batch expiry report over a tariff snapshot
//!
//! Scores every tariff, aggregates risk levels and sourcing opportunities,
//! and writes a CSV report for the renewal desk.

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use rayon::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tariff_system::reference::{Carrier, ReferenceData};
use tariff_system::risk::{
    assess_risk_level, calculate_tariff_metrics, find_expiration_opportunities, RiskLevel,
};
use tariff_system::tariff::{load_tariffs, OwnershipType};

#[derive(Debug, Parser)]
#[command(about = "Generate an expiry risk report from a tariff snapshot")]
struct Args {
    /// Path to the tariffs.csv snapshot
    #[arg(long, default_value = "data/tariffs.csv")]
    tariffs: PathBuf,

    /// Path to the reference data directory
    #[arg(long, default_value = "data/reference")]
    reference: PathBuf,

    /// Valuation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Opportunity lookahead window in days
    #[arg(long, default_value_t = 90)]
    window: i64,

    /// Output CSV path
    #[arg(long, default_value = "expiry_report.csv")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let today = args.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let start = Instant::now();

    println!("Loading tariffs from {}...", args.tariffs.display());
    let tariffs = load_tariffs(&args.tariffs)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("failed to load {}", args.tariffs.display()))?;
    println!("Loaded {} tariffs in {:?}", tariffs.len(), start.elapsed());

    let refs = ReferenceData::from_csv_path(&args.reference)
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("failed to load {}", args.reference.display()))?;
    let carriers: Vec<Carrier> = refs.carriers().cloned().collect();

    // Score every tariff in parallel
    let scan_start = Instant::now();
    let assessments: Vec<(String, RiskLevel, String)> = tariffs
        .par_iter()
        .map(|t| {
            let assessment = assess_risk_level(t, today);
            (t.id.clone(), assessment.level, assessment.message)
        })
        .collect();
    println!(
        "Scored {} tariffs in {:?}",
        assessments.len(),
        scan_start.elapsed()
    );

    let count_of = |level: RiskLevel| assessments.iter().filter(|(_, l, _)| *l == level).count();

    let opportunities = find_expiration_opportunities(&tariffs, &carriers, today, args.window);

    // Write the report
    let mut file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    writeln!(file, "TariffID,Customer,Carrier,ExpiryDate,DaysUntilExpiry,Priority")?;
    for opp in &opportunities {
        writeln!(
            file,
            "{},{},{},{},{},{:?}",
            opp.tariff_id,
            opp.customer_id
                .as_deref()
                .map(|id| refs.customer_name(id))
                .unwrap_or(""),
            opp.carrier_name,
            opp.expiry_date,
            opp.days_until_expiry,
            opp.priority,
        )?;
    }

    let metrics = calculate_tariff_metrics(&tariffs, today);
    println!("\nBy ownership:");
    for ownership in OwnershipType::all() {
        println!(
            "  {:<18} {}",
            ownership.label(),
            metrics.by_ownership.count(ownership)
        );
    }

    println!("\nRisk Summary (as of {}):", today);
    println!("  Critical: {}", count_of(RiskLevel::Critical));
    println!("  High:     {}", count_of(RiskLevel::High));
    println!("  Medium:   {}", count_of(RiskLevel::Medium));
    println!("  Low:      {}", count_of(RiskLevel::Low));
    println!("  None:     {}", count_of(RiskLevel::None));
    println!("  Unknown:  {}", count_of(RiskLevel::Unknown));

    println!(
        "\n{} sourcing opportunities within {} days written to {}",
        opportunities.len(),
        args.window,
        args.output.display()
    );
    println!("Total time: {:?}", start.elapsed());

    Ok(())
}
