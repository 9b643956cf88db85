//! AWS Lambda handler for tariff analytics
//!
//! Accepts a tariff snapshot plus an operation via JSON and returns
//! portfolio metrics, sourcing opportunities, carrier blockers, or a
//! competitiveness analysis.

use chrono::NaiveDate;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use tariff_system::reference::Carrier;
use tariff_system::risk::{
    analyze_tariff_competitiveness, calculate_tariff_metrics, find_expiration_opportunities,
    identify_carrier_blockers, CarrierBlocker, CompetitivenessAnalysis, ExpirationOpportunity,
    TariffMetrics,
};
use tariff_system::tariff::Tariff;

/// Analytics operation to run over the submitted snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Metrics,
    Opportunities,
    Blockers,
    Competitiveness,
}

/// Input for one analytics invocation
#[derive(Debug, Deserialize)]
pub struct AnalyticsRequest {
    pub operation: Operation,

    /// Valuation date for every date-window computation
    pub as_of_date: NaiveDate,

    #[serde(default)]
    pub tariffs: Vec<Tariff>,

    /// Carrier reference list (needed for opportunities and blockers)
    #[serde(default)]
    pub carriers: Vec<Carrier>,

    /// Lookahead window for opportunities (default: 90 days)
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

fn default_window_days() -> i64 {
    90
}

/// Output from one analytics invocation
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub operation: Operation,
    pub as_of_date: NaiveDate,
    pub tariff_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TariffMetrics>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<Vec<ExpirationOpportunity>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockers: Option<Vec<CarrierBlocker>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitiveness: Option<CompetitivenessAnalysis>,

    pub execution_time_ms: u64,
}

async fn handler(event: LambdaEvent<AnalyticsRequest>) -> Result<AnalyticsResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;
    let today = request.as_of_date;

    let mut response = AnalyticsResponse {
        operation: request.operation,
        as_of_date: today,
        tariff_count: request.tariffs.len(),
        metrics: None,
        opportunities: None,
        blockers: None,
        competitiveness: None,
        execution_time_ms: 0,
    };

    match request.operation {
        Operation::Metrics => {
            response.metrics = Some(calculate_tariff_metrics(&request.tariffs, today));
        }
        Operation::Opportunities => {
            response.opportunities = Some(find_expiration_opportunities(
                &request.tariffs,
                &request.carriers,
                today,
                request.window_days,
            ));
        }
        Operation::Blockers => {
            response.blockers = Some(identify_carrier_blockers(
                &request.tariffs,
                &request.carriers,
                today,
            ));
        }
        Operation::Competitiveness => {
            let direct: Vec<Tariff> = request
                .tariffs
                .iter()
                .filter(|t| t.ownership_type == tariff_system::OwnershipType::CustomerDirect)
                .cloned()
                .collect();
            let blanket: Vec<Tariff> = request
                .tariffs
                .iter()
                .filter(|t| t.ownership_type.is_blanket())
                .cloned()
                .collect();
            let csp: Vec<Tariff> = request
                .tariffs
                .iter()
                .filter(|t| t.ownership_type.is_csp())
                .cloned()
                .collect();
            response.competitiveness =
                Some(analyze_tariff_competitiveness(&direct, &blanket, &csp));
        }
    }

    response.execution_time_ms = start.elapsed().as_millis() as u64;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
