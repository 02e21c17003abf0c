//! AWS Lambda handler for running savings projections
//!
//! Accepts a parameter set as JSON and returns the annual ledger along with
//! a summary and the chart title. Fields missing from the request take the
//! default parameter values.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use savings_projection::{
    projection::ProjectionSummary,
    report::{chart_title, display_rows, AgeLabel, DisplayRow, ReportOptions},
    AnnualRecord, LimitTable, Parameters, ProjectionEngine,
};

/// Input for a projection
#[derive(Debug, Deserialize)]
pub struct ProjectionRequest {
    #[serde(flatten)]
    pub params: Parameters,

    /// Clamp contributions to the built-in 2025 401(k) limits
    #[serde(default)]
    pub apply_irs_limits: bool,

    /// Label display rows with the age at the end of each plan year
    #[serde(default)]
    pub end_of_year_age: bool,

    /// Include a Year 0 row in the display rows
    #[serde(default)]
    pub include_baseline: bool,

    /// Calendar year in which the plan starts
    #[serde(default)]
    pub start_year: Option<i32>,
}

/// Output from the projection
#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    pub title: String,
    pub summary: ProjectionSummary,
    pub records: Vec<AnnualRecord>,
    pub table: Vec<DisplayRow>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn json_response<T: Serialize>(status: u16, body: &T) -> Result<Response<Body>, Error> {
    let text = serde_json::to_string(body)?;
    let response = cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(text))?;
    Ok(response)
}

fn error_response(status: u16, message: String) -> Result<Response<Body>, Error> {
    warn!("rejecting request: {}", message);
    json_response(status, &ErrorBody { error: message })
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(cors(Response::builder()).status(200).body(Body::Empty)?);
    }

    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: ProjectionRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => return error_response(400, format!("Invalid JSON: {}", e)),
    };

    let engine = if request.apply_irs_limits {
        ProjectionEngine::with_limits(std::sync::Arc::new(LimitTable::irs_2025()))
    } else {
        ProjectionEngine::new()
    };

    let result = match engine.project(&request.params) {
        Ok(result) => result,
        Err(e) => return error_response(400, e.to_string()),
    };

    let options = ReportOptions {
        age_label: if request.end_of_year_age {
            AgeLabel::EndOfYear
        } else {
            AgeLabel::StartOfYear
        },
        include_baseline: request.include_baseline,
        plan_start_year: request.start_year,
    };

    let response = ProjectionResponse {
        title: chart_title(&request.params),
        summary: result.summary(),
        table: display_rows(&result.records, &options),
        records: result.records,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "projected {} years in {} ms",
        response.summary.total_years, response.execution_time_ms
    );
    json_response(200, &response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
