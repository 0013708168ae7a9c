//! AWS Lambda handler for running cost projections
//!
//! Accepts the workbench inputs as JSON and returns the full simulation
//! result, narrative included.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use cost_projection::{HistoryPolicy, ScenarioRunner, SimulationInputs, SimulationResult};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Run options carried in the same request body as the inputs
#[derive(Debug, Deserialize)]
pub struct RunOptions {
    /// Fixed seed for a reproducible run (default: fresh entropy)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Pre-fill historical costs from the renewal history
    #[serde(default)]
    pub derive_history: bool,

    /// When true, derived history does not replace supplied history
    #[serde(default)]
    pub allow_edit_history: bool,
}

/// Output from the projection
#[derive(Debug, Serialize)]
pub struct ProjectionResponse {
    #[serde(flatten)]
    pub result: SimulationResult,
    /// Chance of at least one bad year over three years
    pub three_year_bad_year_probability: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub derived_history: Vec<f64>,
    pub execution_time_ms: u64,
}

fn runner() -> &'static ScenarioRunner {
    static RUNNER: OnceLock<ScenarioRunner> = OnceLock::new();
    RUNNER.get_or_init(|| match ScenarioRunner::from_csv() {
        Ok(runner) => runner,
        Err(e) => {
            log::warn!("using doctrine constants: {}", e);
            ScenarioRunner::new()
        }
    })
}

fn cors(builder: lambda_http::http::response::Builder) -> lambda_http::http::response::Builder {
    builder
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message }).to_string();
    Ok(cors(Response::builder())
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(body))?)
}

fn json_response(body: &ProjectionResponse) -> Result<Response<Body>, Error> {
    Ok(cors(Response::builder())
        .status(200)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?)
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

    let parsed = serde_json::from_str::<SimulationInputs>(&body_str).and_then(|inputs| {
        serde_json::from_str::<RunOptions>(&body_str).map(|options| (inputs, options))
    });
    let (mut inputs, options) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => return error_response(400, &format!("Invalid JSON: {}", e)),
    };

    let derived_history = if options.derive_history {
        let policy = if options.allow_edit_history {
            HistoryPolicy::Editable
        } else {
            HistoryPolicy::Locked
        };
        inputs.apply_derived_history(policy)
    } else {
        Vec::new()
    };

    let result = match options.seed {
        Some(seed) => runner().run_seeded(&inputs, seed),
        None => runner().run(&inputs),
    };

    let response = ProjectionResponse {
        three_year_bad_year_probability: result.bad_year_stats.three_year_probability(),
        result,
        derived_history,
        execution_time_ms: start.elapsed().as_millis() as u64,
    };

    log::info!(
        "simulated {} iterations in {} ms",
        response.result.iterations,
        response.execution_time_ms
    );

    json_response(&response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
