//! Axum HTTP server: stateless endpoints for the interactive dashboard.
//!
//! Every request builds its own generator, runs once, and returns the
//! report. Nothing is kept between requests.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/simulate` | Run one simulation from query parameters |
//! | GET | `/presets` | List the named scenarios |
//! | GET | `/preset` | Run a named scenario (`?name=release`, plus any `/simulate` override) |

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::error::SimulationError;
use crate::presets::Preset;
use crate::simulation::{
    run_scenario_with, SamplingMethod, Scenario, ScenarioOverrides, SimulationRun,
};
use crate::types::{probability_from_percent, ThresholdMode};

/// Server-wide settings shared by all handlers.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Reject inputs outside the dashboard's slider ranges.
    pub enforce_input_bounds: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enforce_input_bounds: true,
        }
    }
}

pub type AppState = Arc<ServerConfig>;

pub fn create_router() -> Router {
    create_router_with(ServerConfig::default())
}

pub fn create_router_with(config: ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/simulate", get(handle_simulate))
        .route("/presets", get(handle_list_presets))
        .route("/preset", get(handle_run_preset))
        .layer(cors)
        .with_state(Arc::new(config))
}

// ── Request types ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct SimulateQuery {
    features: Option<i64>,
    deploys: Option<i64>,
    /// Percent, e.g. `5` for 5 %.
    probability: Option<f64>,
    simulations: Option<i64>,
    threshold: Option<u64>,
    mode: Option<String>,
    seed: Option<u64>,
    method: Option<String>,
}

#[derive(Deserialize)]
struct PresetQuery {
    name: String,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(serde_json::json!({ "error": msg })))
}

fn bad_request(err: SimulationError) -> ApiError {
    tracing::warn!(error = %err, "rejected request");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

impl SimulateQuery {
    fn overrides(&self) -> Result<ScenarioOverrides, SimulationError> {
        let mode = self
            .mode
            .as_deref()
            .map(|m| m.parse::<ThresholdMode>())
            .transpose()?;
        Ok(ScenarioOverrides {
            features_per_version: self.features,
            deploys_per_version: self.deploys,
            failure_probability: self.probability.map(probability_from_percent),
            simulation_count: self.simulations,
            threshold: self.threshold,
            mode,
            seed: self.seed,
        })
    }

    fn method(&self) -> Result<Option<SamplingMethod>, SimulationError> {
        self.method
            .as_deref()
            .filter(|m| !m.eq_ignore_ascii_case("auto"))
            .map(|m| m.parse::<SamplingMethod>())
            .transpose()
    }
}

fn run_checked(
    config: &ServerConfig,
    scenario: &Scenario,
    method: Option<SamplingMethod>,
) -> Result<Json<SimulationRun>, ApiError> {
    if config.enforce_input_bounds {
        scenario
            .parameters
            .check_input_bounds()
            .map_err(bad_request)?;
    }
    run_scenario_with(scenario, method)
        .map(Json)
        .map_err(bad_request)
}

// ── Handlers ────────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_simulate(
    State(config): State<AppState>,
    Query(query): Query<SimulateQuery>,
) -> Result<Json<SimulationRun>, ApiError> {
    let scenario = Scenario::custom().with_overrides(&query.overrides().map_err(bad_request)?);
    run_checked(&config, &scenario, query.method().map_err(bad_request)?)
}

async fn handle_list_presets() -> impl IntoResponse {
    let presets: Vec<serde_json::Value> = Preset::ALL
        .iter()
        .map(|p| {
            serde_json::json!({
                "name": p.name(),
                "description": p.description(),
                "scenario": p.scenario(),
            })
        })
        .collect();
    Json(serde_json::json!({ "presets": presets }))
}

/// Run a preset; any `/simulate` parameter given overrides the preset's value.
async fn handle_run_preset(
    State(config): State<AppState>,
    Query(preset): Query<PresetQuery>,
    Query(query): Query<SimulateQuery>,
) -> Result<Json<SimulationRun>, ApiError> {
    let preset: Preset = preset.name.parse().map_err(|err: SimulationError| {
        tracing::warn!(error = %err, "unknown preset");
        error_response(StatusCode::NOT_FOUND, &err.to_string())
    })?;
    let scenario = preset
        .scenario()
        .with_overrides(&query.overrides().map_err(bad_request)?);
    run_checked(&config, &scenario, query.method().map_err(bad_request)?)
}
