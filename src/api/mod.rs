mod error;
mod history;
mod identity;
pub mod payload;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::access::{FeatureKey, normalize_assumptions};
use crate::config::AppConfig;
use crate::core::{
    ComputationError, DividendGoalResponse, DividendGoalScenarioCompareResponse,
    DividendGoalShockResponse, DividendGoalSnapshot, Inputs, SCENARIO_PRESETS, TaxMode,
    compare_scenarios, run_shock, run_simulation,
};
use crate::history::{InMemoryRoadmapHistoryStore, RoadmapHistoryStore};
use crate::portfolio::{
    Holding, HoldingsStore, InMemoryHoldingsStore, resolve_snapshot, validate_holdings,
};

pub use error::ApiError;
pub use identity::{Identity, USER_ID_HEADER, USER_PLAN_HEADER};
use payload::{
    DividendGoalRequest, DividendGoalScenarioCompareRequest, DividendGoalShockRequest,
    ProjectionContext, build_inputs, build_scenario_inputs, validate_shock,
};

pub struct AppState {
    pub config: AppConfig,
    pub holdings: Arc<dyn HoldingsStore>,
    pub history: Arc<dyn RoadmapHistoryStore>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn in_memory(config: AppConfig) -> Self {
        Self {
            config,
            holdings: Arc::new(InMemoryHoldingsStore::default()),
            history: Arc::new(InMemoryRoadmapHistoryStore::default()),
        }
    }

    fn projection_context(&self) -> ProjectionContext {
        ProjectionContext {
            start_year: self.config.current_year(),
            reinvestment: self.config.reinvestment,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HoldingsBody {
    holdings: Vec<Holding>,
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/holdings", get(get_holdings_handler).put(put_holdings_handler))
        .route("/api/simulations/dividend-goal", post(simulate_handler))
        .route("/api/simulations/dividend-goal/shock", post(shock_handler))
        .route(
            "/api/simulations/dividend-goal/scenarios",
            post(scenarios_handler),
        )
        .route(
            "/api/roadmap/history",
            get(history::list_history_handler).post(history::create_history_handler),
        )
        .route(
            "/api/roadmap/history/:id",
            get(history::get_history_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(config: AppConfig) -> std::io::Result<()> {
    let addr = config.bind;
    let app = build_router(Arc::new(AppState::in_memory(config)));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "dividend roadmap API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

/// Malformed JSON and well-formed JSON of the wrong shape get distinct messages.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| ApiError::bad_request("Invalid JSON body."))?;
    serde_json::from_value(value).map_err(|err| ApiError::BadRequest {
        message: "Invalid request body.".to_string(),
        details: Some(json!({ "reason": err.to_string() })),
    })
}

/// Validates the raw request first, then applies the plan's assumption rules.
fn goal_inputs(
    state: &AppState,
    identity: &Identity,
    request: &DividendGoalRequest,
) -> Result<Inputs, ApiError> {
    let mut inputs = build_inputs(request, state.projection_context())?;
    let assumptions = normalize_assumptions(&request.assumptions, identity.plan);
    inputs.reinvest_rate = assumptions.reinvest_rate.unwrap_or(1.0);
    Ok(inputs)
}

async fn snapshot_for(
    state: &AppState,
    identity: &Identity,
    tax_mode: TaxMode,
) -> Result<DividendGoalSnapshot, ApiError> {
    let holdings = state.holdings.holdings_for(&identity.user_id).await?;
    Ok(resolve_snapshot(&holdings, tax_mode))
}

fn log_computation_failure(identity: &Identity, inputs: &Inputs, err: &ComputationError) {
    error!(
        user_id = %identity.user_id,
        start_year = inputs.start_year,
        horizon_years = inputs.horizon_years,
        yield_rate = inputs.yield_rate,
        dividend_growth_rate = inputs.dividend_growth_rate,
        monthly_contribution = inputs.monthly_contribution,
        error = %err,
        "dividend goal projection failed"
    );
}

pub async fn simulate(
    state: &AppState,
    identity: &Identity,
    request: &DividendGoalRequest,
) -> Result<DividendGoalResponse, ApiError> {
    let inputs = goal_inputs(state, identity, request)?;
    let snapshot = snapshot_for(state, identity, request.assumptions.tax_mode).await?;
    run_simulation(&snapshot, &inputs).map_err(|err| {
        log_computation_failure(identity, &inputs, &err);
        ApiError::from(err)
    })
}

pub async fn simulate_shock(
    state: &AppState,
    identity: &Identity,
    request: &DividendGoalShockRequest,
) -> Result<DividendGoalShockResponse, ApiError> {
    let inputs = goal_inputs(state, identity, &request.goal)?;
    validate_shock(&request.shock, inputs.start_year, inputs.horizon_years)?;
    let snapshot = snapshot_for(state, identity, request.goal.assumptions.tax_mode).await?;
    run_shock(&snapshot, &inputs, request.shock).map_err(|err| {
        error!(
            shock_year = request.shock.year,
            shock_rate = request.shock.rate,
            "shock simulation failed"
        );
        log_computation_failure(identity, &inputs, &err);
        ApiError::from(err)
    })
}

pub async fn simulate_scenarios(
    state: &AppState,
    identity: &Identity,
    request: &DividendGoalScenarioCompareRequest,
) -> Result<DividendGoalScenarioCompareResponse, ApiError> {
    let inputs = build_scenario_inputs(request, state.projection_context())?;
    let snapshot = snapshot_for(state, identity, TaxMode::AfterTax).await?;
    let scenarios = compare_scenarios(&snapshot, &inputs, &SCENARIO_PRESETS).map_err(|err| {
        log_computation_failure(identity, &inputs, &err);
        ApiError::from(err)
    })?;
    Ok(DividendGoalScenarioCompareResponse { scenarios })
}

async fn simulate_handler(
    State(state): State<SharedState>,
    identity: Identity,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: DividendGoalRequest = parse_body(&body)?;
    let response = simulate(&state, &identity, &request).await?;
    info!(
        user_id = %identity.user_id,
        horizon_years = request.horizon_years,
        achieved = response.result.achieved,
        "dividend goal simulated"
    );
    Ok(json_response(StatusCode::OK, response))
}

async fn shock_handler(
    State(state): State<SharedState>,
    identity: Identity,
    body: Bytes,
) -> Result<Response, ApiError> {
    identity.require(FeatureKey::StressTest)?;
    let request: DividendGoalShockRequest = parse_body(&body)?;
    let response = simulate_shock(&state, &identity, &request).await?;
    info!(
        user_id = %identity.user_id,
        shock_year = request.shock.year,
        shock_rate = request.shock.rate,
        "dividend goal shock simulated"
    );
    Ok(json_response(StatusCode::OK, response))
}

async fn scenarios_handler(
    State(state): State<SharedState>,
    identity: Identity,
    body: Bytes,
) -> Result<Response, ApiError> {
    identity.require(FeatureKey::ScenarioCompare)?;
    let request: DividendGoalScenarioCompareRequest = parse_body(&body)?;
    let response = simulate_scenarios(&state, &identity, &request).await?;
    Ok(json_response(StatusCode::OK, response))
}

async fn get_holdings_handler(
    State(state): State<SharedState>,
    identity: Identity,
) -> Result<Response, ApiError> {
    let holdings = state.holdings.holdings_for(&identity.user_id).await?;
    Ok(json_response(StatusCode::OK, HoldingsBody { holdings }))
}

async fn put_holdings_handler(
    State(state): State<SharedState>,
    identity: Identity,
    body: Bytes,
) -> Result<Response, ApiError> {
    let HoldingsBody { holdings } = parse_body(&body)?;
    validate_holdings(&holdings).map_err(|(index, message)| ApiError::BadRequest {
        message,
        details: Some(json!({ "field": format!("holdings[{index}]") })),
    })?;

    state
        .holdings
        .replace_holdings(&identity.user_id, holdings.clone())
        .await?;
    info!(user_id = %identity.user_id, count = holdings.len(), "holdings replaced");
    Ok(json_response(StatusCode::OK, HoldingsBody { holdings }))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
