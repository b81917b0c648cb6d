// Axum API Server Module
//
// Purpose: REST surface over the engine context (evaluation, zoning, status,
// analysis runs). Presentation concerns stay with the client.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::context::EngineContext;
use crate::error::{ErrorKind, SuitabilityError};
use crate::suitability::Factor;
use crate::zoning::{CropRequirements, SubScores, UnitInput, UnitMeasurements};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<EngineContext>,
}

impl AppState {
    pub fn new(context: Arc<EngineContext>) -> Self {
        Self { context }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // System lifecycle
        .route("/api/system/status", get(system_status))
        .route("/api/analysis/run", post(run_analysis))

        // Reference data
        .route("/api/crops", get(list_crops))

        // Engine endpoints
        .route("/api/suitability/evaluate", post(evaluate_suitability))
        .route("/api/zoning/generate", post(generate_zoning))
        .route("/api/zoning/measured", post(generate_measured_zoning))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new()) // gzip + brotli compression
        .layer(CorsLayer::permissive()) // Allow all origins (adjust for production)
        .layer(TraceLayer::new_for_http()) // Request logging
        .with_state(state)
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct EvaluateRequest {
    factors: Vec<Factor>,
}

/// Sub-scores as sent by clients; missing fields are rejected explicitly
#[derive(Debug, Deserialize)]
struct SubScoresPayload {
    temp: Option<f64>,
    water: Option<f64>,
    soil: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitPayload {
    name: String,
    sub_scores: Option<SubScoresPayload>,
}

impl UnitPayload {
    fn into_unit(self) -> Result<UnitInput, SuitabilityError> {
        let missing = |field: &str| SuitabilityError::invalid_input(format!("unit '{}' is missing {}", self.name, field));

        let scores = self.sub_scores.as_ref().ok_or_else(|| missing("subScores"))?;
        let sub_scores = SubScores::new(
            scores.temp.ok_or_else(|| missing("subScores.temp"))?,
            scores.water.ok_or_else(|| missing("subScores.water"))?,
            scores.soil.ok_or_else(|| missing("subScores.soil"))?,
        );
        Ok(UnitInput::new(self.name, sub_scores))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoningRequest {
    #[serde(default = "default_crop")]
    crop_type: String,
    precision: Option<String>,
    units: Vec<UnitPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeasuredZoningRequest {
    #[serde(default = "default_crop")]
    crop_type: String,
    precision: Option<String>,
    requirements: CropRequirements,
    units: Vec<UnitMeasurements>,
}

fn default_crop() -> String {
    crate::zoning::FALLBACK_CROP.to_string()
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn system_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.context.status();
    Json(serde_json::json!({
        "status": "success",
        "system": snapshot,
    }))
}

async fn run_analysis(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let run = state.context.begin_analysis_run()?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "run": run,
    })))
}

async fn list_crops(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let table = state
        .context
        .crop_weights()
        .ok_or_else(|| SuitabilityError::configuration("engine is not initialized"))?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "crops": table,
    })))
}

async fn evaluate_suitability(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(request) = payload?;
    tracing::info!("Evaluating suitability with {} factors", request.factors.len());

    let evaluation = state.context.evaluate(&request.factors)?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "evaluation": evaluation,
    })))
}

async fn generate_zoning(
    State(state): State<AppState>,
    payload: Result<Json<ZoningRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(request) = payload?;
    let units = request
        .units
        .into_iter()
        .map(UnitPayload::into_unit)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!("Generating {} zoning over {} units", request.crop_type, units.len());

    // CPU-bound work: run in blocking thread pool
    let context = state.context.clone();
    let zoning = tokio::task::spawn_blocking(move || {
        context.generate_zoning(&request.crop_type, request.precision.as_deref(), &units)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    Ok(Json(serde_json::json!({
        "status": "success",
        "zoning": zoning,
    })))
}

async fn generate_measured_zoning(
    State(state): State<AppState>,
    payload: Result<Json<MeasuredZoningRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(request) = payload?;
    tracing::info!("Generating {} zoning from {} measured units", request.crop_type, request.units.len());

    let context = state.context.clone();
    let zoning = tokio::task::spawn_blocking(move || {
        context.generate_zoning_from_measurements(
            &request.crop_type,
            request.precision.as_deref(),
            &request.requirements,
            &request.units,
        )
    })
    .await
    .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))??;

    Ok(Json(serde_json::json!({
        "status": "success",
        "zoning": zoning,
    })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Engine(SuitabilityError),
    BadRequest(String),
    Internal(String),
}

impl From<SuitabilityError> for AppError {
    fn from(e: SuitabilityError) -> Self {
        AppError::Engine(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, kind, message) = match &self {
            AppError::Engine(e) => {
                let status = match e.kind() {
                    ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                    ErrorKind::Configuration => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, e.kind().as_str(), e.public_message())
            }
            AppError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                ErrorKind::InvalidInput.as_str(),
                "Invalid input",
            ),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal error"),
        };

        tracing::warn!("Request failed ({}): {:?}", status, self);

        let body = Json(serde_json::json!({
            "status": "error",
            "error": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}
