use axum::Json;
use serde::{Deserialize, Serialize};

use retire_core::{GridPointResult, ScenarioConfig, sweep};

use crate::error::{ApiError, ApiResult};
use crate::validation;

/// `GET /health`.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub scenario: ScenarioConfig,
    #[serde(default)]
    pub run_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub status: &'static str,
    pub results: Vec<GridPointResult>,
    pub total_grid_points: usize,
}

/// `POST /simulate`. Runs the sweep on a blocking worker thread so the
/// CPU-bound, rayon-parallel kernel work never stalls the async reactor.
pub async fn simulate(Json(req): Json<SimulateRequest>) -> ApiResult<Json<SimulateResponse>> {
    validation::validate_scenario(&req.scenario)?;
    let SimulateRequest { scenario, run_id } = req;

    let results = tokio::task::spawn_blocking(move || sweep::run(&scenario))
        .await
        .map_err(|_| ApiError::TaskJoin)??;

    let total_grid_points = results.len();
    let run_id = run_id.or_else(|| Some(uuid::Uuid::new_v4().to_string()));

    Ok(Json(SimulateResponse {
        run_id,
        status: "completed",
        results,
        total_grid_points,
    }))
}
