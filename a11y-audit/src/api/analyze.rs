//! Audit submission endpoint
//!
//! POST /api/analyze runs one full audit-to-storage cycle and answers only
//! after the analysis is committed (or the attempt has failed).

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use a11y_common::score::format_score;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/analyze request
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// POST /api/analyze response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis_id: i64,
    /// Overall score with two decimals, e.g. "87.30"
    pub accessibility_score: String,
    pub message: String,
}

/// POST /api/analyze
///
/// A body that is not JSON, or has no `url`, is treated as missing input.
pub async fn analyze_url(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let url = match payload {
        Ok(Json(request)) => request.url.unwrap_or_default(),
        Err(rejection) => {
            info!(error = %rejection, "Rejected analyze request body");
            String::new()
        }
    };

    let outcome = state.orchestrator.analyze(&url).await.map_err(ApiError::from)?;

    Ok(Json(AnalyzeResponse {
        analysis_id: outcome.analysis_id,
        accessibility_score: format_score(outcome.accessibility_score),
        message: "Analysis complete.".to_string(),
    }))
}

/// Build audit submission routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze_url))
}
