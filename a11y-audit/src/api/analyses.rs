//! Read-only analysis queries
//!
//! - GET /api/analyses: most recent analyses, newest first
//! - GET /api/analysis/:id: one analysis with its issues
//! - GET /api/analysis/:id/summary: grouped issues and chart data

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::debug;

use a11y_common::db::{
    list_recent_analyses, load_analysis_detail, AnalysisDetail, AnalysisSummary,
    RECENT_ANALYSES_LIMIT,
};

use crate::error::{ApiError, ApiResult};
use crate::summary::{summarize, AnalysisOverview};
use crate::AppState;

/// GET /api/analyses
pub async fn list_analyses(State(state): State<AppState>) -> ApiResult<Json<Vec<AnalysisSummary>>> {
    let analyses = list_recent_analyses(&state.db, RECENT_ANALYSES_LIMIT)
        .await
        .map_err(|e| ApiError::failed("Failed to fetch analyses.", e))?;

    debug!(count = analyses.len(), "Listed analyses");
    Ok(Json(analyses))
}

/// GET /api/analysis/:id
pub async fn get_analysis_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AnalysisDetail>> {
    let detail = fetch_detail(&state, &id).await?;
    Ok(Json(detail))
}

/// GET /api/analysis/:id/summary
pub async fn get_analysis_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AnalysisOverview>> {
    let detail = fetch_detail(&state, &id).await?;
    Ok(Json(summarize(&detail)))
}

async fn fetch_detail(state: &AppState, raw_id: &str) -> ApiResult<AnalysisDetail> {
    let id = parse_analysis_id(raw_id)?;

    load_analysis_detail(&state.db, id)
        .await
        .map_err(|e| ApiError::failed("Failed to fetch analysis details.", e))?
        .ok_or_else(|| ApiError::NotFound("Analysis not found.".to_string()))
}

fn parse_analysis_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest("Valid Analysis ID is required.".to_string()))
}

/// Build analysis query routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analyses", get(list_analyses))
        .route("/api/analysis/:id", get(get_analysis_detail))
        .route("/api/analysis/:id/summary", get(get_analysis_summary))
}
