//! a11y-audit library - web accessibility auditing service
//!
//! Accepts a URL, audits it with Lighthouse in headless Chrome, and stores the
//! resulting analysis and its issues in a single transaction. Read-only
//! endpoints serve the stored analyses back.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod audit;
pub mod error;
pub mod services;
pub mod summary;

use audit::AuditRunner;
use services::{IngestOrchestrator, IngestSettings};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Audit-to-storage pipeline
    pub orchestrator: Arc<IngestOrchestrator>,
    /// Service startup time, for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, runner: Arc<dyn AuditRunner>, settings: IngestSettings) -> Self {
        let orchestrator = Arc::new(IngestOrchestrator::new(db.clone(), runner, settings));
        Self {
            db,
            orchestrator,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::analyze_routes())
        .merge(api::analysis_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
