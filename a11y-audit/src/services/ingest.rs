//! Analysis ingestion
//!
//! Runs one audit-to-storage cycle per request:
//!
//! 1. Validate the URL (nothing is acquired for invalid input)
//! 2. Take an audit permit (bounds concurrent browser instances)
//! 3. Launch a browser session
//! 4. Audit the URL under a timeout
//! 5. In one transaction: insert the analysis, extract issues, insert issues
//! 6. Commit, or roll back explicitly on any failure
//! 7. Close the browser session, exactly once, on every path after launch
//!
//! Requests are independent; two concurrent audits of the same URL produce
//! two analyses.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use a11y_common::config::AuditConfig;
use a11y_common::db::{insert_analysis, insert_issue};
use a11y_common::score::overall_score;

use crate::audit::{AuditError, AuditReport, AuditRunner, BrowserSession};
use crate::services::issue_extractor::{extract_issues, ExtractError};

/// Ingestion failures, one variant per error class
#[derive(Debug, Error)]
pub enum IngestError {
    /// Missing or malformed URL; nothing was attempted
    #[error("{0}")]
    InvalidInput(String),

    /// Browser launch or audit tool failure
    #[error("{0}")]
    Audit(#[from] AuditError),

    /// Audit exceeded its time budget
    #[error("Audit timed out after {0:?}")]
    AuditTimeout(Duration),

    /// Audit tool finished without a report
    #[error("Audit tool did not return a result")]
    NoResult,

    /// Report lacked the structure needed for extraction
    #[error("Invalid audit report: {0}")]
    Extraction(#[from] ExtractError),

    /// Insert or commit failed; the transaction was rolled back
    #[error("Database transaction failed: {0}")]
    Persistence(String),

    /// Service-side failure outside the audit pipeline
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    fn persistence(err: impl std::fmt::Display) -> Self {
        IngestError::Persistence(err.to_string())
    }
}

/// Result of a successful ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub analysis_id: i64,
    /// Overall score, 0–100 with two-decimal precision
    pub accessibility_score: f64,
    pub issue_count: usize,
}

/// Orchestrator tuning
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub audit_timeout: Duration,
    pub max_concurrent_audits: usize,
}

impl From<&AuditConfig> for IngestSettings {
    fn from(config: &AuditConfig) -> Self {
        Self {
            audit_timeout: config.audit_timeout(),
            max_concurrent_audits: config.max_concurrent_audits,
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        IngestSettings::from(&AuditConfig::default())
    }
}

/// Coordinates audit runner, issue extractor and persistence
pub struct IngestOrchestrator {
    db: SqlitePool,
    runner: Arc<dyn AuditRunner>,
    audit_permits: Arc<Semaphore>,
    audit_timeout: Duration,
}

impl IngestOrchestrator {
    pub fn new(db: SqlitePool, runner: Arc<dyn AuditRunner>, settings: IngestSettings) -> Self {
        Self {
            db,
            runner,
            audit_permits: Arc::new(Semaphore::new(settings.max_concurrent_audits.max(1))),
            audit_timeout: settings.audit_timeout,
        }
    }

    /// Audit `url` and persist the analysis with its issues
    pub async fn analyze(&self, url: &str) -> Result<AnalysisOutcome, IngestError> {
        let url = validate_url(url)?;

        let _permit = self
            .audit_permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| IngestError::Internal("audit limiter closed".to_string()))?;

        info!(url = %url, "Starting accessibility audit");

        let mut session = self.runner.launch().await?;
        let result = self.audit_and_store(session.as_mut(), &url).await;
        session.close().await;

        match &result {
            Ok(outcome) => info!(
                url = %url,
                analysis_id = outcome.analysis_id,
                score = outcome.accessibility_score,
                issues = outcome.issue_count,
                "Analysis complete"
            ),
            Err(e) => warn!(url = %url, error = %e, "Analysis failed"),
        }

        result
    }

    async fn audit_and_store(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
    ) -> Result<AnalysisOutcome, IngestError> {
        let report = match tokio::time::timeout(self.audit_timeout, session.run_audit(url)).await {
            Err(_) => return Err(IngestError::AuditTimeout(self.audit_timeout)),
            Ok(Err(e)) => return Err(IngestError::Audit(e)),
            Ok(Ok(None)) => return Err(IngestError::NoResult),
            Ok(Ok(Some(report))) => report,
        };

        let score = overall_score(report.view().accessibility_score());
        debug!(url, score, "Audit finished");

        let (analysis_id, issue_count) = self.store(url, &report, score).await?;

        Ok(AnalysisOutcome {
            analysis_id,
            accessibility_score: score,
            issue_count,
        })
    }

    /// Persist in one transaction; roll back before propagating any failure
    async fn store(
        &self,
        url: &str,
        report: &AuditReport,
        score: f64,
    ) -> Result<(i64, usize), IngestError> {
        let mut tx = self.db.begin().await.map_err(IngestError::persistence)?;

        match write_analysis(&mut tx, url, report, score).await {
            Ok(written) => {
                tx.commit().await.map_err(IngestError::persistence)?;
                Ok(written)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}

/// Analysis row first, then its issues; returns (analysis id, issue count)
async fn write_analysis(
    conn: &mut SqliteConnection,
    url: &str,
    report: &AuditReport,
    score: f64,
) -> Result<(i64, usize), IngestError> {
    let completed_at = Utc::now();

    let analysis_id = insert_analysis(conn, url, completed_at, score, report.as_value())
        .await
        .map_err(IngestError::persistence)?;

    let issues = extract_issues(report.view())?;

    for issue in &issues {
        insert_issue(conn, analysis_id, issue, completed_at)
            .await
            .map_err(IngestError::persistence)?;
    }

    debug!(analysis_id, issues = issues.len(), "Analysis rows written");

    Ok((analysis_id, issues.len()))
}

/// Require a non-empty absolute http(s) URL
///
/// The URL ends up as a command-line argument of the audit tool, so anything
/// that does not parse as a web URL is refused up front.
pub fn validate_url(raw: &str) -> Result<String, IngestError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IngestError::InvalidInput("URL is required.".to_string()));
    }

    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| IngestError::InvalidInput(format!("Invalid URL '{}': {}", trimmed, e)))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(trimmed.to_string()),
        _ => Err(IngestError::InvalidInput(format!(
            "Invalid URL '{}': only http and https URLs can be audited",
            trimmed
        ))),
    }
}
