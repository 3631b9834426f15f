//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Impact;

/// Row of the analyses list (raw report omitted)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AnalysisSummary {
    pub id: i64,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub overall_score: f64,
}

/// Full analysis record including the verbatim audit report
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub id: i64,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub overall_score: f64,
    pub raw_lighthouse_report: Value,
}

/// Persisted accessibility issue
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AccessibilityIssue {
    pub id: i64,
    pub analysis_id: i64,
    pub rule_id: String,
    pub description: String,
    pub impact: String,
    pub html_snippet: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Normalized issue ready for insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    pub rule_id: String,
    pub description: String,
    pub impact: Impact,
    pub html_snippet: Option<String>,
}

/// One analysis with its issues in severity order
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisDetail {
    pub analysis: Analysis,
    pub issues: Vec<AccessibilityIssue>,
}
