//! Analysis and issue persistence
//!
//! Insert functions take a bare connection so callers can run them inside a
//! transaction (`&mut *tx`). Read functions take the pool.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::models::{AccessibilityIssue, Analysis, AnalysisDetail, AnalysisSummary, NewIssue};
use crate::impact::IMPACT_RANK_SQL;
use crate::Result;

/// Maximum number of rows returned by the analyses list
pub const RECENT_ANALYSES_LIMIT: i64 = 50;

/// Fixed-width RFC 3339 text so lexical order equals chronological order
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Insert an analysis row and return its assigned id
pub async fn insert_analysis(
    conn: &mut SqliteConnection,
    url: &str,
    timestamp: DateTime<Utc>,
    overall_score: f64,
    raw_report: &Value,
) -> Result<i64> {
    let raw = serde_json::to_string(raw_report)?;

    let result = sqlx::query(
        r#"
        INSERT INTO analyses (url, timestamp, overall_score, raw_lighthouse_report)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(url)
    .bind(format_timestamp(timestamp))
    .bind(overall_score)
    .bind(raw)
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Insert one issue belonging to `analysis_id` and return its id
pub async fn insert_issue(
    conn: &mut SqliteConnection,
    analysis_id: i64,
    issue: &NewIssue,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO accessibility_issues (
            analysis_id, rule_id, description, impact, html_snippet, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(analysis_id)
    .bind(&issue.rule_id)
    .bind(&issue.description)
    .bind(issue.impact.as_str())
    .bind(issue.html_snippet.as_deref())
    .bind(format_timestamp(created_at))
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Most recent analyses, newest first
pub async fn list_recent_analyses(pool: &SqlitePool, limit: i64) -> Result<Vec<AnalysisSummary>> {
    let rows = sqlx::query_as::<_, AnalysisSummary>(
        r#"
        SELECT id, url, timestamp, overall_score
        FROM analyses
        ORDER BY timestamp DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Load a single analysis with its raw report
pub async fn get_analysis(pool: &SqlitePool, id: i64) -> Result<Option<Analysis>> {
    let row = sqlx::query(
        r#"
        SELECT id, url, timestamp, overall_score, raw_lighthouse_report
        FROM analyses
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let raw: String = row.try_get("raw_lighthouse_report")?;
    Ok(Some(Analysis {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        timestamp: row.try_get("timestamp")?,
        overall_score: row.try_get("overall_score")?,
        raw_lighthouse_report: serde_json::from_str(&raw)?,
    }))
}

/// Issues of one analysis, most severe first, then by rule id
pub async fn list_issues(pool: &SqlitePool, analysis_id: i64) -> Result<Vec<AccessibilityIssue>> {
    let sql = format!(
        r#"
        SELECT id, analysis_id, rule_id, description, impact, html_snippet, created_at
        FROM accessibility_issues
        WHERE analysis_id = ?
        ORDER BY {} DESC, rule_id ASC, id ASC
        "#,
        IMPACT_RANK_SQL
    );

    let rows = sqlx::query_as::<_, AccessibilityIssue>(&sql)
        .bind(analysis_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Analysis plus ordered issues; `None` when the id does not exist
pub async fn load_analysis_detail(pool: &SqlitePool, id: i64) -> Result<Option<AnalysisDetail>> {
    let Some(analysis) = get_analysis(pool, id).await? else {
        return Ok(None);
    };
    let issues = list_issues(pool, id).await?;
    Ok(Some(AnalysisDetail { analysis, issues }))
}
