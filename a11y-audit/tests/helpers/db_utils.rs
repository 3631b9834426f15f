//! Database Test Utilities

use anyhow::Result;
use sqlx::SqlitePool;
use tempfile::TempDir;

use a11y_common::config::DatabaseConfig;
use a11y_common::db::init_database;

/// Create temporary file-backed test database with the schema applied
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_audits.db");

    let pool = init_database(&db_path, &DatabaseConfig::default()).await?;

    Ok((temp_dir, pool))
}

/// Number of rows in `table`
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    let query = format!("SELECT COUNT(*) FROM {}", table);
    sqlx::query_scalar::<_, i64>(&query)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Make the `n`-th issue insert (1-based) of any analysis abort
pub async fn fail_issue_insert_at(pool: &SqlitePool, n: usize) {
    let sql = format!(
        r#"
        CREATE TRIGGER fail_issue_insert
        BEFORE INSERT ON accessibility_issues
        WHEN (SELECT COUNT(*) FROM accessibility_issues WHERE analysis_id = NEW.analysis_id) >= {}
        BEGIN
            SELECT RAISE(ABORT, 'injected issue insert failure');
        END
        "#,
        n.saturating_sub(1)
    );
    sqlx::query(&sql).execute(pool).await.unwrap();
}

/// Make every analysis insert abort
pub async fn fail_analysis_insert(pool: &SqlitePool) {
    sqlx::query(
        r#"
        CREATE TRIGGER fail_analysis_insert
        BEFORE INSERT ON analyses
        BEGIN
            SELECT RAISE(ABORT, 'injected analysis insert failure');
        END
        "#,
    )
    .execute(pool)
    .await
    .unwrap();
}
