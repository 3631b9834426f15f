//! Database initialization
//!
//! Opens (or creates) the SQLite database behind the process-wide connection
//! pool and creates the `analyses` / `accessibility_issues` tables if needed.

use crate::config::DatabaseConfig;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize the database connection pool and create tables if needed
pub async fn init_database(db_path: &Path, config: &DatabaseConfig) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Foreign keys and busy_timeout are per-connection settings, so they are
    // applied through the connect options rather than a one-off PRAGMA.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    info!(
        max_connections = config.max_connections,
        busy_timeout_ms = config.busy_timeout_ms,
        "Database pool ready"
    );

    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// Used by tests and tooling. The pool never recycles its connection, since
/// closing it would discard the in-memory database.
pub async fn init_in_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_analyses_table(pool).await?;
    create_accessibility_issues_table(pool).await?;
    Ok(())
}

async fn create_analyses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analyses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            overall_score REAL NOT NULL,
            raw_lighthouse_report TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_analyses_timestamp ON analyses(timestamp)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_accessibility_issues_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accessibility_issues (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            analysis_id INTEGER NOT NULL REFERENCES analyses(id),
            rule_id TEXT NOT NULL,
            description TEXT NOT NULL,
            impact TEXT NOT NULL,
            html_snippet TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_accessibility_issues_analysis \
         ON accessibility_issues(analysis_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
