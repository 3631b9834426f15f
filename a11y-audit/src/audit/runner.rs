//! Audit runner abstraction
//!
//! A runner launches one browser instance per audit. The returned session is a
//! scoped resource: whoever launches it must call [`BrowserSession::close`]
//! exactly once, whatever happened in between.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use super::report::AuditReport;

/// Audit runner errors
#[derive(Debug, Error)]
pub enum AuditError {
    /// Browser process could not be started
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// Browser started but never reported its debugging endpoint
    #[error("Browser did not become ready within {0:?}")]
    LaunchTimeout(Duration),

    /// Audit tool failed (navigation failure, tool crash, ...)
    #[error("Audit tool failed: {0}")]
    Execution(String),

    /// Audit tool output was not a JSON document
    #[error("Failed to parse audit output: {0}")]
    Parse(String),

    /// I/O error while driving the external processes
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Launches browser sessions for audits
#[async_trait]
pub trait AuditRunner: Send + Sync {
    /// Start a fresh browser instance
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, AuditError>;
}

/// One live browser instance
#[async_trait]
pub trait BrowserSession: Send {
    /// Audit `url`; `Ok(None)` when the tool produced no report
    async fn run_audit(&mut self, url: &str) -> Result<Option<AuditReport>, AuditError>;

    /// Terminate the browser and release its resources
    async fn close(self: Box<Self>);
}
