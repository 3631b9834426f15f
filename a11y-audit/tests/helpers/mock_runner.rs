//! Scripted audit runner
//!
//! Stands in for Chrome + Lighthouse. Every launch and close is counted so
//! tests can check that each launched session is closed exactly once.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use a11y_audit::audit::{AuditError, AuditReport, AuditRunner, BrowserSession};

/// What every session of a runner does when asked to audit
#[derive(Debug, Clone)]
pub enum Script {
    /// Return this report
    Report(Value),
    /// Return this report after a delay
    SlowReport(Duration, Value),
    /// Finish without a report
    NoResult,
    /// Fail with an execution error
    Fail(String),
    /// Never finish
    Hang,
}

/// Counters shared between a runner, its sessions and the test
#[derive(Debug, Default)]
pub struct RunnerStats {
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    live: AtomicUsize,
    pub peak_live: AtomicUsize,
    pub audited_urls: Mutex<Vec<String>>,
}

impl RunnerStats {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn peak_live(&self) -> usize {
        self.peak_live.load(Ordering::SeqCst)
    }

    pub fn audited_urls(&self) -> Vec<String> {
        self.audited_urls.lock().unwrap().clone()
    }
}

pub struct MockAuditRunner {
    script: Script,
    fail_launch: bool,
    stats: Arc<RunnerStats>,
}

impl MockAuditRunner {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            fail_launch: false,
            stats: Arc::new(RunnerStats::default()),
        }
    }

    /// Runner whose browser never starts
    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(Script::NoResult)
        }
    }

    pub fn stats(&self) -> Arc<RunnerStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl AuditRunner for MockAuditRunner {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, AuditError> {
        if self.fail_launch {
            return Err(AuditError::Launch("chromium: not found".to_string()));
        }

        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        let live = self.stats.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.peak_live.fetch_max(live, Ordering::SeqCst);

        Ok(Box::new(MockSession {
            script: self.script.clone(),
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct MockSession {
    script: Script,
    stats: Arc<RunnerStats>,
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn run_audit(&mut self, url: &str) -> Result<Option<AuditReport>, AuditError> {
        self.stats.audited_urls.lock().unwrap().push(url.to_string());

        match &self.script {
            Script::Report(raw) => Ok(Some(AuditReport::new(raw.clone()))),
            Script::SlowReport(delay, raw) => {
                tokio::time::sleep(*delay).await;
                Ok(Some(AuditReport::new(raw.clone())))
            }
            Script::NoResult => Ok(None),
            Script::Fail(msg) => Err(AuditError::Execution(msg.clone())),
            Script::Hang => {
                std::future::pending::<()>().await;
                Ok(None)
            }
        }
    }

    async fn close(self: Box<Self>) {
        self.stats.live.fetch_sub(1, Ordering::SeqCst);
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Minimal Lighthouse result with an accessibility score and audits
pub fn lighthouse_report(score: Option<f64>, audits: Value) -> Value {
    json!({
        "lighthouseVersion": "12.0.0",
        "categories": {
            "accessibility": { "id": "accessibility", "score": score }
        },
        "audits": audits
    })
}
