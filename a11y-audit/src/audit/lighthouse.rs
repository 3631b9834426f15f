//! Lighthouse audit runner
//!
//! Launches headless Chrome with `--remote-debugging-port=0`, learns the port
//! Chrome picked from the `DevTools listening on ws://...` line it prints on
//! stderr, then runs the Lighthouse CLI against that browser:
//!
//! ```text
//! lighthouse <url> --port=<port> --output=json --output-path=stdout \
//!     --only-categories=accessibility --quiet
//! ```
//!
//! Each session gets its own temporary Chrome profile directory, owned by a
//! [`ProfileDir`] guard. Both child processes are spawned with `kill_on_drop`,
//! so a dropped future never leaks a browser or its profile.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, Command};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use a11y_common::config::AuditConfig;

use super::report::AuditReport;
use super::runner::{AuditError, AuditRunner, BrowserSession};

/// Marker Chrome prints once its DevTools endpoint is ready
const DEVTOOLS_PREFIX: &str = "DevTools listening on ";

const CHROME_FLAGS: &[&str] = &[
    "--headless=new",
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--no-first-run",
    "--no-default-browser-check",
    "--remote-debugging-port=0",
];

const LIGHTHOUSE_FLAGS: &[&str] = &[
    "--output=json",
    "--output-path=stdout",
    "--only-categories=accessibility",
    "--quiet",
];

/// Longest stderr excerpt carried into an error message
const MAX_ERROR_EXCERPT: usize = 500;

/// Audit runner backed by Chrome + Lighthouse CLI
#[derive(Debug, Clone)]
pub struct LighthouseRunner {
    chrome_path: String,
    lighthouse_path: String,
    launch_timeout: Duration,
    extra_chrome_args: Vec<String>,
    /// Parent directory of per-session Chrome profiles
    profile_root: PathBuf,
}

impl LighthouseRunner {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            chrome_path: config.chrome_path.clone(),
            lighthouse_path: config.lighthouse_path.clone(),
            launch_timeout: config.launch_timeout(),
            extra_chrome_args: config.extra_chrome_args.clone(),
            profile_root: std::env::temp_dir(),
        }
    }

    /// Create session profiles under `root` instead of the system temp dir
    pub fn with_profile_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.profile_root = root.into();
        self
    }
}

#[async_trait]
impl AuditRunner for LighthouseRunner {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, AuditError> {
        let profile_dir = ProfileDir::create(&self.profile_root).await?;

        let spawned = Command::new(&self.chrome_path)
            .args(CHROME_FLAGS)
            .arg(format!("--user-data-dir={}", profile_dir.path().display()))
            .args(&self.extra_chrome_args)
            .arg("about:blank")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                profile_dir.remove().await;
                return Err(if e.kind() == std::io::ErrorKind::NotFound {
                    AuditError::Launch(format!("browser executable not found: {}", self.chrome_path))
                } else {
                    AuditError::Launch(e.to_string())
                });
            }
        };

        let Some(stderr) = child.stderr.take() else {
            discard(child, profile_dir).await;
            return Err(AuditError::Launch("browser stderr was not captured".to_string()));
        };
        let mut lines = BufReader::new(stderr).lines();

        let port = match tokio::time::timeout(self.launch_timeout, wait_for_devtools_port(&mut lines)).await {
            Ok(Ok(port)) => port,
            Ok(Err(e)) => {
                discard(child, profile_dir).await;
                return Err(e);
            }
            Err(_) => {
                discard(child, profile_dir).await;
                return Err(AuditError::LaunchTimeout(self.launch_timeout));
            }
        };

        // Chrome blocks once the stderr pipe fills up, so keep draining it
        tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                trace!(target: "a11y_audit::chrome", "{}", line);
            }
        });

        info!(pid = ?child.id(), port, "Browser launched");

        Ok(Box::new(LighthouseSession {
            child,
            port,
            profile_dir,
            lighthouse_path: self.lighthouse_path.clone(),
        }))
    }
}

/// Running Chrome instance plus the Lighthouse invocation settings
struct LighthouseSession {
    child: Child,
    port: u16,
    profile_dir: ProfileDir,
    lighthouse_path: String,
}

#[async_trait]
impl BrowserSession for LighthouseSession {
    async fn run_audit(&mut self, url: &str) -> Result<Option<AuditReport>, AuditError> {
        debug!(url, port = self.port, "Running Lighthouse");

        let output = Command::new(&self.lighthouse_path)
            .arg(url)
            .arg(format!("--port={}", self.port))
            .args(LIGHTHOUSE_FLAGS)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AuditError::Execution(format!(
                        "lighthouse executable not found: {}",
                        self.lighthouse_path
                    ))
                } else {
                    AuditError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AuditError::Execution(format!(
                "lighthouse exited with {}: {}",
                output.status,
                error_excerpt(&stderr)
            )));
        }

        parse_lighthouse_output(&output.stdout)
    }

    async fn close(self: Box<Self>) {
        let LighthouseSession {
            mut child,
            port,
            profile_dir,
            ..
        } = *self;
        if let Err(e) = child.kill().await {
            debug!(error = %e, "Browser already exited");
        }
        profile_dir.remove().await;
        debug!(port, "Browser closed");
    }
}

/// Temporary Chrome profile directory, removed when the guard is dropped
///
/// Covers cancelled launches and sessions dropped without `close()`.
struct ProfileDir {
    path: PathBuf,
    removed: bool,
}

impl ProfileDir {
    async fn create(root: &Path) -> Result<Self, AuditError> {
        let path = root.join(format!("a11y-chrome-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { path, removed: false })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn remove(mut self) {
        remove_profile_dir(&self.path).await;
        self.removed = true;
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

/// Read Chrome's stderr until the DevTools endpoint line shows up
async fn wait_for_devtools_port(lines: &mut Lines<BufReader<ChildStderr>>) -> Result<u16, AuditError> {
    while let Some(line) = lines.next_line().await? {
        if let Some(port) = parse_devtools_port(&line) {
            return Ok(port);
        }
        trace!(target: "a11y_audit::chrome", "{}", line);
    }

    Err(AuditError::Launch(
        "browser exited before reporting its DevTools endpoint".to_string(),
    ))
}

/// Extract the port from `DevTools listening on ws://127.0.0.1:PORT/devtools/browser/ID`
pub fn parse_devtools_port(line: &str) -> Option<u16> {
    let start = line.find(DEVTOOLS_PREFIX)? + DEVTOOLS_PREFIX.len();
    let endpoint = line[start..].trim();
    reqwest::Url::parse(endpoint).ok()?.port()
}

/// Interpret Lighthouse stdout
///
/// Empty output or a JSON `null` means the tool produced no report. A report
/// carrying a `runtimeError` (page failed to load) is an execution failure.
pub fn parse_lighthouse_output(stdout: &[u8]) -> Result<Option<AuditReport>, AuditError> {
    let text = String::from_utf8_lossy(stdout);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| AuditError::Parse(e.to_string()))?;
    if value.is_null() {
        return Ok(None);
    }

    let report = AuditReport::new(value);
    if let Some(error) = report.view().runtime_error() {
        return Err(AuditError::Execution(error));
    }

    Ok(Some(report))
}

/// Last non-empty stderr line, shortened for error messages
fn error_excerpt(stderr: &str) -> String {
    let line = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no error output");
    line.chars().take(MAX_ERROR_EXCERPT).collect()
}

async fn discard(mut child: Child, profile_dir: ProfileDir) {
    if let Err(e) = child.kill().await {
        debug!(error = %e, "Browser already exited");
    }
    profile_dir.remove().await;
}

async fn remove_profile_dir(profile_dir: &Path) {
    match tokio::fs::remove_dir_all(profile_dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            path = %profile_dir.display(),
            error = %e,
            "Failed to remove browser profile directory"
        ),
    }
}
