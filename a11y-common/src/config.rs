//! Bootstrap configuration loading
//!
//! Configuration is read once at startup from an optional TOML file. The file
//! is located with the following priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config file (`~/.config/a11y-audit/config.toml`, then
//!    `/etc/a11y-audit/config.toml` on Linux)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not an error: the service starts on compiled
//! defaults and logs a warning. An explicitly requested file that does not
//! exist is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "A11Y_CONFIG";

/// Application directory name used under platform config/data dirs
const APP_DIR: &str = "a11y-audit";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file; platform data dir when omitted
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// SQLite busy_timeout per connection
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Audit runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Chrome/Chromium executable
    #[serde(default = "default_chrome_path")]
    pub chrome_path: String,

    /// Lighthouse CLI executable
    #[serde(default = "default_lighthouse_path")]
    pub lighthouse_path: String,

    /// Upper bound for one audit run (navigation + analysis)
    #[serde(default = "default_audit_timeout_secs")]
    pub audit_timeout_secs: u64,

    /// Upper bound for the browser to report its debugging endpoint
    #[serde(default = "default_launch_timeout_secs")]
    pub launch_timeout_secs: u64,

    /// Maximum number of browser instances alive at once
    #[serde(default = "default_max_concurrent_audits")]
    pub max_concurrent_audits: usize,

    /// Additional flags passed to Chrome
    #[serde(default)]
    pub extra_chrome_args: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_max_connections() -> u32 {
    10
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_chrome_path() -> String {
    "chromium".to_string()
}

fn default_lighthouse_path() -> String {
    "lighthouse".to_string()
}

fn default_audit_timeout_secs() -> u64 {
    120
}

fn default_launch_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_audits() -> usize {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            chrome_path: default_chrome_path(),
            lighthouse_path: default_lighthouse_path(),
            audit_timeout_secs: default_audit_timeout_secs(),
            launch_timeout_secs: default_launch_timeout_secs(),
            max_concurrent_audits: default_max_concurrent_audits(),
            extra_chrome_args: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AuditConfig {
    pub fn audit_timeout(&self) -> Duration {
        Duration::from_secs(self.audit_timeout_secs)
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve and load configuration
    ///
    /// `cli_arg` is the `--config` value, if any. Returns compiled defaults
    /// when no file is found through the environment or platform locations.
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        // Priority 1: Command-line argument (must exist)
        if let Some(path) = cli_arg {
            info!("Loading config from command line: {}", path.display());
            return Self::from_file(path);
        }

        // Priority 2: Environment variable (must exist)
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                let path = PathBuf::from(path);
                info!("Loading config from {}: {}", CONFIG_ENV_VAR, path.display());
                return Self::from_file(&path);
            }
        }

        // Priority 3: Platform config file
        if let Some(path) = platform_config_file() {
            info!("Loading config from {}", path.display());
            return Self::from_file(&path);
        }

        // Priority 4: Compiled defaults
        warn!("No config file found, using compiled defaults");
        Ok(Self::default())
    }

    /// Reject values that would make the service unusable
    pub fn validate(&self) -> Result<()> {
        if self.audit.max_concurrent_audits == 0 {
            return Err(Error::Config(
                "audit.max_concurrent_audits must be at least 1".to_string(),
            ));
        }
        if self.audit.audit_timeout_secs == 0 {
            return Err(Error::Config(
                "audit.audit_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.audit.launch_timeout_secs == 0 {
            return Err(Error::Config(
                "audit.launch_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.audit.chrome_path.trim().is_empty() || self.audit.lighthouse_path.trim().is_empty() {
            return Err(Error::Config(
                "audit.chrome_path and audit.lighthouse_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Database file, falling back to the platform data directory
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// First existing platform config file, if any
fn platform_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./a11y_data"))
        .join("audits.db")
}
