//! Bootstrap configuration for the storefront binary
//!
//! Determines where tenant configs come from:
//! - An in-memory simulated backend (demos)
//! - A directory of per-tenant YAML/TOML files
//! - A PostgreSQL database
//!
//! The bootstrap config is loaded from a file (default:
//! ~/.storefront/bootstrap.yaml) when present, then overridden by environment
//! variables and finally by CLI flags.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default bootstrap file location
pub const DEFAULT_BOOTSTRAP_PATH: &str = "~/.storefront/bootstrap.yaml";

/// Where tenant configs are resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// In-memory backend seeded with the demo tenant
    #[default]
    Simulated,
    /// One file per tenant in `directory`
    File,
    /// `tenant_configs` table reachable through `database_url`
    Database,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Let sqlx log individual queries
    #[serde(default)]
    pub log_sql_queries: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_sql_queries: false,
        }
    }
}

/// Bootstrap configuration
///
/// # Simulated mode
/// ```yaml
/// source: simulated
/// simulated_latency_ms: 300
/// ```
///
/// # File mode
/// ```yaml
/// source: file
/// directory: ~/.storefront/tenants
/// tenant: acme
/// ```
///
/// # Database mode
/// ```yaml
/// source: database
/// database_url: postgres://localhost/storefront
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default)]
    pub source: SourceKind,

    /// Tenant file directory (file mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// PostgreSQL connection string (database mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Slug of the tenant to load
    #[serde(default = "default_tenant")]
    pub tenant: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Artificial latency of the simulated backend
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Simulated,
            directory: None,
            database_url: None,
            tenant: default_tenant(),
            logging: LoggingConfig::default(),
            simulated_latency_ms: 0,
        }
    }
}

impl BootstrapConfig {
    /// Load bootstrap configuration from a YAML or TOML file
    ///
    /// # Errors
    /// - File not found or unreadable
    /// - Invalid YAML/TOML syntax
    /// - Missing required fields for the selected source
    pub fn from_file(path: &str) -> Result<Self, BootstrapError> {
        let expanded_path = shellexpand::tilde(path);
        let path = PathBuf::from(expanded_path.as_ref());

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            BootstrapError::FileRead(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: BootstrapConfig = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .map_err(|e| BootstrapError::ParseError(format!("TOML parse error: {}", e)))?
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|e| BootstrapError::ParseError(format!("YAML parse error: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the default bootstrap file if it exists, otherwise use defaults
    pub fn load_default() -> Result<Self, BootstrapError> {
        let expanded = shellexpand::tilde(DEFAULT_BOOTSTRAP_PATH);
        if PathBuf::from(expanded.as_ref()).is_file() {
            Self::from_file(DEFAULT_BOOTSTRAP_PATH)
        } else {
            Ok(Self::default())
        }
    }

    /// Check that the selected source has what it needs
    pub fn validate(&self) -> Result<(), BootstrapError> {
        match self.source {
            SourceKind::Simulated => {}
            SourceKind::File => {
                if self.directory.is_none() {
                    return Err(BootstrapError::ValidationError(
                        "directory is required when source is 'file'".to_string(),
                    ));
                }
            }
            SourceKind::Database => {
                if self.database_url.is_none() {
                    return Err(BootstrapError::ValidationError(
                        "database_url is required when source is 'database'".to_string(),
                    ));
                }
            }
        }

        if self.tenant.trim().is_empty() {
            return Err(BootstrapError::ValidationError(
                "tenant must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("STOREFRONT_TENANT") {
            self.tenant = val;
        }

        if let Ok(val) = std::env::var("STOREFRONT_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("STOREFRONT_CONFIG_DIR") {
            self.directory = Some(PathBuf::from(val));
            if self.source == SourceKind::Simulated {
                self.source = SourceKind::File;
            }
        }

        if let Ok(val) = std::env::var("STOREFRONT_DATABASE_URL") {
            self.database_url = Some(val);
            self.source = SourceKind::Database;
        }
    }

    /// Tenant directory with tilde expansion
    pub fn expanded_directory(&self) -> Option<PathBuf> {
        self.directory.as_ref().map(|path| {
            let path_str = path.to_string_lossy();
            let expanded = shellexpand::tilde(&path_str);
            PathBuf::from(expanded.as_ref())
        })
    }
}

/// Bootstrap configuration errors
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Failed to read bootstrap config: {0}")]
    FileRead(String),

    #[error("Failed to parse bootstrap config: {0}")]
    ParseError(String),

    #[error("Invalid bootstrap config: {0}")]
    ValidationError(String),
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tenant() -> String {
    "demo".to_string()
}
