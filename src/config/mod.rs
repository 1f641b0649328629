//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the intent pool
//! service: API binding and CORS, the optional background solver, and the
//! default log level.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "INTENT_POOL_CONFIG_PATH";

/// Config file used when no override is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/intent-pool.toml";

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration (host, port, CORS settings)
    pub api: ApiConfig,
    /// Background solver settings
    #[serde(default)]
    pub solver: SolverConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration for external communication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host address to bind the API server to
    pub host: String,
    /// Port number to bind the API server to
    pub port: u16,
    /// Allowed CORS origins ("*" allows any)
    pub cors_origins: Vec<String>,
}

/// Background solver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Interval between background solve passes in milliseconds.
    /// Absent or 0 disables the background solver; `POST /solve` still works.
    #[serde(default)]
    pub auto_solve_interval_ms: Option<u64>,
}

impl SolverConfig {
    /// The background solve interval, if enabled.
    pub fn auto_solve_interval(&self) -> Option<Duration> {
        self.auto_solve_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is not set (e.g. "info")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Configuration is valid
    /// - `Err(anyhow::Error)` - Bind address unparsable, CORS list empty or
    ///   log level empty
    pub fn validate(&self) -> anyhow::Result<()> {
        self.api.socket_addr()?;

        if self.api.cors_origins.is_empty() {
            anyhow::bail!(
                "Configuration error: api.cors_origins must list at least one origin (use \"*\" to allow any)"
            );
        }

        if self.logging.level.trim().is_empty() {
            anyhow::bail!("Configuration error: logging.level must not be empty");
        }

        Ok(())
    }

    /// Loads configuration from the TOML file.
    ///
    /// Uses the path in `INTENT_POOL_CONFIG_PATH` if set, otherwise
    /// `config/intent-pool.toml`.
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` - Successfully loaded and validated configuration
    /// - `Err(anyhow::Error)` - File missing, unparsable or invalid
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(config_path)
    }

    /// Loads and validates configuration from `path`.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            // Configuration file doesn't exist - user needs to copy template
            return Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/intent-pool.template.toml config/intent-pool.toml\n\
                Then edit config/intent-pool.toml with your actual values.",
                path.display()
            ));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }
}

impl ApiConfig {
    /// The address the API server binds to.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid API address {}:{}: {}", self.host, self.port, e))
    }
}

impl Default for Config {
    /// Local development configuration: 127.0.0.1:3333, any origin,
    /// background solver off.
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 3333,
                cors_origins: vec!["*".to_string()],
            },
            solver: SolverConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
