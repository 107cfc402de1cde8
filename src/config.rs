//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.sql-review-bot.toml` in current directory
//! 4. `~/.config/sql-review-bot/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//! signing_secret = "..."       # or use SLACK_SIGNING_SECRET env var
//!
//! [linter]
//! command = ["sqlfluff"]       # e.g. ["python", "-m", "sqlfluff"]
//! dialect = "postgres"
//! timeout_secs = 30
//!
//! [delivery]
//! bot_token = "xoxb-..."       # or use SLACK_BOT_TOKEN env var
//! api_base = "https://slack.com/api"
//! timeout_secs = 10
//!
//! [report]
//! locale = "pt-BR"             # built-in: en, pt-BR
//! catalog = "catalog.toml"     # overrides the built-in catalog
//! show_clean_sql = true
//!
//! [workers]
//! max_in_flight = 16
//!
//! [log]
//! level = "info"
//! json = false
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SLACK_BOT_TOKEN` | Bot token for `chat.postMessage` |
//! | `SLACK_SIGNING_SECRET` | Secret used to verify inbound requests |
//! | `SQLFLUFF_BIN` | Path to the sqlfluff executable |
//! | `SQLFLUFF_DIALECT` | Dialect passed to sqlfluff |
//! | `SQL_REVIEW_LOCALE` | Built-in catalog locale |
//! | `SQL_REVIEW_LOG` | Default log level |

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration
};

use clap::ValueEnum;
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::{
    cli::Dialect,
    error::{AppResult, config_error}
};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server:   ServerConfig,
    #[serde(default)]
    pub linter:   LinterConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub report:   ReportConfig,
    #[serde(default)]
    pub workers:  WorkerConfig,
    #[serde(default)]
    pub log:      LogConfig
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host:           String,
    pub port:           u16,
    /// Slack signing secret; requests are not verified when unset
    pub signing_secret: Option<String>
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host:           String::from("0.0.0.0"),
            port:           5000,
            signing_secret: None
        }
    }
}

/// External linter invocation settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinterConfig {
    /// Program followed by leading arguments
    pub command:      Vec<String>,
    pub dialect:      Dialect,
    pub timeout_secs: u64
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            command:      vec![String::from("sqlfluff")],
            dialect:      Dialect::Ansi,
            timeout_secs: 30
        }
    }
}

impl LinterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Outbound message delivery settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub bot_token:    Option<String>,
    pub api_base:     String,
    pub timeout_secs: u64
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            bot_token:    None,
            api_base:     String::from("https://slack.com/api"),
            timeout_secs: 10
        }
    }
}

/// Report rendering settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Built-in catalog locale, used when `catalog` is unset
    pub locale:         String,
    /// Path to a TOML, YAML or JSON message catalog
    pub catalog:        Option<PathBuf>,
    /// Include the corrected SQL when the query has no issues
    pub show_clean_sql: bool
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            locale:         String::from("en"),
            catalog:        None,
            show_clean_sql: true
        }
    }
}

/// Background worker limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub max_in_flight: usize
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 16
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json:  bool
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            json:  false
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.sql-review-bot.toml)
    /// 3. Config file in home directory
    ///    (~/.config/sql-review-bot/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-review-bot")
                .join("config.toml");

            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        // Current directory config overrides home config
        let local_config = PathBuf::from(".sql-review-bot.toml");
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    /// Override settings from environment variables resolved by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>
    {
        if let Some(token) = lookup("SLACK_BOT_TOKEN") {
            self.delivery.bot_token = Some(token);
        }

        if let Some(secret) = lookup("SLACK_SIGNING_SECRET") {
            self.server.signing_secret = Some(secret);
        }

        if let Some(bin) = lookup("SQLFLUFF_BIN") {
            self.linter.command = vec![bin];
        }

        if let Some(dialect) = lookup("SQLFLUFF_DIALECT") {
            self.linter.dialect = Dialect::from_str(&dialect, true)
                .map_err(|e| config_error(format!("Invalid SQLFLUFF_DIALECT: {}", e)))?;
        }

        if let Some(locale) = lookup("SQL_REVIEW_LOCALE") {
            self.report.locale = locale;
        }

        if let Some(level) = lookup("SQL_REVIEW_LOG") {
            self.log.level = level;
        }

        Ok(())
    }

    /// Reject settings that would make the service unusable
    pub fn validate(&self) -> AppResult<()> {
        if self.linter.command.is_empty() {
            return Err(config_error("linter.command must name a program"));
        }
        if self.linter.timeout_secs == 0 {
            return Err(config_error("linter.timeout_secs must be greater than zero"));
        }
        if self.workers.max_in_flight == 0 {
            return Err(config_error("workers.max_in_flight must be greater than zero"));
        }
        if self.workers.max_in_flight > Semaphore::MAX_PERMITS {
            return Err(config_error(format!(
                "workers.max_in_flight must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        Ok(())
    }
}
