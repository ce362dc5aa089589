use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub neo4j: Neo4jConfig,
    #[serde(default)]
    pub billing: BillingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Graph database connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687`
    pub uri: String,
    pub user: String,
    /// Name of the environment variable holding the password
    #[serde(default = "default_password_env")]
    pub password_env: String,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// Values the billing views and queries need besides the customer name
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Billing month (`YYYY-MM`) looked up by the recharge query
    #[serde(default = "default_recharge_month")]
    pub recharge_month: String,
    /// Last digits of the card on file quoted in the payment prompt
    #[serde(default = "default_card_last_digits")]
    pub card_last_digits: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            recharge_month: default_recharge_month(),
            card_last_digits: default_card_last_digits(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_password_env() -> String {
    "NEO4J_PASSWORD".to_string()
}

fn default_query_timeout_ms() -> u64 {
    5000
}

fn default_max_connections() -> usize {
    16
}

fn default_recharge_month() -> String {
    "2019-01".to_string()
}

fn default_card_last_digits() -> String {
    "9231".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in FULFILLMENT_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = std::env::var("FULFILLMENT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path (still honors `.env`)
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.neo4j.uri.trim().is_empty() {
            anyhow::bail!("neo4j.uri must not be empty");
        }

        if self.neo4j.user.trim().is_empty() {
            anyhow::bail!("neo4j.user must not be empty");
        }

        std::env::var(&self.neo4j.password_env).with_context(|| {
            format!(
                "Environment variable {} not set. Set it in your .env file or as an environment variable with your Neo4j password.",
                self.neo4j.password_env
            )
        })?;

        if self.neo4j.query_timeout_ms == 0 {
            anyhow::bail!("neo4j.query_timeout_ms must be greater than 0");
        }

        if self.neo4j.max_connections == 0 {
            anyhow::bail!("neo4j.max_connections must be greater than 0");
        }

        chrono::NaiveDate::parse_from_str(
            &format!("{}-01", self.billing.recharge_month),
            "%Y-%m-%d",
        )
        .with_context(|| {
            format!(
                "billing.recharge_month must look like YYYY-MM, got '{}'",
                self.billing.recharge_month
            )
        })?;

        Ok(())
    }

    /// Neo4j password, read from the configured environment variable
    pub fn neo4j_password(&self) -> Result<String> {
        std::env::var(&self.neo4j.password_env)
            .with_context(|| format!("Environment variable {} not set", self.neo4j.password_env))
    }

    /// Upper bound for a single graph round trip
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.neo4j.query_timeout_ms)
    }
}
