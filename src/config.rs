use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::orders::quantity::MAX_DECIMAL_SCALE;
use crate::orders::PrecisionTable;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub precision: PrecisionConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Brokerage API root (accounts, quotes, market data)
    pub base_url: String,
    /// Crypto API root (crypto accounts, holdings, orders, currency pairs)
    pub crypto_base_url: String,
    /// Unified account API root
    pub phoenix_base_url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// OAuth bearer token (usually from ROBINHOOD__API__TOKEN)
    #[serde(default)]
    pub token: Option<String>,
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    concat!("robinhood-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.robinhood.com/".to_string(),
            crypto_base_url: "https://nummus.robinhood.com/".to_string(),
            phoenix_base_url: "https://phoenix.robinhood.com/".to_string(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            token: None,
        }
    }
}

/// Quantity precision per crypto asset
#[derive(Debug, Clone, Deserialize)]
pub struct PrecisionConfig {
    /// Decimal places for assets without an explicit entry
    #[serde(default = "default_decimals")]
    pub default_decimals: u32,
    /// Currency code -> decimal places (e.g. ETH = 6)
    #[serde(default)]
    pub assets: HashMap<String, u32>,
}

fn default_decimals() -> u32 {
    8
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self {
            default_decimals: default_decimals(),
            assets: HashMap::from([("ETH".to_string(), 6)]),
        }
    }
}

impl PrecisionConfig {
    pub fn to_table(&self) -> PrecisionTable {
        PrecisionTable::new(self.default_decimals, self.assets.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Polling interval for order status in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// How long to wait for an order to reach a terminal state
    #[serde(default = "default_order_timeout")]
    pub order_timeout_ms: u64,
}

fn default_poll_interval() -> u64 {
    500
}

fn default_order_timeout() -> u64 {
    30_000
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            order_timeout_ms: default_order_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Also write a daily-rotated log file into this directory
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let api = ApiConfig::default();

        let builder = Config::builder()
            .set_default("api.base_url", api.base_url)?
            .set_default("api.crypto_base_url", api.crypto_base_url)?
            .set_default("api.phoenix_base_url", api.phoenix_base_url)?
            .set_default("api.timeout_ms", api.timeout_ms)?
            .set_default("precision.default_decimals", default_decimals())?
            .set_default("precision.assets.ETH", 6)?
            .set_default("execution.poll_interval_ms", default_poll_interval())?
            .set_default("execution.order_timeout_ms", default_order_timeout())?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Environment-specific overrides (e.g. config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("ROBINHOOD_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // ROBINHOOD__API__TOKEN, ROBINHOOD__PRECISION__ASSETS__BTC, ...
            .add_source(
                Environment::with_prefix("ROBINHOOD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.api.timeout_ms == 0 {
            errors.push("api.timeout_ms must be positive".to_string());
        }

        for (field, url) in [
            ("api.base_url", &self.api.base_url),
            ("api.crypto_base_url", &self.api.crypto_base_url),
            ("api.phoenix_base_url", &self.api.phoenix_base_url),
        ] {
            if url::Url::parse(url).is_err() {
                errors.push(format!("{field} is not a valid URL: {url}"));
            }
        }

        if self.precision.default_decimals > MAX_DECIMAL_SCALE {
            errors.push(format!(
                "precision.default_decimals must be at most {MAX_DECIMAL_SCALE}"
            ));
        }
        for (code, decimals) in &self.precision.assets {
            if *decimals > MAX_DECIMAL_SCALE {
                errors.push(format!(
                    "precision.assets.{code} must be at most {MAX_DECIMAL_SCALE}"
                ));
            }
        }

        if self.execution.poll_interval_ms == 0 {
            errors.push("execution.poll_interval_ms must be positive".to_string());
        }
        if self.execution.poll_interval_ms > self.execution.order_timeout_ms {
            errors.push(
                "execution.poll_interval_ms should not exceed execution.order_timeout_ms"
                    .to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            precision: PrecisionConfig::default(),
            execution: ExecutionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
