//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Finance engine configuration.
    #[serde(default)]
    pub finance: FinanceConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Finance engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FinanceConfig {
    /// Base currency for exchange-rate triangulation.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Bounded number of retries for sequence-row contention.
    #[serde(default = "default_sequence_retries")]
    pub sequence_retries: u32,
}

fn default_base_currency() -> String {
    "USD".to_string()
}

fn default_sequence_retries() -> u32 {
    3
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            sequence_retries: default_sequence_retries(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TRADEWIND").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finance_defaults() {
        let finance = FinanceConfig::default();
        assert_eq!(finance.base_currency, "USD");
        assert_eq!(finance.sequence_retries, 3);
    }

    #[test]
    fn test_server_defaults_apply() {
        let server: ServerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
    }
}
