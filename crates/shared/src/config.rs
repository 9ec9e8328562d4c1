//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::{Currency, SymbolPosition};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Report rendering configuration.
    #[serde(default)]
    pub report: ReportConfig,
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
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

/// Report rendering configuration.
///
/// Describes the fallback currency, used when a company row carries no
/// currency of its own. Stored currencies always take precedence.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Fallback currency code.
    #[serde(default = "default_currency_code")]
    pub currency: String,
    /// Fallback currency symbol.
    #[serde(default = "default_currency_symbol")]
    pub symbol: String,
    /// Where the fallback symbol is printed.
    #[serde(default)]
    pub symbol_position: SymbolPosition,
    /// Fallback rounding unit.
    #[serde(default = "default_currency_rounding")]
    pub rounding: Decimal,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            currency: default_currency_code(),
            symbol: default_currency_symbol(),
            symbol_position: SymbolPosition::default(),
            rounding: default_currency_rounding(),
        }
    }
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_currency_rounding() -> Decimal {
    Decimal::new(1, 2)
}

impl ReportConfig {
    /// The configured fallback currency.
    #[must_use]
    pub fn fallback_currency(&self) -> Currency {
        Currency::new(
            self.currency.as_str(),
            self.symbol.as_str(),
            self.symbol_position,
            self.rounding,
        )
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
            .add_source(config::Environment::with_prefix("LEDGERLENS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MoneyFormat;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("LEDGERLENS__DATABASE__URL", Some("postgres://localhost/ledgerlens")),
                ("LEDGERLENS__SERVER__PORT", Some("9090")),
                ("LEDGERLENS__REPORT__CURRENCY", Some("eur")),
                ("LEDGERLENS__REPORT__SYMBOL", Some("€")),
                ("LEDGERLENS__REPORT__SYMBOL_POSITION", Some("after")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/ledgerlens");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.report.symbol_position, SymbolPosition::After);

                let fallback = config.report.fallback_currency();
                assert_eq!(fallback.code, "EUR");
                assert_eq!(fallback.symbol, "€");
                assert_eq!(fallback.rounding, dec!(0.01));
            },
        );
    }

    #[test]
    fn test_fallback_currency_formats_with_its_position() {
        let report = ReportConfig {
            currency: "GBP".to_string(),
            symbol: "£".to_string(),
            symbol_position: SymbolPosition::After,
            rounding: dec!(0.01),
        };
        let format = MoneyFormat::new(&report.fallback_currency());
        assert_eq!(format.currency, "GBP");
        assert_eq!(format.format(dec!(12.5)), "12.50 £");
    }

    #[test]
    fn test_report_config_defaults_to_usd_before() {
        let fallback = ReportConfig::default().fallback_currency();
        assert_eq!(fallback, Currency::usd());
        assert_eq!(MoneyFormat::new(&fallback).format(dec!(1)), "$ 1.00");
    }
}
