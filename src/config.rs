use anyhow::Result;
use axum::http::HeaderValue;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tower_http::cors::{Any, CorsLayer};

use crate::utils::money::DEFAULT_CURRENCY_SYMBOL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub currency_symbol: String,
    pub cors_allowed_origins: Vec<String>,
    pub seed_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let currency_symbol = lookup("CURRENCY_SYMBOL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string());

        Ok(Config {
            server_port: lookup("SERVER_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .trim()
                .parse()?,
            currency_symbol,
            cors_allowed_origins: parse_origins(&lookup("CORS_ALLOWED_ORIGINS").unwrap_or_default())?,
            seed_file: lookup("SEED_FILE")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            log_format: lookup("LOG_FORMAT").unwrap_or_default().parse()?,
        })
    }

    /// CORS layer for the configured origins, or `None` when cross-origin access is off.
    pub fn cors_layer(&self) -> anyhow::Result<Option<CorsLayer>> {
        if self.cors_allowed_origins.is_empty() {
            return Ok(None);
        }
        if self.cors_allowed_origins.iter().any(|origin| origin == "*") {
            return Ok(Some(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)));
        }

        let origins = self
            .cors_allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        ))
    }
}

fn parse_origins(raw: &str) -> anyhow::Result<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();

    if origins.len() > 1 && origins.iter().any(|origin| origin == "*") {
        anyhow::bail!("CORS_ALLOWED_ORIGINS must be '*' or a comma-separated list of origins");
    }

    Ok(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.currency_symbol, "$");
        assert!(config.cors_allowed_origins.is_empty());
        assert!(config.seed_file.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.cors_layer().unwrap().is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("SERVER_PORT", "8080"),
            ("CURRENCY_SYMBOL", "€"),
            ("CORS_ALLOWED_ORIGINS", "https://app.example.com, https://admin.example.com"),
            ("SEED_FILE", "seed.json"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.cors_allowed_origins.len(), 2);
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.json")));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.cors_layer().unwrap().is_some());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("SERVER_PORT", "http")]).is_err());
        assert!(config(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(config(&[("CORS_ALLOWED_ORIGINS", "*,https://a.example.com")]).is_err());
    }
}
