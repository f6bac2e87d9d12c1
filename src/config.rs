//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};

/// Application configuration loaded from environment variables.
///
/// Read once at startup and never mutated afterwards; handlers receive it
/// behind an `Arc` through the router state.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Security ===
    /// Host allow-list for the trusted-host filter (comma-separated in env).
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,

    /// The single browser origin allowed by CORS.
    #[serde(default = "default_frontend_origin")]
    pub frontend_origin: String,

    // === Deployment ===
    /// Free-text environment label surfaced in `/api/status`.
    #[serde(default = "default_environment")]
    pub environment: String,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Sample host CPU/memory/disk for `/health/detailed`.
    #[serde(default = "default_true")]
    pub system_metrics: bool,
}

fn default_allowed_hosts() -> Vec<String> {
    vec!["localhost".to_string(), "127.0.0.1".to_string()]
}

fn default_frontend_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
            frontend_origin: default_frontend_origin(),
            environment: default_environment(),
            port: default_port(),
            system_metrics: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_config(envy::from_env()?)
    }

    /// Build configuration from explicit key/value pairs instead of the
    /// process environment. Keys use the same upper-case names.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::from_config(envy::from_iter(vars)?)
    }

    fn from_config(mut config: Self) -> Result<Self> {
        config.allowed_hosts = config
            .allowed_hosts
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();
        config.frontend_origin = config.frontend_origin.trim().to_string();

        config.validate().map_err(AppError::InvalidConfig)?;
        Ok(config)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.allowed_hosts.is_empty() {
            return Err("ALLOWED_HOSTS must list at least one host".to_string());
        }

        let origin = Url::parse(&self.frontend_origin)
            .map_err(|e| format!("FRONTEND_ORIGIN is not a valid URL: {}", e))?;

        if origin.host_str().is_none() {
            return Err("FRONTEND_ORIGIN must include a host".to_string());
        }

        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        Ok(())
    }

    /// Frontend origin with the scheme stripped, e.g. `localhost:3000`.
    pub fn frontend_host(&self) -> Option<String> {
        let origin = Url::parse(&self.frontend_origin).ok()?;
        let host = origin.host_str()?;

        Some(match origin.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    /// Frontend origin in the form browsers send in `Origin`, e.g.
    /// `http://localhost:3000` (no trailing slash, punycode host).
    pub fn cors_origin(&self) -> Option<String> {
        let origin = Url::parse(&self.frontend_origin).ok()?.origin();
        origin
            .is_tuple()
            .then(|| origin.ascii_serialization())
    }

    /// Hosts accepted by the trusted-host filter: the configured allow-list
    /// plus the frontend origin's host.
    pub fn trusted_hosts(&self) -> Vec<String> {
        let mut hosts = self.allowed_hosts.clone();
        if let Some(frontend) = self.frontend_host() {
            if !hosts.contains(&frontend) {
                hosts.push(frontend);
            }
        }
        hosts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_values_are_sensible() {
        let config = Config::from_vars(Vec::new()).unwrap();

        assert_eq!(config.allowed_hosts, vec!["localhost", "127.0.0.1"]);
        assert_eq!(config.frontend_origin, "http://localhost:3000");
        assert_eq!(config.environment, "development");
        assert_eq!(config.port, 8000);
        assert!(config.system_metrics);
    }

    #[test]
    fn allowed_hosts_split_on_commas() {
        let config = Config::from_vars(vars(&[(
            "ALLOWED_HOSTS",
            "api.example.com, *.internal ,,10.0.0.5",
        )]))
        .unwrap();

        assert_eq!(
            config.allowed_hosts,
            vec!["api.example.com", "*.internal", "10.0.0.5"]
        );
    }

    #[test]
    fn trusted_hosts_include_frontend_without_scheme() {
        let config = Config::from_vars(vars(&[
            ("FRONTEND_ORIGIN", "https://app.example.com"),
            ("ENVIRONMENT", "staging"),
        ]))
        .unwrap();

        assert_eq!(config.frontend_host().as_deref(), Some("app.example.com"));
        assert_eq!(
            config.trusted_hosts(),
            vec!["localhost", "127.0.0.1", "app.example.com"]
        );
        assert_eq!(config.environment, "staging");
    }

    #[test]
    fn frontend_host_keeps_explicit_port() {
        let config = Config::default();
        assert_eq!(config.frontend_host().as_deref(), Some("localhost:3000"));
    }

    #[test]
    fn cors_origin_drops_trailing_slash() {
        let config = Config {
            frontend_origin: "https://App.Example.com/".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.cors_origin().as_deref(),
            Some("https://app.example.com")
        );
    }

    #[test]
    fn validate_rejects_invalid_origin() {
        let result = Config::from_vars(vars(&[("FRONTEND_ORIGIN", "not a url")]));
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_empty_host_list() {
        let config = Config {
            allowed_hosts: Vec::new(),
            ..Config::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let result = Config::from_vars(vars(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
