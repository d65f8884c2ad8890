//! Application settings loaded from environment variables.
//!
//! `PORT`, `DATABASE_URL`, `JWT_SECRET` and `FRONTEND_URL` are required; the
//! binary refuses to start without them. Everything else has a default.

use crate::errors::{Error, Result};
use std::{path::PathBuf, time::Duration};

/// Minimum signing secret length accepted in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BCRYPT_COST: u32 = 10;

/// Deployment environment, selected with `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local work; relaxed secret checks
    Development,
    /// Live deployment; enforces the secret length
    Production,
}

/// Fully validated runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port the HTTP server binds to
    pub port: u16,
    /// SeaORM connection string (`sqlite://...` or `postgres://...`)
    pub database_url: String,
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    /// Origin allowed by CORS
    pub frontend_url: String,
    /// Deployment environment
    pub environment: Environment,
    /// Upper bound on the time spent serving one request
    pub request_timeout: Duration,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Optional TOML file with demo data applied at start-up
    pub seed_file: Option<PathBuf>,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// All missing required keys are reported together in one error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = ["PORT", "DATABASE_URL", "JWT_SECRET", "FRONTEND_URL"]
            .into_iter()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config {
                message: format!(
                    "Missing required environment variables: {}",
                    missing.join(", ")
                ),
            });
        }

        let port_raw = get("PORT").unwrap_or_default();
        let port = port_raw.trim().parse::<u16>().map_err(|e| Error::Config {
            message: format!("PORT must be a valid port number, got '{port_raw}': {e}"),
        })?;

        let environment = match get("APP_ENV").as_deref().map(str::trim) {
            None | Some("development" | "dev" | "test") => Environment::Development,
            Some("production" | "prod") => Environment::Production,
            Some(other) => {
                return Err(Error::Config {
                    message: format!(
                        "APP_ENV must be 'production' or 'development', got '{other}'"
                    ),
                });
            }
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_default();
        if environment == Environment::Production
            && jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN
        {
            return Err(Error::Config {
                message: format!(
                    "JWT_SECRET must be at least {MIN_PRODUCTION_SECRET_LEN} characters in production"
                ),
            });
        }

        let request_timeout = parse_or(
            "REQUEST_TIMEOUT_SECS",
            get("REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let bcrypt_cost = parse_or("BCRYPT_COST", get("BCRYPT_COST"), DEFAULT_BCRYPT_COST)?;

        Ok(Self {
            port,
            database_url: get("DATABASE_URL").unwrap_or_default(),
            jwt_secret,
            frontend_url: get("FRONTEND_URL").unwrap_or_default(),
            environment,
            request_timeout: Duration::from_secs(request_timeout),
            bcrypt_cost,
            seed_file: get("SEED_FILE").map(PathBuf::from),
        })
    }

    /// True when running with `APP_ENV=production`.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |value| {
        value.trim().parse::<T>().map_err(|e| Error::Config {
            message: format!("{key} is invalid ('{value}'): {e}"),
        })
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 4] = [
        ("PORT", "3001"),
        ("DATABASE_URL", "sqlite::memory:"),
        ("JWT_SECRET", "dev-secret"),
        ("FRONTEND_URL", "http://localhost:5173"),
    ];

    #[test]
    fn test_loads_required_values_and_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&BASE)).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.frontend_url, "http://localhost:5173");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.bcrypt_cost, 10);
        assert!(config.seed_file.is_none());
    }

    #[test]
    fn test_reports_every_missing_variable() {
        let err = AppConfig::from_lookup(lookup_from(&[("PORT", "3001")])).unwrap_err();
        let Error::Config { message } = err else {
            panic!("expected config error");
        };
        assert!(message.contains("DATABASE_URL"));
        assert!(message.contains("JWT_SECRET"));
        assert!(message.contains("FRONTEND_URL"));
        assert!(!message.contains("PORT"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut pairs = BASE.to_vec();
        pairs[2] = ("JWT_SECRET", "   ");
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, Error::Config { message } if message.contains("JWT_SECRET")));
    }

    #[test]
    fn test_production_requires_long_secret() {
        let mut pairs = BASE.to_vec();
        pairs.push(("APP_ENV", "production"));
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());

        pairs[2] = ("JWT_SECRET", "0123456789abcdef0123456789abcdef");
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_rejects_bad_port_and_overrides() {
        let mut pairs = BASE.to_vec();
        pairs[0] = ("PORT", "not-a-port");
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = BASE.to_vec();
        pairs.push(("REQUEST_TIMEOUT_SECS", "5"));
        pairs.push(("BCRYPT_COST", "4"));
        pairs.push(("SEED_FILE", "seed.toml"));
        let config = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.toml")));
    }
}
